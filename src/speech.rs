/*!
 * Speech-to-text engine boundary.
 *
 * The engine turns audio into time-stamped segments. `WhisperHttpEngine` talks
 * to any OpenAI-compatible `/audio/transcriptions` server (faster-whisper
 * servers included) and asks for verbose JSON with segment and word
 * timestamps.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use isolang::Language;
use log::{debug, error, warn};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::app_config::SpeechConfig;
use crate::errors::SpeechEngineError;
use crate::language_utils;
use crate::segment::{Segment, TranscriptionInfo, Word};

/// Audio input held in memory together with the name it was supplied under
#[derive(Debug, Clone)]
pub struct AudioSource {
    file_name: String,
    path: Option<PathBuf>,
    data: Arc<Vec<u8>>,
}

impl AudioSource {
    /// Read an audio file from disk
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, SpeechEngineError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());

        Ok(Self {
            file_name,
            path: Some(path.to_path_buf()),
            data: Arc::new(data),
        })
    }

    /// Wrap audio that is already in memory, e.g. an upload
    pub fn from_bytes(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            path: None,
            data: Arc::new(data),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Lower-case hex SHA-256 of the audio bytes
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.data.as_slice());
        format!("{:x}", hasher.finalize())
    }

    /// MIME type guessed from the file extension
    pub fn mime_type(&self) -> &'static str {
        let extension = Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "mp3" => "audio/mpeg",
            "m4a" => "audio/mp4",
            "mp4" => "video/mp4",
            "wav" => "audio/wav",
            "ogg" => "audio/ogg",
            "flac" => "audio/flac",
            "webm" => "audio/webm",
            _ => "application/octet-stream",
        }
    }
}

/// Speech-to-text engine
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Transcribe `audio`, optionally dropping non-speech with voice activity detection
    async fn transcribe(
        &self,
        audio: &AudioSource,
        vad_filter: bool,
    ) -> Result<(Vec<Segment>, TranscriptionInfo), SpeechEngineError>;
}

/// Client for an OpenAI-compatible transcription server
#[derive(Debug)]
pub struct WhisperHttpEngine {
    client: Client,
    endpoint: Url,
    model: String,
    api_key: String,
    /// Spoken language hint, detected by the server when absent
    language: Option<String>,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    language: String,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
    #[serde(default)]
    words: Option<Vec<VerboseWord>>,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    text: String,
    #[serde(default)]
    temperature: f64,
    #[serde(default)]
    avg_logprob: f64,
    #[serde(default)]
    words: Option<Vec<VerboseWord>>,
}

#[derive(Debug, Clone, Deserialize)]
struct VerboseWord {
    word: String,
    start: f64,
    end: f64,
    #[serde(default)]
    probability: Option<f64>,
}

impl From<VerboseWord> for Word {
    fn from(word: VerboseWord) -> Self {
        Word::new(word.word, word.start, word.end, word.probability.unwrap_or(1.0))
    }
}

impl WhisperHttpEngine {
    pub fn new(
        endpoint: &str,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, SpeechEngineError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .map_err(|e| SpeechEngineError::RequestFailed(e.to_string()))?,
            endpoint: parse_endpoint(endpoint)?,
            model: model.into(),
            api_key: api_key.into(),
            language: None,
            timeout_secs,
        })
    }

    pub fn from_config(config: &SpeechConfig) -> Result<Self, SpeechEngineError> {
        Self::new(&config.endpoint, config.model.clone(), config.api_key.clone(), config.timeout_secs)
    }

    /// Skip language detection and transcribe as `language`
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    fn transcriptions_url(&self) -> String {
        format!("{}/audio/transcriptions", self.endpoint.as_str().trim_end_matches('/'))
    }

    fn build_form(&self, audio: &AudioSource, vad_filter: bool) -> Result<Form, SpeechEngineError> {
        let file = Part::bytes(audio.bytes().to_vec())
            .file_name(audio.file_name().to_string())
            .mime_str(audio.mime_type())
            .map_err(|e| SpeechEngineError::RequestFailed(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .text("timestamp_granularities[]", "word")
            .text("vad_filter", vad_filter.to_string());

        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        Ok(form)
    }
}

#[async_trait]
impl SpeechEngine for WhisperHttpEngine {
    async fn transcribe(
        &self,
        audio: &AudioSource,
        vad_filter: bool,
    ) -> Result<(Vec<Segment>, TranscriptionInfo), SpeechEngineError> {
        debug!(
            "Sending {} ({} bytes) to {} with model {}",
            audio.file_name(),
            audio.bytes().len(),
            self.transcriptions_url(),
            self.model
        );

        let mut request = self.client
            .post(self.transcriptions_url())
            .multipart(self.build_form(audio, vad_filter)?);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SpeechEngineError::Timeout(self.timeout_secs)
            } else {
                SpeechEngineError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Transcription API error ({}): {}", status, message);
            return Err(SpeechEngineError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SpeechEngineError::RequestFailed(e.to_string()))?;

        parse_verbose_json(&body, self.language.as_deref())
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, SpeechEngineError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(SpeechEngineError::RequestFailed("Speech endpoint cannot be empty".to_string()));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)
    } else {
        Url::parse(&format!("http://{}", endpoint))
    };

    url.map_err(|e| SpeechEngineError::RequestFailed(format!("Invalid speech endpoint {}: {}", endpoint, e)))
}

/// Parse a verbose JSON transcription into segments and language info.
///
/// Segments are renumbered from zero in the order received. Word timings are
/// taken from each segment when present, otherwise the top-level word list is
/// distributed over segments by word midpoint.
fn parse_verbose_json(
    body: &str,
    language_hint: Option<&str>,
) -> Result<(Vec<Segment>, TranscriptionInfo), SpeechEngineError> {
    let transcription: VerboseTranscription = serde_json::from_str(body)
        .map_err(|e| SpeechEngineError::ParseError(format!("Invalid transcription response: {}", e)))?;

    let mut loose_words = transcription.words.unwrap_or_default().into_iter().peekable();
    let segment_count = transcription.segments.len();
    let mut segments = Vec::with_capacity(segment_count);

    for (position, raw) in transcription.segments.into_iter().enumerate() {
        let mut words: Option<Vec<Word>> = raw.words.map(|words| words.into_iter().map(Word::from).collect());

        if words.is_none() && loose_words.peek().is_some() {
            let is_last = position + 1 == segment_count;
            let mut owned = Vec::new();
            while let Some(word) = loose_words.next_if(|word| is_last || (word.start + word.end) / 2.0 <= raw.end) {
                owned.push(Word::from(word));
            }
            if !owned.is_empty() {
                words = Some(owned);
            }
        }

        let mut segment = Segment::new(position, raw.start, raw.end, raw.text).with_words(words);
        segment.temperature = raw.temperature;
        segment.avg_logprob = raw.avg_logprob;
        segments.push(segment);
    }

    let duration = if transcription.duration > 0.0 {
        transcription.duration
    } else {
        segments.last().map(|segment| segment.end).unwrap_or(0.0)
    };

    let language = resolve_language(&transcription.language)
        .or_else(|| language_hint.and_then(resolve_language))
        .unwrap_or_else(|| {
            warn!("Could not determine transcript language from '{}'", transcription.language);
            language_utils::UNDETERMINED_LANGUAGE.to_string()
        });

    Ok((segments, TranscriptionInfo { language, duration }))
}

/// Map a reported language (`en`, `eng` or `english`) to an ISO 639-1 code
fn resolve_language(reported: &str) -> Option<String> {
    let reported = reported.trim();
    if reported.is_empty() {
        return None;
    }

    if let Ok(code) = language_utils::normalize_to_part1_or_part2t(reported) {
        return Some(code);
    }

    let mut chars = reported.chars();
    let name: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => return None,
    };

    Language::from_name(&name).map(|language| {
        language
            .to_639_1()
            .map(str::to_string)
            .unwrap_or_else(|| language.to_639_3().to_string())
    })
}
