/*!
 * Transcript service: the boundary the outside world calls.
 *
 * It composes the speech engine, the cue builder, the track renderer and the
 * translation orchestrator. The transcript of the most recent audio input is
 * cached under the SHA-256 of its bytes, so repeated subtitle requests for the
 * same audio skip transcription while a different input always recomputes.
 */

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use parking_lot::Mutex;

use crate::cue_builder::{self, Cue};
use crate::errors::{ServiceError, TranslationError};
use crate::segment::Transcript;
use crate::speech::{AudioSource, SpeechEngine};
use crate::style::StyleOptions;
use crate::track_renderer;
use crate::translation::TranslationOrchestrator;

/// Rendered WebVTT tracks keyed by language code
pub type TrackResults = BTreeMap<String, Result<Vec<u8>, TranslationError>>;

/// Content hash and transcript of the last audio input
type CachedTranscript = (String, Arc<Transcript>);

pub struct TranscriptService {
    engine: Arc<dyn SpeechEngine>,
    orchestrator: Option<TranslationOrchestrator>,
    vad_filter: bool,
    cache: Mutex<Option<CachedTranscript>>,
}

impl TranscriptService {
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        orchestrator: Option<TranslationOrchestrator>,
        vad_filter: bool,
    ) -> Self {
        Self {
            engine,
            orchestrator,
            vad_filter,
            cache: Mutex::new(None),
        }
    }

    pub fn can_translate(&self) -> bool {
        self.orchestrator.is_some()
    }

    /// Transcript for `audio`, computed once per distinct audio content
    pub async fn get_transcript(&self, audio: &AudioSource) -> Result<Transcript, ServiceError> {
        let key = audio.content_hash();

        if let Some(transcript) = self.cached(&key) {
            debug!("Reusing cached transcript for {}", audio.file_name());
            return Ok(transcript.as_ref().clone());
        }

        let start_time = Instant::now();
        let (segments, info) = self.engine.transcribe(audio, self.vad_filter).await?;
        let transcript = Transcript::from_engine_output(segments, info);
        transcript.validate()?;

        info!(
            "Transcribed {} into {} segments ({}, {:.1}s of audio) in {:?}",
            audio.file_name(),
            transcript.segments.len(),
            transcript.language,
            transcript.duration,
            start_time.elapsed()
        );

        *self.cache.lock() = Some((key, Arc::new(transcript.clone())));
        Ok(transcript)
    }

    fn cached(&self, key: &str) -> Option<Arc<Transcript>> {
        match self.cache.lock().as_ref() {
            Some((cached_key, transcript)) if cached_key == key => Some(Arc::clone(transcript)),
            _ => None,
        }
    }

    /// Machine-readable cue list for `audio`
    pub async fn get_cues(&self, audio: &AudioSource, style: &StyleOptions) -> Result<Vec<Cue>, ServiceError> {
        style.validate()?;
        let transcript = self.get_transcript(audio).await?;
        Ok(cue_builder::build_cues(&transcript, style)?)
    }

    /// WebVTT track in the spoken language
    pub async fn write_subtitles(&self, audio: &AudioSource, style: &StyleOptions) -> Result<Vec<u8>, ServiceError> {
        let cues = self.get_cues(audio, style).await?;
        let mut output = Vec::new();
        track_renderer::render(&cues, &mut output)?;
        Ok(output)
    }

    /// One WebVTT track per requested language.
    ///
    /// Failures of individual languages are reported in their entries; only
    /// problems that affect every language (style, transcription) fail the call.
    pub async fn write_subtitles_multilang(
        &self,
        audio: &AudioSource,
        languages: &[String],
        style: &StyleOptions,
    ) -> Result<TrackResults, ServiceError> {
        style.validate()?;
        let transcript = self.get_transcript(audio).await?;

        let Some(orchestrator) = &self.orchestrator else {
            return Ok(languages
                .iter()
                .map(|language| {
                    let error = TranslationError::Other("no translation provider configured".to_string());
                    (language.trim().to_string(), Err(error))
                })
                .collect());
        };

        let translations = orchestrator.translate(&transcript, languages).await;

        Ok(translations
            .into_iter()
            .map(|(language, result)| {
                let track = result.and_then(|translated| {
                    cue_builder::build_cues(&translated, style)
                        .map(|cues| track_renderer::render_to_bytes(&cues))
                        .map_err(|e| TranslationError::Other(e.to_string()))
                });
                (language, track)
            })
            .collect())
    }

    /// Verify the translation provider before any audio is processed.
    /// Succeeds trivially when no provider is configured.
    pub async fn check_translation(&self) -> Result<(), TranslationError> {
        match &self.orchestrator {
            Some(orchestrator) => orchestrator.check_provider().await,
            None => Ok(()),
        }
    }

    /// Forget the cached transcript
    pub fn clear_cache(&self) {
        *self.cache.lock() = None;
    }
}
