/*!
 * Multi-language transcript translation.
 *
 * One job runs per target language. Jobs run concurrently up to a worker
 * limit, each under its own timeout, and every failure is captured as that
 * language's result: a failing language never cancels or alters its siblings.
 * Inside a job segments are translated concurrently and reassembled by their
 * position in the source transcript.
 */

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info, warn};
use tokio::sync::Semaphore;

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::Provider;
use crate::segment::{Segment, Transcript, Word};
use super::cache::TranslationCache;

/// Per-language translation outcomes keyed by normalized language code
pub type TranslationResults = BTreeMap<String, Result<Transcript, TranslationError>>;

/// Tuning knobs for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Maximum language jobs running at once
    pub worker_limit: usize,

    /// Maximum provider calls in flight across all jobs
    pub max_in_flight: usize,

    /// Timeout applied to each language job independently
    pub job_timeout: Duration,

    /// Retries for transient provider failures
    pub retry_count: u32,

    /// Base delay between retries, doubled on each attempt
    pub retry_backoff: Duration,

    /// Whether word-level text is translated too
    pub translate_words: bool,

    /// Whether identical texts share one provider call per language
    pub cache_enabled: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            worker_limit: 4,
            max_in_flight: 8,
            job_timeout: Duration::from_secs(60),
            retry_count: 3,
            retry_backoff: Duration::from_millis(1000),
            translate_words: false,
            cache_enabled: true,
        }
    }
}

impl OrchestratorOptions {
    /// Derive options from the translation section of the configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            worker_limit: config.optimal_concurrent_requests(),
            max_in_flight: config.max_in_flight_requests(),
            job_timeout: Duration::from_secs(config.get_timeout_secs()),
            retry_count: config.common.retry_count,
            retry_backoff: Duration::from_millis(config.common.retry_backoff_ms),
            translate_words: config.common.translate_words,
            cache_enabled: config.common.cache_enabled,
        }
    }
}

/// Fans a transcript out to one translation job per target language
#[derive(Clone)]
pub struct TranslationOrchestrator {
    /// Provider client shared read-only by every job
    provider: Arc<dyn Provider>,

    options: OrchestratorOptions,

    cache: TranslationCache,

    /// Bounds provider calls in flight across all jobs
    request_permits: Arc<Semaphore>,
}

impl TranslationOrchestrator {
    pub fn new(provider: Arc<dyn Provider>, options: OrchestratorOptions) -> Self {
        let max_in_flight = options.max_in_flight.max(1);
        Self {
            cache: TranslationCache::new(options.cache_enabled),
            request_permits: Arc::new(Semaphore::new(max_in_flight)),
            provider,
            options,
        }
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Check that the provider accepts our credentials before any job starts
    pub async fn check_provider(&self) -> Result<(), TranslationError> {
        self.provider.test_connection().await.map_err(|e| {
            warn!("{} connection check failed: {}", self.provider.name(), e);
            TranslationError::from(e)
        })
    }

    /// Translate `transcript` into every requested language.
    ///
    /// The result holds exactly one entry per distinct requested language:
    /// a complete translated transcript or the error that stopped that job.
    /// Codes are normalized first (`FR` and `fre` both become `fr`); a code
    /// that is not a language yields an error entry under its trimmed form.
    pub async fn translate(&self, transcript: &Transcript, target_languages: &[String]) -> TranslationResults {
        let mut results = TranslationResults::new();
        let mut jobs: Vec<String> = Vec::with_capacity(target_languages.len());

        for requested in target_languages {
            match language_utils::normalize_target_language(requested) {
                Ok(language) => {
                    if !jobs.contains(&language) {
                        jobs.push(language);
                    }
                }
                Err(e) => {
                    warn!("Skipping translation to '{}': {}", requested, e);
                    results.insert(requested.trim().to_string(), Err(TranslationError::Other(e.to_string())));
                }
            }
        }

        if jobs.is_empty() {
            return results;
        }

        info!(
            "Translating {} segments into {} language(s) with up to {} parallel jobs",
            transcript.segments.len(),
            jobs.len(),
            self.options.worker_limit
        );

        let worker_limit = self.options.worker_limit.max(1);
        let outcomes: Vec<(String, Result<Transcript, TranslationError>)> = stream::iter(jobs)
            .map(|language| async move {
                let start_time = Instant::now();
                let outcome = self.run_job(transcript, &language).await;
                match &outcome {
                    Ok(_) => info!("Translation to {} completed in {:?}", language, start_time.elapsed()),
                    Err(e) => warn!("Translation to {} failed ({}): {}", language, e.kind(), e),
                }
                (language, outcome)
            })
            .buffer_unordered(worker_limit)
            .collect()
            .await;

        results.extend(outcomes);
        results
    }

    /// Translate into a single language under the job timeout
    pub async fn translate_one(&self, transcript: &Transcript, language: &str) -> Result<Transcript, TranslationError> {
        let language = language_utils::normalize_target_language(language)
            .map_err(|e| TranslationError::Other(e.to_string()))?;
        self.run_job(transcript, &language).await
    }

    async fn run_job(&self, transcript: &Transcript, language: &str) -> Result<Transcript, TranslationError> {
        if !language.contains('-') && language_utils::language_codes_match(&transcript.language, language) {
            debug!("Transcript is already in {}, skipping provider calls", language);
            return Ok(transcript.with_segments(transcript.segments.clone(), language));
        }

        match tokio::time::timeout(self.options.job_timeout, self.translate_transcript(transcript, language)).await {
            Ok(result) => result,
            Err(_) => Err(TranslationError::Timeout(self.options.job_timeout)),
        }
    }

    async fn translate_transcript(&self, transcript: &Transcript, language: &str) -> Result<Transcript, TranslationError> {
        let source_hint = language_utils::source_language_hint(&transcript.language);
        let source_language = source_hint.as_deref();

        let mut translated: Vec<(usize, Segment)> = stream::iter(transcript.segments.iter().enumerate())
            .map(|(position, segment)| async move {
                self.translate_segment(segment, source_language, language)
                    .await
                    .map(|segment| (position, segment))
            })
            .buffer_unordered(self.options.max_in_flight.max(1))
            .try_collect()
            .await?;

        // Completion order is arbitrary; restore source order
        translated.sort_by_key(|(position, _)| *position);
        let segments = translated.into_iter().map(|(_, segment)| segment).collect();

        Ok(transcript.with_segments(segments, language))
    }

    async fn translate_segment(
        &self,
        segment: &Segment,
        source_language: Option<&str>,
        language: &str,
    ) -> Result<Segment, TranslationError> {
        let text = self.translate_text(&segment.text, source_language, language).await?;
        let translated = segment.with_text(text);

        if !self.options.translate_words {
            return Ok(translated);
        }

        let Some(words) = segment.words.as_ref() else {
            return Ok(translated);
        };

        let mut translated_words: Vec<Word> = Vec::with_capacity(words.len());
        for word in words {
            let text = self.translate_text(&word.text, source_language, language).await?;
            translated_words.push(word.with_text(text));
        }

        Ok(translated.with_words(Some(translated_words)))
    }

    async fn translate_text(
        &self,
        text: &str,
        source_language: Option<&str>,
        language: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let cache_source = source_language.unwrap_or("");
        if let Some(cached) = self.cache.get(text, cache_source, language) {
            return Ok(cached);
        }

        let mut attempt = 0;
        loop {
            let result = {
                let _permit = self.request_permits.acquire().await
                    .map_err(|_| TranslationError::Other("request limiter closed".to_string()))?;
                self.provider.translate(text, source_language, language).await
            };

            match result {
                Ok(translation) if translation.trim().is_empty() => {
                    return Err(TranslationError::Other(format!(
                        "{} returned an empty translation",
                        self.provider.name()
                    )));
                }
                Ok(translation) => {
                    let translation = restore_leading_whitespace(text, translation);
                    self.cache.store(text, cache_source, language, &translation);
                    return Ok(translation);
                }
                Err(e) if e.is_transient() && attempt < self.options.retry_count => {
                    let backoff = self.options.retry_backoff * 2u32.saturating_pow(attempt);
                    warn!(
                        "{} call for {} failed ({}), retrying in {:?}",
                        self.provider.name(),
                        language,
                        e,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Keep the separator a segment text starts with, which providers tend to strip
fn restore_leading_whitespace(source: &str, translation: String) -> String {
    let source_leading: String = source.chars().take_while(|c| c.is_whitespace()).collect();
    if source_leading.is_empty() || translation.starts_with(char::is_whitespace) {
        translation
    } else {
        format!("{}{}", source_leading, translation)
    }
}
