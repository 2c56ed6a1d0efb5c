/*!
 * Provider-specific concurrency tuning.
 *
 * Default worker limits and timeouts based on provider characteristics
 * such as rate limits and typical response times.
 */

use crate::app_config::TranslationProvider;

/// Provider-specific concurrency profile with tuned defaults
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    /// Maximum language jobs running at once
    pub max_concurrent_jobs: usize,
    /// Maximum provider calls in flight across all jobs
    pub max_in_flight_requests: usize,
    /// Per-language job timeout in seconds
    pub job_timeout_secs: u64,
}

impl ProviderProfile {
    /// Get the optimal profile for a given provider
    pub fn for_provider(provider: TranslationProvider) -> Self {
        match provider {
            TranslationProvider::DeepL => Self {
                // DeepL answers fast and tolerates moderate parallelism
                max_concurrent_jobs: 4,
                max_in_flight_requests: 8,
                job_timeout_secs: 60,
            },
            TranslationProvider::Anthropic => Self {
                // LLM calls are slow and rate limited per minute
                max_concurrent_jobs: 2,
                max_in_flight_requests: 4,
                job_timeout_secs: 180,
            },
        }
    }

    /// Get effective job concurrency, respecting any user override
    pub fn effective_concurrent_jobs(&self, user_override: Option<usize>) -> usize {
        user_override.filter(|&n| n > 0).unwrap_or(self.max_concurrent_jobs)
    }
}
