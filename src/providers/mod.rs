/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the translation backends:
 * - DeepL: machine translation API
 * - Anthropic: LLM-backed translation through the Messages API
 * - Mock: scripted provider used by tests and dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// The client is shared read-only by every translation job, so implementations
/// must not rely on per-call mutable state.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Translate a single text into `target_language`
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `source_language` - Spoken language of the text, when known
    /// * `target_language` - Normalized target language code
    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Build the configured provider client
pub fn create_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.get_api_key();
    if api_key.is_empty() {
        return Err(ProviderError::AuthenticationError(format!(
            "no API key configured for {}",
            config.provider.display_name()
        )));
    }

    let timeout_secs = config.get_timeout_secs();
    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::DeepL => {
            Arc::new(deepl::DeepL::new(api_key, config.get_endpoint()).with_timeout(timeout_secs))
        }
        TranslationProvider::Anthropic => Arc::new(
            anthropic::Anthropic::new(
                api_key,
                config.get_endpoint(),
                config.get_model(),
                config.common.system_prompt.clone(),
            )
            .with_timeout(timeout_secs),
        ),
    };

    Ok(provider)
}

/// HTTP client with a whole-request timeout
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

/// Map a transport level reqwest failure to a provider error
pub(crate) fn map_request_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() || error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Map an unsuccessful HTTP status to a provider error
pub(crate) fn map_status_error(status_code: u16, message: String) -> ProviderError {
    match status_code {
        401 | 403 => ProviderError::AuthenticationError(message),
        // 456 is DeepL's quota exceeded status
        429 | 456 => ProviderError::RateLimitExceeded(message),
        _ => ProviderError::ApiError { status_code, message },
    }
}

pub mod anthropic;
pub mod deepl;
pub mod mock;
