/*!
 * Mock provider implementations for testing.
 *
 * This module provides a scripted provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a tagged translation
 * - `MockProvider::intermittent(n)` - Fails every n-th request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::slow(ms)` - Succeeds after a delay (for timeout testing)
 *
 * Behaviors can be overridden per target language so a single provider can
 * fail or stall for one language while serving the others.
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language, when given
    pub source_language: Option<String>,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with a non-transient error
    Failing,
    /// Always reports an exhausted quota
    RateLimited,
    /// Always rejects the credentials
    Unauthorized,
    /// Returns an empty translation
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Behaviors that replace the default for specific target languages
    language_behaviors: Vec<(String, MockBehavior)>,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
    /// Custom delay in milliseconds before answering (optional)
    custom_delay: Option<fn(&MockRequest) -> u64>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            language_behaviors: Vec::new(),
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
            custom_delay: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock that returns empty translations
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Override the behavior for one target language
    pub fn with_language_behavior(mut self, language: &str, behavior: MockBehavior) -> Self {
        self.language_behaviors.push((language.to_lowercase(), behavior));
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Set a custom per-request delay
    pub fn with_custom_delay(mut self, delay: fn(&MockRequest) -> u64) -> Self {
        self.custom_delay = Some(delay);
        self
    }

    /// Number of translate calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// The translation a working mock produces for `text`
    pub fn expected_translation(text: &str, target_language: &str) -> String {
        let leading: String = text.chars().take_while(|c| c.is_whitespace()).collect();
        format!("{}[{}] {}", leading, target_language, text.trim())
    }

    fn behavior_for(&self, target_language: &str) -> MockBehavior {
        let target = target_language.to_lowercase();
        self.language_behaviors
            .iter()
            .find(|(language, _)| *language == target)
            .map(|(_, behavior)| *behavior)
            .unwrap_or(self.behavior)
    }

    fn respond(&self, request: &MockRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::expected_translation(&request.text, &request.target_language),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            language_behaviors: self.language_behaviors.clone(),
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
            custom_delay: self.custom_delay,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.map(str::to_string),
            target_language: target_language.to_string(),
        };

        if let Some(delay) = self.custom_delay {
            tokio::time::sleep(Duration::from_millis(delay(&request))).await;
        }

        match self.behavior_for(target_language) {
            MockBehavior::Working => Ok(self.respond(&request)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.respond(&request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 400,
            }),

            MockBehavior::RateLimited => Err(ProviderError::RateLimitExceeded(
                "Simulated quota exhaustion".to_string(),
            )),

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated invalid key".to_string(),
            )),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.respond(&request))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing | MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated invalid key".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
