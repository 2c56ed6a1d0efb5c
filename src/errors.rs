/*!
 * Error types for the subgen library.
 *
 * Each stage of the subtitle pipeline has its own error type, defined
 * with the thiserror crate:
 *
 * - `ValidationError`: bad style options or malformed transcript input
 * - `SpeechEngineError`: failures reported by the speech-to-text engine
 * - `ProviderError`: raw failures of a translation provider client
 * - `TranslationError`: per-language translation outcome surfaced to callers
 * - `RenderError`: failures of the sink a track is rendered into
 * - `ServiceError`: everything the transcript service can propagate
 * - `AppError`: application level wrapper used by the controller and CLI
 */

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors raised when style options or transcript data are invalid
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A style option that the cue builder does not know about
    #[error("Unrecognized style option: {0}")]
    UnknownOption(String),

    /// A numeric limit that must be strictly positive
    #[error("Style option '{option}' must be a positive integer, got {value}")]
    NonPositive {
        /// Option name
        option: String,
        /// Offending value as given
        value: String,
    },

    /// An option with the wrong JSON type
    #[error("Style option '{option}' must be {expected}")]
    InvalidType {
        /// Option name
        option: String,
        /// Human readable expected type
        expected: &'static str,
    },

    /// Style options that are not a key/value object
    #[error("Style options must be an object")]
    NotAnObject,

    /// A segment that breaks the transcript invariants
    #[error("Invalid segment {index}: {reason}")]
    InvalidSegment {
        /// Segment index
        index: usize,
        /// What is wrong with it
        reason: String,
    },
}

/// Errors that can occur while obtaining a transcript from the speech engine
#[derive(Error, Debug)]
pub enum SpeechEngineError {
    /// The audio could not be read
    #[error("Failed to read audio: {0}")]
    Audio(#[from] std::io::Error),

    /// The request to the engine failed before a response was received
    #[error("Speech engine request failed: {0}")]
    RequestFailed(String),

    /// The engine answered with an error status
    #[error("Speech engine responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the engine
        message: String,
    },

    /// The engine response could not be understood
    #[error("Failed to parse speech engine response: {0}")]
    ParseError(String),

    /// The engine did not answer in time
    #[error("Speech engine timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors that can occur when working with translation provider APIs
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or exhausted quota
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether retrying the same call later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimitExceeded(_) | Self::ConnectionError(_) | Self::RequestFailed(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Classification of a per-language translation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationErrorKind {
    Timeout,
    RateLimited,
    Auth,
    Network,
    Other,
}

impl fmt::Display for TranslationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::Auth => "auth",
            Self::Network => "network",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a failed translation job for one target language
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// The job did not finish within its timeout
    #[error("Translation timed out after {0:?}")]
    Timeout(Duration),

    /// The provider rejected the call because of rate limits or quota
    #[error("Translation rate limited: {0}")]
    RateLimited(String),

    /// The provider rejected the credentials
    #[error("Translation authentication failed: {0}")]
    Auth(String),

    /// The provider could not be reached
    #[error("Translation network error: {0}")]
    Network(String),

    /// Anything else, including malformed responses
    #[error("Translation failed: {0}")]
    Other(String),
}

impl TranslationError {
    pub fn kind(&self) -> TranslationErrorKind {
        match self {
            Self::Timeout(_) => TranslationErrorKind::Timeout,
            Self::RateLimited(_) => TranslationErrorKind::RateLimited,
            Self::Auth(_) => TranslationErrorKind::Auth,
            Self::Network(_) => TranslationErrorKind::Network,
            Self::Other(_) => TranslationErrorKind::Other,
        }
    }
}

impl From<ProviderError> for TranslationError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::RateLimitExceeded(message) => Self::RateLimited(message),
            ProviderError::AuthenticationError(message) => Self::Auth(message),
            ProviderError::ConnectionError(message) | ProviderError::RequestFailed(message) => {
                Self::Network(message)
            }
            ProviderError::ApiError { status_code: 429, message } => Self::RateLimited(message),
            ProviderError::ApiError { status_code: 401 | 403, message } => Self::Auth(message),
            other => Self::Other(other.to_string()),
        }
    }
}

/// Errors raised while writing a rendered track
#[derive(Error, Debug)]
pub enum RenderError {
    /// The output sink failed
    #[error("Failed to write subtitle track: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors propagated by the transcript service to its caller
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Invalid style options or transcript
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The speech engine failed
    #[error("Speech engine error: {0}")]
    SpeechEngine(#[from] SpeechEngineError),

    /// Rendering into the output buffer failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the transcript service
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
