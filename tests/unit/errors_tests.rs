/*!
 * Tests for error types and their conversions
 */

use std::time::Duration;

use subgen::errors::{
    AppError, ProviderError, RenderError, ServiceError, SpeechEngineError, TranslationError,
    TranslationErrorKind, ValidationError,
};

/// Test provider failures mapping into per-language translation errors
#[test]
fn test_translation_error_fromProviderError_shouldClassifyKind() {
    let cases = [
        (ProviderError::RateLimitExceeded("quota".to_string()), TranslationErrorKind::RateLimited),
        (ProviderError::AuthenticationError("key".to_string()), TranslationErrorKind::Auth),
        (ProviderError::ConnectionError("reset".to_string()), TranslationErrorKind::Network),
        (ProviderError::RequestFailed("dns".to_string()), TranslationErrorKind::Network),
        (ProviderError::ApiError { status_code: 401, message: String::new() }, TranslationErrorKind::Auth),
        (ProviderError::ApiError { status_code: 500, message: String::new() }, TranslationErrorKind::Other),
        (ProviderError::ParseError("json".to_string()), TranslationErrorKind::Other),
    ];

    for (provider_error, kind) in cases {
        let error: TranslationError = provider_error.clone().into();
        assert_eq!(error.kind(), kind, "{:?}", provider_error);
    }
}

/// Test the human readable kinds used in logs
#[test]
fn test_translation_error_kind_display_shouldBeSnakeCase() {
    assert_eq!(TranslationErrorKind::Timeout.to_string(), "timeout");
    assert_eq!(TranslationErrorKind::RateLimited.to_string(), "rate_limited");
    assert_eq!(
        TranslationError::Timeout(Duration::from_secs(30)).to_string(),
        "Translation timed out after 30s"
    );
    assert_eq!(
        TranslationError::Timeout(Duration::from_millis(300)).to_string(),
        "Translation timed out after 300ms"
    );
}

/// Test wrapping into service and application errors
#[test]
fn test_service_error_fromStageErrors_shouldWrap() {
    let validation: ServiceError = ValidationError::NotAnObject.into();
    assert!(matches!(validation, ServiceError::Validation(_)));

    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
    let render: ServiceError = RenderError::from(io).into();
    assert!(matches!(render, ServiceError::Render(_)));

    let speech: ServiceError = SpeechEngineError::Timeout(600).into();
    let app: AppError = speech.into();
    assert!(matches!(app, AppError::Service(ServiceError::SpeechEngine(_))));
}

/// Test the anyhow and io conversions used at the application layer
#[test]
fn test_app_error_fromAnyhowAndIo_shouldKeepMessage() {
    let from_anyhow: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(from_anyhow.to_string(), "Unknown error: boom");

    let from_io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(from_io, AppError::File(_)));
}
