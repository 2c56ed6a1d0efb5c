/*!
 * Tests for application configuration functionality
 */

use subgen::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};
use subgen::translation::{OrchestratorOptions, ProviderProfile};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert!(config.source_language.is_none());
    assert!(config.target_languages.is_empty());
    assert_eq!(config.translation.provider, TranslationProvider::DeepL);
    assert_eq!(config.speech.endpoint, "http://localhost:8000/v1");
    assert!(config.speech.vad_filter);
    assert_eq!(config.log_level, LogLevel::Info);

    let deepl = config.translation.get_provider_config(&TranslationProvider::DeepL)
        .expect("DeepL provider config should exist");
    assert_eq!(deepl.concurrent_requests, 4);
    assert_eq!(deepl.timeout_secs, 60);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = Some("xyz".to_string());
    assert!(config.validate().is_err());
    config.source_language = Some("en".to_string());

    config.style.max_line_count = 0;
    assert!(config.validate().is_err());
    config.style.max_line_count = 2;

    config.speech.endpoint = "  ".to_string();
    assert!(config.validate().is_err());
    config.speech.endpoint = "http://localhost:9000/v1".to_string();

    // Targets need a key for the active provider
    config.target_languages = vec!["fr".to_string(), "pt-BR".to_string()];
    if let Some(provider) = config.translation.available_providers.iter_mut().find(|p| p.provider_type == "deepl") {
        provider.api_key = "test-key".to_string();
    }
    assert!(config.validate().is_ok());

    config.target_languages.push("xx".to_string());
    assert!(config.validate().is_err());
}

/// Test provider specific accessors and their fallbacks
#[test]
fn test_translation_config_withMissingProviderEntry_shouldUseProfileDefaults() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    config.translation.available_providers.clear();

    let profile = ProviderProfile::for_provider(TranslationProvider::Anthropic);
    assert_eq!(config.translation.optimal_concurrent_requests(), profile.max_concurrent_jobs);
    assert_eq!(config.translation.get_timeout_secs(), profile.job_timeout_secs);
    config.translation.common.max_in_flight = 0;
    assert_eq!(config.translation.max_in_flight_requests(), profile.max_in_flight_requests);
    assert!(config.translation.get_model().starts_with("claude"));
    assert!(config.translation.get_endpoint().starts_with("https://"));
}

/// Test orchestrator options derived from configuration
#[test]
fn test_orchestrator_options_fromConfig_shouldCopyLimits() {
    let mut config = Config::default();
    let mut deepl = ProviderConfig::new(TranslationProvider::DeepL);
    deepl.concurrent_requests = 6;
    deepl.timeout_secs = 15;
    config.translation.available_providers = vec![deepl];
    config.translation.common.retry_count = 1;
    config.translation.common.translate_words = true;

    let options = OrchestratorOptions::from_config(&config.translation);
    assert_eq!(options.worker_limit, 6);
    assert_eq!(options.job_timeout.as_secs(), 15);
    assert_eq!(options.retry_count, 1);
    assert!(options.translate_words);
    assert!(options.cache_enabled);
}

/// Test loading an existing configuration file
#[test]
fn test_load_or_create_withExistingFile_shouldParseIt() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        br#"{"target_languages": ["de"], "translation": {"provider": "anthropic"}, "log_level": "debug"}"#,
    )?;

    let config = Config::load_or_create(&path)?;
    assert_eq!(config.target_languages, vec!["de".to_string()]);
    assert_eq!(config.translation.provider, TranslationProvider::Anthropic);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.style.max_line_width, 28);
    Ok(())
}

/// Test that a broken file is reported rather than overwritten
#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", b"{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    assert_eq!(std::fs::read(&path)?, b"{ not json");
    Ok(())
}
