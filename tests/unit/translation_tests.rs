/*!
 * Tests for the translation orchestrator and its cache
 */

use std::sync::Arc;
use std::time::Duration;

use subgen::errors::TranslationErrorKind;
use subgen::providers::mock::{MockBehavior, MockProvider};
use subgen::translation::{OrchestratorOptions, TranslationCache, TranslationOrchestrator};
use crate::common;

fn test_options() -> OrchestratorOptions {
    OrchestratorOptions {
        job_timeout: Duration::from_secs(2),
        retry_backoff: Duration::from_millis(1),
        ..OrchestratorOptions::default()
    }
}

fn languages(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| code.to_string()).collect()
}

/// Test that only text changes in a translated transcript
#[tokio::test]
async fn test_translate_one_withWorkingProvider_shouldOnlyReplaceText() {
    let source = common::sample_transcript();
    let orchestrator = TranslationOrchestrator::new(Arc::new(MockProvider::working()), test_options());

    let translated = orchestrator.translate_one(&source, "es").await.unwrap();

    assert_eq!(translated.language, "es");
    assert_eq!(translated.duration, source.duration);
    assert_eq!(translated.segments.len(), source.segments.len());
    for (original, copy) in source.segments.iter().zip(&translated.segments) {
        assert_eq!(copy.text, MockProvider::expected_translation(&original.text, "es"));
        assert_eq!((copy.index, copy.start, copy.end), (original.index, original.start, original.end));
        assert_eq!(copy.words, original.words);
    }
}

/// Test that duplicate and differently spelled codes collapse
#[tokio::test]
async fn test_translate_withDuplicateCodes_shouldReturnOneEntryPerLanguage() {
    let orchestrator = TranslationOrchestrator::new(Arc::new(MockProvider::working()), test_options());
    let results = orchestrator
        .translate(&common::sample_transcript(), &languages(&["de", "ger", "DE", "deu"]))
        .await;

    assert_eq!(results.keys().collect::<Vec<_>>(), vec!["de"]);
}

/// Test that an empty provider reply fails the language
#[tokio::test]
async fn test_translate_withEmptyReplies_shouldReportOther() {
    let orchestrator = TranslationOrchestrator::new(Arc::new(MockProvider::empty()), test_options());
    let results = orchestrator.translate(&common::sample_transcript(), &languages(&["fr"])).await;

    assert_eq!(results["fr"].as_ref().unwrap_err().kind(), TranslationErrorKind::Other);
}

/// Test that transient failures are retried to success
#[tokio::test]
async fn test_translate_withIntermittentProvider_shouldRetryToSuccess() {
    let provider = Arc::new(MockProvider::intermittent(2));
    let options = OrchestratorOptions { max_in_flight: 1, cache_enabled: false, ..test_options() };
    let orchestrator = TranslationOrchestrator::new(provider.clone(), options);

    let translated = orchestrator.translate_one(&common::sample_transcript(), "it").await.unwrap();

    assert_eq!(translated.segments.len(), 3);
    // every second call fails once and is retried
    assert!(provider.request_count() > 3);
}

/// Test that region variants reach the provider untouched
#[tokio::test]
async fn test_translate_withRegionVariant_shouldKeepRegionInKey() {
    let orchestrator = TranslationOrchestrator::new(Arc::new(MockProvider::working()), test_options());
    let results = orchestrator.translate(&common::sample_transcript(), &languages(&["pt_br"])).await;

    let translated = results["pt-BR"].as_ref().unwrap();
    assert!(translated.segments[0].text.contains("[pt-BR]"));
}

/// Test that the English source with a regional target still translates
#[tokio::test]
async fn test_translate_withRegionalSourceLanguage_shouldCallProvider() {
    let provider = Arc::new(MockProvider::working());
    let orchestrator = TranslationOrchestrator::new(provider.clone(), test_options());

    let results = orchestrator.translate(&common::sample_transcript(), &languages(&["en", "en-GB"])).await;

    assert_eq!(results["en"].as_ref().unwrap().segments, common::sample_segments());
    assert!(results["en-GB"].as_ref().unwrap().segments[0].text.contains("[en-GB]"));
    assert_eq!(provider.request_count(), 3);
}

/// Test cache bookkeeping
#[test]
fn test_translation_cache_withStoreAndLookup_shouldTrackHits() {
    let cache = TranslationCache::new(true);

    assert!(cache.get("Hello", "en", "fr").is_none());
    cache.store("Hello", "en", "fr", "Bonjour");
    assert_eq!(cache.get("Hello", "en", "fr").as_deref(), Some("Bonjour"));
    assert!(cache.get("Hello", "en", "de").is_none());
    assert!(cache.get("Hello", "it", "fr").is_none());

    let (hits, misses, _) = cache.stats();
    assert_eq!((hits, misses), (1, 3));
    assert_eq!(cache.len(), 1);

    let disabled = TranslationCache::new(false);
    disabled.store("Hello", "en", "fr", "Bonjour");
    assert!(disabled.get("Hello", "en", "fr").is_none());
}

/// Test that the cache never grows past its limit
#[test]
fn test_translation_cache_withEntryLimit_shouldStayBounded() {
    let cache = TranslationCache::new(true).with_max_entries(3);
    for i in 0..10 {
        cache.store(&format!("line {}", i), "en", "fr", &format!("ligne {}", i));
        assert!(cache.len() <= 3);
    }
    assert_eq!(cache.get("line 9", "en", "fr").as_deref(), Some("ligne 9"));
}

/// Test that one rejected language does not affect the others
#[tokio::test]
async fn test_translate_withOneUnauthorizedLanguage_shouldIsolateFailure() {
    let provider = MockProvider::working().with_language_behavior("ja", MockBehavior::Unauthorized);
    let orchestrator = TranslationOrchestrator::new(Arc::new(provider), test_options());

    let targets = languages(&["fr", "de", "ja", "it"]);
    let results = orchestrator.translate(&common::sample_transcript(), &targets).await;

    assert_eq!(results.len(), 4);
    assert_eq!(results.values().filter(|outcome| outcome.is_ok()).count(), 3);
    assert_eq!(results["ja"].as_ref().unwrap_err().kind(), TranslationErrorKind::Auth);
}
