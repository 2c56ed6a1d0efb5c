/*!
 * Tests for ISO language code utilities
 */

use subgen::language_utils::{
    deepl_target_code, get_language_name, language_codes_match, normalize_target_language,
    normalize_to_part1_or_part2t, normalize_to_part2t, validate_language_code, LanguageCodeType,
};

/// Test detection of the code family
#[test]
fn test_validate_language_code_withVariousCodes_shouldDetectType() {
    assert_eq!(validate_language_code("en").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("deu").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B);
    assert!(validate_language_code("english").is_err());
}

/// Test normalization between code families
#[test]
fn test_normalize_withBibliographicCodes_shouldMapToTerminology() {
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("FR").unwrap(), "fra");
    assert_eq!(normalize_to_part1_or_part2t("chi").unwrap(), "zh");
}

/// Test the target forms the orchestrator accepts
#[test]
fn test_normalize_target_language_withUserInput_shouldProduceOrchestratorKeys() {
    assert_eq!(normalize_target_language(" DE ").unwrap(), "de");
    assert_eq!(normalize_target_language("spa").unwrap(), "es");
    assert_eq!(normalize_target_language("en-gb").unwrap(), "en-GB");
    assert!(normalize_target_language("klingon").is_err());
}

/// Test matching across families and regions
#[test]
fn test_language_codes_match_withEquivalentCodes_shouldMatch() {
    assert!(language_codes_match("es", "spa"));
    assert!(language_codes_match("en-US", "eng"));
    assert!(!language_codes_match("es", "pt"));
}

/// Test DeepL target codes
#[test]
fn test_deepl_target_code_withRegions_shouldUppercase() {
    assert_eq!(deepl_target_code("de"), "DE");
    assert_eq!(deepl_target_code("en-GB"), "EN-GB");
    assert_eq!(deepl_target_code("pt"), "PT-PT");
}

/// Test English names used in prompts
#[test]
fn test_get_language_name_withCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("spa").unwrap(), "Spanish");
}
