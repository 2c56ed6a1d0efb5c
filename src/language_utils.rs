use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// This module validates and normalizes the ISO 639-1 (2-letter) and
/// ISO 639-2 (3-letter) codes used for target languages, and maps them
/// to the codes translation providers expect.
/// Language code type
#[derive(Debug, PartialEq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2 code for a language that could not be determined
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(part2b, _)| *part2b == code)
        .map(|(_, part2t)| *part2t)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if part2b_to_part2t(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = part2b_to_part2t(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang.to_639_1().map(str::to_string).unwrap_or(part2t))
}

/// Normalize a requested target language such as `FR`, `fre` or `pt-br`.
///
/// The base language is reduced to ISO 639-1 where one exists and a region
/// suffix is kept in upper case (`pt-BR`).
pub fn normalize_target_language(code: &str) -> Result<String> {
    let trimmed = code.trim();
    let (base, region) = match trimmed.split_once(&['-', '_'][..]) {
        Some((base, region)) => (base, Some(region)),
        None => (trimmed, None),
    };

    let base = normalize_to_part1_or_part2t(base)?;
    match region {
        Some(region) if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) => {
            Ok(format!("{}-{}", base, region.to_uppercase()))
        }
        Some(region) => Err(anyhow!("Invalid region '{}' in language code: {}", region, code)),
        None => Ok(base),
    }
}

/// Source language to pass to a provider, reduced to ISO 639-1 where one exists.
///
/// Returns `None` for empty, undetermined (`und`) or unknown codes so providers
/// detect the language themselves.
pub fn source_language_hint(code: &str) -> Option<String> {
    let base = code.trim().split(&['-', '_'][..]).next().unwrap_or("");
    if base.is_empty() || base.eq_ignore_ascii_case(UNDETERMINED_LANGUAGE) {
        return None;
    }
    normalize_to_part1_or_part2t(base).ok()
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let base = |code: &str| code.split(&['-', '_'][..]).next().map(normalize_to_part2t);
    match (base(code1), base(code2)) {
        (Some(Ok(first)), Some(Ok(second))) => first == second,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Target language code in the form DeepL expects (`FR`, `EN-US`, `PT-BR`)
pub fn deepl_target_code(code: &str) -> String {
    let upper = code.trim().to_uppercase().replace('_', "-");
    match upper.as_str() {
        // DeepL requires a variant for these targets
        "EN" => "EN-US".to_string(),
        "PT" => "PT-PT".to_string(),
        _ => upper,
    }
}
