use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ValidationError;

// @module: Per-track subtitle style constraints

const KNOWN_OPTIONS: [&str; 3] = ["max_line_width", "max_line_count", "highlight_words"];

/// Layout limits applied when building cues for one track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleOptions {
    /// Maximum characters per line
    #[serde(default = "default_max_line_width")]
    pub max_line_width: usize,

    /// Maximum lines per cue
    #[serde(default = "default_max_line_count")]
    pub max_line_count: usize,

    /// Whether to attach per-word highlight timing
    #[serde(default)]
    pub highlight_words: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            max_line_width: default_max_line_width(),
            max_line_count: default_max_line_count(),
            highlight_words: false,
        }
    }
}

fn default_max_line_width() -> usize {
    28
}

fn default_max_line_count() -> usize {
    3
}

impl StyleOptions {
    pub fn new(max_line_width: usize, max_line_count: usize, highlight_words: bool) -> Self {
        Self {
            max_line_width,
            max_line_count,
            highlight_words,
        }
    }

    /// Builds options from a loosely typed JSON object.
    ///
    /// Absent keys fall back to defaults. Unknown keys, wrong types and
    /// non-positive limits are rejected.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            Value::Null => Ok(Self::default()),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        if let Some(unknown) = map.keys().find(|key| !KNOWN_OPTIONS.contains(&key.as_str())) {
            return Err(ValidationError::UnknownOption(unknown.clone()));
        }

        let mut options = Self::default();

        if let Some(value) = map.get("max_line_width") {
            options.max_line_width = positive_limit("max_line_width", value)?;
        }
        if let Some(value) = map.get("max_line_count") {
            options.max_line_count = positive_limit("max_line_count", value)?;
        }
        if let Some(value) = map.get("highlight_words") {
            options.highlight_words = value.as_bool().ok_or(ValidationError::InvalidType {
                option: "highlight_words".to_string(),
                expected: "a boolean",
            })?;
        }

        Ok(options)
    }

    /// Checks that both limits are strictly positive
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_line_width == 0 {
            return Err(ValidationError::NonPositive {
                option: "max_line_width".to_string(),
                value: "0".to_string(),
            });
        }
        if self.max_line_count == 0 {
            return Err(ValidationError::NonPositive {
                option: "max_line_count".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn positive_limit(option: &str, value: &Value) -> Result<usize, ValidationError> {
    if let Some(number) = value.as_u64() {
        if number == 0 {
            return Err(ValidationError::NonPositive {
                option: option.to_string(),
                value: value.to_string(),
            });
        }
        return Ok(number as usize);
    }

    // Negative integers and fractional numbers both land here
    if value.is_number() {
        return Err(ValidationError::NonPositive {
            option: option.to_string(),
            value: value.to_string(),
        });
    }

    Err(ValidationError::InvalidType {
        option: option.to_string(),
        expected: "a positive integer",
    })
}
