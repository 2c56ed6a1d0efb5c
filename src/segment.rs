use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

// @module: Transcript data model

/// A single recognized word with its own timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub probability: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64, probability: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            probability,
        }
    }

    /// Returns a copy of this word with only its text replaced
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

/// One contiguous unit of recognized speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Word>>,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub avg_logprob: f64,
}

impl Segment {
    /// Creates a segment without word timings
    pub fn new(index: usize, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            index,
            start,
            end,
            text: text.into(),
            words: None,
            temperature: 0.0,
            avg_logprob: 0.0,
        }
    }

    /// Returns a copy of this segment with only its text replaced.
    ///
    /// Timing, index, decoding statistics and word timings are carried over untouched.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Returns a copy of this segment with its word list replaced
    pub fn with_words(&self, words: Option<Vec<Word>>) -> Self {
        Self {
            words,
            ..self.clone()
        }
    }

    /// Segment duration in seconds, never negative
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Whether the segment carries at least one timed word
    pub fn has_words(&self) -> bool {
        self.words.as_ref().is_some_and(|words| !words.is_empty())
    }
}

/// Language and duration reported by the speech engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionInfo {
    pub language: String,
    pub duration: f64,
}

/// An ordered sequence of segments for one audio input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<Segment>,
    pub full_text: String,
    pub language: String,
    pub duration: f64,
}

impl Transcript {
    /// Builds a transcript, deriving `full_text` from the segment texts
    pub fn new(segments: Vec<Segment>, language: impl Into<String>, duration: f64) -> Self {
        let full_text = Self::concat_text(&segments);
        Self {
            segments,
            full_text,
            language: language.into(),
            duration,
        }
    }

    /// Builds a transcript from engine output
    pub fn from_engine_output(segments: Vec<Segment>, info: TranscriptionInfo) -> Self {
        Self::new(segments, info.language, info.duration)
    }

    /// Returns a new transcript in another language with the given segments.
    ///
    /// `full_text` is recomputed; the duration is carried over.
    pub fn with_segments(&self, segments: Vec<Segment>, language: impl Into<String>) -> Self {
        Self::new(segments, language, self.duration)
    }

    fn concat_text(segments: &[Segment]) -> String {
        segments.iter().map(|segment| segment.text.as_str()).collect()
    }

    /// Checks timing and ordering invariants of every segment
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut previous_index: Option<usize> = None;

        for segment in &self.segments {
            if !segment.start.is_finite() || !segment.end.is_finite() {
                return Err(ValidationError::InvalidSegment {
                    index: segment.index,
                    reason: "non-finite timestamp".to_string(),
                });
            }

            if segment.start < 0.0 || segment.start > segment.end {
                return Err(ValidationError::InvalidSegment {
                    index: segment.index,
                    reason: format!("invalid time range {} -> {}", segment.start, segment.end),
                });
            }

            if let Some(previous) = previous_index {
                if segment.index <= previous {
                    return Err(ValidationError::InvalidSegment {
                        index: segment.index,
                        reason: format!("index not increasing after {}", previous),
                    });
                }
            }
            previous_index = Some(segment.index);
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
