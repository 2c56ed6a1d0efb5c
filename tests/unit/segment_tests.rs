/*!
 * Tests for the transcript data model
 */

use subgen::errors::ValidationError;
use subgen::segment::{Segment, Transcript, TranscriptionInfo, Word};
use crate::common;

/// Test that full_text is the concatenation of segment texts
#[test]
fn test_transcript_new_withSegments_shouldConcatenateText() {
    let transcript = common::sample_transcript();

    assert_eq!(transcript.full_text, " Hello everyone. Welcome to the show. Let's begin.");
    assert_eq!(transcript.language, "en");
    assert!(!transcript.is_empty());
}

/// Test that engine output keeps the reported language and duration
#[test]
fn test_from_engine_output_withInfo_shouldCarryLanguageAndDuration() {
    let info = TranscriptionInfo { language: "de".to_string(), duration: 12.5 };
    let transcript = Transcript::from_engine_output(common::sample_segments(), info);

    assert_eq!(transcript.language, "de");
    assert_eq!(transcript.duration, 12.5);
    assert_eq!(transcript.segments.len(), 3);
}

/// Test that with_text replaces only the text
#[test]
fn test_with_text_withNewText_shouldLeaveSourceUntouched() {
    let mut original = common::sample_segments().remove(2);
    original.temperature = 0.4;
    original.avg_logprob = -0.3;

    let translated = original.with_text(" Commençons.");

    assert_eq!(original.text, " Let's begin.");
    assert_eq!(translated.text, " Commençons.");
    assert_eq!(translated.index, original.index);
    assert_eq!(translated.start, original.start);
    assert_eq!(translated.end, original.end);
    assert_eq!(translated.words, original.words);
    assert_eq!(translated.temperature, 0.4);
    assert_eq!(translated.avg_logprob, -0.3);
}

/// Test that a word keeps its timing when its text is replaced
#[test]
fn test_word_with_text_withNewText_shouldKeepTiming() {
    let word = Word::new(" begin.", 5.1, 6.0, 0.97);
    let translated = word.with_text(" commencer.");

    assert_eq!(translated.start, 5.1);
    assert_eq!(translated.end, 6.0);
    assert_eq!(translated.probability, 0.97);
}

/// Test transcript validation
#[test]
fn test_validate_withBrokenSegments_shouldReportOffendingSegment() {
    assert!(common::sample_transcript().validate().is_ok());

    let reversed = Transcript::new(vec![Segment::new(0, 2.0, 1.0, "x")], "en", 2.0);
    assert!(matches!(reversed.validate(), Err(ValidationError::InvalidSegment { index: 0, .. })));

    let negative = Transcript::new(vec![Segment::new(0, -1.0, 1.0, "x")], "en", 1.0);
    assert!(negative.validate().is_err());

    let not_finite = Transcript::new(vec![Segment::new(0, 0.0, f64::NAN, "x")], "en", 1.0);
    assert!(not_finite.validate().is_err());

    let repeated = Transcript::new(
        vec![Segment::new(3, 0.0, 1.0, "a"), Segment::new(3, 1.0, 2.0, "b")],
        "en",
        2.0,
    );
    assert!(matches!(repeated.validate(), Err(ValidationError::InvalidSegment { index: 3, .. })));
}

/// Test that transcripts deserialize from the engine-style JSON layout
#[test]
fn test_transcript_json_withMissingOptionalFields_shouldUseDefaults() {
    let json = r#"{
        "segments": [{"index": 0, "start": 0.0, "end": 1.0, "text": " Hi."}],
        "full_text": " Hi.",
        "language": "en",
        "duration": 1.0
    }"#;

    let transcript: Transcript = serde_json::from_str(json).unwrap();
    let segment = &transcript.segments[0];

    assert!(segment.words.is_none());
    assert!(!segment.has_words());
    assert_eq!(segment.temperature, 0.0);
    assert_eq!(segment.duration(), 1.0);
}
