/*!
 * Tests for laying transcript segments out as cues
 */

use subgen::cue_builder::{build_cues, build_segment_cues, MIN_CUE_DURATION};
use subgen::segment::{Segment, Transcript};
use subgen::style::StyleOptions;
use crate::common;

fn transcript_of(segments: Vec<Segment>) -> Transcript {
    let duration = segments.last().map(|s| s.end).unwrap_or(0.0);
    Transcript::new(segments, "en", duration)
}

/// Test the two-line wrapping scenario
#[test]
fn test_build_cues_withQuickFoxAtWidth15_shouldWrapIntoTwoLineCue() {
    let style = StyleOptions::new(15, 2, false);
    let cues = build_cues(&transcript_of(vec![common::quick_fox_segment()]), &style).unwrap();

    assert_eq!(cues[0].lines, vec!["the quick brown", "fox jumps over"]);
    for cue in &cues {
        assert!(cue.lines.len() <= 2);
        assert!(cue.lines.iter().all(|line| line.chars().count() <= 15));
    }

    let combined: Vec<String> = cues.iter().map(|cue| cue.text()).collect();
    assert_eq!(combined.join(" "), "the quick brown fox jumps over the lazy dog");
}

/// Test that the split cues share the segment span by text length
#[test]
fn test_build_cues_withSplitSegment_shouldApportionByCharacters() {
    let style = StyleOptions::new(15, 2, false);
    let cues = build_cues(&transcript_of(vec![common::quick_fox_segment()]), &style).unwrap();

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].start, 0.0);
    // 30 of 42 weighted characters
    assert!((cues[0].end - 3.2 * 30.0 / 42.0).abs() < 1e-9);
    assert_eq!(cues[1].start, cues[0].end);
    assert_eq!(cues[1].end, 3.2);
}

/// Test that a segment that fits yields exactly one cue with its full span
#[test]
fn test_build_cues_withShortSegment_shouldYieldOneCue() {
    let cues = build_cues(&common::sample_transcript(), &StyleOptions::default()).unwrap();

    assert_eq!(cues.len(), 3);
    assert_eq!(cues[1].lines, vec!["Welcome to the show."]);
    assert_eq!((cues[1].start, cues[1].end), (2.0, 4.5));
}

/// Test that three greedy lines of unequal length are rebalanced
#[test]
fn test_build_cues_withRaggedWrap_shouldBalanceLines() {
    // Greedy wrapping gives "I think we should go" / "home now"
    let segment = Segment::new(0, 0.0, 4.0, "I think we should go home now");
    let cues = build_segment_cues(&segment, &StyleOptions::new(24, 2, false));

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].lines, vec!["I think we should", "go home now"]);
    assert_eq!(cues[0].text(), segment.text);
}

/// Test that a word wider than the line width is kept whole
#[test]
fn test_build_segment_cues_withOverlongWord_shouldKeepWordUnbroken() {
    let segment = Segment::new(0, 0.0, 2.0, "see pneumonoultramicroscopicsilicovolcanoconiosis now");
    let cues = build_segment_cues(&segment, &StyleOptions::new(10, 3, false));

    let lines: Vec<&String> = cues.iter().flat_map(|cue| &cue.lines).collect();
    assert!(lines.iter().any(|line| *line == "pneumonoultramicroscopicsilicovolcanoconiosis"));
}

/// Test that blank segments produce no cue
#[test]
fn test_build_cues_withBlankText_shouldSkipSegment() {
    let segments = vec![
        Segment::new(0, 0.0, 1.0, "   "),
        Segment::new(1, 1.0, 2.0, " Hi."),
    ];
    let cues = build_cues(&transcript_of(segments), &StyleOptions::default()).unwrap();

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].lines, vec!["Hi."]);
}

/// Test the minimum duration floor for split cues
#[test]
fn test_build_segment_cues_withTinyTail_shouldFloorDuration() {
    // One long line and a two letter tail in the second cue
    let segment = Segment::new(0, 0.0, 2.0, "abcdefghijklmnopqrstuvwxyz abcdefghijklmnopqrstuvwxyz ab");
    let cues = build_segment_cues(&segment, &StyleOptions::new(26, 1, false));

    assert_eq!(cues.len(), 3);
    assert!(cues.iter().all(|cue| cue.duration() >= MIN_CUE_DURATION - 1e-9));
    assert_eq!(cues.last().unwrap().end, 2.0);
}

/// Test that a too-short segment is split evenly and never overruns
#[test]
fn test_build_segment_cues_withVeryShortSegment_shouldSplitEvenly() {
    let segment = Segment::new(0, 1.0, 1.6, "one two three");
    let cues = build_segment_cues(&segment, &StyleOptions::new(5, 1, false));

    assert_eq!(cues.len(), 3);
    for cue in &cues {
        assert!((cue.duration() - 0.2).abs() < 1e-9);
    }
    assert_eq!(cues[2].end, 1.6);
}

/// Test that overlapping segments produce non-overlapping cues
#[test]
fn test_build_cues_withOverlappingSegments_shouldNotOverlap() {
    let segments = vec![
        Segment::new(0, 0.0, 2.05, " First line."),
        Segment::new(1, 2.0, 4.0, " Second line."),
    ];
    let cues = build_cues(&transcript_of(segments), &StyleOptions::default()).unwrap();

    assert_eq!(cues[1].start, 2.05);
    for pair in cues.windows(2) {
        assert!(pair[0].end <= pair[1].start);
        assert!(pair[0].start <= pair[0].end);
    }
}

/// Test that a segment nested in the previous one keeps its text in a zero-length cue
#[test]
fn test_build_cues_withNestedSegment_shouldCollapseToZeroLength() {
    let segments = vec![
        Segment::new(0, 0.0, 4.0, "the outer line"),
        Segment::new(1, 1.0, 2.0, "inside"),
    ];

    let cues = build_cues(&transcript_of(segments), &StyleOptions::default()).unwrap();

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[1].lines, vec!["inside".to_string()]);
    assert_eq!(cues[1].start, 4.0);
    assert_eq!(cues[1].end, 4.0);
}

/// Test highlight attachment with word timings present
#[test]
fn test_build_cues_withHighlightWords_shouldAttachRelativeTimings() {
    let segment = common::quick_fox_segment().with_words(Some(common::quick_fox_words()));
    let cues = build_cues(&transcript_of(vec![segment]), &StyleOptions::new(15, 2, true)).unwrap();

    let first = cues[0].highlights.as_ref().unwrap();
    assert_eq!(first.len(), cues[0].word_count());
    assert_eq!(first[0].word_index, 0);
    assert_eq!(first[1].start, 0.3);

    let second = cues[1].highlights.as_ref().unwrap();
    assert_eq!(second.len(), 3);
    // "the" is spoken before the second cue starts, so it clamps to the cue start
    assert_eq!(second[0].start, 0.0);
    assert!((second[2].start - (2.4 - cues[1].start)).abs() < 1e-9);
    for pair in second.windows(2) {
        assert!(pair[0].start <= pair[1].start);
    }
}

/// Test that missing word timings degrade to plain cues
#[test]
fn test_build_cues_withHighlightButNoWords_shouldRenderPlain() {
    let cues = build_cues(&transcript_of(vec![common::quick_fox_segment()]), &StyleOptions::new(15, 2, true)).unwrap();

    assert!(cues.iter().all(|cue| cue.highlights.is_none()));
}

/// Test that a word count mismatch drops highlights for that segment only
#[test]
fn test_build_cues_withMismatchedWords_shouldDropHighlights() {
    let mut words = common::quick_fox_words();
    words.pop();
    let segment = common::quick_fox_segment().with_words(Some(words));
    let cues = build_cues(&transcript_of(vec![segment]), &StyleOptions::new(15, 2, true)).unwrap();

    assert!(cues.iter().all(|cue| cue.highlights.is_none()));
}

/// Test that invalid style is rejected before any work
#[test]
fn test_build_cues_withInvalidStyle_shouldFail() {
    assert!(build_cues(&common::sample_transcript(), &StyleOptions::new(0, 2, false)).is_err());
}

/// Test the machine-readable cue list form
#[test]
fn test_cues_json_withoutHighlights_shouldOmitField() {
    let cues = build_cues(&common::sample_transcript(), &StyleOptions::default()).unwrap();
    let json = serde_json::to_value(&cues).unwrap();

    assert_eq!(json[0]["lines"][0], "Hello everyone.");
    assert!(json[0].get("highlights").is_none());
}
