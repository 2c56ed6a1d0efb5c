/*!
 * Tests for WebVTT rendering of built cues
 */

use subgen::cue_builder::build_cues;
use subgen::segment::Transcript;
use subgen::style::StyleOptions;
use subgen::track_renderer::{format_timestamp, render, render_to_bytes};
use crate::common;

fn quick_fox_track(with_words: bool, highlight: bool) -> String {
    let mut segment = common::quick_fox_segment();
    if with_words {
        segment = segment.with_words(Some(common::quick_fox_words()));
    }
    let transcript = Transcript::new(vec![segment], "en", 3.2);
    let cues = build_cues(&transcript, &StyleOptions::new(15, 2, highlight)).unwrap();
    String::from_utf8(render_to_bytes(&cues)).unwrap()
}

/// Test the full track layout for the two-line scenario
#[test]
fn test_render_withQuickFox_shouldProduceExactTrack() {
    let expected = "WEBVTT\n\n\
00:00:00.000 --> 00:00:02.286\nthe quick brown\nfox jumps over\n\n\
00:00:02.286 --> 00:00:03.200\nthe lazy dog\n\n";

    assert_eq!(quick_fox_track(false, false), expected);
}

/// Test one inline marker per word, in time order
#[test]
fn test_render_withWordHighlights_shouldEmitOneMarkerPerWordInOrder() {
    let track = quick_fox_track(true, true);

    assert_eq!(track.matches("<c>").count(), 9);
    assert_eq!(track.matches("</c>").count(), 9);
    assert!(track.contains("<00:00:00.000><c>the</c> <00:00:00.300><c>quick</c>"));

    let mut markers = Vec::new();
    let mut rest = track.as_str();
    while let Some(open) = rest.find("><c>") {
        let tag_start = rest[..open].rfind('<').unwrap();
        markers.push(rest[tag_start + 1..open].to_string());
        rest = &rest[open + 4..];
    }
    assert_eq!(markers.len(), 9);
    let mut sorted = markers.clone();
    sorted.sort();
    assert_eq!(markers, sorted);
}

/// Test that highlighting without word timings degrades to the plain track
#[test]
fn test_render_withHighlightButNoWords_shouldRenderPlainTrack() {
    assert_eq!(quick_fox_track(false, true), quick_fox_track(false, false));
}

/// Test that rendering is a pure function of the cues
#[test]
fn test_render_withSameCues_shouldBeIdempotent() {
    let cues = build_cues(&common::sample_transcript(), &StyleOptions::default()).unwrap();

    let mut first = Vec::new();
    let mut second = Vec::new();
    render(&cues, &mut first).unwrap();
    render(&cues, &mut second).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, render_to_bytes(&cues));
}

/// Test that an empty cue list is still a valid track
#[test]
fn test_render_withNoCues_shouldWriteHeaderOnly() {
    assert_eq!(render_to_bytes(&[]), b"WEBVTT\n\n");
}

/// Test timestamp formatting at hour and rounding boundaries
#[test]
fn test_format_timestamp_withBoundaries_shouldStayConsistent() {
    assert_eq!(format_timestamp(3_599.9996), "01:00:00.000");
    assert_eq!(format_timestamp(0.0006), "00:00:00.001");
    assert_eq!(format_timestamp(61.25), "00:01:01.250");
}
