use std::fmt;
use std::io::Write;

use crate::cue_builder::{Cue, Highlight};
use crate::errors::RenderError;

// @module: WebVTT track serialization

/// First line of every rendered track
pub const WEBVTT_HEADER: &str = "WEBVTT";

/// Format seconds as a WebVTT timestamp (HH:MM:SS.mmm).
///
/// The value is rounded once to whole milliseconds and every field is derived
/// from that integer, so 1.9996 renders as 00:00:02.000, never 00:00:01.1000.
/// Negative and NaN inputs render as zero.
pub fn format_timestamp(seconds: f64) -> String {
    let ms = to_millis(seconds);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

fn to_millis(seconds: f64) -> u64 {
    let seconds = seconds.max(0.0);
    (seconds * 1000.0).round() as u64
}

/// Escape the characters WebVTT reserves in cue payloads
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {}", format_timestamp(self.start), format_timestamp(self.end))?;

        match &self.highlights {
            Some(highlights) => {
                let mut by_word: Vec<Option<&Highlight>> = vec![None; self.word_count()];
                for highlight in highlights {
                    if let Some(slot) = by_word.get_mut(highlight.word_index) {
                        *slot = Some(highlight);
                    }
                }

                let mut word_index = 0;
                for line in &self.lines {
                    let words: Vec<String> = line
                        .split_whitespace()
                        .map(|word| {
                            let rendered = match by_word[word_index] {
                                Some(highlight) => format!(
                                    "<{}><c>{}</c>",
                                    format_timestamp(self.start + highlight.start),
                                    escape_text(word)
                                ),
                                None => escape_text(word),
                            };
                            word_index += 1;
                            rendered
                        })
                        .collect();
                    writeln!(f, "{}", words.join(" "))?;
                }
            }
            None => {
                for line in &self.lines {
                    writeln!(f, "{}", escape_text(line))?;
                }
            }
        }

        writeln!(f)
    }
}

/// Write a complete WebVTT track for `cues` into `output`
pub fn render<W: Write>(cues: &[Cue], output: &mut W) -> Result<(), RenderError> {
    write!(output, "{}\n\n", WEBVTT_HEADER)?;
    for cue in cues {
        write!(output, "{}", cue)?;
    }
    output.flush()?;
    Ok(())
}

/// Render a track into an in-memory buffer
pub fn render_to_bytes(cues: &[Cue]) -> Vec<u8> {
    let mut track = format!("{}\n\n", WEBVTT_HEADER);
    for cue in cues {
        track.push_str(&cue.to_string());
    }
    track.into_bytes()
}
