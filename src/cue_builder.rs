/*!
 * Conversion of transcript segments into display cues.
 *
 * Each segment is wrapped at word boundaries into lines no wider than the
 * configured width. When a segment needs more lines than a cue may hold it is
 * split into consecutive cues whose durations are proportional to the amount
 * of text each one carries.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::segment::{Segment, Transcript, Word};
use crate::style::StyleOptions;

/// Shortest duration a cue split out of a longer segment is given, in seconds
pub const MIN_CUE_DURATION: f64 = 0.5;

/// Timing of one word inside a cue, relative to the cue start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    /// Position of the word among the cue's whitespace separated words
    pub word_index: usize,
    pub start: f64,
    pub end: f64,
}

/// One display unit of a subtitle track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<Highlight>>,
}

impl Cue {
    /// The cue text with line breaks replaced by single spaces
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Number of whitespace separated words across all lines
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|line| line.split_whitespace().count()).sum()
    }
}

/// Builds the cue list for a whole transcript
pub fn build_cues(transcript: &Transcript, style: &StyleOptions) -> Result<Vec<Cue>, ValidationError> {
    style.validate()?;

    let mut cues = Vec::with_capacity(transcript.segments.len());
    let mut last_end = 0.0_f64;

    for segment in &transcript.segments {
        for mut cue in build_segment_cues(segment, style) {
            // Upstream segments may overlap by a few milliseconds
            if cue.start < last_end {
                let shift = last_end - cue.start;
                cue.start = last_end;
                if let Some(highlights) = cue.highlights.as_mut() {
                    for highlight in highlights.iter_mut() {
                        highlight.start = (highlight.start - shift).max(0.0);
                        highlight.end = (highlight.end - shift).max(highlight.start);
                    }
                }
            }
            if cue.end <= cue.start {
                cue.end = cue.start;
                warn!(
                    "Segment {} collapses to a zero-length cue, '{}' will not be shown",
                    segment.index,
                    cue.text()
                );
            }
            last_end = cue.end;
            cues.push(cue);
        }
    }

    debug!(
        "Built {} cues from {} segments (width {}, lines {})",
        cues.len(),
        transcript.segments.len(),
        style.max_line_width,
        style.max_line_count
    );

    Ok(cues)
}

/// Builds the cues for a single segment. Empty text yields no cue.
pub fn build_segment_cues(segment: &Segment, style: &StyleOptions) -> Vec<Cue> {
    let tokens: Vec<&str> = segment.text.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let width = style.max_line_width.max(1);
    let max_lines = style.max_line_count.max(1);

    let lines = wrap_greedy(&tokens, width);
    let chunks: Vec<Vec<String>> = lines
        .chunks(max_lines)
        .map(|chunk_lines| {
            let chunk_tokens: Vec<&str> = chunk_lines.iter().flatten().copied().collect();
            balance_lines(&chunk_tokens, width, chunk_lines.len())
                .into_iter()
                .map(|line| line.join(" "))
                .collect()
        })
        .collect();

    let weights: Vec<usize> = chunks
        .iter()
        .map(|chunk| chunk.iter().map(|line| char_len(line)).sum::<usize>() + chunk.len() - 1)
        .collect();
    let spans = apportion(segment.start, segment.end, &weights);

    let words = highlight_words_for(segment, style, tokens.len());

    let mut cues = Vec::with_capacity(chunks.len());
    let mut token_offset = 0;
    for (lines, (start, end)) in chunks.into_iter().zip(spans) {
        let token_count: usize = lines.iter().map(|line| line.split_whitespace().count()).sum();
        let highlights = words.as_ref().map(|words| {
            relative_highlights(&words[token_offset..token_offset + token_count], start, end)
        });
        token_offset += token_count;

        cues.push(Cue {
            start,
            end,
            lines,
            highlights,
        });
    }

    cues
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Greedy word wrap. A token wider than `width` sits alone on its own line.
fn wrap_greedy<'a>(tokens: &[&'a str], width: usize) -> Vec<Vec<&'a str>> {
    let mut lines: Vec<Vec<&'a str>> = Vec::new();
    let mut current: Vec<&'a str> = Vec::new();
    let mut current_len = 0;

    for &token in tokens {
        let token_len = char_len(token);
        if !current.is_empty() && current_len + 1 + token_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current.is_empty() {
            current_len = token_len;
        } else {
            current_len += 1 + token_len;
        }
        current.push(token);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Wraps `tokens` into `line_count` lines using the narrowest width that still fits,
/// which evens out line lengths.
fn balance_lines<'a>(tokens: &[&'a str], width: usize, line_count: usize) -> Vec<Vec<&'a str>> {
    if line_count <= 1 {
        return wrap_greedy(tokens, width);
    }

    let total: usize = tokens.iter().map(|token| char_len(token)).sum::<usize>() + tokens.len() - 1;
    let lower = total.div_ceil(line_count).clamp(1, width);

    for candidate in lower..=width {
        let lines = wrap_greedy(tokens, candidate);
        if lines.len() <= line_count {
            return lines;
        }
    }

    wrap_greedy(tokens, width)
}

/// Splits `[start, end]` into contiguous spans proportional to `weights`.
///
/// Every span gets at least `MIN_CUE_DURATION` when the segment is long enough
/// for all of them; otherwise the segment is divided evenly.
fn apportion(start: f64, end: f64, weights: &[usize]) -> Vec<(f64, f64)> {
    let count = weights.len();
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![(start, end.max(start))];
    }

    let total = (end - start).max(0.0);
    let durations = if total < MIN_CUE_DURATION * count as f64 {
        vec![total / count as f64; count]
    } else {
        floored_durations(total, weights)
    };

    let mut spans = Vec::with_capacity(count);
    let mut cursor = start;
    for (i, duration) in durations.into_iter().enumerate() {
        let span_end = if i + 1 == count {
            end.max(cursor)
        } else {
            (cursor + duration).min(end)
        };
        spans.push((cursor, span_end));
        cursor = span_end;
    }

    spans
}

fn floored_durations(total: f64, weights: &[usize]) -> Vec<f64> {
    let count = weights.len();
    let mut floored = vec![false; count];

    loop {
        let floored_count = floored.iter().filter(|&&f| f).count();
        let remaining = total - MIN_CUE_DURATION * floored_count as f64;
        let free_weight: usize = weights
            .iter()
            .zip(&floored)
            .filter(|(_, f)| !**f)
            .map(|(w, _)| *w)
            .sum();

        let durations: Vec<f64> = weights
            .iter()
            .zip(&floored)
            .map(|(&weight, &is_floored)| {
                if is_floored {
                    MIN_CUE_DURATION
                } else if free_weight == 0 {
                    remaining / (count - floored_count) as f64
                } else {
                    remaining * weight as f64 / free_weight as f64
                }
            })
            .collect();

        let mut changed = false;
        for (i, duration) in durations.iter().enumerate() {
            if !floored[i] && *duration < MIN_CUE_DURATION {
                floored[i] = true;
                changed = true;
            }
        }

        if !changed {
            return durations;
        }
    }
}

/// Clamped word timings for a segment, when highlighting applies to it
fn highlight_words_for(segment: &Segment, style: &StyleOptions, token_count: usize) -> Option<Vec<Word>> {
    if !style.highlight_words {
        return None;
    }

    let words = match segment.words.as_ref() {
        Some(words) if !words.is_empty() => words,
        _ => {
            debug!("Segment {} has no word timings, rendering without highlights", segment.index);
            return None;
        }
    };

    let timed: Vec<&Word> = words.iter().filter(|word| !word.text.trim().is_empty()).collect();
    if timed.len() != token_count {
        warn!(
            "Segment {} has {} timed words for {} text words, rendering without highlights",
            segment.index,
            timed.len(),
            token_count
        );
        return None;
    }

    let mut previous_start = segment.start;
    let clamped = timed
        .into_iter()
        .map(|word| {
            let start = word.start.clamp(segment.start, segment.end).max(previous_start);
            let end = word.end.clamp(segment.start, segment.end).max(start);
            previous_start = start;
            Word {
                text: word.text.clone(),
                start,
                end,
                probability: word.probability,
            }
        })
        .collect();

    Some(clamped)
}

fn relative_highlights(words: &[Word], cue_start: f64, cue_end: f64) -> Vec<Highlight> {
    let duration = (cue_end - cue_start).max(0.0);
    words
        .iter()
        .enumerate()
        .map(|(word_index, word)| {
            let start = (word.start - cue_start).clamp(0.0, duration);
            let end = (word.end - cue_start).clamp(start, duration);
            Highlight { word_index, start, end }
        })
        .collect()
}
