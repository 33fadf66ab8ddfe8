//! Transcript chunking strategies.
//!
//! Both strategies guarantee coverage (every input sentence/segment lands in
//! at least one chunk, no chunk is empty) and document-order ordinals
//! contiguous from 0. Which one runs is decided by data availability: timed
//! segments when the source had them, sentence windows otherwise.

use lectura_core::types::{Chunk, Segment};
use lectura_core::{Error, Result};
use tracing::debug;

use crate::sentence::split_sentences;

/// Sentences per window chunk.
pub const WINDOW_SENTENCES: usize = 5;
/// Window advance; `WINDOW_SENTENCES - WINDOW_STRIDE` sentences overlap, so
/// a concept split at one window boundary is whole in the next.
pub const WINDOW_STRIDE: usize = 3;
/// Default target size for segment grouping, in characters.
pub const DEFAULT_TARGET_CHARS: usize = 800;

/// Group consecutive timed segments into chunks of roughly `target_chars`.
///
/// Segments are never split: a chunk grows greedily until adding the next
/// segment would push it past the target. Each chunk inherits the `start`
/// of its first segment and the `end` of its last.
pub fn chunk_segments(segments: &[Segment], target_chars: usize) -> Result<Vec<Chunk>> {
    if segments.is_empty() {
        return Err(Error::Validation("no segments to chunk".to_string()));
    }

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut group: Vec<&Segment> = Vec::new();
    let mut group_chars = 0usize;

    for segment in segments {
        if segment.end < segment.start {
            return Err(Error::Validation(format!(
                "segment end {} precedes start {}",
                segment.end, segment.start
            )));
        }
        if segment.text.trim().is_empty() {
            return Err(Error::Validation("segment with empty text".to_string()));
        }
        if !group.is_empty() && group_chars + segment.text.len() + 1 > target_chars {
            chunks.push(flush_group(&group, chunks.len()));
            group.clear();
            group_chars = 0;
        }
        group_chars += segment.text.len() + 1;
        group.push(segment);
    }
    if !group.is_empty() {
        chunks.push(flush_group(&group, chunks.len()));
    }

    debug!(
        segment_count = segments.len(),
        chunk_count = chunks.len(),
        "grouped segments into chunks"
    );
    Ok(chunks)
}

fn flush_group(group: &[&Segment], ordinal: usize) -> Chunk {
    let text = group
        .iter()
        .map(|segment| segment.text.trim())
        .collect::<Vec<_>>()
        .join(" ");
    Chunk {
        id: format!("seg_{ordinal}"),
        text,
        start_time: Some(group[0].start),
        end_time: Some(group[group.len() - 1].end),
        ordinal,
    }
}

/// Overlapping sentence windows over plain text.
///
/// Windows hold [`WINDOW_SENTENCES`] sentences and advance by
/// [`WINDOW_STRIDE`], so consecutive chunks share two sentences. A
/// transcript with fewer sentences than one window yields exactly one
/// chunk containing everything.
pub fn chunk_windows(text: &str) -> Result<Vec<Chunk>> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return Err(Error::Validation("transcript has no sentences".to_string()));
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + WINDOW_SENTENCES).min(sentences.len());
        let ordinal = chunks.len();
        chunks.push(Chunk {
            id: format!("win_{ordinal}"),
            text: sentences[start..end].join(" "),
            start_time: None,
            end_time: None,
            ordinal,
        });
        start += WINDOW_STRIDE;
        if start >= sentences.len() {
            break;
        }
    }

    debug!(
        sentence_count = sentences.len(),
        chunk_count = chunks.len(),
        "windowed transcript into chunks"
    );
    Ok(chunks)
}
