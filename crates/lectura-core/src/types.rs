//! Domain types shared by the chunking, ranking and answering layers.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// One timed segment from an ASR or subtitle source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// A contiguous span of transcript text treated as one retrievable unit.
///
/// - `id`: unique within the live index (`seg_N` / `win_N`)
/// - `start_time`/`end_time`: present only for segment-derived chunks;
///   absence means "derived from non-timed chunking", not "zero"
/// - `ordinal`: position in document order, contiguous from 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    pub ordinal: usize,
}

/// A chunk with the per-query relevance signals attached.
///
/// All three scores live in `[0, 1]`. Derived during ranking, never
/// persisted.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub keyword_score: f32,
    pub semantic_score: f32,
    pub combined_score: f32,
}

/// Provenance entry returned alongside an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRef {
    pub chunk_id: ChunkId,
    pub score: f32,
    pub text_preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

/// How a query concluded. `InsufficientEvidence` is a successful response
/// produced by the evidence gate, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Answered,
    InsufficientEvidence,
}

/// Response for a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub status: AnswerStatus,
    pub elapsed_ms: u64,
    pub from_cache: bool,
    pub top_chunks: Vec<ChunkRef>,
}

/// Introspection summary of the live index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub indexed: bool,
    pub chunk_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_chunks: Option<Vec<SampleChunk>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleChunk {
    pub chunk_id: ChunkId,
    pub text_preview: String,
}

/// First `max` characters of `text`, with an ellipsis when truncated.
/// Operates on characters, not bytes, so multi-byte scripts stay intact.
pub fn text_preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut preview: String = text.chars().take(max).collect();
        preview.push_str("...");
        preview
    }
}
