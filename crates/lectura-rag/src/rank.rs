//! Score fusion and the evidence gate.
//!
//! The gate is what enforces "no outside knowledge": when even the best
//! fused score is weak, the engine returns a canned refusal instead of
//! letting the generator improvise.

use std::cmp::Ordering;
use std::collections::HashMap;

use lectura_core::types::{Chunk, ChunkId, ScoredChunk};
use lectura_vector::VectorHit;

pub const KEYWORD_WEIGHT: f32 = 0.4;
pub const SEMANTIC_WEIGHT: f32 = 0.6;

const NOT_FOUND_EN: &str = "I can only answer questions based on this transcript. \
     I couldn't find relevant information to answer your question.";
const NOT_FOUND_MM: &str =
    "ဤမှတ်တမ်းအပေါ် အခြေခံ၍သာ မေးခွန်းများကို ဖြေဆိုနိုင်ပါသည်။ \
     သင့်မေးခွန်းအတွက် သက်ဆိုင်သောအချက်အလက်များ ရှာမတွေ့ပါ။";

/// Fuse the all-chunks keyword pass with the semantic top-K.
///
/// Candidates are the semantic hits; each picks up its keyword score from
/// `keyword` (0.0 when the scorer saw nothing). If *every* keyword score is
/// exactly zero — a fully paraphrased question — the semantic score stands
/// alone rather than being capped at its 0.6 weight.
///
/// Sorted descending by combined score; ties go to the lower ordinal so the
/// ordering is reproducible.
pub fn fuse(
    hits: &[VectorHit],
    keyword: &HashMap<ChunkId, f32>,
    chunks_by_id: &HashMap<ChunkId, Chunk>,
) -> Vec<ScoredChunk> {
    let keyword_silent = keyword.values().all(|&score| score == 0.0);

    let mut ranked: Vec<ScoredChunk> = hits
        .iter()
        .filter_map(|hit| {
            let chunk = chunks_by_id.get(&hit.id)?.clone();
            let keyword_score = keyword.get(&hit.id).copied().unwrap_or(0.0);
            let combined_score = if keyword_silent {
                hit.similarity
            } else {
                KEYWORD_WEIGHT * keyword_score + SEMANTIC_WEIGHT * hit.similarity
            };
            Some(ScoredChunk {
                chunk,
                keyword_score,
                semantic_score: hit.similarity,
                combined_score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(Ordering::Equal)
            .then(a.chunk.ordinal.cmp(&b.chunk.ordinal))
    });
    ranked
}

/// True when the best fused score clears `threshold` and synthesis may run.
pub fn passes_gate(ranked: &[ScoredChunk], threshold: f32) -> bool {
    ranked
        .first()
        .map_or(false, |best| best.combined_score >= threshold)
}

/// Canned refusal, localized to the question's script.
pub fn not_found_answer(question: &str) -> &'static str {
    if contains_burmese(question) {
        NOT_FOUND_MM
    } else {
        NOT_FOUND_EN
    }
}

fn contains_burmese(text: &str) -> bool {
    text.chars().any(|c| ('\u{1000}'..='\u{109F}').contains(&c))
}
