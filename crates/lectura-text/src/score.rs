//! BM25-flavoured keyword scoring.
//!
//! This pass runs over every chunk in the index, not just the semantic
//! top-K, because a lexical match can live outside the embedding
//! neighbourhood. Each chunk's score is the IDF-weighted share of the
//! query's in-corpus terms it contains: rare terms are rewarded over
//! generic ones, and the result is an absolute value in `[0, 1]` that is
//! comparable across queries of different lengths. A chunk containing
//! every discriminating query term scores 1.0; zero lexical overlap scores
//! exactly 0.0, which tells the ranker to fall back to semantic-only
//! ordering.

use std::collections::{HashMap, HashSet};

use lectura_core::types::{Chunk, ChunkId};

/// Lowercase alphanumeric tokens, in input order.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Score every chunk against `query`, returning `chunk.id -> [0, 1]`.
///
/// Pure and deterministic: identical inputs always produce identical
/// scores. Query terms that appear nowhere in the candidate set cannot
/// discriminate between chunks and are ignored entirely.
pub fn keyword_scores(query: &str, chunks: &[Chunk]) -> HashMap<ChunkId, f32> {
    let mut query_terms = tokenize(query);
    query_terms.sort();
    query_terms.dedup();

    if query_terms.is_empty() || chunks.is_empty() {
        return chunks.iter().map(|c| (c.id.clone(), 0.0)).collect();
    }

    let docs: Vec<HashSet<String>> = chunks
        .iter()
        .map(|c| tokenize(&c.text).into_iter().collect())
        .collect();
    let doc_count = chunks.len() as f32;

    // BM25 IDF per query term; df == 0 terms are dropped from both sides
    // of the fraction.
    let weighted: Vec<(&str, f32)> = query_terms
        .iter()
        .filter_map(|term| {
            let df = docs.iter().filter(|doc| doc.contains(term)).count() as f32;
            if df == 0.0 {
                None
            } else {
                let idf = ((doc_count - df + 0.5) / (df + 0.5) + 1.0).ln();
                Some((term.as_str(), idf))
            }
        })
        .collect();
    let total_idf: f32 = weighted.iter().map(|(_, idf)| idf).sum();

    chunks
        .iter()
        .zip(&docs)
        .map(|(chunk, doc)| {
            let score = if total_idf > 0.0 {
                let matched: f32 = weighted
                    .iter()
                    .filter(|(term, _)| doc.contains(*term))
                    .map(|(_, idf)| idf)
                    .sum();
                matched / total_idf
            } else {
                0.0
            };
            (chunk.id.clone(), score)
        })
        .collect()
}
