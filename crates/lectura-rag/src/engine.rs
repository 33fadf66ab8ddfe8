//! The engine owning index lifecycle and the query pipeline.
//!
//! One `RagEngine` per session/process. It holds the only live
//! [`IndexState`] behind an `RwLock<Option<Arc<..>>>`: queries clone the
//! `Arc` and drop the lock before any provider call, and a rebuild
//! assembles the replacement state completely off to the side before a
//! short write lock publishes it. Concurrent queries therefore observe
//! either the old index or the new one in full, never a partial build.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lectura_core::cache::{Operation, ResultCache};
use lectura_core::traits::{EmbedProvider, GenerateProvider};
use lectura_core::types::{
    text_preview, AnswerStatus, Chunk, ChunkRef, IndexStats, QueryResponse, SampleChunk, Segment,
};
use lectura_core::{Error, Result};
use lectura_text::chunk::{chunk_segments, chunk_windows, DEFAULT_TARGET_CHARS};
use lectura_text::score::keyword_scores;
use lectura_vector::VectorIndex;

use crate::rank;
use crate::synthesis;

const COLLECTION_ID: &str = "transcript_chunks";
const STATS_SAMPLE: usize = 5;

/// Pipeline tunables. Defaults match a cosine similarity mapped into
/// `[0, 1]`, where 0.5 is the "unrelated" midpoint — hence the gate at 0.6.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Semantic candidates fetched per query.
    pub top_k: usize,
    /// Evidence gate on the best combined score.
    pub score_threshold: f32,
    /// Target chunk size for segment grouping, in characters.
    pub target_chunk_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: 0.6,
            target_chunk_chars: DEFAULT_TARGET_CHARS,
        }
    }
}

/// The single live index: chunks in document order plus one vector per
/// chunk, under one collection id. Replaced wholesale on rebuild.
struct IndexState {
    collection_id: String,
    chunks: Vec<Chunk>,
    index: VectorIndex,
}

/// Payload memoized under the `rag_answer` tag. Stored and returned
/// verbatim on a hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAnswer {
    pub answer: String,
    pub status: AnswerStatus,
    pub top_chunks: Vec<ChunkRef>,
}

pub struct RagEngine {
    state: RwLock<Option<Arc<IndexState>>>,
    cache: Arc<ResultCache>,
    embedder: Box<dyn EmbedProvider>,
    generator: Box<dyn GenerateProvider>,
    config: EngineConfig,
}

impl RagEngine {
    pub fn new(
        embedder: Box<dyn EmbedProvider>,
        generator: Box<dyn GenerateProvider>,
        cache: Arc<ResultCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            state: RwLock::new(None),
            cache,
            embedder,
            generator,
            config,
        }
    }

    /// The shared result cache; its lifecycle is independent of the index.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn generator(&self) -> &dyn GenerateProvider {
        self.generator.as_ref()
    }

    /// Build (or rebuild) the index and return the chunk count.
    ///
    /// Segment chunking runs when `segments` is supplied and non-empty,
    /// window chunking otherwise. Any failure — validation or embedding —
    /// leaves the previous index untouched.
    pub fn build_index(
        &self,
        transcript_text: &str,
        segments: Option<&[Segment]>,
    ) -> Result<usize> {
        let chunks = match segments {
            Some(segments) if !segments.is_empty() => {
                chunk_segments(segments, self.config.target_chunk_chars)?
            }
            _ => {
                if transcript_text.trim().is_empty() {
                    return Err(Error::Validation("transcript text is empty".to_string()));
                }
                chunk_windows(transcript_text)?
            }
        };

        info!(chunk_count = chunks.len(), "embedding transcript chunks");
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Provider(format!(
                "expected {} embeddings, provider returned {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut index = VectorIndex::new(self.embedder.dim());
        for (chunk, vector) in chunks.iter().zip(embeddings) {
            index.insert(chunk.id.clone(), vector)?;
        }
        let next = Arc::new(IndexState {
            collection_id: COLLECTION_ID.to_string(),
            chunks,
            index,
        });
        let chunk_count = next.chunks.len();

        *self.write_state() = Some(next);
        info!(chunk_count, collection = COLLECTION_ID, "index swapped in");
        Ok(chunk_count)
    }

    /// Answer a question from the indexed transcript.
    ///
    /// Cache first: a hit returns the stored payload with `from_cache` set,
    /// even if the index was cleared since — cache and index lifecycles are
    /// independent. On a miss the full pipeline runs and the result is
    /// memoized, gated refusals included.
    pub fn query(&self, question: &str) -> Result<QueryResponse> {
        if question.trim().is_empty() {
            return Err(Error::Validation("question is empty".to_string()));
        }
        let started = Instant::now();

        if let Some(hit) = self.cache.get(Operation::RagAnswer, question) {
            // A payload that doesn't parse means someone else wrote under
            // our key; fall through and recompute.
            if let Ok(cached) = serde_json::from_value::<CachedAnswer>(hit) {
                debug!("rag answer served from cache");
                return Ok(QueryResponse {
                    answer: cached.answer,
                    status: cached.status,
                    elapsed_ms: elapsed_ms(started),
                    from_cache: true,
                    top_chunks: cached.top_chunks,
                });
            }
        }

        // Snapshot the index and release the lock before provider I/O.
        let state = self.read_state().clone().ok_or(Error::NotIndexed)?;
        debug!(
            collection = %state.collection_id,
            chunk_count = state.chunks.len(),
            "running retrieval"
        );

        let keyword = keyword_scores(question, &state.chunks);
        let question_vec = self
            .embedder
            .embed_batch(&[question.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::Provider("embedding provider returned no vector for the question".to_string())
            })?;
        let k = self.config.top_k.min(state.chunks.len());
        let hits = state.index.search(&question_vec, k)?;

        let chunks_by_id: HashMap<_, _> = state
            .chunks
            .iter()
            .map(|chunk| (chunk.id.clone(), chunk.clone()))
            .collect();
        let ranked = rank::fuse(&hits, &keyword, &chunks_by_id);

        let evidence = &ranked[..ranked.len().min(synthesis::CONTEXT_CHUNKS)];
        let top_chunks = synthesis::provenance(evidence);

        let (answer, status) = if rank::passes_gate(&ranked, self.config.score_threshold) {
            let answer = synthesis::synthesize(self.generator.as_ref(), question, evidence)?;
            (answer, AnswerStatus::Answered)
        } else {
            debug!(
                best = ranked.first().map(|s| s.combined_score),
                threshold = self.config.score_threshold,
                "evidence gate rejected the query"
            );
            (
                rank::not_found_answer(question).to_string(),
                AnswerStatus::InsufficientEvidence,
            )
        };

        let payload = CachedAnswer {
            answer: answer.clone(),
            status,
            top_chunks: top_chunks.clone(),
        };
        if let Ok(value) = serde_json::to_value(&payload) {
            self.cache.set(Operation::RagAnswer, question, value);
        }

        Ok(QueryResponse {
            answer,
            status,
            elapsed_ms: elapsed_ms(started),
            from_cache: false,
            top_chunks,
        })
    }

    /// Discard the index. Returns whether one was live. The result cache is
    /// deliberately not touched.
    pub fn clear_index(&self) -> bool {
        let was_indexed = self.write_state().take().is_some();
        info!(was_indexed, "index cleared");
        was_indexed
    }

    pub fn stats(&self) -> IndexStats {
        match self.read_state().as_ref() {
            None => IndexStats {
                indexed: false,
                chunk_count: 0,
                sample_chunks: None,
            },
            Some(state) => IndexStats {
                indexed: true,
                chunk_count: state.chunks.len(),
                sample_chunks: Some(
                    state
                        .chunks
                        .iter()
                        .take(STATS_SAMPLE)
                        .map(|chunk| SampleChunk {
                            chunk_id: chunk.id.clone(),
                            text_preview: text_preview(&chunk.text, synthesis::PREVIEW_CHARS),
                        })
                        .collect(),
                ),
            },
        }
    }

    /// Every chunk in the live index with its metadata, in document order.
    pub fn dump_chunks(&self) -> Vec<Chunk> {
        self.read_state()
            .as_ref()
            .map(|state| state.chunks.clone())
            .unwrap_or_default()
    }

    // Lock poisoning only signals a panicked writer; the swapped-in Arc is
    // still consistent, so keep serving it.
    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, Option<Arc<IndexState>>> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, Option<Arc<IndexState>>> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
