//! Exact nearest-neighbour search over chunk embeddings.

use lectura_core::types::ChunkId;
use lectura_core::{Error, Result};
use tracing::trace;

/// One nearest-neighbour result. `similarity` is cosine similarity mapped
/// from `[-1, 1]` into `[0, 1]`, so it fuses directly with keyword scores.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub id: ChunkId,
    pub similarity: f32,
}

/// In-memory vector index populated once per index build and queried once
/// per question. Insertion and query use the same metric (cosine).
#[derive(Debug)]
pub struct VectorIndex {
    dim: usize,
    ids: Vec<ChunkId>,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            ids: Vec::new(),
            vectors: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn insert(&mut self, id: ChunkId, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::Validation(format!(
                "embedding for '{id}' has dimension {}, index expects {}",
                vector.len(),
                self.dim
            )));
        }
        self.ids.push(id);
        self.vectors.push(vector);
        Ok(())
    }

    /// The `k` rows most similar to `query`, best first.
    ///
    /// Ties keep insertion order (the stable sort), so identical inputs
    /// always produce identical orderings.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<VectorHit>> {
        if query.len() != self.dim {
            return Err(Error::Validation(format!(
                "query vector has dimension {}, index expects {}",
                query.len(),
                self.dim
            )));
        }

        let mut hits: Vec<VectorHit> = self
            .ids
            .iter()
            .zip(&self.vectors)
            .map(|(id, vector)| VectorHit {
                id: id.clone(),
                similarity: normalize(cosine(query, vector)),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        trace!(k, returned = hits.len(), "vector search");
        Ok(hits)
    }
}

/// Cosine similarity in `[-1, 1]`; 0.0 when either vector is all zeros.
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Map cosine's known `[-1, 1]` range onto `[0, 1]`.
fn normalize(similarity: f32) -> f32 {
    ((similarity + 1.0) / 2.0).clamp(0.0, 1.0)
}
