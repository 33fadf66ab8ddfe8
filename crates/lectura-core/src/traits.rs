//! Capability traits for the external model provider.
//!
//! Implementations may call a remote API (see `lectura-gemini`); tests
//! substitute deterministic stubs so nothing in the pipeline needs network
//! access. Provider calls are potentially slow blocking I/O and must never
//! be made while holding a lock on engine state.

use crate::error::Result;

pub trait EmbedProvider: Send + Sync {
    /// Embedding dimensionality (D). Every vector returned by
    /// `embed_batch` has exactly this length.
    fn dim(&self) -> usize;
    /// Compute embeddings for a batch of input texts, one vector per text,
    /// in input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

pub trait GenerateProvider: Send + Sync {
    /// Produce a completion for the full prompt.
    fn generate(&self, prompt: &str) -> Result<String>;
}
