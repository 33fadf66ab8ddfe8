//! lectura-vector
//!
//! Brute-force in-memory vector index. One transcript's worth of chunks is
//! a few hundred rows at most, so exact cosine scan beats any ANN structure
//! here. See `index`.

pub mod index;

pub use index::{VectorHit, VectorIndex};
