//! lectura-rag
//!
//! The question-answering engine over a single indexed transcript.
//!
//! ```text
//! transcript -> chunker -> embedder -> vector index
//!                                          |
//! question -> keyword pass (all chunks)    |
//!          -> question embedding -> top-K -+
//!          -> fuse + evidence gate -> synthesizer -> answer
//! ```
//!
//! Every answer, translation and summary is memoized in the shared
//! [`lectura_core::cache::ResultCache`]; a repeat request never touches the
//! provider.

pub mod engine;
pub mod rank;
pub mod synthesis;
pub mod transform;

pub use engine::{EngineConfig, RagEngine};
