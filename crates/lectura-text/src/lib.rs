//! lectura-text
//!
//! Turns a transcript into retrievable chunks and scores them lexically.
//! See `chunk` for the two chunking strategies and `score` for the
//! keyword pass that runs over every chunk in the index.

pub mod chunk;
pub mod score;
pub mod sentence;
