//! In-memory memoization of text-transformation results.
//!
//! Every expensive operation (translation, summaries, RAG answers) is keyed
//! by a SHA-256 fingerprint of `(operation_tag, input_text)`, so a repeat
//! request is served verbatim without recomputation. The map is unbounded
//! and lives for the process lifetime; eviction and TTL are out of scope
//! for now.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;
use tracing::debug;

/// Operation namespace for cache keys. The tag participates in the hash,
/// so identical texts under different operations never share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Translation,
    SummaryEn,
    SummaryMm,
    RagAnswer,
}

impl Operation {
    pub fn tag(self) -> &'static str {
        match self {
            Operation::Translation => "translation",
            Operation::SummaryEn => "summary_en",
            Operation::SummaryMm => "summary_mm",
            Operation::RagAnswer => "rag_answer",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub created_at: SystemTime,
}

/// Process-wide result cache. Construct one per session and share it by
/// reference; avoid ambient globals so tests can run isolated instances.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hex SHA-256 fingerprint of `tag + ":" + trimmed_text`.
    pub fn key(operation: Operation, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(operation.tag().as_bytes());
        hasher.update(b":");
        hasher.update(text.trim().as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    /// Stored value for `(operation, text)`, if any. A hit returns the
    /// payload exactly as it was written.
    pub fn get(&self, operation: Operation, text: &str) -> Option<Value> {
        let key = Self::key(operation, text);
        let hit = self.read().get(&key).map(|entry| entry.value.clone());
        debug!(tag = operation.tag(), key = %key, hit = hit.is_some(), "cache lookup");
        hit
    }

    /// Store the result for `(operation, text)`, overwriting any previous
    /// entry. Two racing misses may both write; the overwrite is idempotent.
    pub fn set(&self, operation: Operation, text: &str, value: Value) {
        let key = Self::key(operation, text);
        let entry = CacheEntry {
            value,
            created_at: SystemTime::now(),
        };
        debug!(tag = operation.tag(), key = %key, "cache store");
        self.write().insert(key, entry);
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A poisoned lock only means some writer panicked mid-insert; the map
    // itself is still coherent, so keep serving it.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}
