use thiserror::Error;

/// Error taxonomy for the engine.
///
/// Note that an answer gated for insufficient evidence is *not* an error;
/// it is a normal response carrying `AnswerStatus::InsufficientEvidence`.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected before any external call: empty or too-short input,
    /// malformed segments.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A query arrived while no transcript index is live.
    #[error("No transcript indexed; build an index first")]
    NotIndexed,

    /// The embedding or generation provider failed. Retry policy, if any,
    /// belongs to the caller.
    #[error("Provider call failed: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, Error>;
