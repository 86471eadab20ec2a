//! Error types for the conversation engine.
//!
//! User-input-derived conditions (no keyword matched, ambiguous signals, low
//! confidence) are never errors — the engine always produces a
//! classification and a next question. Only infrastructure failures surface
//! here, and even those must not block turn processing.

use std::time::Duration;

/// Top-level error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Enhancer error: {0}")]
    Enhancer(#[from] EnhancerError),
}

/// Session-store errors. Recoverable: a failed save degrades persistence
/// for one turn, a failed load falls back to default evidence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Onboarding stage-machine errors. An unknown stage id is a contract
/// violation by the caller, not a user-input condition.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("Unknown stage id: {id}")]
    UnknownStage { id: String },
}

/// Errors from the optional external classification enhancer. Always
/// handled locally by falling back to the deterministic classifier.
#[derive(Debug, thiserror::Error)]
pub enum EnhancerError {
    #[error("Enhancer request failed: {0}")]
    RequestFailed(String),

    #[error("Enhancer timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Invalid enhancer response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
