//! Error taxonomy for the Regulon client core.
//!
//! Model errors (duplicate ids, dangling references, invalid workflow
//! transitions, rejected imports) indicate caller bugs and are never
//! swallowed. `RemoteRequest` is the one expected, recoverable class:
//! repositories catch it, keep the last-known local state, and surface
//! the message.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegulonError>;

#[derive(Debug, Error)]
pub enum RegulonError {
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Edge references unknown node: {0}")]
    DanglingReference(String),

    #[error("Invalid workflow transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Import rejected: {0}")]
    ImportValidation(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Remote request failed: {0}")]
    RemoteRequest(String),

    #[error("Cancellation not confirmed for workflow {workflow_id} within {timeout_secs}s")]
    CancellationTimeout {
        workflow_id: String,
        timeout_secs: u64,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RegulonError {
    fn from(err: reqwest::Error) -> Self {
        RegulonError::RemoteRequest(err.to_string())
    }
}

impl RegulonError {
    /// True for failures the repositories treat as recoverable: local
    /// state is preserved and the message is surfaced instead of
    /// propagating a crash.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            RegulonError::RemoteRequest(_) | RegulonError::CancellationTimeout { .. }
        )
    }
}
