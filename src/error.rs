use thiserror::Error;

use crate::model::Holder;

/// Engine-wide error taxonomy.
///
/// Only `Validation` surfaces to callers as-is; the driver loop absorbs
/// the rest per record: `InsufficientResources` marks an activity failed,
/// `CollaboratorUnavailable` triggers a fallback, `InvariantViolation`
/// marks the record errored and the batch moves on.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed intent: missing actor, non-positive amount, unknown
    /// building. Creates no records.
    #[error("invalid intent: {0}")]
    Validation(String),

    /// A ledger decrement found less stock than requested. Recoverable:
    /// the caller may settle partially or retry next cycle.
    #[error("insufficient {resource} at {holder} owned by {owner}: have {available}, need {requested}")]
    InsufficientResources {
        resource: String,
        holder: Holder,
        owner: u64,
        available: f64,
        requested: f64,
    },

    /// A collaborator (travel estimator, narrative service) failed or
    /// timed out. Absorbed with a fallback, never fatal.
    #[error("collaborator {service} unavailable: {reason}")]
    CollaboratorUnavailable { service: &'static str, reason: String },

    /// A programming-logic fault: negative stock, backward status move,
    /// missing record mid-transaction. Logged with context; the offending
    /// record is marked errored and the batch continues.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The record store rejected a read or write.
    #[error("store error: {0}")]
    Store(String),
}

impl EngineError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        EngineError::InvariantViolation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// Whether the activity hit by this error should conclude `Failed`
    /// (recoverable) rather than `Error` (fault).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientResources { .. } | EngineError::CollaboratorUnavailable { .. }
        )
    }
}
