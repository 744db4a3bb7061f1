//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// rule violations, absent data). Infrastructure failures are translated into
/// `Internal` at the boundary — they never escape a public operation raw.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input, out-of-range metric).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A query legitimately produced nothing ("no sales data", "no forecast
    /// found"). Distinguishable from a true failure; always carries a message.
    #[error("{0}")]
    NoData(String),

    /// A requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A business rule or state-machine guard rejected the operation
    /// (insufficient stock, request not pending, order in a terminal state).
    #[error("{0}")]
    BusinessRule(String),

    /// A conflicting record already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected internal failure; the enclosing transaction is rolled back.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn no_data(msg: impl Into<String>) -> Self {
        Self::NoData(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
