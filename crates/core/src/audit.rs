//! Audit trail contract.
//!
//! Every state-changing operation emits exactly one audit entry per attempt —
//! success or failure, never zero, never duplicated. The sink is injected, not
//! ambient: services own an `AuditSink` handle and report through it after
//! their transaction resolves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Outcome class of an audited attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Error,
    Warning,
    Info,
}

/// One append-only audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Actor attribution; `None` for system-triggered runs.
    pub actor: Option<UserId>,
    /// Originating module ("forecast", "inventory", "warehouse", "procurement", "sales").
    pub module: String,
    /// Operation name within the module.
    pub action: String,
    /// Human-readable description of what happened (or failed).
    pub description: String,
    pub status: AuditStatus,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor: Option<UserId>,
        module: impl Into<String>,
        action: impl Into<String>,
        description: impl Into<String>,
        status: AuditStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            actor,
            module: module.into(),
            action: action.into(),
            description: description.into(),
            status,
            timestamp,
        }
    }
}

/// Append-only sink for audit entries.
///
/// Implementations must not fail the business operation: recording is
/// best-effort from the caller's point of view.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}
