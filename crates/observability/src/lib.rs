//! Tracing/logging setup shared by binaries and tests.
//!
//! Diagnostics (skipped forecast entities, model load failures) go through
//! `tracing`; the business audit trail does not — that is the `AuditSink`
//! contract in `supplyline-core`.

pub mod tracing;

/// Initialize process-wide observability (tracing/logging).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}
