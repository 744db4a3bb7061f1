//! Application services.
//!
//! Each service composes the pure domain crates into one externally-triggered
//! operation set, running every state change as a single record-store
//! transaction and reporting exactly one audit entry per attempt. Read-only
//! queries go through `RecordStore::read` and are not audited.

pub mod fulfillment;
pub mod planning;
pub mod sales;
pub mod supplier;

pub use fulfillment::{FulfillmentService, PoAction};
pub use planning::PlanningService;
pub use sales::SalesService;
pub use supplier::SupplierService;

use chrono::Utc;

use supplyline_core::{AuditEntry, AuditSink, AuditStatus, DomainResult, UserId};

/// Report one audited attempt: success with a caller-built description, or
/// the error's own message.
pub(crate) fn report<T>(
    audit: &dyn AuditSink,
    actor: Option<UserId>,
    module: &str,
    action: &str,
    result: &DomainResult<T>,
    describe: impl FnOnce(&T) -> String,
) {
    let (status, description) = match result {
        Ok(value) => (AuditStatus::Success, describe(value)),
        Err(e) => (AuditStatus::Error, e.to_string()),
    };
    audit.record(AuditEntry::new(
        actor,
        module,
        action,
        description,
        status,
        Utc::now(),
    ));
}
