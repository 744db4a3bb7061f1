//! `supplyline-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, strongly-typed identifiers, and the audit-sink contract
//! every state-changing operation reports through.

pub mod audit;
pub mod error;
pub mod id;

pub use audit::{AuditEntry, AuditSink, AuditStatus};
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, RecordId, StoreId, SupplierId, UserId};
