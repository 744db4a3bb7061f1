//! Procurement domain module.
//!
//! Suppliers (evaluation metrics + blacklist), purchase orders and their
//! lifecycle, and the supplier-facing confirmation flow that archives staged
//! purchase orders into the supplier-transaction ledger. Pure domain logic;
//! stock mutations that follow these transitions are applied by the
//! infrastructure layer.

pub mod confirmation;
pub mod order;
pub mod supplier;

pub use confirmation::{ConfirmationAction, StagedConfirmation, SupplierTransaction, TransactionStatus};
pub use order::{PoLine, PoNumber, PoStatus, PurchaseOrder};
pub use supplier::{rank_by_score, Supplier, SupplierMetrics, SupplierScore, METRIC_COUNT};
