//! Supplier-facing confirmation flow.
//!
//! Purchase orders staged for a specific supplier await that supplier's
//! confirm/reject. Either action archives the staged record into the
//! supplier-transaction ledger and removes it from the pending-confirmation
//! set — a move, not a copy. `into_transaction` consumes the staged record so
//! the type system enforces exactly that.
//!
//! Confirm additionally delivers the quantity into the warehouse and clears
//! any outstanding warehouse request for the item; both effects are applied by
//! the infrastructure layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplyline_core::{ItemId, RecordId, SupplierId};

/// What the supplier decided.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationAction {
    Confirm,
    Reject,
}

/// Resulting ledger status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Confirmed,
    Rejected,
}

impl From<ConfirmationAction> for TransactionStatus {
    fn from(action: ConfirmationAction) -> Self {
        match action {
            ConfirmationAction::Confirm => TransactionStatus::Confirmed,
            ConfirmationAction::Reject => TransactionStatus::Rejected,
        }
    }
}

impl core::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            TransactionStatus::Confirmed => "confirmed",
            TransactionStatus::Rejected => "rejected",
        })
    }
}

/// A purchase order staged for one supplier's confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedConfirmation {
    pub id: RecordId,
    pub item: ItemId,
    pub supplier_id: SupplierId,
    pub quantity: f64,
    pub created_at: DateTime<Utc>,
}

impl StagedConfirmation {
    pub fn new(
        item: ItemId,
        supplier_id: SupplierId,
        quantity: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            item,
            supplier_id,
            quantity,
            created_at: now,
        }
    }

    /// Archive into the ledger. Consumes the staged record: once a
    /// transaction exists, the confirmation no longer does.
    pub fn into_transaction(
        self,
        action: ConfirmationAction,
        now: DateTime<Utc>,
    ) -> SupplierTransaction {
        SupplierTransaction {
            item: self.item,
            supplier_id: self.supplier_id,
            quantity: self.quantity,
            status: action.into(),
            processed_at: now,
        }
    }
}

/// One archived supplier decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierTransaction {
    pub item: ItemId,
    pub supplier_id: SupplierId,
    pub quantity: f64,
    pub status: TransactionStatus,
    pub processed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_archives_with_confirmed_status() {
        let now = Utc::now();
        let staged = StagedConfirmation::new(ItemId::new(4), SupplierId::new(2), 50.0, now);
        let tx = staged.into_transaction(ConfirmationAction::Confirm, now);
        assert_eq!(tx.status, TransactionStatus::Confirmed);
        assert_eq!(tx.item, ItemId::new(4));
        assert_eq!(tx.quantity, 50.0);
    }

    #[test]
    fn reject_archives_with_rejected_status() {
        let now = Utc::now();
        let staged = StagedConfirmation::new(ItemId::new(4), SupplierId::new(2), 50.0, now);
        let tx = staged.into_transaction(ConfirmationAction::Reject, now);
        assert_eq!(tx.status, TransactionStatus::Rejected);
    }
}
