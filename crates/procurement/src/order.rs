//! Purchase order lifecycle.
//!
//! `pending → accepted | rejected`, then `accepted → completed` as a distinct
//! later action. Both `pending` and `rejected` are accepted as starting states
//! for accept/reject (rejected orders can be re-processed); any other
//! re-processing fails with an explicit "already <status>" error.
//!
//! Only completion mutates warehouse stock; the order itself just transitions
//! and exposes its lines for the infrastructure layer to apply. The total
//! amount is fixed at creation from the supplier's unit price at that moment
//! and never recomputed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use supplyline_core::{DomainError, DomainResult, ItemId, RecordId, SupplierId};

/// Human-facing purchase order number, `PO-YYYYMMDD-NNNN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoNumber(String);

impl PoNumber {
    /// Generate a number for `date`. The 4-digit suffix is derived from a
    /// time-ordered UUID, which is unique enough for a human-facing label
    /// (the record identity is the `RecordId`).
    pub fn generate(date: chrono::NaiveDate) -> Self {
        let uuid = Uuid::now_v7();
        let suffix = 1000 + (uuid.as_u128() % 9000) as u32;
        Self(format!("PO-{}-{suffix}", date.format("%Y%m%d")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PoNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl core::fmt::Display for PoStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            PoStatus::Pending => "pending",
            PoStatus::Accepted => "accepted",
            PoStatus::Rejected => "rejected",
            PoStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Purchase order line item. `unit_price` is the supplier's price at order
/// creation; later price changes do not touch existing orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoLine {
    pub item: ItemId,
    pub quantity: f64,
    pub unit_price: f64,
}

impl PoLine {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// A purchase order: line items against one supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: RecordId,
    pub number: PoNumber,
    pub supplier_id: SupplierId,
    pub status: PoStatus,
    /// Σ line totals, fixed at creation.
    pub total_amount: f64,
    pub lines: Vec<PoLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Create a pending order. Every line must have a positive quantity;
    /// an order without lines is invalid.
    pub fn new(
        supplier_id: SupplierId,
        unit_price: f64,
        items: &[(ItemId, f64)],
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if items.is_empty() {
            return Err(DomainError::validation(
                "purchase order must have at least one line item",
            ));
        }
        for &(item, quantity) in items {
            if quantity <= 0.0 {
                return Err(DomainError::validation(format!(
                    "quantity for item {item} must be positive"
                )));
            }
        }

        let lines: Vec<PoLine> = items
            .iter()
            .map(|&(item, quantity)| PoLine {
                item,
                quantity,
                unit_price,
            })
            .collect();
        let total_amount = lines.iter().map(PoLine::line_total).sum();

        Ok(Self {
            id: RecordId::new(),
            number: PoNumber::generate(now.date_naive()),
            supplier_id,
            status: PoStatus::Pending,
            total_amount,
            lines,
            created_at: now,
            updated_at: now,
        })
    }

    /// Pending and rejected orders can be (re)processed; accepted and
    /// completed cannot.
    fn ensure_reprocessable(&self) -> DomainResult<()> {
        match self.status {
            PoStatus::Pending | PoStatus::Rejected => Ok(()),
            status => Err(DomainError::business_rule(format!(
                "purchase order {} is already {status}",
                self.number
            ))),
        }
    }

    pub fn accept(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_reprocessable()?;
        self.status = PoStatus::Accepted;
        self.updated_at = now;
        Ok(())
    }

    /// Reject the order. The caller reverts any `processing` warehouse
    /// requests covering these lines back to `pending`.
    pub fn reject(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_reprocessable()?;
        self.status = PoStatus::Rejected;
        self.updated_at = now;
        Ok(())
    }

    /// Complete an accepted order. The caller applies the warehouse stock
    /// increments from `lines` and closes out covered warehouse requests.
    pub fn complete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != PoStatus::Accepted {
            return Err(DomainError::business_rule(format!(
                "purchase order {} is {} and cannot be completed",
                self.number, self.status
            )));
        }
        self.status = PoStatus::Completed;
        self.updated_at = now;
        Ok(())
    }
}
