//! Replenishment request lifecycle.
//!
//! Store-level requests ((store, item) → pull from warehouse) and
//! warehouse-level requests (item → purchase from suppliers) share the same
//! record shape and guards; they differ only in key type and in which
//! transitions the surrounding flows use.
//!
//! Store requests: `pending → approved | rejected`.
//! Warehouse requests: `pending → processing → completed`, with
//! `processing → pending` when the covering purchase order is rejected.
//!
//! Invariant (maintained by reconciliation, checked in tests): at most one
//! request in `pending` status per entity key at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplyline_core::{DomainError, DomainResult, ItemId, RecordId, StoreId};

/// Entity key of a store-scoped request or forecast.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreItemKey {
    pub store: StoreId,
    pub item: ItemId,
}

impl core::fmt::Display for StoreItemKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "store {}, item {}", self.store, self.item)
    }
}

/// Request status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    /// Placed on a purchase order, awaiting the supplier side.
    Processing,
    Approved,
    Rejected,
    Completed,
}

impl core::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Processing => "processing",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A replenishment request for one entity key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentRequest<K> {
    pub id: RecordId,
    pub key: K,
    pub requested_quantity: f64,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store-level request: pull stock from the warehouse into one store.
pub type StoreRequest = ReplenishmentRequest<StoreItemKey>;

/// Warehouse-level request: replenish warehouse stock from suppliers.
pub type WarehouseRequest = ReplenishmentRequest<ItemId>;

impl<K: Copy> ReplenishmentRequest<K> {
    pub fn new(key: K, requested_quantity: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            key,
            requested_quantity,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    fn ensure_status(&self, expected: RequestStatus) -> DomainResult<()> {
        if self.status != expected {
            return Err(DomainError::business_rule(format!(
                "request is not {expected} (currently {})",
                self.status
            )));
        }
        Ok(())
    }

    /// Overwrite the requested quantity of a pending request with a freshly
    /// computed value. Repeated reconciliation runs keep the request current
    /// with the latest forecast instead of stacking new ones.
    pub fn refresh_quantity(&mut self, quantity: f64, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(RequestStatus::Pending)?;
        self.requested_quantity = quantity;
        self.updated_at = now;
        Ok(())
    }

    /// Approve a pending request. Terminal.
    pub fn approve(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(RequestStatus::Pending)?;
        self.status = RequestStatus::Approved;
        self.updated_at = now;
        Ok(())
    }

    /// Reject a pending request (explicit or automatic). Terminal; no retry.
    pub fn reject(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(RequestStatus::Pending)?;
        self.status = RequestStatus::Rejected;
        self.updated_at = now;
        Ok(())
    }

    /// Mark a pending request as covered by a purchase order.
    pub fn begin_processing(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(RequestStatus::Pending)?;
        self.status = RequestStatus::Processing;
        self.updated_at = now;
        Ok(())
    }

    /// Return a processing request to the reconciliation pool (its purchase
    /// order was rejected).
    pub fn revert_to_pending(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(RequestStatus::Processing)?;
        self.status = RequestStatus::Pending;
        self.updated_at = now;
        Ok(())
    }

    /// Close out a processing request (its purchase order completed).
    pub fn complete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_status(RequestStatus::Processing)?;
        self.status = RequestStatus::Completed;
        self.updated_at = now;
        Ok(())
    }
}

/// Outcome of deciding a store-request approval against warehouse stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransferDecision {
    /// Warehouse covers the request: move the quantity, approve.
    Approve,
    /// Warehouse cannot cover it: auto-reject, touch nothing.
    InsufficientStock,
}

/// Pure approval decision: a request is fulfillable only when the warehouse
/// holds at least the requested quantity. No partial fulfillment.
pub fn decide_transfer(requested_quantity: f64, warehouse_on_hand: f64) -> TransferDecision {
    if warehouse_on_hand >= requested_quantity {
        TransferDecision::Approve
    } else {
        TransferDecision::InsufficientStock
    }
}
