//! Mutable stock counters.
//!
//! Two variants: per-(store, item) store-level stock and per-item warehouse
//! stock. Sales and outbound transfers deduct, inbound transfers and completed
//! purchase orders receive. A counter never goes negative — deducting more
//! than is on hand is a business-rule rejection, not a clamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplyline_core::{DomainError, DomainResult, ItemId, StoreId};

/// Stock held by one store for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStock {
    pub store: StoreId,
    pub item: ItemId,
    pub on_hand: f64,
    pub last_updated: DateTime<Utc>,
}

impl StoreStock {
    pub fn new(store: StoreId, item: ItemId, on_hand: f64, now: DateTime<Utc>) -> Self {
        Self {
            store,
            item,
            on_hand,
            last_updated: now,
        }
    }

    /// Increment on-hand stock (inbound transfer or manual adjustment).
    pub fn receive(&mut self, quantity: f64, now: DateTime<Utc>) {
        self.on_hand += quantity;
        self.last_updated = now;
    }

    /// Decrement on-hand stock (a sale).
    pub fn deduct(&mut self, quantity: f64, now: DateTime<Utc>) -> DomainResult<()> {
        if quantity > self.on_hand {
            return Err(DomainError::business_rule(format!(
                "insufficient stock for store {}, item {}: {} on hand, {} requested",
                self.store, self.item, self.on_hand, quantity
            )));
        }
        self.on_hand -= quantity;
        self.last_updated = now;
        Ok(())
    }
}

/// Warehouse stock for one item. Not store-partitioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseStock {
    pub item: ItemId,
    pub on_hand: f64,
    pub last_updated: DateTime<Utc>,
}

impl WarehouseStock {
    pub fn new(item: ItemId, on_hand: f64, now: DateTime<Utc>) -> Self {
        Self {
            item,
            on_hand,
            last_updated: now,
        }
    }

    /// Increment on-hand stock (purchase-order completion, supplier delivery).
    pub fn receive(&mut self, quantity: f64, now: DateTime<Utc>) {
        self.on_hand += quantity;
        self.last_updated = now;
    }

    /// Decrement on-hand stock (outbound transfer to a store).
    pub fn deduct(&mut self, quantity: f64, now: DateTime<Utc>) -> DomainResult<()> {
        if quantity > self.on_hand {
            return Err(DomainError::business_rule(format!(
                "insufficient warehouse stock for item {}: {} on hand, {} requested",
                self.item, self.on_hand, quantity
            )));
        }
        self.on_hand -= quantity;
        self.last_updated = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn deduct_within_stock_succeeds() {
        let mut stock = StoreStock::new(StoreId::new(1), ItemId::new(1), 10.0, now());
        stock.deduct(4.0, now()).unwrap();
        assert_eq!(stock.on_hand, 6.0);
    }

    #[test]
    fn overdraw_is_rejected_and_stock_untouched() {
        let mut stock = WarehouseStock::new(ItemId::new(3), 5.0, now());
        let err = stock.deduct(6.0, now()).unwrap_err();
        assert!(matches!(err, DomainError::BusinessRule(_)));
        assert_eq!(stock.on_hand, 5.0);
    }

    #[test]
    fn receive_then_deduct_is_exact() {
        let mut stock = WarehouseStock::new(ItemId::new(1), 0.0, now());
        stock.receive(12.5, now());
        stock.deduct(12.5, now()).unwrap();
        assert_eq!(stock.on_hand, 0.0);
    }
}
