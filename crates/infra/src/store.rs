//! The persistence collaborator, modeled as an in-memory record store.
//!
//! The real system owns its entities in an external database; the core only
//! ever sees snapshots and writes back deltas through one transaction per
//! operation. `RecordStore` is that contract: `read` for snapshots, `with_tx`
//! for all-or-nothing units of work. The in-memory implementation realizes
//! rollback by cloning the state up front and restoring it when the closure
//! fails — no partial state ever survives an error.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use supplyline_core::{DomainResult, ItemId, RecordId, StoreId, SupplierId};
use supplyline_forecast::SalesObservation;
use supplyline_procurement::{PurchaseOrder, StagedConfirmation, Supplier, SupplierTransaction};
use supplyline_stock::{StoreItemKey, StoreRequest, StoreStock, WarehouseRequest, WarehouseStock};

/// Persisted 7-day forecast row: one per (store, item, forecast_date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreForecastRecord {
    pub store: StoreId,
    pub item: ItemId,
    pub predicted_total: f64,
    pub forecast_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Persisted 30-day forecast row: one per (item, forecast_date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemForecastRecord {
    pub item: ItemId,
    pub predicted_total: f64,
    pub forecast_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// All tables of the record store.
#[derive(Debug, Default, Clone)]
pub struct Records {
    pub sales: Vec<SalesObservation>,
    pub store_stock: BTreeMap<StoreItemKey, StoreStock>,
    pub warehouse_stock: BTreeMap<ItemId, WarehouseStock>,
    pub store_forecasts: Vec<StoreForecastRecord>,
    pub item_forecasts: Vec<ItemForecastRecord>,
    pub store_requests: Vec<StoreRequest>,
    pub warehouse_requests: Vec<WarehouseRequest>,
    pub suppliers: BTreeMap<SupplierId, Supplier>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub staged_confirmations: Vec<StagedConfirmation>,
    pub supplier_ledger: Vec<SupplierTransaction>,
}

impl Records {
    /// The single pending store request for an entity key, if any.
    pub fn pending_store_request_mut(&mut self, key: StoreItemKey) -> Option<&mut StoreRequest> {
        self.store_requests
            .iter_mut()
            .find(|r| r.key == key && r.is_pending())
    }

    /// The single pending warehouse request for an item, if any.
    pub fn pending_warehouse_request_mut(&mut self, item: ItemId) -> Option<&mut WarehouseRequest> {
        self.warehouse_requests
            .iter_mut()
            .find(|r| r.key == item && r.is_pending())
    }

    /// The warehouse request currently being processed (on a purchase order)
    /// for an item, if any.
    pub fn processing_warehouse_request_mut(
        &mut self,
        item: ItemId,
    ) -> Option<&mut WarehouseRequest> {
        self.warehouse_requests
            .iter_mut()
            .find(|r| r.key == item && r.status == supplyline_stock::RequestStatus::Processing)
    }

    pub fn store_request_mut(&mut self, id: RecordId) -> Option<&mut StoreRequest> {
        self.store_requests.iter_mut().find(|r| r.id == id)
    }

    pub fn purchase_order_mut(&mut self, id: RecordId) -> Option<&mut PurchaseOrder> {
        self.purchase_orders.iter_mut().find(|po| po.id == id)
    }

    /// Latest forecast date present in the 7-day table ("max of a field").
    pub fn latest_store_forecast_date(&self) -> Option<NaiveDate> {
        self.store_forecasts.iter().map(|r| r.forecast_date).max()
    }

    /// Latest forecast date present in the 30-day table.
    pub fn latest_item_forecast_date(&self) -> Option<NaiveDate> {
        self.item_forecasts.iter().map(|r| r.forecast_date).max()
    }
}

/// The record-store contract services are written against.
///
/// One `with_tx` call is one unit of work: every write inside commits
/// together, or none do.
pub trait RecordStore: Send + Sync {
    /// Read-only snapshot access.
    fn read<T, F: FnOnce(&Records) -> DomainResult<T>>(&self, f: F) -> DomainResult<T>;

    /// Atomic read-write unit of work; rolled back in full when `f` errors.
    fn with_tx<T, F: FnOnce(&mut Records) -> DomainResult<T>>(&self, f: F) -> DomainResult<T>;
}

/// In-memory record store for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: Mutex<Records>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed initial state outside any audited operation (test setup).
    pub fn seed(&self, f: impl FnOnce(&mut Records)) {
        let mut guard = self.inner.lock().unwrap();
        f(&mut guard);
    }
}

impl RecordStore for InMemoryRecordStore {
    fn read<T, F: FnOnce(&Records) -> DomainResult<T>>(&self, f: F) -> DomainResult<T> {
        let guard = self.inner.lock().unwrap();
        f(&guard)
    }

    fn with_tx<T, F: FnOnce(&mut Records) -> DomainResult<T>>(&self, f: F) -> DomainResult<T> {
        let mut guard = self.inner.lock().unwrap();
        let snapshot = guard.clone();
        match f(&mut guard) {
            Ok(value) => Ok(value),
            Err(e) => {
                *guard = snapshot;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use supplyline_core::DomainError;

    use super::*;

    #[test]
    fn failed_transaction_rolls_back_every_write() {
        let store = InMemoryRecordStore::new();
        let now = Utc::now();

        let result: DomainResult<()> = store.with_tx(|records| {
            records
                .warehouse_stock
                .insert(ItemId::new(1), WarehouseStock::new(ItemId::new(1), 10.0, now));
            records.warehouse_requests.push(WarehouseRequest::new(
                ItemId::new(1),
                5.0,
                now,
            ));
            Err(DomainError::internal("boom"))
        });

        assert!(result.is_err());
        store
            .read(|records| {
                assert!(records.warehouse_stock.is_empty());
                assert!(records.warehouse_requests.is_empty());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn successful_transaction_commits_every_write() {
        let store = InMemoryRecordStore::new();
        let now = Utc::now();

        store
            .with_tx(|records| {
                records
                    .warehouse_stock
                    .insert(ItemId::new(1), WarehouseStock::new(ItemId::new(1), 10.0, now));
                Ok(())
            })
            .unwrap();

        store
            .read(|records| {
                assert_eq!(records.warehouse_stock.len(), 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn pending_lookup_ignores_non_pending_requests() {
        let store = InMemoryRecordStore::new();
        let now = Utc::now();
        store.seed(|records| {
            let mut request = WarehouseRequest::new(ItemId::new(2), 5.0, now);
            request.begin_processing(now).unwrap();
            records.warehouse_requests.push(request);
        });

        store
            .with_tx(|records| {
                assert!(records.pending_warehouse_request_mut(ItemId::new(2)).is_none());
                assert!(records
                    .processing_warehouse_request_mut(ItemId::new(2))
                    .is_some());
                Ok(())
            })
            .unwrap();
    }
}
