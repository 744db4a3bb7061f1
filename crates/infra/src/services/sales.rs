//! Sales capture.
//!
//! A sale appends one observation to the series the forecasts are built from
//! and deducts the sold quantity from the store's stock, atomically. Selling
//! more than is on hand rolls the whole attempt back.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use supplyline_core::{AuditSink, DomainError, DomainResult, ItemId, StoreId, UserId};
use supplyline_forecast::SalesObservation;
use supplyline_stock::StoreItemKey;

use crate::services::report;
use crate::store::RecordStore;

pub struct SalesService<S> {
    store: Arc<S>,
    audit: Arc<dyn AuditSink>,
}

impl<S: RecordStore> SalesService<S> {
    pub fn new(store: Arc<S>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    pub fn record_sale(
        &self,
        store: StoreId,
        item: ItemId,
        quantity: f64,
        date: NaiveDate,
        actor: Option<UserId>,
    ) -> DomainResult<SalesObservation> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            if quantity <= 0.0 {
                return Err(DomainError::validation(format!(
                    "sale quantity must be positive, got {quantity}"
                )));
            }
            let key = StoreItemKey { store, item };
            let level = records.store_stock.get_mut(&key).ok_or_else(|| {
                DomainError::not_found(format!("no stock record for store {store}, item {item}"))
            })?;
            level.deduct(quantity, now)?;

            let observation = SalesObservation {
                date,
                store,
                item,
                quantity,
            };
            records.sales.push(observation.clone());
            Ok(observation)
        });

        report(
            self.audit.as_ref(),
            actor,
            "sales",
            "record_sale",
            &result,
            |obs| format!("recorded sale of {} for store {store}, item {item} on {}", obs.quantity, obs.date),
        );
        result
    }

    pub fn sales_history(
        &self,
        store: Option<StoreId>,
        item: Option<ItemId>,
    ) -> DomainResult<Vec<SalesObservation>> {
        self.store.read(|records| {
            let history: Vec<SalesObservation> = records
                .sales
                .iter()
                .filter(|s| store.is_none_or(|v| s.store == v))
                .filter(|s| item.is_none_or(|v| s.item == v))
                .cloned()
                .collect();
            if history.is_empty() {
                return Err(DomainError::no_data("no sales records found"));
            }
            Ok(history)
        })
    }
}
