//! Forecast generation, forecast queries, and stock reconciliation.
//!
//! Generation is idempotent per forecast date: existing rows for the date are
//! replaced, never stacked. Reconciliation finds-or-refreshes the single
//! pending request per entity, so repeated runs converge instead of piling up
//! duplicate requests.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use supplyline_core::{AuditSink, DomainError, DomainResult, ItemId, UserId};
use supplyline_forecast::features::engineer_features;
use supplyline_forecast::runner::{run_store_forecast, run_warehouse_forecast};
use supplyline_forecast::{ForecastError, PredictorRegistry};
use supplyline_stock::{plan_restocking, RestockNeed, StoreItemKey, StoreRequest, WarehouseRequest};

use crate::services::report;
use crate::store::{ItemForecastRecord, RecordStore, Records, StoreForecastRecord};

fn map_forecast_error(e: ForecastError) -> DomainError {
    match e {
        ForecastError::NoUsableEntities => {
            DomainError::no_data("no forecast generated: no usable sales history or models")
        }
        ForecastError::RegistryUnavailable(msg) => DomainError::internal(msg),
    }
}

/// Forecast and reconciliation operations.
pub struct PlanningService<S, R> {
    store: Arc<S>,
    registry: Arc<R>,
    audit: Arc<dyn AuditSink>,
}

impl<S: RecordStore, R: PredictorRegistry> PlanningService<S, R> {
    pub fn new(store: Arc<S>, registry: Arc<R>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            registry,
            audit,
        }
    }

    /// Generate and persist the 7-day forecast for every (store, item) pair
    /// with enough history. Replaces any rows already stored for
    /// `forecast_date`.
    pub fn generate_store_forecast(
        &self,
        forecast_date: NaiveDate,
        actor: Option<UserId>,
    ) -> DomainResult<Vec<StoreForecastRecord>> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            let rows = engineer_features(&records.sales);
            let forecasts =
                run_store_forecast(&rows, self.registry.as_ref()).map_err(map_forecast_error)?;

            records
                .store_forecasts
                .retain(|r| r.forecast_date != forecast_date);
            let inserted: Vec<StoreForecastRecord> = forecasts
                .into_iter()
                .map(|f| StoreForecastRecord {
                    store: f.store,
                    item: f.item,
                    predicted_total: f.predicted_total,
                    forecast_date,
                    created_at: now,
                })
                .collect();
            records.store_forecasts.extend(inserted.iter().cloned());
            Ok(inserted)
        });

        report(
            self.audit.as_ref(),
            actor,
            "forecast",
            "generate_store_forecast",
            &result,
            |rows| format!("generated 7-day forecast for {} store/item pairs on {forecast_date}", rows.len()),
        );
        if let Ok(rows) = &result {
            info!(date = %forecast_date, pairs = rows.len(), "7-day forecast generated");
        }
        result
    }

    /// Generate and persist the 30-day warehouse forecast: per-series
    /// predictions summed across stores per item. Replaces rows for
    /// `forecast_date`.
    pub fn generate_warehouse_forecast(
        &self,
        forecast_date: NaiveDate,
        actor: Option<UserId>,
    ) -> DomainResult<Vec<ItemForecastRecord>> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            let rows = engineer_features(&records.sales);
            let forecasts = run_warehouse_forecast(&rows, self.registry.as_ref())
                .map_err(map_forecast_error)?;

            records
                .item_forecasts
                .retain(|r| r.forecast_date != forecast_date);
            let inserted: Vec<ItemForecastRecord> = forecasts
                .into_iter()
                .map(|f| ItemForecastRecord {
                    item: f.item,
                    predicted_total: f.predicted_total,
                    forecast_date,
                    created_at: now,
                })
                .collect();
            records.item_forecasts.extend(inserted.iter().cloned());
            Ok(inserted)
        });

        report(
            self.audit.as_ref(),
            actor,
            "warehouse",
            "generate_warehouse_forecast",
            &result,
            |rows| format!("generated 30-day forecast for {} items on {forecast_date}", rows.len()),
        );
        if let Ok(rows) = &result {
            info!(date = %forecast_date, items = rows.len(), "30-day forecast generated");
        }
        result
    }

    /// All 7-day rows at the most recent forecast date.
    pub fn latest_store_forecast(&self) -> DomainResult<Vec<StoreForecastRecord>> {
        self.store.read(|records| {
            let date = records
                .latest_store_forecast_date()
                .ok_or_else(|| DomainError::no_data("no store forecast available"))?;
            Ok(records
                .store_forecasts
                .iter()
                .filter(|r| r.forecast_date == date)
                .cloned()
                .collect())
        })
    }

    /// All 30-day rows at the most recent forecast date.
    pub fn latest_warehouse_forecast(&self) -> DomainResult<Vec<ItemForecastRecord>> {
        self.store.read(|records| {
            let date = records
                .latest_item_forecast_date()
                .ok_or_else(|| DomainError::no_data("no warehouse forecast available"))?;
            Ok(records
                .item_forecasts
                .iter()
                .filter(|r| r.forecast_date == date)
                .cloned()
                .collect())
        })
    }

    /// Delete every 7-day row stored for `forecast_date`.
    pub fn delete_store_forecast(
        &self,
        forecast_date: NaiveDate,
        actor: Option<UserId>,
    ) -> DomainResult<usize> {
        let result = self.store.with_tx(|records| {
            let before = records.store_forecasts.len();
            records
                .store_forecasts
                .retain(|r| r.forecast_date != forecast_date);
            let removed = before - records.store_forecasts.len();
            if removed == 0 {
                return Err(DomainError::no_data(format!(
                    "no store forecast stored for {forecast_date}"
                )));
            }
            Ok(removed)
        });

        report(
            self.audit.as_ref(),
            actor,
            "forecast",
            "delete_store_forecast",
            &result,
            |removed| format!("deleted {removed} store forecast rows for {forecast_date}"),
        );
        result
    }

    /// Delete every 30-day row stored for `forecast_date`.
    pub fn delete_warehouse_forecast(
        &self,
        forecast_date: NaiveDate,
        actor: Option<UserId>,
    ) -> DomainResult<usize> {
        let result = self.store.with_tx(|records| {
            let before = records.item_forecasts.len();
            records
                .item_forecasts
                .retain(|r| r.forecast_date != forecast_date);
            let removed = before - records.item_forecasts.len();
            if removed == 0 {
                return Err(DomainError::no_data(format!(
                    "no warehouse forecast stored for {forecast_date}"
                )));
            }
            Ok(removed)
        });

        report(
            self.audit.as_ref(),
            actor,
            "warehouse",
            "delete_warehouse_forecast",
            &result,
            |removed| format!("deleted {removed} warehouse forecast rows for {forecast_date}"),
        );
        result
    }

    /// Reconcile the latest stored 7-day forecast against store stock and
    /// find-or-refresh one pending store request per shortfall.
    pub fn optimize_store_inventory(
        &self,
        actor: Option<UserId>,
    ) -> DomainResult<Vec<RestockNeed<StoreItemKey>>> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            let date = records
                .latest_store_forecast_date()
                .ok_or_else(|| DomainError::no_data("no store forecast available"))?;
            if records.store_stock.is_empty() {
                return Err(DomainError::no_data("no store stock records available"));
            }

            let forecast: Vec<(StoreItemKey, f64)> = records
                .store_forecasts
                .iter()
                .filter(|r| r.forecast_date == date)
                .map(|r| {
                    (
                        StoreItemKey {
                            store: r.store,
                            item: r.item,
                        },
                        r.predicted_total,
                    )
                })
                .collect();
            let stock: Vec<(StoreItemKey, f64)> = records
                .store_stock
                .iter()
                .map(|(&key, level)| (key, level.on_hand))
                .collect();

            let needs = plan_restocking(&forecast, &stock);
            for need in &needs {
                apply_store_need(records, need, now)?;
            }
            Ok(needs)
        });

        report(
            self.audit.as_ref(),
            actor,
            "inventory",
            "optimize_store_inventory",
            &result,
            |needs| format!("store reconciliation raised {} restock needs", needs.len()),
        );
        result
    }

    /// Generate a fresh 30-day forecast for `forecast_date`, then reconcile
    /// it against warehouse stock and find-or-refresh one pending warehouse
    /// request per shortfall. The generation step reports its own audit
    /// entry.
    pub fn optimize_warehouse(
        &self,
        forecast_date: NaiveDate,
        actor: Option<UserId>,
    ) -> DomainResult<Vec<RestockNeed<ItemId>>> {
        let now = Utc::now();
        let result = self
            .generate_warehouse_forecast(forecast_date, actor)
            .and_then(|forecasts| {
                self.store.with_tx(|records| {
                    let forecast: Vec<(ItemId, f64)> = forecasts
                        .iter()
                        .map(|r| (r.item, r.predicted_total))
                        .collect();
                    let stock: Vec<(ItemId, f64)> = records
                        .warehouse_stock
                        .iter()
                        .map(|(&item, level)| (item, level.on_hand))
                        .collect();

                    let needs = plan_restocking(&forecast, &stock);
                    for need in &needs {
                        apply_warehouse_need(records, need, now)?;
                    }
                    Ok(needs)
                })
            });

        report(
            self.audit.as_ref(),
            actor,
            "warehouse",
            "optimize_warehouse",
            &result,
            |needs| format!("warehouse reconciliation raised {} restock needs", needs.len()),
        );
        result
    }
}

fn apply_store_need(
    records: &mut Records,
    need: &RestockNeed<StoreItemKey>,
    now: chrono::DateTime<Utc>,
) -> DomainResult<()> {
    match records.pending_store_request_mut(need.key) {
        Some(request) => request.refresh_quantity(need.required_quantity, now)?,
        None => records
            .store_requests
            .push(StoreRequest::new(need.key, need.required_quantity, now)),
    }
    Ok(())
}

fn apply_warehouse_need(
    records: &mut Records,
    need: &RestockNeed<ItemId>,
    now: chrono::DateTime<Utc>,
) -> DomainResult<()> {
    match records.pending_warehouse_request_mut(need.key) {
        Some(request) => request.refresh_quantity(need.required_quantity, now)?,
        None => records
            .warehouse_requests
            .push(WarehouseRequest::new(need.key, need.required_quantity, now)),
    }
    Ok(())
}
