//! Forecast inference runner.
//!
//! One prediction per entity per run: 7-day forecasts are store-scoped
//! ((store, item) pairs), 30-day forecasts are item-scoped — predicted per
//! (store, item) series and then summed across stores, because warehouse stock
//! is not store-partitioned.
//!
//! Failure semantics: a missing or broken predictor, or a prediction error,
//! skips that entity with a diagnostic; only an unavailable predictor store
//! fails the run. An empty result set is reported as `NoUsableEntities`, not
//! as an empty success.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use supplyline_core::{ItemId, StoreId};

use crate::features::FeatureRow;
use crate::predictor::{PredictorKey, PredictorRegistry, RegistryError};

/// Minimum history (rows per series) for a 7-day prediction.
pub const MIN_HISTORY_7: usize = 7;
/// Minimum history (rows per series) for a 30-day contribution.
pub const MIN_HISTORY_30: usize = 30;

/// 7-day prediction for one (store, item) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreItemForecast {
    pub store: StoreId,
    pub item: ItemId,
    pub predicted_total: f64,
}

/// 30-day prediction for one item, aggregated over all stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemForecast {
    pub item: ItemId,
    pub predicted_total: f64,
}

#[derive(Debug, Error)]
pub enum ForecastError {
    /// No entity produced a prediction (no history, no models, or all failed).
    #[error("no forecast generated: no usable entities")]
    NoUsableEntities,

    /// The predictor store itself is absent/unreadable.
    #[error("predictor store unavailable: {0}")]
    RegistryUnavailable(String),
}

/// Generate 7-day forecasts: one per (store, item) pair with enough history.
pub fn run_store_forecast(
    rows: &[FeatureRow],
    registry: &dyn PredictorRegistry,
) -> Result<Vec<StoreItemForecast>, ForecastError> {
    let mut results = Vec::new();

    for ((store, item), series) in group_by_series(rows) {
        if series.len() < MIN_HISTORY_7 {
            continue;
        }
        let key = PredictorKey::StoreItem7 { store, item };
        if let Some(predicted_total) = predict_latest(&key, &series, registry)? {
            results.push(StoreItemForecast {
                store,
                item,
                predicted_total,
            });
        }
    }

    if results.is_empty() {
        return Err(ForecastError::NoUsableEntities);
    }
    Ok(results)
}

/// Generate 30-day forecasts: predict per (store, item) series, then sum
/// across stores per item.
pub fn run_warehouse_forecast(
    rows: &[FeatureRow],
    registry: &dyn PredictorRegistry,
) -> Result<Vec<ItemForecast>, ForecastError> {
    let mut totals: BTreeMap<ItemId, f64> = BTreeMap::new();

    for ((store, item), series) in group_by_series(rows) {
        if series.len() < MIN_HISTORY_30 {
            continue;
        }
        let key = PredictorKey::StoreItem30 { store, item };
        if let Some(prediction) = predict_latest(&key, &series, registry)? {
            *totals.entry(item).or_insert(0.0) += prediction;
        }
    }

    if totals.is_empty() {
        return Err(ForecastError::NoUsableEntities);
    }
    Ok(totals
        .into_iter()
        .map(|(item, predicted_total)| ItemForecast {
            item,
            predicted_total,
        })
        .collect())
}

fn group_by_series(rows: &[FeatureRow]) -> BTreeMap<(StoreId, ItemId), Vec<&FeatureRow>> {
    let mut groups: BTreeMap<(StoreId, ItemId), Vec<&FeatureRow>> = BTreeMap::new();
    for row in rows {
        groups.entry((row.store, row.item)).or_default().push(row);
    }
    for series in groups.values_mut() {
        series.sort_by_key(|row| row.date);
    }
    groups
}

/// Single-row inference on the most recent row of a series.
///
/// `Ok(None)` means the entity was skipped (missing/broken model, prediction
/// failure); only registry unavailability is escalated.
fn predict_latest(
    key: &PredictorKey,
    series: &[&FeatureRow],
    registry: &dyn PredictorRegistry,
) -> Result<Option<f64>, ForecastError> {
    let predictor = match registry.lookup(key) {
        Ok(Some(predictor)) => predictor,
        Ok(None) => {
            warn!(key = %key.file_stem(), "no predictor for entity, skipping");
            return Ok(None);
        }
        Err(RegistryError::Load(msg)) => {
            warn!(key = %key.file_stem(), error = %msg, "predictor failed to load, skipping");
            return Ok(None);
        }
        Err(RegistryError::Unavailable(msg)) => {
            return Err(ForecastError::RegistryUnavailable(msg));
        }
    };

    let latest = series
        .last()
        .expect("series passed the minimum-history gate");
    match predictor.predict(&latest.inference_vector()) {
        Ok(prediction) => Ok(Some(prediction)),
        Err(e) => {
            warn!(key = %key.file_stem(), error = %e, "prediction failed, skipping entity");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::features::{engineer_features, SalesObservation};
    use crate::predictor::{LinearPredictor, Predictor};

    /// Map-backed registry for tests.
    #[derive(Default)]
    struct MapRegistry {
        models: HashMap<String, Arc<dyn Predictor>>,
        unavailable: bool,
    }

    impl MapRegistry {
        fn with_model(mut self, key: PredictorKey, model: LinearPredictor) -> Self {
            self.models.insert(key.file_stem(), Arc::new(model));
            self
        }
    }

    impl PredictorRegistry for MapRegistry {
        fn lookup(
            &self,
            key: &PredictorKey,
        ) -> Result<Option<Arc<dyn Predictor>>, RegistryError> {
            if self.unavailable {
                return Err(RegistryError::Unavailable("store offline".to_string()));
            }
            Ok(self.models.get(&key.file_stem()).cloned())
        }
    }

    #[derive(Debug)]
    struct FailingPredictor;

    impl Predictor for FailingPredictor {
        fn predict(&self, _features: &[f64]) -> anyhow::Result<f64> {
            anyhow::bail!("model blew up")
        }
    }

    /// Predicts `weight * mean_sales` (mean is feature index 4).
    fn mean_model(weight: f64) -> LinearPredictor {
        let mut coefficients = vec![0.0; crate::features::FEATURE_COUNT];
        coefficients[4] = weight;
        LinearPredictor {
            coefficients,
            intercept: 0.0,
        }
    }

    fn series(store: u32, item: u32, days: u32, quantity: f64) -> Vec<SalesObservation> {
        (0..days)
            .map(|offset| SalesObservation {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Days::new(u64::from(offset)),
                store: StoreId::new(store),
                item: ItemId::new(item),
                quantity,
            })
            .collect()
    }

    fn key7(store: u32, item: u32) -> PredictorKey {
        PredictorKey::StoreItem7 {
            store: StoreId::new(store),
            item: ItemId::new(item),
        }
    }

    fn key30(store: u32, item: u32) -> PredictorKey {
        PredictorKey::StoreItem30 {
            store: StoreId::new(store),
            item: ItemId::new(item),
        }
    }

    #[test]
    fn store_forecast_predicts_once_per_pair() {
        let mut observations = series(1, 1, 10, 5.0);
        observations.extend(series(2, 1, 10, 3.0));
        let rows = engineer_features(&observations);

        let registry = MapRegistry::default()
            .with_model(key7(1, 1), mean_model(7.0))
            .with_model(key7(2, 1), mean_model(7.0));

        let forecasts = run_store_forecast(&rows, &registry).unwrap();
        assert_eq!(forecasts.len(), 2);
        assert_eq!(forecasts[0].store, StoreId::new(1));
        assert_eq!(forecasts[0].predicted_total, 35.0);
        assert_eq!(forecasts[1].predicted_total, 21.0);
    }

    #[test]
    fn short_history_pairs_are_silently_skipped() {
        let mut observations = series(1, 1, 10, 5.0);
        observations.extend(series(1, 2, 4, 5.0)); // only 4 rows
        let rows = engineer_features(&observations);

        let registry = MapRegistry::default()
            .with_model(key7(1, 1), mean_model(1.0))
            .with_model(key7(1, 2), mean_model(1.0));

        let forecasts = run_store_forecast(&rows, &registry).unwrap();
        assert_eq!(forecasts.len(), 1);
        assert_eq!(forecasts[0].item, ItemId::new(1));
    }

    #[test]
    fn missing_predictor_skips_entity_but_run_continues() {
        let mut observations = series(1, 1, 10, 5.0);
        observations.extend(series(1, 2, 10, 5.0));
        let rows = engineer_features(&observations);

        let registry = MapRegistry::default().with_model(key7(1, 2), mean_model(1.0));

        let forecasts = run_store_forecast(&rows, &registry).unwrap();
        assert_eq!(forecasts.len(), 1);
        assert_eq!(forecasts[0].item, ItemId::new(2));
    }

    #[test]
    fn prediction_failure_skips_entity() {
        let mut observations = series(1, 1, 10, 5.0);
        observations.extend(series(1, 2, 10, 2.0));
        let rows = engineer_features(&observations);

        let mut registry = MapRegistry::default().with_model(key7(1, 2), mean_model(1.0));
        registry
            .models
            .insert(key7(1, 1).file_stem(), Arc::new(FailingPredictor));

        let forecasts = run_store_forecast(&rows, &registry).unwrap();
        assert_eq!(forecasts.len(), 1);
        assert_eq!(forecasts[0].item, ItemId::new(2));
    }

    #[test]
    fn unavailable_registry_fails_the_whole_run() {
        let rows = engineer_features(&series(1, 1, 10, 5.0));
        let registry = MapRegistry {
            unavailable: true,
            ..MapRegistry::default()
        };
        let err = run_store_forecast(&rows, &registry).unwrap_err();
        assert!(matches!(err, ForecastError::RegistryUnavailable(_)));
    }

    #[test]
    fn empty_result_is_no_usable_entities_not_empty_success() {
        let rows = engineer_features(&series(1, 1, 3, 5.0));
        let registry = MapRegistry::default().with_model(key7(1, 1), mean_model(1.0));
        let err = run_store_forecast(&rows, &registry).unwrap_err();
        assert!(matches!(err, ForecastError::NoUsableEntities));
    }

    #[test]
    fn warehouse_forecast_sums_across_stores_per_item() {
        let mut observations = series(1, 1, 30, 4.0);
        observations.extend(series(2, 1, 30, 6.0));
        observations.extend(series(1, 2, 30, 1.0));
        let rows = engineer_features(&observations);

        let registry = MapRegistry::default()
            .with_model(key30(1, 1), mean_model(30.0))
            .with_model(key30(2, 1), mean_model(30.0))
            .with_model(key30(1, 2), mean_model(30.0));

        let forecasts = run_warehouse_forecast(&rows, &registry).unwrap();
        assert_eq!(forecasts.len(), 2);
        // Item 1: store 1 predicts 120, store 2 predicts 180 -> 300 total.
        assert_eq!(forecasts[0].item, ItemId::new(1));
        assert_eq!(forecasts[0].predicted_total, 300.0);
        assert_eq!(forecasts[1].item, ItemId::new(2));
        assert_eq!(forecasts[1].predicted_total, 30.0);
    }

    #[test]
    fn warehouse_forecast_requires_thirty_rows_per_series() {
        let mut observations = series(1, 1, 30, 4.0);
        observations.extend(series(2, 1, 29, 100.0)); // one row short
        let rows = engineer_features(&observations);

        let registry = MapRegistry::default()
            .with_model(key30(1, 1), mean_model(30.0))
            .with_model(key30(2, 1), mean_model(30.0));

        let forecasts = run_warehouse_forecast(&rows, &registry).unwrap();
        assert_eq!(forecasts.len(), 1);
        assert_eq!(forecasts[0].predicted_total, 120.0);
    }
}
