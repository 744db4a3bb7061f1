//! `supplyline-forecast`
//!
//! **Responsibility:** demand forecasting boundary — feature engineering over
//! the sales time series, the predictor contract/registry, and the per-entity
//! inference runner for both horizons.
//!
//! This crate is intentionally **not** part of the stock/procurement domain:
//! - It must not mutate domain state (stock levels, requests).
//! - It consumes sales snapshots provided by callers and emits forecast
//!   results; persisting them is the infrastructure layer's job.

pub mod features;
pub mod predictor;
pub mod runner;

pub use features::{FeatureRow, SalesObservation, TrainingTargets, FEATURE_COUNT};
pub use predictor::{LinearPredictor, Predictor, PredictorKey, PredictorRegistry, RegistryError};
pub use runner::{ForecastError, ItemForecast, StoreItemForecast};
