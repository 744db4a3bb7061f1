//! Predictor contract and registry.
//!
//! Predictors are pre-trained scalar regressors, loaded by key at inference
//! time. Training is out of scope: a predictor is an opaque function from a
//! fixed feature vector to one scalar. The registry seam keeps the inference
//! runner decoupled from how models are stored (filesystem, cache, service).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use supplyline_core::{ItemId, StoreId};

/// An opaque pre-trained scalar regressor.
///
/// `predict` failures are model-internal and unpredictable, hence `anyhow`;
/// the runner catches them and skips the entity, they never propagate.
pub trait Predictor: std::fmt::Debug + Send + Sync {
    fn predict(&self, features: &[f64]) -> anyhow::Result<f64>;
}

/// Deterministic lookup key: entity identifiers + horizon (or the supplier
/// scoring model, which is entity-free).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PredictorKey {
    /// 7-day demand model for one (store, item) series.
    StoreItem7 { store: StoreId, item: ItemId },
    /// 30-day demand model for one (store, item) series.
    StoreItem30 { store: StoreId, item: ItemId },
    /// Supplier evaluation model over the fixed metric vector.
    SupplierScore,
}

impl PredictorKey {
    /// Stable file stem for keyed stores (mirrors the naming scheme the
    /// models were exported under).
    pub fn file_stem(&self) -> String {
        match self {
            PredictorKey::StoreItem7 { store, item } => {
                format!("{store}_{item}_target_7_day_sales")
            }
            PredictorKey::StoreItem30 { store, item } => {
                format!("{store}_{item}_target_30_day_sales")
            }
            PredictorKey::SupplierScore => "supplier_model".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The backing store itself is absent or unreadable. Fatal for a run.
    #[error("predictor store unavailable: {0}")]
    Unavailable(String),

    /// A model exists but could not be loaded. The entity is skipped.
    #[error("failed to load predictor: {0}")]
    Load(String),
}

/// Keyed store of predictors.
///
/// `Ok(None)` means no model exists for this key — a per-entity skip, never a
/// run-level failure.
pub trait PredictorRegistry: Send + Sync {
    fn lookup(&self, key: &PredictorKey) -> Result<Option<Arc<dyn Predictor>>, RegistryError>;
}

/// Linear regressor in the serialized form the models ship in
/// (JSON: coefficients + intercept).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPredictor {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl Predictor for LinearPredictor {
    fn predict(&self, features: &[f64]) -> anyhow::Result<f64> {
        if features.len() != self.coefficients.len() {
            anyhow::bail!(
                "feature vector length {} does not match model arity {}",
                features.len(),
                self.coefficients.len()
            );
        }
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(c, x)| c * x)
            .sum();
        Ok(dot + self.intercept)
    }
}
