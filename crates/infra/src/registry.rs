//! Predictor registry implementations.
//!
//! `JsonModelDir` serves pre-trained models from a directory of JSON linear
//! regressors, one file per key stem. `InMemoryPredictorRegistry` backs tests.
//! Both sit behind the `PredictorRegistry` seam so the inference runner never
//! sees paths or formats.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use supplyline_forecast::{
    LinearPredictor, Predictor, PredictorKey, PredictorRegistry, RegistryError,
};

/// Filesystem-backed registry: `<dir>/<key stem>.json`.
///
/// Model-file reads are local, read-only and safely repeatable; nothing is
/// cached across calls.
#[derive(Debug, Clone)]
pub struct JsonModelDir {
    dir: PathBuf,
}

impl JsonModelDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PredictorRegistry for JsonModelDir {
    fn lookup(&self, key: &PredictorKey) -> Result<Option<Arc<dyn Predictor>>, RegistryError> {
        if !self.dir.is_dir() {
            return Err(RegistryError::Unavailable(format!(
                "model directory not found: {}",
                self.dir.display()
            )));
        }

        let path = self.dir.join(format!("{}.json", key.file_stem()));
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&path)
            .map_err(|e| RegistryError::Load(format!("{}: {e}", path.display())))?;
        let model: LinearPredictor = serde_json::from_str(&raw)
            .map_err(|e| RegistryError::Load(format!("{}: {e}", path.display())))?;
        Ok(Some(Arc::new(model)))
    }
}

/// Map-backed registry for tests and development.
#[derive(Default)]
pub struct InMemoryPredictorRegistry {
    models: HashMap<String, Arc<dyn Predictor>>,
}

impl InMemoryPredictorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: PredictorKey, predictor: Arc<dyn Predictor>) {
        self.models.insert(key.file_stem(), predictor);
    }

    pub fn with(mut self, key: PredictorKey, predictor: Arc<dyn Predictor>) -> Self {
        self.insert(key, predictor);
        self
    }
}

impl PredictorRegistry for InMemoryPredictorRegistry {
    fn lookup(&self, key: &PredictorKey) -> Result<Option<Arc<dyn Predictor>>, RegistryError> {
        Ok(self.models.get(&key.file_stem()).cloned())
    }
}
