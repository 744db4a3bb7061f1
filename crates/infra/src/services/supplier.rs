//! Supplier management and model-backed evaluation.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use supplyline_core::{AuditSink, DomainError, DomainResult, SupplierId, UserId};
use supplyline_forecast::{PredictorKey, PredictorRegistry, RegistryError};
use supplyline_procurement::{rank_by_score, Supplier, SupplierMetrics, SupplierScore};

use crate::services::report;
use crate::store::RecordStore;

/// Supplier registry operations and the scoring run.
pub struct SupplierService<S, R> {
    store: Arc<S>,
    registry: Arc<R>,
    audit: Arc<dyn AuditSink>,
}

impl<S: RecordStore, R: PredictorRegistry> SupplierService<S, R> {
    pub fn new(store: Arc<S>, registry: Arc<R>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            registry,
            audit,
        }
    }

    pub fn add_supplier(
        &self,
        id: SupplierId,
        metrics: SupplierMetrics,
        actor: Option<UserId>,
    ) -> DomainResult<Supplier> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            if records.suppliers.contains_key(&id) {
                return Err(DomainError::conflict(format!("supplier {id} already exists")));
            }
            let supplier = Supplier::new(id, metrics, now)?;
            records.suppliers.insert(id, supplier.clone());
            Ok(supplier)
        });

        report(
            self.audit.as_ref(),
            actor,
            "procurement",
            "add_supplier",
            &result,
            |s| format!("added supplier {}", s.id),
        );
        result
    }

    pub fn update_supplier(
        &self,
        id: SupplierId,
        metrics: SupplierMetrics,
        actor: Option<UserId>,
    ) -> DomainResult<Supplier> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            let supplier = records
                .suppliers
                .get_mut(&id)
                .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))?;
            supplier.update_metrics(metrics, now)?;
            Ok(supplier.clone())
        });

        report(
            self.audit.as_ref(),
            actor,
            "procurement",
            "update_supplier",
            &result,
            |s| format!("updated metrics for supplier {}", s.id),
        );
        result
    }

    pub fn set_blacklisted(
        &self,
        id: SupplierId,
        blacklisted: bool,
        actor: Option<UserId>,
    ) -> DomainResult<Supplier> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            let supplier = records
                .suppliers
                .get_mut(&id)
                .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))?;
            supplier.set_blacklisted(blacklisted, now);
            Ok(supplier.clone())
        });

        report(
            self.audit.as_ref(),
            actor,
            "procurement",
            "set_blacklisted",
            &result,
            |s| {
                format!(
                    "supplier {} {}",
                    s.id,
                    if blacklisted { "blacklisted" } else { "removed from blacklist" }
                )
            },
        );
        result
    }

    pub fn suppliers(&self, include_blacklisted: bool) -> DomainResult<Vec<Supplier>> {
        self.store.read(|records| {
            Ok(records
                .suppliers
                .values()
                .filter(|s| include_blacklisted || !s.is_blacklisted)
                .cloned()
                .collect())
        })
    }

    pub fn supplier(&self, id: SupplierId) -> DomainResult<Supplier> {
        self.store.read(|records| {
            records
                .suppliers
                .get(&id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))
        })
    }

    /// Score every non-blacklisted supplier with the evaluation model and
    /// rank best-first. A supplier whose scoring fails is skipped with a
    /// diagnostic; an empty outcome is `NoData`, not an empty success.
    pub fn evaluate_suppliers(&self, actor: Option<UserId>) -> DomainResult<Vec<SupplierScore>> {
        let result = self.evaluate_inner();
        report(
            self.audit.as_ref(),
            actor,
            "procurement",
            "evaluate_suppliers",
            &result,
            |scores| format!("evaluated {} suppliers", scores.len()),
        );
        result
    }

    fn evaluate_inner(&self) -> DomainResult<Vec<SupplierScore>> {
        let suppliers = self.suppliers(false)?;
        if suppliers.is_empty() {
            return Err(DomainError::no_data("no suppliers to evaluate"));
        }

        let predictor = match self.registry.lookup(&PredictorKey::SupplierScore) {
            Ok(Some(predictor)) => predictor,
            Ok(None) => {
                return Err(DomainError::internal("supplier scoring model not available"));
            }
            Err(RegistryError::Load(msg)) => return Err(DomainError::internal(msg)),
            Err(RegistryError::Unavailable(msg)) => return Err(DomainError::internal(msg)),
        };

        let mut scores = Vec::with_capacity(suppliers.len());
        for supplier in &suppliers {
            match predictor.predict(&supplier.metrics.evaluation_vector()) {
                Ok(score) => scores.push(SupplierScore {
                    supplier_id: supplier.id,
                    score,
                }),
                Err(e) => {
                    warn!(supplier = %supplier.id, error = %e, "supplier scoring failed, skipping");
                }
            }
        }
        if scores.is_empty() {
            return Err(DomainError::no_data("no supplier produced a score"));
        }
        Ok(rank_by_score(scores))
    }
}
