//! Supplier records and evaluation.
//!
//! Suppliers carry a fixed set of evaluation metrics (the vector the supplier
//! scoring model was trained against) plus a blacklist flag. They are created
//! by procurement staff, mutated by metric edits and blacklist toggling, and
//! never hard-deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplyline_core::{DomainError, DomainResult, SupplierId};

/// Number of metrics in the evaluation vector.
pub const METRIC_COUNT: usize = 11;

/// Evaluation metrics, in the order the scoring model expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplierMetrics {
    /// Percentage, 0–100.
    pub on_time_delivery_rate: f64,
    /// Percentage, 0–100.
    pub order_accuracy_rate: f64,
    /// Days, non-negative.
    pub lead_time: f64,
    /// Percentage, 0–100.
    pub fulfillment_rate: f64,
    /// Percentage, 0–100.
    pub defect_rate: f64,
    /// Percentage, 0–100.
    pub return_rate: f64,
    /// Dollars, non-negative.
    pub unit_price: f64,
    /// Rating, 1–10.
    pub responsiveness_score: f64,
    /// Rating, 1–10.
    pub flexibility_rating: f64,
    /// Non-negative.
    pub years_in_business: f64,
    /// Rating, 1–10.
    pub customer_satisfaction_rating: f64,
}

impl SupplierMetrics {
    /// Validate every metric against its documented range.
    pub fn validate(&self) -> DomainResult<()> {
        let percentages = [
            ("on_time_delivery_rate", self.on_time_delivery_rate),
            ("order_accuracy_rate", self.order_accuracy_rate),
            ("fulfillment_rate", self.fulfillment_rate),
            ("defect_rate", self.defect_rate),
            ("return_rate", self.return_rate),
        ];
        for (name, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(DomainError::validation(format!(
                    "{name} must be between 0 and 100, got {value}"
                )));
            }
        }

        let ratings = [
            ("responsiveness_score", self.responsiveness_score),
            ("flexibility_rating", self.flexibility_rating),
            (
                "customer_satisfaction_rating",
                self.customer_satisfaction_rating,
            ),
        ];
        for (name, value) in ratings {
            if !(1.0..=10.0).contains(&value) {
                return Err(DomainError::validation(format!(
                    "{name} must be between 1 and 10, got {value}"
                )));
            }
        }

        let non_negative = [
            ("lead_time", self.lead_time),
            ("unit_price", self.unit_price),
            ("years_in_business", self.years_in_business),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(DomainError::validation(format!(
                    "{name} cannot be negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// The fixed metric vector for the scoring model. Order must not change.
    pub fn evaluation_vector(&self) -> [f64; METRIC_COUNT] {
        [
            self.on_time_delivery_rate,
            self.order_accuracy_rate,
            self.lead_time,
            self.fulfillment_rate,
            self.defect_rate,
            self.return_rate,
            self.unit_price,
            self.responsiveness_score,
            self.flexibility_rating,
            self.years_in_business,
            self.customer_satisfaction_rating,
        ]
    }
}

/// A supplier record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub metrics: SupplierMetrics,
    pub is_blacklisted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(id: SupplierId, metrics: SupplierMetrics, now: DateTime<Utc>) -> DomainResult<Self> {
        metrics.validate()?;
        Ok(Self {
            id,
            metrics,
            is_blacklisted: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_metrics(&mut self, metrics: SupplierMetrics, now: DateTime<Utc>) -> DomainResult<()> {
        metrics.validate()?;
        self.metrics = metrics;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_blacklisted(&mut self, blacklisted: bool, now: DateTime<Utc>) {
        self.is_blacklisted = blacklisted;
        self.updated_at = now;
    }
}

/// A scored supplier, produced by the evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierScore {
    pub supplier_id: SupplierId,
    pub score: f64,
}

/// Rank scored suppliers best-first. Ties break on supplier id for
/// determinism.
pub fn rank_by_score(mut scores: Vec<SupplierScore>) -> Vec<SupplierScore> {
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then(a.supplier_id.cmp(&b.supplier_id))
    });
    scores
}
