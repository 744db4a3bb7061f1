//! Infrastructure layer: the persistence collaborator, the predictor
//! registry, the audit sink, and the services that compose the pure domain
//! crates into the externally-triggered operations (forecast generation,
//! reconciliation, fulfillment, sales capture, supplier management).
//!
//! Every public service operation runs as one atomic unit of work against the
//! record store (all writes commit together or the operation rolls back) and
//! reports exactly one audit entry per attempt.

pub mod audit;
pub mod registry;
pub mod services;
pub mod store;


pub use audit::InMemoryAuditSink;
pub use registry::{InMemoryPredictorRegistry, JsonModelDir};
pub use services::{
    FulfillmentService, PlanningService, PoAction, SalesService, SupplierService,
};
pub use store::{
    InMemoryRecordStore, ItemForecastRecord, RecordStore, Records, StoreForecastRecord,
};
