//! Stock domain module.
//!
//! This crate contains business rules for stock levels and replenishment,
//! implemented purely as deterministic domain logic (no IO, no storage):
//! store/warehouse stock counters, the replenishment-request state machine,
//! and the reconciliation planner that turns forecast + stock into restock
//! needs.

pub mod level;
pub mod reconcile;
pub mod request;

pub use level::{StoreStock, WarehouseStock};
pub use reconcile::{plan_restocking, RestockNeed};
pub use request::{
    decide_transfer, ReplenishmentRequest, RequestStatus, StoreItemKey, StoreRequest,
    TransferDecision, WarehouseRequest,
};
