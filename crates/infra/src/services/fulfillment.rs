//! Request approval, stock adjustments, purchase orders, and the
//! supplier-facing confirmation flow.
//!
//! Store-request approval is all-or-nothing: the warehouse either covers the
//! full quantity (deduct warehouse, receive store, approve) or the request is
//! auto-rejected. The auto-rejection is itself a committed state change — the
//! request lands in `rejected` even though the caller gets an error back.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use supplyline_core::{
    AuditEntry, AuditSink, AuditStatus, DomainError, DomainResult, ItemId, RecordId, StoreId,
    SupplierId, UserId,
};
use supplyline_procurement::{
    ConfirmationAction, PurchaseOrder, StagedConfirmation, SupplierTransaction,
};
use supplyline_stock::{
    decide_transfer, StoreItemKey, StoreRequest, StoreStock, TransferDecision, WarehouseRequest,
    WarehouseStock,
};

use crate::services::report;
use crate::store::RecordStore;

/// What to do with a purchase order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PoAction {
    Accept,
    Reject,
    Complete,
}

impl core::fmt::Display for PoAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            PoAction::Accept => "accept",
            PoAction::Reject => "reject",
            PoAction::Complete => "complete",
        })
    }
}

/// Committed outcome of a store-request approval attempt.
enum ApprovalOutcome {
    Approved { key: StoreItemKey, quantity: f64 },
    AutoRejected { key: StoreItemKey, quantity: f64, on_hand: f64 },
}

/// Fulfillment and procurement operations.
pub struct FulfillmentService<S> {
    store: Arc<S>,
    audit: Arc<dyn AuditSink>,
}

impl<S: RecordStore> FulfillmentService<S> {
    pub fn new(store: Arc<S>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    /// Approve or reject a pending store request.
    ///
    /// On approval the requested quantity moves warehouse → store in the same
    /// transaction. If the warehouse cannot cover the full quantity the
    /// request is auto-rejected (committed) and the call reports a
    /// business-rule error.
    pub fn process_store_request(
        &self,
        request_id: RecordId,
        approve: bool,
        actor: Option<UserId>,
    ) -> DomainResult<()> {
        let now = Utc::now();

        if !approve {
            let result = self.store.with_tx(|records| {
                let request = records
                    .store_request_mut(request_id)
                    .ok_or_else(|| DomainError::not_found(format!("store request {request_id}")))?;
                let key = request.key;
                request.reject(now)?;
                Ok(key)
            });
            report(
                self.audit.as_ref(),
                actor,
                "inventory",
                "process_store_request",
                &result,
                |key| format!("rejected store request for {key}"),
            );
            return result.map(|_| ());
        }

        let outcome = self.store.with_tx(|records| {
            let idx = records
                .store_requests
                .iter()
                .position(|r| r.id == request_id)
                .ok_or_else(|| DomainError::not_found(format!("store request {request_id}")))?;
            let key = records.store_requests[idx].key;
            let quantity = records.store_requests[idx].requested_quantity;
            let on_hand = records
                .warehouse_stock
                .get(&key.item)
                .map_or(0.0, |s| s.on_hand);

            match decide_transfer(quantity, on_hand) {
                TransferDecision::Approve => {
                    records
                        .warehouse_stock
                        .entry(key.item)
                        .or_insert_with(|| WarehouseStock::new(key.item, 0.0, now))
                        .deduct(quantity, now)?;
                    records
                        .store_stock
                        .entry(key)
                        .or_insert_with(|| StoreStock::new(key.store, key.item, 0.0, now))
                        .receive(quantity, now);
                    records.store_requests[idx].approve(now)?;
                    Ok(ApprovalOutcome::Approved { key, quantity })
                }
                TransferDecision::InsufficientStock => {
                    records.store_requests[idx].reject(now)?;
                    Ok(ApprovalOutcome::AutoRejected { key, quantity, on_hand })
                }
            }
        });

        let (status, description, result) = match outcome {
            Ok(ApprovalOutcome::Approved { key, quantity }) => (
                AuditStatus::Success,
                format!("approved store request for {key}: transferred {quantity}"),
                Ok(()),
            ),
            Ok(ApprovalOutcome::AutoRejected { key, quantity, on_hand }) => {
                let message = format!(
                    "auto-rejected store request for {key}: {quantity} requested, {on_hand} in warehouse"
                );
                (
                    AuditStatus::Error,
                    message.clone(),
                    Err(DomainError::business_rule(message)),
                )
            }
            Err(e) => (AuditStatus::Error, e.to_string(), Err(e)),
        };
        self.audit.record(AuditEntry::new(
            actor,
            "inventory",
            "process_store_request",
            description,
            status,
            Utc::now(),
        ));
        result
    }

    /// Manual stock adjustment: receive `quantity` into one store.
    pub fn add_store_stock(
        &self,
        store: StoreId,
        item: ItemId,
        quantity: f64,
        actor: Option<UserId>,
    ) -> DomainResult<f64> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            if quantity <= 0.0 {
                return Err(DomainError::validation(format!(
                    "stock adjustment must be positive, got {quantity}"
                )));
            }
            let key = StoreItemKey { store, item };
            let level = records
                .store_stock
                .entry(key)
                .or_insert_with(|| StoreStock::new(store, item, 0.0, now));
            let old = level.on_hand;
            level.receive(quantity, now);
            Ok((old, level.on_hand))
        });

        report(
            self.audit.as_ref(),
            actor,
            "inventory",
            "add_store_stock",
            &result,
            |(old, new)| format!("stock for store {store}, item {item}: {old} -> {new}"),
        );
        result.map(|(_, new)| new)
    }

    /// Manual stock adjustment: receive `quantity` into the warehouse.
    pub fn add_warehouse_stock(
        &self,
        item: ItemId,
        quantity: f64,
        actor: Option<UserId>,
    ) -> DomainResult<f64> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            if quantity <= 0.0 {
                return Err(DomainError::validation(format!(
                    "stock adjustment must be positive, got {quantity}"
                )));
            }
            let level = records
                .warehouse_stock
                .entry(item)
                .or_insert_with(|| WarehouseStock::new(item, 0.0, now));
            let old = level.on_hand;
            level.receive(quantity, now);
            Ok((old, level.on_hand))
        });

        report(
            self.audit.as_ref(),
            actor,
            "warehouse",
            "add_warehouse_stock",
            &result,
            |(old, new)| format!("warehouse stock for item {item}: {old} -> {new}"),
        );
        result.map(|(_, new)| new)
    }

    pub fn pending_store_requests(&self) -> DomainResult<Vec<StoreRequest>> {
        self.store.read(|records| {
            let pending: Vec<StoreRequest> = records
                .store_requests
                .iter()
                .filter(|r| r.is_pending())
                .cloned()
                .collect();
            if pending.is_empty() {
                return Err(DomainError::no_data("no pending store requests"));
            }
            Ok(pending)
        })
    }

    pub fn pending_warehouse_requests(&self) -> DomainResult<Vec<WarehouseRequest>> {
        self.store.read(|records| {
            let pending: Vec<WarehouseRequest> = records
                .warehouse_requests
                .iter()
                .filter(|r| r.is_pending())
                .cloned()
                .collect();
            if pending.is_empty() {
                return Err(DomainError::no_data("no pending warehouse requests"));
            }
            Ok(pending)
        })
    }

    /// Create a purchase order covering every pending warehouse request,
    /// priced at the supplier's current unit price. The covered requests move
    /// to `processing`.
    pub fn create_purchase_order(
        &self,
        supplier_id: SupplierId,
        actor: Option<UserId>,
    ) -> DomainResult<PurchaseOrder> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            let supplier = records
                .suppliers
                .get(&supplier_id)
                .ok_or_else(|| DomainError::not_found(format!("supplier {supplier_id}")))?;
            if supplier.is_blacklisted {
                return Err(DomainError::business_rule(format!(
                    "supplier {supplier_id} is blacklisted"
                )));
            }
            let unit_price = supplier.metrics.unit_price;

            let items: Vec<(ItemId, f64)> = records
                .warehouse_requests
                .iter()
                .filter(|r| r.is_pending())
                .map(|r| (r.key, r.requested_quantity))
                .collect();
            if items.is_empty() {
                return Err(DomainError::no_data(
                    "no pending warehouse requests to order",
                ));
            }

            let order = PurchaseOrder::new(supplier_id, unit_price, &items, now)?;
            for request in records.warehouse_requests.iter_mut().filter(|r| r.is_pending()) {
                request.begin_processing(now)?;
            }
            records.purchase_orders.push(order.clone());
            Ok(order)
        });

        report(
            self.audit.as_ref(),
            actor,
            "procurement",
            "create_purchase_order",
            &result,
            |order| {
                format!(
                    "created purchase order {} for supplier {supplier_id}: {} lines, total {}",
                    order.number,
                    order.lines.len(),
                    order.total_amount
                )
            },
        );
        if let Ok(order) = &result {
            info!(number = %order.number, supplier = %supplier_id, "purchase order created");
        }
        result
    }

    pub fn purchase_orders(
        &self,
        supplier: Option<SupplierId>,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        self.store.read(|records| {
            let orders: Vec<PurchaseOrder> = records
                .purchase_orders
                .iter()
                .filter(|po| supplier.is_none_or(|s| po.supplier_id == s))
                .cloned()
                .collect();
            if orders.is_empty() {
                return Err(DomainError::no_data("no purchase orders found"));
            }
            Ok(orders)
        })
    }

    /// Accept, reject, or complete a purchase order.
    ///
    /// Rejection returns the covered warehouse requests to the pending pool;
    /// completion receives every line into warehouse stock and closes the
    /// covered requests out.
    pub fn process_purchase_order(
        &self,
        order_id: RecordId,
        action: PoAction,
        actor: Option<UserId>,
    ) -> DomainResult<PurchaseOrder> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            let idx = records
                .purchase_orders
                .iter()
                .position(|po| po.id == order_id)
                .ok_or_else(|| DomainError::not_found(format!("purchase order {order_id}")))?;

            match action {
                PoAction::Accept => {
                    records.purchase_orders[idx].accept(now)?;
                }
                PoAction::Reject => {
                    records.purchase_orders[idx].reject(now)?;
                    let lines = records.purchase_orders[idx].lines.clone();
                    for line in &lines {
                        if let Some(request) = records.processing_warehouse_request_mut(line.item) {
                            request.revert_to_pending(now)?;
                        }
                    }
                }
                PoAction::Complete => {
                    records.purchase_orders[idx].complete(now)?;
                    let lines = records.purchase_orders[idx].lines.clone();
                    for line in &lines {
                        records
                            .warehouse_stock
                            .entry(line.item)
                            .or_insert_with(|| WarehouseStock::new(line.item, 0.0, now))
                            .receive(line.quantity, now);
                        if let Some(request) = records.processing_warehouse_request_mut(line.item) {
                            request.complete(now)?;
                        }
                    }
                }
            }
            Ok(records.purchase_orders[idx].clone())
        });

        report(
            self.audit.as_ref(),
            actor,
            "procurement",
            "process_purchase_order",
            &result,
            |order| format!("processed purchase order {} ({action}): now {}", order.number, order.status),
        );
        result
    }

    /// Stage a delivery for one supplier's confirm/reject decision.
    pub fn stage_confirmation(
        &self,
        item: ItemId,
        supplier_id: SupplierId,
        quantity: f64,
        actor: Option<UserId>,
    ) -> DomainResult<StagedConfirmation> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            if quantity <= 0.0 {
                return Err(DomainError::validation(format!(
                    "staged quantity must be positive, got {quantity}"
                )));
            }
            if !records.suppliers.contains_key(&supplier_id) {
                return Err(DomainError::not_found(format!("supplier {supplier_id}")));
            }
            let staged = StagedConfirmation::new(item, supplier_id, quantity, now);
            records.staged_confirmations.push(staged.clone());
            Ok(staged)
        });

        report(
            self.audit.as_ref(),
            actor,
            "procurement",
            "stage_confirmation",
            &result,
            |staged| {
                format!(
                    "staged {} of item {item} for supplier {supplier_id} confirmation",
                    staged.quantity
                )
            },
        );
        result
    }

    pub fn staged_confirmations(
        &self,
        supplier_id: SupplierId,
    ) -> DomainResult<Vec<StagedConfirmation>> {
        self.store.read(|records| {
            let staged: Vec<StagedConfirmation> = records
                .staged_confirmations
                .iter()
                .filter(|c| c.supplier_id == supplier_id)
                .cloned()
                .collect();
            if staged.is_empty() {
                return Err(DomainError::no_data(format!(
                    "no staged confirmations for supplier {supplier_id}"
                )));
            }
            Ok(staged)
        })
    }

    /// Apply one supplier's decision on a staged confirmation.
    ///
    /// Either way the staged record moves into the transaction ledger.
    /// Confirmation additionally delivers the quantity into the warehouse and
    /// clears every outstanding warehouse request for the item.
    pub fn process_confirmation(
        &self,
        supplier_id: SupplierId,
        confirmation_id: RecordId,
        action: ConfirmationAction,
        actor: Option<UserId>,
    ) -> DomainResult<SupplierTransaction> {
        let now = Utc::now();
        let result = self.store.with_tx(|records| {
            let idx = records
                .staged_confirmations
                .iter()
                .position(|c| c.id == confirmation_id && c.supplier_id == supplier_id)
                .ok_or_else(|| {
                    DomainError::not_found(format!(
                        "staged confirmation {confirmation_id} for supplier {supplier_id}"
                    ))
                })?;
            let staged = records.staged_confirmations.remove(idx);
            let item = staged.item;
            let quantity = staged.quantity;

            if action == ConfirmationAction::Confirm {
                records
                    .warehouse_stock
                    .entry(item)
                    .or_insert_with(|| WarehouseStock::new(item, 0.0, now))
                    .receive(quantity, now);
                records.warehouse_requests.retain(|r| r.key != item);
            }

            let transaction = staged.into_transaction(action, now);
            records.supplier_ledger.push(transaction.clone());
            Ok(transaction)
        });

        report(
            self.audit.as_ref(),
            actor,
            "procurement",
            "process_confirmation",
            &result,
            |tx| {
                format!(
                    "supplier {supplier_id} {} delivery of {} for item {}",
                    tx.status, tx.quantity, tx.item
                )
            },
        );
        result
    }

    pub fn supplier_ledger(
        &self,
        supplier: Option<SupplierId>,
    ) -> DomainResult<Vec<SupplierTransaction>> {
        self.store.read(|records| {
            let transactions: Vec<SupplierTransaction> = records
                .supplier_ledger
                .iter()
                .filter(|tx| supplier.is_none_or(|s| tx.supplier_id == s))
                .cloned()
                .collect();
            if transactions.is_empty() {
                return Err(DomainError::no_data("no supplier transactions found"));
            }
            Ok(transactions)
        })
    }
}
