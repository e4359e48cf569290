//! In-memory order registry.
//!
//! Holds every order the engine knows about, keyed by `ClOrdID`. Orders are
//! wrapped in per-order mutexes so updates to the same order serialize while
//! updates to different orders proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::aggregate::Order;
use crate::domain::order::errors::OrderError;
use crate::domain::order::events::OrderEvent;
use crate::domain::order::value_objects::{Execution, OrderSide, OrderStatus};
use crate::domain::shared::{ClOrdId, Price, Quantity, Symbol, Timestamp};

/// Point-in-time view of an order for blotters and persistence queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// Client order identifier.
    pub cl_ord_id: ClOrdId,
    /// Symbol.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Total order quantity.
    pub quantity: Quantity,
    /// Limit price.
    pub price: Price,
    /// Current status.
    pub status: OrderStatus,
    /// Quantity filled so far.
    pub cum_qty: Quantity,
    /// Quantity still open.
    pub leaves_qty: Quantity,
    /// Volume-weighted average fill price.
    pub avg_px: Price,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Last update timestamp.
    pub updated_at: Timestamp,
}

impl OrderSnapshot {
    /// Order value at the limit price (quantity x price).
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.quantity.amount() * self.price.amount()
    }
}

impl From<&Order> for OrderSnapshot {
    fn from(order: &Order) -> Self {
        Self {
            cl_ord_id: order.cl_ord_id().clone(),
            symbol: order.symbol().clone(),
            side: order.side(),
            quantity: order.quantity(),
            price: order.price(),
            status: order.status(),
            cum_qty: order.fill().cum_qty(),
            leaves_qty: order.fill().leaves_qty(),
            avg_px: order.fill().avg_px(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

/// Thread-safe registry of orders keyed by `ClOrdID`.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: RwLock<HashMap<ClOrdId, Arc<Mutex<Order>>>>,
}

impl OrderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new order.
    ///
    /// # Errors
    ///
    /// Returns error if an order with the same `ClOrdID` already exists.
    pub fn insert(&self, order: Order) -> Result<(), OrderError> {
        let cl_ord_id = order.cl_ord_id().clone();
        let mut orders = self.orders.write();

        if orders.contains_key(&cl_ord_id) {
            return Err(OrderError::DuplicateClOrdId { cl_ord_id });
        }

        orders.insert(cl_ord_id, Arc::new(Mutex::new(order)));
        Ok(())
    }

    /// Returns true if an order with this `ClOrdID` is registered.
    #[must_use]
    pub fn contains(&self, cl_ord_id: &ClOrdId) -> bool {
        self.orders.read().contains_key(cl_ord_id)
    }

    /// Mark a cancel request as pending on an order.
    ///
    /// # Errors
    ///
    /// Returns error if the order is unknown or not cancelable.
    pub fn request_cancel(&self, cl_ord_id: &ClOrdId) -> Result<(), OrderError> {
        self.with_order(cl_ord_id, Order::request_cancel)
    }

    /// Apply an execution report to the order it references.
    ///
    /// Returns the domain events the order generated.
    ///
    /// # Errors
    ///
    /// Returns error if the referenced order is unknown or the report
    /// implies an illegal transition.
    pub fn apply_execution(&self, execution: &Execution) -> Result<Vec<OrderEvent>, OrderError> {
        self.with_order(&execution.cl_ord_id, |order| {
            order.apply_execution(execution)?;
            Ok(order.drain_events())
        })
    }

    /// Apply a cancel reject to the order it references.
    ///
    /// The order state is unchanged; the pending-cancel flag is cleared.
    ///
    /// # Errors
    ///
    /// Returns error if the referenced order is unknown.
    pub fn apply_cancel_reject(
        &self,
        cl_ord_id: &ClOrdId,
        reason: &str,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.with_order(cl_ord_id, |order| {
            order.cancel_rejected(reason);
            Ok(order.drain_events())
        })
    }

    /// Get a snapshot of a single order.
    #[must_use]
    pub fn snapshot(&self, cl_ord_id: &ClOrdId) -> Option<OrderSnapshot> {
        let entry = self.orders.read().get(cl_ord_id).cloned()?;
        let order = entry.lock();
        Some(OrderSnapshot::from(&*order))
    }

    /// Snapshot every order, newest first.
    #[must_use]
    pub fn blotter(&self) -> Vec<OrderSnapshot> {
        let entries: Vec<Arc<Mutex<Order>>> = self.orders.read().values().cloned().collect();

        let mut snapshots: Vec<OrderSnapshot> = entries
            .iter()
            .map(|entry| OrderSnapshot::from(&*entry.lock()))
            .collect();

        snapshots.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.cl_ord_id.as_str().cmp(a.cl_ord_id.as_str()))
        });

        snapshots
    }

    /// Total number of registered orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    /// Returns true if no orders are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }

    /// Number of orders in a non-terminal status.
    #[must_use]
    pub fn active_count(&self) -> usize {
        let entries: Vec<Arc<Mutex<Order>>> = self.orders.read().values().cloned().collect();
        entries
            .iter()
            .filter(|entry| entry.lock().status().is_active())
            .count()
    }

    /// Run a closure against one order under its lock.
    ///
    /// The map read lock is released before the per-order mutex is taken,
    /// so operations on different orders never contend.
    fn with_order<T>(
        &self,
        cl_ord_id: &ClOrdId,
        f: impl FnOnce(&mut Order) -> Result<T, OrderError>,
    ) -> Result<T, OrderError> {
        let entry = self.orders.read().get(cl_ord_id).cloned();
        let entry = entry.ok_or_else(|| OrderError::UnknownOrder {
            cl_ord_id: cl_ord_id.clone(),
        })?;

        let mut order = entry.lock();
        f(&mut order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::aggregate::NewOrderCommand;
    use crate::domain::shared::ExecId;

    fn make_order(cl_ord_id: &str) -> Order {
        Order::new(NewOrderCommand {
            cl_ord_id: ClOrdId::new(cl_ord_id),
            symbol: Symbol::new("AAPL"),
            side: OrderSide::Buy,
            quantity: Quantity::from_i64(10),
            price: Price::from_f64(202.0),
        })
        .unwrap()
    }

    fn make_ack(cl_ord_id: &str) -> Execution {
        Execution::new(
            ExecId::generate(),
            ClOrdId::new(cl_ord_id),
            OrderStatus::Acknowledged,
            Quantity::ZERO,
            Timestamp::now(),
        )
    }

    #[test]
    fn registry_insert_and_lookup() {
        let registry = OrderRegistry::new();
        registry.insert(make_order("ORD001")).unwrap();

        assert!(registry.contains(&ClOrdId::new("ORD001")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_rejects_duplicate_cl_ord_id() {
        let registry = OrderRegistry::new();
        registry.insert(make_order("ORD001")).unwrap();

        let result = registry.insert(make_order("ORD001"));
        assert!(matches!(result, Err(OrderError::DuplicateClOrdId { .. })));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_apply_execution_unknown_order() {
        let registry = OrderRegistry::new();

        let result = registry.apply_execution(&make_ack("ORD999"));
        assert!(matches!(result, Err(OrderError::UnknownOrder { .. })));
    }

    #[test]
    fn registry_apply_execution_returns_events() {
        let registry = OrderRegistry::new();
        registry.insert(make_order("ORD001")).unwrap();

        let events = registry.apply_execution(&make_ack("ORD001")).unwrap();
        assert!(events.iter().any(|e| matches!(e, OrderEvent::Acknowledged(_))));

        let snapshot = registry.snapshot(&ClOrdId::new("ORD001")).unwrap();
        assert_eq!(snapshot.status, OrderStatus::Acknowledged);
    }

    #[test]
    fn registry_apply_cancel_reject_keeps_status() {
        let registry = OrderRegistry::new();
        registry.insert(make_order("ORD001")).unwrap();
        registry.apply_execution(&make_ack("ORD001")).unwrap();
        registry.request_cancel(&ClOrdId::new("ORD001")).unwrap();

        let events = registry
            .apply_cancel_reject(&ClOrdId::new("ORD001"), "too late")
            .unwrap();
        assert!(matches!(events[0], OrderEvent::CancelRejected(_)));

        let snapshot = registry.snapshot(&ClOrdId::new("ORD001")).unwrap();
        assert_eq!(snapshot.status, OrderStatus::Acknowledged);
    }

    #[test]
    fn registry_blotter_newest_first() {
        let registry = OrderRegistry::new();
        registry.insert(make_order("ORD001")).unwrap();
        registry.insert(make_order("ORD002")).unwrap();

        let blotter = registry.blotter();
        assert_eq!(blotter.len(), 2);
        assert_eq!(blotter[0].cl_ord_id.as_str(), "ORD002");
        assert_eq!(blotter[1].cl_ord_id.as_str(), "ORD001");
    }

    #[test]
    fn registry_active_count_excludes_terminal() {
        let registry = OrderRegistry::new();
        registry.insert(make_order("ORD001")).unwrap();
        registry.insert(Order::rejected(
            NewOrderCommand {
                cl_ord_id: ClOrdId::new("ORD002"),
                symbol: Symbol::new("AAPL"),
                side: OrderSide::Buy,
                quantity: Quantity::ZERO,
                price: Price::from_f64(202.0),
            },
            "Order quantity must be positive",
        ))
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn snapshot_notional() {
        let registry = OrderRegistry::new();
        registry.insert(make_order("ORD001")).unwrap();

        let snapshot = registry.snapshot(&ClOrdId::new("ORD001")).unwrap();
        assert_eq!(snapshot.notional(), Decimal::from(2020));
    }
}
