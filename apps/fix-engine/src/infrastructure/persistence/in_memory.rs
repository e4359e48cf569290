//! In-memory order event journal.
//!
//! Append-only event log plus a per-order projection for blotter queries.
//! The projection mirrors how the registry reports orders: a `Canceled`
//! row keeps its unfilled remainder, only fills move `leaves_qty`.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::ports::{PersistenceError, PersistencePort};
use crate::domain::order::{OrderEvent, OrderSnapshot, OrderStatus};
use crate::domain::shared::{ClOrdId, Price, Quantity};

#[derive(Debug, Default)]
struct Inner {
    events: Vec<OrderEvent>,
    rows: HashMap<ClOrdId, OrderSnapshot>,
}

/// Journal holding all order events in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    inner: RwLock<Inner>,
}

impl InMemoryPersistence {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the raw event log, in append order.
    #[must_use]
    pub fn events(&self) -> Vec<OrderEvent> {
        self.inner.read().events.clone()
    }

    /// Number of journaled events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.inner.read().events.len()
    }

    fn project(rows: &mut HashMap<ClOrdId, OrderSnapshot>, event: &OrderEvent) {
        match event {
            OrderEvent::Submitted(e) => {
                rows.insert(
                    e.cl_ord_id.clone(),
                    OrderSnapshot {
                        cl_ord_id: e.cl_ord_id.clone(),
                        symbol: e.symbol.clone(),
                        side: e.side,
                        quantity: e.quantity,
                        price: e.price,
                        status: OrderStatus::New,
                        cum_qty: Quantity::ZERO,
                        leaves_qty: e.quantity,
                        avg_px: Price::ZERO,
                        created_at: e.occurred_at,
                        updated_at: e.occurred_at,
                    },
                );
            }
            OrderEvent::Acknowledged(e) => {
                if let Some(row) = rows.get_mut(&e.cl_ord_id) {
                    row.status = OrderStatus::Acknowledged;
                    row.updated_at = e.occurred_at;
                }
            }
            OrderEvent::PartiallyFilled(e) => {
                if let Some(row) = rows.get_mut(&e.cl_ord_id) {
                    row.status = OrderStatus::PartiallyFilled;
                    row.cum_qty = e.cum_qty;
                    row.leaves_qty = e.leaves_qty;
                    row.avg_px = e.avg_px;
                    row.updated_at = e.occurred_at;
                }
            }
            OrderEvent::Filled(e) => {
                if let Some(row) = rows.get_mut(&e.cl_ord_id) {
                    row.status = OrderStatus::Filled;
                    row.cum_qty = e.total_qty;
                    row.leaves_qty = Quantity::ZERO;
                    row.avg_px = e.avg_px;
                    row.updated_at = e.occurred_at;
                }
            }
            OrderEvent::Canceled(e) => {
                if let Some(row) = rows.get_mut(&e.cl_ord_id) {
                    row.status = OrderStatus::Canceled;
                    row.cum_qty = e.filled_qty;
                    row.updated_at = e.occurred_at;
                }
            }
            OrderEvent::Rejected(e) => {
                // A validation rejection is the first event of its order,
                // so the row may not exist yet.
                let row = rows.entry(e.cl_ord_id.clone()).or_insert_with(|| {
                    OrderSnapshot {
                        cl_ord_id: e.cl_ord_id.clone(),
                        symbol: e.symbol.clone(),
                        side: e.side,
                        quantity: e.quantity,
                        price: e.price,
                        status: OrderStatus::Rejected,
                        cum_qty: Quantity::ZERO,
                        leaves_qty: e.quantity,
                        avg_px: Price::ZERO,
                        created_at: e.occurred_at,
                        updated_at: e.occurred_at,
                    }
                });
                row.status = OrderStatus::Rejected;
                row.updated_at = e.occurred_at;
            }
            OrderEvent::CancelRejected(e) => {
                if let Some(row) = rows.get_mut(&e.cl_ord_id) {
                    row.updated_at = e.occurred_at;
                }
            }
        }
    }
}

#[async_trait]
impl PersistencePort for InMemoryPersistence {
    async fn persist(&self, event: &OrderEvent) -> Result<(), PersistenceError> {
        let mut inner = self.inner.write();
        Self::project(&mut inner.rows, event);
        inner.events.push(event.clone());
        Ok(())
    }

    async fn query_all(&self) -> Result<Vec<OrderSnapshot>, PersistenceError> {
        let inner = self.inner.read();
        let mut rows: Vec<OrderSnapshot> = inner.rows.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.cl_ord_id.as_str().cmp(a.cl_ord_id.as_str()))
        });
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::events::{
        OrderAcknowledged, OrderFilled, OrderPartiallyFilled, OrderRejected, OrderSubmitted,
    };
    use crate::domain::order::OrderSide;
    use crate::domain::shared::{Symbol, Timestamp};

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse_fix_sending_time(raw).unwrap()
    }

    fn submitted(cl_ord_id: &str, at: Timestamp) -> OrderEvent {
        OrderEvent::Submitted(OrderSubmitted {
            cl_ord_id: ClOrdId::new(cl_ord_id),
            symbol: Symbol::new("AAPL"),
            side: OrderSide::Buy,
            quantity: Quantity::from_i64(10),
            price: Price::from_f64(202.00),
            occurred_at: at,
        })
    }

    #[tokio::test]
    async fn events_project_into_one_row_per_order() {
        let journal = InMemoryPersistence::new();
        let at = ts("20250811-14:30:00.000");

        journal.persist(&submitted("ORD001", at)).await.unwrap();
        journal
            .persist(&OrderEvent::Acknowledged(OrderAcknowledged {
                cl_ord_id: ClOrdId::new("ORD001"),
                occurred_at: at,
            }))
            .await
            .unwrap();
        journal
            .persist(&OrderEvent::PartiallyFilled(OrderPartiallyFilled {
                cl_ord_id: ClOrdId::new("ORD001"),
                last_qty: Quantity::from_i64(4),
                last_px: Price::from_f64(202.00),
                cum_qty: Quantity::from_i64(4),
                leaves_qty: Quantity::from_i64(6),
                avg_px: Price::from_f64(202.00),
                occurred_at: at,
            }))
            .await
            .unwrap();

        let rows = journal.query_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, OrderStatus::PartiallyFilled);
        assert_eq!(rows[0].cum_qty, Quantity::from_i64(4));
        assert_eq!(rows[0].leaves_qty, Quantity::from_i64(6));
        assert_eq!(journal.event_count(), 3);
    }

    #[tokio::test]
    async fn fill_zeroes_remaining_quantity() {
        let journal = InMemoryPersistence::new();
        let at = ts("20250811-14:30:00.000");

        journal.persist(&submitted("ORD001", at)).await.unwrap();
        journal
            .persist(&OrderEvent::Filled(OrderFilled {
                cl_ord_id: ClOrdId::new("ORD001"),
                total_qty: Quantity::from_i64(10),
                avg_px: Price::from_f64(202.00),
                occurred_at: at,
            }))
            .await
            .unwrap();

        let rows = journal.query_all().await.unwrap();
        assert_eq!(rows[0].status, OrderStatus::Filled);
        assert_eq!(rows[0].cum_qty, Quantity::from_i64(10));
        assert_eq!(rows[0].leaves_qty, Quantity::ZERO);
    }

    #[tokio::test]
    async fn validation_rejection_creates_its_own_row() {
        let journal = InMemoryPersistence::new();

        journal
            .persist(&OrderEvent::Rejected(OrderRejected {
                cl_ord_id: ClOrdId::new("ORD002"),
                symbol: Symbol::new("MSFT"),
                side: OrderSide::Sell,
                quantity: Quantity::ZERO,
                price: Price::from_f64(430.10),
                reason: "Quantity must be positive".to_string(),
                occurred_at: ts("20250811-14:31:00.000"),
            }))
            .await
            .unwrap();

        let rows = journal.query_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, OrderStatus::Rejected);
        assert_eq!(rows[0].symbol.as_str(), "MSFT");
    }

    #[tokio::test]
    async fn blotter_is_sorted_newest_first() {
        let journal = InMemoryPersistence::new();

        journal
            .persist(&submitted("ORD001", ts("20250811-14:30:00.000")))
            .await
            .unwrap();
        journal
            .persist(&submitted("ORD002", ts("20250811-14:31:00.000")))
            .await
            .unwrap();

        let rows = journal.query_all().await.unwrap();
        assert_eq!(rows[0].cl_ord_id.as_str(), "ORD002");
        assert_eq!(rows[1].cl_ord_id.as_str(), "ORD001");
    }
}
