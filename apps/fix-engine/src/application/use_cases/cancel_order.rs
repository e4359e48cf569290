//! Cancel Order Use Case

use std::sync::Arc;

use crate::domain::order::{OrderError, OrderRegistry};
use crate::domain::shared::ClOrdId;
use crate::infrastructure::metrics;
use crate::infrastructure::session::{SessionHandle, SessionUnavailable};

/// Errors a cancel request can end with.
#[derive(Debug, thiserror::Error)]
pub enum CancelError {
    /// Order-level failure (unknown ID, not cancelable).
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The session cannot carry the request right now.
    #[error(transparent)]
    Session(#[from] SessionUnavailable),
}

/// Use case for requesting cancellation of a working order.
pub struct CancelOrderUseCase {
    registry: Arc<OrderRegistry>,
    session: SessionHandle,
}

impl CancelOrderUseCase {
    /// Create a new CancelOrderUseCase.
    pub fn new(registry: Arc<OrderRegistry>, session: SessionHandle) -> Self {
        Self { registry, session }
    }

    /// Execute the use case.
    ///
    /// Marks the order pending-cancel and sends an OrderCancelRequest.
    /// The order stays in its current status until the counterparty
    /// confirms or rejects the cancel.
    ///
    /// # Errors
    ///
    /// `UnknownOrder` when the ID is not registered, `CannotCancel` for
    /// orders that are terminal or not yet acknowledged, and a session
    /// error when the session is not active.
    pub async fn execute(&self, cl_ord_id: &ClOrdId) -> Result<(), CancelError> {
        let state = self.session.state();
        if !state.is_active() {
            return Err(CancelError::Session(SessionUnavailable::NotActive(state)));
        }

        self.registry.request_cancel(cl_ord_id)?;
        let snapshot = self
            .registry
            .snapshot(cl_ord_id)
            .ok_or_else(|| OrderError::UnknownOrder {
                cl_ord_id: cl_ord_id.clone(),
            })?;

        self.session.send_cancel_request(&snapshot).await?;
        metrics::record_cancel_requested();
        tracing::info!(cl_ord_id = %cl_ord_id, status = %snapshot.status, "Cancel requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::{SinkExt, StreamExt};
    use tokio::sync::mpsc;
    use tokio_util::codec::Framed;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::domain::order::aggregate::{NewOrderCommand, Order};
    use crate::domain::order::value_objects::Execution;
    use crate::domain::order::{OrderSide, OrderStatus};
    use crate::domain::session::{SessionConfig, SessionEvent};
    use crate::domain::shared::{ExecId, Price, Quantity, Symbol, Timestamp};
    use crate::infrastructure::fix::{FixCodec, FixFrameCodec, FixMessage, MsgType, Tag};
    use crate::infrastructure::session::SessionEngine;

    fn working_order(cl_ord_id: &str) -> Order {
        let mut order = Order::new(NewOrderCommand {
            cl_ord_id: ClOrdId::new(cl_ord_id),
            symbol: Symbol::new("AAPL"),
            side: OrderSide::Buy,
            quantity: Quantity::from_i64(10),
            price: Price::from_f64(202.00),
        })
        .unwrap();
        order
            .apply_execution(&Execution::new(
                ExecId::new("E1"),
                ClOrdId::new(cl_ord_id),
                OrderStatus::Acknowledged,
                Quantity::ZERO,
                Timestamp::now(),
            ))
            .unwrap();
        order
    }

    async fn active_session() -> (
        SessionHandle,
        Framed<tokio::io::DuplexStream, FixFrameCodec>,
        FixCodec,
        CancellationToken,
    ) {
        let config = SessionConfig::default();
        let (client, server) = tokio::io::duplex(4096);
        let cancel = CancellationToken::new();
        let (event_tx, mut events) = mpsc::channel(64);
        let (engine, handle) = SessionEngine::new(config.clone(), event_tx, cancel.clone());
        tokio::spawn(engine.run(client));

        let peer = FixCodec::counterparty(&config);
        let mut framed = Framed::new(server, FixFrameCodec::new(peer.delimiter()));

        let _logon = tokio::time::timeout(Duration::from_secs(1), framed.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let ack = peer
            .encode(&FixMessage::logon(30), 1, Timestamp::now())
            .unwrap();
        framed.send(ack).await.unwrap();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
                .await
                .unwrap()
                .unwrap();
            if matches!(event, SessionEvent::LogonAccepted) {
                break;
            }
        }

        (handle, framed, peer, cancel)
    }

    #[tokio::test]
    async fn inactive_session_is_refused_up_front() {
        let config = SessionConfig::default();
        let cancel = CancellationToken::new();
        let (event_tx, _events) = mpsc::channel(64);
        let (_engine, session) = SessionEngine::new(config, event_tx, cancel);
        let registry = Arc::new(OrderRegistry::new());
        let use_case = CancelOrderUseCase::new(registry, session);

        let result = use_case.execute(&ClOrdId::new("NOPE")).await;
        assert!(matches!(result, Err(CancelError::Session(_))));
    }

    #[tokio::test]
    async fn unknown_order_is_refused() {
        let (session, _framed, _peer, cancel) = active_session().await;
        let registry = Arc::new(OrderRegistry::new());
        let use_case = CancelOrderUseCase::new(registry, session);

        let result = use_case.execute(&ClOrdId::new("NOPE")).await;
        assert!(matches!(
            result,
            Err(CancelError::Order(OrderError::UnknownOrder { .. }))
        ));

        cancel.cancel();
    }

    #[tokio::test]
    async fn acknowledged_order_cancel_goes_on_the_wire() {
        let (session, mut framed, peer, cancel) = active_session().await;

        let registry = Arc::new(OrderRegistry::new());
        registry.insert(working_order("ORD007")).unwrap();
        let use_case = CancelOrderUseCase::new(registry, session);

        use_case.execute(&ClOrdId::new("ORD007")).await.unwrap();

        let raw = tokio::time::timeout(Duration::from_secs(1), framed.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let request = peer.decode(&raw).unwrap();
        assert_eq!(request.msg_type(), MsgType::OrderCancelRequest);
        assert_eq!(request.get(Tag::ORIG_CL_ORD_ID), Some("ORD007"));
        assert_eq!(request.get(Tag::CL_ORD_ID), Some("ORD007"));
        assert_eq!(request.get(Tag::SYMBOL), Some("AAPL"));

        cancel.cancel();
    }

    #[tokio::test]
    async fn unacknowledged_order_cannot_be_canceled() {
        let (session, _framed, _peer, cancel) = active_session().await;

        let registry = Arc::new(OrderRegistry::new());
        let order = Order::new(NewOrderCommand {
            cl_ord_id: ClOrdId::new("ORD008"),
            symbol: Symbol::new("MSFT"),
            side: OrderSide::Sell,
            quantity: Quantity::from_i64(5),
            price: Price::from_f64(430.10),
        })
        .unwrap();
        registry.insert(order).unwrap();
        let use_case = CancelOrderUseCase::new(registry, session);

        let result = use_case.execute(&ClOrdId::new("ORD008")).await;
        assert!(matches!(
            result,
            Err(CancelError::Order(OrderError::CannotCancel {
                status: OrderStatus::New
            }))
        ));

        cancel.cancel();
    }
}
