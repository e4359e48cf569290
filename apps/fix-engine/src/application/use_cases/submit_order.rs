//! Submit Order Use Case

use std::sync::Arc;

use crate::application::dto::{NewOrderRequest, SubmitReceipt};
use crate::application::ports::PersistencePort;
use crate::application::services::ClOrdIdGenerator;
use crate::domain::order::aggregate::{NewOrderCommand, Order};
use crate::domain::order::{OrderError, OrderEvent, OrderRegistry, OrderSnapshot, OrderStatus};
use crate::infrastructure::metrics;
use crate::infrastructure::session::{SessionHandle, SessionUnavailable};

/// Errors a submit request can end with.
///
/// A validation failure is not an error here: the order is registered as
/// `Rejected` and the receipt says so.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Order-level failure (duplicate ID, illegal state).
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The session cannot carry the order right now.
    #[error(transparent)]
    Session(#[from] SessionUnavailable),
}

/// Use case for submitting orders over the FIX session.
pub struct SubmitOrderUseCase<P: PersistencePort> {
    registry: Arc<OrderRegistry>,
    journal: Arc<P>,
    generator: Arc<ClOrdIdGenerator>,
    session: SessionHandle,
}

impl<P: PersistencePort> SubmitOrderUseCase<P> {
    /// Create a new SubmitOrderUseCase.
    pub fn new(
        registry: Arc<OrderRegistry>,
        journal: Arc<P>,
        generator: Arc<ClOrdIdGenerator>,
        session: SessionHandle,
    ) -> Self {
        Self {
            registry,
            journal,
            generator,
            session,
        }
    }

    /// Execute the use case.
    ///
    /// Assigns a ClOrdID when the request carries none, validates, and
    /// either sends a NewOrderSingle (receipt status `New`) or registers
    /// the order as rejected without sending (receipt status `Rejected`).
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Session` when the session is not active and
    /// `SubmitError::Order` on a duplicate ClOrdID.
    pub async fn execute(&self, request: NewOrderRequest) -> Result<SubmitReceipt, SubmitError> {
        let cl_ord_id = request
            .cl_ord_id
            .clone()
            .unwrap_or_else(|| self.generator.next_id());

        let command = NewOrderCommand {
            cl_ord_id: cl_ord_id.clone(),
            symbol: request.symbol,
            side: request.side,
            quantity: request.quantity,
            price: request.price,
        };

        match Order::new(command.clone()) {
            Ok(order) => self.register_and_send(order).await,
            Err(e) => {
                tracing::warn!(cl_ord_id = %cl_ord_id, error = %e, "Order rejected by validation");
                self.register_rejected(Order::rejected(command, e.to_string()))
                    .await
            }
        }
    }

    /// Register a valid order and put it on the wire.
    async fn register_and_send(&self, mut order: Order) -> Result<SubmitReceipt, SubmitError> {
        let state = self.session.state();
        if !state.is_active() {
            return Err(SubmitError::Session(SessionUnavailable::NotActive(state)));
        }

        let snapshot = OrderSnapshot::from(&order);
        let events = order.drain_events();
        self.registry.insert(order)?;
        self.journal_events(&events).await;

        self.session.send_new_order(&snapshot).await?;
        metrics::record_order_submitted();
        tracing::info!(
            cl_ord_id = %snapshot.cl_ord_id,
            symbol = %snapshot.symbol,
            side = %snapshot.side,
            quantity = %snapshot.quantity,
            price = %snapshot.price,
            "Order submitted"
        );

        Ok(SubmitReceipt {
            cl_ord_id: snapshot.cl_ord_id,
            status: OrderStatus::New,
        })
    }

    /// Register a validation-rejected order; nothing goes on the wire.
    async fn register_rejected(&self, mut order: Order) -> Result<SubmitReceipt, SubmitError> {
        let cl_ord_id = order.cl_ord_id().clone();
        let events = order.drain_events();
        if let Err(e) = self.registry.insert(order) {
            tracing::error!(cl_ord_id = %cl_ord_id, error = %e, "Failed to register rejected order");
        }
        self.journal_events(&events).await;
        metrics::record_order_rejected();

        Ok(SubmitReceipt {
            cl_ord_id,
            status: OrderStatus::Rejected,
        })
    }

    async fn journal_events(&self, events: &[OrderEvent]) {
        for event in events {
            if let Err(e) = self.journal.persist(event).await {
                tracing::error!(
                    event_type = event.event_type(),
                    cl_ord_id = %event.cl_ord_id(),
                    error = %e,
                    "Failed to journal order event"
                );
            }
        }
    }
}
