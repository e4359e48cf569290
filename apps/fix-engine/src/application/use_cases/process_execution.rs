//! Process Execution Use Case
//!
//! Applies counterparty reports to the order book. Order-level failures
//! here are logged and counted, never propagated: one bad report must not
//! take down the session or unrelated orders.

use std::sync::Arc;

use crate::application::ports::PersistencePort;
use crate::domain::order::value_objects::{CancelReject, Execution};
use crate::domain::order::{OrderEvent, OrderRegistry};
use crate::infrastructure::metrics;

/// Use case for applying executions and cancel rejects from the session.
pub struct ProcessExecutionUseCase<P: PersistencePort> {
    registry: Arc<OrderRegistry>,
    journal: Arc<P>,
}

impl<P: PersistencePort> ProcessExecutionUseCase<P> {
    /// Create a new ProcessExecutionUseCase.
    pub fn new(registry: Arc<OrderRegistry>, journal: Arc<P>) -> Self {
        Self { registry, journal }
    }

    /// Apply an ExecutionReport to its order and journal the outcome.
    pub async fn handle_execution(&self, execution: &Execution) {
        match self.registry.apply_execution(execution) {
            Ok(events) => {
                metrics::record_execution_applied(execution.ord_status);
                tracing::info!(
                    cl_ord_id = %execution.cl_ord_id,
                    exec_id = %execution.exec_id,
                    ord_status = %execution.ord_status,
                    cum_qty = %execution.cum_qty,
                    "Execution applied"
                );
                self.journal_events(&events).await;
            }
            Err(e) => {
                metrics::record_order_error();
                tracing::error!(
                    cl_ord_id = %execution.cl_ord_id,
                    exec_id = %execution.exec_id,
                    error = %e,
                    "Failed to apply execution"
                );
            }
        }
    }

    /// Apply an OrderCancelReject; the order keeps its current status.
    pub async fn handle_cancel_reject(&self, reject: &CancelReject) {
        match self
            .registry
            .apply_cancel_reject(&reject.cl_ord_id, &reject.reason)
        {
            Ok(events) => {
                tracing::warn!(
                    cl_ord_id = %reject.cl_ord_id,
                    reason = %reject.reason,
                    "Cancel request rejected by counterparty"
                );
                self.journal_events(&events).await;
            }
            Err(e) => {
                metrics::record_order_error();
                tracing::error!(
                    cl_ord_id = %reject.cl_ord_id,
                    error = %e,
                    "Failed to apply cancel reject"
                );
            }
        }
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
