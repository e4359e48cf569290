//! The order aggregate.
//!
//! One `Order` owns the full lifecycle of a single working order,
//! from validation through fills to a terminal state, with FIX tag 39
//! semantics for every transition.

use serde::{Deserialize, Serialize};

use crate::domain::order::errors::OrderError;
use crate::domain::order::events::{
    OrderAcknowledged, OrderCancelRejected, OrderCanceled, OrderEvent, OrderFilled,
    OrderPartiallyFilled, OrderRejected, OrderSubmitted,
};
use crate::domain::order::services::OrderStateMachine;
use crate::domain::order::value_objects::{Execution, FillProgress, OrderSide, OrderStatus};
use crate::domain::shared::{ClOrdId, Price, Quantity, Symbol, Timestamp};

/// Terms for a new limit order.
#[derive(Debug, Clone)]
pub struct NewOrderCommand {
    /// Client order identifier (tag 11).
    pub cl_ord_id: ClOrdId,
    /// Symbol to trade (tag 55).
    pub symbol: Symbol,
    /// Order side (tag 54).
    pub side: OrderSide,
    /// Quantity to trade (tag 38).
    pub quantity: Quantity,
    /// Limit price (tag 44).
    pub price: Price,
}

impl NewOrderCommand {
    /// Check the order terms before anything is sent to the counterparty.
    ///
    /// # Errors
    ///
    /// Returns error if the symbol is empty, the quantity is not strictly
    /// positive, or the price is not strictly positive.
    pub fn validate(&self) -> Result<(), OrderError> {
        self.symbol
            .validate()
            .map_err(|e| OrderError::InvalidParameters {
                field: "symbol".to_string(),
                message: e.to_string(),
            })?;

        self.quantity
            .validate_for_order()
            .map_err(|e| OrderError::InvalidParameters {
                field: "quantity".to_string(),
                message: e.to_string(),
            })?;

        self.price
            .validate_for_order()
            .map_err(|e| OrderError::InvalidParameters {
                field: "price".to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

/// A single working order and its fill bookkeeping.
///
/// All mutation goes through the lifecycle methods, which enforce the
/// state transition table and the quantity identity
/// `OrderQty = CumQty + LeavesQty`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    cl_ord_id: ClOrdId,
    symbol: Symbol,
    side: OrderSide,
    quantity: Quantity,
    price: Price,
    status: OrderStatus,
    fill: FillProgress,
    cancel_requested: bool,
    #[serde(skip)]
    events: Vec<OrderEvent>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Order {
    /// Create a working order from a validated command.
    ///
    /// The `OrderSubmitted` event is queued immediately.
    ///
    /// # Errors
    ///
    /// Returns error if the command parameters do not validate.
    pub fn new(cmd: NewOrderCommand) -> Result<Self, OrderError> {
        cmd.validate()?;

        let now = Timestamp::now();
        let mut order = Self {
            cl_ord_id: cmd.cl_ord_id.clone(),
            symbol: cmd.symbol.clone(),
            side: cmd.side,
            quantity: cmd.quantity,
            price: cmd.price,
            status: OrderStatus::New,
            fill: FillProgress::new(cmd.quantity),
            cancel_requested: false,
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        order.events.push(OrderEvent::Submitted(OrderSubmitted {
            cl_ord_id: cmd.cl_ord_id,
            symbol: cmd.symbol,
            side: cmd.side,
            quantity: cmd.quantity,
            price: cmd.price,
            occurred_at: now,
        }));

        Ok(order)
    }

    /// Create an order directly in the `Rejected` state.
    ///
    /// Used when command validation fails: the order is still registered
    /// and journaled for audit, but nothing is sent to the counterparty.
    ///
    /// An `OrderRejected` event carrying the reason is queued.
    #[must_use]
    pub fn rejected(cmd: NewOrderCommand, reason: impl Into<String>) -> Self {
        let now = Timestamp::now();
        let mut order = Self {
            cl_ord_id: cmd.cl_ord_id.clone(),
            symbol: cmd.symbol,
            side: cmd.side,
            quantity: cmd.quantity,
            price: cmd.price,
            status: OrderStatus::Rejected,
            fill: FillProgress::new(cmd.quantity),
            cancel_requested: false,
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        order.events.push(OrderEvent::Rejected(OrderRejected {
            cl_ord_id: cmd.cl_ord_id,
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
            price: order.price,
            reason: reason.into(),
            occurred_at: now,
        }));

        order
    }

    // ========================================================================
    // Field access
    // ========================================================================

    /// Client order ID (tag 11).
    #[must_use]
    pub const fn cl_ord_id(&self) -> &ClOrdId {
        &self.cl_ord_id
    }

    /// Instrument symbol (tag 55).
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Buy or sell (tag 54).
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Ordered quantity (tag 38).
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Limit price (tag 44).
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Current lifecycle status (tag 39).
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Cumulative fill bookkeeping.
    #[must_use]
    pub const fn fill(&self) -> &FillProgress {
        &self.fill
    }

    /// Returns true if a cancel request is pending confirmation.
    #[must_use]
    pub const fn is_cancel_pending(&self) -> bool {
        self.cancel_requested
    }

    /// When the order was created.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// When the order last changed.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Mark the order as acknowledged by the counterparty.
    ///
    /// Queues `OrderAcknowledged`.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is in `New` status.
    pub fn acknowledge(&mut self) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Acknowledged)?;

        self.status = OrderStatus::Acknowledged;
        self.updated_at = Timestamp::now();

        self.events.push(OrderEvent::Acknowledged(OrderAcknowledged {
            cl_ord_id: self.cl_ord_id.clone(),
            occurred_at: self.updated_at,
        }));

        Ok(())
    }

    /// Apply a decoded execution report to the order.
    ///
    /// Dispatches on the reported `OrdStatus`: acknowledgment, fill,
    /// cancel confirmation, or reject.
    ///
    /// # Errors
    ///
    /// Returns error if the report implies an illegal transition, the fill
    /// exceeds the remaining quantity, or a fill report is missing its
    /// `LastQty`/`LastPx` fields.
    pub fn apply_execution(&mut self, execution: &Execution) -> Result<(), OrderError> {
        match execution.ord_status {
            OrderStatus::Acknowledged => self.acknowledge(),
            OrderStatus::PartiallyFilled | OrderStatus::Filled => {
                let last_qty = execution.last_qty.ok_or_else(|| {
                    OrderError::InvalidParameters {
                        field: "last_qty".to_string(),
                        message: "Fill report missing LastQty".to_string(),
                    }
                })?;
                let last_px = execution.last_px.ok_or_else(|| {
                    OrderError::InvalidParameters {
                        field: "last_px".to_string(),
                        message: "Fill report missing LastPx".to_string(),
                    }
                })?;
                self.apply_fill(last_qty, last_px)
            }
            OrderStatus::Canceled => self.confirm_cancel(execution.text.clone()),
            OrderStatus::Rejected => {
                let reason = execution
                    .text
                    .clone()
                    .unwrap_or_else(|| "Rejected by counterparty".to_string());
                self.reject(reason)
            }
            OrderStatus::New => Err(OrderError::InvalidParameters {
                field: "ord_status".to_string(),
                message: "Execution report cannot carry local New status".to_string(),
            }),
        }
    }

    /// Record a fill against the remaining quantity.
    ///
    /// Queues `OrderPartiallyFilled`, or `OrderFilled` once nothing is left.
    ///
    /// # Errors
    ///
    /// Returns error if the order cannot receive fills or the fill exceeds
    /// the remaining quantity.
    pub fn apply_fill(&mut self, last_qty: Quantity, last_px: Price) -> Result<(), OrderError> {
        if !self.status.can_fill() {
            return Err(OrderError::CannotFill {
                status: self.status,
            });
        }

        let leaves = self.fill.leaves_qty();
        self.fill
            .apply_fill(last_qty, last_px)
            .map_err(|_| OrderError::FillExceedsRemaining {
                leaves,
                attempted: last_qty,
            })?;

        let target = if self.fill.is_complete() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        OrderStateMachine::validate_transition(self.status, target)?;

        self.status = target;
        self.updated_at = Timestamp::now();

        if target == OrderStatus::Filled {
            self.events.push(OrderEvent::Filled(OrderFilled {
                cl_ord_id: self.cl_ord_id.clone(),
                total_qty: self.quantity,
                avg_px: self.fill.avg_px(),
                occurred_at: self.updated_at,
            }));
        } else {
            self.events
                .push(OrderEvent::PartiallyFilled(OrderPartiallyFilled {
                    cl_ord_id: self.cl_ord_id.clone(),
                    last_qty,
                    last_px,
                    cum_qty: self.fill.cum_qty(),
                    leaves_qty: self.fill.leaves_qty(),
                    avg_px: self.fill.avg_px(),
                    occurred_at: self.updated_at,
                }));
        }

        Ok(())
    }

    /// Mark that a cancel request has been sent for this order.
    ///
    /// No state transition occurs; the order stays fillable until the
    /// counterparty confirms or rejects the cancel.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not in a cancelable state.
    pub fn request_cancel(&mut self) -> Result<(), OrderError> {
        if !self.status.is_cancelable() {
            return Err(OrderError::CannotCancel {
                status: self.status,
            });
        }

        self.cancel_requested = true;
        Ok(())
    }

    /// Confirm a cancel reported by the counterparty.
    ///
    /// Queues `OrderCanceled` with the quantity filled so far.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not in a state that can transition
    /// to `Canceled`.
    pub fn confirm_cancel(&mut self, reason: Option<String>) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Canceled)?;

        self.status = OrderStatus::Canceled;
        self.cancel_requested = false;
        self.updated_at = Timestamp::now();

        self.events.push(OrderEvent::Canceled(OrderCanceled {
            cl_ord_id: self.cl_ord_id.clone(),
            filled_qty: self.fill.cum_qty(),
            reason,
            occurred_at: self.updated_at,
        }));

        Ok(())
    }

    /// Move the order to `Rejected`.
    ///
    /// Queues `OrderRejected`.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is in `New` status.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, OrderStatus::Rejected)?;

        self.status = OrderStatus::Rejected;
        self.updated_at = Timestamp::now();

        self.events.push(OrderEvent::Rejected(OrderRejected {
            cl_ord_id: self.cl_ord_id.clone(),
            symbol: self.symbol.clone(),
            side: self.side,
            quantity: self.quantity,
            price: self.price,
            reason: reason.into(),
            occurred_at: self.updated_at,
        }));

        Ok(())
    }

    /// Record a cancel reject from the counterparty.
    ///
    /// The order state is unchanged; only an `OrderCancelRejected` event
    /// is generated.
    pub fn cancel_rejected(&mut self, reason: impl Into<String>) {
        self.cancel_requested = false;
        self.updated_at = Timestamp::now();

        self.events
            .push(OrderEvent::CancelRejected(OrderCancelRejected {
                cl_ord_id: self.cl_ord_id.clone(),
                reason: reason.into(),
                occurred_at: self.updated_at,
            }));
    }

    // ========================================================================
    // Event buffer
    // ========================================================================

    /// Take every queued event, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }

    /// Peek at queued events without taking them.
    #[must_use]
    pub fn pending_events(&self) -> &[OrderEvent] {
        &self.events
    }
}
