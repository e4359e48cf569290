//! FIX session engine.
//!
//! One engine instance drives one connection. A single task owns the
//! transport, the sequence counters, and the gap buffer, so no session
//! state is ever touched concurrently. Applications talk to the engine
//! through a [`SessionHandle`] and consume [`SessionEvent`]s from the
//! channel returned by [`SessionEngine::new`].

use std::sync::Arc;

use futures::{Sink, SinkExt, Stream, StreamExt};
use parking_lot::RwLock;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;

use super::heartbeat::{HeartbeatConfig, HeartbeatEvent, HeartbeatMonitor, HeartbeatState};
use crate::domain::order::{CancelReject, Execution, OrderSide, OrderSnapshot, OrderStatus};
use crate::domain::session::{
    GapBuffer, SequenceCheck, SequenceTracker, SessionConfig, SessionError, SessionEvent,
    SessionState,
};
use crate::domain::shared::{ClOrdId, ExecId, Price, Quantity, Symbol, Timestamp};
use crate::infrastructure::fix::{
    CodecError, DecodedMessage, FixCodec, FixFrameCodec, FixMessage, MsgType, Tag,
};
use crate::infrastructure::metrics;

/// Commands the application can send to a running session.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Send a NewOrderSingle (35=D).
    SendNewOrder {
        /// Client order identifier.
        cl_ord_id: ClOrdId,
        /// Symbol to trade.
        symbol: Symbol,
        /// Order side.
        side: OrderSide,
        /// Order quantity.
        quantity: Quantity,
        /// Limit price.
        price: Price,
    },
    /// Send an OrderCancelRequest (35=F).
    SendCancelRequest {
        /// ClOrdID of the order to cancel.
        cl_ord_id: ClOrdId,
        /// Symbol of the order.
        symbol: Symbol,
        /// Side of the order.
        side: OrderSide,
        /// Quantity of the order.
        quantity: Quantity,
    },
    /// Begin a graceful logout.
    InitiateLogout,
}

/// Why a command could not be delivered to the session.
#[derive(Debug, Error)]
pub enum SessionUnavailable {
    /// The session is not in the `Active` state.
    #[error("Session is not active (state: {0})")]
    NotActive(SessionState),
    /// The session task has stopped.
    #[error("Session task has stopped")]
    Stopped,
}

/// Clonable application-facing handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    state: Arc<RwLock<SessionState>>,
}

impl SessionHandle {
    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Returns true if the session accepts application messages.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Queue a NewOrderSingle for the order in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not active or has stopped.
    pub async fn send_new_order(&self, order: &OrderSnapshot) -> Result<(), SessionUnavailable> {
        self.send_command(SessionCommand::SendNewOrder {
            cl_ord_id: order.cl_ord_id.clone(),
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
            price: order.price,
        })
        .await
    }

    /// Queue an OrderCancelRequest for the order in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not active or has stopped.
    pub async fn send_cancel_request(
        &self,
        order: &OrderSnapshot,
    ) -> Result<(), SessionUnavailable> {
        self.send_command(SessionCommand::SendCancelRequest {
            cl_ord_id: order.cl_ord_id.clone(),
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
        })
        .await
    }

    /// Begin a graceful logout.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not active or has stopped.
    pub async fn initiate_logout(&self) -> Result<(), SessionUnavailable> {
        self.send_command(SessionCommand::InitiateLogout).await
    }

    async fn send_command(&self, command: SessionCommand) -> Result<(), SessionUnavailable> {
        let state = self.state();
        if !state.is_active() {
            return Err(SessionUnavailable::NotActive(state));
        }
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SessionUnavailable::Stopped)
    }
}

/// Outcome of processing one inbound message.
enum Flow {
    Continue,
    Stop,
}

/// What the select loop woke up for.
enum Step {
    Cancelled,
    Inbound(Option<Result<String, CodecError>>),
    Command(Option<SessionCommand>),
    Heartbeat(Option<HeartbeatEvent>),
    DeadlineElapsed,
}

/// Session engine owning all protocol state for one connection.
pub struct SessionEngine {
    config: SessionConfig,
    codec: FixCodec,
    state: Arc<RwLock<SessionState>>,
    sequences: SequenceTracker,
    gap_buffer: GapBuffer<DecodedMessage>,
    event_tx: mpsc::Sender<SessionEvent>,
    command_rx: mpsc::Receiver<SessionCommand>,
    cancel: CancellationToken,
    test_req_counter: u64,
}

impl SessionEngine {
    /// Create an engine plus its application-facing handle.
    ///
    /// Session events go to `event_tx`; the caller owns the receiving
    /// side, so one event stream can span reconnected engines. Sequence
    /// counters start at 1; a reconnect means a fresh engine.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        event_tx: mpsc::Sender<SessionEvent>,
        cancel: CancellationToken,
    ) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let state = Arc::new(RwLock::new(SessionState::Disconnected));

        let codec = FixCodec::new(&config);
        let engine = Self {
            config,
            codec,
            state: state.clone(),
            sequences: SequenceTracker::new(),
            gap_buffer: GapBuffer::new(),
            event_tx,
            command_rx,
            cancel,
            test_req_counter: 0,
        };
        let handle = SessionHandle { command_tx, state };

        (engine, handle)
    }

    /// Override the wire delimiter, e.g. pipe for readable demo traffic.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.codec = self.codec.with_delimiter(delimiter);
        self
    }

    /// Drive the session over a transport until logout, error, or
    /// cancellation.
    ///
    /// # Errors
    ///
    /// Returns the session-fatal error that ended the connection. A
    /// graceful logout returns `Ok(())`. Either way the session finishes
    /// in `Disconnected` with the heartbeat monitor cancelled.
    pub async fn run<T>(mut self, transport: T) -> Result<(), SessionError>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let framed = Framed::new(transport, FixFrameCodec::new(self.codec.delimiter()));
        let (mut write, mut read) = framed.split();

        let heartbeat_state = Arc::new(HeartbeatState::new());
        let (heartbeat_tx, mut heartbeat_rx) = mpsc::channel(8);
        let heartbeat_cancel = self.cancel.child_token();
        let monitor = HeartbeatMonitor::new(
            HeartbeatConfig::from_heart_bt_int(self.config.heart_bt_int),
            heartbeat_state.clone(),
            heartbeat_tx,
            heartbeat_cancel.clone(),
        );
        tokio::spawn(monitor.run());

        let result = self
            .session_loop(&mut write, &mut read, &heartbeat_state, &mut heartbeat_rx)
            .await;

        heartbeat_cancel.cancel();
        self.transition(SessionState::Disconnected).await;
        if let Err(reason) = &result {
            tracing::warn!(reason = %reason, "Session terminated");
            let _ = self
                .event_tx
                .send(SessionEvent::Terminated {
                    reason: reason.clone(),
                })
                .await;
        }
        result
    }

    async fn session_loop<W, R>(
        &mut self,
        write: &mut W,
        read: &mut R,
        heartbeat: &HeartbeatState,
        heartbeat_rx: &mut mpsc::Receiver<HeartbeatEvent>,
    ) -> Result<(), SessionError>
    where
        W: Sink<String, Error = CodecError> + Unpin,
        R: Stream<Item = Result<String, CodecError>> + Unpin,
    {
        self.send(write, heartbeat, FixMessage::logon(self.config.heart_bt_int_secs()))
            .await?;
        self.transition(SessionState::LogonSent).await;
        let mut deadline_at = Some(tokio::time::Instant::now() + self.config.logon_timeout);
        let mut heartbeat_open = true;

        loop {
            let step = tokio::select! {
                () = self.cancel.cancelled() => Step::Cancelled,
                frame = read.next() => Step::Inbound(frame),
                command = self.command_rx.recv() => Step::Command(command),
                event = heartbeat_rx.recv(), if heartbeat_open => Step::Heartbeat(event),
                () = wait_until(deadline_at) => Step::DeadlineElapsed,
            };

            match step {
                Step::Cancelled => {
                    tracing::info!("Session cancelled, sending best-effort Logout");
                    if self.current_state().is_active() {
                        let _ = self.send(write, heartbeat, FixMessage::logout(None)).await;
                    }
                    return Ok(());
                }
                Step::Inbound(None) => return Err(SessionError::TransportClosed),
                Step::Inbound(Some(Err(e))) => {
                    tracing::warn!(error = %e, "Transport read failed");
                    return Err(SessionError::TransportClosed);
                }
                Step::Inbound(Some(Ok(raw))) => {
                    if let Flow::Stop = self
                        .handle_frame(write, heartbeat, &mut deadline_at, &raw)
                        .await?
                    {
                        return Ok(());
                    }
                }
                Step::Command(None) => {
                    tracing::debug!("Command channel closed");
                    return Ok(());
                }
                Step::Command(Some(command)) => {
                    self.handle_command(write, heartbeat, &mut deadline_at, command)
                        .await?;
                }
                Step::Heartbeat(None) => {
                    // Monitor exited; any Timeout event was already drained.
                    heartbeat_open = false;
                }
                Step::Heartbeat(Some(event)) => {
                    self.handle_heartbeat_event(write, heartbeat, event).await?;
                }
                Step::DeadlineElapsed => {
                    deadline_at = None;
                    match self.current_state() {
                        SessionState::LogonSent => return Err(SessionError::LogonTimeout),
                        SessionState::PendingLogout => return Err(SessionError::LogoutTimeout),
                        _ => {}
                    }
                }
            }
        }
    }

    // ========================================================================
    // Inbound
    // ========================================================================

    async fn handle_frame<W>(
        &mut self,
        write: &mut W,
        heartbeat: &HeartbeatState,
        deadline_at: &mut Option<tokio::time::Instant>,
        raw: &str,
    ) -> Result<Flow, SessionError>
    where
        W: Sink<String, Error = CodecError> + Unpin,
    {
        let decoded = match self.codec.decode(raw) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding invalid frame");
                metrics::record_frame_discarded(&e);
                return Ok(Flow::Continue);
            }
        };

        heartbeat.record_inbound();
        metrics::record_message_received(decoded.msg_type());

        if decoded.sender_comp_id != self.config.target_comp_id {
            tracing::warn!(
                sender = %decoded.sender_comp_id,
                expected = %self.config.target_comp_id,
                "Discarding frame from unexpected CompID"
            );
            return Ok(Flow::Continue);
        }

        match self.sequences.check_inbound(decoded.seq) {
            SequenceCheck::Duplicate => {
                tracing::debug!(
                    seq = decoded.seq,
                    expected = self.sequences.expected_inbound(),
                    "Dropping duplicate message"
                );
                Ok(Flow::Continue)
            }
            SequenceCheck::Gap { expected, received } => {
                tracing::warn!(expected, received, "Sequence gap detected");
                metrics::record_sequence_gap(received - expected);
                self.emit(SessionEvent::SequenceGapDetected { expected, received })
                    .await;

                let first_detection = self.gap_buffer.is_empty();
                if !self.gap_buffer.insert(received, decoded) {
                    return Err(SessionError::GapBufferOverflow);
                }
                if first_detection {
                    let end = received - 1;
                    self.send(write, heartbeat, FixMessage::resend_request(expected, end))
                        .await?;
                    self.emit(SessionEvent::ResendRequested {
                        begin: expected,
                        end,
                    })
                    .await;
                }
                Ok(Flow::Continue)
            }
            SequenceCheck::Expected => {
                if let Flow::Stop = self
                    .process_message(write, heartbeat, deadline_at, decoded)
                    .await?
                {
                    return Ok(Flow::Stop);
                }
                // Replay anything parked behind the gap, in order.
                while let Some(next) = self.gap_buffer.pop_next(self.sequences.expected_inbound())
                {
                    self.sequences.check_inbound(next.seq);
                    if let Flow::Stop = self
                        .process_message(write, heartbeat, deadline_at, next)
                        .await?
                    {
                        return Ok(Flow::Stop);
                    }
                }
                Ok(Flow::Continue)
            }
        }
    }

    async fn process_message<W>(
        &mut self,
        write: &mut W,
        heartbeat: &HeartbeatState,
        deadline_at: &mut Option<tokio::time::Instant>,
        message: DecodedMessage,
    ) -> Result<Flow, SessionError>
    where
        W: Sink<String, Error = CodecError> + Unpin,
    {
        tracing::debug!(seq = message.seq, msg_type = %message.msg_type(), "Received");

        match message.msg_type() {
            MsgType::Logon => {
                if self.current_state() == SessionState::LogonSent {
                    *deadline_at = None;
                    self.transition(SessionState::Active).await;
                    self.emit(SessionEvent::LogonAccepted).await;
                    tracing::info!(
                        heart_bt_int = ?message.get(Tag::HEART_BT_INT),
                        "Logon accepted by counterparty"
                    );
                } else {
                    tracing::warn!(state = %self.current_state(), "Unexpected Logon");
                }
                Ok(Flow::Continue)
            }
            MsgType::Heartbeat => {
                self.emit(SessionEvent::HeartbeatReceived).await;
                Ok(Flow::Continue)
            }
            MsgType::TestRequest => {
                let test_req_id = message.get(Tag::TEST_REQ_ID);
                self.send(write, heartbeat, FixMessage::heartbeat(test_req_id))
                    .await?;
                Ok(Flow::Continue)
            }
            MsgType::ResendRequest => {
                self.answer_resend_request(write, heartbeat, &message).await?;
                Ok(Flow::Continue)
            }
            MsgType::SequenceReset => {
                self.apply_sequence_reset(&message);
                Ok(Flow::Continue)
            }
            MsgType::Logout => self.handle_logout(write, heartbeat, &message).await,
            MsgType::ExecutionReport => {
                match decode_execution(&message) {
                    Ok(execution) => {
                        self.emit(SessionEvent::ExecutionReport(execution)).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Discarding unreadable ExecutionReport");
                        metrics::record_frame_discarded(&e);
                    }
                }
                Ok(Flow::Continue)
            }
            MsgType::OrderCancelReject => {
                match decode_cancel_reject(&message) {
                    Ok(reject) => {
                        self.emit(SessionEvent::CancelReject(reject)).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Discarding unreadable OrderCancelReject");
                        metrics::record_frame_discarded(&e);
                    }
                }
                Ok(Flow::Continue)
            }
            MsgType::Reject => {
                tracing::warn!(
                    text = ?message.get(Tag::TEXT),
                    "Counterparty rejected a message at the session level"
                );
                Ok(Flow::Continue)
            }
            MsgType::NewOrderSingle | MsgType::OrderCancelRequest => {
                tracing::warn!(
                    msg_type = %message.msg_type(),
                    "Ignoring application request addressed to an initiator"
                );
                Ok(Flow::Continue)
            }
        }
    }

    /// We keep no outbound store, so a resend request is answered with a
    /// single SequenceReset-GapFill jumping the peer to our next sequence.
    async fn answer_resend_request<W>(
        &mut self,
        write: &mut W,
        heartbeat: &HeartbeatState,
        message: &DecodedMessage,
    ) -> Result<(), SessionError>
    where
        W: Sink<String, Error = CodecError> + Unpin,
    {
        let begin: u64 = match message.get_parsed(Tag::BEGIN_SEQ_NO) {
            Ok(begin) => begin,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable ResendRequest");
                return Ok(());
            }
        };

        let new_seq_no = self.sequences.peek_outbound();
        tracing::info!(begin, new_seq_no, "Answering ResendRequest with GapFill");

        // The reply replaces the requested range, so it carries the first
        // requested sequence number rather than a fresh one.
        let reply = FixMessage::sequence_reset_gap_fill(new_seq_no);
        let frame = match self.codec.encode(&reply, begin, Timestamp::now()) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode SequenceReset");
                return Ok(());
            }
        };
        write
            .send(frame)
            .await
            .map_err(|_| SessionError::TransportClosed)?;
        heartbeat.record_outbound();
        metrics::record_message_sent(MsgType::SequenceReset);
        Ok(())
    }

    fn apply_sequence_reset(&mut self, message: &DecodedMessage) {
        let new_seq_no: u64 = match message.get_parsed(Tag::NEW_SEQ_NO) {
            Ok(new_seq_no) => new_seq_no,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable SequenceReset");
                return;
            }
        };

        let expected = self.sequences.expected_inbound();
        if new_seq_no < expected {
            tracing::warn!(
                new_seq_no,
                expected,
                "Ignoring SequenceReset moving backwards"
            );
            return;
        }

        tracing::info!(
            new_seq_no,
            expected,
            gap_fill = ?message.get(Tag::GAP_FILL_FLAG),
            "Applying SequenceReset"
        );
        self.sequences.set_expected_inbound(new_seq_no);
    }

    async fn handle_logout<W>(
        &mut self,
        write: &mut W,
        heartbeat: &HeartbeatState,
        message: &DecodedMessage,
    ) -> Result<Flow, SessionError>
    where
        W: Sink<String, Error = CodecError> + Unpin,
    {
        match self.current_state() {
            SessionState::LogonSent => {
                let reason = message
                    .get(Tag::TEXT)
                    .unwrap_or("no reason given")
                    .to_string();
                Err(SessionError::LogonRejected { reason })
            }
            SessionState::PendingLogout => {
                tracing::info!("Logout confirmed by counterparty");
                Ok(Flow::Stop)
            }
            _ => {
                tracing::info!(text = ?message.get(Tag::TEXT), "Counterparty initiated logout");
                self.emit(SessionEvent::LogoutReceived).await;
                self.send(write, heartbeat, FixMessage::logout(None)).await?;
                Ok(Flow::Stop)
            }
        }
    }

    // ========================================================================
    // Commands and heartbeats
    // ========================================================================

    async fn handle_command<W>(
        &mut self,
        write: &mut W,
        heartbeat: &HeartbeatState,
        deadline_at: &mut Option<tokio::time::Instant>,
        command: SessionCommand,
    ) -> Result<(), SessionError>
    where
        W: Sink<String, Error = CodecError> + Unpin,
    {
        if !self.current_state().is_active() {
            tracing::warn!(state = %self.current_state(), "Dropping command, session not active");
            return Ok(());
        }

        match command {
            SessionCommand::SendNewOrder {
                cl_ord_id,
                symbol,
                side,
                quantity,
                price,
            } => {
                let order = FixMessage::new(MsgType::NewOrderSingle)
                    .with_field(Tag::CL_ORD_ID, cl_ord_id.as_str())
                    .with_field(Tag::HANDL_INST, "1")
                    .with_field(Tag::SYMBOL, symbol.as_str())
                    .with_field(Tag::SIDE, side.as_fix().to_string())
                    .with_field(Tag::ORDER_QTY, quantity.to_string())
                    .with_field(Tag::ORD_TYPE, "2")
                    .with_field(Tag::PRICE, price.to_string())
                    .with_field(Tag::TRANSACT_TIME, Timestamp::now().to_fix_sending_time());
                self.send(write, heartbeat, order).await
            }
            SessionCommand::SendCancelRequest {
                cl_ord_id,
                symbol,
                side,
                quantity,
            } => {
                let cancel = FixMessage::new(MsgType::OrderCancelRequest)
                    .with_field(Tag::ORIG_CL_ORD_ID, cl_ord_id.as_str())
                    .with_field(Tag::CL_ORD_ID, cl_ord_id.as_str())
                    .with_field(Tag::SYMBOL, symbol.as_str())
                    .with_field(Tag::SIDE, side.as_fix().to_string())
                    .with_field(Tag::ORDER_QTY, quantity.to_string())
                    .with_field(Tag::TRANSACT_TIME, Timestamp::now().to_fix_sending_time());
                self.send(write, heartbeat, cancel).await
            }
            SessionCommand::InitiateLogout => {
                self.send(write, heartbeat, FixMessage::logout(None)).await?;
                self.transition(SessionState::PendingLogout).await;
                *deadline_at = Some(tokio::time::Instant::now() + self.config.logon_timeout);
                Ok(())
            }
        }
    }

    async fn handle_heartbeat_event<W>(
        &mut self,
        write: &mut W,
        heartbeat: &HeartbeatState,
        event: HeartbeatEvent,
    ) -> Result<(), SessionError>
    where
        W: Sink<String, Error = CodecError> + Unpin,
    {
        match event {
            HeartbeatEvent::SendHeartbeat => {
                self.send(write, heartbeat, FixMessage::heartbeat(None))
                    .await?;
                self.emit(SessionEvent::HeartbeatSent).await;
                Ok(())
            }
            HeartbeatEvent::SendTestRequest => {
                self.test_req_counter += 1;
                let test_req_id = format!("TEST{}", self.test_req_counter);
                self.send(write, heartbeat, FixMessage::test_request(&test_req_id))
                    .await?;
                heartbeat.mark_test_request_sent();
                self.emit(SessionEvent::TestRequestSent { test_req_id }).await;
                Ok(())
            }
            HeartbeatEvent::Timeout => Err(SessionError::HeartbeatTimeout),
        }
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    async fn send<W>(
        &mut self,
        write: &mut W,
        heartbeat: &HeartbeatState,
        message: FixMessage,
    ) -> Result<(), SessionError>
    where
        W: Sink<String, Error = CodecError> + Unpin,
    {
        let seq = self.sequences.peek_outbound();
        let frame = match self.codec.encode(&message, seq, Timestamp::now()) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    msg_type = %message.msg_type(),
                    "Failed to encode outbound message, nothing sent"
                );
                return Ok(());
            }
        };
        self.sequences.next_outbound();

        write
            .send(frame)
            .await
            .map_err(|_| SessionError::TransportClosed)?;
        heartbeat.record_outbound();
        metrics::record_message_sent(message.msg_type());
        tracing::debug!(seq, msg_type = %message.msg_type(), "Sent");
        Ok(())
    }

    fn current_state(&self) -> SessionState {
        *self.state.read()
    }

    async fn transition(&mut self, to: SessionState) {
        let from = self.current_state();
        if from == to {
            return;
        }
        *self.state.write() = to;
        metrics::set_session_active(to == SessionState::Active);
        tracing::info!(%from, %to, "Session state changed");
        self.emit(SessionEvent::StateChanged { from, to }).await;
    }

    async fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event).await;
    }
}

async fn wait_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

fn decode_execution(message: &DecodedMessage) -> Result<Execution, CodecError> {
    let exec_id = ExecId::new(message.require(Tag::EXEC_ID)?);
    let cl_ord_id = ClOrdId::new(message.require(Tag::CL_ORD_ID)?);

    let status_value = message.require(Tag::ORD_STATUS)?;
    let ord_status = match (status_value.len(), status_value.chars().next()) {
        (1, Some(ch)) => OrderStatus::from_fix(ch),
        _ => None,
    }
    .ok_or_else(|| CodecError::InvalidValue {
        tag: Tag::ORD_STATUS,
        value: status_value.to_string(),
    })?;

    let cum_qty: Quantity = message.get_parsed(Tag::CUM_QTY)?;
    let transact_time = match message.get(Tag::TRANSACT_TIME) {
        Some(value) => Timestamp::parse_fix_sending_time(value).map_err(|_| {
            CodecError::InvalidValue {
                tag: Tag::TRANSACT_TIME,
                value: value.to_string(),
            }
        })?,
        None => message.sending_time,
    };

    let mut execution = Execution::new(exec_id, cl_ord_id, ord_status, cum_qty, transact_time);

    let last_qty: Option<Quantity> = message.parse_opt(Tag::LAST_QTY)?;
    let last_px: Option<Price> = message.parse_opt(Tag::LAST_PX)?;
    if let (Some(qty), Some(px)) = (last_qty, last_px) {
        execution = execution.with_fill(qty, px);
    }
    if let Some(leaves) = message.parse_opt(Tag::LEAVES_QTY)? {
        execution = execution.with_leaves_qty(leaves);
    }
    if let Some(avg_px) = message.parse_opt(Tag::AVG_PX)? {
        execution = execution.with_avg_px(avg_px);
    }
    if let Some(text) = message.get(Tag::TEXT) {
        execution = execution.with_text(text);
    }

    Ok(execution)
}

fn decode_cancel_reject(message: &DecodedMessage) -> Result<CancelReject, CodecError> {
    let cl_ord_id = ClOrdId::new(message.require(Tag::CL_ORD_ID)?);
    let reason = message.get(Tag::TEXT).unwrap_or("Cancel rejected");
    Ok(CancelReject::new(cl_ord_id, reason))
}
