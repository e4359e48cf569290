//! Scripted broker counterparty.
//!
//! `BrokerSimulator` plays the acceptor side of a FIX session over any
//! transport: it acknowledges Logon, acks and fills orders according to a
//! [`FillScript`], honors cancels, and answers session-level probes. Used
//! by the demo binary in duplex mode and by integration tests.
//!
//! Fault injection ([`Faults`]) covers the failure drills: skipping
//! outbound sequence numbers to force a gap, going silent to trip the
//! heartbeat escalation, and corrupting a frame to exercise checksum
//! rejection.

use std::collections::HashMap;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

use crate::domain::order::OrderSide;
use crate::domain::session::SessionConfig;
use crate::domain::shared::{Price, Quantity, Timestamp};
use crate::infrastructure::fix::{
    CodecError, DecodedMessage, FixCodec, FixFrameCodec, FixMessage, MsgType, Tag,
};

/// One step of a fill script.
#[derive(Debug, Clone)]
pub enum FillStep {
    /// Partial fill of the given quantity at the limit price.
    Partial(Quantity),
    /// Fill whatever remains at the limit price.
    Complete,
}

/// How the simulator fills accepted orders.
#[derive(Debug, Clone, Default)]
pub struct FillScript {
    steps: Vec<FillStep>,
}

impl FillScript {
    /// Custom step sequence.
    #[must_use]
    pub fn new(steps: Vec<FillStep>) -> Self {
        Self { steps }
    }

    /// Acknowledge orders but never fill them.
    #[must_use]
    pub fn acknowledge_only() -> Self {
        Self::default()
    }

    /// Fill the whole order right after the ack.
    #[must_use]
    pub fn fill_immediately() -> Self {
        Self::new(vec![FillStep::Complete])
    }

    /// Partial fill of `qty`, then fill the remainder.
    #[must_use]
    pub fn partial_then_complete(qty: Quantity) -> Self {
        Self::new(vec![FillStep::Partial(qty), FillStep::Complete])
    }
}

/// Deliberate misbehaviors for failure drills.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Skip this many outbound sequence numbers before the first fill.
    pub skip_before_fill: Option<u64>,
    /// Stop replying to everything once the logon ack is out.
    pub silent_after_logon: bool,
    /// Corrupt one byte of the first ExecutionReport frame.
    pub corrupt_first_execution: bool,
}

/// Book entry for one accepted order.
#[derive(Debug)]
struct SimOrder {
    symbol: String,
    side: OrderSide,
    qty: Quantity,
    px: Price,
    cum: Quantity,
    terminal: bool,
}

/// Mutable per-connection state.
#[derive(Debug, Default)]
struct SimState {
    out_seq: u64,
    orders: HashMap<String, SimOrder>,
    order_counter: u64,
    exec_counter: u64,
    silent: bool,
    fill_started: bool,
    exec_sent: bool,
}

impl SimState {
    fn next_seq(&mut self) -> u64 {
        self.out_seq += 1;
        self.out_seq
    }

    fn next_order_id(&mut self) -> String {
        self.order_counter += 1;
        format!("SIM{:03}", self.order_counter)
    }

    fn next_exec_id(&mut self) -> String {
        self.exec_counter += 1;
        format!("EXEC{:03}", self.exec_counter)
    }
}

/// Scripted FIX acceptor.
pub struct BrokerSimulator {
    codec: FixCodec,
    fill_script: FillScript,
    faults: Faults,
}

impl BrokerSimulator {
    /// Simulator speaking the counterparty side of `config`'s session.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            codec: FixCodec::counterparty(config),
            fill_script: FillScript::fill_immediately(),
            faults: Faults::default(),
        }
    }

    /// Set the fill script.
    #[must_use]
    pub fn with_fill_script(mut self, script: FillScript) -> Self {
        self.fill_script = script;
        self
    }

    /// Set fault injection.
    #[must_use]
    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    /// Override the wire delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.codec = self.codec.clone().with_delimiter(delimiter);
        self
    }

    /// Serve one session until logout, disconnect, or transport failure.
    ///
    /// # Errors
    ///
    /// Returns transport-level errors; protocol noise from the peer is
    /// logged and skipped.
    pub async fn run<T>(self, transport: T) -> Result<(), CodecError>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let mut framed = Framed::new(transport, FixFrameCodec::new(self.codec.delimiter()));
        let mut state = SimState::default();

        while let Some(frame) = framed.next().await {
            let frame = frame?;
            let message = match self.codec.decode(&frame) {
                Ok(message) => message,
                Err(e) => {
                    tracing::debug!(error = %e, "Simulator dropping unreadable frame");
                    continue;
                }
            };
            tracing::debug!(
                seq = message.seq,
                msg_type = %message.msg_type(),
                "Simulator received"
            );

            if state.silent {
                continue;
            }

            match message.msg_type() {
                MsgType::Logon => {
                    let heart_bt_int = message.get(Tag::HEART_BT_INT).unwrap_or("30");
                    let ack = FixMessage::new(MsgType::Logon)
                        .with_field(Tag::ENCRYPT_METHOD, "0")
                        .with_field(Tag::HEART_BT_INT, heart_bt_int);
                    self.send(&mut framed, &mut state, ack).await?;
                    if self.faults.silent_after_logon {
                        tracing::info!("Simulator going silent");
                        state.silent = true;
                    }
                }
                MsgType::TestRequest => {
                    let heartbeat = FixMessage::heartbeat(message.get(Tag::TEST_REQ_ID));
                    self.send(&mut framed, &mut state, heartbeat).await?;
                }
                MsgType::Heartbeat | MsgType::SequenceReset => {}
                MsgType::ResendRequest => {
                    self.answer_resend(&mut framed, &mut state, &message).await?;
                }
                MsgType::Logout => {
                    let confirm = FixMessage::logout(None);
                    self.send(&mut framed, &mut state, confirm).await?;
                    tracing::info!("Simulator confirmed logout");
                    return Ok(());
                }
                MsgType::NewOrderSingle => {
                    self.handle_new_order(&mut framed, &mut state, &message)
                        .await?;
                }
                MsgType::OrderCancelRequest => {
                    self.handle_cancel(&mut framed, &mut state, &message).await?;
                }
                MsgType::Reject
                | MsgType::ExecutionReport
                | MsgType::OrderCancelReject => {
                    tracing::warn!(
                        msg_type = %message.msg_type(),
                        "Simulator ignoring unexpected message"
                    );
                }
            }
        }

        tracing::info!("Simulator transport closed");
        Ok(())
    }

    async fn handle_new_order<T>(
        &self,
        framed: &mut Framed<T, FixFrameCodec>,
        state: &mut SimState,
        message: &DecodedMessage,
    ) -> Result<(), CodecError>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let cl_ord_id = message.require(Tag::CL_ORD_ID)?.to_string();
        let symbol = message.require(Tag::SYMBOL)?.to_string();
        let side_value = message.require(Tag::SIDE)?;
        let side = side_value
            .chars()
            .next()
            .filter(|_| side_value.len() == 1)
            .and_then(OrderSide::from_fix)
            .ok_or_else(|| CodecError::InvalidValue {
                tag: Tag::SIDE,
                value: side_value.to_string(),
            })?;
        let qty: Quantity = message.get_parsed(Tag::ORDER_QTY)?;
        let px: Price = message.get_parsed(Tag::PRICE)?;

        let order_id = state.next_order_id();
        state.orders.insert(
            cl_ord_id.clone(),
            SimOrder {
                symbol: symbol.clone(),
                side,
                qty,
                px,
                cum: Quantity::ZERO,
                terminal: false,
            },
        );
        tracing::info!(cl_ord_id = %cl_ord_id, order_id = %order_id, %symbol, "Simulator accepted order");

        // Ack: 39=0, no fill quantities yet.
        let exec_id = state.next_exec_id();
        let ack = execution_report(&order_id, &exec_id, &cl_ord_id, &symbol, side, '0')
            .with_field(Tag::CUM_QTY, "0")
            .with_field(Tag::LEAVES_QTY, qty.to_string())
            .with_field(Tag::AVG_PX, "0")
            .with_field(Tag::TRANSACT_TIME, Timestamp::now().to_fix_sending_time());
        self.send(framed, state, ack).await?;

        // Play the fill script against this order.
        let steps = self.fill_script.steps.clone();
        for step in steps {
            if !state.fill_started {
                state.fill_started = true;
                if let Some(n) = self.faults.skip_before_fill {
                    tracing::info!(skipped = n, "Simulator skipping sequence numbers");
                    state.out_seq += n;
                }
            }

            let (last_qty, done) = {
                let Some(order) = state.orders.get(&cl_ord_id) else {
                    break;
                };
                let leaves = order.qty - order.cum;
                match step {
                    FillStep::Partial(partial_qty) => {
                        let last = if partial_qty < leaves { partial_qty } else { leaves };
                        (last, last == leaves)
                    }
                    FillStep::Complete => (leaves, true),
                }
            };
            if last_qty == Quantity::ZERO {
                break;
            }

            let exec_id = state.next_exec_id();
            let report = {
                let Some(order) = state.orders.get_mut(&cl_ord_id) else {
                    break;
                };
                order.cum = order.cum + last_qty;
                let leaves = order.qty - order.cum;
                let status = if done { '2' } else { '1' };
                if done {
                    order.terminal = true;
                }
                execution_report(&order_id, &exec_id, &cl_ord_id, &order.symbol, order.side, status)
                    .with_field(Tag::LAST_QTY, last_qty.to_string())
                    .with_field(Tag::LAST_PX, order.px.to_string())
                    .with_field(Tag::CUM_QTY, order.cum.to_string())
                    .with_field(Tag::LEAVES_QTY, leaves.to_string())
                    .with_field(Tag::AVG_PX, order.px.to_string())
                    .with_field(Tag::TRANSACT_TIME, Timestamp::now().to_fix_sending_time())
            };
            self.send(framed, state, report).await?;
            if done {
                break;
            }
        }

        Ok(())
    }

    async fn handle_cancel<T>(
        &self,
        framed: &mut Framed<T, FixFrameCodec>,
        state: &mut SimState,
        message: &DecodedMessage,
    ) -> Result<(), CodecError>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let cl_ord_id = message.require(Tag::CL_ORD_ID)?.to_string();
        let orig = message
            .get(Tag::ORIG_CL_ORD_ID)
            .unwrap_or(cl_ord_id.as_str())
            .to_string();

        let reply = match state.orders.get_mut(&orig) {
            Some(order) if !order.terminal => {
                order.terminal = true;
                let cum = order.cum;
                let symbol = order.symbol.clone();
                let side = order.side;
                let avg = if cum == Quantity::ZERO {
                    "0".to_string()
                } else {
                    order.px.to_string()
                };
                let exec_id = state.next_exec_id();
                let order_id = state.next_order_id();
                execution_report(&order_id, &exec_id, &orig, &symbol, side, '4')
                    .with_field(Tag::CUM_QTY, cum.to_string())
                    .with_field(Tag::LEAVES_QTY, "0")
                    .with_field(Tag::AVG_PX, avg)
                    .with_field(Tag::TEXT, "Canceled by request")
                    .with_field(Tag::TRANSACT_TIME, Timestamp::now().to_fix_sending_time())
            }
            Some(_) => cancel_reject(&cl_ord_id, &orig, "Order already terminal"),
            None => cancel_reject(&cl_ord_id, &orig, "Unknown order"),
        };
        self.send(framed, state, reply).await
    }

    /// No outbound store: gap-fill the requested range instead of
    /// replaying it. EndSeqNo 0 means "through the latest".
    async fn answer_resend<T>(
        &self,
        framed: &mut Framed<T, FixFrameCodec>,
        state: &mut SimState,
        message: &DecodedMessage,
    ) -> Result<(), CodecError>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let begin: u64 = message.get_parsed(Tag::BEGIN_SEQ_NO)?;
        let end: u64 = message.get_parsed(Tag::END_SEQ_NO)?;
        let new_seq_no = if end >= begin {
            end + 1
        } else {
            state.out_seq + 1
        };
        tracing::info!(begin, end, new_seq_no, "Simulator answering resend with gap fill");

        let reply = FixMessage::sequence_reset_gap_fill(new_seq_no);
        let frame = self.codec.encode(&reply, begin, Timestamp::now())?;
        framed.send(frame).await
    }

    async fn send<T>(
        &self,
        framed: &mut Framed<T, FixFrameCodec>,
        state: &mut SimState,
        message: FixMessage,
    ) -> Result<(), CodecError>
    where
        T: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let seq = state.next_seq();
        let mut frame = self.codec.encode(&message, seq, Timestamp::now())?;

        if self.faults.corrupt_first_execution
            && message.msg_type() == MsgType::ExecutionReport
            && !state.exec_sent
        {
            state.exec_sent = true;
            frame = corrupt_one_byte(frame);
            tracing::info!(seq, "Simulator corrupted outbound frame");
        }

        tracing::debug!(seq, msg_type = %message.msg_type(), "Simulator sent");
        framed.send(frame).await
    }
}

fn execution_report(
    order_id: &str,
    exec_id: &str,
    cl_ord_id: &str,
    symbol: &str,
    side: OrderSide,
    ord_status: char,
) -> FixMessage {
    FixMessage::new(MsgType::ExecutionReport)
        .with_field(Tag::ORDER_ID, order_id)
        .with_field(Tag::EXEC_ID, exec_id)
        .with_field(Tag::EXEC_TYPE, ord_status.to_string())
        .with_field(Tag::ORD_STATUS, ord_status.to_string())
        .with_field(Tag::CL_ORD_ID, cl_ord_id)
        .with_field(Tag::SYMBOL, symbol)
        .with_field(Tag::SIDE, side.as_fix().to_string())
}

fn cancel_reject(cl_ord_id: &str, orig_cl_ord_id: &str, reason: &str) -> FixMessage {
    FixMessage::new(MsgType::OrderCancelReject)
        .with_field(Tag::CL_ORD_ID, cl_ord_id)
        .with_field(Tag::ORIG_CL_ORD_ID, orig_cl_ord_id)
        .with_field(Tag::ORDER_ID, "NONE")
        .with_field(Tag::ORD_STATUS, "8")
        .with_field(Tag::TEXT, reason)
}

/// Flip one byte in the middle of the frame body, leaving the trailer
/// intact so framing still extracts it.
fn corrupt_one_byte(frame: String) -> String {
    let mut bytes = frame.into_bytes();
    let index = bytes.len() / 2;
    bytes[index] = if bytes[index] == b'X' { b'Y' } else { b'X' };
    // Tag/value bytes are ASCII, so the frame stays valid UTF-8.
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    async fn next_frame<T>(framed: &mut Framed<T, FixFrameCodec>) -> String
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        tokio::time::timeout(Duration::from_secs(1), framed.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("frame error")
    }

    struct Client {
        codec: FixCodec,
        framed: Framed<tokio::io::DuplexStream, FixFrameCodec>,
        seq: u64,
    }

    impl Client {
        fn start(simulator: BrokerSimulator) -> Self {
            let config = SessionConfig::default();
            let (client, server) = tokio::io::duplex(8192);
            tokio::spawn(simulator.run(server));

            let codec = FixCodec::new(&config);
            Self {
                framed: Framed::new(client, FixFrameCodec::new(codec.delimiter())),
                codec,
                seq: 0,
            }
        }

        async fn send(&mut self, message: FixMessage) {
            self.seq += 1;
            let frame = self
                .codec
                .encode(&message, self.seq, Timestamp::now())
                .unwrap();
            self.framed.send(frame).await.unwrap();
        }

        async fn recv(&mut self) -> DecodedMessage {
            let raw = next_frame(&mut self.framed).await;
            self.codec.decode(&raw).unwrap()
        }

        async fn logon(&mut self) {
            self.send(FixMessage::logon(30)).await;
            let ack = self.recv().await;
            assert_eq!(ack.msg_type(), MsgType::Logon);
        }

        fn new_order(cl_ord_id: &str, qty: i64, px: f64) -> FixMessage {
            FixMessage::new(MsgType::NewOrderSingle)
                .with_field(Tag::CL_ORD_ID, cl_ord_id)
                .with_field(Tag::HANDL_INST, "1")
                .with_field(Tag::SYMBOL, "AAPL")
                .with_field(Tag::SIDE, "1")
                .with_field(Tag::ORDER_QTY, qty.to_string())
                .with_field(Tag::ORD_TYPE, "2")
                .with_field(Tag::PRICE, Price::from_f64(px).to_string())
                .with_field(Tag::TRANSACT_TIME, Timestamp::now().to_fix_sending_time())
        }
    }

    #[tokio::test]
    async fn logon_is_acknowledged_with_echoed_interval() {
        let simulator = BrokerSimulator::new(&SessionConfig::default());
        let mut client = Client::start(simulator);

        client.send(FixMessage::logon(15)).await;
        let ack = client.recv().await;
        assert_eq!(ack.msg_type(), MsgType::Logon);
        assert_eq!(ack.get(Tag::HEART_BT_INT), Some("15"));
        assert_eq!(ack.seq, 1);
    }

    #[tokio::test]
    async fn order_is_acked_then_filled_per_script() {
        let simulator = BrokerSimulator::new(&SessionConfig::default())
            .with_fill_script(FillScript::partial_then_complete(Quantity::from_i64(4)));
        let mut client = Client::start(simulator);
        client.logon().await;

        client.send(Client::new_order("ORD001", 10, 202.00)).await;

        let ack = client.recv().await;
        assert_eq!(ack.get(Tag::ORD_STATUS), Some("0"));
        assert_eq!(ack.get(Tag::LEAVES_QTY), Some("10"));

        let partial = client.recv().await;
        assert_eq!(partial.get(Tag::ORD_STATUS), Some("1"));
        assert_eq!(partial.get(Tag::LAST_QTY), Some("4"));
        assert_eq!(partial.get(Tag::CUM_QTY), Some("4"));
        assert_eq!(partial.get(Tag::LEAVES_QTY), Some("6"));

        let fill = client.recv().await;
        assert_eq!(fill.get(Tag::ORD_STATUS), Some("2"));
        assert_eq!(fill.get(Tag::CUM_QTY), Some("10"));
        assert_eq!(fill.get(Tag::LEAVES_QTY), Some("0"));
    }

    #[tokio::test]
    async fn working_order_cancel_is_confirmed() {
        let simulator = BrokerSimulator::new(&SessionConfig::default())
            .with_fill_script(FillScript::acknowledge_only());
        let mut client = Client::start(simulator);
        client.logon().await;

        client.send(Client::new_order("ORD001", 10, 202.00)).await;
        let _ack = client.recv().await;

        let cancel = FixMessage::new(MsgType::OrderCancelRequest)
            .with_field(Tag::ORIG_CL_ORD_ID, "ORD001")
            .with_field(Tag::CL_ORD_ID, "ORD001")
            .with_field(Tag::SYMBOL, "AAPL")
            .with_field(Tag::SIDE, "1")
            .with_field(Tag::ORDER_QTY, "10")
            .with_field(Tag::TRANSACT_TIME, Timestamp::now().to_fix_sending_time());
        client.send(cancel).await;

        let reply = client.recv().await;
        assert_eq!(reply.msg_type(), MsgType::ExecutionReport);
        assert_eq!(reply.get(Tag::ORD_STATUS), Some("4"));
        assert_eq!(reply.get(Tag::LEAVES_QTY), Some("0"));
    }

    #[tokio::test]
    async fn unknown_cancel_is_rejected() {
        let simulator = BrokerSimulator::new(&SessionConfig::default());
        let mut client = Client::start(simulator);
        client.logon().await;

        let cancel = FixMessage::new(MsgType::OrderCancelRequest)
            .with_field(Tag::ORIG_CL_ORD_ID, "GHOST")
            .with_field(Tag::CL_ORD_ID, "GHOST")
            .with_field(Tag::SYMBOL, "AAPL")
            .with_field(Tag::SIDE, "1")
            .with_field(Tag::TRANSACT_TIME, Timestamp::now().to_fix_sending_time());
        client.send(cancel).await;

        let reply = client.recv().await;
        assert_eq!(reply.msg_type(), MsgType::OrderCancelReject);
        assert_eq!(reply.get(Tag::TEXT), Some("Unknown order"));
    }

    #[tokio::test]
    async fn test_request_is_echoed() {
        let simulator = BrokerSimulator::new(&SessionConfig::default());
        let mut client = Client::start(simulator);
        client.logon().await;

        client.send(FixMessage::test_request("PING7")).await;
        let reply = client.recv().await;
        assert_eq!(reply.msg_type(), MsgType::Heartbeat);
        assert_eq!(reply.get(Tag::TEST_REQ_ID), Some("PING7"));
    }

    #[tokio::test]
    async fn logout_is_confirmed() {
        let simulator = BrokerSimulator::new(&SessionConfig::default());
        let mut client = Client::start(simulator);
        client.logon().await;

        client.send(FixMessage::logout(None)).await;
        let reply = client.recv().await;
        assert_eq!(reply.msg_type(), MsgType::Logout);
    }

    #[tokio::test]
    async fn skip_fault_creates_sequence_gap() {
        let simulator = BrokerSimulator::new(&SessionConfig::default()).with_faults(Faults {
            skip_before_fill: Some(2),
            ..Faults::default()
        });
        let mut client = Client::start(simulator);
        client.logon().await;

        client.send(Client::new_order("ORD001", 10, 202.00)).await;
        let ack = client.recv().await;
        assert_eq!(ack.seq, 2);

        // Fill jumps from 3 to 5.
        let fill = client.recv().await;
        assert_eq!(fill.seq, 5);
        assert_eq!(fill.get(Tag::ORD_STATUS), Some("2"));
    }

    #[tokio::test]
    async fn corrupt_fault_breaks_the_checksum() {
        let simulator = BrokerSimulator::new(&SessionConfig::default()).with_faults(Faults {
            corrupt_first_execution: true,
            ..Faults::default()
        });
        let mut client = Client::start(simulator);
        client.logon().await;

        client.send(Client::new_order("ORD001", 10, 202.00)).await;

        let raw = next_frame(&mut client.framed).await;
        let result = client.codec.decode(&raw);
        assert!(matches!(
            result,
            Err(CodecError::ChecksumMismatch { .. } | CodecError::BodyLengthMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn silent_fault_stops_all_replies() {
        let simulator = BrokerSimulator::new(&SessionConfig::default()).with_faults(Faults {
            silent_after_logon: true,
            ..Faults::default()
        });
        let mut client = Client::start(simulator);
        client.logon().await;

        client.send(FixMessage::test_request("PING1")).await;
        let outcome =
            tokio::time::timeout(Duration::from_millis(100), client.framed.next()).await;
        assert!(outcome.is_err(), "simulator should stay silent");
    }
}
