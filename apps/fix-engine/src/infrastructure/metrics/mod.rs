//! Prometheus metrics.
//!
//! One global recorder covers the whole engine: message traffic by type,
//! discarded frames by reason, sequence-gap detections, order flow through
//! the use cases, and a session liveness gauge. Callers go through the
//! `record_*`/`set_*` helpers so metric names and labels stay in one place.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::order::OrderStatus;
use crate::infrastructure::fix::{CodecError, MsgType};

// =============================================================================
// Recorder
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder and describe every metric once.
///
/// Later calls are no-ops that return the handle installed first.
///
/// # Panics
///
/// Panics if a different metrics recorder is already installed globally.
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("no other metrics recorder may be installed");
            describe_all();
            handle
        })
        .clone()
}

// =============================================================================
// Descriptions
// =============================================================================

fn describe_all() {
    describe_counter!(
        "fix_engine_messages_sent_total",
        "Total FIX messages sent, by message type"
    );
    describe_counter!(
        "fix_engine_messages_received_total",
        "Total FIX messages received, by message type"
    );
    describe_counter!(
        "fix_engine_frames_discarded_total",
        "Total inbound frames discarded, by reason"
    );

    describe_counter!(
        "fix_engine_sequence_gaps_total",
        "Total inbound sequence gaps detected"
    );
    describe_histogram!(
        "fix_engine_sequence_gap_size",
        "Number of messages missing per detected gap"
    );

    describe_counter!(
        "fix_engine_orders_submitted_total",
        "Total orders accepted by validation and sent to the counterparty"
    );
    describe_counter!(
        "fix_engine_orders_rejected_total",
        "Total orders rejected by local validation"
    );
    describe_counter!(
        "fix_engine_cancels_requested_total",
        "Total cancel requests sent to the counterparty"
    );
    describe_counter!(
        "fix_engine_executions_applied_total",
        "Total execution reports applied to the order book, by status"
    );
    describe_counter!(
        "fix_engine_order_errors_total",
        "Total execution reports that could not be applied"
    );

    describe_gauge!(
        "fix_engine_session_up",
        "1 while a session is active, 0 otherwise"
    );
    describe_counter!(
        "fix_engine_reconnects_total",
        "Total reconnection attempts by the initiator"
    );
}

// =============================================================================
// Labels
// =============================================================================

const fn msg_type_label(msg_type: MsgType) -> &'static str {
    match msg_type {
        MsgType::Heartbeat => "heartbeat",
        MsgType::TestRequest => "test_request",
        MsgType::ResendRequest => "resend_request",
        MsgType::Reject => "reject",
        MsgType::SequenceReset => "sequence_reset",
        MsgType::Logout => "logout",
        MsgType::ExecutionReport => "execution_report",
        MsgType::OrderCancelReject => "order_cancel_reject",
        MsgType::Logon => "logon",
        MsgType::NewOrderSingle => "new_order_single",
        MsgType::OrderCancelRequest => "order_cancel_request",
    }
}

const fn discard_reason(error: &CodecError) -> &'static str {
    match error {
        CodecError::Malformed(_) => "malformed",
        CodecError::ChecksumMismatch { .. } => "checksum_mismatch",
        CodecError::BodyLengthMismatch { .. } => "body_length_mismatch",
        CodecError::MissingTag(_) => "missing_tag",
        CodecError::InvalidValue { .. } => "invalid_value",
        CodecError::Encoding(_) => "encoding",
        CodecError::Io(_) => "io",
    }
}

const fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::New => "new",
        OrderStatus::Acknowledged => "acknowledged",
        OrderStatus::PartiallyFilled => "partially_filled",
        OrderStatus::Filled => "filled",
        OrderStatus::Canceled => "canceled",
        OrderStatus::Rejected => "rejected",
    }
}

// =============================================================================
// Recording helpers
// =============================================================================

/// Record a FIX message sent to the counterparty.
pub fn record_message_sent(msg_type: MsgType) {
    counter!(
        "fix_engine_messages_sent_total",
        "msg_type" => msg_type_label(msg_type)
    )
    .increment(1);
}

/// Record a FIX message received from the counterparty.
pub fn record_message_received(msg_type: MsgType) {
    counter!(
        "fix_engine_messages_received_total",
        "msg_type" => msg_type_label(msg_type)
    )
    .increment(1);
}

/// Record an inbound frame discarded without processing.
pub fn record_frame_discarded(error: &CodecError) {
    counter!(
        "fix_engine_frames_discarded_total",
        "reason" => discard_reason(error)
    )
    .increment(1);
}

/// Record a detected inbound sequence gap of `missed` messages.
pub fn record_sequence_gap(missed: u64) {
    counter!("fix_engine_sequence_gaps_total").increment(1);
    #[allow(clippy::cast_precision_loss)]
    histogram!("fix_engine_sequence_gap_size").record(missed as f64);
}

/// Record an order accepted by validation and sent out.
pub fn record_order_submitted() {
    counter!("fix_engine_orders_submitted_total").increment(1);
}

/// Record an order rejected by local validation.
pub fn record_order_rejected() {
    counter!("fix_engine_orders_rejected_total").increment(1);
}

/// Record a cancel request sent out.
pub fn record_cancel_requested() {
    counter!("fix_engine_cancels_requested_total").increment(1);
}

/// Record an execution report applied to the order book.
pub fn record_execution_applied(status: OrderStatus) {
    counter!(
        "fix_engine_executions_applied_total",
        "status" => status_label(status)
    )
    .increment(1);
}

/// Record an execution report that could not be applied.
pub fn record_order_error() {
    counter!("fix_engine_order_errors_total").increment(1);
}

/// Update the session liveness gauge.
pub fn set_session_active(active: bool) {
    gauge!("fix_engine_session_up").set(if active { 1.0 } else { 0.0 });
}

/// Record a reconnection attempt by the initiator.
pub fn record_reconnect() {
    counter!("fix_engine_reconnects_total").increment(1);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msg_type_labels_are_snake_case() {
        assert_eq!(msg_type_label(MsgType::Logon), "logon");
        assert_eq!(msg_type_label(MsgType::TestRequest), "test_request");
        assert_eq!(msg_type_label(MsgType::NewOrderSingle), "new_order_single");
        assert_eq!(
            msg_type_label(MsgType::OrderCancelReject),
            "order_cancel_reject"
        );
    }

    #[test]
    fn discard_reasons_cover_decode_failures() {
        assert_eq!(
            discard_reason(&CodecError::Malformed("x".to_string())),
            "malformed"
        );
        assert_eq!(
            discard_reason(&CodecError::ChecksumMismatch {
                declared: 1,
                computed: 2
            }),
            "checksum_mismatch"
        );
        assert_eq!(
            discard_reason(&CodecError::BodyLengthMismatch {
                declared: 10,
                actual: 12
            }),
            "body_length_mismatch"
        );
    }

    #[test]
    fn status_labels_are_snake_case() {
        assert_eq!(status_label(OrderStatus::New), "new");
        assert_eq!(
            status_label(OrderStatus::PartiallyFilled),
            "partially_filled"
        );
        assert_eq!(status_label(OrderStatus::Canceled), "canceled");
    }
}
