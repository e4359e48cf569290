//! Heartbeat Monitor
//!
//! Watches both directions of a FIX session. Outbound: requests a Heartbeat
//! whenever nothing has been sent for a full interval. Inbound: escalates
//! silence to a TestRequest after 1.2 intervals, then to a timeout if the
//! counterparty stays silent for a further interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Inbound silence tolerance as a multiple of the heartbeat interval.
const IDLE_TOLERANCE: f64 = 1.2;

/// Timing thresholds derived from the negotiated HeartBtInt.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Send a Heartbeat after this much outbound silence.
    pub send_interval: Duration,
    /// Send a TestRequest after this much inbound silence.
    pub idle_threshold: Duration,
    /// Declare the session dead this long after an unanswered TestRequest.
    pub test_request_grace: Duration,
}

impl HeartbeatConfig {
    /// Derive the thresholds from a heartbeat interval.
    #[must_use]
    pub fn from_heart_bt_int(heart_bt_int: Duration) -> Self {
        Self {
            send_interval: heart_bt_int,
            idle_threshold: heart_bt_int.mul_f64(IDLE_TOLERANCE),
            test_request_grace: heart_bt_int,
        }
    }
}

/// Events emitted by the heartbeat monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatEvent {
    /// Request to send a Heartbeat message.
    SendHeartbeat,
    /// Request to send a TestRequest probing a silent counterparty.
    SendTestRequest,
    /// The counterparty stayed silent past the grace period.
    Timeout,
}

/// Traffic timestamps shared between the monitor and the session engine.
#[derive(Debug)]
pub struct HeartbeatState {
    last_inbound: RwLock<Instant>,
    last_outbound: RwLock<Instant>,
    test_request_sent_at: RwLock<Instant>,
    test_request_outstanding: AtomicBool,
}

impl Default for HeartbeatState {
    fn default() -> Self {
        Self::new()
    }
}

impl HeartbeatState {
    /// Create fresh state with both directions marked live now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_inbound: RwLock::new(now),
            last_outbound: RwLock::new(now),
            test_request_sent_at: RwLock::new(now),
            test_request_outstanding: AtomicBool::new(false),
        }
    }

    /// Record an inbound message. Any traffic proves liveness, so an
    /// outstanding TestRequest is considered answered.
    pub fn record_inbound(&self) {
        *self.last_inbound.write() = Instant::now();
        self.test_request_outstanding.store(false, Ordering::SeqCst);
    }

    /// Record an outbound message.
    pub fn record_outbound(&self) {
        *self.last_outbound.write() = Instant::now();
    }

    /// Mark that a TestRequest went out and the grace period started.
    pub fn mark_test_request_sent(&self) {
        *self.test_request_sent_at.write() = Instant::now();
        self.test_request_outstanding.store(true, Ordering::SeqCst);
    }

    /// Check if a TestRequest is awaiting an answer.
    #[must_use]
    pub fn is_test_request_outstanding(&self) -> bool {
        self.test_request_outstanding.load(Ordering::SeqCst)
    }

    /// Time since the last inbound message.
    #[must_use]
    pub fn time_since_inbound(&self) -> Duration {
        self.last_inbound.read().elapsed()
    }

    /// Time since the last outbound message.
    #[must_use]
    pub fn time_since_outbound(&self) -> Duration {
        self.last_outbound.read().elapsed()
    }

    /// Time since the outstanding TestRequest was sent.
    #[must_use]
    pub fn time_since_test_request(&self) -> Duration {
        self.test_request_sent_at.read().elapsed()
    }

    /// Reset for a new connection.
    pub fn reset(&self) {
        let now = Instant::now();
        *self.last_inbound.write() = now;
        *self.last_outbound.write() = now;
        self.test_request_outstanding.store(false, Ordering::SeqCst);
    }
}

/// Heartbeat monitor driving one session's liveness checks.
///
/// Runs until cancelled or until it reports a timeout. The session engine
/// owns the wire, so the monitor only emits events; the engine sends the
/// actual messages and feeds traffic timestamps back into the shared state.
pub struct HeartbeatMonitor {
    config: HeartbeatConfig,
    state: Arc<HeartbeatState>,
    event_tx: mpsc::Sender<HeartbeatEvent>,
    cancel: CancellationToken,
}

impl HeartbeatMonitor {
    /// Create a new heartbeat monitor.
    #[must_use]
    pub const fn new(
        config: HeartbeatConfig,
        state: Arc<HeartbeatState>,
        event_tx: mpsc::Sender<HeartbeatEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            state,
            event_tx,
            cancel,
        }
    }

    /// Run the monitoring loop.
    pub async fn run(self) {
        let tick = (self.config.send_interval / 4).max(Duration::from_millis(10));
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::debug!("Heartbeat monitor cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if self.check().await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    /// Evaluate both directions once.
    ///
    /// Returns `Err(())` if the session timed out and the loop should exit.
    async fn check(&self) -> Result<(), ()> {
        if self.state.is_test_request_outstanding() {
            let waited = self.state.time_since_test_request();
            if waited > self.config.test_request_grace {
                tracing::warn!(
                    waited_ms = waited.as_millis(),
                    grace_ms = self.config.test_request_grace.as_millis(),
                    "TestRequest unanswered, declaring heartbeat timeout"
                );
                let _ = self.event_tx.send(HeartbeatEvent::Timeout).await;
                return Err(());
            }
        } else if self.state.time_since_inbound() > self.config.idle_threshold
            && self
                .event_tx
                .send(HeartbeatEvent::SendTestRequest)
                .await
                .is_err()
        {
            tracing::debug!("Event channel closed, stopping heartbeat monitor");
            return Err(());
        }

        if self.state.time_since_outbound() >= self.config.send_interval
            && self
                .event_tx
                .send(HeartbeatEvent::SendHeartbeat)
                .await
                .is_err()
        {
            tracing::debug!("Event channel closed, stopping heartbeat monitor");
            return Err(());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backdate(lock: &RwLock<Instant>, by: Duration) {
        *lock.write() = Instant::now().checked_sub(by).unwrap();
    }

    #[test]
    fn config_derived_from_heart_bt_int() {
        let config = HeartbeatConfig::from_heart_bt_int(Duration::from_secs(30));

        assert_eq!(config.send_interval, Duration::from_secs(30));
        assert_eq!(config.idle_threshold, Duration::from_secs(36));
        assert_eq!(config.test_request_grace, Duration::from_secs(30));
    }

    #[test]
    fn state_inbound_clears_outstanding_test_request() {
        let state = HeartbeatState::new();
        state.mark_test_request_sent();
        assert!(state.is_test_request_outstanding());

        state.record_inbound();
        assert!(!state.is_test_request_outstanding());
    }

    #[test]
    fn state_reset_clears_everything() {
        let state = HeartbeatState::new();
        state.mark_test_request_sent();

        state.reset();
        assert!(!state.is_test_request_outstanding());
        assert!(state.time_since_inbound() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn monitor_requests_heartbeat_after_outbound_silence() {
        let config = HeartbeatConfig::from_heart_bt_int(Duration::from_millis(40));
        let state = Arc::new(HeartbeatState::new());
        let (event_tx, mut event_rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();

        backdate(&state.last_outbound, Duration::from_millis(100));
        let monitor = HeartbeatMonitor::new(config, state.clone(), event_tx, cancel.clone());
        let handle = tokio::spawn(monitor.run());

        let event = tokio::time::timeout(Duration::from_millis(500), event_rx.recv())
            .await
            .expect("should receive event")
            .expect("channel should stay open");
        assert_eq!(event, HeartbeatEvent::SendHeartbeat);

        cancel.cancel();
        handle.await.expect("task should complete");
    }

    #[tokio::test]
    async fn monitor_escalates_inbound_silence_to_test_request() {
        let config = HeartbeatConfig::from_heart_bt_int(Duration::from_millis(40));
        let state = Arc::new(HeartbeatState::new());
        let (event_tx, mut event_rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();

        backdate(&state.last_inbound, Duration::from_millis(100));
        let monitor = HeartbeatMonitor::new(config, state.clone(), event_tx, cancel.clone());
        let handle = tokio::spawn(monitor.run());

        let mut saw_test_request = false;
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_millis(500), event_rx.recv()).await
        {
            if event == HeartbeatEvent::SendTestRequest {
                saw_test_request = true;
                break;
            }
        }
        assert!(saw_test_request, "should escalate to TestRequest");

        cancel.cancel();
        handle.await.expect("task should complete");
    }

    #[tokio::test]
    async fn monitor_times_out_after_unanswered_test_request() {
        let config = HeartbeatConfig::from_heart_bt_int(Duration::from_millis(40));
        let state = Arc::new(HeartbeatState::new());
        let (event_tx, mut event_rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();

        state.mark_test_request_sent();
        backdate(&state.test_request_sent_at, Duration::from_millis(100));

        let monitor = HeartbeatMonitor::new(config, state.clone(), event_tx, cancel.clone());
        let handle = tokio::spawn(monitor.run());

        let mut saw_timeout = false;
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_millis(500), event_rx.recv()).await
        {
            if event == HeartbeatEvent::Timeout {
                saw_timeout = true;
                break;
            }
        }
        assert!(saw_timeout, "should report timeout");

        // The monitor exits on its own after a timeout.
        let result = tokio::time::timeout(Duration::from_millis(200), handle).await;
        assert!(result.is_ok(), "monitor should stop after timeout");
    }

    #[tokio::test]
    async fn monitor_stops_on_cancellation() {
        let config = HeartbeatConfig::from_heart_bt_int(Duration::from_secs(10));
        let state = Arc::new(HeartbeatState::new());
        let (event_tx, _event_rx) = mpsc::channel(10);
        let cancel = CancellationToken::new();

        let monitor = HeartbeatMonitor::new(config, state, event_tx, cancel.clone());
        let handle = tokio::spawn(monitor.run());

        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_millis(100), handle).await;
        assert!(result.is_ok(), "monitor should shut down on cancellation");
    }
}
