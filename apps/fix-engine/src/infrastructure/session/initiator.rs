//! TCP initiator.
//!
//! Dials a FIX acceptor over TCP and keeps a session alive across
//! connection failures. Every attempt runs a fresh [`SessionEngine`],
//! so sequence numbers restart at 1 and logon is renegotiated, matching
//! the no-persistent-recovery session policy.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::engine::{SessionEngine, SessionHandle};
use super::reconnect::{ReconnectConfig, ReconnectPolicy};
use crate::domain::session::{SessionConfig, SessionError, SessionEvent};
use crate::infrastructure::fix::SOH;
use crate::infrastructure::metrics;

/// Errors that can end the initiator loop.
#[derive(Debug, thiserror::Error)]
pub enum InitiatorError {
    /// TCP connect failed.
    #[error("TCP connect to {addr} failed: {source}")]
    Connect {
        /// Peer address that refused us.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The session ended with a fatal error.
    #[error("session failed: {0}")]
    Session(#[from] SessionError),

    /// Maximum reconnection attempts exceeded.
    #[error("maximum reconnection attempts exceeded")]
    MaxReconnectAttemptsExceeded,
}

/// Configuration for the TCP initiator.
#[derive(Debug, Clone)]
pub struct InitiatorConfig {
    /// Peer address, e.g. `127.0.0.1:9878`.
    pub peer_addr: String,
    /// FIX session parameters.
    pub session: SessionConfig,
    /// Reconnection backoff settings.
    pub reconnect: ReconnectConfig,
    /// Wire delimiter.
    pub delimiter: char,
}

impl InitiatorConfig {
    /// Config for a peer address with default session and backoff settings.
    #[must_use]
    pub fn new(peer_addr: impl Into<String>) -> Self {
        Self {
            peer_addr: peer_addr.into(),
            session: SessionConfig::default(),
            reconnect: ReconnectConfig::default(),
            delimiter: SOH,
        }
    }
}

/// FIX initiator: connect, run a session, back off, repeat.
pub struct FixInitiator {
    config: InitiatorConfig,
    event_tx: mpsc::Sender<SessionEvent>,
    current: Arc<RwLock<Option<SessionHandle>>>,
    cancel: CancellationToken,
}

impl FixInitiator {
    /// Create a new initiator.
    ///
    /// Session events from every connection go to `event_tx`, so the
    /// consumer sees one continuous stream across reconnects.
    #[must_use]
    pub fn new(
        config: InitiatorConfig,
        event_tx: mpsc::Sender<SessionEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            event_tx,
            current: Arc::new(RwLock::new(None)),
            cancel,
        }
    }

    /// Handle to the currently connected session, if any.
    ///
    /// Returns `None` between connections. After a reconnect the old
    /// handle reports `Stopped`; callers fetch a fresh one from here.
    #[must_use]
    pub fn session(&self) -> Option<SessionHandle> {
        self.current.read().clone()
    }

    /// Run the connect/reconnect loop until cancelled, a graceful logout,
    /// or reconnect attempts are exhausted.
    ///
    /// # Errors
    ///
    /// Returns `MaxReconnectAttemptsExceeded` once the backoff policy
    /// gives up.
    pub async fn run(self: Arc<Self>) -> Result<(), InitiatorError> {
        let mut policy = ReconnectPolicy::new(self.config.reconnect.clone());

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Initiator cancelled");
                return Ok(());
            }

            let started = std::time::Instant::now();
            match self.connect_and_run().await {
                Ok(()) => {
                    tracing::info!("FIX session closed gracefully");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "FIX session ended");

                    // A session that outlived a heartbeat interval was genuinely
                    // up; the next outage starts backoff from scratch.
                    if started.elapsed() > self.config.session.heart_bt_int {
                        policy.reset();
                    }

                    if let Some(delay) = policy.next_delay() {
                        let attempt = policy.attempt_count();
                        metrics::record_reconnect();
                        tracing::info!(
                            attempt,
                            delay_ms = delay.as_millis(),
                            "Reconnecting to FIX peer"
                        );
                        tokio::select! {
                            () = self.cancel.cancelled() => {
                                tracing::info!("Initiator cancelled during reconnect delay");
                                return Ok(());
                            }
                            () = tokio::time::sleep(delay) => {}
                        }
                    } else {
                        return Err(InitiatorError::MaxReconnectAttemptsExceeded);
                    }
                }
            }
        }
    }

    /// Dial the peer and drive one session to completion.
    async fn connect_and_run(&self) -> Result<(), InitiatorError> {
        tracing::info!(addr = %self.config.peer_addr, "Connecting to FIX peer");

        let stream = tokio::net::TcpStream::connect(&self.config.peer_addr)
            .await
            .map_err(|source| InitiatorError::Connect {
                addr: self.config.peer_addr.clone(),
                source,
            })?;
        let _ = stream.set_nodelay(true);

        let (engine, handle) = SessionEngine::new(
            self.config.session.clone(),
            self.event_tx.clone(),
            self.cancel.child_token(),
        );
        let engine = engine.with_delimiter(self.config.delimiter);
        *self.current.write() = Some(handle);

        let result = engine.run(stream).await;
        *self.current.write() = None;
        result.map_err(InitiatorError::from)
    }
}
