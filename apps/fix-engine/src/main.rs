//! FIX Engine Binary
//!
//! Starts the FIX session and order management engine. Without a peer
//! address it runs a self-contained demo against the in-process broker
//! simulator: logon, buy 10 AAPL at 202.00, watch the fills, print the
//! blotter, log out.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin fix-engine
//! ```
//!
//! # Environment Variables
//!
//! ## Optional
//! - `FIX_PEER_ADDR`: Counterparty host:port; unset runs the in-process demo
//! - `FIX_BEGIN_STRING`: Protocol version (default: FIX.4.2)
//! - `FIX_SENDER_COMP_ID`: Our CompID (default: CLIENT1)
//! - `FIX_TARGET_COMP_ID`: Counterparty CompID (default: BROKERX)
//! - `FIX_HEART_BT_INT_SECS`: Heartbeat interval (default: 30)
//! - `FIX_LOGON_TIMEOUT_SECS`: Logon/logout acknowledgment wait (default: 10)
//! - `FIX_DELIMITER`: Wire delimiter - "soh" | "pipe" (default: soh)
//! - `FIX_CL_ORD_ID_PREFIX`: Prefix for generated ClOrdIDs (default: ORD)
//! - `FIX_RECONNECT_DELAY_INITIAL_MS`: Initial backoff delay (default: 1000)
//! - `FIX_RECONNECT_DELAY_MAX_SECS`: Backoff cap (default: 60)
//! - `FIX_RECONNECT_DELAY_MULTIPLIER`: Backoff growth factor (default: 2.0)
//! - `FIX_MAX_RECONNECT_ATTEMPTS`: 0 = unlimited (default: 0)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: fix-engine)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use fix_engine::infrastructure::telemetry;
use fix_engine::{
    BrokerSimulator, ClOrdId, ClOrdIdGenerator, EngineConfig, FillScript, FixInitiator,
    InMemoryPersistence, InitiatorConfig, NewOrderRequest, OrderRegistry, OrderSide, Price,
    ProcessExecutionUseCase, Quantity, SessionEngine, SessionEvent, SessionHandle,
    SubmitOrderUseCase, Symbol, init_metrics,
};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Partial fill quantity used by the demo broker's fill script.
const DEMO_PARTIAL_QTY: i64 = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = telemetry::init()?;

    tracing::info!("Starting FIX engine");

    // Initialize Prometheus metrics
    let _metrics_handle = init_metrics();

    let config = EngineConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // Shared order state
    let registry = Arc::new(OrderRegistry::new());
    let journal = Arc::new(InMemoryPersistence::new());
    let generator = Arc::new(ClOrdIdGenerator::new(config.cl_ord_id_prefix.clone()));

    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(256);

    let (session, session_task) = if config.peer_addr.is_some() {
        start_initiator(&config, event_tx, &shutdown_token)?
    } else {
        start_demo(&config, event_tx, &shutdown_token)
    };

    tokio::select! {
        () = run_event_loop(event_rx, session, Arc::clone(&registry), Arc::clone(&journal), generator) => {
            tracing::info!("Session event stream ended");
        }
        () = await_shutdown() => {}
    }

    shutdown_token.cancel();
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, session_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "Session task panicked"),
        Err(_) => tracing::warn!("Session task did not stop within the shutdown timeout"),
    }

    tracing::info!("FIX engine stopped");
    Ok(())
}

/// Where the event loop finds the live session handle.
enum SessionSource {
    /// Demo mode: one engine created at startup.
    Direct(SessionHandle),
    /// TCP mode: handles come and go with reconnects.
    Initiator(Arc<FixInitiator>),
}

impl SessionSource {
    fn current(&self) -> Option<SessionHandle> {
        match self {
            Self::Direct(handle) => Some(handle.clone()),
            Self::Initiator(initiator) => initiator.session(),
        }
    }
}

/// Dial a real FIX counterparty over TCP.
fn start_initiator(
    config: &EngineConfig,
    event_tx: mpsc::Sender<SessionEvent>,
    shutdown_token: &CancellationToken,
) -> Result<(SessionSource, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = config.require_peer_addr()?.to_string();
    tracing::info!(peer = %addr, "Running against a TCP counterparty");

    let mut initiator_config = InitiatorConfig::new(addr);
    initiator_config.session = config.session.clone();
    initiator_config.reconnect = config.reconnect.clone();
    initiator_config.delimiter = config.delimiter.as_char();

    let initiator = Arc::new(FixInitiator::new(
        initiator_config,
        event_tx,
        shutdown_token.clone(),
    ));
    let runner = Arc::clone(&initiator);
    let task = tokio::spawn(async move {
        if let Err(e) = runner.run().await {
            tracing::error!(error = %e, "Initiator stopped");
        }
    });

    Ok((SessionSource::Initiator(initiator), task))
}

/// Run against the in-process broker simulator over a duplex pipe.
fn start_demo(
    config: &EngineConfig,
    event_tx: mpsc::Sender<SessionEvent>,
    shutdown_token: &CancellationToken,
) -> (SessionSource, JoinHandle<()>) {
    tracing::info!("No FIX_PEER_ADDR set, running the in-process broker demo");

    let (engine_side, broker_side) = tokio::io::duplex(8192);

    let simulator = BrokerSimulator::new(&config.session)
        .with_delimiter(config.delimiter.as_char())
        .with_fill_script(FillScript::partial_then_complete(Quantity::from_i64(
            DEMO_PARTIAL_QTY,
        )));
    tokio::spawn(async move {
        if let Err(e) = simulator.run(broker_side).await {
            tracing::error!(error = %e, "Broker simulator stopped");
        }
    });

    let (engine, handle) = SessionEngine::new(
        config.session.clone(),
        event_tx,
        shutdown_token.child_token(),
    );
    let engine = engine.with_delimiter(config.delimiter.as_char());
    let task = tokio::spawn(async move {
        if let Err(e) = engine.run(engine_side).await {
            tracing::error!(error = %e, "Session ended with error");
        }
    });

    (SessionSource::Direct(handle), task)
}

/// Consume session events: apply executions to the order book and run
/// the demo order script once the session is up.
async fn run_event_loop(
    mut events: mpsc::Receiver<SessionEvent>,
    session: SessionSource,
    registry: Arc<OrderRegistry>,
    journal: Arc<InMemoryPersistence>,
    generator: Arc<ClOrdIdGenerator>,
) {
    let process = ProcessExecutionUseCase::new(Arc::clone(&registry), Arc::clone(&journal));
    let mut demo_order: Option<ClOrdId> = None;

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::LogonAccepted => {
                tracing::info!("Session active");
                if demo_order.is_none()
                    && let Some(handle) = session.current()
                {
                    demo_order = submit_demo_order(handle, &registry, &journal, &generator).await;
                }
            }
            SessionEvent::ExecutionReport(execution) => {
                process.handle_execution(&execution).await;

                // Once the demo order goes terminal, show the book and log out.
                if let Some(cl_ord_id) = demo_order.as_ref()
                    && execution.cl_ord_id == *cl_ord_id
                    && registry
                        .snapshot(cl_ord_id)
                        .is_some_and(|s| s.status.is_terminal())
                {
                    print_blotter(&registry);
                    if let Some(handle) = session.current()
                        && let Err(e) = handle.initiate_logout().await
                    {
                        tracing::warn!(error = %e, "Logout failed");
                    }
                    demo_order = None;
                }
            }
            SessionEvent::CancelReject(reject) => {
                process.handle_cancel_reject(&reject).await;
            }
            SessionEvent::SequenceGapDetected { expected, received } => {
                tracing::warn!(expected, received, "Sequence gap detected");
            }
            SessionEvent::Terminated { reason } => {
                tracing::error!(reason = %reason, "Session terminated");
            }
            other => {
                tracing::debug!(event = other.event_type(), "Session event");
            }
        }
    }
}

/// Submit the demo order: buy 10 AAPL at 202.00.
async fn submit_demo_order(
    session: SessionHandle,
    registry: &Arc<OrderRegistry>,
    journal: &Arc<InMemoryPersistence>,
    generator: &Arc<ClOrdIdGenerator>,
) -> Option<ClOrdId> {
    let use_case = SubmitOrderUseCase::new(
        Arc::clone(registry),
        Arc::clone(journal),
        Arc::clone(generator),
        session,
    );
    let request = NewOrderRequest {
        cl_ord_id: None,
        symbol: Symbol::new("AAPL"),
        side: OrderSide::Buy,
        quantity: Quantity::from_i64(10),
        price: Price::from_f64(202.00),
    };

    match use_case.execute(request).await {
        Ok(receipt) => {
            tracing::info!(cl_ord_id = %receipt.cl_ord_id, "Demo order submitted");
            Some(receipt.cl_ord_id)
        }
        Err(e) => {
            tracing::error!(error = %e, "Demo order submission failed");
            None
        }
    }
}

/// Print the order blotter to stdout.
fn print_blotter(registry: &OrderRegistry) {
    println!();
    println!(
        "{:<10} {:<8} {:<5} {:>6} {:>10} {:>6} {:>10} {:<17} {:>12}",
        "CLORDID", "SYMBOL", "SIDE", "QTY", "PRICE", "CUM", "AVGPX", "STATUS", "NOTIONAL"
    );
    for row in registry.blotter() {
        println!(
            "{:<10} {:<8} {:<5} {:>6} {:>10} {:>6} {:>10} {:<17} {:>12}",
            row.cl_ord_id.to_string(),
            row.symbol.to_string(),
            row.side.to_string(),
            row.quantity.to_string(),
            row.price.to_string(),
            row.cum_qty.to_string(),
            row.avg_px.to_string(),
            row.status.to_string(),
            row.notional().to_string(),
        );
    }
    println!();
}

/// Emit the effective configuration at startup.
fn log_config(config: &EngineConfig) {
    tracing::info!(
        begin_string = %config.session.begin_string,
        sender_comp_id = %config.session.sender_comp_id,
        target_comp_id = %config.session.target_comp_id,
        heart_bt_int_secs = config.session.heart_bt_int.as_secs(),
        delimiter = config.delimiter.as_str(),
        mode = if config.peer_addr.is_some() { "tcp" } else { "demo" },
        "Configuration loaded"
    );
}

/// Load a `.env` file, checking the working directory first and then
/// walking up toward the filesystem root.
fn load_dotenv() {
    // dotenvy::dotenv only looks in the current directory; a workspace
    // root .env two levels up still has to win over nothing at all.
    if dotenvy::dotenv().is_ok() {
        return;
    }
    let Ok(cwd) = std::env::current_dir() else {
        return;
    };
    for dir in cwd.ancestors().skip(1) {
        let candidate = dir.join(".env");
        if candidate.exists() {
            let _ = dotenvy::from_path(&candidate);
            return;
        }
    }
}

/// Block until SIGINT or, on Unix, SIGTERM.
#[allow(clippy::expect_used)]
async fn await_shutdown() {
    #[cfg(unix)]
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .expect("installing a SIGTERM handler");
    #[cfg(unix)]
    let terminate = sigterm.recv();

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = signal::ctrl_c() => {
            result.expect("installing a Ctrl+C handler");
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
