//! End-to-end order lifecycle tests.
//!
//! Each test connects a real `SessionEngine` to the scripted
//! `BrokerSimulator` over an in-process duplex pipe, then drives orders
//! through the application use cases and asserts on session events, the
//! order registry, and the journal.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

use fix_engine::{
    BrokerSimulator, CancelError, CancelOrderUseCase, ClOrdIdGenerator, Execution, Faults,
    FillScript, InMemoryPersistence, NewOrderRequest, OrderError, OrderRegistry, OrderSide,
    OrderStatus, PersistencePort, Price, ProcessExecutionUseCase, Quantity, SessionConfig,
    SessionEngine, SessionEvent, SessionHandle, SubmitOrderUseCase, Symbol,
};

// =============================================================================
// Test Harness
// =============================================================================

/// Wire an engine to a simulator over a duplex pipe and wait for the
/// session to become active.
async fn start_stack(
    script: FillScript,
    faults: Faults,
) -> (
    SessionHandle,
    mpsc::Receiver<SessionEvent>,
    CancellationToken,
) {
    let config = SessionConfig::default();
    let (engine_side, broker_side) = tokio::io::duplex(8192);

    let simulator = BrokerSimulator::new(&config)
        .with_fill_script(script)
        .with_faults(faults);
    tokio::spawn(simulator.run(broker_side));

    let cancel = CancellationToken::new();
    let (event_tx, mut events) = mpsc::channel(256);
    let (engine, handle) = SessionEngine::new(config, event_tx, cancel.clone());
    tokio::spawn(engine.run(engine_side));

    loop {
        if matches!(next_event(&mut events).await, SessionEvent::LogonAccepted) {
            break;
        }
    }

    (handle, events, cancel)
}

fn desk() -> (
    Arc<OrderRegistry>,
    Arc<InMemoryPersistence>,
    Arc<ClOrdIdGenerator>,
) {
    (
        Arc::new(OrderRegistry::new()),
        Arc::new(InMemoryPersistence::new()),
        Arc::new(ClOrdIdGenerator::default()),
    )
}

fn make_order(symbol: &str, side: OrderSide, qty: i64, px: f64) -> NewOrderRequest {
    NewOrderRequest {
        cl_ord_id: None,
        symbol: Symbol::new(symbol),
        side,
        quantity: Quantity::from_i64(qty),
        price: Price::from_f64(px),
    }
}

async fn next_event(events: &mut mpsc::Receiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for session event")
        .expect("event channel closed")
}

/// Skip session chatter until the next ExecutionReport.
async fn next_execution(events: &mut mpsc::Receiver<SessionEvent>) -> Execution {
    loop {
        if let SessionEvent::ExecutionReport(execution) = next_event(events).await {
            return execution;
        }
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn e2e_order_lifecycle_to_full_fill() {
    let (session, mut events, cancel) = start_stack(
        FillScript::partial_then_complete(Quantity::from_i64(4)),
        Faults::default(),
    )
    .await;
    let (registry, journal, generator) = desk();
    let submit = SubmitOrderUseCase::new(
        registry.clone(),
        journal.clone(),
        generator,
        session.clone(),
    );
    let process = ProcessExecutionUseCase::new(registry.clone(), journal.clone());

    let receipt = assert_ok!(
        submit
            .execute(make_order("AAPL", OrderSide::Buy, 10, 202.00))
            .await
    );
    assert_eq!(receipt.cl_ord_id.as_str(), "ORD001");
    assert_eq!(receipt.status, OrderStatus::New);

    let ack = next_execution(&mut events).await;
    assert_eq!(ack.ord_status, OrderStatus::Acknowledged);
    process.handle_execution(&ack).await;
    let snapshot = registry.snapshot(&receipt.cl_ord_id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Acknowledged);

    let partial = next_execution(&mut events).await;
    assert_eq!(partial.ord_status, OrderStatus::PartiallyFilled);
    assert_eq!(partial.last_qty, Some(Quantity::from_i64(4)));
    process.handle_execution(&partial).await;
    let snapshot = registry.snapshot(&receipt.cl_ord_id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::PartiallyFilled);
    assert_eq!(snapshot.cum_qty, Quantity::from_i64(4));
    assert_eq!(snapshot.leaves_qty, Quantity::from_i64(6));
    assert_eq!(snapshot.avg_px, Price::from_f64(202.00));

    let complete = next_execution(&mut events).await;
    assert_eq!(complete.ord_status, OrderStatus::Filled);
    process.handle_execution(&complete).await;
    let snapshot = registry.snapshot(&receipt.cl_ord_id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Filled);
    assert_eq!(snapshot.cum_qty, Quantity::from_i64(10));
    assert_eq!(snapshot.leaves_qty, Quantity::ZERO);
    assert_eq!(snapshot.notional(), Decimal::from(2020));

    let kinds: Vec<&str> = journal.events().iter().map(|e| e.event_type()).collect();
    assert_eq!(
        kinds,
        vec![
            "ORDER_SUBMITTED",
            "ORDER_ACKNOWLEDGED",
            "ORDER_PARTIALLY_FILLED",
            "ORDER_FILLED",
        ]
    );

    cancel.cancel();
}

#[tokio::test]
async fn e2e_cancel_working_order() {
    let (session, mut events, cancel) =
        start_stack(FillScript::acknowledge_only(), Faults::default()).await;
    let (registry, journal, generator) = desk();
    let submit = SubmitOrderUseCase::new(
        registry.clone(),
        journal.clone(),
        generator,
        session.clone(),
    );
    let process = ProcessExecutionUseCase::new(registry.clone(), journal.clone());
    let cancel_order = CancelOrderUseCase::new(registry.clone(), session.clone());

    let receipt = assert_ok!(
        submit
            .execute(make_order("AAPL", OrderSide::Buy, 10, 202.00))
            .await
    );
    let ack = next_execution(&mut events).await;
    process.handle_execution(&ack).await;

    assert_ok!(cancel_order.execute(&receipt.cl_ord_id).await);

    let confirmation = next_execution(&mut events).await;
    assert_eq!(confirmation.ord_status, OrderStatus::Canceled);
    assert_eq!(confirmation.text.as_deref(), Some("Canceled by request"));
    process.handle_execution(&confirmation).await;

    let snapshot = registry.snapshot(&receipt.cl_ord_id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Canceled);
    assert_eq!(snapshot.cum_qty, Quantity::ZERO);
    assert_eq!(registry.active_count(), 0);
    assert_eq!(
        journal.events().last().unwrap().event_type(),
        "ORDER_CANCELED"
    );

    cancel.cancel();
}

#[tokio::test]
async fn e2e_cancel_after_fill_is_rejected_by_broker() {
    let (session, mut events, cancel) =
        start_stack(FillScript::fill_immediately(), Faults::default()).await;
    let (registry, journal, generator) = desk();
    let submit = SubmitOrderUseCase::new(
        registry.clone(),
        journal.clone(),
        generator,
        session.clone(),
    );
    let process = ProcessExecutionUseCase::new(registry.clone(), journal.clone());
    let cancel_order = CancelOrderUseCase::new(registry.clone(), session.clone());

    let receipt = assert_ok!(
        submit
            .execute(make_order("AAPL", OrderSide::Buy, 10, 202.00))
            .await
    );
    let ack = next_execution(&mut events).await;
    process.handle_execution(&ack).await;
    // Hold the fill back so the books disagree: we still see a working
    // order while the broker already filled it.
    let fill = next_execution(&mut events).await;
    assert_eq!(fill.ord_status, OrderStatus::Filled);

    assert_ok!(cancel_order.execute(&receipt.cl_ord_id).await);

    let reject = loop {
        if let SessionEvent::CancelReject(reject) = next_event(&mut events).await {
            break reject;
        }
    };
    assert_eq!(reject.cl_ord_id, receipt.cl_ord_id);
    assert_eq!(reject.reason, "Order already terminal");
    process.handle_cancel_reject(&reject).await;

    // The reject leaves the order exactly where it was.
    let snapshot = registry.snapshot(&receipt.cl_ord_id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Acknowledged);

    // Applying the held-back fill resolves the divergence.
    process.handle_execution(&fill).await;
    let snapshot = registry.snapshot(&receipt.cl_ord_id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Filled);

    let kinds: Vec<&str> = journal.events().iter().map(|e| e.event_type()).collect();
    assert_eq!(
        kinds,
        vec![
            "ORDER_SUBMITTED",
            "ORDER_ACKNOWLEDGED",
            "ORDER_CANCEL_REJECTED",
            "ORDER_FILLED",
        ]
    );

    cancel.cancel();
}

// =============================================================================
// Validation and journaling
// =============================================================================

#[tokio::test]
async fn e2e_validation_failure_never_reaches_the_wire() {
    let (session, mut events, cancel) =
        start_stack(FillScript::acknowledge_only(), Faults::default()).await;
    let (registry, journal, generator) = desk();
    let submit = SubmitOrderUseCase::new(
        registry.clone(),
        journal.clone(),
        generator,
        session.clone(),
    );
    let process = ProcessExecutionUseCase::new(registry.clone(), journal.clone());

    let bad = NewOrderRequest {
        quantity: Quantity::ZERO,
        ..make_order("AAPL", OrderSide::Buy, 10, 202.00)
    };
    let receipt = assert_ok!(submit.execute(bad).await);
    assert_eq!(receipt.status, OrderStatus::Rejected);
    let snapshot = registry.snapshot(&receipt.cl_ord_id).unwrap();
    assert_eq!(snapshot.status, OrderStatus::Rejected);

    // The session is untouched: the next valid order trades normally, and
    // the first report the broker ever sends is for that order.
    let good = assert_ok!(
        submit
            .execute(make_order("MSFT", OrderSide::Sell, 5, 430.10))
            .await
    );
    assert_eq!(good.cl_ord_id.as_str(), "ORD002");
    let ack = next_execution(&mut events).await;
    assert_eq!(ack.cl_ord_id, good.cl_ord_id);
    assert_eq!(ack.ord_status, OrderStatus::Acknowledged);
    process.handle_execution(&ack).await;

    let rows = journal.query_all().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].cl_ord_id, good.cl_ord_id);
    assert_eq!(rows[1].status, OrderStatus::Rejected);

    cancel.cancel();
}

#[tokio::test]
async fn e2e_journal_projection_matches_registry() {
    let (session, mut events, cancel) =
        start_stack(FillScript::fill_immediately(), Faults::default()).await;
    let (registry, journal, generator) = desk();
    let submit = SubmitOrderUseCase::new(
        registry.clone(),
        journal.clone(),
        generator,
        session.clone(),
    );
    let process = ProcessExecutionUseCase::new(registry.clone(), journal.clone());

    let first = assert_ok!(
        submit
            .execute(make_order("AAPL", OrderSide::Buy, 10, 202.00))
            .await
    );
    for _ in 0..2 {
        let execution = next_execution(&mut events).await;
        process.handle_execution(&execution).await;
    }

    let second = assert_ok!(
        submit
            .execute(make_order("MSFT", OrderSide::Sell, 5, 430.10))
            .await
    );
    for _ in 0..2 {
        let execution = next_execution(&mut events).await;
        process.handle_execution(&execution).await;
    }

    // Replaying the journal lands on the same blotter the registry holds.
    let blotter = registry.blotter();
    let rows = journal.query_all().await.unwrap();
    assert_eq!(blotter.len(), 2);
    assert_eq!(rows.len(), 2);
    for (live, replayed) in blotter.iter().zip(rows.iter()) {
        assert_eq!(live.cl_ord_id, replayed.cl_ord_id);
        assert_eq!(live.status, replayed.status);
        assert_eq!(live.cum_qty, replayed.cum_qty);
        assert_eq!(live.leaves_qty, replayed.leaves_qty);
        assert_eq!(live.avg_px, replayed.avg_px);
    }

    assert_eq!(blotter[0].cl_ord_id, second.cl_ord_id);
    assert_eq!(blotter[0].status, OrderStatus::Filled);
    assert_eq!(blotter[0].notional(), Decimal::new(21505, 1));
    assert_eq!(blotter[1].notional(), Decimal::from(2020));

    // Both orders are terminal now, so a cancel has nothing to act on.
    let cancel_order = CancelOrderUseCase::new(registry.clone(), session.clone());
    let err = assert_err!(cancel_order.execute(&first.cl_ord_id).await);
    assert!(matches!(
        err,
        CancelError::Order(OrderError::CannotCancel {
            status: OrderStatus::Filled
        })
    ));

    cancel.cancel();
}
