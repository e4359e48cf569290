// Tests may unwrap/expect freely; a panic is the right test failure mode.
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! FIX Engine - Session & Order Management Core
//!
//! Maintains a FIX session with a counterparty and manages the full order
//! lifecycle: validation, submission, execution-report processing, cancels,
//! and an append-only event journal.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Business logic with zero infrastructure dependencies
//!   - `order`: Order aggregate, lifecycle state machine, registry, events
//!   - `session`: Session states, sequence tracking, gap buffering
//!   - `shared`: Value objects (identifiers, quantity, price, timestamps)
//!
//! - **Application**: Orchestration between domain and ports
//!   - `ports`: Journal interface for order events
//!   - `services`: ClOrdID generation
//!   - `use_cases`: Submit, cancel, process executions
//!
//! - **Infrastructure**: Everything that touches the outside world
//!   - `fix`: Tag=value codec and frame extraction
//!   - `session`: Session engine, heartbeat monitor, TCP initiator
//!   - `persistence`: In-memory event journal with blotter projection
//!   - `simulator`: Scripted broker counterparty
//!   - `config`, `metrics`, `telemetry`: Ambient concerns
//!
//! # Data Flow
//!
//! ```text
//! NewOrderRequest ──► SubmitOrderUseCase ──► SessionHandle ──┐
//!                          │                                 ▼
//!                     OrderRegistry                    SessionEngine ◄──► FIX peer
//!                          ▲                                 │
//!                          │                                 ▼
//!               ProcessExecutionUseCase ◄──────────── SessionEvent stream
//!                          │
//!                          ▼
//!                 Journal (PersistencePort)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Order and session logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases orchestrating domain objects through ports.
pub mod application;

/// Infrastructure layer - Wire codec, session runtime, adapters.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::order::{
    CancelReject, Execution, NewOrderCommand, Order, OrderError, OrderEvent, OrderRegistry,
    OrderSide, OrderSnapshot, OrderStatus,
};
pub use domain::session::{SessionConfig, SessionError, SessionEvent, SessionState};
pub use domain::shared::{ClOrdId, ExecId, Price, Quantity, Symbol, Timestamp};

// Application surface
pub use application::dto::{NewOrderRequest, SubmitReceipt};
pub use application::ports::{NoOpPersistence, PersistenceError, PersistencePort};
pub use application::services::ClOrdIdGenerator;
pub use application::use_cases::{
    CancelError, CancelOrderUseCase, ProcessExecutionUseCase, SubmitError, SubmitOrderUseCase,
};

// Wire format (for integration tests)
pub use infrastructure::fix::{
    CodecError, DecodedMessage, FixCodec, FixFrameCodec, FixMessage, MsgType, PIPE, SOH, Tag,
};

// Session runtime
pub use infrastructure::session::{
    FixInitiator, InitiatorConfig, InitiatorError, ReconnectConfig, SessionEngine, SessionHandle,
    SessionUnavailable,
};

// Journal and simulator (for the demo and integration tests)
pub use infrastructure::persistence::InMemoryPersistence;
pub use infrastructure::simulator::{BrokerSimulator, Faults, FillScript, FillStep};

// Configuration
pub use infrastructure::config::{ConfigError, EngineConfig, WireDelimiter};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{
    TelemetryConfig, TelemetryError, TelemetryGuard, init as init_telemetry,
};
