//! Infrastructure Layer
//!
//! The outward-facing half of the engine: the FIX wire codec, the
//! session runtime that speaks it, and concrete implementations of the
//! application-layer ports.

/// FIX wire format: tags, messages, codec, framing.
pub mod fix;

/// Session runtime: engine, heartbeats, initiator, reconnect policy.
pub mod session;

/// Order event journal implementations.
pub mod persistence;

/// Scripted broker counterparty for demos and tests.
pub mod simulator;

/// Configuration loading.
pub mod config;

/// Prometheus metrics helpers.
pub mod metrics;

/// OpenTelemetry wiring for traces and spans.
pub mod telemetry;
