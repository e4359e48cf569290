//! OpenTelemetry tracing for the FIX engine.
//!
//! Installs a console `tracing` subscriber and, unless disabled, an OTLP
//! span exporter, so session and order lifecycle activity can be shipped
//! to any OTLP-compatible backend.
//!
//! # Environment Variables
//!
//! - `OTEL_ENABLED`: "false" keeps console logging but skips span export
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: service.name resource attribute (default: fix-engine)
//! - `RUST_LOG`: filter directives for the console layer
//!
//! # Usage
//!
//! ```ignore
//! // Hold the guard until shutdown; dropping it flushes pending spans.
//! let _guard = fix_engine::init_telemetry()?;
//! ```

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use thiserror::Error;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default service.name resource attribute.
const DEFAULT_SERVICE_NAME: &str = "fix-engine";

/// Default OTLP gRPC collector endpoint.
const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

/// Filter applied when `RUST_LOG` is unset: engine logs at info, noisy
/// transport crates at warn.
const DEFAULT_FILTER: &str = "info,h2=warn,hyper=warn";

/// Errors from telemetry initialization.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The OTLP span exporter could not be built.
    #[error("failed to build OTLP span exporter: {0}")]
    Exporter(String),
}

/// Telemetry settings, read from `OTEL_*` environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Export spans over OTLP. The console layer is always installed.
    pub enabled: bool,
    /// OTLP gRPC collector endpoint.
    pub otlp_endpoint: String,
    /// service.name resource attribute.
    pub service_name: String,
    /// service.version resource attribute.
    pub service_version: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Read settings from the environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("OTEL_ENABLED")
                .map(|v| !v.eq_ignore_ascii_case("false"))
                .unwrap_or(defaults.enabled),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or(defaults.otlp_endpoint),
            service_name: std::env::var("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            service_version: defaults.service_version,
        }
    }

    /// Disable span export, keeping console logging only.
    #[must_use]
    pub const fn without_export(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Keeps the tracer provider alive. Dropping the guard shuts the provider
/// down and flushes pending spans.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Failed to shut down tracer provider: {e}");
        }
    }
}

/// Initialize telemetry from environment variables.
///
/// # Errors
///
/// Returns [`TelemetryError::Exporter`] if span export is enabled and the
/// OTLP exporter cannot be built.
pub fn init() -> Result<TelemetryGuard, TelemetryError> {
    init_with_config(TelemetryConfig::from_env())
}

/// Initialize telemetry with explicit settings.
///
/// # Errors
///
/// Returns [`TelemetryError::Exporter`] if span export is enabled and the
/// OTLP exporter cannot be built.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_with_config(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let console = tracing_subscriber::fmt::layer().with_target(true);

    if !config.enabled {
        tracing_subscriber::registry().with(filter).with(console).init();
        return Ok(TelemetryGuard { provider: None });
    }

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", config.service_name.clone()),
            KeyValue::new("service.version", config.service_version),
        ])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build();

    let tracer = provider.tracer(config.service_name.clone());
    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(OpenTelemetryLayer::new(tracer))
        .init();

    tracing::info!(
        endpoint = %config.otlp_endpoint,
        service = %config.service_name,
        "OpenTelemetry span export enabled"
    );

    Ok(TelemetryGuard {
        provider: Some(provider),
    })
}

// =============================================================================
// Tests
// =============================================================================
