//! `tracing` subscriber setup for the binary.
//!
//! Every span and event emitted by the workspace crates flows through the
//! subscriber installed here: an `EnvFilter` (`RUST_LOG`, default `info`), a
//! human or JSON formatter writing to stderr, and an optional OTLP exporter.

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Selects the JSON formatter when set to `json`.
pub const LOG_FORMAT_VAR: &str = "TEXTLENS_LOG_FORMAT";
/// Enables OTLP export to the given collector endpoint.
pub const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

const SERVICE_NAME: &str = "textlens";

/// Output format of the stderr log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines without targets. The default.
    Pretty,
    /// One JSON object per event, including the current span and target.
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Keeps the OTLP pipeline alive; call [`Telemetry::shutdown`] before exit
/// so buffered spans are flushed.
pub struct Telemetry {
    provider: Option<TracerProvider>,
}

impl Telemetry {
    /// Flushes and stops the OTLP exporter, if one was started.
    ///
    /// A failed flush is logged and otherwise ignored.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Failed to flush OpenTelemetry spans");
            }
        }
    }
}

fn otlp_provider(endpoint: &str) -> Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("failed to build OTLP span exporter")?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            SERVICE_NAME,
        )]))
        .build())
}

/// Installs the global subscriber. Must run inside the Tokio runtime.
pub fn init() -> Result<Telemetry> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = LogFormat::parse(std::env::var(LOG_FORMAT_VAR).ok().as_deref());

    let provider = match std::env::var(OTLP_ENDPOINT_VAR) {
        Ok(endpoint) if !endpoint.trim().is_empty() => Some(otlp_provider(endpoint.trim())?),
        _ => None,
    };
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(SERVICE_NAME)));

    let json_layer = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr)
    });
    let pretty_layer = (format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(otel_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::debug!(
        format = ?format,
        otlp = provider.is_some(),
        "Logging initialized"
    );

    Ok(Telemetry { provider })
}
