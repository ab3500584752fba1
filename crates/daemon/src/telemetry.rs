//! OpenTelemetry integration
//!
//! Export is enabled by `telemetry.otlp_endpoint` and requires the `telemetry`
//! feature. Without the feature a configured endpoint only produces a warning.
//!
//! ```text
//! RECRUIT__TELEMETRY__OTLP_ENDPOINT=http://localhost:4317 \
//!     cargo run -p recruit-daemon --features telemetry
//! ```

use crate::config::TelemetryConfig;
use anyhow::Result;

#[cfg(feature = "telemetry")]
pub type Tracer = opentelemetry_sdk::trace::Tracer;

#[cfg(not(feature = "telemetry"))]
pub type Tracer = ();

/// Build the OTLP tracer, if configured
///
/// Runs before the subscriber is installed, so problems are returned and
/// reported by the caller once logging is up.
pub fn init_tracer(config: &TelemetryConfig) -> Result<Option<Tracer>> {
    let Some(endpoint) = config.otlp_endpoint.as_deref() else {
        return Ok(None);
    };

    #[cfg(feature = "telemetry")]
    {
        init_tracer_impl(endpoint, &config.service_name).map(Some)
    }

    #[cfg(not(feature = "telemetry"))]
    {
        anyhow::bail!(
            "OTLP endpoint {} configured but feature 'telemetry' not enabled (rebuild with --features telemetry)",
            endpoint
        )
    }
}

#[cfg(feature = "telemetry")]
fn init_tracer_impl(endpoint: &str, service_name: &str) -> Result<Tracer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};
    use opentelemetry_sdk::{runtime, trace::TracerProvider, Resource};

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.to_string(),
        )]))
        .build();

    let tracer = provider.tracer(service_name.to_string());
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracer)
}

/// Flush pending spans
pub fn shutdown() {
    #[cfg(feature = "telemetry")]
    opentelemetry::global::shutdown_tracer_provider();
}
