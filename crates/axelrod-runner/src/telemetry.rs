//! Tracing and OpenTelemetry setup for the runner.

use anyhow::Result;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_sdk::{
    export::trace::SpanExporter,
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE: &str = "axelrod-runner";

pub fn init_telemetry(otel_enabled: bool) -> Result<()> {
    let tracer_provider =
        build_tracer_provider(otel_enabled, opentelemetry_stdout::SpanExporter::default());

    global::set_tracer_provider(tracer_provider.clone());

    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer(SERVICE));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,axelrod_runner=debug,axelrod_world=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(telemetry_layer)
        .try_init()?;

    info!(otel_enabled, "Telemetry initialized");
    Ok(())
}

/// Tracer provider that hands every sampled span to `exporter`. Nothing is
/// sampled unless `otel_enabled` is set.
fn build_tracer_provider<E>(otel_enabled: bool, exporter: E) -> TracerProvider
where
    E: SpanExporter + 'static,
{
    let sampler = if otel_enabled {
        Sampler::AlwaysOn
    } else {
        Sampler::AlwaysOff
    };

    TracerProvider::builder()
        .with_simple_exporter(exporter)
        .with_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(sampler)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![
                    KeyValue::new(
                        SERVICE_NAME,
                        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| SERVICE.to_string()),
                    ),
                    KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
                ])),
        )
        .build()
}

pub fn shutdown_telemetry() {
    info!("Shutting down telemetry");
    global::shutdown_tracer_provider();
}
