use crate::config::Config;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

const DEFAULT_LOG_FILTER: &str = "eduresolve=debug,tower_http=debug";

/// Counters emitted by the complaint pipeline, with their help text.
pub const PIPELINE_COUNTERS: [(&str, &str); 5] = [
    (
        "complaints_submitted_total",
        "Complaints accepted at intake",
    ),
    (
        "ai_analysis_total",
        "Classifier calls by outcome (success, upstream_unavailable, malformed, invalid_input)",
    ),
    (
        "ai_lazy_analysis_total",
        "Analyze-on-read attempts by outcome (merged, failed, skipped)",
    ),
    (
        "conversation_replies_total",
        "Messages appended to conversations by sender (student, support)",
    ),
    (
        "listing_corrupt_documents_total",
        "Stored conversations skipped in listings because they failed to decode",
    ),
];

/// Flushes pending spans when dropped; hold it for the life of the process.
pub struct ObservabilityGuard;

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        shutdown();
    }
}

pub fn init(config: &Config) -> Result<ObservabilityGuard, Box<dyn std::error::Error>> {
    init_tracing(config)?;
    init_metrics(config)?;
    Ok(ObservabilityGuard)
}

fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Runtime workers are named after the service, so every line carries it
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_names(true);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let Some(endpoint) = &config.otel_exporter_endpoint else {
        Registry::default().with(env_filter).with(fmt_layer).init();
        tracing::info!(service = %config.service_name, "Tracing initialized");
        return Ok(());
    };

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", config.service_name.clone()),
        ])))
        .install_batch(runtime::Tokio)?;

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .init();

    tracing::info!(
        service = %config.service_name,
        endpoint = %endpoint,
        "Tracing initialized with OTLP export"
    );
    Ok(())
}

/// Attach help text to every pipeline counter on the installed recorder.
pub fn describe_pipeline_metrics() {
    for (name, help) in PIPELINE_COUNTERS {
        metrics::describe_counter!(name, help);
    }
}

fn init_metrics(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()?;

    describe_pipeline_metrics();

    tracing::info!(
        service = %config.service_name,
        port = config.metrics_port,
        counters = PIPELINE_COUNTERS.len(),
        "Prometheus exporter started"
    );
    Ok(())
}

pub fn shutdown() {
    global::shutdown_tracer_provider();
}
