use kaspa_lens_config::TelemetrySetting;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{self, RandomIdGenerator},
    Resource,
};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const DEFAULT_CONSOLE_FILTER: &str = "info,kaspa_lens_api=debug,kaspa_lens_wallet=debug,\
kaspa_lens_market=debug,kaspa_lens_client=debug,tower_http=debug";

pub fn init_tracing_subscriber(
    server_name: &str,
    telemetry: &TelemetrySetting,
) -> anyhow::Result<OtelGuard> {
    // RUST_LOG 优先
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
    let console = fmt::Layer::new()
        .with_span_events(FmtSpan::CLOSE)
        .pretty()
        .with_filter(console_filter);

    // file appender layer for tracing-subscriber
    let file_appender =
        tracing_appender::rolling::daily(&telemetry.log_dir, format!("{}.log", server_name));
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
    let file = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    // opentelemetry tracing layer, only when an endpoint is configured
    let opentelemetry = match &telemetry.otlp_endpoint {
        Some(endpoint) => {
            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(
                    opentelemetry_otlp::new_exporter()
                        .tonic()
                        .with_endpoint(endpoint),
                )
                .with_trace_config(
                    trace::config()
                        .with_id_generator(RandomIdGenerator::default())
                        .with_max_events_per_span(32)
                        .with_max_attributes_per_span(64)
                        .with_resource(Resource::new(vec![KeyValue::new(
                            "service.name",
                            server_name.to_string(),
                        )])),
                )
                .install_batch(runtime::Tokio)?;

            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(opentelemetry)
        .init();

    Ok(OtelGuard {
        _file_guard: file_guard,
        otlp: telemetry.otlp_endpoint.is_some(),
    })
}

// 持有期间日志文件持续写入，drop 时刷新并关闭 tracer
pub struct OtelGuard {
    _file_guard: WorkerGuard,
    otlp: bool,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if self.otlp {
            global::shutdown_tracer_provider();
        }
    }
}
