use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Composes the tracing subscriber: an env filter, the JSON storage layer
/// and a bunyan formatter writing to stdout.
///
/// The storage layer copies the fields of every open span onto each event it
/// records. That is what carries the trace and span ids into every log line
/// emitted while a request is being processed.
pub fn get_subscriber(name: String, default_env_filter: String) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, std::io::stdout);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Registers the subscriber as the global default and redirects `log`
/// records into it. Should only be called once.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set the log tracer");
    set_global_default(subscriber).expect("Failed to set the tracing subscriber");
}
