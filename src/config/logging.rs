use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

/// Initializes the tracing subscriber for the service.
///
/// The filter comes from `RUST_LOG` (for example `RUST_LOG=report_me=debug`). When it is
/// unset or invalid the service logs at `info` and keeps `diesel` at `warn` so pooled
/// query chatter does not drown out the request and dispatch logs.
///
/// Call once, at the start of `main`. A second call returns without replacing the
/// subscriber that is already installed.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter
        ::try_from_default_env()
        .unwrap_or_else(|_| "info,diesel=warn".into());

    let _ = tracing_subscriber
        ::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
