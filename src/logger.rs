//! Logging setup for the `twilio-sms` binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize a stderr tracing subscriber with the given default level.
///
/// `RUST_LOG` overrides the default when set.
pub fn setup_logger(default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn default_filter(default_log_level: &str) -> String {
    format!(
        "{}={}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        default_log_level
    )
}
