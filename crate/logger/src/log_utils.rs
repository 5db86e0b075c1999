use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_INIT: Once = Once::new();

/// Filter used when neither `RUST_LOG` nor an explicit default is provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Initialize the global tracing subscriber.
///
/// The filter is read from `RUST_LOG`; when the variable is not set,
/// `default_value` (or [`DEFAULT_LOG_LEVEL`]) is used instead.
/// Calling this function more than once is a no-op.
pub fn log_init(default_value: Option<&str>) {
    LOG_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(default_value.unwrap_or(DEFAULT_LOG_LEVEL))
        });
        tracing_setup(filter);
    });
}

fn tracing_setup(filter: EnvFilter) {
    // logs go to stderr: stdout is reserved for the command output
    let format = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .compact();

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()
    {
        eprintln!("failed initializing the logger: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::log_init;

    #[test]
    fn log_init_is_idempotent() {
        log_init(Some("debug"));
        log_init(None);
        tracing::debug!("logger initialized twice without panicking");
    }
}
