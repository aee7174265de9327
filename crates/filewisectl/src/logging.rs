//! Logging setup
//!
//! Everything goes to stderr so stdout carries only answers and JSON.
//! `RUST_LOG` wins over `-v`, which wins over `[log] level`.

use tracing_subscriber::EnvFilter;

/// Filter directive for a verbosity count and the configured level
pub fn directive(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.trim().to_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber; later calls are no-ops
pub fn init(verbose: u8, configured: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(value) if !value.trim().is_empty() => EnvFilter::new(value),
        _ => EnvFilter::try_new(directive(verbose, configured))
            .unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
