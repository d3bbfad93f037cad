use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name onto a tracing filter directive.
///
/// Unknown names are passed through so `EnvFilter` syntax such as
/// `"sniffer_data=debug"` also works.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Logs go to stderr, or are appended to `log_file` when one is given so
/// they do not draw over the plot. Falls back to `"info"` if the level
/// string is not a valid filter.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
