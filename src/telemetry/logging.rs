//! Logging configuration and initialization
//!
//! Console output in compact or JSON form, optionally mirrored to a file
//! through a non-blocking writer.

use std::path::PathBuf;

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

pub use tracing_appender::non_blocking::WorkerGuard as LogGuard;

/// Env var holding the log filter; `RUST_LOG` is used when unset
pub const LOG_FILTER_ENV: &str = "GESTURE_LOG";
/// Env var selecting the console format (`json` or anything else)
pub const LOG_FORMAT_ENV: &str = "GESTURE_LOG_FORMAT";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Enable console output (default: true)
    pub console_enabled: bool,
    /// Also write logs to `file_path` (default: None)
    pub file_path: Option<PathBuf>,
    /// Use JSON format on the console (default: false)
    pub json_format: bool,
    /// Filter used when no env var is set (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_path: None,
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Console format after applying `GESTURE_LOG_FORMAT`
    pub fn use_json(&self) -> bool {
        json_from_env(std::env::var(LOG_FORMAT_ENV).ok().as_deref(), self.json_format)
    }
}

fn json_from_env(value: Option<&str>, fallback: bool) -> bool {
    value.map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(fallback)
}

/// Initialize the global subscriber.
///
/// Returns a guard when file logging is enabled; keep it alive until exit so
/// buffered lines are flushed.
pub fn init_logging(config: &LogConfig) -> Result<Option<LogGuard>, Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));
    let use_json = config.use_json();

    let (file_layer, guard) = match &config.file_path {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let (json_layer, compact_layer) = match (config.console_enabled, use_json) {
        (false, _) => (None, None),
        (true, true) => (
            Some(fmt::layer().json().with_target(true).with_file(true).with_line_number(true)),
            None,
        ),
        (true, false) => (None, Some(fmt::layer().with_target(true).compact())),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(json_layer)
        .with(compact_layer)
        .try_init()?;

    tracing::info!(
        target: "gesture_control",
        version = env!("CARGO_PKG_VERSION"),
        json_format = use_json,
        file = ?config.file_path,
        "Logging initialized"
    );

    Ok(guard)
}
