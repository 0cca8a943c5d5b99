//! Logging infrastructure for skill-tree processing
//!
//! Structured logging through the `tracing` crate, with configurable
//! level and format. WASM builds send events to the browser console.
//!
//! # Usage
//!
//! ```rust,no_run
//! use skillmap::core::logging::init_logging;
//!
//! // Initialize with default settings
//! init_logging(None, None).unwrap();
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `SKILLMAP_LOG_LEVEL`: Set log level (trace|debug|info|warn|error|off)
//! - `SKILLMAP_LOG_FORMAT`: Set log format (compact|pretty|json)
//! - `RUST_LOG`: Standard `tracing-subscriber` filter, also honored
//!
//! # Filtering Logs
//!
//! ```bash
//! # Show the positioning sweeps at trace level
//! RUST_LOG="info,skillmap::tree::position=trace" skillmap map --input store.json
//! ```

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

#[cfg(target_arch = "wasm32")]
use tracing_wasm::WASMLayerConfig;

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

#[cfg(not(target_arch = "wasm32"))]
/// Level filter to use: the argument, then `SKILLMAP_LOG_LEVEL`, then
/// `RUST_LOG`, then `info`
fn resolve_level(level: Option<&str>) -> String {
    level
        .map(str::to_string)
        .or_else(|| std::env::var("SKILLMAP_LOG_LEVEL").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string())
}

#[cfg(not(target_arch = "wasm32"))]
/// Output format: the argument, then `SKILLMAP_LOG_FORMAT`, then compact
fn resolve_format(format: Option<&str>) -> Result<LogFormat, String> {
    match format
        .map(str::to_string)
        .or_else(|| std::env::var("SKILLMAP_LOG_FORMAT").ok())
    {
        Some(name) => LogFormat::from_str(&name).map_err(|e| format!("Invalid log format: {}", e)),
        None => Ok(LogFormat::Compact),
    }
}

/// Initialize the tracing subscriber with the given log level and format
///
/// `level` is a filter directive (`warn`, `info,skillmap::tree=trace`, ...)
/// and `format` one of [`LogFormat::variants`]. Missing values come from the
/// environment. Unparseable filters fall back to `info`.
///
/// Events are written to stderr. Fails if the format is unknown or a global
/// subscriber is already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        // Browser console only; level and format are not configurable there
        let _ = (level, format);
        tracing_wasm::set_as_global_default_with_config(WASMLayerConfig::default());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let filter = EnvFilter::try_new(resolve_level(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let format = resolve_format(format)?;
        let detailed = format != LogFormat::Compact;

        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(detailed)
            .with_file(detailed)
            .with_line_number(detailed)
            .with_span_events(if detailed { FmtSpan::ACTIVE } else { FmtSpan::NONE });

        let layer = match format {
            LogFormat::Compact => base.compact().boxed(),
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Json => base.json().boxed(),
        };

        tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()?;
        Ok(())
    }
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
