//! Logging configuration and initialization.
//!
//! Presets pick sensible levels for the `versetype::*` targets; per-target
//! overrides from the CLI win over the preset, and `RUST_LOG` wins over both.

use std::collections::HashMap;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Prefix shared by every log target in the workspace.
const TARGET_PREFIX: &str = "versetype";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: '{}'. Use 'text' or 'json'.", s)),
        }
    }
}

/// Logging preset levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup, connections and storage problems
    #[default]
    Production,
    /// Adds session lifecycle and HTTP requests
    Verbose,
    /// Every submission and store call
    Debug,
    Trace,
    /// Warnings and errors only
    Quiet,
}

impl LogPreset {
    fn directives(self) -> Vec<String> {
        let directives: &[&str] = match self {
            LogPreset::Production => &[
                "versetype::startup=info",
                "versetype::corpus=info",
                "versetype::ws=info",
                "versetype::session=warn",
                "versetype::store=warn",
                "tower_http=warn",
            ],
            LogPreset::Verbose => &["versetype=info", "tower_http=info"],
            LogPreset::Debug => &["versetype=debug", "tower_http=debug"],
            LogPreset::Trace => &["versetype=trace", "tower_http=trace"],
            LogPreset::Quiet => &["versetype=warn", "tower_http=error"],
        };
        directives.iter().map(|d| d.to_string()).collect()
    }
}

/// Logging configuration built from CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Per-target level overrides (e.g., "versetype::store" -> DEBUG)
    pub overrides: HashMap<String, Level>,
    pub format: LogFormat,
}

impl LogConfig {
    /// Create a new LogConfig from CLI arguments.
    pub fn from_cli(
        verbose: bool,
        debug: bool,
        trace: bool,
        quiet: bool,
        log_overrides: Vec<String>,
        format: LogFormat,
    ) -> Self {
        let preset = if quiet {
            LogPreset::Quiet
        } else if trace {
            LogPreset::Trace
        } else if debug {
            LogPreset::Debug
        } else if verbose {
            LogPreset::Verbose
        } else {
            LogPreset::Production
        };

        // "store=debug,ws=trace" style, possibly repeated
        let overrides = log_overrides
            .iter()
            .flat_map(|arg| arg.split(','))
            .filter_map(|part| part.split_once('='))
            .filter_map(|(target, level)| {
                let level = parse_level(level.trim())?;
                Some((full_target(target.trim()), level))
            })
            .collect();

        Self {
            preset,
            overrides,
            format,
        }
    }

    /// Build an EnvFilter from this configuration.
    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }

        let mut directives = self.preset.directives();
        for (target, level) in &self.overrides {
            directives.push(format!("{}={}", target, level.as_str().to_lowercase()));
        }

        EnvFilter::try_new(directives.join(",")).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Expand a short target ("store") to its full name ("versetype::store").
fn full_target(target: &str) -> String {
    if target == TARGET_PREFIX || target.starts_with("versetype::") || target == "tower_http" {
        target.to_string()
    } else {
        format!("{}::{}", TARGET_PREFIX, target)
    }
}

/// Parse a level string (case-insensitive).
fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize the tracing subscriber with the given configuration.
pub fn init(config: &LogConfig) {
    let filter = config.build_filter();

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_thread_ids(false))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }
}
