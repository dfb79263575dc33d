//! Logging support.
//!
//! Structured logging via the `tracing` crate. The build pipeline emits
//! `debug!`/`trace!` events; hosts that want them on stderr call
//! [`init_logging`] once, or install their own subscriber. The `ARBOR_LOG`
//! environment variable overrides the configured level with a full
//! `EnvFilter` directive string.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
        }
    }
}

/// Initialize the global subscriber. Safe to call more than once; later
/// calls are no-ops (the first subscriber wins).
pub fn init_logging(config: Option<&LoggingConfig>) {
    let enabled = config.map(|c| c.enabled).unwrap_or(true);
    let level = if enabled {
        config.map(|c| c.level.as_str()).unwrap_or("info")
    } else {
        "off"
    };
    let filter = EnvFilter::try_from_env("ARBOR_LOG")
        .unwrap_or_else(|_| EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")));

    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    let base = Registry::default().with(filter);
    if format == "json" {
        base.with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();
    } else {
        base.with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "text");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_logging(None);
        init_logging(Some(&LoggingConfig::default()));
    }
}
