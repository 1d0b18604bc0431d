//! Diagnostic logging for the command-line front-end
//!
//! The library logs through the `log` facade; this installs a
//! tracing-subscriber formatter on stderr that also receives those records.
//! `RUST_LOG` takes precedence over the verbosity flag.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Log levels selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Map the number of `-v` flags to a level
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Filter directive raising only this crate's verbosity
    pub fn directive(self) -> String {
        format!("warn,redshift_settings={}", self.as_str())
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(level: LogLevel) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(LogLevel::from_verbosity(0), LogLevel::Warn);
        assert_eq!(LogLevel::from_verbosity(1), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(2), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(7), LogLevel::Debug);
    }

    #[test]
    fn test_directive_keeps_dependencies_quiet() {
        assert_eq!(LogLevel::Info.directive(), "warn,redshift_settings=info");
    }
}
