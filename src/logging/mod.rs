//! Logging setup for the Hetu client
//!
//! Diagnostics go to stderr through `tracing` so command output on stdout
//! stays clean. The level comes from `-v` flags or `HETU_LOG_LEVEL`, and
//! `RUST_LOG` overrides both.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hetu_cli::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::from_env()
//!     .with_verbosity(2)
//!     .with_format(LogFormat::Compact);
//! init_logging(&config);
//! tracing::debug!("logging ready");
//! ```

pub mod format;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::expand_home;

pub use format::{CompactFormatter, HetuFormatter};

static INIT: Once = Once::new();

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Keeps the non-blocking file writer flushing until process exit
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `YYYY-MM-DD HH:MM:SS | LEVEL | target | message`
    #[default]
    Text,
    /// Newline-delimited JSON
    Json,
    /// `LEVEL module: message`
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Compact => write!(f, "compact"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!(
                "Invalid log format '{}'. Valid options: text, json, compact",
                s
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level emitted
    pub level: Level,
    /// Also write daily-rotated files here when set
    pub log_dir: Option<String>,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            log_dir: None,
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Raise the level by `count` steps above WARN (`-v` info, `-vv` debug,
    /// `-vvv` trace). Zero leaves the level unchanged.
    pub fn with_verbosity(mut self, count: u8) -> Self {
        if count > 0 {
            self.level = level_for_verbosity(count);
        }
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<String>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Load configuration from environment variables
    ///
    /// - `HETU_LOG_LEVEL`: trace, debug, info, warn, error
    /// - `HETU_LOG_FORMAT`: text, json, compact
    /// - `HETU_LOG_DIR`: enables file logging into this directory
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("HETU_LOG_LEVEL") {
            if let Ok(level) = level.parse() {
                config.level = level;
            }
        }

        if let Ok(format) = std::env::var("HETU_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                config.format = f;
            }
        }

        if let Ok(dir) = std::env::var("HETU_LOG_DIR") {
            if !dir.is_empty() {
                config.log_dir = Some(dir);
            }
        }

        config
    }

    fn log_path(&self) -> Option<PathBuf> {
        self.log_dir.as_deref().map(expand_home)
    }
}

fn level_for_verbosity(count: u8) -> Level {
    match count {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialize the global subscriber. Later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        init_logging_internal(config);
        INITIALIZED.store(true, Ordering::SeqCst);
    });
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

fn init_logging_internal(config: &LoggingConfig) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!("{},hyper=warn,reqwest=warn,h2=warn", config.level))
    };

    let file_writer = config.log_path().and_then(|log_dir| {
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            );
            return None;
        }
        let appender = tracing_appender::rolling::daily(&log_dir, "hetucli.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        Some(non_blocking)
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .event_format(HetuFormatter)
                    .with_writer(io::stderr),
            )
            .with(file_writer.map(|w| {
                fmt::layer()
                    .event_format(HetuFormatter)
                    .with_writer(w)
                    .with_ansi(false)
            }))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .with(file_writer.map(|w| fmt::layer().json().with_writer(w).with_ansi(false)))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .event_format(CompactFormatter)
                    .with_writer(io::stderr),
            )
            .with(file_writer.map(|w| {
                fmt::layer()
                    .event_format(CompactFormatter)
                    .with_writer(w)
                    .with_ansi(false)
            }))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::WARN);
        assert!(config.log_dir.is_none());
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new()
            .with_level(Level::DEBUG)
            .with_format(LogFormat::Json)
            .with_log_dir("/tmp/logs");

        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_path(), Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(LoggingConfig::new().with_verbosity(0).level, Level::WARN);
        assert_eq!(LoggingConfig::new().with_verbosity(1).level, Level::INFO);
        assert_eq!(LoggingConfig::new().with_verbosity(2).level, Level::DEBUG);
        assert_eq!(LoggingConfig::new().with_verbosity(9).level, Level::TRACE);

        // -v does not lower an explicit level
        let config = LoggingConfig::new().with_level(Level::ERROR).with_verbosity(0);
        assert_eq!(config.level, Level::ERROR);
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("invalid".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }

    #[test]
    fn test_init_logging_runs_once() {
        let config = LoggingConfig::new().with_format(LogFormat::Compact);
        init_logging(&config);
        init_logging(&config.with_level(Level::TRACE));
        assert!(is_initialized());
    }
}
