//! Logging through `tracing` and `tracing-subscriber`.
//!
//! The terminal UI draws on stderr, so it logs to a file. The one-shot
//! subcommands log to stderr.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// Log file path. Logs go to stderr when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            log_file: None,
        }
    }
}

impl LogConfig {
    /// 0 = warn, 1 (`-v`) = info, 2 = debug, 3+ = trace.
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let filter = build_env_filter(config.level);
    let builder = fmt().with_env_filter(filter).with_target(false);

    match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

/// `RUST_LOG` wins over the verbosity flags when set.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!(
            "warn,fast_scriptures={level},scriptures_core={level},scriptures_tui={level}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(LogConfig::from_verbosity(0).level, Level::WARN);
        assert_eq!(LogConfig::from_verbosity(1).level, Level::INFO);
        assert_eq!(LogConfig::from_verbosity(2).level, Level::DEBUG);
        assert_eq!(LogConfig::from_verbosity(7).level, Level::TRACE);
    }

    #[test]
    fn test_log_file_is_optional() {
        let config = LogConfig::from_verbosity(1);
        assert!(config.log_file.is_none());
        let config = config.with_log_file(Some(PathBuf::from("/tmp/fs.log")));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/fs.log")));
    }
}
