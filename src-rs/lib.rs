#![deny(clippy::all)]

pub mod config;
pub mod cons;
pub mod llm;
pub mod selection;
pub mod workspace;

#[cfg(feature = "node")]
mod ffi;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Once;

use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

static INIT: Once = Once::new();

pub const LOG_LEVEL_ENV: &str = "MENTIONKIT_LOG";
pub const LOG_FILE: &str = "logs/mentionkit.log";
const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}\n";

/// Installs the global logger. The embedding editor calls this once at
/// activation; the node bindings call it on every entry point. Later calls
/// are no-ops.
///
/// A log4rs file named by `LOG4RS_CONFIG` (default `log4rs.yaml`) wins,
/// otherwise everything goes to [`LOG_FILE`] at the `MENTIONKIT_LOG` level.
pub fn init_logger() {
    INIT.call_once(|| {
        let config_path =
            std::env::var("LOG4RS_CONFIG").unwrap_or_else(|_| "log4rs.yaml".to_string());
        if log4rs::init_file(&config_path, Default::default()).is_ok() {
            println!("[INIT] Logger initialized from {}", config_path);
            return;
        }

        let level = log_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
        let result = file_log_config(Path::new(LOG_FILE), level)
            .and_then(|config| log4rs::init_config(config).map_err(anyhow::Error::from));
        match result {
            Ok(_) => println!("[INIT] Logger writing to {} at {}", LOG_FILE, level),
            Err(e) => println!("[INIT] Failed to initialize logger: {:#}", e),
        }
    });
}

/// Unknown or missing values fall back to debug.
pub(crate) fn log_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Debug)
}

pub(crate) fn file_log_config(log_path: &Path, level: LevelFilter) -> anyhow::Result<Config> {
    if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_path)?;
    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(level))?;
    Ok(config)
}

#[cfg(feature = "node")]
pub use ffi::*;
