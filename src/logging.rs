use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

pub const LOG_FILE_NAME: &str = "pharmtutor.log";

/// Directs `tracing` output to a file. The terminal belongs to the UI, so
/// nothing is ever written to stderr.
///
/// `RUST_LOG` wins over `log_level` from the config when set.
pub fn init(config: &Config) -> Result<PathBuf> {
    let path = Config::data_dir().join(LOG_FILE_NAME);
    let file = open_log(&path)?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pharmtutor starting");
    Ok(path)
}

fn open_log(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}
