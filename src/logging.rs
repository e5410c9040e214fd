use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "WORDQUIZ_LOG";

/// Send tracing output to `<dir>/wordquiz.log`. The terminal belongs to the
/// UI, so nothing is written to stdout or stderr.
pub fn init(dir: &Path, verbose: bool) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join("wordquiz.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let default_directive = if verbose { "wordquiz=debug" } else { "wordquiz=info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;
    Ok(path)
}
