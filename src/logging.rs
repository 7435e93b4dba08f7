use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing::Level;

pub const LOG_ENV: &str = "PKGMENU_LOG";

pub fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pkgmenu")
        .join("pkgmenu.log")
}

/// `PKGMENU_LOG` wins over the configured level; unknown names fall back to info.
pub fn resolve_level(configured: &str) -> Level {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|value| Level::from_str(value.trim()).ok())
        .or_else(|| Level::from_str(configured.trim()).ok())
        .unwrap_or(Level::INFO)
}

/// Sends tracing output to an append-only log file.
///
/// The terminal is in raw mode while the menu runs, so nothing is written to
/// stdout or stderr.
pub fn init_file_logging(output_path: &Path, level: Level) -> Result<()> {
    ensure_parent_dir(output_path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output_path)?;

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(false)
        .with_max_level(level)
        .with_writer(Mutex::new(file))
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eyre!("failed to set tracing subscriber: {e}"))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
