//! Tracing setup for the savein binaries.
//!
//! Events go to `savein.log` in the XDG state dir. When that file cannot be
//! opened the caller installs the stderr subscriber instead.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or does not parse.
const DEFAULT_FILTER: &str = "info,savein=debug,savein_core=debug";

fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global fmt subscriber writing through `writer`.
fn install<W>(writer: W) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(rust_log.as_deref()))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("a log subscriber is already installed: {e}"))
}

/// Opens `path` for appending, creating missing parent directories.
fn open_append(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

/// `$XDG_STATE_HOME/savein/savein.log`
pub fn log_file_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("savein").context("locate XDG state dir")?;
    Ok(dirs.get_state_home().join("savein.log"))
}

/// Logs to the state-dir file. Errors leave no subscriber installed.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = open_append(&path)?;
    install(Mutex::new(file))?;
    tracing::info!(path = %path.display(), "savein logging to file");
    Ok(())
}

/// Logs to stderr. A subscriber that is already installed wins.
pub fn init_logging_stderr() {
    if let Err(e) = install(io::stderr) {
        eprintln!("savein: {e:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn log_file_lives_under_savein_state_dir() {
        let path = log_file_path().unwrap();
        assert!(path.ends_with("savein/savein.log"), "{}", path.display());
    }

    #[test]
    fn open_append_creates_dirs_and_keeps_earlier_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/savein/savein.log");

        writeln!(open_append(&path).unwrap(), "first").unwrap();
        writeln!(open_append(&path).unwrap(), "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn bad_directives_fall_back_to_default() {
        let fallback = filter_from(Some("savein=loudest")).to_string();
        assert_eq!(fallback, filter_from(None).to_string());
        assert_ne!(filter_from(Some("warn")).to_string(), fallback);
    }
}
