//! tracing subscriber setup. The TUI owns the terminal, so interactive runs log to a file in
//! the cache dir; headless runs log to stderr.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions as FileOpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Build the filter: RUST_LOG wins, otherwise `level` applies to this crate only.
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(format!("{}={}", env!("CARGO_CRATE_NAME"), level))
            .map_err(|e| eyre!("invalid log level {level:?}: {e}")),
    }
}

pub fn init_logging(level: &str, target: LogTarget) -> Result<()> {
    let filter = env_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = FileOpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| eyre!("could not install log subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts_levels() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(env_filter("debug").is_ok());
            assert!(env_filter("warn").is_ok());
        }
    }
}
