//! # Logging Setup
//!
//! Installs the global `tracing` subscriber: a non-blocking file layer under
//! the data directory plus an optional stderr layer.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::paths::LOG_FILE;

/// Local wall-clock timestamps.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// `RUST_LOG` wins over the configured filter.
pub fn env_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
}

/// Keep the returned guard alive for the whole run, or buffered lines are lost.
pub fn init(data_dir: &Path, filter: &str, stderr: bool) -> Result<WorkerGuard> {
    fs::create_dir_all(data_dir).with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(data_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_timer(LocalTimer)
        .with_ansi(false);

    let stderr_layer = stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(LocalTimer)
    });

    tracing_subscriber::registry()
        .with(env_filter(filter))
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
