// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! File-based logging.
//!
//! The terminal belongs to the TUI, so tracing output goes to a daily rolling
//! file under `.logs/` instead of stdout.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "beats";
const DEFAULT_FILTER: &str = "beats=debug,warn";

/// Installs the global subscriber.
///
/// The level is taken from `RUST_LOG` when set. The returned guard flushes
/// buffered records when dropped, so it must be held until exit.
pub(crate) fn init_logging() -> Result<WorkerGuard> {
    let log_dir = Path::new(LOG_DIR);
    fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::info!(dir = LOG_DIR, "logging initialised");

    Ok(guard)
}
