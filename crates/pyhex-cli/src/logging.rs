//! Tracing subscriber initialisation.
//!
//! Only the CLI crate installs a subscriber; `pyhex-core` and
//! `pyhex-adapters` only *emit* spans and events.
//!
//! # Verbosity mapping
//!
//! | Flag(s)  | Filter level |
//! |----------|--------------|
//! | (none)   | WARN         |
//! | `-v`     | INFO         |
//! | `-vv`    | DEBUG        |
//! | `-vvv`   | TRACE        |
//! | `--quiet`| ERROR        |
//!
//! `RUST_LOG` overrides all of the above if set.
//!
//! With `--log-file`, the same events are also written as JSON lines through
//! a non-blocking appender.  The returned [`LoggingContext`] owns the
//! appender's worker guard and must live until the process exits.

use std::fs;
use std::io::IsTerminal as _;
use std::path::Path;

use anyhow::Context as _;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

/// Keeps the file appender flushing until dropped.
#[must_use = "dropping the context stops file logging"]
pub struct LoggingContext {
    _guard: Option<WorkerGuard>,
}

impl LoggingContext {
    /// Initialise the global tracing subscriber.
    ///
    /// Must be called exactly once, before any tracing macros fire.
    pub fn init(args: &GlobalArgs) -> anyhow::Result<Self> {
        let level = derive_level(args);

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "pyhex={level},pyhex_core={level},pyhex_adapters={level}"
            ))
        });

        let use_ansi = !args.no_color && std::io::stderr().is_terminal();

        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(use_ansi)
            .with_writer(std::io::stderr);

        let (file_layer, guard) = match args.log_file.as_deref() {
            Some(path) => {
                let (writer, guard) = file_writer(path)?;
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed();
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

        Ok(Self { _guard: guard })
    }
}

fn file_writer(
    path: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open log file {}", path.display()))?;
    Ok(tracing_appender::non_blocking(file))
}

/// Translate the verbosity counter + quiet flag to a level string.
fn derive_level(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
