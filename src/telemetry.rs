//! Tracing initialisation for the `leadimage` binary.
//!
//! Call [`init_tracing`] once at program start. Log lines go to stdout and,
//! when a log file is given, are also appended to that file without ANSI
//! colors. `RUST_LOG` overrides the default level.
//!
//! Calling it again is harmless; only the first subscriber is installed.

use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// * `level` - default verbosity when `RUST_LOG` is not set
/// * `json` - emit newline-delimited JSON on stdout
/// * `log_file` - also append plain-text lines to this file
pub fn init_tracing(level: Level, json: bool, log_file: Option<&Path>) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let file = match log_file {
        Some(path) => Some(Mutex::new(
            OpenOptions::new().create(true).append(true).open(path)?,
        )),
        None => None,
    };

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .with(file.map(file_layer))
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .with(file.map(file_layer))
            .try_init()
            .ok();
    }

    Ok(())
}

fn file_layer<S>(file: Mutex<File>) -> fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format, Mutex<File>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(file)
}
