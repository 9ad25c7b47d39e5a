//! Diagnostics for the logfwd CLI.
//!
//! stdout belongs to `send` frames and command reports, so every log line
//! goes to stderr. ANSI colors are only enabled when stderr is a terminal,
//! which keeps redirected logs (`2> send.log`) free of escape codes.

use std::io::IsTerminal;

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use logfwd_core::config::GeneralConfig;

use crate::cli::LogFormat;

/// Install the global subscriber described by `[general]`.
///
/// `RUST_LOG` overrides `general.log_level` when set. Call once, before the
/// first command runs.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let format = LogFormat::from_str(&config.log_format, true).map_err(|_| {
        anyhow!(
            "unknown log format '{}', expected 'json' or 'pretty'",
            config.log_format
        )
    })?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let base = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal());
    let layer = match format {
        LogFormat::Json => base.json().boxed(),
        LogFormat::Pretty => base.pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize {format} log subscriber: {e}"))
}
