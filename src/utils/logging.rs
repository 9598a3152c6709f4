//! # Logging
//!
//! Subscriber setup driven by [`LoggingConfig`].
//!
//! The codec itself only emits `tracing` events: `trace` per field, `debug` when a frame
//! carries unknown attributes or is rejected. Applications that already install their own
//! subscriber can skip this module entirely. `RUST_LOG` takes precedence over the configured
//! filter when set.

use crate::config::LoggingConfig;
use crate::error::{CodecError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `tracing` subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.env_filter()?,
    };

    let writer = make_writer(config)?;
    let builder = fmt().with_env_filter(filter).with_target(true).with_writer(writer);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| CodecError::ConfigError(format!("Failed to install logger: {e}")))?;

    tracing::info!(filter = %config.filter, json = config.json, "logging initialized");
    Ok(())
}

fn make_writer(config: &LoggingConfig) -> Result<BoxMakeWriter> {
    let Some(path) = &config.file else {
        return Ok(BoxMakeWriter::new(std::io::stderr));
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BoxMakeWriter::new(Mutex::new(file)))
}
