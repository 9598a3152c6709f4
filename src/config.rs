//! # Configuration Management
//!
//! Centralized configuration for attribute codecs.
//!
//! Framing settings pick the length prefix and the frame size cap a codec is built with.
//! Logging settings drive [`init_logging`](crate::utils::logging::init_logging).
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()`
//!
//! ## Environment Variables
//! - `ATTRIBUTES_CODEC_LENGTH_WIDTH`: `u8`, `u16`, `u32`, `u64` or `varint`
//! - `ATTRIBUTES_CODEC_BYTE_ORDER`: `big` or `little`
//! - `ATTRIBUTES_CODEC_MAX_FRAME_SIZE`: a byte count, or `unlimited`
//! - `ATTRIBUTES_CODEC_LOG`: filter directives in `RUST_LOG` syntax
//!
//! ## Security Considerations
//! - Frames are capped at 16 MB by default; a declared length above the cap is rejected
//!   before any payload is read

use crate::core::frame::{ByteOrder, FrameMode, LengthPrefix, LengthWidth};
use crate::error::{constants, CodecError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Default cap on a frame's declared length (16 MB)
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

/// Prefix for every environment variable read by [`CodecConfig::from_env`]
pub const ENV_PREFIX: &str = "ATTRIBUTES_CODEC_";

/// Top-level codec configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct CodecConfig {
    /// Wire framing
    #[serde(default)]
    pub framing: FramingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| CodecError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_OPEN)))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CodecError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| CodecError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_PARSE)))
    }

    /// Defaults overridden by `ATTRIBUTES_CODEC_*` environment variables.
    ///
    /// Unlike a TOML file, a malformed variable is an error rather than silently ignored.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())
    }

    /// Apply overrides from a variable lookup. `lookup` receives names without the prefix.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(width) = lookup("LENGTH_WIDTH") {
            config.framing.length_width = width.parse()?;
        }

        if let Some(order) = lookup("BYTE_ORDER") {
            config.framing.byte_order = order.parse()?;
        }

        if let Some(max) = lookup("MAX_FRAME_SIZE") {
            if max.eq_ignore_ascii_case("unlimited") {
                config.framing.limit_frame_size = false;
            } else {
                config.framing.limit_frame_size = true;
                config.framing.max_frame_size = max.parse::<u32>().map_err(|e| {
                    CodecError::ConfigError(format!("Invalid max frame size '{max}': {e}"))
                })?;
            }
        }

        if let Some(filter) = lookup("LOG") {
            config.logging.filter = filter;
            config.logging.env_filter()?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CodecError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.framing.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CodecError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Wire framing configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FramingConfig {
    /// Encoding of the length prefix
    pub length_width: LengthWidth,

    /// Byte order of fixed-width prefixes; ignored for varints
    pub byte_order: ByteOrder,

    /// Whether decoders reject frames above `max_frame_size`
    pub limit_frame_size: bool,

    /// Largest declared frame length accepted when limiting
    pub max_frame_size: u32,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            length_width: LengthWidth::U32,
            byte_order: ByteOrder::Big,
            limit_frame_size: true,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl FramingConfig {
    pub fn prefix(&self) -> LengthPrefix {
        LengthPrefix::new(self.length_width, self.byte_order)
    }

    pub fn mode(&self) -> FrameMode {
        FrameMode::from_limit(self.limit_frame_size.then_some(self.max_frame_size))
    }

    /// Validate framing configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.limit_frame_size {
            if self.max_frame_size == 0 {
                errors.push("Max frame size must be greater than 0".to_string());
            } else if u64::from(self.max_frame_size) > self.length_width.max_length() {
                errors.push(format!(
                    "Max frame size {} exceeds what a {} prefix can express ({})",
                    self.max_frame_size,
                    self.length_width.name(),
                    self.length_width.max_length()
                ));
            }
        }

        if self.length_width == LengthWidth::Varint && self.byte_order == ByteOrder::Little {
            errors.push(
                "WARNING: byte_order has no effect on varint length prefixes".to_string(),
            );
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives in `RUST_LOG` syntax, such as `info` or `attributes_codec=debug`
    pub filter: String,

    /// Emit one JSON object per event instead of plain text
    pub json: bool,

    /// Append to this file instead of writing to stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: String::from("info"),
            json: false,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parse [`filter`](Self::filter) into a subscriber filter
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|e| {
            CodecError::ConfigError(format!("Invalid log filter '{}': {e}", self.filter))
        })
    }

    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match self.env_filter() {
            Err(e) => errors.push(e.to_string()),
            Ok(filter) if filter.max_level_hint() == Some(LevelFilter::TRACE) => {
                errors.push(
                    "WARNING: trace logging emits an event for every decoded attribute"
                        .to_string(),
                );
            }
            Ok(_) => {}
        }

        if let Some(path) = &self.file {
            if path.is_dir() {
                errors.push(format!("Log file path is a directory: {}", path.display()));
            } else if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(format!(
                        "Log file directory does not exist: {}",
                        parent.display()
                    ));
                }
            }
        }

        errors
    }
}
