//! Ambient configuration for the demo binary.
//!
//! This is deliberately small and lives outside the core library's public
//! contract: the core (`crate::jsonrpc`, `crate::framer`) takes its framing
//! and registry options as explicit constructor arguments and never reads
//! global configuration. Only `src/bin/demo.rs` consults this module.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::config::ConfigError;
use config::{Config, ConfigError as ExternalConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A trait for types that can be validated.
pub trait Validate {
    /// Validates that the configuration is correct.
    fn validate(&self) -> ConfigResult<()>;
}

/// Which framing the demo binary should use on stdin/stdout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FramingMode {
    /// One JSON message per delimiter byte.
    Delimited,
    /// `Content-Length`-prefixed framing.
    ContentLength,
}

impl Default for FramingMode {
    fn default() -> Self {
        Self::Delimited
    }
}

/// Ambient configuration consumed only by the demo binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AmbientConfig {
    /// Logging configuration.
    pub log: LogConfig,

    /// Framing configuration.
    pub framing: FramingConfig,
}

impl Validate for AmbientConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.log.validate()?;
        self.framing.validate()?;
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Whether to log in JSON format.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Validate for LogConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "invalid log level: {}",
                self.level
            ))),
        }
    }
}

/// Framing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramingConfig {
    /// Which framing to use.
    pub mode: FramingMode,

    /// Delimiter byte for `Delimited` framing.
    pub delimiter: u8,

    /// Whether `ContentLength` framing should also accept a leading HTTP
    /// request line before the header block.
    pub accept_request_line: bool,

    /// Whether `ContentLength` framing should treat a missing
    /// `Content-Length` header as recoverable (skip the frame, keep reading)
    /// rather than fatal (end the stream).
    pub recover_missing_length: bool,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            mode: FramingMode::default(),
            delimiter: b'\n',
            accept_request_line: false,
            recover_missing_length: false,
        }
    }
}

impl Validate for FramingConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.delimiter == 0 {
            return Err(ConfigError::ValidationError(
                "delimiter cannot be the NUL byte".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration loader: default values, overridden by an optional file,
/// overridden by environment variables prefixed `HONU_`.
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    pub fn new<P: AsRef<Path>>(config_path: Option<P>, env_prefix: &str) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Loads the configuration from defaults, an optional file, and the
    /// environment.
    pub fn load(&self) -> ConfigResult<AmbientConfig> {
        let mut builder = Config::builder();

        builder = builder.add_source(
            Config::try_from(&AmbientConfig::default())
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
        );

        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            let path_str = path
                .to_str()
                .ok_or_else(|| ConfigError::ParseError(format!("non-UTF8 config path: {path:?}")))?;
            builder = builder.add_source(File::with_name(path_str));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(map_external_error)?;

        let ambient: AmbientConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        ambient.validate()?;
        Ok(ambient)
    }
}

fn map_external_error(err: ExternalConfigError) -> ConfigError {
    match err {
        ExternalConfigError::NotFound(path) => ConfigError::FileNotFound(PathBuf::from(path)),
        ExternalConfigError::PathParse(path) => {
            ConfigError::ParseError(format!("invalid path: {path:?}"))
        }
        ExternalConfigError::FileParse { .. } => {
            ConfigError::ParseError("error parsing config file".to_string())
        }
        ExternalConfigError::Foreign(err) => ConfigError::ParseError(err.to_string()),
        ExternalConfigError::Frozen => {
            ConfigError::ParseError("configuration is frozen".to_string())
        }
        ExternalConfigError::Message(msg) => ConfigError::ParseError(msg),
        ExternalConfigError::Type { .. } => {
            ConfigError::ParseError("type conversion error".to_string())
        }
    }
}

/// Global configuration accessor, set once by the demo binary at startup.
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    config: Arc<AmbientConfig>,
}

impl GlobalConfig {
    /// Creates a new global configuration handle.
    pub fn new(config: AmbientConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration.
    pub fn get(&self) -> &AmbientConfig {
        &self.config
    }
}

static GLOBAL_CONFIG: OnceCell<GlobalConfig> = OnceCell::new();

/// Initializes the global configuration. Only the first call takes effect.
pub fn init_global_config(config: AmbientConfig) {
    let _ = GLOBAL_CONFIG.set(GlobalConfig::new(config));
}

/// Returns a reference to the global configuration.
///
/// # Panics
///
/// Panics if the global configuration has not been initialized.
pub fn get_global_config() -> &'static GlobalConfig {
    GLOBAL_CONFIG
        .get()
        .expect("global configuration not initialized")
}
