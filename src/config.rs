//! Configuration system for gradekey.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `config.toml` file
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `GRADEKEY_HASH_PROVIDER` - Hash provider (sha2, ring, none)
//! - `GRADEKEY_REQUIRE_KNOWN_GRADE` - Reject grades missing from `[grades]`
//! - `GRADEKEY_CLIPBOARD_ENABLED` - Enable the system clipboard strategy
//! - `GRADEKEY_CLIPBOARD_FALLBACK` - Fallback strategy (osc52, none)
//! - `GRADEKEY_CLIPBOARD_HOLD_SECS` - Linux clipboard hold time in seconds
//! - `GRADEKEY_LOGGING_ENABLED` - Enable logging
//! - `GRADEKEY_LOG_LEVEL` - Log level (trace, debug, info, warn, error)

use config::Config;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;

use crate::clipboard::DEFAULT_HOLD_SECS;
use crate::digest::PROVIDER_NAMES;
use crate::errors::{GradekeyError, GradekeyResult};
use crate::grades::GradeConfig;

/// Global configuration singleton.
static CONFIG: OnceLock<GradekeyConfig> = OnceLock::new();

/// Default config file name, without extension.
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GradekeyConfig {
    /// Code generation settings
    pub generator: GeneratorConfig,
    /// Clipboard settings
    pub clipboard: ClipboardConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Grade catalogue, keyed by grade name
    pub grades: HashMap<String, GradeConfig>,
}

/// Code generation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Hash provider name: "sha2", "ring" or "none"
    pub hash_provider: String,
    /// Reject grades that are not in the catalogue (ignored when it is empty)
    pub require_known_grade: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            hash_provider: "sha2".to_string(),
            require_known_grade: false,
        }
    }
}

/// Clipboard configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Use the system clipboard as the primary strategy
    pub enabled: bool,
    /// Fallback strategy: "osc52" or "none"
    pub fallback: String,
    /// Seconds a Linux clipboard write waits for a clipboard manager to take over
    pub hold_secs: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback: "osc52".to_string(),
            hold_secs: DEFAULT_HOLD_SECS,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

fn config_err(e: config::ConfigError) -> GradekeyError {
    GradekeyError::ConfigError(e.to_string())
}

impl GradekeyConfig {
    /// Load configuration from the given file (optional) and the environment.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. `file` (any format the `config` crate detects from the extension)
    /// 3. Environment variables
    ///
    /// The global singleton is not touched.
    pub fn from_sources(file: &str) -> GradekeyResult<Self> {
        let builder = Config::builder()
            .set_default("generator.hash_provider", "sha2")
            .map_err(config_err)?
            .set_default("generator.require_known_grade", false)
            .map_err(config_err)?
            .set_default("clipboard.enabled", true)
            .map_err(config_err)?
            .set_default("clipboard.fallback", "osc52")
            .map_err(config_err)?
            .set_default("clipboard.hold_secs", DEFAULT_HOLD_SECS as i64)
            .map_err(config_err)?
            .set_default("logging.enabled", false)
            .map_err(config_err)?
            .set_default("logging.level", "info")
            .map_err(config_err)?
            .add_source(config::File::with_name(file).required(false))
            .set_override_option(
                "generator.hash_provider",
                env::var("GRADEKEY_HASH_PROVIDER").ok(),
            )
            .map_err(config_err)?
            .set_override_option(
                "generator.require_known_grade",
                env::var("GRADEKEY_REQUIRE_KNOWN_GRADE")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )
            .map_err(config_err)?
            .set_override_option(
                "clipboard.enabled",
                env::var("GRADEKEY_CLIPBOARD_ENABLED")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )
            .map_err(config_err)?
            .set_override_option(
                "clipboard.fallback",
                env::var("GRADEKEY_CLIPBOARD_FALLBACK").ok(),
            )
            .map_err(config_err)?
            .set_override_option(
                "clipboard.hold_secs",
                env::var("GRADEKEY_CLIPBOARD_HOLD_SECS")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(config_err)?
            .set_override_option(
                "logging.enabled",
                env::var("GRADEKEY_LOGGING_ENABLED")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )
            .map_err(config_err)?
            .set_override_option("logging.level", env::var("GRADEKEY_LOG_LEVEL").ok())
            .map_err(config_err)?;

        let settings = builder
            .build()
            .map_err(|e| GradekeyError::ConfigError(format!("failed to build config: {e}")))?;

        settings
            .try_deserialize()
            .map_err(|e| GradekeyError::ConfigError(format!("failed to deserialize config: {e}")))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> GradekeyResult<()> {
        let provider = self.generator.hash_provider.to_lowercase();
        if !PROVIDER_NAMES.contains(&provider.as_str()) {
            return Err(GradekeyError::ConfigError(format!(
                "generator.hash_provider must be one of: {}. Got '{}'",
                PROVIDER_NAMES.join(", "),
                self.generator.hash_provider
            )));
        }

        match self.clipboard.fallback.to_lowercase().as_str() {
            "osc52" | "none" => {}
            other => {
                return Err(GradekeyError::ConfigError(format!(
                    "clipboard.fallback must be 'osc52' or 'none', got '{other}'"
                )));
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(GradekeyError::ConfigError(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        if self.grades.keys().any(|name| name.is_empty()) {
            return Err(GradekeyError::ConfigError(
                "grade names cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Get the global configuration.
///
/// This loads the configuration on first access and caches it.
/// Returns an error if configuration loading or validation fails.
pub fn get_config() -> GradekeyResult<&'static GradekeyConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    init_config_from(DEFAULT_CONFIG_FILE)
}

/// Initialize the global configuration from a specific file.
///
/// If the configuration was already initialized, the existing one is kept.
pub fn init_config_from(file: &str) -> GradekeyResult<&'static GradekeyConfig> {
    let config = GradekeyConfig::from_sources(file)?;
    config.validate()?;

    // Ignore if another thread beat us
    let _ = CONFIG.set(config);

    Ok(CONFIG.get().expect("config was just set"))
}

/// Initialize configuration explicitly.
///
/// Call this early in your application to catch configuration errors.
pub fn init_config() -> GradekeyResult<&'static GradekeyConfig> {
    get_config()
}
