use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{KinotakeError, Result as KinotakeResult};
use crate::sensor::RawRange;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rotated log files (console only when unset)
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Report raw scores and softmax probabilities with each prediction
    #[serde(default)]
    pub include_scores: bool,
    /// Print results as JSON instead of text/tables
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SensorConfig {
    /// Lowest expected raw reading
    #[serde(default = "default_min_raw")]
    pub min_raw: f32,
    /// Highest expected raw reading (10-bit ADC full scale)
    #[serde(default = "default_max_raw")]
    pub max_raw: f32,
}

fn default_min_raw() -> f32 {
    0.0
}

fn default_max_raw() -> f32 {
    1023.0
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            min_raw: default_min_raw(),
            max_raw: default_max_raw(),
        }
    }
}

impl SensorConfig {
    pub fn raw_range(&self) -> RawRange {
        RawRange {
            min: self.min_raw,
            max: self.max_raw,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("output.include_scores", false)?
            .set_default("output.json", false)?
            .set_default("sensor.min_raw", 0.0)?
            .set_default("sensor.max_raw", 1023.0)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("KINOTAKE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (KINOTAKE__LOGGING__LEVEL, etc.)
            .add_source(
                Environment::with_prefix("KINOTAKE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Load from `config_dir` and reject invalid values
    pub fn load_validated<P: AsRef<Path>>(config_dir: P) -> KinotakeResult<Self> {
        let cfg = Self::load_from(config_dir)?;
        cfg.validate().map_err(|errors| {
            KinotakeError::Validation(format!("invalid configuration: {}", errors.join("; ")))
        })?;
        Ok(cfg)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            errors.push(format!(
                "logging.level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.logging.level
            ));
        }

        if !self.sensor.min_raw.is_finite() || !self.sensor.max_raw.is_finite() {
            errors.push("sensor.min_raw and sensor.max_raw must be finite".to_string());
        } else if self.sensor.min_raw >= self.sensor.max_raw {
            errors.push(format!(
                "sensor.min_raw ({}) must be below sensor.max_raw ({})",
                self.sensor.min_raw, self.sensor.max_raw
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
