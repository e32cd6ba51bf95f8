//! Service configuration file.
//!
//! YAML (`.yaml`, `.yml`) or JSON (`.json`), chosen by extension. Every
//! section has defaults, so an empty document is a valid configuration.

use std::path::Path;

use handpad_actions::Layout;
use handpad_controller::ControllerConfig;
use handpad_errors::ValidationError;
use handpad_scheduler::TickConfig;
use handpad_targets::TargetKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported config format '{0}', expected .yaml, .yml or .json")]
    UnsupportedFormat(String),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat(extension)),
        }
    }
}

/// Identity to look up in the device registry instead of the strings the
/// firmware reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceOverride {
    pub manufacturer: String,
    pub product: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServiceConfig {
    pub tick: TickConfig,
    /// Virtual controller presented to games.
    pub target: TargetKind,
    pub device: Option<DeviceOverride>,
    pub controller: ControllerConfig,
    /// `None` runs the target's default layout.
    pub layout: Option<Layout>,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.tick.validate()?;
        self.controller.validate()?;
        if let Some(device) = &self.device {
            if device.manufacturer.trim().is_empty() {
                return Err(ValidationError::required("device.manufacturer"));
            }
            if device.product.trim().is_empty() {
                return Err(ValidationError::required("device.product"));
            }
        }
        if let Some(layout) = &self.layout {
            layout.validate()?;
        }
        Ok(())
    }

    /// The configured layout, or the target's default.
    pub fn effective_layout(&self) -> Layout {
        self.layout
            .clone()
            .unwrap_or_else(|| self.target.default_layout())
    }

    /// Parse and validate a document.
    ///
    /// # Errors
    ///
    /// Syntax errors, unknown fields and failed validation.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config: ServiceConfig = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate the file at `path`.
    ///
    /// # Errors
    ///
    /// See [`ServiceConfig::parse`]; also unreadable files and unknown
    /// extensions.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content, format)?;
        debug!(path = %path.display(), "loaded service config");
        Ok(config)
    }

    /// Render in `format`.
    ///
    /// # Errors
    ///
    /// Serialization failures from the format crate.
    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }
}
