use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::composition::params::{CompositionParams, OFFSET_RANGE, SCALE_RANGE};
use crate::error::{ConfigError, Result};
use crate::removal::MattingParams;

/// Main configuration for pasfoto
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Initial editor placement (aspect, background, offsets, zoom)
    pub composition: CompositionParams,

    /// Built-in removal backend tuning
    pub removal: RemovalConfig,

    /// Camera preferences
    pub capture: CaptureConfig,

    /// Export settings
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            composition: CompositionParams::default(),
            removal: RemovalConfig::default(),
            capture: CaptureConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|_| ConfigError::ParseFailed {
            path: path.display().to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_composition()?;
        self.removal.validate()?;
        self.export.validate()?;
        Ok(())
    }

    fn validate_composition(&self) -> Result<()> {
        let params = &self.composition;
        for (key, value) in [
            ("composition.offset_x", params.offset_x),
            ("composition.offset_y", params.offset_y),
        ] {
            if !(OFFSET_RANGE.0..=OFFSET_RANGE.1).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                }
                .into());
            }
        }

        if !(SCALE_RANGE.0..=SCALE_RANGE.1).contains(&params.scale) {
            return Err(ConfigError::InvalidValue {
                key: "composition.scale".to_string(),
                value: params.scale.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Built-in matting backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalConfig {
    pub matting: MattingParams,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            matting: MattingParams::default(),
        }
    }
}

impl RemovalConfig {
    fn validate(&self) -> Result<()> {
        if self.matting.tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "removal.matting.tolerance".to_string(),
                value: self.matting.tolerance.to_string(),
            }
            .into());
        }
        if self.matting.feather <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "removal.matting.feather".to_string(),
                value: self.matting.feather.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Camera preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Preferred facing for the first acquire ("front" or "back")
    pub preferred_facing: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            preferred_facing: None,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// JPEG quality (1-100)
    pub quality: u8,

    /// Fixed download file name
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            file_name: "pasfoto.jpg".to_string(),
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "export.quality".to_string(),
                value: self.quality.to_string(),
            }
            .into());
        }

        if self.file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "export.file_name".to_string(),
                value: self.file_name.clone(),
            }
            .into());
        }

        Ok(())
    }
}
