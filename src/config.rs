use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::errors::{PixframeError, Result};

/// Server-side configuration, validated once at startup and immutable for
/// the process lifetime. Missing fields and out-of-range values are fatal;
/// nothing is default-filled.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub image: ImageSection,
    pub paths: PathsSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    pub port: u16,
    pub image_url: Url,
    /// Seconds between upstream refresh ticks.
    pub refresh_interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSection {
    pub target_width: u32,
    pub target_height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    pub log_file: PathBuf,
    /// Where the scaled asset is published for the device to poll.
    pub image_path: PathBuf,
    /// Where the raw upstream image lands before rescaling.
    pub source_image_path: PathBuf,
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            PixframeError::ConfigValidation(format!(
                "cannot read {}: {e}",
                path.display()
            ))
        })?;
        let config: ServerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks the field types cannot express on their own.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(PixframeError::ConfigValidation(
                "server.port must be between 1 and 65535".into(),
            ));
        }
        if self.server.refresh_interval == 0 {
            return Err(PixframeError::ConfigValidation(
                "server.refresh_interval must be positive".into(),
            ));
        }
        if self.image.target_width == 0 || self.image.target_height == 0 {
            return Err(PixframeError::ConfigValidation(
                "image dimensions must be positive".into(),
            ));
        }
        Ok(())
    }
}
