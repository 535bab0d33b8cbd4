//! Editor configuration loaded from `~/.config/pdfedit/config.toml`.
//!
//! ```toml
//! scale = 1.5
//! endpoint = "http://127.0.0.1:5000/edit-pdf"
//! timeout_secs = 60
//! download_prefix = "edited-"
//! ```
//!
//! Every key is optional. `PDFEDIT_ENDPOINT` overrides `endpoint`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCALE: f64 = 1.5;
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/edit-pdf";
pub const ENDPOINT_ENV: &str = "PDFEDIT_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Magnification applied to every page viewport.
    pub scale: f64,
    /// URL of the rewriting service's `edit-pdf` route.
    pub endpoint: String,
    /// Overall request timeout for a submission.
    pub timeout_secs: u64,
    /// Prefix added to the original file name for the edited download.
    pub download_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60,
            download_prefix: "edited-".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load from the default location, then apply the environment override.
    ///
    /// A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_path())?;
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                config.endpoint = endpoint;
            }
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        anyhow::ensure!(
            config.scale.is_finite() && config.scale > 0.0,
            "scale must be a positive number, got {}",
            config.scale
        );
        Ok(config)
    }
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdfedit")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config = EditorConfig::parse("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.scale, 1.5);
        assert_eq!(config.endpoint, "http://127.0.0.1:5000/edit-pdf");
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = EditorConfig::parse("endpoint = \"https://rewrite.example/edit-pdf\"\n").unwrap();
        assert_eq!(config.endpoint, "https://rewrite.example/edit-pdf");
        assert_eq!(config.scale, DEFAULT_SCALE);
        assert_eq!(config.download_prefix, "edited-");
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(EditorConfig::parse("scale = 0.0").is_err());
        assert!(EditorConfig::parse("scale = -2.0").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let path = std::env::temp_dir().join("pdfedit-no-such-dir/config.toml");
        assert_eq!(EditorConfig::load_from(&path).unwrap(), EditorConfig::default());
    }

    #[test]
    fn config_path_ends_with_app_dir() {
        assert!(config_path().ends_with("pdfedit/config.toml"));
    }
}
