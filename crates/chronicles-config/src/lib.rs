//! Loads `~/.config/chronicles/config.toml`.
//!
//! The file is optional and so is every key in it:
//!
//! ```toml
//! [markdown]
//! asset_scheme = "chronicles://"
//! video_extensions = ["mp4", "webm"]
//! max_heading_depth = 3
//! ```

use chronicles_engine::transform::{
    DEFAULT_ASSET_SCHEME, DEFAULT_MAX_HEADING_DEPTH, TransformOptions, VIDEO_EXTENSIONS,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub markdown: MarkdownSettings,
}

/// The `[markdown]` table: how notes convert to and from the editor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkdownSettings {
    pub asset_scheme: String,
    pub video_extensions: Vec<String>,
    pub max_heading_depth: u8,
}

impl Default for MarkdownSettings {
    fn default() -> Self {
        Self {
            asset_scheme: DEFAULT_ASSET_SCHEME.to_string(),
            video_extensions: VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_heading_depth: DEFAULT_MAX_HEADING_DEPTH,
        }
    }
}

impl MarkdownSettings {
    /// Extensions lose a leading dot and are lowercased; the heading depth
    /// is clamped to 1..=6.
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            asset_scheme: self.asset_scheme.clone(),
            video_extensions: self
                .video_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            max_heading_depth: self.max_heading_depth.clamp(1, 6),
        }
    }
}

impl Config {
    /// `Ok(None)` when there is no file at `config_path`.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/chronicles");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }
}
