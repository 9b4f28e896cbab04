//! Configuration management for comment-tree

use crate::error::{CommentTreeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Score below which a comment is removed for signed-in viewers
pub const DEFAULT_SUPPRESSION_THRESHOLD: i64 = -400;

/// Score below which a comment carries the low quality marker
pub const DEFAULT_LOW_QUALITY_THRESHOLD: i64 = -75;

/// Thread size up to which comments render inline
pub const MIN_COMMENTS_TO_RENDER: usize = 8;

/// Upper bound on root comments rendered in a single pass
pub const MAX_COMMENTS_TO_RENDER: usize = 250;

/// Root comment limit for podcast episode threads
pub const PODCAST_COMMENTS_TO_RENDER: usize = 12;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Score thresholds
    pub visibility: VisibilityConfig,
    /// Render counts
    pub pagination: PaginationConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CommentTreeError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration from a file if given, otherwise the default
    /// location, falling back to built-in defaults when nothing exists
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Write configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        debug!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Render configuration as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Default configuration file location
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "forem", "comment-tree")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".comment-tree")
                    .join("config.toml")
            })
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        let v = &self.visibility;
        if v.low_quality_threshold <= v.suppression_threshold {
            return Err(CommentTreeError::Config(format!(
                "low_quality_threshold ({}) must be greater than suppression_threshold ({})",
                v.low_quality_threshold, v.suppression_threshold
            )));
        }

        let p = &self.pagination;
        if p.min_comments == 0 {
            return Err(CommentTreeError::Config(
                "min_comments must be at least 1".to_string(),
            ));
        }
        if p.max_comments < p.min_comments {
            return Err(CommentTreeError::Config(format!(
                "max_comments ({}) must not be less than min_comments ({})",
                p.max_comments, p.min_comments
            )));
        }
        if p.podcast_limit == 0 {
            return Err(CommentTreeError::Config(
                "podcast_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Score thresholds used to classify comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Comments scoring below this are removed (spam tier)
    pub suppression_threshold: i64,
    /// Comments scoring below this are marked low quality
    pub low_quality_threshold: i64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            suppression_threshold: DEFAULT_SUPPRESSION_THRESHOLD,
            low_quality_threshold: DEFAULT_LOW_QUALITY_THRESHOLD,
        }
    }
}

/// Render count configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Threads up to this size render inline without "view all"
    pub min_comments: usize,
    /// Maximum root comments rendered in one pass
    pub max_comments: usize,
    /// Root comment limit for podcast episodes
    pub podcast_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            min_comments: MIN_COMMENTS_TO_RENDER,
            max_comments: MAX_COMMENTS_TO_RENDER,
            podcast_limit: PODCAST_COMMENTS_TO_RENDER,
        }
    }
}
