#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for pkgbridge
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/pkgbridge/config.toml)
//! - Environment variables

pub mod constants;

use pkgbridge_errors::{ConfigError, Error};
use pkgbridge_types::Authority;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub throttle: ThrottleConfig,

    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub commit: CommitConfig,
}

/// Progress throttling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    #[serde(default = "default_step_percent")]
    pub step_percent: u32,
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64, // seconds
}

/// Selection behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Authority used for application-initiated selection changes
    #[serde(default = "default_authority")]
    pub authority: Authority,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_target_root")]
    pub target_root: PathBuf,
    #[serde(default = "default_badlist")]
    pub badlist: PathBuf,
    #[serde(default = "default_products_dir")]
    pub products_dir: PathBuf,
}

/// Commit side effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitConfig {
    #[serde(default = "default_refresh_base_product_link")]
    pub refresh_base_product_link: bool,
}

// Default implementations

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            step_percent: constants::DEFAULT_THROTTLE_STEP,
            heartbeat_secs: constants::DEFAULT_THROTTLE_HEARTBEAT_SECS,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            authority: Authority::ApplicationHigh,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            target_root: default_target_root(),
            badlist: default_badlist(),
            products_dir: default_products_dir(),
        }
    }
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            refresh_base_product_link: true,
        }
    }
}

// Default value functions for serde
fn default_step_percent() -> u32 {
    constants::DEFAULT_THROTTLE_STEP
}

fn default_heartbeat_secs() -> u64 {
    constants::DEFAULT_THROTTLE_HEARTBEAT_SECS
}

fn default_authority() -> Authority {
    Authority::ApplicationHigh
}

fn default_target_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_badlist() -> PathBuf {
    PathBuf::from(constants::DEFAULT_BADLIST)
}

fn default_products_dir() -> PathBuf {
    PathBuf::from(constants::PRODUCTS_DIR)
}

fn default_refresh_base_product_link() -> bool {
    true
}

impl ThrottleConfig {
    /// Heartbeat as a duration
    #[must_use]
    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("pkgbridge").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if fs::try_exists(&config_path).await.unwrap_or(false) {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(root) = std::env::var(constants::ENV_TARGET_ROOT) {
            if root.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: constants::ENV_TARGET_ROOT.to_string(),
                    value: root,
                }
                .into());
            }
            self.paths.target_root = PathBuf::from(root);
        }

        if let Ok(badlist) = std::env::var(constants::ENV_BADLIST) {
            self.paths.badlist = PathBuf::from(badlist);
        }

        if let Ok(authority) = std::env::var(constants::ENV_AUTHORITY) {
            self.selection.authority =
                authority.parse().map_err(|_| ConfigError::InvalidValue {
                    field: constants::ENV_AUTHORITY.to_string(),
                    value: authority.clone(),
                })?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.throttle.step_percent == 0 || self.throttle.step_percent > 100 {
            return Err(ConfigError::InvalidValue {
                field: "throttle.step_percent".to_string(),
                value: self.throttle.step_percent.to_string(),
            });
        }
        if self.paths.products_dir.is_absolute() {
            return Err(ConfigError::InvalidValue {
                field: "paths.products_dir".to_string(),
                value: self.paths.products_dir.display().to_string(),
            });
        }
        Ok(())
    }

    /// Directory holding product descriptors on the target
    #[must_use]
    pub fn products_path(&self) -> PathBuf {
        self.paths.target_root.join(&self.paths.products_dir)
    }

    /// Location of the base product link on the target
    #[must_use]
    pub fn baseproduct_link_path(&self) -> PathBuf {
        self.products_path().join(constants::BASEPRODUCT_LINK)
    }
}
