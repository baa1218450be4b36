//! Configuration module for snap-cli.
//!
//! Loads merchant profiles from a JSON (or TOML, by extension) file and
//! converts them into [`MerchantIdentity`] values for the SDK.

pub mod file;

use crate::config::file::{FileConfig, SnapProfile};
use snap_sdk::config::MerchantIdentity;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("failed to parse config file: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("config file is empty")]
    Empty,

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("no profile with id {0:?}")]
    UnknownProfile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

/// Reads and rewrites the profile file.
pub struct ConfigLoader {
    config_path: PathBuf,
    format: Format,
}

impl ConfigLoader {
    /// Create a new config loader. Files ending in `.toml` are read as TOML,
    /// everything else as JSON.
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        let config_path = config_path.as_ref().to_path_buf();
        let format = match config_path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Json,
        };
        Self {
            config_path,
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate the profile file.
    ///
    /// A missing file is an empty profile list; an existing but empty file
    /// is an error.
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        if !self.config_path.exists() {
            tracing::debug!(path = ?self.config_path, "config file not found, no profiles");
            return Ok(FileConfig::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        if content.trim().is_empty() {
            return Err(ConfigError::Empty);
        }

        let config: FileConfig = match self.format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        validate(&config)?;
        Ok(config)
    }

    /// Append a profile and rewrite the file.
    pub fn add_profile(&self, profile: SnapProfile) -> Result<(), ConfigError> {
        let mut config = self.load()?;
        config.snap.push(profile);
        validate(&config)?;
        self.rewrite_config(&config)?;
        tracing::info!(path = ?self.config_path, profiles = config.snap.len(), "config file updated");
        Ok(())
    }

    /// Look up a profile and convert it into a merchant identity.
    pub fn identity(&self, profile_id: &str) -> Result<MerchantIdentity, ConfigError> {
        let config = self.load()?;
        let profile = config
            .find(profile_id)
            .ok_or_else(|| ConfigError::UnknownProfile(profile_id.to_owned()))?;
        to_identity(profile)
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let content = match self.format {
            Format::Json => serde_json::to_string_pretty(config)?,
            Format::Toml => toml::to_string_pretty(config)?,
        };

        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write atomically: write to temp file, then rename
        let temp_path = self.config_path.with_extension("tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for profile in &config.snap {
        if profile.id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "profile id must not be empty".to_owned(),
            ));
        }
        if !seen.insert(profile.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate profile id {:?}",
                profile.id
            )));
        }
        if profile.merchant_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile {:?} has no merchantID",
                profile.id
            )));
        }
        Url::parse(&profile.base_url).map_err(|e| {
            ConfigError::ValidationError(format!(
                "profile {:?} has an invalid baseURL: {e}",
                profile.id
            ))
        })?;
    }
    Ok(())
}

fn to_identity(profile: &SnapProfile) -> Result<MerchantIdentity, ConfigError> {
    let base_url = Url::parse(&profile.base_url).map_err(|e| {
        ConfigError::ValidationError(format!(
            "profile {:?} has an invalid baseURL: {e}",
            profile.id
        ))
    })?;
    Ok(MerchantIdentity::new(
        profile.merchant_id.clone(),
        base_url,
        profile.private_key.clone(),
        profile.secret_key.clone(),
    ))
}
