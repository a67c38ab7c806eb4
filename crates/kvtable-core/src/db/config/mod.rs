
use crate::error::InternalError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Default cache budget, in cost units (one unit per cached record).
pub const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Default length of the random token embedded in sharded index keys.
pub const DEFAULT_SHARD_TOKEN_LEN: usize = 4;

/// Longest accepted shard token.
pub const MAX_SHARD_TOKEN_LEN: usize = 32;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid store config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid store config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::config_unsupported(err.to_string())
    }
}

///
/// StorageMode
/// Where table stores keep their rows.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case", deny_unknown_fields)]
pub enum StorageMode {
    /// Pure in-memory sorted stores; nothing touches disk.
    #[default]
    Memory,

    /// One pair of redb files per table under `path`.
    Directory { path: PathBuf },
}

///
/// StoreConfig
///
/// Process-level store settings, consumed once by `StoreFactory::new`.
///
/// ```toml
/// cache_capacity = 500
///
/// [storage]
/// mode = "directory"
/// path = "/var/lib/app/tables"
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub storage: StorageMode,
    pub cache_capacity: u64,
    pub shard_token_len: usize,
}

impl StoreConfig {
    /// In-memory config with default cache and shard settings.
    #[must_use]
    pub fn memory() -> Self {
        Self::default()
    }

    /// Directory-backed config with default cache and shard settings.
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageMode::Directory { path: path.into() },
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    #[must_use]
    pub const fn with_shard_token_len(mut self, len: usize) -> Self {
        self.shard_token_len = len;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SHARD_TOKEN_LEN).contains(&self.shard_token_len) {
            return Err(ConfigError::Invalid(format!(
                "shard_token_len must be between 1 and {MAX_SHARD_TOKEN_LEN}, got {}",
                self.shard_token_len
            )));
        }

        if let StorageMode::Directory { path } = &self.storage
            && path.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "directory storage requires a non-empty path".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage: StorageMode::Memory,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            shard_token_len: DEFAULT_SHARD_TOKEN_LEN,
        }
    }
}
