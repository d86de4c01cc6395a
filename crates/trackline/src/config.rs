//! Workspace configuration.
//!
//! A trackline workspace is a directory containing `.trackline/config.yaml`:
//!
//! ```yaml
//! id-prefix: trk
//! storage:
//!   backend: json
//!   data-dir: .trackline/data
//! default-board: trk-0f3k...   # optional
//! ```

use crate::domain::BoardId;
use crate::error::{ConfigError, Result};
use crate::id_generation::DEFAULT_PREFIX;
use crate::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the trackline directory
pub const TRACKLINE_DIR_NAME: &str = ".trackline";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the data directory inside `.trackline/`
pub const DATA_DIR_NAME: &str = "data";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum directory depth to traverse when searching for the workspace root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TracklineConfig {
    /// Prefix for generated ids (e.g., "trk" for "trk-0f3k...")
    pub id_prefix: String,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Board used for imported tickets that name no board of their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_board: Option<BoardId>,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Storage backend type: "json" or "memory"
    pub backend: String,

    /// Data directory, relative to the workspace root
    pub data_dir: String,
}

impl StorageConfig {
    /// Resolve the configured backend against the workspace root.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownBackend` for an unrecognized backend name.
    pub fn to_backend(&self, root: &Path) -> std::result::Result<StorageBackend, ConfigError> {
        match self.backend.as_str() {
            "json" => Ok(StorageBackend::JsonFiles(root.join(&self.data_dir))),
            "memory" => Ok(StorageBackend::InMemory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

impl TracklineConfig {
    /// Create a new configuration with the given prefix
    pub fn new(prefix: &str) -> Self {
        Self {
            id_prefix: prefix.to_string(),
            storage: StorageConfig {
                backend: "json".to_string(),
                data_dir: format!("{TRACKLINE_DIR_NAME}/{DATA_DIR_NAME}"),
            },
            default_board: None,
        }
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content).map_err(ConfigError::from)?;
        validate_prefix(&config.id_prefix)?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(ConfigError::from)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for TracklineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// Validate an id prefix.
///
/// Requirements: 2-20 ASCII alphanumeric characters. Expects pre-trimmed input.
///
/// # Errors
///
/// Returns `ConfigError::InvalidPrefix` describing the violated rule.
pub fn validate_prefix(prefix: &str) -> std::result::Result<(), ConfigError> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(ConfigError::InvalidPrefix(format!(
            "must be at least {MIN_PREFIX_LENGTH} characters"
        )));
    }

    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(ConfigError::InvalidPrefix(format!(
            "cannot exceed {MAX_PREFIX_LENGTH} characters"
        )));
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidPrefix(
            "must contain only alphanumeric characters".to_string(),
        ));
    }

    Ok(())
}

/// Find the workspace root by walking up from `start`.
///
/// Returns the directory that contains `.trackline/`, or `None`.
pub fn find_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(MAX_TRAVERSAL_DEPTH)
        .find(|dir| dir.join(TRACKLINE_DIR_NAME).is_dir())
        .map(Path::to_path_buf)
}
