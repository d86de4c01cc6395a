//! Implementation of the `init` command.
//!
//! Creates the `.trackline/` directory with a configuration file, an empty
//! data directory and a `.gitignore`.

use crate::config::{
    CONFIG_FILE_NAME, DATA_DIR_NAME, TRACKLINE_DIR_NAME, TracklineConfig, validate_prefix,
};
use crate::error::{ConfigError, Result};
use crate::id_generation::DEFAULT_PREFIX;
use crate::storage::in_memory::{BOARDS_FILE_NAME, SPRINTS_FILE_NAME, TICKETS_FILE_NAME};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the gitignore file within .trackline
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

const GITIGNORE_CONTENT: &str = "\
# Temporary files left behind by an interrupted save
*.tmp
";

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created `.trackline` directory
    pub trackline_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created data directory
    pub data_dir: PathBuf,
    /// The prefix used for generated ids
    pub prefix: String,
}

/// Initialize a new trackline workspace in `base_dir`.
///
/// The prefix is trimmed before validation and defaults to `trk`.
///
/// # Errors
///
/// Returns an error if:
/// - The `.trackline/` directory already exists
/// - The prefix is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, prefix: Option<&str>) -> Result<InitResult> {
    let prefix = prefix.unwrap_or(DEFAULT_PREFIX).trim();
    validate_prefix(prefix)?;

    let trackline_dir = base_dir.join(TRACKLINE_DIR_NAME);
    if trackline_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(TRACKLINE_DIR_NAME.to_string()).into());
    }

    let data_dir = trackline_dir.join(DATA_DIR_NAME);
    fs::create_dir_all(&data_dir).await?;

    let config_file = trackline_dir.join(CONFIG_FILE_NAME);
    TracklineConfig::new(prefix).save(&config_file).await?;

    for file in [BOARDS_FILE_NAME, SPRINTS_FILE_NAME, TICKETS_FILE_NAME] {
        fs::write(data_dir.join(file), "[]\n").await?;
    }

    fs::write(trackline_dir.join(GITIGNORE_FILE_NAME), GITIGNORE_CONTENT).await?;

    tracing::debug!(dir = %trackline_dir.display(), prefix, "Initialized workspace");

    Ok(InitResult {
        trackline_dir,
        config_file,
        data_dir,
        prefix: prefix.to_string(),
    })
}

/// Check if a directory has been initialized with trackline.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TRACKLINE_DIR_NAME).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_directory_structure() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), None).await.unwrap();

        assert!(result.config_file.exists());
        assert!(result.trackline_dir.join(GITIGNORE_FILE_NAME).exists());
        for file in [BOARDS_FILE_NAME, SPRINTS_FILE_NAME, TICKETS_FILE_NAME] {
            let content = std::fs::read_to_string(result.data_dir.join(file)).unwrap();
            assert_eq!(content.trim(), "[]");
        }
        assert!(is_initialized(temp_dir.path()));
    }

    #[tokio::test]
    async fn test_init_trims_and_stores_prefix() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), Some("  web  ")).await.unwrap();
        assert_eq!(result.prefix, "web");

        let config = TracklineConfig::load(&result.config_file).await.unwrap();
        assert_eq!(config.id_prefix, "web");
    }

    #[tokio::test]
    async fn test_init_with_default_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let result = init(temp_dir.path(), None).await.unwrap();
        assert_eq!(result.prefix, DEFAULT_PREFIX);
    }

    #[tokio::test]
    async fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), None).await.unwrap();

        let err = init(temp_dir.path(), None).await.unwrap_err();
        assert!(err.to_string().contains("already initialized"));
    }

    #[tokio::test]
    async fn test_init_fails_with_invalid_prefix() {
        let temp_dir = TempDir::new().unwrap();

        let err = init(temp_dir.path(), Some("a")).await.unwrap_err();
        assert!(err.to_string().contains("at least 2"));
        assert!(!is_initialized(temp_dir.path()));
    }
}
