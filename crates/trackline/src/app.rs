//! Application context for CLI command execution.
//!
//! # Example
//!
//! ```no_run
//! use trackline::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     println!("{} boards", app.storage().list_boards().await?.len());
//!     Ok(())
//! }
//! ```

use crate::config::{CONFIG_FILE_NAME, TRACKLINE_DIR_NAME, TracklineConfig, find_root};
use crate::error::{ConfigError, Result};
use crate::id_generation::{IdGenerator, IdGeneratorConfig};
use crate::storage::{StorageBackend, TrackerStorage, create_storage};
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
///
/// Owns the storage backend loaded from the workspace's configuration.
pub struct App {
    storage: Box<dyn TrackerStorage>,
    root_dir: PathBuf,
    backend: StorageBackend,
    config: TracklineConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("root_dir", &self.root_dir)
            .field("backend", &self.backend)
            .field("config", &self.config)
            .field("storage", &"<dyn TrackerStorage>")
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App from the given working directory.
    ///
    /// Searches up the directory tree for `.trackline/`, loads its
    /// configuration, and opens the configured storage.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No workspace is found in the directory tree
    /// - Configuration cannot be loaded
    /// - Storage initialization fails
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_root(working_dir).ok_or(ConfigError::NotInitialized)?;
        let config_path = root_dir.join(TRACKLINE_DIR_NAME).join(CONFIG_FILE_NAME);
        let config = TracklineConfig::load(&config_path).await?;

        let backend = config.storage.to_backend(&root_dir)?;
        let storage = create_storage(backend.clone()).await?;
        tracing::debug!(root = %root_dir.display(), ?backend, "Opened workspace");

        Ok(Self {
            storage,
            root_dir,
            backend,
            config,
        })
    }

    /// Get an immutable reference to the storage.
    pub fn storage(&self) -> &dyn TrackerStorage {
        self.storage.as_ref()
    }

    /// Get a mutable reference to the storage.
    pub fn storage_mut(&mut self) -> &mut dyn TrackerStorage {
        self.storage.as_mut()
    }

    /// The loaded workspace configuration.
    pub fn config(&self) -> &TracklineConfig {
        &self.config
    }

    /// The directory containing `.trackline/`.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// The storage backend in use.
    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    /// An id generator using the configured prefix that will never produce an
    /// id already present in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored ids cannot be read.
    pub async fn id_generator(&self) -> Result<IdGenerator> {
        let mut generator = IdGenerator::new(IdGeneratorConfig {
            prefix: self.config.id_prefix.clone(),
        });
        generator.register_ids(self.storage.known_ids().await?);
        Ok(generator)
    }

    /// Save storage state to persistent storage.
    ///
    /// This should be called after any mutating operation.
    pub async fn save(&self) -> Result<()> {
        self.storage.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init;
    use crate::import::reconcile;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_app_from_initialized_directory() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), Some("web")).await.unwrap();

        let app = App::from_directory(temp_dir.path()).await.unwrap();

        assert_eq!(app.config().id_prefix, "web");
        assert_eq!(
            app.backend().data_dir(),
            Some(temp_dir.path().join(".trackline/data").as_path())
        );
        assert!(app.storage().list_boards().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_app_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), None).await.unwrap();

        let sub_dir = temp_dir.path().join("src").join("lib");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let app = App::from_directory(&sub_dir).await.unwrap();
        assert_eq!(app.root_dir(), temp_dir.path());
    }

    #[tokio::test]
    async fn test_app_from_uninitialized_directory() {
        let temp_dir = TempDir::new().unwrap();

        let err = App::from_directory(temp_dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Not a trackline workspace"));
    }

    #[tokio::test]
    async fn test_id_generator_knows_stored_ids() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), Some("web")).await.unwrap();
        let mut app = App::from_directory(temp_dir.path()).await.unwrap();

        let batch = reconcile(r#"{"boards": [{"sprints": [{}], "tickets": [{}]}]}"#, None).unwrap();
        app.storage_mut().import_batch(&batch).await.unwrap();

        let generator = app.id_generator().await.unwrap();
        assert_eq!(generator.prefix(), "web");
        assert_eq!(generator.known_ids(), 3);
    }

    #[tokio::test]
    async fn test_save_persists_to_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), None).await.unwrap();

        let mut app = App::from_directory(temp_dir.path()).await.unwrap();
        let batch = reconcile(r#"{"boards": [{"name": "Web"}]}"#, None).unwrap();
        app.storage_mut().import_batch(&batch).await.unwrap();
        app.save().await.unwrap();

        let reopened = App::from_directory(temp_dir.path()).await.unwrap();
        let boards = reopened.storage().list_boards().await.unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].name, "Web");
    }
}
