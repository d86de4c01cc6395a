//! Storage abstraction layer for trackline.
//!
//! This module provides the core storage trait and factory for creating
//! storage backends:
//!
//! - **In-memory**: ephemeral storage for tests and one-off sessions
//! - **JSON files**: the in-memory store persisted as `boards.json`,
//!   `sprints.json` and `tickets.json`, one JSON array per collection
//!
//! The store is insert-only with respect to imports: [`TrackerStorage::import_batch`]
//! merges a reconciled [`ImportBatch`] without ever overwriting an existing
//! entity.
//!
//! # Example
//!
//! ```no_run
//! use trackline::import::reconcile;
//! use trackline::storage::{StorageBackend, create_storage};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut storage = create_storage(StorageBackend::InMemory).await?;
//!
//!     let batch = reconcile(r#"{"boards": [{"name": "Web", "tickets": [{}]}]}"#, None)?;
//!     let stats = storage.import_batch(&batch).await?;
//!     println!("Imported {} tickets", stats.tickets);
//!
//!     Ok(())
//! }
//! ```

use crate::domain::{Board, BoardId, Sprint, Ticket, TicketFilter, TicketId};
use crate::error::Result;
use crate::import::{ImportBatch, ImportStats};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod in_memory;

/// Everything a store holds, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All boards
    pub boards: Vec<Board>,
    /// All sprints
    pub sprints: Vec<Sprint>,
    /// All tickets
    pub tickets: Vec<Ticket>,
}

impl Snapshot {
    /// Every id held in the snapshot, across all entity kinds.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.boards
            .iter()
            .map(|b| b.id.as_str())
            .chain(self.sprints.iter().map(|s| s.id.as_str()))
            .chain(self.tickets.iter().map(|t| t.id.as_str()))
    }
}

/// Core storage trait for boards, sprints and tickets.
///
/// Implementations must be `Send + Sync` to support async contexts.
///
/// # Method Categories
///
/// - **Batch import**: `import_batch`
/// - **Boards**: `get_board`, `list_boards`, `delete_board`
/// - **Sprints**: `list_sprints`
/// - **Tickets**: `get_ticket`, `list_tickets`, `delete_ticket`
/// - **Snapshots**: `known_ids`, `export_all`
/// - **Persistence**: `save`, `reload`
#[async_trait]
pub trait TrackerStorage: Send + Sync {
    // ========== Batch Import ==========

    /// Merge a reconciled import batch.
    ///
    /// The merge is insert-only and all-or-nothing: if any id in the batch is
    /// already stored (or repeats inside the batch) nothing is inserted.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateId` naming the first clashing id.
    async fn import_batch(&mut self, batch: &ImportBatch) -> Result<ImportStats>;

    // ========== Boards ==========

    /// Get a board by ID. Returns `None` if it doesn't exist.
    async fn get_board(&self, id: &BoardId) -> Result<Option<Board>>;

    /// List all boards.
    async fn list_boards(&self) -> Result<Vec<Board>>;

    /// Delete a board together with its sprints and tickets.
    ///
    /// Tickets on other boards whose parent was removed lose their parent link.
    ///
    /// # Errors
    ///
    /// Returns `Error::BoardNotFound` if the board doesn't exist.
    async fn delete_board(&mut self, id: &BoardId) -> Result<()>;

    // ========== Sprints ==========

    /// List sprints, optionally only those of one board.
    async fn list_sprints(&self, board_id: Option<&BoardId>) -> Result<Vec<Sprint>>;

    // ========== Tickets ==========

    /// Get a ticket by ID. Returns `None` if it doesn't exist.
    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>>;

    /// List tickets matching the filter.
    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>>;

    /// Delete a ticket. Its children lose their parent link.
    ///
    /// # Errors
    ///
    /// Returns `Error::TicketNotFound` if the ticket doesn't exist.
    async fn delete_ticket(&mut self, id: &TicketId) -> Result<()>;

    // ========== Snapshots ==========

    /// Every stored id, for registering with an id generator.
    async fn known_ids(&self) -> Result<Vec<String>>;

    /// Copy of everything in the store.
    async fn export_all(&self) -> Result<Snapshot>;

    // ========== Persistence ==========

    /// Save changes to persistent storage. A no-op for the in-memory backend.
    async fn save(&self) -> Result<()>;

    /// Reload state from persistent storage, discarding unsaved changes.
    async fn reload(&mut self) -> Result<()>;
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSON files in the given directory (persistent)
    JsonFiles(PathBuf),
}

impl StorageBackend {
    /// Returns the data directory for file-based backends.
    pub fn data_dir(&self) -> Option<&Path> {
        match self {
            StorageBackend::JsonFiles(dir) => Some(dir),
            StorageBackend::InMemory => None,
        }
    }
}

/// Wrapper that adds JSON file persistence to the in-memory backend.
struct JsonBackedStorage {
    inner: Box<dyn TrackerStorage>,
    dir: PathBuf,
}

#[async_trait]
impl TrackerStorage for JsonBackedStorage {
    async fn import_batch(&mut self, batch: &ImportBatch) -> Result<ImportStats> {
        self.inner.import_batch(batch).await
    }

    async fn get_board(&self, id: &BoardId) -> Result<Option<Board>> {
        self.inner.get_board(id).await
    }

    async fn list_boards(&self) -> Result<Vec<Board>> {
        self.inner.list_boards().await
    }

    async fn delete_board(&mut self, id: &BoardId) -> Result<()> {
        self.inner.delete_board(id).await
    }

    async fn list_sprints(&self, board_id: Option<&BoardId>) -> Result<Vec<Sprint>> {
        self.inner.list_sprints(board_id).await
    }

    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        self.inner.get_ticket(id).await
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        self.inner.list_tickets(filter).await
    }

    async fn delete_ticket(&mut self, id: &TicketId) -> Result<()> {
        self.inner.delete_ticket(id).await
    }

    async fn known_ids(&self) -> Result<Vec<String>> {
        self.inner.known_ids().await
    }

    async fn export_all(&self) -> Result<Snapshot> {
        self.inner.export_all().await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_dir(self.inner.as_ref(), &self.dir).await
    }

    async fn reload(&mut self) -> Result<()> {
        self.inner = load_or_empty(&self.dir).await?;
        Ok(())
    }
}

/// Load the directory if it exists, logging load warnings.
async fn load_or_empty(dir: &Path) -> Result<Box<dyn TrackerStorage>> {
    if !dir.exists() {
        return Ok(in_memory::new_in_memory_storage());
    }

    let (storage, warnings) = in_memory::load_from_dir(dir).await?;
    for warning in &warnings {
        tracing::warn!(%warning, "Data file load warning");
    }
    Ok(storage)
}

/// Create a storage instance for the given backend.
///
/// # Errors
///
/// - `Error::Io` if the data files cannot be read
/// - `Error::Storage` if a data file is not a JSON array
pub async fn create_storage(backend: StorageBackend) -> Result<Box<dyn TrackerStorage>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_storage()),
        StorageBackend::JsonFiles(dir) => {
            let inner = load_or_empty(&dir).await?;
            Ok(Box::new(JsonBackedStorage { inner, dir }))
        }
    }
}
