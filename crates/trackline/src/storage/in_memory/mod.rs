//! In-memory storage backend.
//!
//! All data is held in RAM and **lost when the process exits** unless it is
//! written out with [`save_to_dir`]. Collections keep insertion order, so
//! boards and tickets list in the order they were imported.
//!
//! # Persistence
//!
//! - **In-memory only**: [`new_in_memory_storage`]
//! - **With persistence**: [`load_from_dir`] reads `boards.json`,
//!   `sprints.json` and `tickets.json`; [`save_to_dir`] writes them back
//!   atomically.
//!
//! # Thread Safety
//!
//! The storage is wrapped in `Arc<Mutex<InMemoryStorageInner>>`; every
//! operation holds the lock for its whole duration, so a batch import is never
//! observed half-applied.

mod inner;
mod json;
mod trait_impl;

use crate::storage::TrackerStorage;
use inner::InMemoryStorageInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use json::{
    BOARDS_FILE_NAME, LoadWarning, SPRINTS_FILE_NAME, TICKETS_FILE_NAME, load_from_dir,
    save_to_dir,
};

/// Thread-safe in-memory storage.
pub(crate) type InMemoryStorage = Arc<Mutex<InMemoryStorageInner>>;

/// Create a new, empty in-memory storage instance.
///
/// # Example
///
/// ```
/// use trackline::storage::in_memory::new_in_memory_storage;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let storage = new_in_memory_storage();
///     assert!(storage.list_boards().await.unwrap().is_empty());
/// }
/// ```
pub fn new_in_memory_storage() -> Box<dyn TrackerStorage> {
    Box::new(Arc::new(Mutex::new(InMemoryStorageInner::default())))
}
