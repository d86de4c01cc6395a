//! JSON file persistence for in-memory storage.
//!
//! Each collection lives in its own file holding a JSON array: the same
//! shapes the import reconciler emits, so a data directory can be inspected
//! or edited by hand.

use super::inner::InMemoryStorageInner;
use crate::domain::{SprintId, TicketId};
use crate::error::{Error, Result, StorageError};
use crate::storage::TrackerStorage;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Name of the boards data file
pub const BOARDS_FILE_NAME: &str = "boards.json";

/// Name of the sprints data file
pub const SPRINTS_FILE_NAME: &str = "sprints.json";

/// Name of the tickets data file
pub const TICKETS_FILE_NAME: &str = "tickets.json";

/// Non-fatal problems found while loading data files.
///
/// Loading continues past these; the affected data is skipped or repaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// An array element could not be deserialized and was skipped.
    InvalidEntry {
        /// File the entry came from
        file: &'static str,
        /// 0-based position in the array
        index: usize,
        /// Deserialization error
        error: String,
    },

    /// An id appeared more than once; later occurrences were skipped.
    DuplicateId {
        /// The repeated id
        id: String,
    },

    /// A ticket's parent is not in the data; the parent link was cleared.
    OrphanedParent {
        /// The child ticket
        ticket: TicketId,
        /// The missing parent
        parent: TicketId,
    },

    /// A ticket's sprint is not in the data; the sprint link was cleared.
    OrphanedSprint {
        /// The ticket
        ticket: TicketId,
        /// The missing sprint
        sprint: SprintId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEntry { file, index, error } => {
                write!(f, "{file}[{index}]: skipped invalid entry: {error}")
            }
            Self::DuplicateId { id } => write!(f, "skipped duplicate id {id}"),
            Self::OrphanedParent { ticket, parent } => {
                write!(f, "ticket {ticket}: parent {parent} missing, link cleared")
            }
            Self::OrphanedSprint { ticket, sprint } => {
                write!(f, "ticket {ticket}: sprint {sprint} missing, link cleared")
            }
        }
    }
}

/// Load storage from a data directory.
///
/// Missing files are treated as empty collections, as is an empty file.
///
/// # Errors
///
/// Returns `Error::Io` if a file cannot be read and `Error::Storage` if a
/// file is not a JSON array.
pub async fn load_from_dir(dir: &Path) -> Result<(Box<dyn TrackerStorage>, Vec<LoadWarning>)> {
    let mut warnings = Vec::new();

    let boards = read_collection(dir, BOARDS_FILE_NAME, &mut warnings).await?;
    let sprints = read_collection(dir, SPRINTS_FILE_NAME, &mut warnings).await?;
    let tickets = read_collection(dir, TICKETS_FILE_NAME, &mut warnings).await?;

    let mut inner = InMemoryStorageInner::default();
    for id in inner.insert_loaded(boards, sprints, tickets) {
        warnings.push(LoadWarning::DuplicateId { id });
    }
    for (ticket, parent) in inner.orphan_dangling_parents() {
        warnings.push(LoadWarning::OrphanedParent { ticket, parent });
    }
    for (ticket, sprint) in inner.orphan_dangling_sprints() {
        warnings.push(LoadWarning::OrphanedSprint { ticket, sprint });
    }

    Ok((Box::new(Arc::new(Mutex::new(inner))), warnings))
}

async fn read_collection<T>(
    dir: &Path,
    file: &'static str,
    warnings: &mut Vec<LoadWarning>,
) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let path = dir.join(file);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&path).await?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let invalid = |reason: String| StorageError::InvalidFormat {
        path: path.display().to_string(),
        reason,
    };
    let value: Value = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    let Value::Array(entries) = value else {
        return Err(invalid("expected a JSON array".to_string()).into());
    };

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value(entry) {
            Ok(item) => items.push(item),
            Err(e) => warnings.push(LoadWarning::InvalidEntry {
                file,
                index,
                error: e.to_string(),
            }),
        }
    }
    Ok(items)
}

/// Save storage to a data directory with atomic writes.
///
/// Each file is written to a temporary sibling first and then renamed over
/// the target, so an interrupted save leaves the previous file intact.
///
/// # Errors
///
/// Returns `Error::Io` on file system failures.
pub async fn save_to_dir(storage: &dyn TrackerStorage, dir: &Path) -> Result<()> {
    let snapshot = storage.export_all().await?;

    fs::create_dir_all(dir).await?;
    write_atomic(&dir.join(BOARDS_FILE_NAME), &snapshot.boards).await?;
    write_atomic(&dir.join(SPRINTS_FILE_NAME), &snapshot.sprints).await?;
    write_atomic(&dir.join(TICKETS_FILE_NAME), &snapshot.tickets).await?;

    tracing::debug!(
        dir = %dir.display(),
        boards = snapshot.boards.len(),
        sprints = snapshot.sprints.len(),
        tickets = snapshot.tickets.len(),
        "Saved data files"
    );
    Ok(())
}

async fn write_atomic<T: Serialize>(path: &Path, values: &[T]) -> Result<()> {
    let json = serde_json::to_vec_pretty(values).map_err(StorageError::Serialization)?;
    let temp_path = path.with_extension("json.tmp");

    if let Err(e) = fs::write(&temp_path, &json).await {
        // Best-effort cleanup of temp file
        let _ = fs::remove_file(&temp_path).await;
        return Err(Error::Io(e));
    }

    fs::rename(&temp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::reconcile;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_directory_contents_load_empty() {
        let temp_dir = TempDir::new().unwrap();
        let (storage, warnings) = load_from_dir(temp_dir.path()).await.unwrap();
        assert!(warnings.is_empty());
        assert!(storage.export_all().await.unwrap().boards.is_empty());
    }

    #[tokio::test]
    async fn invalid_entries_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(BOARDS_FILE_NAME),
            r#"[{"id": "b1", "name": "Web", "key": "WEB", "type": "scrum"}, {"name": 3}]"#,
        )
        .await
        .unwrap();

        let (storage, warnings) = load_from_dir(temp_dir.path()).await.unwrap();
        assert_eq!(storage.list_boards().await.unwrap().len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            LoadWarning::InvalidEntry {
                file: BOARDS_FILE_NAME,
                index: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn non_array_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(TICKETS_FILE_NAME), r#"{"tickets": []}"#)
            .await
            .unwrap();

        let err = load_from_dir(temp_dir.path()).await.err().unwrap();
        assert!(err.to_string().contains("expected a JSON array"));
    }

    #[tokio::test]
    async fn dangling_parent_is_repaired_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let batch = reconcile(
            r#"{"tickets": [{"id": "e", "type": "Epic"}, {"parent_id": "e"}]}"#,
            Some(&crate::domain::BoardId::new("b")),
        )
        .unwrap();

        // Persist only the child ticket
        let child = &batch.tickets[1];
        fs::write(
            temp_dir.path().join(TICKETS_FILE_NAME),
            serde_json::to_string(&[child]).unwrap(),
        )
        .await
        .unwrap();

        let (storage, warnings) = load_from_dir(temp_dir.path()).await.unwrap();
        let loaded = storage.get_ticket(&child.id).await.unwrap().unwrap();
        assert!(loaded.parent_id.is_none());
        assert_eq!(
            warnings,
            vec![LoadWarning::OrphanedParent {
                ticket: child.id.clone(),
                parent: batch.tickets[0].id.clone(),
            }]
        );
    }

    #[tokio::test]
    async fn dangling_sprint_is_repaired_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let batch = reconcile(
            r#"{"boards": [{"sprints": [{"id": "s1"}], "tickets": [{"sprint_id": "s1"}]}]}"#,
            None,
        )
        .unwrap();

        // Persist the ticket but not its sprint
        let ticket = &batch.tickets[0];
        fs::write(
            temp_dir.path().join(TICKETS_FILE_NAME),
            serde_json::to_string(&[ticket]).unwrap(),
        )
        .await
        .unwrap();

        let (storage, warnings) = load_from_dir(temp_dir.path()).await.unwrap();
        let loaded = storage.get_ticket(&ticket.id).await.unwrap().unwrap();
        assert!(loaded.sprint_id.is_none());
        assert_eq!(
            warnings,
            vec![LoadWarning::OrphanedSprint {
                ticket: ticket.id.clone(),
                sprint: batch.sprints[0].id.clone(),
            }]
        );
        assert!(warnings[0].to_string().contains("link cleared"));
    }

    #[tokio::test]
    async fn save_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = super::super::new_in_memory_storage();
        let batch = reconcile(r#"{"boards": [{"sprints": [{}], "tickets": [{}]}]}"#, None).unwrap();
        storage.import_batch(&batch).await.unwrap();

        save_to_dir(storage.as_ref(), temp_dir.path()).await.unwrap();

        let mut names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![BOARDS_FILE_NAME, SPRINTS_FILE_NAME, TICKETS_FILE_NAME]);
    }
}
