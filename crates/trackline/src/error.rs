//! Error types for trackline operations.

use crate::domain::{BoardId, TicketId};
use crate::id_generation::IdGenerationError;
use std::io;
use thiserror::Error;

/// The error type for trackline operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Import document could not be reconciled.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Board not found.
    #[error("Board not found: {0}")]
    BoardNotFound(BoardId),

    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// An inserted entity reuses an id that already exists in the store.
    #[error("Duplicate id in store: {0}")]
    DuplicateId(String),

    /// An import would create tickets that belong to no board.
    #[error("{0} imported ticket(s) have no board; name a fallback board or allow boardless tickets")]
    BoardlessTickets(usize),
}

/// Errors raised while locating, loading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.trackline/` directory was found walking up from the working directory.
    #[error("Not a trackline workspace (or any parent directory). Run 'trackline init' first.")]
    NotInitialized,

    /// The workspace already exists.
    #[error("Trackline is already initialized in this directory. Found existing '{0}'")]
    AlreadyInitialized(String),

    /// The id prefix is malformed.
    #[error("Invalid id prefix: {0}")]
    InvalidPrefix(String),

    /// The storage backend name is unknown.
    #[error("Unknown storage backend '{0}' (expected 'json' or 'memory')")]
    UnknownBackend(String),

    /// The YAML file could not be parsed or written.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A data file does not contain a JSON array.
    #[error("Invalid data file {path}: {reason}")]
    InvalidFormat {
        /// Path of the offending file.
        path: String,
        /// Why the file was rejected.
        reason: String,
    },

    /// Serialization of an entity failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the import reconciler.
///
/// Only a document that cannot be deserialized at all is an error; malformed
/// contents are defaulted or dropped instead.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The raw text is not well-formed JSON.
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The id source could not produce a fresh id.
    #[error("ID generation failed: {0}")]
    IdGeneration(#[from] IdGenerationError),
}

/// A specialized Result type for trackline operations.
pub type Result<T> = std::result::Result<T, Error>;
