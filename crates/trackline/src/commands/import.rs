//! Implementation of the `import` command.
//!
//! Reconciles a document against the workspace, previews it, and merges it
//! into the store unless running dry.

use crate::app::App;
use crate::domain::BoardId;
use crate::error::{Error, Result};
use crate::import::{ImportBatch, reconcile_with};
use tracing::info;

/// Options for one import run
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Board for tickets without a board of their own; overrides `default-board`
    pub board: Option<BoardId>,
    /// Reconcile and report without writing anything
    pub dry_run: bool,
    /// Accept tickets that end up with no board
    pub allow_boardless: bool,
}

/// What an import run produced
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// The reconciled batch
    pub batch: ImportBatch,
    /// Whether the batch was merged and saved
    pub committed: bool,
}

/// Reconcile `raw_text` and merge the result into the workspace's store.
///
/// The fallback board is `options.board`, else the configured
/// `default-board`. It must exist in the store.
///
/// # Errors
///
/// - `Error::Import` if the document is not valid JSON; nothing is written
/// - `Error::BoardNotFound` if the fallback board is not stored
/// - `Error::BoardlessTickets` if tickets would have no board and
///   `allow_boardless` is off
/// - `Error::DuplicateId` if the store rejects the batch
pub async fn run(app: &mut App, raw_text: &str, options: &ImportOptions) -> Result<ImportReport> {
    let fallback = options
        .board
        .clone()
        .or_else(|| app.config().default_board.clone());

    if let Some(board) = &fallback {
        if app.storage().get_board(board).await?.is_none() {
            return Err(Error::BoardNotFound(board.clone()));
        }
    }

    let mut ids = app.id_generator().await?;
    let batch = reconcile_with(&mut ids, raw_text, fallback.as_ref())?;

    let boardless = batch.boardless_tickets().count();
    if boardless > 0 && !options.allow_boardless {
        return Err(Error::BoardlessTickets(boardless));
    }

    if options.dry_run || batch.is_empty() {
        return Ok(ImportReport {
            batch,
            committed: false,
        });
    }

    app.storage_mut().import_batch(&batch).await?;
    app.save().await?;
    info!(
        boards = batch.stats.boards,
        sprints = batch.stats.sprints,
        tickets = batch.stats.tickets,
        "Import committed"
    );

    Ok(ImportReport {
        batch,
        committed: true,
    })
}
