//! TrackerStorage trait implementation for in-memory storage.

use super::InMemoryStorage;
use crate::domain::{Board, BoardId, Sprint, Ticket, TicketFilter, TicketId};
use crate::error::{Error, Result};
use crate::import::{ImportBatch, ImportStats};
use crate::storage::{Snapshot, TrackerStorage};
use async_trait::async_trait;
use tracing::debug;

#[async_trait]
impl TrackerStorage for InMemoryStorage {
    async fn import_batch(&mut self, batch: &ImportBatch) -> Result<ImportStats> {
        let mut inner = self.lock().await;

        // Validate everything before touching any collection
        if let Some(id) = inner.find_duplicate(batch) {
            return Err(Error::DuplicateId(id));
        }

        inner.insert_batch(batch);
        debug!(
            boards = batch.boards.len(),
            sprints = batch.sprints.len(),
            tickets = batch.tickets.len(),
            "Merged import batch"
        );

        Ok(ImportStats {
            boards: batch.boards.len(),
            sprints: batch.sprints.len(),
            tickets: batch.tickets.len(),
        })
    }

    async fn get_board(&self, id: &BoardId) -> Result<Option<Board>> {
        let inner = self.lock().await;
        Ok(inner.boards.iter().find(|b| &b.id == id).cloned())
    }

    async fn list_boards(&self) -> Result<Vec<Board>> {
        let inner = self.lock().await;
        Ok(inner.boards.clone())
    }

    async fn delete_board(&mut self, id: &BoardId) -> Result<()> {
        let mut inner = self.lock().await;
        inner.remove_board(id)?;
        debug!(board = %id, "Deleted board");
        Ok(())
    }

    async fn list_sprints(&self, board_id: Option<&BoardId>) -> Result<Vec<Sprint>> {
        let inner = self.lock().await;
        Ok(inner
            .sprints
            .iter()
            .filter(|s| board_id.is_none_or(|id| &s.board_id == id))
            .cloned()
            .collect())
    }

    async fn get_ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        let inner = self.lock().await;
        Ok(inner.tickets.iter().find(|t| &t.id == id).cloned())
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let inner = self.lock().await;
        let matching = inner.tickets.iter().filter(|t| filter.matches(t)).cloned();

        Ok(match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn delete_ticket(&mut self, id: &TicketId) -> Result<()> {
        let mut inner = self.lock().await;
        inner.remove_ticket(id)?;
        debug!(ticket = %id, "Deleted ticket");
        Ok(())
    }

    async fn known_ids(&self) -> Result<Vec<String>> {
        let inner = self.lock().await;
        Ok(inner.ids())
    }

    async fn export_all(&self) -> Result<Snapshot> {
        let inner = self.lock().await;
        Ok(Snapshot {
            boards: inner.boards.clone(),
            sprints: inner.sprints.clone(),
            tickets: inner.tickets.clone(),
        })
    }

    async fn save(&self) -> Result<()> {
        // No-op: nothing to persist for the ephemeral backend
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        Ok(())
    }
}
