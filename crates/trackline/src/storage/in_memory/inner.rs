//! Core in-memory storage data structures.

use crate::domain::{Board, BoardId, Sprint, SprintId, Ticket, TicketId};
use crate::error::{Error, Result};
use crate::import::ImportBatch;
use std::collections::HashSet;

/// Inner storage structure (not thread-safe).
///
/// Invariant: `ids` holds exactly the ids of every stored board, sprint and
/// ticket.
#[derive(Debug, Default)]
pub(crate) struct InMemoryStorageInner {
    pub(super) boards: Vec<Board>,
    pub(super) sprints: Vec<Sprint>,
    pub(super) tickets: Vec<Ticket>,
    ids: HashSet<String>,
}

impl InMemoryStorageInner {
    /// First id in the batch that is already stored or repeats inside the batch.
    pub(super) fn find_duplicate(&self, batch: &ImportBatch) -> Option<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let incoming = batch
            .boards
            .iter()
            .map(|b| b.id.as_str())
            .chain(batch.sprints.iter().map(|s| s.id.as_str()))
            .chain(batch.tickets.iter().map(|t| t.id.as_str()));

        for id in incoming {
            if self.ids.contains(id) || !seen.insert(id) {
                return Some(id.to_string());
            }
        }
        None
    }

    /// Append a batch. Callers check [`Self::find_duplicate`] first.
    pub(super) fn insert_batch(&mut self, batch: &ImportBatch) {
        self.ids.extend(batch.boards.iter().map(|b| b.id.0.clone()));
        self.ids.extend(batch.sprints.iter().map(|s| s.id.0.clone()));
        self.ids.extend(batch.tickets.iter().map(|t| t.id.0.clone()));

        self.boards.extend(batch.boards.iter().cloned());
        self.sprints.extend(batch.sprints.iter().cloned());
        self.tickets.extend(batch.tickets.iter().cloned());
    }

    /// Insert entities loaded from disk, skipping ids already present.
    ///
    /// Returns the ids that were skipped.
    pub(super) fn insert_loaded(
        &mut self,
        boards: Vec<Board>,
        sprints: Vec<Sprint>,
        tickets: Vec<Ticket>,
    ) -> Vec<String> {
        let mut skipped = Vec::new();

        for board in boards {
            if self.ids.insert(board.id.0.clone()) {
                self.boards.push(board);
            } else {
                skipped.push(board.id.0);
            }
        }
        for sprint in sprints {
            if self.ids.insert(sprint.id.0.clone()) {
                self.sprints.push(sprint);
            } else {
                skipped.push(sprint.id.0);
            }
        }
        for ticket in tickets {
            if self.ids.insert(ticket.id.0.clone()) {
                self.tickets.push(ticket);
            } else {
                skipped.push(ticket.id.0);
            }
        }

        skipped
    }

    /// Clear parent links that point at tickets no longer stored.
    ///
    /// Returns `(child, missing parent)` for every link cleared.
    pub(super) fn orphan_dangling_parents(&mut self) -> Vec<(TicketId, TicketId)> {
        let present: HashSet<TicketId> = self.tickets.iter().map(|t| t.id.clone()).collect();
        let mut orphaned = Vec::new();

        for ticket in &mut self.tickets {
            let dangling = ticket
                .parent_id
                .as_ref()
                .is_some_and(|parent| !present.contains(parent));
            if dangling {
                if let Some(parent) = ticket.parent_id.take() {
                    orphaned.push((ticket.id.clone(), parent));
                }
            }
        }
        orphaned
    }

    /// Clear sprint links that point at sprints no longer stored.
    ///
    /// Returns `(ticket, missing sprint)` for every link cleared.
    pub(super) fn orphan_dangling_sprints(&mut self) -> Vec<(TicketId, SprintId)> {
        let present: HashSet<SprintId> = self.sprints.iter().map(|s| s.id.clone()).collect();
        let mut orphaned = Vec::new();

        for ticket in &mut self.tickets {
            let dangling = ticket
                .sprint_id
                .as_ref()
                .is_some_and(|sprint| !present.contains(sprint));
            if dangling {
                if let Some(sprint) = ticket.sprint_id.take() {
                    orphaned.push((ticket.id.clone(), sprint));
                }
            }
        }
        orphaned
    }

    pub(super) fn remove_board(&mut self, id: &BoardId) -> Result<()> {
        let Some(pos) = self.boards.iter().position(|b| &b.id == id) else {
            return Err(Error::BoardNotFound(id.clone()));
        };
        self.boards.remove(pos);
        self.ids.remove(id.as_str());

        let ids = &mut self.ids;
        self.sprints.retain(|sprint| {
            let keep = &sprint.board_id != id;
            if !keep {
                ids.remove(sprint.id.as_str());
            }
            keep
        });
        self.tickets.retain(|ticket| {
            let keep = ticket.board_id.as_ref() != Some(id);
            if !keep {
                ids.remove(ticket.id.as_str());
            }
            keep
        });

        // Tickets on other boards may reference this board's tickets and sprints
        self.orphan_dangling_parents();
        self.orphan_dangling_sprints();
        Ok(())
    }

    pub(super) fn remove_ticket(&mut self, id: &TicketId) -> Result<()> {
        let Some(pos) = self.tickets.iter().position(|t| &t.id == id) else {
            return Err(Error::TicketNotFound(id.clone()));
        };
        self.tickets.remove(pos);
        self.ids.remove(id.as_str());

        for child in self
            .tickets
            .iter_mut()
            .filter(|t| t.parent_id.as_ref() == Some(id))
        {
            child.parent_id = None;
        }
        Ok(())
    }

    pub(super) fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}
