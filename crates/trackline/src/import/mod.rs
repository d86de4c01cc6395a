//! Bulk JSON import and reconciliation.
//!
//! An import document describes boards (with nested sprints and tickets) and
//! loose top-level tickets, cross-referenced by tokens that only mean
//! something inside that document. [`reconcile`] turns it into a flat batch of
//! entities with freshly generated ids and every reference rewritten to those
//! ids, ready to be merged insert-only into a store.
//!
//! # Stages
//!
//! 1. **Boards**: each board and its nested sprints get new ids and their
//!    tokens are recorded. Nested tickets are tagged with their board's token
//!    and deferred.
//! 2. **Tickets, pass 1**: nested then top-level tickets get new ids, a board
//!    (tag, own `board_id`, fallback board, first imported board, in that
//!    order) and a sprint. The raw parent token is kept aside.
//! 3. **Tickets, pass 2**: parent tokens are mapped to ticket ids. Parents can
//!    appear after their children in the document, which is why linking waits
//!    until every ticket has its id. Unknown parents are cleared.
//!
//! # Example
//!
//! ```
//! use trackline::domain::BoardId;
//! use trackline::import::reconcile;
//!
//! let batch = reconcile(
//!     r#"{"tickets": [{"title": "A"}]}"#,
//!     Some(&BoardId::new("B1")),
//! )
//! .unwrap();
//!
//! assert_eq!(batch.stats.tickets, 1);
//! assert_eq!(batch.tickets[0].board_id, Some(BoardId::new("B1")));
//! ```

mod coerce;
mod warning;

pub use warning::ImportWarning;

use crate::domain::{
    Board, BoardId, DEFAULT_BOARD_KEY, DEFAULT_BOARD_NAME, DEFAULT_SPRINT_NAME,
    DEFAULT_TICKET_STATUS, DEFAULT_TICKET_TITLE, Sprint, SprintId, Ticket, TicketId,
};
use crate::error::ImportError;
use crate::id_generation::{IdGenerator, IdGeneratorConfig, IdKind, IdSource};
use chrono::{DateTime, Utc};
use coerce::StoryPoints;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Entity counts of an import batch, used for the confirmation preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Number of boards
    pub boards: usize,
    /// Number of sprints
    pub sprints: usize,
    /// Number of tickets
    pub tickets: usize,
}

/// The self-consistent result of one reconciliation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportBatch {
    /// Imported boards
    pub boards: Vec<Board>,
    /// Imported sprints; each references a board in `boards`
    pub sprints: Vec<Sprint>,
    /// Imported tickets; sprint and parent references stay inside the batch
    pub tickets: Vec<Ticket>,
    /// Counts matching the three sequences
    pub stats: ImportStats,
    /// References that were dropped or redirected
    pub warnings: Vec<ImportWarning>,
}

impl ImportBatch {
    /// Tickets that ended up without any board.
    pub fn boardless_tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter().filter(|t| t.board_id.is_none())
    }

    /// Returns true if the batch holds no entities at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty() && self.sprints.is_empty() && self.tickets.is_empty()
    }
}

/// Reconcile an import document using a fresh id generator.
///
/// `fallback_board_id` is the caller's active board, used for tickets that
/// carry no resolvable board reference of their own.
///
/// # Errors
///
/// Returns [`ImportError::Parse`] if `raw_text` is not well-formed JSON. Any
/// well-formed document is accepted; malformed fields are defaulted.
pub fn reconcile(
    raw_text: &str,
    fallback_board_id: Option<&BoardId>,
) -> Result<ImportBatch, ImportError> {
    let mut ids = IdGenerator::new(IdGeneratorConfig::default());
    reconcile_with(&mut ids, raw_text, fallback_board_id)
}

/// Reconcile an import document drawing ids from `ids`.
///
/// Use this with an [`IdGenerator`] that has the store's existing ids
/// registered to rule out collisions with stored entities.
///
/// # Errors
///
/// Returns [`ImportError::Parse`] for malformed JSON and
/// [`ImportError::IdGeneration`] if the id source fails.
pub fn reconcile_with(
    ids: &mut dyn IdSource,
    raw_text: &str,
    fallback_board_id: Option<&BoardId>,
) -> Result<ImportBatch, ImportError> {
    let document: Value = serde_json::from_str(raw_text)?;
    if !document.is_object() {
        debug!("Import document is not an object, nothing to import");
        return Ok(ImportBatch::default());
    }

    let mut reconciler = Reconciler::new(ids, Utc::now());

    let nested = reconciler.import_boards(&document)?;
    let loose = coerce::items(&document, "tickets")
        .iter()
        .map(|entry| DeferredTicket {
            board_tag: None,
            entry,
        });
    let working: Vec<DeferredTicket<'_>> = nested.into_iter().chain(loose).collect();

    let pending = reconciler.materialize_tickets(&working, fallback_board_id)?;
    let batch = reconciler.link_parents(pending);

    info!(
        boards = batch.stats.boards,
        sprints = batch.stats.sprints,
        tickets = batch.stats.tickets,
        warnings = batch.warnings.len(),
        "Reconciled import document"
    );
    Ok(batch)
}

/// A ticket entry waiting for the ticket stage.
struct DeferredTicket<'a> {
    /// Raw token of the board the entry was nested under
    board_tag: Option<String>,
    entry: &'a Value,
}

/// A materialized ticket whose parent is not linked yet.
struct PendingTicket {
    ticket: Ticket,
    parent_token: Option<String>,
}

/// Working state of one reconciliation; dropped when the call returns.
struct Reconciler<'g> {
    ids: &'g mut dyn IdSource,
    created_at: DateTime<Utc>,
    board_ids: HashMap<String, BoardId>,
    sprint_ids: HashMap<String, SprintId>,
    ticket_ids: HashMap<String, TicketId>,
    boards: Vec<Board>,
    sprints: Vec<Sprint>,
    warnings: Vec<ImportWarning>,
}

impl<'g> Reconciler<'g> {
    fn new(ids: &'g mut dyn IdSource, created_at: DateTime<Utc>) -> Self {
        Self {
            ids,
            created_at,
            board_ids: HashMap::new(),
            sprint_ids: HashMap::new(),
            ticket_ids: HashMap::new(),
            boards: Vec::new(),
            sprints: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Board stage: boards, their sprints, and deferral of nested tickets.
    fn import_boards<'d>(
        &mut self,
        document: &'d Value,
    ) -> Result<Vec<DeferredTicket<'d>>, ImportError> {
        let mut deferred = Vec::new();

        for entry in coerce::items(document, "boards") {
            let id = BoardId::new(self.ids.next_id(IdKind::Board)?);
            let token = coerce::token(entry, "id");
            if let Some(token) = &token {
                self.board_ids.insert(token.clone(), id.clone());
            }

            for sprint in coerce::items(entry, "sprints") {
                self.import_sprint(sprint, &id)?;
            }

            deferred.extend(
                coerce::items(entry, "tickets")
                    .iter()
                    .map(|ticket| DeferredTicket {
                        board_tag: token.clone(),
                        entry: ticket,
                    }),
            );

            self.boards.push(Board {
                id,
                name: coerce::text_or(entry, "name", DEFAULT_BOARD_NAME),
                key: coerce::text_or(entry, "key", DEFAULT_BOARD_KEY),
                board_type: coerce::parsed_or_default(entry, "type"),
                columns: coerce::columns(entry),
            });
        }

        debug!(
            boards = self.boards.len(),
            sprints = self.sprints.len(),
            nested_tickets = deferred.len(),
            "Board stage complete"
        );
        Ok(deferred)
    }

    fn import_sprint(&mut self, entry: &Value, board_id: &BoardId) -> Result<(), ImportError> {
        let id = SprintId::new(self.ids.next_id(IdKind::Sprint)?);
        if let Some(token) = coerce::token(entry, "id") {
            self.sprint_ids.insert(token, id.clone());
        }

        self.sprints.push(Sprint {
            id,
            board_id: board_id.clone(),
            name: coerce::text_or(entry, "name", DEFAULT_SPRINT_NAME),
            status: coerce::parsed_or_default(entry, "status"),
            goal: coerce::text(entry, "goal"),
            start_date: coerce::text(entry, "start_date"),
            end_date: coerce::text(entry, "end_date"),
        });
        Ok(())
    }

    /// Ticket pass 1: assign ids, boards, sprints and field defaults.
    fn materialize_tickets(
        &mut self,
        working: &[DeferredTicket<'_>],
        fallback_board_id: Option<&BoardId>,
    ) -> Result<Vec<PendingTicket>, ImportError> {
        let mut pending = Vec::with_capacity(working.len());

        for DeferredTicket { board_tag, entry } in working {
            let id = TicketId::new(self.ids.next_id(IdKind::Ticket)?);
            if let Some(token) = coerce::token(entry, "id") {
                self.ticket_ids.insert(token, id.clone());
            }

            let board_id = self.resolve_board(&id, board_tag.as_deref(), entry, fallback_board_id);
            let sprint_id = self.resolve_sprint(&id, entry);

            let story_points = match coerce::story_points(entry) {
                StoryPoints::Absent => None,
                StoryPoints::Valid(points) => Some(points),
                StoryPoints::Invalid(raw) => {
                    debug!(ticket = %id, raw = %raw, "Dropping unreadable story points");
                    self.warnings.push(ImportWarning::DroppedStoryPoints {
                        ticket: id.clone(),
                        raw,
                    });
                    None
                }
            };

            pending.push(PendingTicket {
                ticket: Ticket {
                    id,
                    board_id,
                    sprint_id,
                    title: coerce::text_or(entry, "title", DEFAULT_TICKET_TITLE),
                    description: coerce::text(entry, "description").unwrap_or_default(),
                    status: coerce::text_or(entry, "status", DEFAULT_TICKET_STATUS),
                    ticket_type: coerce::parsed_or_default(entry, "type"),
                    priority: coerce::parsed_or_default(entry, "priority"),
                    story_points,
                    labels: coerce::labels(entry),
                    is_flagged: coerce::truthy(entry, "is_flagged"),
                    parent_id: None,
                    assignee_id: None,
                    created_at: self.created_at,
                },
                parent_token: coerce::token(entry, "parent_id"),
            });
        }

        debug!(tickets = pending.len(), "Ticket materialization complete");
        Ok(pending)
    }

    /// Board for a ticket: tag, own reference, fallback, first imported board.
    fn resolve_board(
        &mut self,
        ticket: &TicketId,
        board_tag: Option<&str>,
        entry: &Value,
        fallback_board_id: Option<&BoardId>,
    ) -> Option<BoardId> {
        if let Some(id) = board_tag.and_then(|tag| self.board_ids.get(tag)) {
            return Some(id.clone());
        }

        let own = coerce::token(entry, "board_id");
        if let Some(token) = own {
            if let Some(id) = self.board_ids.get(&token) {
                return Some(id.clone());
            }
            warn!(ticket = %ticket, token = %token, "Ticket references a board outside this import");
            self.warnings.push(ImportWarning::UnknownBoard {
                ticket: ticket.clone(),
                token,
            });
        }

        let resolved = fallback_board_id
            .cloned()
            .or_else(|| self.boards.first().map(|board| board.id.clone()));

        if resolved.is_none() {
            warn!(ticket = %ticket, "No board context for imported ticket");
            self.warnings.push(ImportWarning::Boardless {
                ticket: ticket.clone(),
            });
        }
        resolved
    }

    fn resolve_sprint(&mut self, ticket: &TicketId, entry: &Value) -> Option<SprintId> {
        let token = coerce::token(entry, "sprint_id")?;
        if let Some(id) = self.sprint_ids.get(&token) {
            return Some(id.clone());
        }

        warn!(ticket = %ticket, token = %token, "Ticket references a sprint outside this import");
        self.warnings.push(ImportWarning::UnknownSprint {
            ticket: ticket.clone(),
            token,
        });
        None
    }

    /// Ticket pass 2: rewrite parent tokens to ticket ids, orphaning misses
    /// and self references.
    fn link_parents(mut self, pending: Vec<PendingTicket>) -> ImportBatch {
        let mut tickets = Vec::with_capacity(pending.len());

        for PendingTicket {
            mut ticket,
            parent_token,
        } in pending
        {
            if let Some(token) = parent_token {
                match self.ticket_ids.get(&token) {
                    Some(parent) if parent != &ticket.id => {
                        ticket.parent_id = Some(parent.clone());
                    }
                    Some(_) => {
                        warn!(ticket = %ticket.id, token = %token, "Ticket names itself as parent, orphaning");
                        self.warnings.push(ImportWarning::OrphanedParent {
                            ticket: ticket.id.clone(),
                            token,
                        });
                    }
                    None => {
                        warn!(ticket = %ticket.id, token = %token, "Parent not in import, orphaning");
                        self.warnings.push(ImportWarning::OrphanedParent {
                            ticket: ticket.id.clone(),
                            token,
                        });
                    }
                }
            }
            tickets.push(ticket);
        }

        let stats = ImportStats {
            boards: self.boards.len(),
            sprints: self.sprints.len(),
            tickets: tickets.len(),
        };

        ImportBatch {
            boards: self.boards,
            sprints: self.sprints,
            tickets,
            stats,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoardType, Priority, SprintStatus, TicketType};
    use crate::id_generation::IdGenerationError;

    /// Predictable ids for asserting on exact values.
    struct SequentialIds(u32);

    impl IdSource for SequentialIds {
        fn next_id(&mut self, kind: IdKind) -> Result<String, IdGenerationError> {
            self.0 += 1;
            Ok(format!("{kind}-{}", self.0))
        }
    }

    struct FailingIds;

    impl IdSource for FailingIds {
        fn next_id(&mut self, _kind: IdKind) -> Result<String, IdGenerationError> {
            Err(IdGenerationError::CollisionExhausted { attempts: 100 })
        }
    }

    fn run(raw: &str, fallback: Option<&str>) -> ImportBatch {
        let fallback = fallback.map(BoardId::new);
        reconcile_with(&mut SequentialIds(0), raw, fallback.as_ref()).unwrap()
    }

    #[test]
    fn ids_follow_document_order() {
        let batch = run(
            r#"{"boards": [{"id": "b1", "sprints": [{"id": "s1"}], "tickets": [{"id": "t1"}]}],
                "tickets": [{"id": "t2"}]}"#,
            None,
        );
        assert_eq!(batch.boards[0].id.as_str(), "board-1");
        assert_eq!(batch.sprints[0].id.as_str(), "sprint-2");
        assert_eq!(batch.tickets[0].id.as_str(), "ticket-3");
        assert_eq!(batch.tickets[1].id.as_str(), "ticket-4");
    }

    #[test]
    fn board_and_sprint_defaults() {
        let batch = run(r#"{"boards": [{"sprints": [{}]}]}"#, None);
        let board = &batch.boards[0];
        assert_eq!(board.name, DEFAULT_BOARD_NAME);
        assert_eq!(board.key, DEFAULT_BOARD_KEY);
        assert_eq!(board.board_type, BoardType::Kanban);
        assert!(board.columns.is_empty());

        let sprint = &batch.sprints[0];
        assert_eq!(sprint.name, DEFAULT_SPRINT_NAME);
        assert_eq!(sprint.status, SprintStatus::Future);
        assert_eq!(sprint.board_id, board.id);
        assert!(sprint.goal.is_none());
    }

    #[test]
    fn board_and_sprint_fields_are_read() {
        let batch = run(
            r#"{"boards": [{"name": "Web", "key": "WEB", "type": "Scrum",
                "columns": [{"id": "todo", "title": "To Do"}],
                "sprints": [{"name": "S1", "status": "active", "goal": "Ship",
                             "start_date": "2024-01-01", "end_date": "2024-01-14"}]}]}"#,
            None,
        );
        assert_eq!(batch.boards[0].board_type, BoardType::Scrum);
        assert_eq!(batch.boards[0].columns.len(), 1);
        let sprint = &batch.sprints[0];
        assert_eq!(sprint.status, SprintStatus::Active);
        assert_eq!(sprint.goal.as_deref(), Some("Ship"));
        assert_eq!(sprint.start_date.as_deref(), Some("2024-01-01"));
        assert_eq!(sprint.end_date.as_deref(), Some("2024-01-14"));
    }

    #[test]
    fn nested_ticket_tag_wins_over_own_board_id() {
        let batch = run(
            r#"{"boards": [{"id": "b1"}, {"id": "b2", "tickets": [{"board_id": "b1"}]}]}"#,
            Some("fallback"),
        );
        assert_eq!(batch.tickets[0].board_id, Some(batch.boards[1].id.clone()));
    }

    #[test]
    fn own_board_id_is_mapped() {
        let batch = run(
            r#"{"boards": [{"id": "b1"}, {"id": "b2"}], "tickets": [{"board_id": "b2"}]}"#,
            Some("fallback"),
        );
        assert_eq!(batch.tickets[0].board_id, Some(batch.boards[1].id.clone()));
        assert!(batch.warnings.is_empty());
    }

    #[test]
    fn fallback_board_beats_first_imported_board() {
        let batch = run(r#"{"boards": [{"id": "b1"}], "tickets": [{}]}"#, Some("active"));
        assert_eq!(batch.tickets[0].board_id, Some(BoardId::new("active")));
    }

    #[test]
    fn first_imported_board_is_last_resort() {
        let batch = run(r#"{"boards": [{}, {}], "tickets": [{"board_id": "zz"}]}"#, None);
        assert_eq!(batch.tickets[0].board_id, Some(batch.boards[0].id.clone()));
        assert_eq!(batch.warnings.len(), 1);
        assert_eq!(batch.warnings[0].kind(), "unknown_board");
    }

    #[test]
    fn tokenless_board_tag_falls_through() {
        let batch = run(r#"{"boards": [{}, {"tickets": [{}]}]}"#, None);
        // The second board has no token, so its tickets land on the first board
        assert_eq!(batch.tickets[0].board_id, Some(batch.boards[0].id.clone()));
    }

    #[test]
    fn ticket_without_any_board_context() {
        let batch = run(r#"{"tickets": [{"title": "lost"}]}"#, None);
        assert!(batch.tickets[0].board_id.is_none());
        assert_eq!(batch.boardless_tickets().count(), 1);
        assert!(matches!(batch.warnings[0], ImportWarning::Boardless { .. }));
    }

    #[test]
    fn unknown_sprint_is_cleared_with_warning() {
        let batch = run(r#"{"tickets": [{"sprint_id": "s9"}]}"#, Some("b"));
        assert!(batch.tickets[0].sprint_id.is_none());
        assert_eq!(
            batch.warnings,
            vec![ImportWarning::UnknownSprint {
                ticket: batch.tickets[0].id.clone(),
                token: "s9".to_string(),
            }]
        );
    }

    #[test]
    fn sprint_from_another_board_still_resolves() {
        let batch = run(
            r#"{"boards": [{"id": "b1", "sprints": [{"id": "s1"}]},
                           {"id": "b2", "tickets": [{"sprint_id": "s1"}]}]}"#,
            None,
        );
        assert_eq!(batch.tickets[0].sprint_id, Some(batch.sprints[0].id.clone()));
    }

    #[test]
    fn ticket_fields_are_read() {
        let batch = run(
            r#"{"tickets": [{"title": "Login", "description": "OAuth", "status": "In Progress",
                "type": "bug", "priority": "critical", "story_points": 3,
                "labels": ["auth"], "is_flagged": 1, "assignee_id": "u1"}]}"#,
            Some("b"),
        );
        let ticket = &batch.tickets[0];
        assert_eq!(ticket.title, "Login");
        assert_eq!(ticket.description, "OAuth");
        assert_eq!(ticket.status, "In Progress");
        assert_eq!(ticket.ticket_type, TicketType::Bug);
        assert_eq!(ticket.priority, Priority::Critical);
        assert_eq!(ticket.story_points, Some(3));
        assert_eq!(ticket.labels, vec!["auth"]);
        assert!(ticket.is_flagged);
        assert!(ticket.assignee_id.is_none());
    }

    #[test]
    fn all_tickets_share_import_timestamp() {
        let batch = run(r#"{"tickets": [{}, {}, {}]}"#, Some("b"));
        assert!(
            batch
                .tickets
                .windows(2)
                .all(|w| w[0].created_at == w[1].created_at)
        );
    }

    #[test]
    fn duplicate_tokens_last_one_wins() {
        let batch = run(
            r#"{"tickets": [{"id": "e"}, {"id": "e"}, {"parent_id": "e"}]}"#,
            Some("b"),
        );
        assert_eq!(batch.tickets[2].parent_id, Some(batch.tickets[1].id.clone()));
    }

    #[test]
    fn self_parent_is_orphaned() {
        let batch = run(r#"{"tickets": [{"id": "e1", "parent_id": "e1"}]}"#, Some("b"));
        let ticket = &batch.tickets[0];
        assert!(ticket.parent_id.is_none());
        assert_eq!(
            batch.warnings,
            vec![ImportWarning::OrphanedParent {
                ticket: ticket.id.clone(),
                token: "e1".to_string(),
            }]
        );
    }

    #[test]
    fn duplicate_token_self_reference_links_to_earlier_ticket() {
        // The second "e" owns the token, so the first one links to it
        let batch = run(
            r#"{"tickets": [{"id": "e", "parent_id": "e"}, {"id": "e", "parent_id": "e"}]}"#,
            Some("b"),
        );
        assert_eq!(batch.tickets[0].parent_id, Some(batch.tickets[1].id.clone()));
        assert!(batch.tickets[1].parent_id.is_none());
        assert_eq!(batch.warnings.len(), 1);
    }

    #[test]
    fn numeric_tokens_match_string_tokens() {
        let batch = run(r#"{"tickets": [{"id": 1, "type": "Epic"}, {"parent_id": "1"}]}"#, Some("b"));
        assert_eq!(batch.tickets[1].parent_id, Some(batch.tickets[0].id.clone()));
    }

    #[test]
    fn non_object_document_yields_empty_batch() {
        let batch = run("[1, 2, 3]", None);
        assert!(batch.is_empty());
        assert_eq!(batch.stats, ImportStats::default());
    }

    #[test]
    fn non_object_entries_are_defaulted() {
        let batch = run(r#"{"boards": ["x"], "tickets": [42, null]}"#, None);
        assert_eq!(batch.stats.boards, 1);
        assert_eq!(batch.stats.tickets, 2);
        assert_eq!(batch.tickets[0].title, DEFAULT_TICKET_TITLE);
    }

    #[test]
    fn id_source_failure_is_reported() {
        let err = reconcile_with(&mut FailingIds, r#"{"tickets": [{}]}"#, None).unwrap_err();
        assert!(matches!(err, ImportError::IdGeneration(_)));
    }

    #[test]
    fn parse_error_message() {
        let err = reconcile("{not valid", None).unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON: "));
    }
}
