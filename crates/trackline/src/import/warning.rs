//! Non-fatal findings collected while reconciling an import document.
//!
//! None of these stop an import. They describe references that were dropped
//! or redirected so a caller can show them next to the stats preview.

use crate::domain::TicketId;
use serde::Serialize;
use std::fmt;

/// A reference problem that was resolved by defaulting or orphaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportWarning {
    /// `parent_id` named a ticket that is not part of this import, or the
    /// ticket itself; the parent link was cleared.
    OrphanedParent {
        /// The ticket whose parent was cleared
        ticket: TicketId,
        /// The unresolved token
        token: String,
    },

    /// `sprint_id` named a sprint that is not part of this import; the ticket
    /// was left out of any sprint.
    UnknownSprint {
        /// The affected ticket
        ticket: TicketId,
        /// The unresolved token
        token: String,
    },

    /// `board_id` named a board that is not part of this import; the ticket
    /// was placed using the fallback rules instead.
    UnknownBoard {
        /// The affected ticket
        ticket: TicketId,
        /// The unresolved token
        token: String,
    },

    /// No board could be determined for the ticket.
    Boardless {
        /// The affected ticket
        ticket: TicketId,
    },

    /// `story_points` could not be read as a non-negative integer and was dropped.
    DroppedStoryPoints {
        /// The affected ticket
        ticket: TicketId,
        /// The raw value as it appeared in the document
        raw: String,
    },
}

impl ImportWarning {
    /// The ticket this warning is about.
    #[must_use]
    pub fn ticket(&self) -> &TicketId {
        match self {
            Self::OrphanedParent { ticket, .. }
            | Self::UnknownSprint { ticket, .. }
            | Self::UnknownBoard { ticket, .. }
            | Self::Boardless { ticket }
            | Self::DroppedStoryPoints { ticket, .. } => ticket,
        }
    }

    /// A static string identifying the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrphanedParent { .. } => "orphaned_parent",
            Self::UnknownSprint { .. } => "unknown_sprint",
            Self::UnknownBoard { .. } => "unknown_board",
            Self::Boardless { .. } => "boardless",
            Self::DroppedStoryPoints { .. } => "dropped_story_points",
        }
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrphanedParent { ticket, token } => {
                write!(f, "ticket {ticket}: parent '{token}' is not in this import, link cleared")
            }
            Self::UnknownSprint { ticket, token } => {
                write!(f, "ticket {ticket}: sprint '{token}' is not in this import, left unplanned")
            }
            Self::UnknownBoard { ticket, token } => {
                write!(f, "ticket {ticket}: board '{token}' is not in this import, using fallback")
            }
            Self::Boardless { ticket } => write!(f, "ticket {ticket}: no board could be determined"),
            Self::DroppedStoryPoints { ticket, raw } => {
                write!(f, "ticket {ticket}: story points '{raw}' are not a number, dropped")
            }
        }
    }
}
