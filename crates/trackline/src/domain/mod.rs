//! Domain types for project tracking.
//!
//! This module contains the boards, sprints and tickets that the import
//! reconciler produces and the store persists. Serde field names match the
//! JSON shapes used both in import output and in the on-disk data files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod ids;

pub use ids::{BoardId, SprintId, TicketId};

/// Default board name when an import entry omits one
pub const DEFAULT_BOARD_NAME: &str = "Imported Project";

/// Default board key when an import entry omits one
pub const DEFAULT_BOARD_KEY: &str = "IMP";

/// Default sprint name when an import entry omits one
pub const DEFAULT_SPRINT_NAME: &str = "Imported Sprint";

/// Default ticket title when an import entry omits one
pub const DEFAULT_TICKET_TITLE: &str = "Untitled Ticket";

/// Default workflow status for imported tickets
pub const DEFAULT_TICKET_STATUS: &str = "Todo";

/// A project container with a workflow type and columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Unique identifier
    pub id: BoardId,

    /// Display name
    pub name: String,

    /// Short project key (e.g., "IMP")
    pub key: String,

    /// Workflow type
    #[serde(rename = "type")]
    pub board_type: BoardType,

    /// Ordered workflow columns
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// Workflow type of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardType {
    /// Sprint-based workflow
    Scrum,

    /// Continuous flow
    #[default]
    Kanban,
}

/// A workflow column on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column identifier, usually matching a ticket status
    pub id: String,

    /// Display title
    pub title: String,

    /// Work-in-progress limit
    #[serde(default)]
    pub limit: Option<u32>,
}

/// A time-boxed unit of work scoped to one board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    /// Unique identifier
    pub id: SprintId,

    /// Owning board
    pub board_id: BoardId,

    /// Display name
    pub name: String,

    /// Lifecycle state
    pub status: SprintStatus,

    /// Sprint goal
    #[serde(default)]
    pub goal: Option<String>,

    /// Start date, passed through verbatim
    #[serde(default)]
    pub start_date: Option<String>,

    /// End date, passed through verbatim
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Lifecycle state of a sprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    /// Currently running
    Active,

    /// Planned
    #[default]
    Future,

    /// Finished
    Closed,
}

/// A unit of work on a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier
    pub id: TicketId,

    /// Owning board; unset only when an import had no board context at all
    pub board_id: Option<BoardId>,

    /// Sprint the ticket is planned into
    pub sprint_id: Option<SprintId>,

    /// Ticket title
    pub title: String,

    /// Ticket description
    pub description: String,

    /// Workflow status (free-form, matches a column id)
    pub status: String,

    /// Ticket type
    #[serde(rename = "type")]
    pub ticket_type: TicketType,

    /// Priority level
    pub priority: Priority,

    /// Estimate in story points
    pub story_points: Option<u32>,

    /// Labels, without duplicates
    #[serde(default)]
    pub labels: Vec<String>,

    /// Whether the ticket is flagged for attention
    #[serde(default)]
    pub is_flagged: bool,

    /// Parent ticket (usually an epic)
    pub parent_id: Option<TicketId>,

    /// Assigned user
    pub assignee_id: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Type of ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TicketType {
    /// Parent container for stories and tasks
    Epic,

    /// User-facing piece of functionality
    #[default]
    Story,

    /// General task
    Task,

    /// Defect
    Bug,
}

/// Priority of a ticket
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Priority {
    /// Can wait
    Low,

    /// Normal
    #[default]
    Medium,

    /// Should be picked up soon
    High,

    /// Drop everything
    Critical,
}

/// Filter for querying tickets
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Filter by board
    pub board_id: Option<BoardId>,

    /// Filter by sprint
    pub sprint_id: Option<SprintId>,

    /// Filter by ticket type
    pub ticket_type: Option<TicketType>,

    /// Only flagged tickets
    pub flagged_only: bool,

    /// Limit number of results
    pub limit: Option<usize>,
}

impl TicketFilter {
    /// Returns true if the ticket satisfies every set criterion (limit excluded).
    pub fn matches(&self, ticket: &Ticket) -> bool {
        let board_ok = self
            .board_id
            .as_ref()
            .is_none_or(|id| ticket.board_id.as_ref() == Some(id));
        let sprint_ok = self
            .sprint_id
            .as_ref()
            .is_none_or(|id| ticket.sprint_id.as_ref() == Some(id));
        let type_ok = self.ticket_type.is_none_or(|t| ticket.ticket_type == t);

        board_ok && sprint_ok && type_ok && (!self.flagged_only || ticket.is_flagged)
    }
}

// ============================================================================
// Display / FromStr
// ============================================================================

/// Implements case-insensitive `FromStr` and `Display` for a unit enum.
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let text = match self {
                    $(Self::$variant => $text,)+
                };
                f.write_str(text)
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!(
                    "invalid {} '{}' (expected one of: {})",
                    stringify!($ty),
                    s,
                    [$($text),+].join(", ")
                ))
            }
        }
    };
}

text_enum!(BoardType { Scrum => "scrum", Kanban => "kanban" });
text_enum!(SprintStatus { Active => "active", Future => "future", Closed => "closed" });
text_enum!(TicketType { Epic => "Epic", Story => "Story", Task => "Task", Bug => "Bug" });
text_enum!(Priority { Low => "Low", Medium => "Medium", High => "High", Critical => "Critical" });

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("epic", TicketType::Epic)]
    #[case("BUG", TicketType::Bug)]
    #[case(" Task ", TicketType::Task)]
    fn ticket_type_parses_case_insensitively(#[case] input: &str, #[case] expected: TicketType) {
        assert_eq!(input.parse::<TicketType>().unwrap(), expected);
    }

    #[test]
    fn unknown_enum_value_is_an_error() {
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert!(err.contains("Low, Medium, High, Critical"));
    }

    #[test]
    fn defaults_match_import_defaults() {
        assert_eq!(BoardType::default(), BoardType::Kanban);
        assert_eq!(SprintStatus::default(), SprintStatus::Future);
        assert_eq!(TicketType::default(), TicketType::Story);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn wire_names() {
        assert_eq!(serde_json::to_string(&BoardType::Scrum).unwrap(), "\"scrum\"");
        assert_eq!(serde_json::to_string(&SprintStatus::Active).unwrap(), "\"active\"");
        assert_eq!(serde_json::to_string(&TicketType::Epic).unwrap(), "\"Epic\"");
        assert_eq!(serde_json::to_string(&Priority::Critical).unwrap(), "\"Critical\"");
    }

    #[test]
    fn board_serializes_type_field() {
        let board = Board {
            id: BoardId::new("trk-1"),
            name: "Web".to_string(),
            key: "WEB".to_string(),
            board_type: BoardType::Scrum,
            columns: vec![],
        };
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["type"], "scrum");
        assert_eq!(json["id"], "trk-1");
    }

    #[test]
    fn filter_matches_board_and_flag() {
        let ticket = Ticket {
            id: TicketId::new("t"),
            board_id: Some(BoardId::new("b")),
            sprint_id: None,
            title: "x".to_string(),
            description: String::new(),
            status: DEFAULT_TICKET_STATUS.to_string(),
            ticket_type: TicketType::Bug,
            priority: Priority::High,
            story_points: None,
            labels: vec![],
            is_flagged: true,
            parent_id: None,
            assignee_id: None,
            created_at: Utc::now(),
        };

        let by_board = TicketFilter {
            board_id: Some(BoardId::new("b")),
            flagged_only: true,
            ..Default::default()
        };
        assert!(by_board.matches(&ticket));

        let other_board = TicketFilter {
            board_id: Some(BoardId::new("other")),
            ..Default::default()
        };
        assert!(!other_board.matches(&ticket));

        let by_sprint = TicketFilter {
            sprint_id: Some(SprintId::new("s")),
            ..Default::default()
        };
        assert!(!by_sprint.matches(&ticket));
    }
}
