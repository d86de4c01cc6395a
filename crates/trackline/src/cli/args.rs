//! CLI argument structs for all commands.

use clap::Parser;
use std::path::PathBuf;

use super::types::TicketTypeArg;
use super::validators::{validate_entity_id, validate_prefix};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Id prefix (e.g., "trk" for "trk-0f3k...")
    ///
    /// Must be 2-20 alphanumeric characters.
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {}

/// Arguments for the `import` command
#[derive(Parser, Debug, Clone)]
pub struct ImportArgs {
    /// JSON document to import, or `-` to read standard input
    pub file: PathBuf,

    /// Board for tickets that name no board of their own
    ///
    /// Overrides `default-board` from the configuration.
    #[arg(short, long, value_parser = validate_entity_id)]
    pub board: Option<String>,

    /// Show what would be imported without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Import tickets even when no board can be determined for them
    #[arg(long)]
    pub allow_boardless: bool,
}

impl ImportArgs {
    /// True when the document comes from standard input.
    pub fn reads_stdin(&self) -> bool {
        self.file.as_os_str() == "-"
    }
}

/// Arguments for the `boards` command
#[derive(Parser, Debug, Clone)]
pub struct BoardsArgs {}

/// Arguments for the `tickets` command
#[derive(Parser, Debug, Clone)]
pub struct TicketsArgs {
    /// Only tickets on this board
    #[arg(short, long, value_parser = validate_entity_id)]
    pub board: Option<String>,

    /// Only tickets planned into this sprint
    #[arg(short, long, value_parser = validate_entity_id)]
    pub sprint: Option<String>,

    /// Only tickets of this type
    #[arg(short = 't', long = "type", value_enum)]
    pub ticket_type: Option<TicketTypeArg>,

    /// Only flagged tickets
    #[arg(short, long)]
    pub flagged: bool,

    /// Maximum number of tickets to display
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the `delete-board` command
#[derive(Parser, Debug, Clone)]
pub struct DeleteBoardArgs {
    /// Board ID to delete, together with its sprints and tickets
    #[arg(value_parser = validate_entity_id)]
    pub board_id: String,
}

/// Arguments for the `delete-ticket` command
#[derive(Parser, Debug, Clone)]
pub struct DeleteTicketArgs {
    /// Ticket ID to delete
    #[arg(value_parser = validate_entity_id)]
    pub ticket_id: String,
}
