//! Command execution functions.
//!
//! Each function takes the parsed arguments and an [`App`], performs the
//! operation, and prints the result in the requested [`OutputMode`].

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use super::args::{
    BoardsArgs, DeleteBoardArgs, DeleteTicketArgs, ImportArgs, InfoArgs, InitArgs, TicketsArgs,
};
use crate::app::App;
use crate::commands::import::{self, ImportOptions};
use crate::domain::{BoardId, SprintId, TicketFilter, TicketId};
use crate::error::Error;
use crate::output::{self, OutputMode, WorkspaceInfo};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!(
            "Initializing trackline workspace{}...",
            args.prefix
                .as_ref()
                .map(|p| format!(" with prefix '{p}'"))
                .unwrap_or_default()
        );
    }

    let result = init::init(&current_dir, args.prefix.as_deref()).await?;

    if !args.quiet {
        println!("Initialized trackline in {}", result.trackline_dir.display());
        println!("  Config:    {}", result.config_file.display());
        println!("  Data:      {}", result.data_dir.display());
        println!("  Id prefix: {}", result.prefix);
    }

    Ok(())
}

/// Execute the info command
pub async fn execute_info(app: &App, _args: &InfoArgs, output_mode: OutputMode) -> Result<()> {
    let snapshot = app.storage().export_all().await?;
    let config = app.config();

    let info = WorkspaceInfo {
        root: app.root_dir().display().to_string(),
        data_dir: app
            .backend()
            .data_dir()
            .map(|dir| dir.display().to_string()),
        id_prefix: config.id_prefix.clone(),
        default_board: config.default_board.as_ref().map(ToString::to_string),
        boards: snapshot.boards.len(),
        sprints: snapshot.sprints.len(),
        tickets: snapshot.tickets.len(),
    };

    output::print_info(&info, output_mode)?;
    Ok(())
}

/// Execute the import command
pub async fn execute_import(app: &mut App, args: &ImportArgs, output_mode: OutputMode) -> Result<()> {
    let raw_text = if args.reads_stdin() {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read import document from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(&args.file)
            .await
            .with_context(|| format!("Failed to read {}", args.file.display()))?
    };

    let options = ImportOptions {
        board: args.board.as_deref().map(BoardId::new),
        dry_run: args.dry_run,
        allow_boardless: args.allow_boardless,
    };

    let report = import::run(app, &raw_text, &options).await?;
    output::print_import_report(&report, output_mode)?;
    Ok(())
}

/// Execute the boards command
pub async fn execute_boards(app: &App, _args: &BoardsArgs, output_mode: OutputMode) -> Result<()> {
    let boards = app.storage().list_boards().await?;
    output::print_boards(&boards, output_mode)?;
    Ok(())
}

/// Execute the tickets command
pub async fn execute_tickets(app: &App, args: &TicketsArgs, output_mode: OutputMode) -> Result<()> {
    let filter = TicketFilter {
        board_id: args.board.as_deref().map(BoardId::new),
        sprint_id: args.sprint.as_deref().map(SprintId::new),
        ticket_type: args.ticket_type.map(Into::into),
        flagged_only: args.flagged,
        limit: args.limit,
    };

    let tickets = app.storage().list_tickets(&filter).await?;
    output::print_tickets(&tickets, output_mode)?;
    Ok(())
}

/// Execute the delete-board command
pub async fn execute_delete_board(
    app: &mut App,
    args: &DeleteBoardArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let board_id = BoardId::new(&args.board_id);

    let board = app
        .storage()
        .get_board(&board_id)
        .await?
        .ok_or_else(|| Error::BoardNotFound(board_id.clone()))?;

    app.storage_mut().delete_board(&board_id).await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "deleted": args.board_id,
                "status": "success"
            }))?;
        }
        OutputMode::Text => {
            output::print_success(&format!("Deleted board: {} ({})", board.id, board.name))?;
        }
    }

    Ok(())
}

/// Execute the delete-ticket command
pub async fn execute_delete_ticket(
    app: &mut App,
    args: &DeleteTicketArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let ticket_id = TicketId::new(&args.ticket_id);

    app.storage_mut().delete_ticket(&ticket_id).await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "deleted": args.ticket_id,
                "status": "success"
            }))?;
        }
        OutputMode::Text => {
            output::print_success(&format!("Deleted ticket: {}", args.ticket_id))?;
        }
    }

    Ok(())
}
