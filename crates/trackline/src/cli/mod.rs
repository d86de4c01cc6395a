//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a new trackline workspace
//! - `info`: Show workspace information
//! - `import`: Import boards, sprints and tickets from a JSON document
//! - `boards`: List boards
//! - `tickets`: List tickets with optional filters
//! - `delete-board`: Delete a board with its sprints and tickets
//! - `delete-ticket`: Delete a ticket
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! trackline init --prefix web
//! trackline import export.json --dry-run
//! cat export.json | trackline import - --board web-0f3k...
//! trackline tickets --type bug --flagged
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    BoardsArgs, DeleteBoardArgs, DeleteTicketArgs, ImportArgs, InfoArgs, InitArgs, TicketsArgs,
};
pub use types::TicketTypeArg;
pub use validators::{validate_entity_id, validate_prefix};

/// Trackline - import and browse agile boards from JSON exports
///
/// Data lives in `.trackline/data/` as plain JSON arrays.
#[derive(Parser, Debug)]
#[command(name = "trackline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new trackline workspace
    ///
    /// Creates the `.trackline/` directory with configuration and empty data
    /// files. Run this once in your project root.
    Init(InitArgs),

    /// Show workspace information
    ///
    /// Displays the data directory, id prefix, and entity counts.
    Info(InfoArgs),

    /// Import a JSON document
    ///
    /// Every imported entity gets a fresh id and references inside the
    /// document are rewritten to match. Existing data is never overwritten.
    Import(ImportArgs),

    /// List boards
    Boards(BoardsArgs),

    /// List tickets with optional filters
    Tickets(TicketsArgs),

    /// Delete a board permanently
    ///
    /// Its sprints and tickets are deleted too. This cannot be undone.
    DeleteBoard(DeleteBoardArgs),

    /// Delete a ticket permanently
    ///
    /// Child tickets are kept and lose their parent link.
    DeleteTicket(DeleteTicketArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any error raised by the command.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Info(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_info(&app, args, output_mode).await
            }
            Some(Commands::Import(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_import(&mut app, args, output_mode).await
            }
            Some(Commands::Boards(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_boards(&app, args, output_mode).await
            }
            Some(Commands::Tickets(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_tickets(&app, args, output_mode).await
            }
            Some(Commands::DeleteBoard(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_delete_board(&mut app, args, output_mode).await
            }
            Some(Commands::DeleteTicket(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_delete_ticket(&mut app, args, output_mode).await
            }
            None => {
                println!("Trackline board importer");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
