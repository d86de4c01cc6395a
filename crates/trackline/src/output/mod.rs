//! Output formatting for CLI commands.
//!
//! Every printer comes in a text flavor for people and a JSON flavor for
//! scripts. Text printers write to any `io::Write` so they can be tested
//! against a buffer.

pub mod color;

use crate::commands::import::ImportReport;
use crate::domain::{Board, Ticket};
use crate::import::ImportWarning;
use color::{
    bold, colorize_id, colorize_labels, colorize_priority, colorize_type, dimmed, flag_marker,
    success, warning,
};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `TRACKLINE_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TRACKLINE_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Summary shown by the `info` command
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceInfo {
    /// Directory containing `.trackline/`
    pub root: String,
    /// Data directory, for file-backed storage
    pub data_dir: Option<String>,
    /// Prefix for generated ids
    pub id_prefix: String,
    /// Configured fallback board for imports
    pub default_board: Option<String>,
    /// Number of boards
    pub boards: usize,
    /// Number of sprints
    pub sprints: usize,
    /// Number of tickets
    pub tickets: usize,
}

#[derive(Serialize)]
struct ImportReportJson<'a> {
    committed: bool,
    stats: &'a crate::import::ImportStats,
    warnings: &'a [ImportWarning],
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print the preview and outcome of an import
pub fn print_import_report(report: &ImportReport, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_import_report(&mut handle, report, &OutputConfig::from_env())
        }
        OutputMode::Json => print_json(&ImportReportJson {
            committed: report.committed,
            stats: &report.batch.stats,
            warnings: &report.batch.warnings,
        }),
    }
}

/// Print boards in the specified format
pub fn print_boards(boards: &[Board], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_boards(&mut handle, boards, &OutputConfig::from_env())
        }
        OutputMode::Json => print_json(&boards),
    }
}

/// Print tickets in the specified format
pub fn print_tickets(tickets: &[Ticket], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_tickets(&mut handle, tickets, &OutputConfig::from_env())
        }
        OutputMode::Json => print_json(&tickets),
    }
}

/// Print workspace information in the specified format
pub fn print_info(info: &WorkspaceInfo, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_info(&mut handle, info, &OutputConfig::from_env())
        }
        OutputMode::Json => print_json(info),
    }
}

/// Print a success message (green when colors are on)
pub fn print_success(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", success(msg, &OutputConfig::from_env()))
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_import_report<W: Write>(
    w: &mut W,
    report: &ImportReport,
    config: &OutputConfig,
) -> io::Result<()> {
    let stats = &report.batch.stats;
    writeln!(
        w,
        "{} {} board(s), {} sprint(s), {} ticket(s)",
        bold("Import:", config),
        stats.boards,
        stats.sprints,
        stats.tickets
    )?;

    if !report.batch.warnings.is_empty() {
        writeln!(
            w,
            "{}",
            warning(
                &format!("{} warning(s):", report.batch.warnings.len()),
                config
            )
        )?;
        for item in &report.batch.warnings {
            writeln!(w, "  {} {}", dimmed("-", config), item)?;
        }
    }

    if report.committed {
        writeln!(w, "{}", success("Import committed.", config))?;
    } else if report.batch.is_empty() {
        writeln!(w, "Nothing to import.")?;
    } else {
        writeln!(w, "{}", dimmed("Dry run: nothing was written.", config))?;
    }
    Ok(())
}

fn write_boards<W: Write>(w: &mut W, boards: &[Board], config: &OutputConfig) -> io::Result<()> {
    if boards.is_empty() {
        writeln!(w, "No boards found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} board(s):", boards.len())?;
    writeln!(w)?;

    for board in boards {
        writeln!(
            w,
            "{}  {:<6} {}  {}",
            colorize_id(board.id.as_str(), config),
            board.key,
            board.name,
            dimmed(&format!("({}, {} columns)", board.board_type, board.columns.len()), config)
        )?;
    }
    Ok(())
}

fn write_tickets<W: Write>(w: &mut W, tickets: &[Ticket], config: &OutputConfig) -> io::Result<()> {
    if tickets.is_empty() {
        writeln!(w, "No tickets found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} ticket(s):", tickets.len())?;
    writeln!(w)?;

    for ticket in tickets {
        write!(
            w,
            "{} {}  {}  {}  [{}]  {}",
            flag_marker(ticket.is_flagged, config),
            colorize_id(ticket.id.as_str(), config),
            colorize_type(ticket.ticket_type, config),
            colorize_priority(ticket.priority, config),
            ticket.status,
            ticket.title
        )?;
        if let Some(points) = ticket.story_points {
            write!(w, " {}", dimmed(&format!("({points} pts)"), config))?;
        }
        writeln!(w)?;

        if !ticket.labels.is_empty() {
            writeln!(
                w,
                "    {} {}",
                dimmed("Labels:", config),
                colorize_labels(&ticket.labels, config)
            )?;
        }
    }
    Ok(())
}

fn write_info<W: Write>(w: &mut W, info: &WorkspaceInfo, config: &OutputConfig) -> io::Result<()> {
    writeln!(w, "{}", bold("Trackline Workspace", config))?;
    writeln!(w)?;
    writeln!(w, "{}         {}", dimmed("Root:", config), info.root)?;
    writeln!(
        w,
        "{}         {}",
        dimmed("Data:", config),
        info.data_dir.as_deref().unwrap_or("(in memory)")
    )?;
    writeln!(w, "{}    {}", dimmed("Id prefix:", config), info.id_prefix)?;
    if let Some(board) = &info.default_board {
        writeln!(
            w,
            "{} {}",
            dimmed("Default board:", config),
            colorize_id(board, config)
        )?;
    }
    writeln!(w)?;
    writeln!(
        w,
        "{} boards, {} sprints, {} tickets",
        info.boards, info.sprints, info.tickets
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoardId;
    use crate::import::reconcile;

    fn plain() -> OutputConfig {
        OutputConfig { use_colors: false }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn import_report_lists_warnings() {
        let batch = reconcile(
            r#"{"tickets": [{"sprint_id": "nope"}]}"#,
            Some(&BoardId::new("B1")),
        )
        .unwrap();
        let report = ImportReport {
            batch,
            committed: false,
        };

        let text = render(|w| write_import_report(w, &report, &plain()));
        assert!(text.starts_with("Import: 0 board(s), 0 sprint(s), 1 ticket(s)"));
        assert!(text.contains("1 warning(s):"));
        assert!(text.contains("nope"));
        assert!(text.contains("Dry run"));
    }

    #[test]
    fn committed_report() {
        let batch = reconcile(r#"{"boards": [{}]}"#, None).unwrap();
        let report = ImportReport {
            batch,
            committed: true,
        };

        let text = render(|w| write_import_report(w, &report, &plain()));
        assert!(text.contains("Import committed."));
        assert!(!text.contains("warning"));
    }

    #[test]
    fn empty_lists() {
        assert_eq!(render(|w| write_boards(w, &[], &plain())), "No boards found.\n");
        assert_eq!(render(|w| write_tickets(w, &[], &plain())), "No tickets found.\n");
    }

    #[test]
    fn tickets_show_flag_points_and_labels() {
        let batch = reconcile(
            r#"{"tickets": [{"title": "Login", "story_points": 3, "is_flagged": true, "labels": ["auth"]}]}"#,
            Some(&BoardId::new("B1")),
        )
        .unwrap();

        let text = render(|w| write_tickets(w, &batch.tickets, &plain()));
        assert!(text.contains("Found 1 ticket(s):"));
        assert!(text.contains("! "));
        assert!(text.contains("Story  Medium  [Todo]  Login (3 pts)"));
        assert!(text.contains("Labels: auth"));
    }

    #[test]
    fn boards_show_key_and_type() {
        let batch = reconcile(
            r#"{"boards": [{"name": "Web", "key": "WEB", "type": "scrum"}]}"#,
            None,
        )
        .unwrap();

        let text = render(|w| write_boards(w, &batch.boards, &plain()));
        assert!(text.contains("WEB"));
        assert!(text.contains("Web"));
        assert!(text.contains("(scrum, 0 columns)"));
    }

    #[test]
    fn info_without_data_dir() {
        let info = WorkspaceInfo {
            root: "/work".to_string(),
            data_dir: None,
            id_prefix: "trk".to_string(),
            default_board: None,
            boards: 1,
            sprints: 2,
            tickets: 3,
        };

        let text = render(|w| write_info(w, &info, &plain()));
        assert!(text.contains("(in memory)"));
        assert!(text.contains("1 boards, 2 sprints, 3 tickets"));
        assert!(!text.contains("Default board"));
    }
}
