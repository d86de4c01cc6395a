//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:       green   (committed imports, deletions)
//!   - Warning:       yellow  (import warnings, high priority, flags)
//!   - Danger:        red     (critical priority, bugs)
//!   - Info/Reference: cyan   (ids)
//!   - Accent:        magenta (labels, epics)
//!   - Muted:         dimmed  (field labels, low priority)
//!   - Emphasis:      bold    (section headers)

use crate::domain::{Priority, TicketType};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Colorize an entity id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

pub(crate) fn colorize_priority(priority: Priority, config: &OutputConfig) -> String {
    let text = priority.to_string();
    if !config.use_colors {
        return text;
    }
    match priority {
        Priority::Critical => text.red().bold().to_string(),
        Priority::High => text.yellow().to_string(),
        Priority::Medium => text,
        Priority::Low => text.dimmed().to_string(),
    }
}

pub(crate) fn colorize_type(ticket_type: TicketType, config: &OutputConfig) -> String {
    let text = ticket_type.to_string();
    if !config.use_colors {
        return text;
    }
    match ticket_type {
        TicketType::Epic => text.magenta().bold().to_string(),
        TicketType::Bug => text.red().to_string(),
        TicketType::Story | TicketType::Task => text,
    }
}

/// Colorize labels (magenta).
pub(crate) fn colorize_labels(labels: &[String], config: &OutputConfig) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let text = labels.join(", ");
    if !config.use_colors {
        return text;
    }
    text.magenta().to_string()
}

/// Marker shown in front of flagged tickets, blank otherwise.
pub(crate) fn flag_marker(is_flagged: bool, config: &OutputConfig) -> String {
    if !is_flagged {
        return " ".to_string();
    }
    warning("!", config)
}

/// Apply dimmed style to text (for field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn plain() -> OutputConfig {
        OutputConfig { use_colors: false }
    }

    #[rstest]
    #[case(Priority::Critical, "Critical")]
    #[case(Priority::Low, "Low")]
    fn priority_without_colors_is_plain(#[case] priority: Priority, #[case] expected: &str) {
        assert_eq!(colorize_priority(priority, &plain()), expected);
    }

    #[test]
    fn labels_join_with_commas() {
        let labels = vec!["ui".to_string(), "backend".to_string()];
        assert_eq!(colorize_labels(&labels, &plain()), "ui, backend");
        assert_eq!(colorize_labels(&[], &plain()), "");
    }

    #[test]
    fn flag_marker_is_blank_when_unflagged() {
        assert_eq!(flag_marker(false, &plain()), " ");
        assert_eq!(flag_marker(true, &plain()), "!");
    }

    #[test]
    fn colors_add_escape_codes() {
        colored::control::set_override(true);
        let colored = success("ok", &OutputConfig { use_colors: true });
        colored::control::unset_override();
        assert_ne!(colored, "ok");
        assert!(colored.contains("ok"));
    }
}
