//! Lenient field extraction from untrusted import JSON.
//!
//! Import documents are often hand-written or machine-generated, so every
//! accessor here accepts whatever shape it is given and falls back to "absent"
//! instead of failing.

use crate::domain::Column;
use serde_json::Value;
use std::str::FromStr;

/// Elements of an array field, or nothing if the field is missing or not an array.
pub(super) fn items<'a>(entry: &'a Value, field: &str) -> &'a [Value] {
    entry
        .get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// An import-local reference token.
///
/// Strings and numbers are both accepted so `"id": 7` and `"id": "7"` name the
/// same entity. Blank strings and every other JSON type mean "no token".
pub(super) fn token(entry: &Value, field: &str) -> Option<String> {
    match entry.get(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_token(n)),
        _ => None,
    }
}

fn number_token(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // 7.0 and 7 are the same token
        #[allow(clippy::cast_possible_truncation)]
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

/// A non-empty string field.
pub(super) fn text(entry: &Value, field: &str) -> Option<String> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A string field, or `default` when missing, empty or not a string.
pub(super) fn text_or(entry: &Value, field: &str, default: &str) -> String {
    text(entry, field).unwrap_or_else(|| default.to_string())
}

/// An enum field parsed case-insensitively, or the enum's default.
pub(super) fn parsed_or_default<T>(entry: &Value, field: &str) -> T
where
    T: FromStr + Default,
{
    text(entry, field)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

/// JavaScript-style truthiness, used for boolean flags.
pub(super) fn truthy(entry: &Value, field: &str) -> bool {
    match entry.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Labels: strings only, trimmed, blanks dropped, first occurrence kept.
pub(super) fn labels(entry: &Value) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in items(entry, "labels").iter().filter_map(Value::as_str) {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    out
}

/// Outcome of reading a story-point estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum StoryPoints {
    /// Field missing, null or blank
    Absent,
    /// A usable non-negative estimate
    Valid(u32),
    /// Present but unusable; carries the raw value for reporting
    Invalid(String),
}

/// Story points from a number or numeric text.
///
/// Text is read by its leading run of digits (`"8 pts"` is 8). Fractions are
/// truncated. Negative, overflowing and non-numeric values are invalid.
pub(super) fn story_points(entry: &Value) -> StoryPoints {
    let Some(value) = entry.get("story_points") else {
        return StoryPoints::Absent;
    };

    match value {
        Value::Null => StoryPoints::Absent,
        Value::Number(n) => number_points(n),
        Value::String(s) => text_points(s),
        other => StoryPoints::Invalid(other.to_string()),
    }
}

fn number_points(n: &serde_json::Number) -> StoryPoints {
    if let Some(u) = n.as_u64() {
        return u32::try_from(u)
            .map_or_else(|_| StoryPoints::Invalid(n.to_string()), StoryPoints::Valid);
    }
    match n.as_f64() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(f) if f.is_finite() && f >= 0.0 && f < f64::from(u32::MAX) => {
            StoryPoints::Valid(f.trunc() as u32)
        }
        _ => StoryPoints::Invalid(n.to_string()),
    }
}

fn text_points(raw: &str) -> StoryPoints {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return StoryPoints::Absent;
    }

    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    unsigned[..digits_end]
        .parse::<u32>()
        .map_or_else(|_| StoryPoints::Invalid(raw.to_string()), StoryPoints::Valid)
}

/// Workflow columns; a column needs at least an id or a title.
pub(super) fn columns(board: &Value) -> Vec<Column> {
    items(board, "columns")
        .iter()
        .filter_map(|column| {
            let id = token(column, "id");
            let title = text(column, "title");
            let (id, title) = match (id, title) {
                (Some(id), Some(title)) => (id, title),
                (Some(id), None) => (id.clone(), id),
                (None, Some(title)) => (title.clone(), title),
                (None, None) => return None,
            };
            let limit = match story_limit(column) {
                StoryPoints::Valid(limit) => Some(limit),
                StoryPoints::Absent | StoryPoints::Invalid(_) => None,
            };
            Some(Column { id, title, limit })
        })
        .collect()
}

fn story_limit(column: &Value) -> StoryPoints {
    match column.get("limit") {
        None | Some(Value::Null) => StoryPoints::Absent,
        Some(Value::Number(n)) => number_points(n),
        Some(Value::String(s)) => text_points(s),
        Some(other) => StoryPoints::Invalid(other.to_string()),
    }
}
