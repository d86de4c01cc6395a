//! CLI input validation functions.
//!
//! Used by clap's `value_parser` attribute so bad input is rejected at parse
//! time.

/// Validate an id prefix, returning it trimmed.
///
/// Delegates to [`crate::config::validate_prefix`].
pub fn validate_prefix(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    crate::config::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate an entity id argument.
///
/// Ids are opaque to the CLI; only empty input and whitespace are rejected.
pub fn validate_entity_id(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("ID cannot be empty".to_string());
    }
    if s.chars().any(char::is_whitespace) {
        return Err(format!("Invalid ID '{s}': IDs cannot contain whitespace"));
    }
    Ok(s.to_string())
}
