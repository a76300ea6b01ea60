//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::builder::{GraphFormat, Target};
use crate::domain::TicketId;

/// Validate a ticket number (`5` or `#5`).
pub fn validate_ticket_id(s: &str) -> Result<TicketId, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Ticket ID cannot be empty".to_string());
    }
    match s.parse::<TicketId>() {
        Ok(id) if id.get() > 0 => Ok(id),
        Ok(_) => Err("Ticket ID must be greater than 0".to_string()),
        Err(_) => Err(format!(
            "Invalid ticket ID: '{s}'. Expected a number (e.g., 42 or #42)"
        )),
    }
}

/// Validate a graph target (`5`, `#5`, `ticket/5` or `milestone/<name>`).
pub fn validate_target(s: &str) -> Result<Target, String> {
    s.trim().parse::<Target>().map_err(|_| {
        format!("Invalid graph target: '{s}'. Expected a ticket ID or milestone/<name>")
    })
}

/// Validate an output format name.
pub fn validate_format(s: &str) -> Result<GraphFormat, String> {
    let s = s.trim();
    if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == ':') {
        return Err(format!("Invalid output format: '{s}'"));
    }
    s.parse::<GraphFormat>().map_err(|e| e.to_string())
}

/// Validate an author name.
pub fn validate_author(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Author cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}
