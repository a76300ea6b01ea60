//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Closed: green  (closed tickets, completed actions)
//!   - Error/Open:    red     (open blockers, failures)
//!   - Warning:       yellow  (store load warnings)
//!   - Info/Reference: cyan   (ticket IDs)
//!   - Muted:         dimmed  (placeholders)
//!   - Emphasis:      bold    (section headers)

use crate::domain::{TicketId, TicketStatus};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Color a status: closed green, anything else red.
pub(crate) fn colorize_status(status: &TicketStatus, config: &OutputConfig) -> String {
    let text = format!("{status}");
    if !config.use_colors {
        return text;
    }
    if status.is_closed() {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Format a ticket ID as `#<id>` (cyan).
pub(crate) fn colorize_id(id: TicketId, config: &OutputConfig) -> String {
    info(&format!("#{id}"), config)
}

pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}
