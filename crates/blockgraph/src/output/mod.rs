//! Output formatting for CLI commands.
//!
//! This module provides utilities for formatting command output in both
//! human-readable text format and JSON format for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers

pub mod color;

use crate::domain::{Ticket, TicketId, TicketStatus};
use crate::links::{parse_ticket_refs, SaveSummary};
use crate::validate::ValidationError;
use color::{bold, colorize_id, colorize_status, dimmed};
use serde::Serialize;
use std::collections::BTreeSet;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `BLOCKGRAPH_COLOR`: Set to "0" or "false" to disable colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("BLOCKGRAPH_COLOR")
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

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// A ticket referenced from a links report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedTicket {
    /// Ticket number
    pub id: TicketId,
    /// Current status
    pub status: TicketStatus,
    /// One-line summary
    pub summary: String,
}

impl From<&Ticket> for LinkedTicket {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            status: ticket.status.clone(),
            summary: ticket.summary.clone(),
        }
    }
}

/// Both directions of a ticket's links, resolved to ticket details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinksReport {
    /// The ticket itself
    pub ticket: LinkedTicket,
    /// Tickets it blocks
    pub blocking: Vec<LinkedTicket>,
    /// Tickets blocking it
    pub blocked_by: Vec<LinkedTicket>,
}

/// Print a links report in the specified format
pub fn print_links(report: &LinksReport, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_links_text(&mut handle, report, &config),
        OutputMode::Json => write_json(&mut handle, report),
    }
}

/// Print what a link save changed
pub fn print_save_summary(id: TicketId, summary: &SaveSummary, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_save_summary_text(&mut handle, id, summary, &config),
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({
                "ticket": id,
                "inserted": summary.inserted,
                "deleted": summary.deleted,
                "updated": summary.updated,
            }),
        ),
    }
}

/// Print validation errors for an action
pub fn print_validation(
    id: TicketId,
    action: &str,
    errors: &[ValidationError],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_validation_text(&mut handle, id, action, errors, &config),
        OutputMode::Json => {
            let errors: Vec<_> = errors
                .iter()
                .map(|e| serde_json::json!({ "blocker": e.blocker, "message": e.message }))
                .collect();
            write_json(
                &mut handle,
                &serde_json::json!({
                    "ticket": id,
                    "action": action,
                    "allowed": errors.is_empty(),
                    "errors": errors,
                }),
            )
        }
    }
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

/// Describe a change of a `blocking`/`blockedby` field.
///
/// Returns e.g. `"4, 5 added; 2 removed"`, omitting either half when empty.
/// Returns `None` when nothing changed or either value is not a list of
/// ticket numbers.
///
/// ```
/// use blockgraph::output::describe_field_change;
///
/// assert_eq!(describe_field_change("1, 2", "1, 3").as_deref(), Some("3 added; 2 removed"));
/// assert_eq!(describe_field_change("1", "1"), None);
/// ```
#[must_use]
pub fn describe_field_change(old: &str, new: &str) -> Option<String> {
    let old: BTreeSet<TicketId> = parse_ticket_refs(old)?.into_iter().collect();
    let new: BTreeSet<TicketId> = parse_ticket_refs(new)?.into_iter().collect();

    let join = |ids: BTreeSet<&TicketId>| {
        ids.into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let added: BTreeSet<_> = new.difference(&old).collect();
    let removed: BTreeSet<_> = old.difference(&new).collect();

    let mut parts = Vec::new();
    if !added.is_empty() {
        parts.push(format!("{} added", join(added)));
    }
    if !removed.is_empty() {
        parts.push(format!("{} removed", join(removed)));
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

fn print_links_text<W: Write>(
    w: &mut W,
    report: &LinksReport,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} {}",
        colorize_id(report.ticket.id, config),
        colorize_status(&report.ticket.status, config),
        report.ticket.summary
    )?;

    for (title, tickets) in [
        ("Blocking:", &report.blocking),
        ("Blocked by:", &report.blocked_by),
    ] {
        writeln!(w)?;
        writeln!(w, "  {}", bold(title, config))?;
        if tickets.is_empty() {
            writeln!(w, "    {}", dimmed("(none)", config))?;
        }
        for t in tickets {
            writeln!(
                w,
                "    {} {} {}",
                colorize_id(t.id, config),
                colorize_status(&t.status, config),
                t.summary
            )?;
        }
    }
    Ok(())
}

fn print_save_summary_text<W: Write>(
    w: &mut W,
    id: TicketId,
    summary: &SaveSummary,
    config: &OutputConfig,
) -> io::Result<()> {
    if summary.is_empty() {
        writeln!(w, "No changes to {}", colorize_id(id, config))?;
        return Ok(());
    }
    for row in &summary.inserted {
        writeln!(w, "{} {row}", success("+", config))?;
    }
    for row in &summary.deleted {
        writeln!(w, "{} {row}", error("-", config))?;
    }
    writeln!(
        w,
        "Updated {} ticket(s)",
        summary.updated.len()
    )
}

fn print_validation_text<W: Write>(
    w: &mut W,
    id: TicketId,
    action: &str,
    errors: &[ValidationError],
    config: &OutputConfig,
) -> io::Result<()> {
    if errors.is_empty() {
        return writeln!(
            w,
            "{} '{action}' is allowed for {}",
            success("ok:", config),
            colorize_id(id, config)
        );
    }
    for e in errors {
        writeln!(w, "{} {e}", error("error:", config))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Relation;
    use rstest::rstest;

    fn plain() -> OutputConfig {
        OutputConfig::new(false)
    }

    #[rstest]
    #[case("", "4", Some("4 added"))]
    #[case("2, 4", "4", Some("2 removed"))]
    #[case("1, 2", "3, 1, 9", Some("3, 9 added; 2 removed"))]
    #[case("1, 2", "2,1", None)]
    #[case("", "", None)]
    #[case("1, x", "1", None)]
    fn test_describe_field_change(
        #[case] old: &str,
        #[case] new: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(describe_field_change(old, new).as_deref(), expected);
    }

    #[test]
    fn test_links_text() {
        let report = LinksReport {
            ticket: LinkedTicket {
                id: TicketId(10),
                status: TicketStatus::New,
                summary: "blocked".to_string(),
            },
            blocking: vec![],
            blocked_by: vec![LinkedTicket {
                id: TicketId(1),
                status: TicketStatus::Closed,
                summary: "done".to_string(),
            }],
        };

        let mut out = Vec::new();
        print_links_text(&mut out, &report, &plain()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "#10 new blocked\n\n  Blocking:\n    (none)\n\n  Blocked by:\n    #1 closed done\n"
        );
    }

    #[test]
    fn test_save_summary_text() {
        let summary = SaveSummary {
            inserted: vec![Relation::new(TicketId(1), TicketId(2))],
            deleted: vec![],
            updated: [TicketId(2)].into_iter().collect(),
        };

        let mut out = Vec::new();
        print_save_summary_text(&mut out, TicketId(1), &summary, &plain()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "+ #1 blocks #2\nUpdated 1 ticket(s)\n"
        );

        let mut out = Vec::new();
        print_save_summary_text(&mut out, TicketId(1), &SaveSummary::default(), &plain()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No changes to #1\n");
    }
}
