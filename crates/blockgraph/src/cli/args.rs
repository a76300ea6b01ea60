//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;
use std::path::PathBuf;

use super::types::DirectionArg;
use super::validators::{validate_author, validate_format, validate_target, validate_ticket_id};
use crate::builder::{GraphFormat, Target};
use crate::domain::TicketId;

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// What to graph: a ticket (`42`, `#42`, `ticket/42`) or `milestone/<name>`
    #[arg(value_parser = validate_target)]
    pub target: Target,

    /// Include ticket summaries in node labels
    #[arg(short, long)]
    pub summary: bool,

    /// Group tickets into one cluster per milestone
    #[arg(short, long)]
    pub cluster: bool,

    /// Output format: text, debug, or a renderer format (png, svg, ps, pdf)
    #[arg(short, long, value_parser = validate_format, default_value = "text")]
    pub format: GraphFormat,

    /// Layout direction (overrides the configured direction)
    #[arg(short, long, value_enum)]
    pub direction: Option<DirectionArg>,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `links` command
#[derive(Parser, Debug, Clone)]
pub struct LinksArgs {
    /// Ticket ID
    #[arg(value_parser = validate_ticket_id)]
    pub ticket: TicketId,
}

/// Arguments for the `link` command
#[derive(Parser, Debug, Clone)]
pub struct LinkArgs {
    /// Ticket ID to change
    #[arg(value_parser = validate_ticket_id)]
    pub ticket: TicketId,

    /// Tickets this ticket should block (comma-separated)
    #[arg(long, value_delimiter = ',', value_parser = validate_ticket_id)]
    pub block: Vec<TicketId>,

    /// Tickets this ticket should stop blocking (comma-separated)
    #[arg(long, value_delimiter = ',', value_parser = validate_ticket_id)]
    pub unblock: Vec<TicketId>,

    /// Tickets that should block this ticket (comma-separated)
    #[arg(long, value_delimiter = ',', value_parser = validate_ticket_id)]
    pub blocked_by: Vec<TicketId>,

    /// Tickets that should stop blocking this ticket (comma-separated)
    #[arg(long, value_delimiter = ',', value_parser = validate_ticket_id)]
    pub unblocked_by: Vec<TicketId>,

    /// Name recorded in the change history
    #[arg(short, long, value_parser = validate_author)]
    pub author: String,

    /// Comment added to every ticket whose links change
    #[arg(short = 'm', long, default_value = "")]
    pub comment: String,
}

impl LinkArgs {
    /// Returns `true` if no change was requested.
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
            && self.unblock.is_empty()
            && self.blocked_by.is_empty()
            && self.unblocked_by.is_empty()
    }
}

/// Arguments for the `check` command
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Ticket ID
    #[arg(value_parser = validate_ticket_id)]
    pub ticket: TicketId,

    /// Workflow action to validate (e.g., resolve)
    #[arg(short, long, default_value = "")]
    pub action: String,
}
