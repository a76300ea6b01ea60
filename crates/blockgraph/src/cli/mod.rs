//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for blockgraph using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `graph`: Render the dependency graph of a ticket or milestone
//! - `links`: Show what a ticket blocks and what blocks it
//! - `link`: Add or remove blocking relations
//! - `check`: Check whether a workflow action is allowed
//!
//! # Global Flags
//!
//! - `--config`: Configuration file (default `blockgraph.yaml`)
//! - `--data`: Ticket data file (overrides the configured `data_file`)
//! - `--json`: Output in JSON format
//!
//! # Example
//!
//! ```bash
//! blockgraph link 12 --block 14,15 --author alice --comment "split the work"
//! blockgraph graph milestone/1.0 --cluster --format png --output deps.png
//! blockgraph check 14 --action resolve
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Re-export argument structs
pub use args::{CheckArgs, GraphArgs, LinkArgs, LinksArgs};

// Re-export types
pub use types::DirectionArg;

// Re-export validators for external use
pub use validators::{validate_author, validate_format, validate_target, validate_ticket_id};

/// Blockgraph - ticket dependencies and their graphs
///
/// Tracks which tickets block which, keeps the `blocking`/`blockedby`
/// fields of every ticket in sync, and renders dependency graphs.
#[derive(Parser, Debug)]
#[command(name = "blockgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ticket data file (JSON)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

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
    /// Render a dependency graph
    ///
    /// Walks every ticket reachable from the target through blocking
    /// relations, in both directions, and renders the result.
    Graph(GraphArgs),

    /// Show the links of a ticket
    Links(LinksArgs),

    /// Add or remove blocking relations of a ticket
    ///
    /// Updates the relation table, the mirror fields of the other tickets,
    /// and their change history in one step.
    Link(LinkArgs),

    /// Check whether an action is allowed
    ///
    /// Fails if the action requires closed blockers and some are still open.
    Check(CheckArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Blockgraph ticket dependency tool");
            println!("Use --help for more information");
            return Ok(());
        };

        let app = App::open(self.config.as_deref(), self.data.as_deref()).await?;
        match command {
            Commands::Graph(args) => execute::execute_graph(&app, args).await,
            Commands::Links(args) => execute::execute_links(&app, args, output_mode).await,
            Commands::Link(args) => execute::execute_link(&app, args, output_mode).await,
            Commands::Check(args) => execute::execute_check(&app, args, output_mode).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{GraphFormat, Target};
    use crate::domain::TicketId;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["blockgraph"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_graph() {
        let cli = Cli::try_parse_from([
            "blockgraph",
            "graph",
            "milestone/1.0",
            "--cluster",
            "--format",
            "svg",
            "--direction",
            "LR",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Graph(args)) => {
                assert_eq!(args.target, Target::Milestone("1.0".to_string()));
                assert!(args.cluster);
                assert!(!args.summary);
                assert_eq!(args.format, GraphFormat::Image("svg".to_string()));
                assert_eq!(args.direction, Some(DirectionArg::Lr));
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_graph_defaults_to_text() {
        let cli = Cli::try_parse_from(["blockgraph", "graph", "#5"]).unwrap();
        match cli.command {
            Some(Commands::Graph(args)) => {
                assert_eq!(args.target, Target::Ticket(TicketId(5)));
                assert_eq!(args.format, GraphFormat::Text);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_link_lists() {
        let cli = Cli::try_parse_from([
            "blockgraph",
            "--json",
            "link",
            "3",
            "--block",
            "4,5",
            "--unblocked-by",
            "#1",
            "--author",
            "bob",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Some(Commands::Link(args)) => {
                assert_eq!(args.ticket, TicketId(3));
                assert_eq!(args.block, vec![TicketId(4), TicketId(5)]);
                assert_eq!(args.unblocked_by, vec![TicketId(1)]);
                assert!(args.unblock.is_empty());
                assert_eq!(args.author, "bob");
                assert_eq!(args.comment, "");
                assert!(!args.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_link_requires_author() {
        assert!(Cli::try_parse_from(["blockgraph", "link", "3", "--block", "4"]).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_ticket_id() {
        assert!(Cli::try_parse_from(["blockgraph", "links", "abc"]).is_err());
        assert!(Cli::try_parse_from(["blockgraph", "links", "0"]).is_err());
    }

    #[test]
    fn test_parse_global_paths() {
        let cli = Cli::try_parse_from([
            "blockgraph",
            "check",
            "9",
            "--action",
            "resolve",
            "--config",
            "conf.yaml",
            "--data",
            "data.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("conf.yaml")));
        assert_eq!(cli.data, Some(PathBuf::from("data.json")));
    }
}
