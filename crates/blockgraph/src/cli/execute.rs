//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::{bail, Result};
use chrono::Utc;
use std::io::Write;

use super::args::{CheckArgs, GraphArgs, LinkArgs, LinksArgs};
use crate::app::App;
use crate::builder::{self, GraphBuilder};
use crate::links::TicketLinks;
use crate::output::{self, LinkedTicket, LinksReport, OutputMode};
use crate::storage::TicketStore;
use crate::validate;

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &GraphArgs) -> Result<()> {
    let mut graph_config = app.config().graph.clone();
    if let Some(direction) = args.direction {
        graph_config.direction = direction.into();
    }

    let seeds = args.target.seeds(app.store()).await?;
    if seeds.is_empty() {
        tracing::info!(graph = %args.target, "No tickets to graph");
    }

    let graph_builder = GraphBuilder::new(&graph_config)
        .label_summary(args.summary)
        .cluster_by_milestone(args.cluster);
    let bytes = builder::render(app.store(), app.config(), &graph_builder, &seeds, &args.format).await?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &bytes).await?;
            tracing::info!(path = %path.display(), bytes = bytes.len(), "Wrote graph");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&bytes)?;
            if !bytes.ends_with(b"\n") {
                writeln!(handle)?;
            }
        }
    }
    Ok(())
}

/// Execute the links command
pub async fn execute_links(app: &App, args: &LinksArgs, output_mode: OutputMode) -> Result<()> {
    let store = app.store();
    let links = TicketLinks::load(store, args.ticket).await?;

    let mut report = LinksReport {
        ticket: LinkedTicket::from(links.ticket()),
        blocking: Vec::new(),
        blocked_by: Vec::new(),
    };
    for (ids, out) in [
        (&links.blocking, &mut report.blocking),
        (&links.blocked_by, &mut report.blocked_by),
    ] {
        for &id in ids {
            match store.get(id).await? {
                Some(ticket) => out.push(LinkedTicket::from(&ticket)),
                None => tracing::debug!(ticket = %id, "Skipping missing linked ticket"),
            }
        }
    }

    output::print_links(&report, output_mode)?;
    Ok(())
}

/// Execute the link command
pub async fn execute_link(app: &App, args: &LinkArgs, output_mode: OutputMode) -> Result<()> {
    let mut links = TicketLinks::load(app.store(), args.ticket).await?;

    links.blocking.extend(&args.block);
    for id in &args.unblock {
        links.blocking.remove(id);
    }
    links.blocked_by.extend(&args.blocked_by);
    for id in &args.unblocked_by {
        links.blocked_by.remove(id);
    }

    let summary = links
        .save(app.store(), &args.author, &args.comment, Utc::now())
        .await?;
    if !summary.is_empty() {
        app.save().await?;
    }

    output::print_save_summary(args.ticket, &summary, output_mode)?;
    Ok(())
}

/// Execute the check command
///
/// Fails when the action is not allowed, so scripts can rely on the exit
/// status.
pub async fn execute_check(app: &App, args: &CheckArgs, output_mode: OutputMode) -> Result<()> {
    let errors = validate::check_action(
        app.store(),
        &app.config().check_actions,
        args.ticket,
        &args.action,
    )
    .await?;

    output::print_validation(args.ticket, &args.action, &errors, output_mode)?;
    if !errors.is_empty() {
        bail!(
            "Action '{}' is not allowed for #{}: {} problem(s)",
            args.action,
            args.ticket,
            errors.len()
        );
    }
    Ok(())
}
