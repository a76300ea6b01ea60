//! Core in-memory store data structures.
//!
//! This module contains the inner store structure that holds all data
//! and is wrapped in `Arc<Mutex<>>` for thread safety.

use crate::domain::{ChangeEntry, Relation, Ticket, TicketId};
use crate::error::{Error, Result};
use crate::storage::Write;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::BTreeMap;
use tracing::trace;

/// Inner store structure (not thread-safe).
///
/// # Relation Representation
///
/// Relation rows live in a petgraph `DiGraphMap` keyed by ticket ID with
/// edges directed from **blocker to blocked** (`source -> dest`). A graph map
/// holds at most one edge per ordered pair, which gives the `(source, dest)`
/// uniqueness of the relation table for free. Every ticket in `tickets` has
/// a node in `relations`; removing the node cascades to its rows.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryStoreInner {
    /// Tickets indexed by ID, ordered for deterministic listings
    pub(super) tickets: BTreeMap<TicketId, Ticket>,

    /// Relation rows, `source -> dest` meaning source blocks dest
    pub(super) relations: DiGraphMap<TicketId, ()>,

    /// Append-only audit trail
    pub(super) audit: Vec<ChangeEntry>,
}

impl InMemoryStoreInner {
    /// Create a new empty store
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a ticket, keeping its relation rows.
    pub(super) fn insert_ticket(&mut self, ticket: Ticket) {
        self.relations.add_node(ticket.id);
        self.tickets.insert(ticket.id, ticket);
    }

    /// Remove a ticket and every relation row referencing it.
    pub(super) fn remove_ticket(&mut self, id: TicketId) -> Option<Ticket> {
        let ticket = self.tickets.remove(&id)?;
        self.relations.remove_node(id);
        Some(ticket)
    }

    /// Neighbors of `id` in `direction`, ascending.
    pub(super) fn neighbors(&self, id: TicketId, direction: Direction) -> Vec<TicketId> {
        if !self.relations.contains_node(id) {
            return Vec::new();
        }
        let mut ids: Vec<TicketId> = self.relations.neighbors_directed(id, direction).collect();
        ids.sort_unstable();
        ids
    }

    /// All relation rows, ascending by `(source, dest)`.
    pub(super) fn relation_rows(&self) -> Vec<Relation> {
        let mut rows: Vec<Relation> = self
            .relations
            .all_edges()
            .map(|(source, dest, _)| Relation::new(source, dest))
            .collect();
        rows.sort_unstable();
        rows
    }

    fn ticket_mut(&mut self, id: TicketId) -> Result<&mut Ticket> {
        self.tickets.get_mut(&id).ok_or(Error::TicketNotFound(id))
    }

    fn require_ticket(&self, id: TicketId) -> Result<()> {
        if self.tickets.contains_key(&id) {
            Ok(())
        } else {
            Err(Error::TicketNotFound(id))
        }
    }

    /// Apply one staged write.
    pub(super) fn apply(&mut self, write: Write) -> Result<()> {
        trace!(?write, "Applying write");
        match write {
            Write::InsertRelation(relation) => {
                self.require_ticket(relation.source)?;
                self.require_ticket(relation.dest)?;
                if self.relations.contains_edge(relation.source, relation.dest) {
                    return Err(Error::DuplicateRelation(relation));
                }
                self.relations.add_edge(relation.source, relation.dest, ());
            }
            Write::DeleteRelation(relation) => {
                if self
                    .relations
                    .remove_edge(relation.source, relation.dest)
                    .is_none()
                {
                    return Err(Error::MissingRelation(relation));
                }
            }
            Write::SetCustomField {
                ticket,
                name,
                value,
            } => {
                self.ticket_mut(ticket)?.custom.insert(name, value);
            }
            Write::TouchModified { ticket, time } => {
                self.ticket_mut(ticket)?.changetime = time;
            }
            Write::AppendAudit(entry) => {
                self.require_ticket(entry.ticket)?;
                self.audit.push(entry);
            }
        }
        Ok(())
    }

    /// Apply a batch of writes to a copy of the state.
    ///
    /// Returns the updated copy, leaving `self` untouched if any write fails.
    pub(super) fn apply_all(&self, writes: Vec<Write>) -> Result<Self> {
        let mut next = self.clone();
        for write in writes {
            next.apply(write)?;
        }
        Ok(next)
    }
}
