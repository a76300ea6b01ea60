//! JSON snapshot persistence for the in-memory store.
//!
//! A snapshot is a single JSON document holding tickets, relation rows and
//! the audit trail. Loading is resilient: bad rows are skipped and reported
//! as [`LoadWarning`]s instead of failing the whole load.

use super::inner::InMemoryStoreInner;
use super::InMemoryStore;
use crate::domain::{ChangeEntry, Relation, Ticket, TicketId};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Serializable contents of an [`InMemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// All tickets
    #[serde(default)]
    pub tickets: Vec<Ticket>,

    /// Relation rows, `source` blocks `dest`
    #[serde(default)]
    pub relations: Vec<Relation>,

    /// Audit trail
    #[serde(default)]
    pub audit: Vec<ChangeEntry>,
}

/// Non-fatal problems found while loading a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The same ticket ID appeared more than once
    ///
    /// **Effect**: The later record replaces the earlier one.
    DuplicateTicket {
        /// The repeated ID
        id: TicketId,
    },

    /// A relation row references a ticket that is not in the snapshot
    ///
    /// **Effect**: The row is skipped.
    OrphanedRelation {
        /// The skipped row
        relation: Relation,
    },

    /// The same relation row appeared more than once
    ///
    /// **Effect**: Only the first copy is kept.
    DuplicateRelation {
        /// The repeated row
        relation: Relation,
    },

    /// An audit entry references a ticket that is not in the snapshot
    ///
    /// **Effect**: The entry is skipped.
    OrphanedAudit {
        /// Ticket the entry pointed at
        ticket: TicketId,
    },
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTicket { id } => write!(f, "duplicate ticket #{id}"),
            Self::OrphanedRelation { relation } => {
                write!(f, "relation references unknown ticket: {relation}")
            }
            Self::DuplicateRelation { relation } => write!(f, "duplicate relation: {relation}"),
            Self::OrphanedAudit { ticket } => {
                write!(f, "audit entry references unknown ticket #{ticket}")
            }
        }
    }
}

impl InMemoryStore {
    /// Build a store from a snapshot, skipping inconsistent rows.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> (Self, Vec<LoadWarning>) {
        let mut inner = InMemoryStoreInner::new();
        let mut warnings = Vec::new();

        for ticket in snapshot.tickets {
            if inner.tickets.contains_key(&ticket.id) {
                warnings.push(LoadWarning::DuplicateTicket { id: ticket.id });
            }
            inner.insert_ticket(ticket);
        }

        for relation in snapshot.relations {
            if !inner.tickets.contains_key(&relation.source)
                || !inner.tickets.contains_key(&relation.dest)
            {
                warnings.push(LoadWarning::OrphanedRelation { relation });
                continue;
            }
            if inner.relations.contains_edge(relation.source, relation.dest) {
                warnings.push(LoadWarning::DuplicateRelation { relation });
                continue;
            }
            inner.relations.add_edge(relation.source, relation.dest, ());
        }

        for entry in snapshot.audit {
            if !inner.tickets.contains_key(&entry.ticket) {
                warnings.push(LoadWarning::OrphanedAudit {
                    ticket: entry.ticket,
                });
                continue;
            }
            inner.audit.push(entry);
        }

        let store = Self {
            inner: Arc::new(Mutex::new(inner)),
        };
        (store, warnings)
    }
}

/// Load a store from a JSON snapshot file.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read and `Error::Json` if it is
/// not a valid snapshot document. Row-level inconsistencies are returned as
/// warnings instead.
pub async fn load_snapshot(path: &Path) -> Result<(InMemoryStore, Vec<LoadWarning>)> {
    let content = tokio::fs::read_to_string(path).await?;
    let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
    Ok(InMemoryStore::from_snapshot(snapshot))
}

/// Save a store to a JSON snapshot file with an atomic write.
///
/// The snapshot is written to a temporary file next to `path` and renamed
/// over it, so an interrupted save leaves the original file unchanged.
///
/// # Errors
///
/// Returns `Error::Io` on filesystem failures.
pub async fn save_snapshot(store: &InMemoryStore, path: &Path) -> Result<()> {
    let snapshot = store.snapshot().await;
    let json = serde_json::to_string_pretty(&snapshot).map_err(Error::Json)?;
    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, json).await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}
