//! Store interfaces used by the dependency core.
//!
//! The core never owns tickets or relation rows. It reads them through
//! [`TicketStore`] and [`RelationStore`], and stages every write on a
//! [`Transaction`] that a [`LinkStore`] applies atomically.
//!
//! # Relation direction
//!
//! A stored [`Relation`] `(source, dest)` means **`source` blocks `dest`**:
//!
//! - [`RelationStore::list_targets`] of a ticket are the tickets it blocks
//! - [`RelationStore::list_sources`] of a ticket are the tickets blocking it
//!
//! # Transactions
//!
//! Writes are buffered in a [`Transaction`] in the order they are staged and
//! applied by [`LinkStore::commit`]: either every write lands or none does.
//! Reads through the store never see uncommitted writes; callers that need
//! read-your-writes within a transaction use [`Transaction::staged_custom_field`].
//!
//! # Example
//!
//! ```
//! use blockgraph::domain::{Ticket, TicketId};
//! use blockgraph::storage::{InMemoryStore, RelationStore, LinkStore, Transaction};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> blockgraph::error::Result<()> {
//!     let store = InMemoryStore::new();
//!     store.insert_ticket(Ticket::new(1, "parser")).await;
//!     store.insert_ticket(Ticket::new(2, "codegen")).await;
//!
//!     let mut tx = Transaction::new();
//!     tx.insert_relation(TicketId(1), TicketId(2));
//!     store.commit(tx).await?;
//!
//!     assert_eq!(store.list_targets(TicketId(1)).await?, vec![TicketId(2)]);
//!     Ok(())
//! }
//! ```

pub mod in_memory;

use crate::domain::{ChangeEntry, Relation, Ticket, TicketId};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use in_memory::{InMemoryStore, StoreSnapshot};

/// Read access to tickets.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Get a ticket by ID.
    ///
    /// Returns `None` if the ticket doesn't exist.
    async fn get(&self, id: TicketId) -> Result<Option<Ticket>>;

    /// Read a custom field of a ticket.
    ///
    /// Returns `None` if the ticket doesn't exist or the field is unset.
    async fn custom_field(&self, id: TicketId, name: &str) -> Result<Option<String>>;

    /// IDs of all tickets scheduled for `milestone`, ascending.
    async fn tickets_in_milestone(&self, milestone: &str) -> Result<Vec<TicketId>>;
}

/// Read access to the blocking relation.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Tickets blocked by `source`, ascending.
    async fn list_targets(&self, source: TicketId) -> Result<Vec<TicketId>>;

    /// Tickets blocking `dest`, ascending.
    async fn list_sources(&self, dest: TicketId) -> Result<Vec<TicketId>>;
}

/// A store that can apply a [`Transaction`] atomically.
#[async_trait]
pub trait LinkStore: TicketStore + RelationStore {
    /// Apply every staged write, or none of them.
    ///
    /// # Errors
    ///
    /// - `Error::DuplicateRelation` when inserting an existing row
    /// - `Error::MissingRelation` when deleting a row that does not exist
    /// - `Error::TicketNotFound` when a write targets an unknown ticket
    async fn commit(&self, tx: Transaction) -> Result<()>;
}

/// A single staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    /// Insert relation row `source` blocks `dest`.
    InsertRelation(Relation),

    /// Delete relation row `source` blocks `dest`.
    DeleteRelation(Relation),

    /// Update a custom field, inserting it if absent.
    SetCustomField {
        /// Ticket to update
        ticket: TicketId,
        /// Field name
        name: String,
        /// New value
        value: String,
    },

    /// Set a ticket's modification time.
    TouchModified {
        /// Ticket to touch
        ticket: TicketId,
        /// New modification time
        time: DateTime<Utc>,
    },

    /// Append an audit-trail entry.
    AppendAudit(ChangeEntry),
}

/// An ordered batch of writes applied as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    writes: Vec<Write>,
}

impl Transaction {
    /// Create an empty transaction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage insertion of the row `source` blocks `dest`.
    pub fn insert_relation(&mut self, source: TicketId, dest: TicketId) {
        self.writes
            .push(Write::InsertRelation(Relation::new(source, dest)));
    }

    /// Stage deletion of the row `source` blocks `dest`.
    pub fn delete_relation(&mut self, source: TicketId, dest: TicketId) {
        self.writes
            .push(Write::DeleteRelation(Relation::new(source, dest)));
    }

    /// Stage a custom field update (insert if absent).
    pub fn set_custom_field(&mut self, ticket: TicketId, name: impl Into<String>, value: impl Into<String>) {
        self.writes.push(Write::SetCustomField {
            ticket,
            name: name.into(),
            value: value.into(),
        });
    }

    /// Stage a modification-time update.
    pub fn touch_modified(&mut self, ticket: TicketId, time: DateTime<Utc>) {
        self.writes.push(Write::TouchModified { ticket, time });
    }

    /// Stage an audit-trail entry.
    pub fn append_audit(&mut self, entry: ChangeEntry) {
        self.writes.push(Write::AppendAudit(entry));
    }

    /// The most recent staged value of a custom field, if any.
    #[must_use]
    pub fn staged_custom_field(&self, ticket: TicketId, name: &str) -> Option<&str> {
        self.writes.iter().rev().find_map(|w| match w {
            Write::SetCustomField {
                ticket: t,
                name: n,
                value,
            } if *t == ticket && n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Staged writes in order.
    #[must_use]
    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    /// Returns `true` if nothing has been staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Number of staged writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Consume the transaction, yielding its writes.
    #[must_use]
    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}
