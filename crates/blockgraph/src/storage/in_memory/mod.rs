//! In-memory store backed by a `BTreeMap` and a petgraph `DiGraphMap`.
//!
//! This is the reference implementation of [`TicketStore`], [`RelationStore`]
//! and [`LinkStore`]. All data is held in RAM and lost when the process
//! exits unless it is written out with [`save_snapshot`].
//!
//! # Persistence
//!
//! - **In-memory only**: Use [`InMemoryStore::new`] and seed tickets with
//!   [`InMemoryStore::insert_ticket`]
//! - **With a data file**: Use [`load_snapshot`] to load a JSON snapshot,
//!   then [`save_snapshot`] to write it back atomically
//!
//! # Transactions
//!
//! [`LinkStore::commit`] applies a transaction's writes to a copy of the
//! state while holding the lock and swaps the copy in only if every write
//! succeeded, so a failing write leaves the store unchanged.
//!
//! # Thread Safety
//!
//! The store is wrapped in `Arc<Mutex<InMemoryStoreInner>>`; clones share
//! the same data.
//!
//! [`TicketStore`]: crate::storage::TicketStore
//! [`RelationStore`]: crate::storage::RelationStore
//! [`LinkStore`]: crate::storage::LinkStore
//! [`LinkStore::commit`]: crate::storage::LinkStore::commit

mod inner;
mod snapshot;
mod trait_impl;

use crate::domain::{ChangeEntry, Relation, Ticket, TicketId};
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use snapshot::{load_snapshot, save_snapshot, LoadWarning, StoreSnapshot};

/// Thread-safe in-memory ticket and relation store.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("inner", &"<Mutex<InMemoryStoreInner>>")
            .finish()
    }
}

impl InMemoryStore {
    /// Create an empty store.
    ///
    /// # Example
    ///
    /// ```
    /// use blockgraph::storage::InMemoryStore;
    ///
    /// let store = InMemoryStore::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryStoreInner::new())),
        }
    }

    /// Insert or replace a ticket.
    pub async fn insert_ticket(&self, ticket: Ticket) {
        self.inner.lock().await.insert_ticket(ticket);
    }

    /// Delete a ticket, cascading to every relation row that references it.
    ///
    /// Mirror fields on other tickets are left as they are, matching a
    /// foreign-key cascade in a relational store.
    pub async fn delete_ticket(&self, id: TicketId) -> Option<Ticket> {
        self.inner.lock().await.remove_ticket(id)
    }

    /// All relation rows, ascending.
    pub async fn relations(&self) -> Vec<Relation> {
        self.inner.lock().await.relation_rows()
    }

    /// The audit trail in append order.
    pub async fn audit_log(&self) -> Vec<ChangeEntry> {
        self.inner.lock().await.audit.clone()
    }

    /// Capture the full contents for serialization.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.lock().await;
        StoreSnapshot {
            tickets: inner.tickets.values().cloned().collect(),
            relations: inner.relation_rows(),
            audit: inner.audit.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::{LinkStore, RelationStore, TicketStore, Transaction};

    async fn store_with(ids: &[u64]) -> InMemoryStore {
        let store = InMemoryStore::new();
        for &id in ids {
            store
                .insert_ticket(Ticket::new(id, format!("ticket {id}")))
                .await;
        }
        store
    }

    #[tokio::test]
    async fn test_commit_inserts_and_lists_both_directions() {
        let store = store_with(&[1, 2, 3]).await;
        let mut tx = Transaction::new();
        tx.insert_relation(TicketId(1), TicketId(3));
        tx.insert_relation(TicketId(1), TicketId(2));
        tx.insert_relation(TicketId(3), TicketId(2));
        store.commit(tx).await.unwrap();

        assert_eq!(
            store.list_targets(TicketId(1)).await.unwrap(),
            vec![TicketId(2), TicketId(3)]
        );
        assert_eq!(
            store.list_sources(TicketId(2)).await.unwrap(),
            vec![TicketId(1), TicketId(3)]
        );
        assert!(store.list_targets(TicketId(99)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_store_unchanged() {
        let store = store_with(&[1, 2]).await;
        let mut tx = Transaction::new();
        tx.insert_relation(TicketId(1), TicketId(2));
        tx.set_custom_field(TicketId(2), "blockedby", "1");
        tx.insert_relation(TicketId(1), TicketId(42));

        let err = store.commit(tx).await.unwrap_err();
        assert!(matches!(err, Error::TicketNotFound(TicketId(42))));
        assert!(store.relations().await.is_empty());
        assert_eq!(
            store.custom_field(TicketId(2), "blockedby").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_duplicate_and_missing_rows_rejected() {
        let store = store_with(&[1, 2]).await;
        let mut tx = Transaction::new();
        tx.insert_relation(TicketId(1), TicketId(2));
        store.commit(tx).await.unwrap();

        let mut dup = Transaction::new();
        dup.insert_relation(TicketId(1), TicketId(2));
        assert!(matches!(
            store.commit(dup).await,
            Err(Error::DuplicateRelation(_))
        ));

        let mut missing = Transaction::new();
        missing.delete_relation(TicketId(2), TicketId(1));
        assert!(matches!(
            store.commit(missing).await,
            Err(Error::MissingRelation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_ticket_cascades_relations() {
        let store = store_with(&[1, 2, 3]).await;
        let mut tx = Transaction::new();
        tx.insert_relation(TicketId(1), TicketId(2));
        tx.insert_relation(TicketId(2), TicketId(3));
        store.commit(tx).await.unwrap();

        assert!(store.delete_ticket(TicketId(2)).await.is_some());
        assert!(store.relations().await.is_empty());
        assert!(store.list_targets(TicketId(1)).await.unwrap().is_empty());
        assert!(store.delete_ticket(TicketId(2)).await.is_none());
    }

    #[tokio::test]
    async fn test_tickets_in_milestone() {
        let store = InMemoryStore::new();
        store
            .insert_ticket(Ticket::new(2, "b").with_milestone("m1"))
            .await;
        store
            .insert_ticket(Ticket::new(1, "a").with_milestone("m1"))
            .await;
        store
            .insert_ticket(Ticket::new(3, "c").with_milestone("m2"))
            .await;

        assert_eq!(
            store.tickets_in_milestone("m1").await.unwrap(),
            vec![TicketId(1), TicketId(2)]
        );
        assert!(store.tickets_in_milestone("none").await.unwrap().is_empty());
    }
}
