//! Store trait implementations for the in-memory store.

use super::InMemoryStore;
use crate::domain::{Ticket, TicketId};
use crate::error::Result;
use crate::storage::{LinkStore, RelationStore, TicketStore, Transaction};
use async_trait::async_trait;
use petgraph::Direction;
use tracing::debug;

#[async_trait]
impl TicketStore for InMemoryStore {
    async fn get(&self, id: TicketId) -> Result<Option<Ticket>> {
        let inner = self.inner.lock().await;
        Ok(inner.tickets.get(&id).cloned())
    }

    async fn custom_field(&self, id: TicketId, name: &str) -> Result<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .get(&id)
            .and_then(|t| t.custom.get(name))
            .cloned())
    }

    async fn tickets_in_milestone(&self, milestone: &str) -> Result<Vec<TicketId>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .values()
            .filter(|t| t.milestone.as_deref() == Some(milestone))
            .map(|t| t.id)
            .collect())
    }
}

#[async_trait]
impl RelationStore for InMemoryStore {
    async fn list_targets(&self, source: TicketId) -> Result<Vec<TicketId>> {
        let inner = self.inner.lock().await;
        Ok(inner.neighbors(source, Direction::Outgoing))
    }

    async fn list_sources(&self, dest: TicketId) -> Result<Vec<TicketId>> {
        let inner = self.inner.lock().await;
        Ok(inner.neighbors(dest, Direction::Incoming))
    }
}

#[async_trait]
impl LinkStore for InMemoryStore {
    async fn commit(&self, tx: Transaction) -> Result<()> {
        if tx.is_empty() {
            return Ok(());
        }
        let count = tx.len();
        let mut inner = self.inner.lock().await;
        let next = inner.apply_all(tx.into_writes())?;
        *inner = next;
        debug!(writes = count, "Committed transaction");
        Ok(())
    }
}
