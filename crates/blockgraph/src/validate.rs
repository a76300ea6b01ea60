//! Workflow checks against open blockers.
//!
//! Closing or resolving a ticket while something still blocks it is
//! disallowed. [`check_action`] reports one [`ValidationError`] per open
//! blocker so the caller can show them all at once.

use crate::domain::TicketId;
use crate::error::Result;
use crate::links::TicketLinks;
use crate::storage::{RelationStore, TicketStore};
use std::fmt;

/// A user-facing reason an action is not allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The blocking ticket, if the error is about one
    pub blocker: Option<TicketId>,

    /// Message shown to the user
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Check whether `action` may be applied to `ticket`.
///
/// Tickets that do not exist yet pass. An empty action is rejected. For an
/// action listed in `check_actions`, every blocker that is not closed yields
/// one error; blockers that no longer exist are ignored.
///
/// # Errors
///
/// Propagates store errors.
pub async fn check_action<S>(
    store: &S,
    check_actions: &[String],
    ticket: TicketId,
    action: &str,
) -> Result<Vec<ValidationError>>
where
    S: TicketStore + RelationStore + ?Sized,
{
    if store.get(ticket).await?.is_none() {
        return Ok(Vec::new());
    }
    if action.trim().is_empty() {
        return Ok(vec![ValidationError {
            blocker: None,
            message: "Valid action is required to validate ticket dependencies".to_string(),
        }]);
    }
    if !check_actions.iter().any(|a| a == action) {
        return Ok(Vec::new());
    }

    let errors = open_blockers(store, ticket)
        .await?
        .into_iter()
        .map(|blocker| ValidationError {
            blocker: Some(blocker),
            message: format!("Ticket #{blocker} is blocking this ticket"),
        })
        .collect::<Vec<_>>();
    if !errors.is_empty() {
        tracing::debug!(ticket = %ticket, action, blockers = errors.len(), "Action blocked");
    }
    Ok(errors)
}

/// Returns `true` if any ticket blocking `ticket` is still open.
///
/// # Errors
///
/// Returns `Error::TicketNotFound` if `ticket` does not exist.
pub async fn has_open_blockers<S>(store: &S, ticket: TicketId) -> Result<bool>
where
    S: TicketStore + RelationStore + ?Sized,
{
    let links = TicketLinks::load(store, ticket).await?;
    for &blocker in &links.blocked_by {
        if let Some(t) = store.get(blocker).await? {
            if !t.status.is_closed() {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

async fn open_blockers<S>(store: &S, ticket: TicketId) -> Result<Vec<TicketId>>
where
    S: TicketStore + RelationStore + ?Sized,
{
    let mut open = Vec::new();
    for blocker in store.list_sources(ticket).await? {
        match store.get(blocker).await? {
            Some(t) if !t.status.is_closed() => open.push(blocker),
            Some(_) => {}
            None => tracing::debug!(ticket = %blocker, "Skipping missing blocker"),
        }
    }
    Ok(open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ticket;
    use crate::storage::{InMemoryStore, LinkStore, Transaction};

    fn actions() -> Vec<String> {
        vec!["close".to_string(), "resolve".to_string()]
    }

    async fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_ticket(Ticket::new(1, "open blocker")).await;
        store.insert_ticket(Ticket::new(2, "closed blocker").closed("fixed")).await;
        store.insert_ticket(Ticket::new(3, "another open")).await;
        store.insert_ticket(Ticket::new(10, "blocked")).await;
        store.insert_ticket(Ticket::new(11, "free")).await;

        let mut tx = Transaction::new();
        for source in [1, 2, 3] {
            tx.insert_relation(TicketId(source), TicketId(10));
        }
        store.commit(tx).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_one_error_per_open_blocker() {
        let store = store().await;
        let errors = check_action(&store, &actions(), TicketId(10), "resolve")
            .await
            .unwrap();

        let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "Ticket #1 is blocking this ticket",
                "Ticket #3 is blocking this ticket"
            ]
        );
        assert_eq!(errors[0].blocker, Some(TicketId(1)));
    }

    #[tokio::test]
    async fn test_unchecked_action_passes() {
        let store = store().await;
        let errors = check_action(&store, &actions(), TicketId(10), "accept")
            .await
            .unwrap();
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_empty_action_is_rejected() {
        let store = store().await;
        let errors = check_action(&store, &actions(), TicketId(11), "").await.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].blocker, None);
    }

    #[tokio::test]
    async fn test_new_ticket_passes() {
        let store = store().await;
        let errors = check_action(&store, &actions(), TicketId(99), "")
            .await
            .unwrap();
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_has_open_blockers() {
        let store = store().await;
        assert!(has_open_blockers(&store, TicketId(10)).await.unwrap());
        assert!(!has_open_blockers(&store, TicketId(11)).await.unwrap());
        assert!(has_open_blockers(&store, TicketId(99)).await.is_err());
    }
}
