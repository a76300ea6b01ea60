//! Blocking / blocked-by links of a single ticket.
//!
//! A [`TicketLinks`] is a snapshot taken with [`TicketLinks::load`], changed
//! in memory by the caller, and reconciled against the store with
//! [`TicketLinks::save`]. Saving diffs each direction against the snapshot
//! taken at load time, inserts and deletes relation rows, and keeps the
//! denormalized `blocking` / `blockedby` mirror fields on the *other* ticket
//! of every changed row in sync, with audit entries for each change.
//!
//! # Mirror field format
//!
//! A mirror field is a comma-separated list of ticket IDs sorted numerically
//! ascending and joined with `", "`, e.g. `"1, 2, 3, 5"`. External consumers
//! read this field directly, so the format is fixed.
//!
//! # Example
//!
//! ```
//! use blockgraph::domain::{Ticket, TicketId};
//! use blockgraph::links::TicketLinks;
//! use blockgraph::storage::InMemoryStore;
//! use chrono::Utc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> blockgraph::error::Result<()> {
//!     let store = InMemoryStore::new();
//!     store.insert_ticket(Ticket::new(1, "schema")).await;
//!     store.insert_ticket(Ticket::new(2, "migration")).await;
//!
//!     let mut links = TicketLinks::load(&store, TicketId(1)).await?;
//!     links.blocking.insert(TicketId(2));
//!     links.save(&store, "alice", "", Utc::now()).await?;
//!
//!     let other = TicketLinks::load(&store, TicketId(2)).await?;
//!     assert!(other.blocked_by.contains(&TicketId(1)));
//!     Ok(())
//! }
//! ```

use crate::domain::{
    ChangeEntry, Relation, Ticket, TicketId, BLOCKED_BY_FIELD, BLOCKING_FIELD, COMMENT_FIELD,
};
use crate::error::{Error, Result};
use crate::storage::{LinkStore, RelationStore, TicketStore, Transaction};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::{debug, warn};

/// The links of one ticket, with the state they had when loaded.
#[derive(Debug, Clone)]
pub struct TicketLinks {
    ticket: Ticket,

    /// Tickets this ticket blocks.
    pub blocking: BTreeSet<TicketId>,

    /// Tickets blocking this ticket.
    pub blocked_by: BTreeSet<TicketId>,

    original_blocking: BTreeSet<TicketId>,
    original_blocked_by: BTreeSet<TicketId>,
}

/// What a save changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveSummary {
    /// Relation rows inserted
    pub inserted: Vec<Relation>,

    /// Relation rows deleted
    pub deleted: Vec<Relation>,

    /// Tickets whose mirror field was rewritten
    pub updated: BTreeSet<TicketId>,
}

impl SaveSummary {
    /// Returns `true` if the save touched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.deleted.is_empty() && self.updated.is_empty()
    }
}

/// One direction of the relation as seen from the saved ticket.
struct Side<'a> {
    current: BTreeSet<TicketId>,
    original: &'a BTreeSet<TicketId>,
    /// Mirror field written on the other ticket
    mirror_field: &'static str,
    /// Row for (this ticket, other ticket)
    row: fn(TicketId, TicketId) -> Relation,
}

#[derive(Debug, Clone, Copy)]
enum MirrorChange {
    Add,
    Remove,
}

impl TicketLinks {
    /// Load the current links of `id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::TicketNotFound` if the ticket does not exist.
    pub async fn load<S>(store: &S, id: TicketId) -> Result<Self>
    where
        S: TicketStore + RelationStore + ?Sized,
    {
        let ticket = store.get(id).await?.ok_or(Error::TicketNotFound(id))?;
        let blocking: BTreeSet<TicketId> = store.list_targets(id).await?.into_iter().collect();
        let blocked_by: BTreeSet<TicketId> = store.list_sources(id).await?.into_iter().collect();
        Ok(Self {
            ticket,
            original_blocking: blocking.clone(),
            original_blocked_by: blocked_by.clone(),
            blocking,
            blocked_by,
        })
    }

    /// The ticket these links belong to.
    #[must_use]
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    /// The ticket's ID.
    #[must_use]
    pub fn id(&self) -> TicketId {
        self.ticket.id
    }

    /// `blocking` as it was when loaded.
    #[must_use]
    pub fn original_blocking(&self) -> &BTreeSet<TicketId> {
        &self.original_blocking
    }

    /// `blocked_by` as it was when loaded.
    #[must_use]
    pub fn original_blocked_by(&self) -> &BTreeSet<TicketId> {
        &self.original_blocked_by
    }

    /// Returns `true` if the ticket blocks or is blocked by anything.
    #[must_use]
    pub fn has_links(&self) -> bool {
        !self.blocking.is_empty() || !self.blocked_by.is_empty()
    }

    /// Reconcile the in-memory links with the store in one transaction.
    ///
    /// See [`TicketLinks::save_in`] for what is written.
    ///
    /// # Errors
    ///
    /// Propagates store read errors and commit failures. On error nothing
    /// has been written.
    pub async fn save<S>(
        self,
        store: &S,
        author: &str,
        comment: &str,
        when: DateTime<Utc>,
    ) -> Result<SaveSummary>
    where
        S: LinkStore + ?Sized,
    {
        let mut tx = Transaction::new();
        let summary = self.save_in(store, &mut tx, author, comment, when).await?;
        store.commit(tx).await?;
        Ok(summary)
    }

    /// Stage the reconciliation writes into a caller-owned transaction.
    ///
    /// For each direction, self references are dropped, then every ID that
    /// was added or removed since load gets a relation insert or delete and
    /// a mirror-field update on that ticket. A changed mirror field gets an
    /// audit entry and, when `comment` is non-empty, one comment entry per
    /// ticket. The other ticket's modification time is set to `when`.
    ///
    /// The caller commits `tx`.
    ///
    /// # Errors
    ///
    /// Propagates store read errors.
    pub async fn save_in<S>(
        self,
        store: &S,
        tx: &mut Transaction,
        author: &str,
        comment: &str,
        when: DateTime<Utc>,
    ) -> Result<SaveSummary>
    where
        S: TicketStore + ?Sized,
    {
        let me = self.ticket.id;
        let sides = [
            Side {
                current: without(&self.blocking, me),
                original: &self.original_blocking,
                mirror_field: BLOCKED_BY_FIELD,
                row: |me, other| Relation::new(me, other),
            },
            Side {
                current: without(&self.blocked_by, me),
                original: &self.original_blocked_by,
                mirror_field: BLOCKING_FIELD,
                row: |me, other| Relation::new(other, me),
            },
        ];

        let mut summary = SaveSummary::default();
        let mut commented = BTreeSet::new();
        // A stored self loop shows up on both sides; its row is staged once.
        let mut staged_rows = BTreeSet::new();

        for side in &sides {
            for &other in side.current.union(side.original) {
                let row = (side.row)(me, other);
                let change = match (side.current.contains(&other), side.original.contains(&other)) {
                    (true, false) => {
                        if staged_rows.insert(row) {
                            tx.insert_relation(row.source, row.dest);
                            summary.inserted.push(row);
                        }
                        MirrorChange::Add
                    }
                    (false, true) => {
                        if staged_rows.insert(row) {
                            tx.delete_relation(row.source, row.dest);
                            summary.deleted.push(row);
                        }
                        MirrorChange::Remove
                    }
                    _ => continue,
                };

                let old_value = match tx.staged_custom_field(other, side.mirror_field) {
                    Some(staged) => staged.to_string(),
                    None => store
                        .custom_field(other, side.mirror_field)
                        .await?
                        .unwrap_or_default(),
                };
                let (new_value, consistent) = update_mirror_field(&old_value, me, change);
                if !consistent {
                    warn!(
                        ticket = %me,
                        other = %other,
                        field = side.mirror_field,
                        value = %old_value,
                        "Inconsistent mirror field: #{me} was not listed"
                    );
                }

                let changed = old_value != new_value;
                if changed {
                    tx.append_audit(ChangeEntry {
                        ticket: other,
                        time: when,
                        author: author.to_string(),
                        field: side.mirror_field.to_string(),
                        old_value: old_value.clone(),
                        new_value: new_value.clone(),
                    });
                    if !comment.is_empty() && commented.insert(other) {
                        tx.append_audit(ChangeEntry {
                            ticket: other,
                            time: when,
                            author: author.to_string(),
                            field: COMMENT_FIELD.to_string(),
                            old_value: String::new(),
                            new_value: format!("(In #{me}) {comment}"),
                        });
                    }
                }

                if !changed && consistent {
                    continue;
                }
                tx.set_custom_field(other, side.mirror_field, new_value);
                tx.touch_modified(other, when);
                summary.updated.insert(other);
            }
        }

        debug!(
            ticket = %me,
            inserted = summary.inserted.len(),
            deleted = summary.deleted.len(),
            updated = summary.updated.len(),
            "Staged link changes"
        );
        Ok(summary)
    }
}

impl fmt::Display for TicketLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<TicketLinks #{} blocking=[{}] blocked_by=[{}]>",
            self.ticket.id,
            join_ids(&self.blocking, ","),
            join_ids(&self.blocked_by, ",")
        )
    }
}

/// Load links for every ticket reachable from `seeds` in either direction.
///
/// Runs two independent depth-first walks, one following `blocking` and one
/// following `blocked_by`, each with its own visited set, so every ticket is
/// visited at most once per direction and cycles terminate. Seeds and
/// referenced tickets that do not exist are skipped.
///
/// Returns one snapshot per ticket, ascending by ID.
///
/// # Errors
///
/// Propagates store errors other than a missing ticket.
pub async fn walk_tickets<S>(store: &S, seeds: &[TicketId]) -> Result<Vec<TicketLinks>>
where
    S: TicketStore + RelationStore + ?Sized,
{
    let mut cache: HashMap<TicketId, Option<TicketLinks>> = HashMap::new();
    let forward = walk_direction(store, seeds, &mut cache, |links| &links.blocking).await?;
    let backward = walk_direction(store, seeds, &mut cache, |links| &links.blocked_by).await?;

    let mut merged: BTreeMap<TicketId, TicketLinks> = BTreeMap::new();
    for id in forward.into_iter().chain(backward) {
        if merged.contains_key(&id) {
            continue;
        }
        if let Some(Some(links)) = cache.remove(&id) {
            merged.insert(id, links);
        }
    }

    debug!(seeds = seeds.len(), tickets = merged.len(), "Walked ticket links");
    Ok(merged.into_values().collect())
}

/// Depth-first walk with an explicit stack. Returns the found tickets in
/// visiting order.
async fn walk_direction<S, F>(
    store: &S,
    seeds: &[TicketId],
    cache: &mut HashMap<TicketId, Option<TicketLinks>>,
    next: F,
) -> Result<Vec<TicketId>>
where
    S: TicketStore + RelationStore + ?Sized,
    F: Fn(&TicketLinks) -> &BTreeSet<TicketId>,
{
    let mut visited = BTreeSet::new();
    let mut found = Vec::new();
    let mut stack: Vec<TicketId> = seeds.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if !cache.contains_key(&id) {
            let loaded = match TicketLinks::load(store, id).await {
                Ok(links) => Some(links),
                Err(Error::TicketNotFound(_)) => {
                    debug!(ticket = %id, "Skipping missing ticket");
                    None
                }
                Err(e) => return Err(e),
            };
            cache.insert(id, loaded);
        }
        if let Some(Some(links)) = cache.get(&id) {
            found.push(id);
            stack.extend(next(links).iter().rev().copied());
        }
    }
    Ok(found)
}

/// Split a mirror-field value into ticket IDs.
///
/// Tokens are separated by commas, semicolons or whitespace. Returns `None`
/// if any token is not a plain integer.
///
/// ```
/// use blockgraph::domain::TicketId;
/// use blockgraph::links::parse_ticket_refs;
///
/// assert_eq!(parse_ticket_refs("3, 1;2"), Some(vec![TicketId(3), TicketId(1), TicketId(2)]));
/// assert_eq!(parse_ticket_refs("3, abc"), None);
/// ```
#[must_use]
pub fn parse_ticket_refs(text: &str) -> Option<Vec<TicketId>> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| word.parse::<u64>().ok().map(TicketId))
        .collect()
}

fn without(ids: &BTreeSet<TicketId>, me: TicketId) -> BTreeSet<TicketId> {
    ids.iter().copied().filter(|&id| id != me).collect()
}

fn join_ids(ids: &BTreeSet<TicketId>, sep: &str) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Apply an add/remove of `me` to a mirror-field value.
///
/// Returns the re-serialized value and whether the field was consistent,
/// i.e. `false` when removing an ID that was not listed.
fn update_mirror_field(old_value: &str, me: TicketId, change: MirrorChange) -> (String, bool) {
    let mut ids: BTreeSet<String> = old_value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let me = me.to_string();
    let consistent = match change {
        MirrorChange::Add => {
            ids.insert(me);
            true
        }
        MirrorChange::Remove => ids.remove(&me),
    };
    (format_mirror_field(ids), consistent)
}

/// Sort IDs numerically ascending and join them with `", "`.
///
/// Tokens that are not integers sort after all numeric ones.
fn format_mirror_field(ids: impl IntoIterator<Item = String>) -> String {
    let mut ids: Vec<String> = ids.into_iter().collect();
    ids.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    ids.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::add_sorts_numerically("3, 1, 2", MirrorChange::Add, 5, "1, 2, 3, 5", true)]
    #[case::add_to_empty("", MirrorChange::Add, 7, "7", true)]
    #[case::add_existing("7", MirrorChange::Add, 7, "7", true)]
    #[case::numeric_not_lexical("10,9", MirrorChange::Add, 100, "9, 10, 100", true)]
    #[case::remove("1, 2, 3", MirrorChange::Remove, 2, "1, 3", true)]
    #[case::remove_last("4", MirrorChange::Remove, 4, "", true)]
    #[case::remove_missing("1, 3", MirrorChange::Remove, 2, "1, 3", false)]
    #[case::remove_missing_normalizes("3,1", MirrorChange::Remove, 2, "1, 3", false)]
    fn test_update_mirror_field(
        #[case] old: &str,
        #[case] change: MirrorChange,
        #[case] me: u64,
        #[case] expected: &str,
        #[case] consistent: bool,
    ) {
        assert_eq!(
            update_mirror_field(old, TicketId(me), change),
            (expected.to_string(), consistent)
        );
    }

    #[test]
    fn test_format_mirror_field_puts_non_numeric_last() {
        let ids = ["b", "2", "a", "1"].map(String::from);
        assert_eq!(format_mirror_field(ids), "1, 2, a, b");
    }

    #[rstest]
    #[case("", Some(vec![]))]
    #[case("5", Some(vec![5]))]
    #[case(" 1,2 ;  3\t4 ", Some(vec![1, 2, 3, 4]))]
    #[case("1, #2", None)]
    #[case("x", None)]
    fn test_parse_ticket_refs(#[case] text: &str, #[case] expected: Option<Vec<u64>>) {
        let expected = expected.map(|ids| ids.into_iter().map(TicketId).collect::<Vec<_>>());
        assert_eq!(parse_ticket_refs(text), expected);
    }

    #[test]
    fn test_display() {
        let links = TicketLinks {
            ticket: Ticket::new(5, "x"),
            blocking: [TicketId(1), TicketId(2)].into_iter().collect(),
            blocked_by: BTreeSet::new(),
            original_blocking: BTreeSet::new(),
            original_blocked_by: BTreeSet::new(),
        };
        assert_eq!(
            links.to_string(),
            "<TicketLinks #5 blocking=[1,2] blocked_by=[]>"
        );
        assert!(links.has_links());
    }
}
