//! Domain types for ticket dependencies.
//!
//! This module contains the ticket, relation and audit types shared by the
//! store interfaces, the link model and the graph builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Mirror field on the blocked ticket listing the tickets that block it.
pub const BLOCKED_BY_FIELD: &str = "blockedby";

/// Mirror field on the blocking ticket listing the tickets it blocks.
pub const BLOCKING_FIELD: &str = "blocking";

/// Audit field name used for comments.
pub const COMMENT_FIELD: &str = "comment";

/// Integer identifier of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub u64);

impl TicketId {
    /// Create a new ticket ID
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw integer value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TicketId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for TicketId {
    type Err = std::num::ParseIntError;

    /// Parses `5` or `#5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.strip_prefix('#').unwrap_or(s).parse().map(Self)
    }
}

/// Workflow status of a ticket
///
/// Workflows may define statuses beyond the built-in ones; those load as
/// [`TicketStatus::Other`] and count as open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Newly filed
    New,

    /// Assigned to an owner
    Assigned,

    /// Accepted by its owner
    Accepted,

    /// Closed and then reopened
    Reopened,

    /// Closed with a resolution
    Closed,

    /// Any other workflow status, kept verbatim
    #[serde(untagged)]
    Other(String),
}

impl TicketStatus {
    /// Returns `true` for [`TicketStatus::Closed`].
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Assigned => "assigned",
            Self::Accepted => "accepted",
            Self::Reopened => "reopened",
            Self::Closed => "closed",
            Self::Other(status) => status.as_str(),
        };
        f.write_str(s)
    }
}

/// Three-way classification used to color graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// Any status other than closed
    Open,

    /// Closed with an ordinary resolution
    Closed,

    /// Closed with one of the configured "bad" resolutions
    BadClosed,
}

/// A ticket as seen by the dependency core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket number
    pub id: TicketId,

    /// Current status
    pub status: TicketStatus,

    /// Resolution, set when closed
    #[serde(default)]
    pub resolution: Option<String>,

    /// One-line summary
    pub summary: String,

    /// Milestone the ticket is scheduled for
    #[serde(default)]
    pub milestone: Option<String>,

    /// Custom fields, including the `blocking`/`blockedby` mirror fields
    #[serde(default)]
    pub custom: BTreeMap<String, String>,

    /// Last modification time
    pub changetime: DateTime<Utc>,
}

impl Ticket {
    /// Create an open ticket with no custom fields.
    pub fn new(id: u64, summary: impl Into<String>) -> Self {
        Self {
            id: TicketId(id),
            status: TicketStatus::New,
            resolution: None,
            summary: summary.into(),
            milestone: None,
            custom: BTreeMap::new(),
            changetime: Utc::now(),
        }
    }

    /// Builder-style milestone setter.
    #[must_use]
    pub fn with_milestone(mut self, milestone: impl Into<String>) -> Self {
        self.milestone = Some(milestone.into());
        self
    }

    /// Builder-style helper closing the ticket with `resolution`.
    #[must_use]
    pub fn closed(mut self, resolution: impl Into<String>) -> Self {
        self.status = TicketStatus::Closed;
        self.resolution = Some(resolution.into());
        self
    }

    /// Classify the ticket for presentation.
    ///
    /// A closed ticket whose resolution appears in `bad_resolutions` is
    /// [`StatusClass::BadClosed`]; other closed tickets are
    /// [`StatusClass::Closed`]; everything else is [`StatusClass::Open`].
    #[must_use]
    pub fn classify(&self, bad_resolutions: &[String]) -> StatusClass {
        if !self.status.is_closed() {
            return StatusClass::Open;
        }
        match &self.resolution {
            Some(r) if bad_resolutions.iter().any(|b| b == r) => StatusClass::BadClosed,
            _ => StatusClass::Closed,
        }
    }

    /// Value of a custom field, if set.
    #[must_use]
    pub fn custom_field(&self, name: &str) -> Option<&str> {
        self.custom.get(name).map(String::as_str)
    }
}

/// One stored dependency row: `source` blocks `dest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relation {
    /// The blocking ticket
    pub source: TicketId,

    /// The blocked ticket
    pub dest: TicketId,
}

impl Relation {
    /// `source` blocks `dest`.
    #[must_use]
    pub const fn new(source: TicketId, dest: TicketId) -> Self {
        Self { source, dest }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} blocks #{}", self.source, self.dest)
    }
}

/// An audit-trail entry recording a field change on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Ticket the change applies to
    pub ticket: TicketId,

    /// When the change happened
    pub time: DateTime<Utc>,

    /// Who made the change
    pub author: String,

    /// Field name (`blocking`, `blockedby` or `comment`)
    pub field: String,

    /// Value before the change
    pub old_value: String,

    /// Value after the change
    pub new_value: String,
}
