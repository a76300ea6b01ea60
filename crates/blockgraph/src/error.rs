//! Error types for blockgraph operations.

use crate::domain::{Relation, TicketId};
use std::io;
use thiserror::Error;

/// The error type for blockgraph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Ticket not found.
    #[error("Ticket not found: #{0}")]
    TicketNotFound(TicketId),

    /// A ticket reference could not be parsed.
    #[error("Invalid ticket reference: '{0}'")]
    InvalidTicketId(String),

    /// Inserting a relation row that already exists.
    #[error("Relation already exists: {0}")]
    DuplicateRelation(Relation),

    /// Deleting a relation row that does not exist.
    #[error("Relation not found: {0}")]
    MissingRelation(Relation),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Graph construction or external rendering failed.
    #[error("Rendering error: {0}")]
    Render(#[from] blockgraph_dot::Error),
}

/// A specialized Result type for blockgraph operations.
pub type Result<T> = std::result::Result<T, Error>;
