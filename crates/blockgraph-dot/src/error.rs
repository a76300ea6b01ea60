//! Error types for blockgraph-dot operations.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// The error type for graph construction and rendering.
#[derive(Debug, Error)]
pub enum Error {
    /// A cluster with this name is already registered on the graph.
    #[error("cluster '{0}' already exists")]
    DuplicateCluster(String),

    /// The node is already an explicit member of a different cluster.
    #[error("node '{node}' already belongs to cluster '{cluster}'")]
    ClusterMembership {
        /// Name of the node being added.
        node: String,
        /// Name of the cluster that already owns it.
        cluster: String,
    },

    /// The renderer executable could not be found.
    #[error("renderer '{command}' not found")]
    NotFound {
        /// The command that was not found.
        command: String,
    },

    /// The renderer process could not be started.
    #[error("failed to spawn renderer '{command}': {source}")]
    Spawn {
        /// The command that failed to spawn.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error while talking to the renderer.
    #[error("renderer I/O error: {0}")]
    Io(#[from] io::Error),

    /// The renderer exited unsuccessfully.
    #[error("renderer '{command}' exited with {status}: {stderr}")]
    Failed {
        /// The command that failed.
        command: String,
        /// Exit status of the process.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The renderer exited successfully but produced nothing.
    #[error("renderer '{command}' produced no output")]
    EmptyOutput {
        /// The command that produced no output.
        command: String,
    },
}

impl Error {
    /// Returns `true` if this error came from the external renderer rather
    /// than from graph construction.
    #[must_use]
    pub fn is_render_failure(&self) -> bool {
        !matches!(
            self,
            Self::DuplicateCluster(_) | Self::ClusterMembership { .. }
        )
    }
}

/// A specialized Result type for blockgraph-dot operations.
pub type Result<T> = std::result::Result<T, Error>;
