//! Application context for CLI command execution.
//!
//! [`App`] loads the configuration and the ticket data file into an
//! [`InMemoryStore`] and writes the data file back after mutating commands.
//!
//! # Example
//!
//! ```no_run
//! use blockgraph::app::App;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::open(None, None).await?;
//!     // Execute commands using app...
//!     app.save().await?;
//!     Ok(())
//! }
//! ```

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::error::Result;
use crate::storage::in_memory::{load_snapshot, save_snapshot};
use crate::storage::InMemoryStore;
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
pub struct App {
    config: Config,
    store: InMemoryStore,
    data_path: PathBuf,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("data_path", &self.data_path)
            .field("config", &self.config)
            .field("store", &"<InMemoryStore>")
            .finish()
    }
}

impl App {
    /// Load configuration and ticket data.
    ///
    /// `config_path` defaults to `blockgraph.yaml` in the working directory
    /// and may be absent. `data_path` overrides the configured `data_file`;
    /// a missing data file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing config or data file cannot be read
    /// or parsed.
    pub async fn open(config_path: Option<&Path>, data_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(|| Path::new(CONFIG_FILE_NAME));
        let config = Config::load_or_default(config_path).await?;

        let data_path = data_path.map_or_else(|| PathBuf::from(&config.data_file), Path::to_path_buf);

        let store = if tokio::fs::try_exists(&data_path).await? {
            let (store, warnings) = load_snapshot(&data_path).await?;
            for warning in &warnings {
                tracing::warn!(path = %data_path.display(), "{warning}");
            }
            store
        } else {
            tracing::debug!(path = %data_path.display(), "No data file, starting empty");
            InMemoryStore::new()
        };

        Ok(Self {
            config,
            store,
            data_path,
        })
    }

    /// Create an App from parts, without touching the filesystem.
    #[must_use]
    pub fn with_store(config: Config, store: InMemoryStore, data_path: PathBuf) -> Self {
        Self {
            config,
            store,
            data_path,
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The ticket store.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Path the data file is read from and written to.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Write the store back to the data file.
    ///
    /// This should be called after any mutating operations.
    pub async fn save(&self) -> Result<()> {
        save_snapshot(&self.store, &self.data_path).await
    }
}
