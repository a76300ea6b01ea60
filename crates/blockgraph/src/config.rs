//! Configuration for blockgraph.
//!
//! Configuration is a YAML file (`blockgraph.yaml` by default). Every field
//! has a default, so a partial file or no file at all is valid:
//!
//! ```yaml
//! renderer:
//!   dot_path: /usr/bin/dot
//!   use_gs: true
//! graph:
//!   direction: LR
//!   bad_resolutions: [wontfix, duplicate]
//! check_actions: [resolve]
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "blockgraph.yaml";

/// Default data file name
pub const DATA_FILE_NAME: &str = "tickets.json";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External renderer settings
    pub renderer: RendererConfig,

    /// Graph presentation settings
    pub graph: GraphConfig,

    /// Workflow actions that require every blocker to be closed
    pub check_actions: Vec<String>,

    /// JSON snapshot loaded into the in-memory store
    pub data_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            graph: GraphConfig::default(),
            check_actions: vec!["close".to_string(), "resolve".to_string()],
            data_file: DATA_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, or `Error::Config` if
    /// it is not valid YAML for this structure.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Load configuration from `path`, falling back to defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for files that exist.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if fs::try_exists(path).await? {
            Self::load(path).await
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Returns `true` if `action` requires all blockers to be closed.
    #[must_use]
    pub fn is_check_action(&self, action: &str) -> bool {
        self.check_actions.iter().any(|a| a == action)
    }
}

/// External renderer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Graphviz `dot` binary
    pub dot_path: String,

    /// Ghostscript binary
    pub gs_path: String,

    /// Produce PNG via PostScript and ghostscript for smoother output
    pub use_gs: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            dot_path: "dot".to_string(),
            gs_path: "gs".to_string(),
            use_gs: false,
        }
    }
}

/// Layout direction of a rendered graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Top down
    #[default]
    TD,

    /// Left to right
    LR,

    /// Bottom up
    DT,

    /// Right to left
    RL,
}

impl Direction {
    /// The Graphviz `rankdir` value.
    #[must_use]
    pub fn rankdir(self) -> &'static str {
        match self {
            Self::TD => "TB",
            Self::LR => "LR",
            Self::DT => "BT",
            Self::RL => "RL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TD => "TD",
            Self::LR => "LR",
            Self::DT => "DT",
            Self::RL => "RL",
        };
        f.write_str(s)
    }
}

/// Graph presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Layout direction
    pub direction: Direction,

    /// Fill color of open tickets
    pub opened_color: String,

    /// Fill color of closed tickets
    pub closed_color: String,

    /// Fill color of tickets closed with a bad resolution
    pub bad_closed_color: String,

    /// Resolutions that count as "bad"
    pub bad_resolutions: Vec<String>,

    /// Column width summary labels are wrapped at
    pub label_width: usize,

    /// Prefix for node links; empty yields `/ticket/<id>`
    pub base_href: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TD,
            opened_color: "red".to_string(),
            closed_color: "green".to_string(),
            bad_closed_color: "grey".to_string(),
            bad_resolutions: ["wontfix", "invalid", "duplicate"]
                .into_iter()
                .map(String::from)
                .collect(),
            label_width: 32,
            base_href: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.renderer.dot_path, "dot");
        assert!(!config.renderer.use_gs);
        assert_eq!(config.graph.direction, Direction::TD);
        assert_eq!(config.graph.label_width, 32);
        assert!(config.is_check_action("resolve"));
        assert!(!config.is_check_action("accept"));
    }

    #[rstest]
    #[case(Direction::TD, "TB")]
    #[case(Direction::LR, "LR")]
    #[case(Direction::DT, "BT")]
    #[case(Direction::RL, "RL")]
    fn test_rankdir(#[case] direction: Direction, #[case] expected: &str) {
        assert_eq!(direction.rankdir(), expected);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = "graph:\n  direction: LR\n  closed_color: blue\ncheck_actions: [resolve]\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.graph.direction, Direction::LR);
        assert_eq!(config.graph.closed_color, "blue");
        assert_eq!(config.graph.opened_color, "red");
        assert_eq!(config.check_actions, vec!["resolve"]);
        assert_eq!(config.renderer, RendererConfig::default());
    }

    #[tokio::test]
    async fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join(CONFIG_FILE_NAME))
            .await
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.renderer.use_gs = true;
        config.graph.base_href = "/trac".to_string();
        config.save(&path).await.unwrap();

        assert_eq!(Config::load(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(&path, "graph: [not, a, map]").await.unwrap();

        let err = Config::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
