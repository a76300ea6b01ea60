//! Builds dependency graphs from ticket links.
//!
//! [`GraphBuilder`] walks the link closure of a set of seed tickets and turns
//! it into a [`Graph`]: one node per ticket, colored by status and linked to
//! the ticket page, and one edge per blocking relation. With clustering
//! enabled, tickets are grouped by milestone; an edge between two tickets of
//! the same milestone is placed in that milestone's cluster, any other edge
//! at the top level.

use crate::config::{Config, GraphConfig, RendererConfig};
use crate::domain::{StatusClass, TicketId};
use crate::error::{Error, Result};
use crate::links::{walk_tickets, TicketLinks};
use crate::storage::{RelationStore, TicketStore};
use blockgraph_dot::{rasterize_postscript, ClusterId, Graph};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// What a graph is requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single ticket and its neighborhood
    Ticket(TicketId),

    /// Every ticket scheduled for a milestone
    Milestone(String),
}

impl FromStr for Target {
    type Err = Error;

    /// Accepts `5`, `#5`, `ticket/5` and `milestone/<name>`.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(name) = s.strip_prefix("milestone/") {
            if name.is_empty() {
                return Err(Error::InvalidTicketId(s.to_string()));
            }
            return Ok(Self::Milestone(name.to_string()));
        }
        let id = s.strip_prefix("ticket/").unwrap_or(s);
        id.parse()
            .map(Self::Ticket)
            .map_err(|_| Error::InvalidTicketId(s.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ticket(id) => write!(f, "ticket/{id}"),
            Self::Milestone(name) => write!(f, "milestone/{name}"),
        }
    }
}

impl Target {
    /// Resolve the target to seed ticket IDs.
    ///
    /// # Errors
    ///
    /// Returns `Error::TicketNotFound` for a ticket target that does not
    /// exist.
    pub async fn seeds<S>(&self, store: &S) -> Result<Vec<TicketId>>
    where
        S: TicketStore + ?Sized,
    {
        match self {
            Self::Ticket(id) => {
                store.get(*id).await?.ok_or(Error::TicketNotFound(*id))?;
                Ok(vec![*id])
            }
            Self::Milestone(name) => store.tickets_in_milestone(name).await,
        }
    }
}

/// How a built graph is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphFormat {
    /// Canonical graph text
    Text,

    /// One link description per seed ticket
    Debug,

    /// An image format passed to the renderer (`png`, `svg`, ...)
    Image(String),
}

impl FromStr for GraphFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Err(Error::Config("empty output format".to_string())),
            "text" => Ok(Self::Text),
            "debug" => Ok(Self::Debug),
            other => Ok(Self::Image(other.to_string())),
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Debug => f.write_str("debug"),
            Self::Image(format) => f.write_str(format),
        }
    }
}

/// Builds a [`Graph`] for a set of seed tickets.
#[derive(Debug, Clone)]
pub struct GraphBuilder<'a> {
    config: &'a GraphConfig,
    label_summary: bool,
    cluster_by_milestone: bool,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder using the given presentation settings.
    #[must_use]
    pub fn new(config: &'a GraphConfig) -> Self {
        Self {
            config,
            label_summary: false,
            cluster_by_milestone: false,
        }
    }

    /// Include the wrapped summary in node labels.
    #[must_use]
    pub fn label_summary(mut self, enabled: bool) -> Self {
        self.label_summary = enabled;
        self
    }

    /// Group nodes into one cluster per milestone.
    #[must_use]
    pub fn cluster_by_milestone(mut self, enabled: bool) -> Self {
        self.cluster_by_milestone = enabled;
        self
    }

    /// Walk the link closure of `seeds` and build its graph.
    ///
    /// # Errors
    ///
    /// Propagates store errors from the walk.
    pub async fn build<S>(&self, store: &S, seeds: &[TicketId]) -> Result<Graph>
    where
        S: TicketStore + RelationStore + ?Sized,
    {
        let links = walk_tickets(store, seeds).await?;
        self.build_from_links(seeds, links)
    }

    /// Build a graph from already walked links.
    ///
    /// Every seed gets a top-level node, even with no links. Links are laid
    /// out in ascending ticket order. Edges to tickets absent from `links`
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns `Error::Render` if cluster bookkeeping fails.
    pub fn build_from_links(&self, seeds: &[TicketId], mut links: Vec<TicketLinks>) -> Result<Graph> {
        let mut graph = Graph::default();
        graph
            .attrs_mut()
            .set("rankdir", self.config.direction.rankdir());
        graph.node_defaults_mut().set("style", "filled");
        graph.edge_defaults_mut().set("style", "");

        for &seed in seeds {
            graph.root_node(seed);
        }

        links.sort_by_key(TicketLinks::id);
        let groups: HashMap<TicketId, Option<&str>> = links
            .iter()
            .map(|l| (l.id(), l.ticket().milestone.as_deref()))
            .collect();

        let mut clusters: BTreeMap<&str, ClusterId> = BTreeMap::new();
        for link in &links {
            let ticket = link.ticket();
            let group = self.group_of(&groups, ticket.id);

            let (node, cluster) = match group {
                Some(name) => {
                    let cluster = match clusters.get(name) {
                        Some(&id) => id,
                        None => {
                            let id = graph
                                .create_cluster(format!("cluster_{name}"), [("label", name)])?;
                            clusters.insert(name, id);
                            id
                        }
                    };
                    (graph.cluster_node(cluster, ticket.id)?, Some(cluster))
                }
                None => (graph.root_node(ticket.id), None),
            };

            let summary = ticket.summary.replace('"', "'");
            let fill = match ticket.classify(&self.config.bad_resolutions) {
                StatusClass::Open => &self.config.opened_color,
                StatusClass::Closed => &self.config.closed_color,
                StatusClass::BadClosed => &self.config.bad_closed_color,
            };
            graph
                .node_mut(node)
                .set("label", self.label(ticket.id, &summary))
                .set("fillcolor", fill.as_str())
                .set("URL", self.ticket_href(ticket.id))
                .set("alt", format!("Ticket #{}", ticket.id))
                .set("tooltip", summary);

            for &target in &link.blocking {
                if !groups.contains_key(&target) {
                    debug!(ticket = %ticket.id, dest = %target, "Dropping edge to missing ticket");
                    continue;
                }
                let dest = graph.get_or_create_node(target);
                let edge = graph.connect(node, dest);
                match cluster {
                    Some(cluster) if self.group_of(&groups, target) == group => {
                        graph.cluster_add(cluster, edge)?;
                    }
                    _ => graph.add_root(edge),
                }
            }
        }

        debug!(
            seeds = seeds.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            clusters = clusters.len(),
            "Built dependency graph"
        );
        Ok(graph)
    }

    fn group_of<'g>(&self, groups: &HashMap<TicketId, Option<&'g str>>, id: TicketId) -> Option<&'g str> {
        if !self.cluster_by_milestone {
            return None;
        }
        groups.get(&id).copied().flatten()
    }

    fn label(&self, id: TicketId, summary: &str) -> String {
        if !self.label_summary {
            return format!("#{id}");
        }
        let text = format!("#{id} {summary}");
        textwrap::wrap(&text, self.config.label_width.max(1)).join("\n")
    }

    fn ticket_href(&self, id: TicketId) -> String {
        format!("{}/ticket/{id}", self.config.base_href.trim_end_matches('/'))
    }
}

/// Build the graph for `seeds` and emit it in `format`.
///
/// Image formats are rendered with the configured `dot`; with `use_gs` set,
/// PNG output is rendered as PostScript and rasterized by ghostscript.
///
/// # Errors
///
/// Returns `Error::Render` if the renderer fails, plus any store error.
pub async fn render<S>(
    store: &S,
    config: &Config,
    builder: &GraphBuilder<'_>,
    seeds: &[TicketId],
    format: &GraphFormat,
) -> Result<Vec<u8>>
where
    S: TicketStore + RelationStore + ?Sized,
{
    if *format == GraphFormat::Debug {
        let mut lines = Vec::with_capacity(seeds.len());
        for &seed in seeds {
            lines.push(TicketLinks::load(store, seed).await?.to_string());
        }
        return Ok(lines.join("\n").into_bytes());
    }

    let graph = builder.build(store, seeds).await?;
    match format {
        GraphFormat::Image(image) => render_image(graph, &config.renderer, image.clone()).await,
        _ => Ok(graph.render_text().into_bytes()),
    }
}

async fn render_image(graph: Graph, renderer: &RendererConfig, format: String) -> Result<Vec<u8>> {
    let renderer = renderer.clone();
    let bytes = tokio::task::spawn_blocking(move || {
        if format == "png" && renderer.use_gs {
            debug!(gs = %renderer.gs_path, "Rasterizing PostScript with ghostscript");
            let ps = graph.render_image(&renderer.dot_path, "ps2")?;
            rasterize_postscript(&renderer.gs_path, &ps)
        } else {
            graph.render_image(&renderer.dot_path, &format)
        }
    })
    .await
    .map_err(std::io::Error::other)??;
    Ok(bytes)
}
