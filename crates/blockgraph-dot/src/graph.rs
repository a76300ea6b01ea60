//! Graph, node, edge and cluster types.
//!
//! A [`Graph`] owns every [`Node`], [`Edge`] and [`Cluster`] it contains.
//! Callers hold lightweight copyable handles ([`NodeId`], [`EdgeId`],
//! [`ClusterId`]) and go through the graph to read or change attributes.
//!
//! Nodes are interned by name: asking for the same name twice returns the
//! same [`NodeId`] for the lifetime of the graph, so attribute writes and edge
//! attachments made from different code paths accumulate on one node.

use crate::attrs::{AttrValue, Attributes};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Handle to a node owned by a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Handle to an edge owned by a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

/// Handle to a cluster owned by a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(usize);

/// Something that can be placed at the top level of a graph or in a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    /// A node.
    Node(NodeId),
    /// An edge.
    Edge(EdgeId),
}

impl From<NodeId> for Item {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<EdgeId> for Item {
    fn from(id: EdgeId) -> Self {
        Self::Edge(id)
    }
}

/// A named node with presentation attributes.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    attrs: Attributes,
    edges: Vec<EdgeId>,
}

impl Node {
    /// The node's unique name within its graph.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes set on this node.
    #[must_use]
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Set an attribute, returning `self` for chaining.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        self.attrs.set(key, value);
        self
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Edges incident to this node, in creation order.
    #[must_use]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }
}

/// A directed edge between two nodes of the same graph.
#[derive(Debug, Clone)]
pub struct Edge {
    source: NodeId,
    dest: NodeId,
    attrs: Attributes,
}

impl Edge {
    /// Tail of the edge.
    #[must_use]
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Head of the edge.
    #[must_use]
    pub fn dest(&self) -> NodeId {
        self.dest
    }

    /// Attributes set on this edge.
    #[must_use]
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Set an attribute, returning `self` for chaining.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        self.attrs.set(key, value);
        self
    }
}

/// A named subgraph grouping some of the graph's nodes and edges.
#[derive(Debug, Clone)]
pub struct Cluster {
    name: String,
    attrs: Attributes,
    nodes: Vec<NodeId>,
    node_set: HashSet<NodeId>,
    edges: Vec<EdgeId>,
}

impl Cluster {
    /// The cluster name, unique within its graph.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes set on this cluster.
    #[must_use]
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Set an attribute, returning `self` for chaining.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        self.attrs.set(key, value);
        self
    }

    /// Explicit member nodes in the order they were added.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Edges recorded in this cluster.
    #[must_use]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Returns `true` if the node is an explicit member.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.node_set.contains(&node)
    }
}

/// A directed graph with interned nodes, top-level content and clusters.
#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    attrs: Attributes,
    node_defaults: Attributes,
    edge_defaults: Attributes,
    nodes: Vec<Node>,
    node_index: HashMap<String, NodeId>,
    edges: Vec<Edge>,
    roots: Vec<NodeId>,
    root_set: HashSet<NodeId>,
    root_edges: Vec<EdgeId>,
    clusters: Vec<Cluster>,
    cluster_index: HashMap<String, ClusterId>,
    membership: HashMap<NodeId, ClusterId>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("graph")
    }
}

impl Graph {
    /// Create an empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attributes::new(),
            node_defaults: Attributes::new(),
            edge_defaults: Attributes::new(),
            nodes: Vec::new(),
            node_index: HashMap::new(),
            edges: Vec::new(),
            roots: Vec::new(),
            root_set: HashSet::new(),
            root_edges: Vec::new(),
            clusters: Vec::new(),
            cluster_index: HashMap::new(),
            membership: HashMap::new(),
        }
    }

    /// The graph name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Graph-level attributes (`rankdir`, ...).
    #[must_use]
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Mutable graph-level attributes.
    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    /// Default attributes applied to every node.
    #[must_use]
    pub fn node_defaults(&self) -> &Attributes {
        &self.node_defaults
    }

    /// Mutable default node attributes.
    pub fn node_defaults_mut(&mut self) -> &mut Attributes {
        &mut self.node_defaults
    }

    /// Default attributes applied to every edge.
    #[must_use]
    pub fn edge_defaults(&self) -> &Attributes {
        &self.edge_defaults
    }

    /// Mutable default edge attributes.
    pub fn edge_defaults_mut(&mut self) -> &mut Attributes {
        &mut self.edge_defaults
    }

    // ========== Nodes ==========

    /// Return the node registered under `name`, creating it if needed.
    ///
    /// The name is converted to its string form, so `5` and `"5"` refer to
    /// the same node. A newly created node has no attributes and is not part
    /// of the top-level content until passed to [`Graph::add_root`].
    pub fn get_or_create_node(&mut self, name: impl fmt::Display) -> NodeId {
        let name = name.to_string();
        if let Some(&id) = self.node_index.get(&name) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.clone(),
            attrs: Attributes::new(),
            edges: Vec::new(),
        });
        self.node_index.insert(name, id);
        id
    }

    /// Fetch or create a node and make it part of the top-level content.
    pub fn root_node(&mut self, name: impl fmt::Display) -> NodeId {
        let id = self.get_or_create_node(name);
        self.add_root(id);
        id
    }

    /// Look up a node by name without creating it.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a different graph.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutably borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a different graph.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// All registered nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes explicitly added to the top level, in insertion order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    // ========== Edges ==========

    /// Create a directed edge from `from` to `to`.
    ///
    /// The edge is attached to both nodes' incident-edge lists. It is not
    /// rendered until it is added to the top level or to a cluster.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            source: from,
            dest: to,
            attrs: Attributes::new(),
        });
        self.nodes[from.0].edges.push(id);
        if to != from {
            self.nodes[to.0].edges.push(id);
        }
        id
    }

    /// Borrow an edge.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a different graph.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// Mutably borrow an edge.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a different graph.
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.0]
    }

    /// Number of edges ever created on this graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges explicitly added to the top level, in insertion order.
    #[must_use]
    pub fn root_edges(&self) -> &[EdgeId] {
        &self.root_edges
    }

    /// Add a node or edge to the top-level content.
    ///
    /// Adding a node twice is a no-op; adding an edge always appends.
    pub fn add_root(&mut self, item: impl Into<Item>) {
        match item.into() {
            Item::Node(id) => {
                if self.root_set.insert(id) {
                    self.roots.push(id);
                }
            }
            Item::Edge(id) => self.root_edges.push(id),
        }
    }

    // ========== Clusters ==========

    /// Create and register a cluster.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateCluster` if the name is already taken.
    pub fn create_cluster<I, K, V>(&mut self, name: impl Into<String>, attrs: I) -> Result<ClusterId>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttrValue>,
    {
        let name = name.into();
        if self.cluster_index.contains_key(&name) {
            return Err(Error::DuplicateCluster(name));
        }
        let id = ClusterId(self.clusters.len());
        self.clusters.push(Cluster {
            name: name.clone(),
            attrs: attrs.into_iter().collect(),
            nodes: Vec::new(),
            node_set: HashSet::new(),
            edges: Vec::new(),
        });
        self.cluster_index.insert(name, id);
        Ok(id)
    }

    /// Look up a cluster by name.
    #[must_use]
    pub fn find_cluster(&self, name: &str) -> Option<ClusterId> {
        self.cluster_index.get(name).copied()
    }

    /// Borrow a cluster.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a different graph.
    #[must_use]
    pub fn cluster(&self, id: ClusterId) -> &Cluster {
        &self.clusters[id.0]
    }

    /// Mutably borrow a cluster.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a different graph.
    pub fn cluster_mut(&mut self, id: ClusterId) -> &mut Cluster {
        &mut self.clusters[id.0]
    }

    /// All clusters in registration order.
    pub fn clusters(&self) -> impl Iterator<Item = (ClusterId, &Cluster)> {
        self.clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (ClusterId(i), c))
    }

    /// Add a node or edge to a cluster.
    ///
    /// Nodes are deduplicated; edges always append.
    ///
    /// # Errors
    ///
    /// Returns `Error::ClusterMembership` if the node is already an explicit
    /// member of another cluster.
    pub fn cluster_add(&mut self, cluster: ClusterId, item: impl Into<Item>) -> Result<()> {
        match item.into() {
            Item::Node(node) => {
                if let Some(&owner) = self.membership.get(&node) {
                    if owner != cluster {
                        return Err(Error::ClusterMembership {
                            node: self.nodes[node.0].name.clone(),
                            cluster: self.clusters[owner.0].name.clone(),
                        });
                    }
                    return Ok(());
                }
                self.membership.insert(node, cluster);
                let c = &mut self.clusters[cluster.0];
                c.node_set.insert(node);
                c.nodes.push(node);
            }
            Item::Edge(edge) => self.clusters[cluster.0].edges.push(edge),
        }
        Ok(())
    }

    /// Fetch or create a node by name and make it a member of `cluster`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ClusterMembership` if the node already belongs to a
    /// different cluster.
    pub fn cluster_node(&mut self, cluster: ClusterId, name: impl fmt::Display) -> Result<NodeId> {
        let id = self.get_or_create_node(name);
        self.cluster_add(cluster, id)?;
        Ok(id)
    }

    /// The cluster a node explicitly belongs to, if any.
    #[must_use]
    pub fn cluster_of(&self, node: NodeId) -> Option<ClusterId> {
        self.membership.get(&node).copied()
    }
}
