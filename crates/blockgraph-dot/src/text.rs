//! Canonical `digraph` text emission.
//!
//! Output layout:
//!
//! ```text
//! digraph "<name>" {
//!     <graph attrs as k="v";>
//!     node [<node defaults>];
//!     edge [<edge defaults>];
//!     <nodes, then edges, discovered from the top-level content>
//! subgraph "<cluster>" {
//!     <cluster attrs, nodes, edges>
//! }
//! }
//! ```
//!
//! Nodes are emitted once per block in discovery order: explicit members
//! first, then any edge endpoint not seen yet. Everything iterates in
//! registration order so repeated calls produce identical bytes.

use crate::attrs::Attributes;
use crate::graph::{EdgeId, Graph, NodeId};
use std::collections::HashSet;
use std::fmt::{self, Write};

impl Graph {
    /// Render the graph as canonical Graphviz text.
    #[must_use]
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    fn write_block(
        &self,
        out: &mut String,
        attrs: &Attributes,
        nodes: &[NodeId],
        edges: &[EdgeId],
        defaults: Option<(&Attributes, &Attributes)>,
    ) -> fmt::Result {
        let mut seen_nodes = HashSet::new();
        let mut seen_edges = HashSet::new();
        let mut node_order = Vec::new();
        let mut edge_order = Vec::new();

        for &node in nodes {
            if seen_nodes.insert(node) {
                node_order.push(node);
            }
        }
        for &edge in edges {
            if !seen_edges.insert(edge) {
                continue;
            }
            edge_order.push(edge);
            let e = self.edge(edge);
            for endpoint in [e.source(), e.dest()] {
                if seen_nodes.insert(endpoint) {
                    node_order.push(endpoint);
                }
            }
        }

        for (key, value) in attrs.iter() {
            writeln!(out, "\t{key}=\"{}\";", escape(&value.to_string()))?;
        }
        if let Some((node_defaults, edge_defaults)) = defaults {
            if !node_defaults.is_empty() {
                writeln!(out, "\t{};", with_options("node", node_defaults))?;
            }
            if !edge_defaults.is_empty() {
                writeln!(out, "\t{};", with_options("edge", edge_defaults))?;
            }
        }
        for node in node_order {
            let n = self.node(node);
            writeln!(out, "\t{};", with_options(&format_id(n.name()), n.attrs()))?;
        }
        for edge in edge_order {
            let e = self.edge(edge);
            let base = format!(
                "{} -> {}",
                format_id(self.node(e.source()).name()),
                format_id(self.node(e.dest()).name())
            );
            writeln!(out, "\t{};", with_options(&base, e.attrs()))?;
        }
        Ok(())
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        writeln!(out, "digraph \"{}\" {{", escape(self.name()))?;
        self.write_block(
            &mut out,
            self.attrs(),
            self.roots(),
            self.root_edges(),
            Some((self.node_defaults(), self.edge_defaults())),
        )?;
        for (_, cluster) in self.clusters() {
            writeln!(out, "subgraph \"{}\" {{", escape(cluster.name()))?;
            self.write_block(&mut out, cluster.attrs(), cluster.nodes(), cluster.edges(), None)?;
            writeln!(out, "}}")?;
        }
        out.push('}');
        f.write_str(&out)
    }
}

/// `base [k="v", ...]`, or just `base` when there are no attributes.
fn with_options(base: &str, attrs: &Attributes) -> String {
    if attrs.is_empty() {
        return base.to_string();
    }
    let options: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", escape(&v.to_string())))
        .collect();
    format!("{base} [{}]", options.join(", "))
}

/// Emit a node name bare when Graphviz accepts it as an ID, quoted otherwise.
fn format_id(name: &str) -> String {
    let is_numeral = !name.is_empty() && name.chars().all(|c| c.is_ascii_digit());
    let is_identifier = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if is_numeral || is_identifier {
        name.to_string()
    } else {
        format!("\"{}\"", escape(name))
    }
}

/// Escape a value for use inside double quotes.
///
/// Backslashes are left alone so Graphviz escapes such as `\l` still work.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
