//! A small Graphviz digraph model.
//!
//! Nodes are interned by name inside a [`Graph`], edges are created with
//! [`Graph::connect`], and nodes can be grouped into named [`Cluster`]s.
//! [`Graph::render_text`] produces the canonical `digraph` text, which is
//! byte-identical across calls on an unchanged graph. [`Graph::render_image`]
//! pipes that text through an external renderer such as `dot`.
//!
//! # Example
//!
//! ```
//! use blockgraph_dot::Graph;
//!
//! let mut graph = Graph::new("deps");
//! let a = graph.root_node(1);
//! let b = graph.get_or_create_node(2);
//! let edge = graph.connect(a, b);
//! graph.add_root(edge);
//!
//! assert_eq!(
//!     graph.render_text(),
//!     "digraph \"deps\" {\n\t1;\n\t2;\n\t1 -> 2;\n}"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attrs;
pub mod error;
pub mod graph;
pub mod render;
mod text;

pub use attrs::{AttrValue, Attributes};
pub use error::{Error, Result};
pub use graph::{Cluster, ClusterId, Edge, EdgeId, Graph, Item, Node, NodeId};
pub use render::{pipe_through, rasterize_postscript};
