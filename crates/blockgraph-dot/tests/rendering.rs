//! Integration tests for canonical text output and external rendering.

use blockgraph_dot::{pipe_through, Error, Graph};

fn sample_graph() -> Graph {
    let mut graph = Graph::new("graph");
    graph.attrs_mut().set("rankdir", "TB");
    graph.node_defaults_mut().set("style", "filled");
    graph.edge_defaults_mut().set("style", "");

    let one = graph.root_node(1);
    graph
        .node_mut(one)
        .set("label", "#1")
        .set("fillcolor", "red");
    let two = graph.get_or_create_node(2);
    let edge = graph.connect(one, two);
    graph.add_root(edge);

    let m1 = graph.create_cluster("cluster_m1", [("label", "m1")]).unwrap();
    let three = graph.cluster_node(m1, 3).unwrap();
    let four = graph.cluster_node(m1, 4).unwrap();
    let inner = graph.connect(three, four);
    graph.cluster_add(m1, inner).unwrap();
    graph
}

#[test]
fn test_render_text_layout() {
    let expected = "digraph \"graph\" {\n\
        \trankdir=\"TB\";\n\
        \tnode [style=\"filled\"];\n\
        \tedge [style=\"\"];\n\
        \t1 [label=\"#1\", fillcolor=\"red\"];\n\
        \t2;\n\
        \t1 -> 2;\n\
        subgraph \"cluster_m1\" {\n\
        \tlabel=\"m1\";\n\
        \t3;\n\
        \t4;\n\
        \t3 -> 4;\n\
        }\n\
        }";
    assert_eq!(sample_graph().render_text(), expected);
}

#[test]
fn test_render_text_is_repeatable() {
    let graph = sample_graph();
    let first = graph.render_text();
    let second = graph.render_text();
    assert_eq!(first, second);
    assert_eq!(first, graph.to_string());
}

#[test]
fn test_edge_endpoints_emitted_without_roots() {
    let mut graph = Graph::default();
    let a = graph.get_or_create_node("a");
    let b = graph.get_or_create_node("b");
    let edge = graph.connect(a, b);
    graph.add_root(edge);

    let text = graph.render_text();
    assert!(text.contains("\ta;\n"));
    assert!(text.contains("\tb;\n"));
    assert!(text.contains("\ta -> b;\n"));
}

#[test]
fn test_nodes_deduplicated_within_block() {
    let mut graph = Graph::default();
    let a = graph.root_node("a");
    let b = graph.root_node("b");
    let ab = graph.connect(a, b);
    let ba = graph.connect(b, a);
    graph.add_root(ab);
    graph.add_root(ba);
    graph.add_root(ab);

    let text = graph.render_text();
    assert_eq!(text.matches("\ta;\n").count(), 1);
    assert_eq!(text.matches("\tb;\n").count(), 1);
    assert_eq!(text.matches("\ta -> b;\n").count(), 1);
    assert_eq!(text.matches("\tb -> a;\n").count(), 1);
}

#[test]
fn test_unrooted_edges_are_not_rendered() {
    let mut graph = Graph::default();
    let a = graph.root_node("a");
    let b = graph.get_or_create_node("b");
    graph.connect(a, b);

    assert_eq!(graph.render_text(), "digraph \"graph\" {\n\ta;\n}");
}

#[test]
fn test_labels_with_quotes_and_newlines_are_escaped() {
    let mut graph = Graph::default();
    let n = graph.root_node(9);
    graph.node_mut(n).set("label", "#9 fix \"it\"\nnow");

    assert!(graph
        .render_text()
        .contains("\t9 [label=\"#9 fix \\\"it\\\"\\nnow\"];"));
}

#[test]
fn test_render_image_missing_renderer() {
    let graph = sample_graph();
    let err = graph
        .render_image("/nonexistent/blockgraph/dot", "png")
        .unwrap_err();
    assert!(
        matches!(&err, Error::NotFound { command } if command == "/nonexistent/blockgraph/dot")
    );
    assert!(err.is_render_failure());
}

#[cfg(unix)]
#[test]
fn test_render_image_nonzero_exit_is_error() {
    let graph = sample_graph();
    let err = graph.render_image("false", "png").unwrap_err();
    assert!(err.is_render_failure());
}

#[cfg(unix)]
#[test]
fn test_pipe_through_returns_stdout() {
    let graph = sample_graph();
    let text = graph.render_text();
    let out = pipe_through("cat", &[] as &[&str], text.as_bytes()).unwrap();
    assert_eq!(out, text.as_bytes());
}

#[cfg(unix)]
#[test]
fn test_pipe_through_failure_reports_stderr() {
    let err = pipe_through("sh", &["-c", "echo boom >&2; exit 3"], b"").unwrap_err();
    match err {
        Error::Failed {
            command,
            stderr,
            status,
        } => {
            assert_eq!(command, "sh");
            assert_eq!(stderr, "boom");
            assert_eq!(status.code(), Some(3));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[test]
fn test_pipe_through_empty_output_is_error() {
    let err = pipe_through("sh", &["-c", "cat >/dev/null"], b"digraph {}").unwrap_err();
    assert!(matches!(&err, Error::EmptyOutput { command } if command == "sh"));
}
