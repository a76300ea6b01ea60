//! Integration tests for building dependency graphs from the store.

use blockgraph::builder::{render, GraphBuilder, GraphFormat, Target};
use blockgraph::config::{Config, Direction, GraphConfig};
use blockgraph::domain::{Ticket, TicketId};
use blockgraph::error::Error;
use blockgraph::storage::InMemoryStore;
use blockgraph_dot::{AttrValue, Graph};

mod common;
use common::{insert_relations, store_with_tickets};

fn attr<'g>(graph: &'g Graph, node: &str, key: &str) -> Option<&'g AttrValue> {
    let id = graph.find_node(node)?;
    graph.node(id).get(key)
}

fn text(graph: &Graph, node: &str, key: &str) -> String {
    attr(graph, node, key)
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// T1, T2 in milestone M1 and T3 in M2; T1 blocks T2 blocks T3.
async fn milestone_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.insert_ticket(Ticket::new(1, "one").with_milestone("M1")).await;
    store.insert_ticket(Ticket::new(2, "two").with_milestone("M1")).await;
    store.insert_ticket(Ticket::new(3, "three").with_milestone("M2")).await;
    insert_relations(&store, &[(1, 2), (2, 3)]).await;
    store
}

#[tokio::test]
async fn test_isolated_ticket_renders_single_node() {
    let store = store_with_tickets(10).await;
    let config = GraphConfig::default();

    let graph = GraphBuilder::new(&config)
        .build(&store, &[TicketId(10)])
        .await
        .unwrap();

    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(
        graph.render_text(),
        "digraph \"graph\" {\n\
         \trankdir=\"TB\";\n\
         \tnode [style=\"filled\"];\n\
         \tedge [style=\"\"];\n\
         \t10 [label=\"#10\", fillcolor=\"red\", URL=\"/ticket/10\", alt=\"Ticket #10\", tooltip=\"ticket 10\"];\n\
         }"
    );
}

#[tokio::test]
async fn test_clusters_keep_cross_group_edges_at_top_level() {
    let store = milestone_store().await;
    let config = GraphConfig::default();
    let seeds = [TicketId(1), TicketId(2), TicketId(3)];

    let graph = GraphBuilder::new(&config)
        .cluster_by_milestone(true)
        .build(&store, &seeds)
        .await
        .unwrap();

    let m1 = graph.find_cluster("cluster_M1").unwrap();
    let m2 = graph.find_cluster("cluster_M2").unwrap();
    let one = graph.find_node("1").unwrap();
    let two = graph.find_node("2").unwrap();
    let three = graph.find_node("3").unwrap();

    let inner = graph.cluster(m1).edges();
    assert_eq!(inner.len(), 1);
    assert_eq!(graph.edge(inner[0]).source(), one);
    assert_eq!(graph.edge(inner[0]).dest(), two);
    assert!(graph.cluster(m2).edges().is_empty());

    let top = graph.root_edges();
    assert_eq!(top.len(), 1);
    assert_eq!(graph.edge(top[0]).source(), two);
    assert_eq!(graph.edge(top[0]).dest(), three);

    assert_eq!(graph.cluster_of(one), Some(m1));
    assert_eq!(graph.cluster_of(three), Some(m2));
    assert_eq!(
        graph.cluster(m1).attrs().get("label").map(ToString::to_string),
        Some("M1".to_string())
    );

    let rendered = graph.render_text();
    assert!(rendered.contains("subgraph \"cluster_M1\" {\n\tlabel=\"M1\";\n"));
    assert!(rendered.contains("\t1 -> 2;\n}\n"));
}

#[tokio::test]
async fn test_without_clustering_all_edges_are_top_level() {
    let store = milestone_store().await;
    let config = GraphConfig::default();

    let graph = GraphBuilder::new(&config)
        .build(&store, &[TicketId(1)])
        .await
        .unwrap();

    assert_eq!(graph.root_edges().len(), 2);
    assert_eq!(graph.clusters().count(), 0);
    assert_eq!(graph.node_count(), 3);
}

#[tokio::test]
async fn test_ticket_without_milestone_stays_top_level() {
    let store = milestone_store().await;
    store.insert_ticket(Ticket::new(4, "unscheduled")).await;
    insert_relations(&store, &[(3, 4)]).await;
    let config = GraphConfig::default();

    let graph = GraphBuilder::new(&config)
        .cluster_by_milestone(true)
        .build(&store, &[TicketId(4)])
        .await
        .unwrap();

    let four = graph.find_node("4").unwrap();
    assert_eq!(graph.cluster_of(four), None);
    assert!(graph.roots().contains(&four));
}

#[tokio::test]
async fn test_node_colors_follow_status() {
    let store = InMemoryStore::new();
    store.insert_ticket(Ticket::new(1, "open")).await;
    store.insert_ticket(Ticket::new(2, "fixed").closed("fixed")).await;
    store.insert_ticket(Ticket::new(3, "dup").closed("duplicate")).await;
    insert_relations(&store, &[(2, 1), (3, 1)]).await;

    let config = GraphConfig {
        closed_color: "blue".to_string(),
        ..GraphConfig::default()
    };
    let graph = GraphBuilder::new(&config)
        .build(&store, &[TicketId(1)])
        .await
        .unwrap();

    assert_eq!(text(&graph, "1", "fillcolor"), "red");
    assert_eq!(text(&graph, "2", "fillcolor"), "blue");
    assert_eq!(text(&graph, "3", "fillcolor"), "grey");
}

#[tokio::test]
async fn test_summary_labels_wrap_and_replace_quotes() {
    let store = InMemoryStore::new();
    store
        .insert_ticket(Ticket::new(7, "fix the \"broken\" parser today"))
        .await;
    let config = GraphConfig {
        label_width: 16,
        direction: Direction::LR,
        base_href: "/trac/".to_string(),
        ..GraphConfig::default()
    };

    let graph = GraphBuilder::new(&config)
        .label_summary(true)
        .build(&store, &[TicketId(7)])
        .await
        .unwrap();

    assert_eq!(text(&graph, "7", "label"), "#7 fix the\n'broken' parser\ntoday");
    assert_eq!(text(&graph, "7", "tooltip"), "fix the 'broken' parser today");
    assert_eq!(text(&graph, "7", "URL"), "/trac/ticket/7");
    assert_eq!(text(&graph, "7", "alt"), "Ticket #7");
    assert_eq!(
        graph.attrs().get("rankdir").map(ToString::to_string),
        Some("LR".to_string())
    );
}

#[tokio::test]
async fn test_render_text_is_deterministic() {
    let store = milestone_store().await;
    let config = GraphConfig::default();
    let builder = GraphBuilder::new(&config).cluster_by_milestone(true);

    let first = builder.build(&store, &[TicketId(3)]).await.unwrap();
    let second = builder.build(&store, &[TicketId(3)]).await.unwrap();
    assert_eq!(first.render_text(), second.render_text());
    assert_eq!(first.render_text(), first.render_text());
}

#[tokio::test]
async fn test_milestone_target_seeds() {
    let store = milestone_store().await;

    let seeds = Target::Milestone("M1".to_string()).seeds(&store).await.unwrap();
    assert_eq!(seeds, vec![TicketId(1), TicketId(2)]);

    let none = Target::Milestone("nope".to_string()).seeds(&store).await.unwrap();
    assert!(none.is_empty());

    let err = Target::Ticket(TicketId(40)).seeds(&store).await.unwrap_err();
    assert!(matches!(err, Error::TicketNotFound(TicketId(40))));
}

#[tokio::test]
async fn test_render_text_and_debug_formats() {
    let store = milestone_store().await;
    let config = Config::default();
    let builder = GraphBuilder::new(&config.graph);
    let seeds = [TicketId(2)];

    let out = render(&store, &config, &builder, &seeds, &GraphFormat::Text)
        .await
        .unwrap();
    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("digraph \"graph\" {\n"));
    assert!(out.contains("\t1 -> 2;\n"));
    assert!(out.contains("\t2 -> 3;\n"));

    let out = render(&store, &config, &builder, &seeds, &GraphFormat::Debug)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "<TicketLinks #2 blocking=[3] blocked_by=[1]>"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_render_image_uses_configured_renderer() {
    let store = store_with_tickets(1).await;
    let mut config = Config::default();
    config.renderer.dot_path = "/nonexistent/blockgraph/dot".to_string();
    let builder = GraphBuilder::new(&config.graph);

    let err = render(
        &store,
        &config,
        &builder,
        &[TicketId(1)],
        &GraphFormat::Image("png".to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Render(e) if e.is_render_failure()));
}
