//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use blockgraph::domain::{Ticket, TicketId};
use blockgraph::storage::{InMemoryStore, LinkStore, StoreSnapshot, Transaction};
use std::path::Path;
use std::process::{Command, Output};

/// Path of the blockgraph binary built for this test run
pub fn blockgraph_binary() -> &'static str {
    env!("CARGO_BIN_EXE_blockgraph")
}

/// Run the blockgraph binary in the specified directory
pub fn run_blockgraph_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(blockgraph_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute blockgraph binary")
}

/// Store holding open tickets `1..=n` named `ticket <id>`
pub async fn store_with_tickets(n: u64) -> InMemoryStore {
    let store = InMemoryStore::new();
    for id in 1..=n {
        store
            .insert_ticket(Ticket::new(id, format!("ticket {id}")))
            .await;
    }
    store
}

/// Commit relation rows `source blocks dest` directly, without mirror fields
pub async fn insert_relations(store: &InMemoryStore, rows: &[(u64, u64)]) {
    let mut tx = Transaction::new();
    for &(source, dest) in rows {
        tx.insert_relation(TicketId(source), TicketId(dest));
    }
    store.commit(tx).await.expect("Failed to insert relations");
}

/// Write a data file with the given tickets into `dir/tickets.json`
pub fn write_data_file(dir: &Path, tickets: Vec<Ticket>) {
    let snapshot = StoreSnapshot {
        tickets,
        ..StoreSnapshot::default()
    };
    let json = serde_json::to_string_pretty(&snapshot).expect("Failed to serialize snapshot");
    std::fs::write(dir.join("tickets.json"), json).expect("Failed to write data file");
}
