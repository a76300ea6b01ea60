//! Blockgraph - ticket dependency tracking and dependency graphs.
//!
//! This crate provides both a CLI application and a library for recording
//! which tickets block which, keeping the denormalized `blocking` /
//! `blockedby` fields consistent, and building Graphviz graphs of the
//! dependency neighborhood of a ticket or milestone.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod builder;
pub mod config;
pub mod domain;
pub mod error;
pub mod links;
pub mod storage;
pub mod validate;

// Public CLI module (needed by binary)
pub mod app;
pub mod cli;
pub mod output;
