//! Answer natural-language questions about a SQLite database.
//!
//! A question is turned into one SQL statement, either by a language model
//! that sees the live schema or by a keyword heuristic when no model is
//! available. The statement runs on a fresh connection and the rows come
//! back as column-keyed records.
#![warn(missing_docs)]

/// Environment-driven settings.
pub mod config;
/// Statement execution, result values, and the read-only guard.
pub mod exec;
/// CSV loading into tables.
pub mod ingest;
/// Response shaping, text tables, and terminal charts.
pub mod output;
/// Schema introspection and its text rendering.
pub mod schema;
/// HTTP routes.
pub mod server;
/// The per-request pipeline.
pub mod service;
/// Scoped SQLite connections.
pub mod store;
/// Heuristic SQL synthesis.
pub mod synth;
/// Language-model translation with heuristic fallback.
pub mod translate;
