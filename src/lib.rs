//! Purpose: Shared library crate used by the `oradump` CLI and tests.
//! Exports: `core` (dump grammar, LOB files, errors), `config`, `db` (the
//! database seam), `dump` (export/import/check sessions), `runner`.
//! Role: Internal library backing the binary; connection handling stays with
//! the embedding application.
//! Invariants: Nothing in this crate opens a database connection.
pub mod config;
pub mod core;
pub mod db;
pub mod dump;
pub mod runner;
