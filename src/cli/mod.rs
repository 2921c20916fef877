//! # CLI Module
//!
//! The interactive shell over one database file.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            Entry point (bin/minidb.rs)      │
//! ├─────────────────────────────────────────────┤
//! │                  REPL loop                  │
//! │   rustyline input · dispatch · formatting   │
//! ├──────────────────────┬──────────────────────┤
//! │    Meta commands     │       History        │
//! │ (.exit .btree        │  ~/.minidb_history,  │
//! │  .constants)         │  MINIDB_HISTORY      │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! Statements go through `sql::prepare_statement` /
//! `sql::execute_statement`; dot commands short-circuit to
//! [`commands::CommandHandler`].

pub mod commands;
pub mod history;
pub mod repl;

pub use repl::Repl;
