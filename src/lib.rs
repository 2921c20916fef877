//! # minidb - Embedded Single-File Key/Value Store
//!
//! minidb stores one fixed-schema table, `(id, username, email)` rows
//! keyed by a `u32` primary key, in a single file behind a
//! SQL-flavored REPL. The interesting machinery is the storage engine:
//! a persistent B+ tree over a paged file with an explicit page cache.
//!
//! ## Quick Start
//!
//! ```ignore
//! use minidb::{Row, Table};
//!
//! let mut table = Table::open("./users.db")?;
//! table.insert(&Row::new(1, "alice", "alice@example.com"))?;
//!
//! for row in table.select_all()? {
//!     println!("{}", row);
//! }
//!
//! table.close()?; // changes are durable only after a clean close
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        CLI / REPL (cli, sql)        │
//! ├─────────────────────────────────────┤
//! │        Table facade + Cursor        │
//! ├─────────────────────────────────────┤
//! │  B+ tree (node views + algorithms)  │
//! ├─────────────────────────────────────┤
//! │   Row codec (fixed 293-byte rows)   │
//! ├─────────────────────────────────────┤
//! │  Pager (page cache over file I/O)   │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## File Format
//!
//! The file is a flat array of 4096-byte pages; page 0 is the tree
//! root, starting life as an empty leaf and rewritten in place as an
//! internal node after the first split. Leaves hold 297-byte cells
//! (key ‖ row) and chain to their right sibling for in-order scans;
//! internal nodes hold 8-byte key/child cells plus a right-child
//! pointer. All integers are little-endian.
//!
//! ## Scope
//!
//! Single-process, single-threaded, insert-and-scan only. There is no
//! deletion, no transaction log, and no crash-atomic durability:
//! changes persist across a clean `close()` and that is the whole
//! contract. Splitting internal nodes is not implemented; the tree
//! grows to two levels, which covers the 100-page file cap.
//!
//! ## Module Overview
//!
//! - [`config`]: every layout constant, derived and compile-time checked
//! - [`record`]: the row type and its fixed-width codec
//! - [`storage`]: page headers and the file-backed page cache
//! - [`btree`]: leaf/internal node views and the tree algorithms
//! - [`table`]: the owning facade and cursor iteration
//! - [`sql`]: statement preparation and execution
//! - [`cli`]: the interactive REPL and meta commands

pub mod btree;
pub mod cli;
pub mod config;
pub mod record;
pub mod sql;
pub mod storage;
pub mod table;

pub use record::Row;
pub use sql::{execute_statement, prepare_statement, ExecuteResult, PrepareError, Statement};
pub use table::{Cursor, Table};
