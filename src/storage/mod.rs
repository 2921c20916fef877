//! # Storage Module
//!
//! The paged storage layer: a slotted page file accessed through an
//! explicit page cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        B+ tree node views           │  btree::{leaf, internal}
//! ├─────────────────────────────────────┤
//! │   Pager (frame table + file I/O)    │  storage::pager
//! ├─────────────────────────────────────┤
//! │   Header layouts (zerocopy views)   │  storage::page
//! └─────────────────────────────────────┘
//! ```
//!
//! The file is a flat array of 4096-byte pages indexed from 0; page 0
//! is always the tree root. The [`Pager`] reads a page into its frame
//! on first access and writes every cached frame back on close; there
//! is no dirty tracking and no eviction, because the file is bounded at
//! 100 pages.
//!
//! Node code never touches the file: it borrows a page's bytes from the
//! pager and mutates them in place through the typed header views in
//! [`page`]. Exclusive access is enforced by the borrow checker: no
//! two mutable views over the same frame can exist at once.

mod page;
mod pager;

pub use page::{node_kind, InternalHeader, LeafHeader, NodeHeader, NodeKind, PageId};
pub use pager::Pager;
