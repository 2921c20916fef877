//! # B+ Tree Module
//!
//! The disk-backed B+ tree: typed node views over page bytes and the
//! algorithms that maintain the tree across inserts.
//!
//! - [`leaf`]: leaf node views over fixed 297-byte cells holding rows
//! - [`internal`]: internal node views over key/child routing cells
//! - [`tree`]: search, insert, leaf splitting, root promotion
//!
//! Node views are borrow-based pairs (`LeafNode` over `&[u8]`,
//! `LeafNodeMut` over `&mut [u8]`) that mutate the page frame in place,
//! so a page is always current once an operation returns. The tree
//! itself addresses nodes only by page id and snapshots cells into
//! locals whenever a rewrite touches two pages, keeping every mutable
//! frame borrow exclusive.

pub mod internal;
pub mod leaf;
pub mod tree;

pub use internal::{InternalNode, InternalNodeMut};
pub use leaf::{LeafCell, LeafNode, LeafNodeMut};
pub use tree::{BTree, CursorPos, InsertResult};
