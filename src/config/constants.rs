//! # Layout Constants
//!
//! This module centralizes every on-disk layout constant. Constants that
//! depend on each other are co-located and derived rather than spelled
//! out, so changing `PAGE_SIZE` or a column width recomputes the whole
//! layout.
//!
//! ## Dependency Graph
//!
//! ```text
//! PAGE_SIZE (4096 bytes)
//!       │
//!       ├─> LEAF_SPACE_FOR_CELLS (derived: PAGE_SIZE - LEAF_HEADER_SIZE)
//!       │         │
//!       │         └─> LEAF_MAX_CELLS (derived: space / LEAF_CELL_SIZE)
//!       │                   │
//!       │                   ├─> LEAF_RIGHT_SPLIT_COUNT (⌈(MAX+1)/2⌉)
//!       │                   └─> LEAF_LEFT_SPLIT_COUNT  ((MAX+1) - right)
//!       │
//!       └─> INTERNAL_MAX_CELLS (derived: usable space / INTERNAL_CELL_SIZE)
//!
//! USERNAME_MAX_LEN (32) ──> USERNAME_FIELD_SIZE (33, one terminator byte)
//! EMAIL_MAX_LEN (255)   ──> EMAIL_FIELD_SIZE (256, one terminator byte)
//!       │
//!       └─> ROW_SIZE (id + username + email = 293)
//!                 │
//!                 └─> LEAF_CELL_SIZE (key + row = 297)
//! ```
//!
//! ## Critical Invariants
//!
//! Enforced by compile-time assertions below:
//!
//! 1. `ROW_SIZE == 293`: the wire format of a row is frozen.
//! 2. `LEAF_HEADER_SIZE == 14` and `LEAF_MAX_CELLS == 13`: one split
//!    produces two half-full leaves of 7 cells each.
//! 3. Split counts sum to `LEAF_MAX_CELLS + 1`: no cell is dropped or
//!    duplicated during a split.
//!
//! ## Usage
//!
//! Import constants from this module rather than defining them locally:
//!
//! ```ignore
//! use crate::config::{PAGE_SIZE, LEAF_MAX_CELLS};
//! ```

// ============================================================================
// PAGE FILE GEOMETRY
// ============================================================================

/// Size of each database page in bytes. The fundamental unit of I/O.
pub const PAGE_SIZE: usize = 4096;

/// Maximum number of pages in a database file. The pager's frame table is
/// direct-mapped by page id, so this also bounds the cache.
pub const MAX_PAGES: usize = 100;

// ============================================================================
// ROW LAYOUT
// The single fixed-schema row: id ‖ username ‖ email, little-endian id,
// null-padded text fields with one reserved terminator byte each.
// ============================================================================

/// Longest username accepted by the statement parser, in bytes.
pub const USERNAME_MAX_LEN: usize = 32;

/// Longest email accepted by the statement parser, in bytes.
pub const EMAIL_MAX_LEN: usize = 255;

/// Serialized width of the id column.
pub const ID_SIZE: usize = size_of::<u32>();

/// Serialized width of the username column (content plus terminator).
pub const USERNAME_FIELD_SIZE: usize = USERNAME_MAX_LEN + 1;

/// Serialized width of the email column (content plus terminator).
pub const EMAIL_FIELD_SIZE: usize = EMAIL_MAX_LEN + 1;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_FIELD_SIZE;

/// Serialized width of a whole row.
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_FIELD_SIZE + EMAIL_FIELD_SIZE;

const _: () = assert!(ROW_SIZE == 293, "row wire format is frozen at 293 bytes");

// ============================================================================
// NODE HEADERS
// Every page is a B+ tree node and starts with the common header.
// ============================================================================

/// Common node header: kind (1) ‖ is_root (1) ‖ parent page id (4).
pub const COMMON_HEADER_SIZE: usize = 6;

/// Leaf header: common ‖ num_cells (4) ‖ next_leaf (4).
pub const LEAF_HEADER_SIZE: usize = COMMON_HEADER_SIZE + 4 + 4;

/// Internal header: common ‖ num_keys (4) ‖ right_child (4).
pub const INTERNAL_HEADER_SIZE: usize = COMMON_HEADER_SIZE + 4 + 4;

const _: () = assert!(LEAF_HEADER_SIZE == 14, "leaf header layout is frozen");
const _: () = assert!(INTERNAL_HEADER_SIZE == 14, "internal header layout is frozen");

// ============================================================================
// LEAF NODE CELLS
// ============================================================================

/// Leaf cell: key (4) ‖ serialized row.
pub const LEAF_CELL_SIZE: usize = ID_SIZE + ROW_SIZE;

/// Bytes available for cells after the leaf header.
pub const LEAF_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_HEADER_SIZE;

/// Cells a leaf can hold before it must split.
pub const LEAF_MAX_CELLS: usize = LEAF_SPACE_FOR_CELLS / LEAF_CELL_SIZE;

/// Cells moved to the new (right) leaf by a split.
pub const LEAF_RIGHT_SPLIT_COUNT: usize = (LEAF_MAX_CELLS + 1) / 2;

/// Cells kept in the original (left) leaf by a split.
pub const LEAF_LEFT_SPLIT_COUNT: usize = (LEAF_MAX_CELLS + 1) - LEAF_RIGHT_SPLIT_COUNT;

const _: () = assert!(LEAF_CELL_SIZE == 297, "leaf cell layout is frozen");
const _: () = assert!(LEAF_MAX_CELLS == 13, "13 cells of 297 bytes fit in 4082");
const _: () = assert!(
    LEAF_LEFT_SPLIT_COUNT + LEAF_RIGHT_SPLIT_COUNT == LEAF_MAX_CELLS + 1,
    "a split must redistribute every cell exactly once"
);

// ============================================================================
// INTERNAL NODE CELLS
// ============================================================================

/// Internal cell: key (4) ‖ child page id (4).
pub const INTERNAL_CELL_SIZE: usize = 8;

/// Keys an internal node can hold. Splitting internal nodes is not
/// implemented; inserts that would overflow this fail with an error.
pub const INTERNAL_MAX_CELLS: usize = (PAGE_SIZE - INTERNAL_HEADER_SIZE) / INTERNAL_CELL_SIZE;

const _: () = assert!(INTERNAL_MAX_CELLS == 510, "510 cells of 8 bytes fit in 4082");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_offsets_are_contiguous() {
        assert_eq!(ID_OFFSET, 0);
        assert_eq!(USERNAME_OFFSET, 4);
        assert_eq!(EMAIL_OFFSET, 37);
        assert_eq!(ROW_SIZE, 293);
    }

    #[test]
    fn leaf_layout_matches_page_size() {
        assert_eq!(LEAF_SPACE_FOR_CELLS, 4082);
        assert!(LEAF_HEADER_SIZE + LEAF_MAX_CELLS * LEAF_CELL_SIZE <= PAGE_SIZE);
    }

    #[test]
    fn split_counts_are_balanced() {
        assert_eq!(LEAF_RIGHT_SPLIT_COUNT, 7);
        assert_eq!(LEAF_LEFT_SPLIT_COUNT, 7);
    }
}
