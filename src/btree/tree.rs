//! # B+ Tree Algorithms
//!
//! Ordered unique-key insert and in-order traversal over the paged
//! node layouts. The tree borrows the pager for the duration of one
//! operation and addresses nodes purely by page id; no native pointer
//! ever reaches the disk format.
//!
//! ## Shape
//!
//! Page 0 is always the root. A fresh tree is a single empty leaf; the
//! first leaf split promotes a new internal root in place:
//!
//! ```text
//!      before                     after
//!   [leaf, page 0]        [internal, page 0]
//!                          /              \
//!               [leaf, page 2]      [leaf, page 1]
//!                  (old root          (right half
//!                   moved out)         of split)
//! ```
//!
//! Leaves are chained through `next_leaf` in ascending key order, so a
//! full scan descends once to the leftmost leaf and then walks
//! siblings.
//!
//! ## Insert Path
//!
//! ```text
//! 1. Descend from the root to the leaf covering the key.
//! 2. Exact key match at the cursor position → DuplicateKey.
//! 3. Leaf has room → shift cells right, write in place.
//! 4. Leaf is full → split:
//!    a. Snapshot the leaf's cells, insert the new cell in order.
//!    b. Rewrite the old page with the left half, a fresh page with
//!       the right half; relink siblings and parent pointers.
//!    c. Old leaf was the root → promote a new internal root.
//!       Otherwise → refresh the parent's key for the old leaf and
//!       register the new leaf with the parent.
//! ```
//!
//! Splitting writes both pages from a snapshot taken up front, so the
//! tree never holds two mutable page borrows at once.
//!
//! ## Limits
//!
//! Splitting internal nodes is not implemented. An insert that would
//! overflow a parent's key array fails with an error naming the limit,
//! as does any operation that would push the file past its 100-page
//! cap. Both are surfaced as hard failures by the REPL.

use std::fmt::Write;

use eyre::{ensure, Result};

use crate::config::{INTERNAL_MAX_CELLS, LEAF_LEFT_SPLIT_COUNT, LEAF_MAX_CELLS, LEAF_RIGHT_SPLIT_COUNT};
use crate::record::Row;
use crate::storage::{node_kind, NodeHeader, NodeKind, PageId, Pager};

use super::internal::{InternalNode, InternalNodeMut};
use super::leaf::{LeafCell, LeafNode, LeafNodeMut};

/// Outcome of an insert attempt: the tree either took the row or
/// already held the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    Inserted,
    DuplicateKey,
}

/// A position within the tree: the leaf page, the cell index inside
/// it, and whether the position is past the last row of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPos {
    pub page_id: PageId,
    pub cell_index: u32,
    pub end_of_table: bool,
}

/// The tree, borrowing the pager for one operation.
#[derive(Debug)]
pub struct BTree<'a> {
    pager: &'a mut Pager,
    root_page: PageId,
}

impl<'a> BTree<'a> {
    pub fn new(pager: &'a mut Pager, root_page: PageId) -> Self {
        Self { pager, root_page }
    }

    /// Descends to the leaf covering `key` and returns the position of
    /// the smallest cell whose key is >= `key` (the key's own cell if
    /// present, its insertion point otherwise).
    pub fn find(&mut self, key: u32) -> Result<CursorPos> {
        let mut page_id = self.root_page;

        loop {
            let page = self.pager.page(page_id)?;
            match node_kind(page)? {
                NodeKind::Leaf => {
                    let leaf = LeafNode::from_page(page)?;
                    let cell_index = leaf.find_slot(key)?;
                    let end_of_table = cell_index == leaf.num_cells() && leaf.next_leaf() == 0;
                    return Ok(CursorPos {
                        page_id,
                        cell_index,
                        end_of_table,
                    });
                }
                NodeKind::Internal => {
                    let node = InternalNode::from_page(page)?;
                    let index = node.find_index(key)?;
                    page_id = node.child_at(index)?;
                }
            }
        }
    }

    /// Position of the smallest key in the tree.
    pub fn start(&mut self) -> Result<CursorPos> {
        self.find(0)
    }

    /// Inserts `row` keyed by its id, splitting the target leaf if it
    /// is full.
    pub fn insert(&mut self, row: &Row) -> Result<InsertResult> {
        let key = row.id;
        let pos = self.find(key)?;

        let num_cells = {
            let page = self.pager.page(pos.page_id)?;
            let leaf = LeafNode::from_page(page)?;
            if pos.cell_index < leaf.num_cells() && leaf.key_at(pos.cell_index)? == key {
                return Ok(InsertResult::DuplicateKey);
            }
            leaf.num_cells()
        };

        if (num_cells as usize) < LEAF_MAX_CELLS {
            let page = self.pager.page_mut(pos.page_id)?;
            let mut leaf = LeafNodeMut::from_page(page)?;
            leaf.insert_at(pos.cell_index, key, row)?;
        } else {
            self.split_leaf_and_insert(pos.page_id, pos.cell_index, row)?;
        }

        Ok(InsertResult::Inserted)
    }

    /// Splits a full leaf around an insert. The combined
    /// `LEAF_MAX_CELLS + 1` cells are snapshotted in order, then the
    /// lower half is written back over the old page and the upper half
    /// into a freshly allocated sibling.
    fn split_leaf_and_insert(&mut self, page_id: PageId, cell_index: u32, row: &Row) -> Result<()> {
        let new_page_id = self.pager.allocate();

        let (was_root, parent, old_next_leaf, old_max, mut cells) = {
            let page = self.pager.page(page_id)?;
            let leaf = LeafNode::from_page(page)?;
            let mut cells = Vec::with_capacity(LEAF_MAX_CELLS + 1);
            for index in 0..leaf.num_cells() {
                cells.push(*leaf.cell_at(index)?);
            }
            (
                leaf.is_root(),
                leaf.parent(),
                leaf.next_leaf(),
                leaf.max_key()?,
                cells,
            )
        };
        cells.insert(cell_index as usize, LeafCell::new(row.id, row));

        {
            let page = self.pager.page_mut(page_id)?;
            let mut leaf = LeafNodeMut::init(page)?;
            leaf.set_is_root(was_root);
            leaf.set_parent(parent);
            for (index, cell) in cells[..LEAF_LEFT_SPLIT_COUNT].iter().enumerate() {
                leaf.write_cell(index as u32, cell)?;
            }
            leaf.set_num_cells(LEAF_LEFT_SPLIT_COUNT as u32);
            leaf.set_next_leaf(new_page_id);
        }

        {
            let page = self.pager.page_mut(new_page_id)?;
            let mut leaf = LeafNodeMut::init(page)?;
            leaf.set_parent(parent);
            for (index, cell) in cells[LEAF_LEFT_SPLIT_COUNT..].iter().enumerate() {
                leaf.write_cell(index as u32, cell)?;
            }
            leaf.set_num_cells(LEAF_RIGHT_SPLIT_COUNT as u32);
            leaf.set_next_leaf(old_next_leaf);
        }

        if was_root {
            self.create_new_root(new_page_id)
        } else {
            let new_max = cells[LEAF_LEFT_SPLIT_COUNT - 1].key();
            {
                let page = self.pager.page_mut(parent)?;
                let mut node = InternalNodeMut::from_page(page)?;
                node.update_key(old_max, new_max)?;
            }
            self.insert_internal(parent, new_page_id)
        }
    }

    /// Promotes a new internal root after the root leaf splits. The old
    /// root's bytes move to a fresh page (the left child) and page 0 is
    /// rewritten as an internal node over both halves.
    fn create_new_root(&mut self, right_child: PageId) -> Result<()> {
        let left_child = self.pager.allocate();

        let root_bytes = self.pager.page(self.root_page)?.to_vec();
        {
            let page = self.pager.page_mut(left_child)?;
            page.copy_from_slice(&root_bytes);
            let header = NodeHeader::from_page_mut(page)?;
            header.set_is_root(false);
            header.set_parent(self.root_page);
        }

        let left_max = self.node_max_key(left_child)?;
        {
            let page = self.pager.page_mut(self.root_page)?;
            let mut root = InternalNodeMut::init(page)?;
            root.set_is_root(true);
            root.write_cell(0, left_max, left_child)?;
            root.set_num_keys(1);
            root.set_right_child(right_child);
        }

        let page = self.pager.page_mut(right_child)?;
        NodeHeader::from_page_mut(page)?.set_parent(self.root_page);
        Ok(())
    }

    /// Registers a freshly split-off child with its parent, keyed by
    /// the child's maximum key. A child beyond the current rightmost
    /// child rotates the old right child into the key array; anything
    /// else is shifted into sorted position.
    fn insert_internal(&mut self, parent_page: PageId, child_page: PageId) -> Result<()> {
        let child_max = self.node_max_key(child_page)?;

        let (num_keys, right_child, index) = {
            let page = self.pager.page(parent_page)?;
            let node = InternalNode::from_page(page)?;
            (node.num_keys(), node.right_child(), node.find_index(child_max)?)
        };

        ensure!(
            (num_keys as usize) < INTERNAL_MAX_CELLS,
            "internal node {} is full ({} keys): splitting internal nodes is not supported",
            parent_page,
            num_keys
        );

        let right_max = self.node_max_key(right_child)?;

        let page = self.pager.page_mut(parent_page)?;
        let mut node = InternalNodeMut::from_page(page)?;
        node.set_num_keys(num_keys + 1);
        if child_max > right_max {
            node.write_cell(num_keys, right_max, right_child)?;
            node.set_right_child(child_page);
        } else {
            node.shift_cells_right(index, num_keys)?;
            node.write_cell(index, child_max, child_page)?;
        }
        Ok(())
    }

    /// Maximum key stored under `page_id`, whatever kind of node it is.
    fn node_max_key(&mut self, page_id: PageId) -> Result<u32> {
        let page = self.pager.page(page_id)?;
        match node_kind(page)? {
            NodeKind::Leaf => LeafNode::from_page(page)?.max_key(),
            NodeKind::Internal => InternalNode::from_page(page)?.max_key(),
        }
    }

    /// Renders the tree for the `.btree` meta command: one line per
    /// node and key, indented two spaces per level.
    pub fn render(&mut self) -> Result<String> {
        let mut out = String::new();
        self.render_node(self.root_page, 0, &mut out)?;
        Ok(out)
    }

    fn render_node(&mut self, page_id: PageId, depth: usize, out: &mut String) -> Result<()> {
        let indent = "  ".repeat(depth);

        let page = self.pager.page(page_id)?;
        match node_kind(page)? {
            NodeKind::Leaf => {
                let leaf = LeafNode::from_page(page)?;
                let mut keys = Vec::with_capacity(leaf.num_cells() as usize);
                for index in 0..leaf.num_cells() {
                    keys.push(leaf.key_at(index)?);
                }

                writeln!(out, "{}- leaf (size {})", indent, keys.len())?;
                for key in keys {
                    writeln!(out, "{}  - {}", indent, key)?;
                }
            }
            NodeKind::Internal => {
                let node = InternalNode::from_page(page)?;
                let mut cells = Vec::with_capacity(node.num_keys() as usize);
                for index in 0..node.num_keys() {
                    let cell = node.cell_at(index)?;
                    cells.push((cell.key(), cell.child()));
                }
                let right_child = node.right_child();

                writeln!(out, "{}- internal (size {})", indent, cells.len())?;
                for (key, child) in cells {
                    self.render_node(child, depth + 1, out)?;
                    writeln!(out, "{}  - key {}", indent, key)?;
                }
                self.render_node(right_child, depth + 1, out)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(id: u32) -> Row {
        Row::new(id, format!("user{}", id), format!("user{}@example.com", id))
    }

    fn open_tree_pager(dir: &tempfile::TempDir) -> Pager {
        let mut pager = Pager::open(dir.path().join("test.db")).unwrap();
        let page = pager.page_mut(0).unwrap();
        let mut leaf = LeafNodeMut::init(page).unwrap();
        leaf.set_is_root(true);
        pager
    }

    fn scan_keys(pager: &mut Pager) -> Vec<u32> {
        let mut tree = BTree::new(pager, 0);
        let mut pos = tree.start().unwrap();
        let mut keys = Vec::new();

        while !pos.end_of_table {
            let page = tree.pager.page(pos.page_id).unwrap();
            let leaf = LeafNode::from_page(page).unwrap();
            keys.push(leaf.key_at(pos.cell_index).unwrap());

            pos.cell_index += 1;
            if pos.cell_index == leaf.num_cells() {
                let next = leaf.next_leaf();
                if next == 0 {
                    pos.end_of_table = true;
                } else {
                    pos.page_id = next;
                    pos.cell_index = 0;
                }
            }
        }

        keys
    }

    #[test]
    fn find_on_empty_tree_is_end_of_table() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);

        let pos = BTree::new(&mut pager, 0).find(5).unwrap();

        assert_eq!(pos.page_id, 0);
        assert_eq!(pos.cell_index, 0);
        assert!(pos.end_of_table);
    }

    #[test]
    fn insert_then_find_lands_on_the_key() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);
        let mut tree = BTree::new(&mut pager, 0);

        tree.insert(&row(3)).unwrap();
        tree.insert(&row(1)).unwrap();

        let pos = tree.find(3).unwrap();
        assert_eq!(pos.cell_index, 1);
        assert!(!pos.end_of_table);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);
        let mut tree = BTree::new(&mut pager, 0);

        assert_eq!(tree.insert(&row(1)).unwrap(), InsertResult::Inserted);
        assert_eq!(tree.insert(&row(1)).unwrap(), InsertResult::DuplicateKey);
    }

    #[test]
    fn duplicate_key_after_split_is_rejected() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);
        let mut tree = BTree::new(&mut pager, 0);

        for id in 1..=(LEAF_MAX_CELLS as u32 + 1) {
            tree.insert(&row(id)).unwrap();
        }

        assert_eq!(tree.insert(&row(3)).unwrap(), InsertResult::DuplicateKey);
        assert_eq!(tree.insert(&row(12)).unwrap(), InsertResult::DuplicateKey);
    }

    #[test]
    fn fourteenth_insert_splits_the_root_leaf() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);

        {
            let mut tree = BTree::new(&mut pager, 0);
            for id in 1..=(LEAF_MAX_CELLS as u32 + 1) {
                tree.insert(&row(id)).unwrap();
            }
        }

        let page = pager.page(0).unwrap();
        let root = InternalNode::from_page(page).unwrap();
        assert!(root.is_root());
        assert_eq!(root.num_keys(), 1);
        assert_eq!(root.key_at(0).unwrap(), LEAF_LEFT_SPLIT_COUNT as u32);

        let left = root.child_at(0).unwrap();
        let right = root.right_child();

        let left_leaf = LeafNode::from_page(pager.page(left).unwrap()).unwrap();
        assert_eq!(left_leaf.num_cells(), LEAF_LEFT_SPLIT_COUNT as u32);
        assert_eq!(left_leaf.next_leaf(), right);
        assert_eq!(left_leaf.parent(), 0);

        let right_leaf = LeafNode::from_page(pager.page(right).unwrap()).unwrap();
        assert_eq!(right_leaf.num_cells(), LEAF_RIGHT_SPLIT_COUNT as u32);
        assert_eq!(right_leaf.next_leaf(), 0);
        assert_eq!(right_leaf.parent(), 0);
    }

    #[test]
    fn ascending_inserts_scan_in_order_across_splits() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);

        {
            let mut tree = BTree::new(&mut pager, 0);
            for id in 1..=50 {
                tree.insert(&row(id)).unwrap();
            }
        }

        assert_eq!(scan_keys(&mut pager), (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn descending_inserts_scan_in_order_across_splits() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);

        {
            let mut tree = BTree::new(&mut pager, 0);
            for id in (1..=50).rev() {
                tree.insert(&row(id)).unwrap();
            }
        }

        assert_eq!(scan_keys(&mut pager), (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn interleaved_inserts_scan_in_order_across_splits() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);

        let mut ids: Vec<u32> = (1..=60).filter(|id| id % 2 == 0).collect();
        ids.extend((1..=60).filter(|id| id % 2 == 1));

        {
            let mut tree = BTree::new(&mut pager, 0);
            for id in ids {
                tree.insert(&row(id)).unwrap();
            }
        }

        assert_eq!(scan_keys(&mut pager), (1..=60).collect::<Vec<_>>());
    }

    #[test]
    fn internal_keys_bound_their_children() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);

        {
            let mut tree = BTree::new(&mut pager, 0);
            for id in 1..=40 {
                tree.insert(&row(id)).unwrap();
            }
        }

        let (cells, right_child) = {
            let root = InternalNode::from_page(pager.page(0).unwrap()).unwrap();
            let mut cells = Vec::new();
            for i in 0..root.num_keys() {
                let cell = root.cell_at(i).unwrap();
                cells.push((cell.key(), cell.child()));
            }
            (cells, root.right_child())
        };

        let mut previous_max = 0;
        for (key, child) in &cells {
            let leaf = LeafNode::from_page(pager.page(*child).unwrap()).unwrap();
            assert_eq!(leaf.max_key().unwrap(), *key);
            assert!(leaf.key_at(0).unwrap() > previous_max);
            previous_max = *key;
        }

        let right = LeafNode::from_page(pager.page(right_child).unwrap()).unwrap();
        assert!(right.key_at(0).unwrap() > previous_max);
    }

    #[test]
    fn sibling_chain_covers_every_leaf_in_key_order() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);

        {
            let mut tree = BTree::new(&mut pager, 0);
            for id in 1..=45 {
                tree.insert(&row(id)).unwrap();
            }
        }

        let first_leaf = BTree::new(&mut pager, 0).start().unwrap().page_id;

        let mut page_id = first_leaf;
        let mut previous_max = 0;
        let mut leaves = 0;
        loop {
            let leaf = LeafNode::from_page(pager.page(page_id).unwrap()).unwrap();
            assert!(leaf.key_at(0).unwrap() > previous_max);
            previous_max = leaf.max_key().unwrap();
            leaves += 1;

            match leaf.next_leaf() {
                0 => break,
                next => page_id = next,
            }
        }

        assert!(leaves > 1);
        assert_eq!(previous_max, 45);
    }

    #[test]
    fn render_shows_root_leaf_keys() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);
        let mut tree = BTree::new(&mut pager, 0);

        for id in [3, 1, 2] {
            tree.insert(&row(id)).unwrap();
        }

        let rendered = tree.render().unwrap();

        assert_eq!(rendered, "- leaf (size 3)\n  - 1\n  - 2\n  - 3\n");
    }

    #[test]
    fn render_shows_two_level_tree() {
        let dir = tempdir().unwrap();
        let mut pager = open_tree_pager(&dir);
        let mut tree = BTree::new(&mut pager, 0);

        for id in 1..=(LEAF_MAX_CELLS as u32 + 1) {
            tree.insert(&row(id)).unwrap();
        }

        let rendered = tree.render().unwrap();

        assert!(rendered.starts_with("- internal (size 1)\n"));
        assert!(rendered.contains("  - leaf (size 7)\n"));
        assert!(rendered.contains("  - key 7\n"));
        assert!(rendered.contains("    - 14\n"));
    }
}
