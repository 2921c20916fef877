//! # Table Facade
//!
//! The public face of the storage engine: one fixed-schema table backed
//! by a single file. The table owns the [`Pager`] and the root page id,
//! and routes every operation through the B+ tree.
//!
//! ## Lifecycle
//!
//! `open` creates the file on first use and stamps page 0 as an empty
//! leaf marked as root. From then on page 0 is always the root; root
//! promotion rewrites it in place rather than moving it. `close`
//! flushes the page cache; changes are durable only across a clean
//! close.
//!
//! ## Cursors
//!
//! A [`Cursor`] is a lightweight position (leaf page, cell index, end
//! flag) borrowing the table. It supports reading the current row and
//! advancing across the leaf chain. Structural changes (splits) between
//! obtaining a cursor and using it may invalidate it; callers re-find
//! instead of holding cursors across inserts.

use std::path::Path;

use eyre::{Result, WrapErr};

use crate::btree::{BTree, CursorPos, InsertResult, LeafNode, LeafNodeMut};
use crate::record::Row;
use crate::storage::{PageId, Pager};

pub struct Table {
    pager: Pager,
    root_page_num: PageId,
}

impl Table {
    /// Opens the database file at `path`, initializing a fresh root
    /// leaf if the file is empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut pager =
            Pager::open(path).wrap_err_with(|| format!("failed to open table '{}'", path.display()))?;

        if pager.num_pages() == 0 {
            let page = pager.page_mut(0)?;
            let mut root = LeafNodeMut::init(page)?;
            root.set_is_root(true);
        }

        Ok(Self {
            pager,
            root_page_num: 0,
        })
    }

    /// Position of `key` (or its insertion point) as a cursor.
    pub fn find(&mut self, key: u32) -> Result<Cursor<'_>> {
        let pos = BTree::new(&mut self.pager, self.root_page_num).find(key)?;
        Ok(Cursor { table: self, pos })
    }

    /// Cursor at the smallest key in the table.
    pub fn start(&mut self) -> Result<Cursor<'_>> {
        let pos = BTree::new(&mut self.pager, self.root_page_num).start()?;
        Ok(Cursor { table: self, pos })
    }

    /// Inserts a row keyed by its id.
    pub fn insert(&mut self, row: &Row) -> Result<InsertResult> {
        BTree::new(&mut self.pager, self.root_page_num).insert(row)
    }

    /// Every row in ascending id order.
    pub fn select_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        let mut cursor = self.start()?;

        while !cursor.end_of_table() {
            rows.push(cursor.value()?);
            cursor.advance()?;
        }

        Ok(rows)
    }

    /// Renders the tree for the `.btree` meta command.
    pub fn render_tree(&mut self) -> Result<String> {
        BTree::new(&mut self.pager, self.root_page_num).render()
    }

    /// Flushes every cached page and closes the file.
    pub fn close(self) -> Result<()> {
        self.pager.close()
    }
}

/// A position within the table, coupled to it for its lifetime.
pub struct Cursor<'a> {
    table: &'a mut Table,
    pos: CursorPos,
}

impl Cursor<'_> {
    pub fn end_of_table(&self) -> bool {
        self.pos.end_of_table
    }

    /// The row under the cursor.
    pub fn value(&mut self) -> Result<Row> {
        let page = self.table.pager.page(self.pos.page_id)?;
        LeafNode::from_page(page)?.row_at(self.pos.cell_index)
    }

    /// Moves to the next cell, following the sibling chain across leaf
    /// boundaries and raising the end flag on the last leaf.
    pub fn advance(&mut self) -> Result<()> {
        let page = self.table.pager.page(self.pos.page_id)?;
        let leaf = LeafNode::from_page(page)?;

        self.pos.cell_index += 1;
        if self.pos.cell_index >= leaf.num_cells() {
            match leaf.next_leaf() {
                0 => self.pos.end_of_table = true,
                next => {
                    self.pos.page_id = next;
                    self.pos.cell_index = 0;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LEAF_MAX_CELLS;
    use tempfile::tempdir;

    fn row(id: u32) -> Row {
        Row::new(id, format!("user{}", id), format!("user{}@example.com", id))
    }

    #[test]
    fn open_initializes_an_empty_root_leaf() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        assert!(table.select_all().unwrap().is_empty());
        assert_eq!(table.render_tree().unwrap(), "- leaf (size 0)\n");
    }

    #[test]
    fn insert_and_select_one_row() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        let inserted = table.insert(&Row::new(1, "test", "test@email.com")).unwrap();
        assert_eq!(inserted, InsertResult::Inserted);

        let rows = table.select_all().unwrap();
        assert_eq!(rows, vec![Row::new(1, "test", "test@email.com")]);
    }

    #[test]
    fn select_returns_rows_in_key_order() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        for id in [3, 1, 2] {
            table.insert(&row(id)).unwrap();
        }

        let ids: Vec<u32> = table.select_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_insert_leaves_table_unchanged() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        table.insert(&row(1)).unwrap();
        let second = table.insert(&Row::new(1, "other", "other@email.com")).unwrap();

        assert_eq!(second, InsertResult::DuplicateKey);

        let rows = table.select_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], row(1));
    }

    #[test]
    fn fourteen_rows_split_into_two_chained_leaves() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        for id in 1..=(LEAF_MAX_CELLS as u32 + 1) {
            table.insert(&row(id)).unwrap();
        }

        let ids: Vec<u32> = table.select_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=14).collect::<Vec<_>>());

        let rendered = table.render_tree().unwrap();
        assert!(rendered.starts_with("- internal (size 1)\n"));
    }

    #[test]
    fn rows_survive_close_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut table = Table::open(&path).unwrap();
            table.insert(&Row::new(1, "test", "test@email.com")).unwrap();
            table.close().unwrap();
        }

        for _ in 0..10 {
            let mut table = Table::open(&path).unwrap();
            let rows = table.select_all().unwrap();
            assert_eq!(rows, vec![Row::new(1, "test", "test@email.com")]);
            table.close().unwrap();
        }
    }

    #[test]
    fn multi_leaf_table_survives_close_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut table = Table::open(&path).unwrap();
            for id in (1..=40).rev() {
                table.insert(&row(id)).unwrap();
            }
            table.close().unwrap();
        }

        let mut table = Table::open(&path).unwrap();
        let ids: Vec<u32> = table.select_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=40).collect::<Vec<_>>());
    }

    #[test]
    fn cursor_walks_rows_one_at_a_time() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        for id in 1..=3 {
            table.insert(&row(id)).unwrap();
        }

        let mut cursor = table.start().unwrap();
        let mut seen = Vec::new();
        while !cursor.end_of_table() {
            seen.push(cursor.value().unwrap().id);
            cursor.advance().unwrap();
        }

        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn find_positions_cursor_on_existing_key() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        for id in [10, 20, 30] {
            table.insert(&row(id)).unwrap();
        }

        let mut cursor = table.find(20).unwrap();
        assert_eq!(cursor.value().unwrap().id, 20);
    }
}
