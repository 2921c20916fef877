//! # B+ Tree Leaf Node Views
//!
//! Leaf nodes hold the actual rows. This module provides typed views
//! over a leaf page's bytes; all reads and writes go straight through
//! to the underlying frame, so a completed mutation is already encoded
//! in the owning page.
//!
//! ## Page Layout
//!
//! ```text
//! Offset  Size  Content
//! ------  ----  -----------------------------------------
//! 0       14    Leaf header (common header ‖ num_cells ‖ next_leaf)
//! 14      297   Cell 0: key (4, LE) ‖ row (293)
//! 311     297   Cell 1
//! ...
//! 3875    297   Cell 12
//! 3876..  220   Unused tail
//! ```
//!
//! Cells are packed, fixed-size, and kept sorted by key. A leaf holds at
//! most [`LEAF_MAX_CELLS`] cells; the tree layer splits it when the next
//! insert would overflow.
//!
//! ## View Pair
//!
//! [`LeafNode`] borrows `&[u8]` for reads; [`LeafNodeMut`] borrows
//! `&mut [u8]` for mutation. `from_page` validates the page size and
//! node kind; `init` stamps a fresh empty leaf over whatever bytes the
//! frame held before.
//!
//! ## Search
//!
//! `find_slot` binary-searches the sorted keys and returns the smallest
//! index whose key is >= the target: the cell index for an exact match,
//! or the insertion point (possibly `num_cells`) otherwise.

use eyre::{ensure, Result};
use zerocopy::{
    byteorder::{LittleEndian, U32},
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
};

use crate::config::{LEAF_CELL_SIZE, LEAF_HEADER_SIZE, LEAF_MAX_CELLS, PAGE_SIZE, ROW_SIZE};
use crate::record::Row;
use crate::storage::{LeafHeader, NodeKind, PageId};

/// One leaf cell: the key and the serialized row it owns.
#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct LeafCell {
    key: U32<LittleEndian>,
    row: [u8; ROW_SIZE],
}

impl LeafCell {
    pub fn new(key: u32, row: &Row) -> Self {
        let mut cell = Self {
            key: U32::new(key),
            row: [0u8; ROW_SIZE],
        };
        row.encode_into(&mut cell.row);
        cell
    }

    pub fn key(&self) -> u32 {
        self.key.get()
    }

    pub fn row(&self) -> Row {
        Row::decode(&self.row)
    }
}

#[derive(Debug)]
pub struct LeafNode<'a> {
    data: &'a [u8],
}

pub struct LeafNodeMut<'a> {
    data: &'a mut [u8],
}

fn cell_offset(index: u32) -> usize {
    LEAF_HEADER_SIZE + index as usize * LEAF_CELL_SIZE
}

impl<'a> LeafNode<'a> {
    pub fn from_page(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = LeafHeader::ref_from_bytes(&data[..LEAF_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read LeafHeader: {:?}", e))?;
        ensure!(
            header.kind()? == NodeKind::Leaf,
            "expected leaf node, got {:?}",
            header.kind()?
        );
        Ok(Self { data })
    }

    fn header(&self) -> &LeafHeader {
        // INVARIANT: page length validated in from_page
        LeafHeader::ref_from_bytes(&self.data[..LEAF_HEADER_SIZE]).unwrap()
    }

    pub fn num_cells(&self) -> u32 {
        self.header().num_cells()
    }

    pub fn next_leaf(&self) -> PageId {
        self.header().next_leaf()
    }

    pub fn is_root(&self) -> bool {
        self.header().is_root()
    }

    pub fn parent(&self) -> PageId {
        self.header().parent()
    }

    pub fn cell_at(&self, index: u32) -> Result<&'a LeafCell> {
        ensure!(
            index < self.num_cells(),
            "cell index {} out of bounds (num_cells={})",
            index,
            self.num_cells()
        );
        let offset = cell_offset(index);
        LeafCell::ref_from_bytes(&self.data[offset..offset + LEAF_CELL_SIZE])
            .map_err(|e| eyre::eyre!("failed to read leaf cell {}: {:?}", index, e))
    }

    pub fn key_at(&self, index: u32) -> Result<u32> {
        self.cell_at(index).map(LeafCell::key)
    }

    pub fn row_at(&self, index: u32) -> Result<Row> {
        self.cell_at(index).map(|cell| cell.row())
    }

    /// Key of the last cell. Leaves reachable from an internal node are
    /// never empty, so this only fails on a corrupt page.
    pub fn max_key(&self) -> Result<u32> {
        ensure!(self.num_cells() > 0, "max_key of an empty leaf");
        self.key_at(self.num_cells() - 1)
    }

    /// Smallest index whose key is >= `key`, or `num_cells` if every
    /// key is smaller.
    pub fn find_slot(&self, key: u32) -> Result<u32> {
        let mut left = 0u32;
        let mut right = self.num_cells();

        while left < right {
            let mid = left + (right - left) / 2;
            if self.key_at(mid)? >= key {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        Ok(left)
    }
}

impl<'a> LeafNodeMut<'a> {
    pub fn from_page(data: &'a mut [u8]) -> Result<Self> {
        LeafNode::from_page(data)?;
        Ok(Self { data })
    }

    /// Stamps a fresh empty leaf over the page: not root, no parent, no
    /// cells, no sibling.
    pub fn init(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );

        let header = LeafHeader::mut_from_bytes(&mut data[..LEAF_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read LeafHeader: {:?}", e))?;
        header.set_kind(NodeKind::Leaf);
        header.set_is_root(false);
        header.set_parent(0);
        header.set_num_cells(0);
        header.set_next_leaf(0);

        Ok(Self { data })
    }

    pub fn as_ref(&self) -> LeafNode<'_> {
        LeafNode { data: self.data }
    }

    fn header_mut(&mut self) -> &mut LeafHeader {
        // INVARIANT: page length validated in from_page/init
        LeafHeader::mut_from_bytes(&mut self.data[..LEAF_HEADER_SIZE]).unwrap()
    }

    pub fn num_cells(&self) -> u32 {
        self.as_ref().num_cells()
    }

    pub fn next_leaf(&self) -> PageId {
        self.as_ref().next_leaf()
    }

    pub fn is_root(&self) -> bool {
        self.as_ref().is_root()
    }

    pub fn parent(&self) -> PageId {
        self.as_ref().parent()
    }

    pub fn max_key(&self) -> Result<u32> {
        self.as_ref().max_key()
    }

    pub fn find_slot(&self, key: u32) -> Result<u32> {
        self.as_ref().find_slot(key)
    }

    pub fn key_at(&self, index: u32) -> Result<u32> {
        self.as_ref().key_at(index)
    }

    pub fn row_at(&self, index: u32) -> Result<Row> {
        self.as_ref().row_at(index)
    }

    pub fn set_num_cells(&mut self, count: u32) {
        self.header_mut().set_num_cells(count);
    }

    pub fn set_next_leaf(&mut self, page_id: PageId) {
        self.header_mut().set_next_leaf(page_id);
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.header_mut().set_is_root(is_root);
    }

    pub fn set_parent(&mut self, page_id: PageId) {
        self.header_mut().set_parent(page_id);
    }

    /// Overwrites the cell slot at `index` without touching the count.
    /// The slot must lie within the leaf's capacity.
    pub fn write_cell(&mut self, index: u32, cell: &LeafCell) -> Result<()> {
        ensure!(
            (index as usize) < LEAF_MAX_CELLS,
            "cell index {} exceeds leaf capacity {}",
            index,
            LEAF_MAX_CELLS
        );
        let offset = cell_offset(index);
        self.data[offset..offset + LEAF_CELL_SIZE].copy_from_slice(cell.as_bytes());
        Ok(())
    }

    /// Inserts `(key, row)` at `index`, shifting later cells right. The
    /// caller has already established that the leaf has room and that
    /// `index` is the sorted position for `key`.
    pub fn insert_at(&mut self, index: u32, key: u32, row: &Row) -> Result<()> {
        let num_cells = self.num_cells();
        ensure!(
            (num_cells as usize) < LEAF_MAX_CELLS,
            "insert into full leaf ({} cells)",
            num_cells
        );
        ensure!(
            index <= num_cells,
            "insert index {} out of bounds (num_cells={})",
            index,
            num_cells
        );

        if index < num_cells {
            let src_start = cell_offset(index);
            let src_end = cell_offset(num_cells);
            self.data
                .copy_within(src_start..src_end, src_start + LEAF_CELL_SIZE);
        }

        self.write_cell(index, &LeafCell::new(key, row))?;
        self.set_num_cells(num_cells + 1);
        Ok(())
    }
}
