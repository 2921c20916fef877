//! # B+ Tree Internal Node Views
//!
//! Internal nodes route searches: each cell pairs a key with the child
//! page that holds it, and a separate right-child pointer covers keys
//! greater than every cell key.
//!
//! ## Page Layout
//!
//! ```text
//! Offset  Size  Content
//! ------  ----  ---------------------------------------------
//! 0       14    Internal header (common ‖ num_keys ‖ right_child)
//! 14      8     Cell 0: key (4, LE) ‖ child page id (4, LE)
//! 22      8     Cell 1
//! ...
//! ```
//!
//! ## Navigation Semantics
//!
//! Cell key `i` is the **maximum** key reachable through child `i`:
//!
//! - key <= cell[0].key          → cell[0].child
//! - cell[i-1].key < key <= cell[i].key → cell[i].child
//! - key > cell[N-1].key         → right_child
//!
//! `find_index` returns the smallest cell index whose key is >= the
//! target, or `num_keys` to select the right-child branch; `child_at`
//! accepts that sentinel index directly.

use eyre::{ensure, Result};
use zerocopy::{
    byteorder::{LittleEndian, U32},
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
};

use crate::config::{INTERNAL_CELL_SIZE, INTERNAL_HEADER_SIZE, INTERNAL_MAX_CELLS, PAGE_SIZE};
use crate::storage::{InternalHeader, NodeKind, PageId};

/// One internal cell: a key and the page id of the child it bounds.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct InternalCell {
    key: U32<LittleEndian>,
    child: U32<LittleEndian>,
}

impl InternalCell {
    pub fn new(key: u32, child: PageId) -> Self {
        Self {
            key: U32::new(key),
            child: U32::new(child),
        }
    }

    pub fn key(&self) -> u32 {
        self.key.get()
    }

    pub fn child(&self) -> PageId {
        self.child.get()
    }
}

#[derive(Debug)]
pub struct InternalNode<'a> {
    data: &'a [u8],
}

pub struct InternalNodeMut<'a> {
    data: &'a mut [u8],
}

fn cell_offset(index: u32) -> usize {
    INTERNAL_HEADER_SIZE + index as usize * INTERNAL_CELL_SIZE
}

impl<'a> InternalNode<'a> {
    pub fn from_page(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = InternalHeader::ref_from_bytes(&data[..INTERNAL_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read InternalHeader: {:?}", e))?;
        ensure!(
            header.kind()? == NodeKind::Internal,
            "expected internal node, got {:?}",
            header.kind()?
        );
        Ok(Self { data })
    }

    fn header(&self) -> &InternalHeader {
        // INVARIANT: page length validated in from_page
        InternalHeader::ref_from_bytes(&self.data[..INTERNAL_HEADER_SIZE]).unwrap()
    }

    pub fn num_keys(&self) -> u32 {
        self.header().num_keys()
    }

    pub fn right_child(&self) -> PageId {
        self.header().right_child()
    }

    pub fn is_root(&self) -> bool {
        self.header().is_root()
    }

    pub fn parent(&self) -> PageId {
        self.header().parent()
    }

    pub fn cell_at(&self, index: u32) -> Result<&'a InternalCell> {
        ensure!(
            index < self.num_keys(),
            "cell index {} out of bounds (num_keys={})",
            index,
            self.num_keys()
        );
        let offset = cell_offset(index);
        InternalCell::ref_from_bytes(&self.data[offset..offset + INTERNAL_CELL_SIZE])
            .map_err(|e| eyre::eyre!("failed to read internal cell {}: {:?}", index, e))
    }

    pub fn key_at(&self, index: u32) -> Result<u32> {
        self.cell_at(index).map(InternalCell::key)
    }

    /// Child at `index`; `index == num_keys` selects the right child.
    pub fn child_at(&self, index: u32) -> Result<PageId> {
        if index == self.num_keys() {
            Ok(self.right_child())
        } else {
            self.cell_at(index).map(InternalCell::child)
        }
    }

    /// Key of the last cell. Internal nodes always carry at least one
    /// key, so this only fails on a corrupt page.
    pub fn max_key(&self) -> Result<u32> {
        ensure!(self.num_keys() > 0, "max_key of an empty internal node");
        self.key_at(self.num_keys() - 1)
    }

    /// Smallest cell index whose key is >= `key`, or `num_keys` for the
    /// right-child branch.
    pub fn find_index(&self, key: u32) -> Result<u32> {
        let mut left = 0u32;
        let mut right = self.num_keys();

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

impl<'a> InternalNodeMut<'a> {
    pub fn from_page(data: &'a mut [u8]) -> Result<Self> {
        InternalNode::from_page(data)?;
        Ok(Self { data })
    }

    /// Stamps a fresh empty internal node over the page.
    pub fn init(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );

        let header = InternalHeader::mut_from_bytes(&mut data[..INTERNAL_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read InternalHeader: {:?}", e))?;
        header.set_kind(NodeKind::Internal);
        header.set_is_root(false);
        header.set_parent(0);
        header.set_num_keys(0);
        header.set_right_child(0);

        Ok(Self { data })
    }

    pub fn as_ref(&self) -> InternalNode<'_> {
        InternalNode { data: self.data }
    }

    fn header_mut(&mut self) -> &mut InternalHeader {
        // INVARIANT: page length validated in from_page/init
        InternalHeader::mut_from_bytes(&mut self.data[..INTERNAL_HEADER_SIZE]).unwrap()
    }

    pub fn num_keys(&self) -> u32 {
        self.as_ref().num_keys()
    }

    pub fn right_child(&self) -> PageId {
        self.as_ref().right_child()
    }

    pub fn key_at(&self, index: u32) -> Result<u32> {
        self.as_ref().key_at(index)
    }

    pub fn child_at(&self, index: u32) -> Result<PageId> {
        self.as_ref().child_at(index)
    }

    pub fn find_index(&self, key: u32) -> Result<u32> {
        self.as_ref().find_index(key)
    }

    pub fn set_num_keys(&mut self, count: u32) {
        self.header_mut().set_num_keys(count);
    }

    pub fn set_right_child(&mut self, page_id: PageId) {
        self.header_mut().set_right_child(page_id);
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.header_mut().set_is_root(is_root);
    }

    pub fn set_parent(&mut self, page_id: PageId) {
        self.header_mut().set_parent(page_id);
    }

    /// Overwrites the cell slot at `index` without touching the count.
    pub fn write_cell(&mut self, index: u32, key: u32, child: PageId) -> Result<()> {
        ensure!(
            (index as usize) < INTERNAL_MAX_CELLS,
            "cell index {} exceeds internal capacity {}",
            index,
            INTERNAL_MAX_CELLS
        );
        let offset = cell_offset(index);
        let cell = InternalCell::new(key, child);
        self.data[offset..offset + INTERNAL_CELL_SIZE].copy_from_slice(cell.as_bytes());
        Ok(())
    }

    /// Shifts cells `[index, end)` one slot to the right, opening a hole
    /// at `index`.
    pub fn shift_cells_right(&mut self, index: u32, end: u32) -> Result<()> {
        ensure!(
            (end as usize) < INTERNAL_MAX_CELLS,
            "shift past internal capacity {}",
            INTERNAL_MAX_CELLS
        );
        ensure!(index <= end, "shift range inverted: {} > {}", index, end);

        if index < end {
            let src_start = cell_offset(index);
            let src_end = cell_offset(end);
            self.data
                .copy_within(src_start..src_end, src_start + INTERNAL_CELL_SIZE);
        }
        Ok(())
    }

    /// Replaces the key bounding `old_key`'s child with `new_key`. A
    /// miss means the key lives under the right-child branch, which is
    /// not keyed; the node is left unchanged.
    pub fn update_key(&mut self, old_key: u32, new_key: u32) -> Result<()> {
        let index = self.find_index(old_key)?;
        if index < self.num_keys() && self.key_at(index)? == old_key {
            let child = self.child_at(index)?;
            self.write_cell(index, new_key, child)?;
        }
        Ok(())
    }
}
