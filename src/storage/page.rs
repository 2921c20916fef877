//! # Node Kinds and Header Layouts
//!
//! Every page in the file is a B+ tree node and begins with a 6-byte
//! common header, followed by a kind-specific header. This module defines
//! the header structs as `zerocopy` views so node code reads and writes
//! them in place over the page bytes: after a mutating accessor returns,
//! the owning page frame already holds the updated encoding.
//!
//! ## Common Header (6 bytes, prefix of every node)
//!
//! ```text
//! Offset  Size  Field    Description
//! ------  ----  -------  -------------------------------------
//! 0       1     kind     Node kind (0 = internal, 1 = leaf)
//! 1       1     is_root  Non-zero only on page 0
//! 2       4     parent   Parent page id, little-endian
//! ```
//!
//! ## Leaf Header (14 bytes)
//!
//! ```text
//! 0       6     common
//! 6       4     num_cells  Cells stored in this leaf
//! 10      4     next_leaf  Right sibling page id, 0 = none
//! ```
//!
//! ## Internal Header (14 bytes)
//!
//! ```text
//! 0       6     common
//! 6       4     num_keys     Keys (= cells) stored in this node
//! 10      4     right_child  Child covering keys above all cell keys
//! ```
//!
//! All integer fields are little-endian. The structs use
//! `U32<LittleEndian>` so they carry no alignment requirement and no
//! padding, and can be transmuted from any 14-byte prefix of a page.

use eyre::{bail, ensure, Result};
use zerocopy::{
    byteorder::{LittleEndian, U32},
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
};

use crate::config::{COMMON_HEADER_SIZE, PAGE_SIZE};

/// Pages reference each other only by id; id 0 is always the root.
pub type PageId = u32;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Internal = 0x00,
    Leaf = 0x01,
}

impl NodeKind {
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0x00 => Ok(NodeKind::Internal),
            0x01 => Ok(NodeKind::Leaf),
            other => bail!("invalid node kind byte: {:#04x}", other),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct NodeHeader {
    kind: u8,
    is_root: u8,
    parent: U32<LittleEndian>,
}

impl NodeHeader {
    pub fn from_page(data: &[u8]) -> Result<&Self> {
        ensure!(
            data.len() >= COMMON_HEADER_SIZE,
            "buffer too small for NodeHeader: {} < {}",
            data.len(),
            COMMON_HEADER_SIZE
        );

        Self::ref_from_bytes(&data[..COMMON_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read NodeHeader: {:?}", e))
    }

    pub fn from_page_mut(data: &mut [u8]) -> Result<&mut Self> {
        ensure!(
            data.len() >= COMMON_HEADER_SIZE,
            "buffer too small for NodeHeader: {} < {}",
            data.len(),
            COMMON_HEADER_SIZE
        );

        Self::mut_from_bytes(&mut data[..COMMON_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read NodeHeader: {:?}", e))
    }

    pub fn kind(&self) -> Result<NodeKind> {
        NodeKind::from_byte(self.kind)
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind as u8;
    }

    pub fn is_root(&self) -> bool {
        self.is_root != 0
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.is_root = is_root as u8;
    }

    pub fn parent(&self) -> PageId {
        self.parent.get()
    }

    pub fn set_parent(&mut self, page_id: PageId) {
        self.parent = U32::new(page_id);
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct LeafHeader {
    common: NodeHeader,
    num_cells: U32<LittleEndian>,
    next_leaf: U32<LittleEndian>,
}

impl LeafHeader {
    pub fn kind(&self) -> Result<NodeKind> {
        self.common.kind()
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.common.set_kind(kind);
    }

    pub fn is_root(&self) -> bool {
        self.common.is_root()
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.common.set_is_root(is_root);
    }

    pub fn parent(&self) -> PageId {
        self.common.parent()
    }

    pub fn set_parent(&mut self, page_id: PageId) {
        self.common.set_parent(page_id);
    }

    pub fn num_cells(&self) -> u32 {
        self.num_cells.get()
    }

    pub fn set_num_cells(&mut self, count: u32) {
        self.num_cells = U32::new(count);
    }

    /// Right sibling in key order; 0 marks the rightmost leaf.
    pub fn next_leaf(&self) -> PageId {
        self.next_leaf.get()
    }

    pub fn set_next_leaf(&mut self, page_id: PageId) {
        self.next_leaf = U32::new(page_id);
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct InternalHeader {
    common: NodeHeader,
    num_keys: U32<LittleEndian>,
    right_child: U32<LittleEndian>,
}

impl InternalHeader {
    pub fn kind(&self) -> Result<NodeKind> {
        self.common.kind()
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.common.set_kind(kind);
    }

    pub fn is_root(&self) -> bool {
        self.common.is_root()
    }

    pub fn set_is_root(&mut self, is_root: bool) {
        self.common.set_is_root(is_root);
    }

    pub fn parent(&self) -> PageId {
        self.common.parent()
    }

    pub fn set_parent(&mut self, page_id: PageId) {
        self.common.set_parent(page_id);
    }

    pub fn num_keys(&self) -> u32 {
        self.num_keys.get()
    }

    pub fn set_num_keys(&mut self, count: u32) {
        self.num_keys = U32::new(count);
    }

    pub fn right_child(&self) -> PageId {
        self.right_child.get()
    }

    pub fn set_right_child(&mut self, page_id: PageId) {
        self.right_child = U32::new(page_id);
    }
}

/// Reads the node kind from a full page's bytes.
pub fn node_kind(data: &[u8]) -> Result<NodeKind> {
    ensure!(
        data.len() == PAGE_SIZE,
        "invalid page size: {} != {}",
        data.len(),
        PAGE_SIZE
    );
    NodeHeader::from_page(data)?.kind()
}
