//! Field accessors that interpret a page as a B-tree node.
//!
//! Accessors never check the node type or the stored counts. The table
//! validates both once per node visit, so counts read from disk are known
//! to fit the layout before any cell is indexed here.

use super::layout::*;
use super::PageBuf;
use crate::types::{NodeType, PageId};

impl PageBuf {
    /// Raw node type byte
    pub fn node_type_byte(&self) -> u8 {
        self.data[NODE_TYPE_OFFSET]
    }

    /// Node type, or `None` if the type byte is unrecognized
    pub fn node_type(&self) -> Option<NodeType> {
        NodeType::from_byte(self.node_type_byte())
    }

    pub fn set_node_type(&mut self, node_type: NodeType) {
        self.data[NODE_TYPE_OFFSET] = node_type as u8;
    }

    pub fn is_root(&self) -> bool {
        self.data[IS_ROOT_OFFSET] != 0
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.data[IS_ROOT_OFFSET] = u8::from(is_root);
    }

    pub fn parent(&self) -> PageId {
        PageId::new(self.read_u32(PARENT_POINTER_OFFSET))
    }

    pub fn set_parent(&mut self, parent: PageId) {
        self.write_u32(PARENT_POINTER_OFFSET, parent.value());
    }

    /// Turn this page into an empty, non-root leaf
    pub fn initialize_leaf(&mut self) {
        self.set_node_type(NodeType::Leaf);
        self.set_root(false);
        self.set_leaf_cell_count(0);
        self.set_leaf_next_leaf(None);
    }

    /// Turn this page into an empty, non-root internal node
    pub fn initialize_internal(&mut self) {
        self.set_node_type(NodeType::Internal);
        self.set_root(false);
        self.set_internal_key_count(0);
    }

    // Leaf nodes

    pub fn leaf_cell_count(&self) -> usize {
        self.read_u32(LEAF_NODE_NUM_CELLS_OFFSET) as usize
    }

    pub fn set_leaf_cell_count(&mut self, count: usize) {
        self.write_u32(LEAF_NODE_NUM_CELLS_OFFSET, count as u32);
    }

    /// Right sibling of this leaf, if any
    pub fn leaf_next_leaf(&self) -> Option<PageId> {
        match self.read_u32(LEAF_NODE_NEXT_LEAF_OFFSET) {
            0 => None,
            page => Some(PageId::new(page)),
        }
    }

    pub fn set_leaf_next_leaf(&mut self, next: Option<PageId>) {
        let raw = next.map_or(0, PageId::value);
        self.write_u32(LEAF_NODE_NEXT_LEAF_OFFSET, raw);
    }

    fn leaf_cell_offset(cell_num: usize) -> usize {
        debug_assert!(cell_num < LEAF_NODE_MAX_CELLS);
        LEAF_NODE_HEADER_SIZE + cell_num * LEAF_NODE_CELL_SIZE
    }

    /// Whole cell (key followed by row bytes)
    pub fn leaf_cell(&self, cell_num: usize) -> &[u8] {
        let offset = Self::leaf_cell_offset(cell_num);
        &self.data[offset..offset + LEAF_NODE_CELL_SIZE]
    }

    pub fn leaf_cell_mut(&mut self, cell_num: usize) -> &mut [u8] {
        let offset = Self::leaf_cell_offset(cell_num);
        &mut self.data[offset..offset + LEAF_NODE_CELL_SIZE]
    }

    pub fn leaf_key(&self, cell_num: usize) -> u32 {
        self.read_u32(Self::leaf_cell_offset(cell_num) + LEAF_NODE_KEY_OFFSET)
    }

    pub fn set_leaf_key(&mut self, cell_num: usize, key: u32) {
        self.write_u32(Self::leaf_cell_offset(cell_num) + LEAF_NODE_KEY_OFFSET, key);
    }

    /// Serialized row stored in a cell
    pub fn leaf_value(&self, cell_num: usize) -> &[u8] {
        let offset = Self::leaf_cell_offset(cell_num) + LEAF_NODE_VALUE_OFFSET;
        &self.data[offset..offset + LEAF_NODE_VALUE_SIZE]
    }

    pub fn leaf_value_mut(&mut self, cell_num: usize) -> &mut [u8] {
        let offset = Self::leaf_cell_offset(cell_num) + LEAF_NODE_VALUE_OFFSET;
        &mut self.data[offset..offset + LEAF_NODE_VALUE_SIZE]
    }

    /// Move cells `[from, count)` one slot to the right, opening a gap at `from`
    pub fn leaf_shift_cells_right(&mut self, from: usize, count: usize) {
        if from >= count {
            return;
        }
        let start = Self::leaf_cell_offset(from);
        let end = LEAF_NODE_HEADER_SIZE + count * LEAF_NODE_CELL_SIZE;
        self.data.copy_within(start..end, start + LEAF_NODE_CELL_SIZE);
    }

    // Internal nodes

    pub fn internal_key_count(&self) -> usize {
        self.read_u32(INTERNAL_NODE_NUM_KEYS_OFFSET) as usize
    }

    pub fn set_internal_key_count(&mut self, count: usize) {
        self.write_u32(INTERNAL_NODE_NUM_KEYS_OFFSET, count as u32);
    }

    pub fn internal_right_child(&self) -> PageId {
        PageId::new(self.read_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET))
    }

    pub fn set_internal_right_child(&mut self, child: PageId) {
        self.write_u32(INTERNAL_NODE_RIGHT_CHILD_OFFSET, child.value());
    }

    fn internal_cell_offset(cell_num: usize) -> usize {
        debug_assert!(cell_num < INTERNAL_NODE_MAX_CELLS);
        INTERNAL_NODE_HEADER_SIZE + cell_num * INTERNAL_NODE_CELL_SIZE
    }

    /// Child stored in cell `cell_num` (not the right child)
    pub fn internal_cell_child(&self, cell_num: usize) -> PageId {
        PageId::new(self.read_u32(Self::internal_cell_offset(cell_num)))
    }

    pub fn set_internal_cell_child(&mut self, cell_num: usize, child: PageId) {
        self.write_u32(Self::internal_cell_offset(cell_num), child.value());
    }

    pub fn internal_key(&self, key_num: usize) -> u32 {
        self.read_u32(Self::internal_cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE)
    }

    pub fn set_internal_key(&mut self, key_num: usize, key: u32) {
        self.write_u32(Self::internal_cell_offset(key_num) + INTERNAL_NODE_CHILD_SIZE, key);
    }

    /// Child `child_num`, where `child_num == key_count` means the right child
    pub fn internal_child(&self, child_num: usize) -> PageId {
        if child_num == self.internal_key_count() {
            self.internal_right_child()
        } else {
            self.internal_cell_child(child_num)
        }
    }

    /// All `key_count + 1` children, left to right
    pub fn internal_children(&self) -> Vec<PageId> {
        (0..=self.internal_key_count())
            .map(|i| self.internal_child(i))
            .collect()
    }

    /// Move cells `[from, count)` one slot to the right, opening a gap at `from`
    pub fn internal_shift_cells_right(&mut self, from: usize, count: usize) {
        if from >= count {
            return;
        }
        let start = Self::internal_cell_offset(from);
        let end = INTERNAL_NODE_HEADER_SIZE + count * INTERNAL_NODE_CELL_SIZE;
        self.data.copy_within(start..end, start + INTERNAL_NODE_CELL_SIZE);
    }

    /// First index whose key is `>= key`, or `key_count` when every key is smaller
    pub fn internal_find_child_index(&self, key: u32) -> usize {
        let mut min = 0;
        let mut max = self.internal_key_count();
        while min != max {
            let index = min + (max - min) / 2;
            if self.internal_key(index) >= key {
                max = index;
            } else {
                min = index + 1;
            }
        }
        min
    }

    /// Lower-bound position of `key` among this leaf's cells
    pub fn leaf_find_index(&self, key: u32) -> usize {
        let mut min = 0;
        let mut max = self.leaf_cell_count();
        while min != max {
            let index = min + (max - min) / 2;
            if self.leaf_key(index) >= key {
                max = index;
            } else {
                min = index + 1;
            }
        }
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_leaf() {
        let mut page = PageBuf::new();
        page.as_bytes_mut().fill(0xAB);
        page.initialize_leaf();

        assert_eq!(page.node_type(), Some(NodeType::Leaf));
        assert!(!page.is_root());
        assert_eq!(page.leaf_cell_count(), 0);
        assert_eq!(page.leaf_next_leaf(), None);
    }

    #[test]
    fn test_header_bytes() {
        let mut page = PageBuf::new();
        page.initialize_internal();
        page.set_root(true);
        page.set_parent(PageId::new(0x0A0B_0C0D));
        page.set_internal_right_child(PageId::new(9));

        assert_eq!(page[0], 0);
        assert_eq!(page[1], 1);
        assert_eq!(&page[2..6], &[0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(&page[10..14], &[9, 0, 0, 0]);
        assert_eq!(page.parent(), PageId::new(0x0A0B_0C0D));
    }

    #[test]
    fn test_unknown_node_type() {
        let mut page = PageBuf::new();
        page[NODE_TYPE_OFFSET] = 7;
        assert_eq!(page.node_type(), None);
        assert_eq!(page.node_type_byte(), 7);
    }

    #[test]
    fn test_leaf_binary_search() {
        let mut page = PageBuf::new();
        page.initialize_leaf();
        for (i, key) in [10, 20, 30].into_iter().enumerate() {
            page.set_leaf_key(i, key);
        }
        page.set_leaf_cell_count(3);

        assert_eq!(page.leaf_find_index(5), 0);
        assert_eq!(page.leaf_find_index(10), 0);
        assert_eq!(page.leaf_find_index(25), 2);
        assert_eq!(page.leaf_find_index(30), 2);
        assert_eq!(page.leaf_find_index(31), 3);
    }

    #[test]
    fn test_leaf_shift_cells_right() {
        let mut page = PageBuf::new();
        page.initialize_leaf();
        page.set_leaf_key(0, 1);
        page.set_leaf_key(1, 3);
        page.leaf_value_mut(1)[0] = 0xEE;
        page.set_leaf_cell_count(2);

        page.leaf_shift_cells_right(1, 2);
        page.set_leaf_key(1, 2);
        page.set_leaf_cell_count(3);

        assert_eq!(page.leaf_key(0), 1);
        assert_eq!(page.leaf_key(1), 2);
        assert_eq!(page.leaf_key(2), 3);
        assert_eq!(page.leaf_value(2)[0], 0xEE);
    }

    #[test]
    fn test_internal_children_and_search() {
        let mut page = PageBuf::new();
        page.initialize_internal();
        page.set_internal_cell_child(0, PageId::new(4));
        page.set_internal_key(0, 10);
        page.set_internal_cell_child(1, PageId::new(5));
        page.set_internal_key(1, 20);
        page.set_internal_key_count(2);
        page.set_internal_right_child(PageId::new(6));

        assert_eq!(
            page.internal_children(),
            vec![PageId::new(4), PageId::new(5), PageId::new(6)]
        );
        assert_eq!(page.internal_find_child_index(1), 0);
        assert_eq!(page.internal_find_child_index(10), 0);
        assert_eq!(page.internal_find_child_index(11), 1);
        assert_eq!(page.internal_find_child_index(21), 2);
        assert_eq!(page.internal_child(2), PageId::new(6));
    }
}
