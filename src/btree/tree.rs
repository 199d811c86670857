//! B-tree engine: descent, insertion, node splits and root promotion.
//!
//! Internal nodes store, for every child but the last, the maximum key of
//! that child's subtree. The right child's maximum is never stored, so
//! [`Table::node_max_key`] walks right children down to a leaf.
//!
//! All operations address nodes by page number and re-fetch a page from
//! the pager right before touching it; no page reference is held across a
//! call that may allocate.

use crate::btree::Table;
use crate::error::{Result, StorageError};
use crate::page::layout::{
    INTERNAL_NODE_MAX_CELLS, LEAF_NODE_CELL_SIZE, LEAF_NODE_KEY_SIZE, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_VALUE_OFFSET,
};
use crate::page::PageBuf;
use crate::row::Row;
use crate::types::{NodeType, PageId};
use crate::TreeNode;
use std::fmt::Write;
use tracing::{debug, warn};

impl Table {
    /// Read and validate the node header of a page.
    ///
    /// Every node is checked here before its cells are indexed: the type
    /// byte must be known and the cell count must fit the page layout.
    pub(crate) fn node_type(&mut self, page_id: PageId) -> Result<NodeType> {
        let page = self.pager.fetch_page(page_id)?;
        let node_type = match page.node_type() {
            Some(node_type) => node_type,
            None => {
                return Err(StorageError::InvalidNodeType {
                    page_id,
                    byte: page.node_type_byte(),
                })
            }
        };

        let (count, max) = match node_type {
            NodeType::Leaf => (page.leaf_cell_count(), LEAF_NODE_MAX_CELLS),
            NodeType::Internal => (page.internal_key_count(), INTERNAL_NODE_MAX_CELLS),
        };
        if count > max {
            return Err(StorageError::NodeOverflow { page_id, count, max });
        }
        Ok(node_type)
    }

    /// Fail before any mutation if an ancestor of `leaf_id` holds more keys
    /// than the configured internal capacity.
    ///
    /// A split cascade cannot be undone halfway, so a file written with
    /// larger limits than the current ones is rejected up front.
    pub(crate) fn check_path_capacity(&mut self, leaf_id: PageId) -> Result<()> {
        let max = self.config.max_internal_keys;
        let mut node = leaf_id;
        // A well-formed path is never longer than the table.
        for _ in 0..self.pager.page_count() {
            if node == self.root_page {
                return Ok(());
            }
            let parent = self.pager.fetch_page(node)?.parent();
            self.node_type(parent)?;
            let count = self.pager.fetch_page(parent)?.internal_key_count();
            if count > max {
                return Err(StorageError::NodeOverflow {
                    page_id: parent,
                    count,
                    max,
                });
            }
            node = parent;
        }
        Err(StorageError::BrokenParentChain(leaf_id))
    }

    /// Descend from the root to the leaf position where `key` is or would go
    pub(crate) fn find_position(&mut self, key: u32) -> Result<(PageId, usize)> {
        let mut page_id = self.root_page;
        loop {
            let node_type = self.node_type(page_id)?;
            let page = self.pager.fetch_page(page_id)?;
            match node_type {
                NodeType::Leaf => return Ok((page_id, page.leaf_find_index(key))),
                NodeType::Internal => {
                    let index = page.internal_find_child_index(key);
                    page_id = page.internal_child(index);
                }
            }
        }
    }

    /// Largest key stored in the subtree rooted at `page_id`
    pub fn node_max_key(&mut self, page_id: PageId) -> Result<u32> {
        let mut current = page_id;
        loop {
            let node_type = self.node_type(current)?;
            let page = self.pager.fetch_page(current)?;
            match node_type {
                NodeType::Leaf => {
                    let count = page.leaf_cell_count();
                    if count == 0 {
                        return Err(StorageError::EmptyNode(current));
                    }
                    return Ok(page.leaf_key(count - 1));
                }
                NodeType::Internal => current = page.internal_right_child(),
            }
        }
    }

    /// New pages an insert into `leaf_id` would allocate.
    ///
    /// A full leaf needs one page for its split, every full ancestor one
    /// more, and reaching the root one more for the copied-out left child.
    pub(crate) fn pages_needed_for_insert(&mut self, leaf_id: PageId) -> Result<u32> {
        if self.pager.fetch_page(leaf_id)?.leaf_cell_count() < self.config.max_leaf_cells {
            return Ok(0);
        }

        let mut needed = 1;
        let mut node = leaf_id;
        loop {
            if node == self.root_page {
                return Ok(needed + 1);
            }
            let parent = self.pager.fetch_page(node)?.parent();
            if self.pager.fetch_page(parent)?.internal_key_count() < self.config.max_internal_keys {
                return Ok(needed);
            }
            needed += 1;
            node = parent;
        }
    }

    /// Insert a row at `cell_index` of a leaf, splitting the leaf when full
    pub(crate) fn leaf_insert(&mut self, page_id: PageId, cell_index: usize, row: &Row) -> Result<()> {
        let count = self.pager.fetch_page(page_id)?.leaf_cell_count();
        if count >= self.config.max_leaf_cells {
            return self.leaf_split_and_insert(page_id, cell_index, row);
        }

        let leaf = self.pager.fetch_page_mut(page_id)?;
        leaf.leaf_shift_cells_right(cell_index, count);
        leaf.set_leaf_key(cell_index, row.id);
        row.serialize(leaf.leaf_value_mut(cell_index));
        leaf.set_leaf_cell_count(count + 1);
        Ok(())
    }

    /// Split a full leaf in two while inserting one more row.
    ///
    /// The old leaf keeps the lower half and the new right sibling takes the
    /// upper half; the sibling chain goes old -> new -> old's former next.
    fn leaf_split_and_insert(&mut self, page_id: PageId, cell_index: usize, row: &Row) -> Result<()> {
        let (mut cells, old_max, parent, was_root, next_leaf) = {
            let old = self.pager.fetch_page(page_id)?;
            let count = old.leaf_cell_count();
            let cells: Vec<Vec<u8>> = (0..count).map(|i| old.leaf_cell(i).to_vec()).collect();
            (cells, old.leaf_key(count - 1), old.parent(), old.is_root(), old.leaf_next_leaf())
        };

        let mut new_cell = vec![0u8; LEAF_NODE_CELL_SIZE];
        new_cell[..LEAF_NODE_KEY_SIZE].copy_from_slice(&row.id.to_le_bytes());
        row.serialize(&mut new_cell[LEAF_NODE_VALUE_OFFSET..]);
        cells.insert(cell_index, new_cell);

        let left_count = self.config.leaf_left_split_count();
        let new_page_id = self.pager.unused_page_id();
        debug!(
            %page_id,
            %new_page_id,
            left = left_count,
            right = cells.len() - left_count,
            "splitting leaf"
        );

        {
            let new_leaf = self.pager.fetch_page_mut(new_page_id)?;
            new_leaf.initialize_leaf();
            new_leaf.set_parent(parent);
            new_leaf.set_leaf_next_leaf(next_leaf);
            write_leaf_cells(new_leaf, &cells[left_count..]);
        }
        {
            let old_leaf = self.pager.fetch_page_mut(page_id)?;
            write_leaf_cells(old_leaf, &cells[..left_count]);
            old_leaf.set_leaf_next_leaf(Some(new_page_id));
        }

        if was_root {
            return self.create_new_root(new_page_id);
        }

        let new_max = self.node_max_key(page_id)?;
        self.update_internal_key(parent, old_max, new_max)?;
        self.internal_insert(parent, new_page_id)
    }

    /// Grow the tree by one level.
    ///
    /// The current root's contents move to a fresh page that becomes the
    /// left child, and the root page is rewritten as an internal node over
    /// that page and `right_child`. The root keeps its page number.
    fn create_new_root(&mut self, right_child: PageId) -> Result<()> {
        let root_id = self.root_page;
        let left_child = self.pager.unused_page_id();
        let root_copy = self.pager.fetch_page(root_id)?.clone();
        let left_is_internal = root_copy.node_type() == Some(NodeType::Internal);

        {
            let left = self.pager.fetch_page_mut(left_child)?;
            *left = root_copy;
            left.set_root(false);
            left.set_parent(root_id);
        }

        if left_is_internal {
            let children = self.pager.fetch_page(left_child)?.internal_children();
            for child in children {
                self.pager.fetch_page_mut(child)?.set_parent(left_child);
            }
        }

        let left_max = self.node_max_key(left_child)?;
        {
            let root = self.pager.fetch_page_mut(root_id)?;
            root.initialize_internal();
            root.set_root(true);
            root.set_internal_key_count(1);
            root.set_internal_cell_child(0, left_child);
            root.set_internal_key(0, left_max);
            root.set_internal_right_child(right_child);
        }
        self.pager.fetch_page_mut(right_child)?.set_parent(root_id);

        debug!(%left_child, %right_child, left_max, "promoted new root");
        Ok(())
    }

    /// Add `child_id` to the internal node `parent_id`, splitting it when full
    fn internal_insert(&mut self, parent_id: PageId, child_id: PageId) -> Result<()> {
        let child_max = self.node_max_key(child_id)?;
        let (key_count, index, right_child) = {
            let parent = self.pager.fetch_page(parent_id)?;
            (
                parent.internal_key_count(),
                parent.internal_find_child_index(child_max),
                parent.internal_right_child(),
            )
        };

        let max = self.config.max_internal_keys;
        if key_count > max {
            return Err(StorageError::NodeOverflow {
                page_id: parent_id,
                count: key_count,
                max,
            });
        }
        if key_count == max {
            return self.internal_split_and_insert(parent_id, child_id);
        }

        let right_max = self.node_max_key(right_child)?;
        let parent = self.pager.fetch_page_mut(parent_id)?;
        if child_max > right_max {
            // New child becomes the right child; the old one moves into the cells.
            parent.set_internal_cell_child(key_count, right_child);
            parent.set_internal_key(key_count, right_max);
            parent.set_internal_right_child(child_id);
        } else {
            parent.internal_shift_cells_right(index, key_count);
            parent.set_internal_cell_child(index, child_id);
            parent.set_internal_key(index, child_max);
        }
        parent.set_internal_key_count(key_count + 1);

        self.pager.fetch_page_mut(child_id)?.set_parent(parent_id);
        Ok(())
    }

    /// Split a full internal node while adding `child_id` to it.
    ///
    /// All `key_count + 2` children (including the right child and the new
    /// one) are ordered by subtree max key and dealt into two halves. Each
    /// half stores every child but its last as a cell and makes the last
    /// its right child.
    fn internal_split_and_insert(&mut self, page_id: PageId, child_id: PageId) -> Result<()> {
        let child_max = self.node_max_key(child_id)?;
        let (mut entries, right_child, was_root, parent) = {
            let page = self.pager.fetch_page(page_id)?;
            let entries: Vec<(PageId, u32)> = (0..page.internal_key_count())
                .map(|i| (page.internal_cell_child(i), page.internal_key(i)))
                .collect();
            (entries, page.internal_right_child(), page.is_root(), page.parent())
        };

        let right_max = self.node_max_key(right_child)?;
        // Key the grandparent holds for this node, from before the child split.
        let old_max = right_max.max(child_max);

        entries.push((right_child, right_max));
        let position = entries.partition_point(|&(_, key)| key < child_max);
        entries.insert(position, (child_id, child_max));

        let right_count = entries.len() / 2;
        let left_count = entries.len() - right_count;
        let new_page_id = self.pager.unused_page_id();
        debug!(
            %page_id,
            %new_page_id,
            left = left_count,
            right = right_count,
            "splitting internal node"
        );

        {
            let new_node = self.pager.fetch_page_mut(new_page_id)?;
            new_node.initialize_internal();
            new_node.set_parent(parent);
            write_internal_entries(new_node, &entries[left_count..]);
        }
        {
            let node = self.pager.fetch_page_mut(page_id)?;
            node.initialize_internal();
            node.set_root(was_root);
            node.set_parent(parent);
            write_internal_entries(node, &entries[..left_count]);
        }

        for &(child, _) in &entries[..left_count] {
            self.pager.fetch_page_mut(child)?.set_parent(page_id);
        }
        for &(child, _) in &entries[left_count..] {
            self.pager.fetch_page_mut(child)?.set_parent(new_page_id);
        }

        if was_root {
            return self.create_new_root(new_page_id);
        }

        let new_max = self.node_max_key(page_id)?;
        self.update_internal_key(parent, old_max, new_max)?;
        self.internal_insert(parent, new_page_id)
    }

    /// Replace the stored bound `old_key` with `new_key`.
    ///
    /// Nothing is stored when `old_key` routes to the right child.
    fn update_internal_key(&mut self, page_id: PageId, old_key: u32, new_key: u32) -> Result<()> {
        let node = self.pager.fetch_page_mut(page_id)?;
        let index = node.internal_find_child_index(old_key);
        if index < node.internal_key_count() {
            let found = node.internal_key(index);
            if found != old_key {
                warn!(%page_id, expected = old_key, found, "stored key does not match subtree max");
                return Err(StorageError::StaleKey {
                    page_id,
                    expected: old_key,
                    found,
                });
            }
            node.set_internal_key(index, new_key);
        }
        Ok(())
    }

    /// Indented dump of the tree shape, one node or key per line
    pub fn print_tree(&mut self) -> Result<String> {
        let mut out = String::new();
        self.print_node(self.root_page, 0, &mut out)?;
        Ok(out)
    }

    fn print_node(&mut self, page_id: PageId, depth: usize, out: &mut String) -> Result<()> {
        let indent = "  ".repeat(depth);
        match self.node_type(page_id)? {
            NodeType::Leaf => {
                let page = self.pager.fetch_page(page_id)?;
                let count = page.leaf_cell_count();
                let _ = writeln!(out, "{}- leaf (size {})", indent, count);
                for i in 0..count {
                    let _ = writeln!(out, "{}  - {}", indent, page.leaf_key(i));
                }
            }
            NodeType::Internal => {
                let (keys, children) = {
                    let page = self.pager.fetch_page(page_id)?;
                    let keys: Vec<u32> = (0..page.internal_key_count())
                        .map(|i| page.internal_key(i))
                        .collect();
                    (keys, page.internal_children())
                };
                let _ = writeln!(out, "{}- internal (size {})", indent, keys.len());
                for (child, key) in children.iter().zip(&keys) {
                    self.print_node(*child, depth + 1, out)?;
                    let _ = writeln!(out, "{}  - key {}", indent, key);
                }
                if let Some(right_child) = children.last() {
                    self.print_node(*right_child, depth + 1, out)?;
                }
            }
        }
        Ok(())
    }

    /// Export the tree structure for visualization
    pub fn export_tree(&mut self) -> Result<TreeNode> {
        self.export_node(self.root_page)
    }

    fn export_node(&mut self, page_id: PageId) -> Result<TreeNode> {
        match self.node_type(page_id)? {
            NodeType::Leaf => {
                let page = self.pager.fetch_page(page_id)?;
                let keys = (0..page.leaf_cell_count()).map(|i| page.leaf_key(i)).collect();
                Ok(TreeNode {
                    page_id: page_id.value(),
                    is_leaf: true,
                    keys,
                    children: Vec::new(),
                })
            }
            NodeType::Internal => {
                let (keys, child_ids) = {
                    let page = self.pager.fetch_page(page_id)?;
                    let keys: Vec<u32> = (0..page.internal_key_count())
                        .map(|i| page.internal_key(i))
                        .collect();
                    (keys, page.internal_children())
                };
                let children = child_ids
                    .into_iter()
                    .map(|child| self.export_node(child))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TreeNode {
                    page_id: page_id.value(),
                    is_leaf: false,
                    keys,
                    children,
                })
            }
        }
    }
}

fn write_leaf_cells(page: &mut PageBuf, cells: &[Vec<u8>]) {
    for (i, cell) in cells.iter().enumerate() {
        page.leaf_cell_mut(i).copy_from_slice(cell);
    }
    page.set_leaf_cell_count(cells.len());
}

fn write_internal_entries(page: &mut PageBuf, entries: &[(PageId, u32)]) {
    if let Some(((right_child, _), cells)) = entries.split_last() {
        for (i, &(child, key)) in cells.iter().enumerate() {
            page.set_internal_cell_child(i, child);
            page.set_internal_key(i, key);
        }
        page.set_internal_key_count(cells.len());
        page.set_internal_right_child(*right_child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::ExecuteResult;
    use crate::types::BTreeConfig;
    use crate::Config;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use tempfile::{tempdir, TempDir};

    fn row(id: u32) -> Row {
        Row::new(id, &format!("user{}", id), &format!("person{}@example.com", id)).unwrap()
    }

    fn open_table(btree_config: BTreeConfig, max_pages: u32) -> Result<(Table, TempDir)> {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().join("test.db"))
            .max_pages(max_pages)
            .btree_config(btree_config);
        Ok((Table::open_with(&config)?, dir))
    }

    /// Walk the whole tree checking structural invariants.
    ///
    /// Returns the depth of every leaf, left to right.
    fn check_node(
        table: &mut Table,
        page_id: PageId,
        expected_parent: Option<PageId>,
        depth: usize,
        leaf_depths: &mut Vec<usize>,
    ) -> Result<()> {
        let page = table.pager.fetch_page(page_id)?.clone();
        assert_eq!(page.is_root(), expected_parent.is_none(), "root flag on page {}", page_id);
        if let Some(parent) = expected_parent {
            assert_eq!(page.parent(), parent, "parent pointer of page {}", page_id);
        }

        match page.node_type() {
            Some(NodeType::Leaf) => {
                let count = page.leaf_cell_count();
                assert!(count <= table.config.max_leaf_cells);
                for i in 1..count {
                    assert!(page.leaf_key(i - 1) < page.leaf_key(i));
                }
                leaf_depths.push(depth);
            }
            Some(NodeType::Internal) => {
                let key_count = page.internal_key_count();
                assert!(key_count <= table.config.max_internal_keys);
                for i in 0..key_count {
                    let child = page.internal_cell_child(i);
                    assert_eq!(table.node_max_key(child)?, page.internal_key(i));
                    if i > 0 {
                        assert!(page.internal_key(i - 1) < page.internal_key(i));
                    }
                }
                if key_count > 0 {
                    let right_max = table.node_max_key(page.internal_right_child())?;
                    assert!(right_max > page.internal_key(key_count - 1));
                }
                for child in page.internal_children() {
                    check_node(table, child, Some(page_id), depth + 1, leaf_depths)?;
                }
            }
            None => panic!("page {} has no valid node type", page_id),
        }
        Ok(())
    }

    fn check_invariants(table: &mut Table) -> Result<usize> {
        let mut leaf_depths = Vec::new();
        check_node(table, PageId::ROOT, None, 1, &mut leaf_depths)?;
        let depth = leaf_depths[0];
        assert!(leaf_depths.iter().all(|&d| d == depth), "unbalanced leaves: {:?}", leaf_depths);
        Ok(depth)
    }

    fn scanned_ids(table: &mut Table) -> Result<Vec<u32>> {
        Ok(table.select_all()?.iter().map(|r| r.id).collect())
    }

    #[test]
    fn test_first_leaf_split() -> Result<()> {
        let (mut table, _dir) = open_table(BTreeConfig::default(), 100)?;

        for id in 1..=14 {
            assert_eq!(table.insert(&row(id))?, ExecuteResult::Success);
        }

        // Right half went to page 1, the old root's left half moved to page 2.
        let root = table.pager.fetch_page(PageId::ROOT)?.clone();
        assert_eq!(root.node_type(), Some(NodeType::Internal));
        assert!(root.is_root());
        assert_eq!(root.internal_key_count(), 1);
        assert_eq!(root.internal_key(0), 7);
        assert_eq!(root.internal_cell_child(0), PageId::new(2));
        assert_eq!(root.internal_right_child(), PageId::new(1));

        let left = table.pager.fetch_page(PageId::new(2))?.clone();
        assert_eq!(left.leaf_cell_count(), 7);
        assert_eq!(left.leaf_next_leaf(), Some(PageId::new(1)));
        let right = table.pager.fetch_page(PageId::new(1))?.clone();
        assert_eq!(right.leaf_cell_count(), 7);
        assert_eq!(right.leaf_next_leaf(), None);

        assert_eq!(scanned_ids(&mut table)?, (1..=14).collect::<Vec<_>>());
        assert_eq!(check_invariants(&mut table)?, 2);
        Ok(())
    }

    #[test]
    fn test_print_tree() -> Result<()> {
        let (mut table, _dir) = open_table(BTreeConfig::new(3, 3), 100)?;
        for id in [3, 1, 2, 4] {
            assert_eq!(table.insert(&row(id))?, ExecuteResult::Success);
        }

        let expected = "\
- internal (size 1)
  - leaf (size 2)
    - 1
    - 2
  - key 2
  - leaf (size 2)
    - 3
    - 4
";
        assert_eq!(table.print_tree()?, expected);
        Ok(())
    }

    #[test]
    fn test_sequential_inserts_grow_balanced_tree() -> Result<()> {
        let (mut table, _dir) = open_table(BTreeConfig::new(3, 3), 1000)?;

        for id in 1..=200 {
            assert_eq!(table.insert(&row(id))?, ExecuteResult::Success, "id {}", id);
        }

        let depth = check_invariants(&mut table)?;
        assert!(depth >= 4, "expected at least two internal splits, depth {}", depth);
        assert_eq!(table.height()?, depth);
        assert_eq!(table.node_type(PageId::ROOT)?, NodeType::Internal);
        assert_eq!(scanned_ids(&mut table)?, (1..=200).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_descending_inserts() -> Result<()> {
        let (mut table, _dir) = open_table(BTreeConfig::new(4, 3), 1000)?;

        for id in (1..=150).rev() {
            assert_eq!(table.insert(&row(id))?, ExecuteResult::Success, "id {}", id);
        }

        check_invariants(&mut table)?;
        assert_eq!(scanned_ids(&mut table)?, (1..=150).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_random_inserts_keep_invariants() -> Result<()> {
        let (mut table, _dir) = open_table(BTreeConfig::new(3, 2), 2000)?;

        let mut ids: Vec<u32> = (1..=300).map(|i| i * 3).collect();
        ids.shuffle(&mut StdRng::seed_from_u64(7));

        for (n, &id) in ids.iter().enumerate() {
            assert_eq!(table.insert(&row(id))?, ExecuteResult::Success, "id {}", id);
            if n % 50 == 0 {
                check_invariants(&mut table)?;
            }
        }
        for &id in ids.iter().take(20) {
            assert_eq!(table.insert(&row(id))?, ExecuteResult::DuplicateKey);
        }

        check_invariants(&mut table)?;
        let mut expected = ids.clone();
        expected.sort_unstable();
        assert_eq!(scanned_ids(&mut table)?, expected);

        for &id in &expected {
            assert_eq!(table.get(id)?.map(|r| r.id), Some(id));
            assert_eq!(table.get(id + 1)?, None);
        }
        Ok(())
    }

    #[test]
    fn test_deep_tree_survives_reopen() -> Result<()> {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().join("test.db"))
            .max_pages(1000)
            .btree_config(BTreeConfig::new(3, 3));

        let mut ids: Vec<u32> = (1..=120).collect();
        ids.shuffle(&mut StdRng::seed_from_u64(42));
        {
            let mut table = Table::open_with(&config)?;
            for &id in &ids {
                assert_eq!(table.insert(&row(id))?, ExecuteResult::Success);
            }
            table.close()?;
        }

        let mut table = Table::open_with(&config)?;
        check_invariants(&mut table)?;
        let rows = table.select_all()?;
        assert_eq!(rows.len(), 120);
        assert!(rows.iter().enumerate().all(|(i, r)| *r == row(i as u32 + 1)));
        Ok(())
    }

    #[test]
    fn test_export_tree() -> Result<()> {
        let (mut table, _dir) = open_table(BTreeConfig::default(), 100)?;
        for id in 1..=14 {
            assert_eq!(table.insert(&row(id))?, ExecuteResult::Success);
        }

        let tree = table.export_tree()?;
        assert!(!tree.is_leaf);
        assert_eq!(tree.keys, vec![7]);
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].page_id, 2);
        assert_eq!(tree.children[1].keys, (8..=14).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_update_internal_key() -> Result<()> {
        let (mut table, _dir) = open_table(BTreeConfig::default(), 100)?;
        for id in 1..=14 {
            assert_eq!(table.insert(&row(id))?, ExecuteResult::Success);
        }

        // Right child bounds are not stored, so nothing changes.
        table.update_internal_key(PageId::ROOT, 14, 99)?;
        assert_eq!(table.pager.fetch_page(PageId::ROOT)?.internal_key(0), 7);

        let err = table.update_internal_key(PageId::ROOT, 5, 6).err().unwrap();
        assert!(matches!(err, StorageError::StaleKey { expected: 5, found: 7, .. }));
        assert!(err.is_corruption());
        assert_eq!(table.pager.fetch_page(PageId::ROOT)?.internal_key(0), 7);

        table.update_internal_key(PageId::ROOT, 7, 6)?;
        assert_eq!(table.pager.fetch_page(PageId::ROOT)?.internal_key(0), 6);
        Ok(())
    }

    #[test]
    fn test_max_key_of_empty_leaf() -> Result<()> {
        let (mut table, _dir) = open_table(BTreeConfig::default(), 100)?;
        let err = table.node_max_key(PageId::ROOT).err().unwrap();
        assert!(matches!(err, StorageError::EmptyNode(p) if p == PageId::ROOT));
        Ok(())
    }
}
