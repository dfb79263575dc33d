//! Child ordering.
//!
//! The stable comparator used both when the builder bakes order into
//! `child_ids` and by the default flatten sort delegate: folders before
//! files, case-insensitive name, ID tie-break.

use crate::tree::node::{TreeData, TreeNode};
use crate::types::NodeId;
use std::cmp::Ordering;

/// Supplies the child order flatten walks for each parent. Implementations
/// must return a stable total order over the parent's `child_ids`.
pub trait SortDelegate {
    fn sort_child_ids(&self, data: &TreeData, parent_id: &str) -> Vec<NodeId>;
}

/// Stable comparator: folders first, then lowercased name, then ID.
pub fn compare_children(a: &TreeNode, b: &TreeNode) -> Ordering {
    fn rank(node: &TreeNode) -> u8 {
        if node.is_folder_like() {
            0
        } else {
            1
        }
    }
    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.id.cmp(&b.id))
}

/// The provided default delegate: alphabetical per [`compare_children`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AlphabeticalSortDelegate;

impl SortDelegate for AlphabeticalSortDelegate {
    fn sort_child_ids(&self, data: &TreeData, parent_id: &str) -> Vec<NodeId> {
        let mut children = data.children_of(parent_id);
        children.sort_by(|a, b| compare_children(a, b));
        children.into_iter().map(|c| c.id.clone()).collect()
    }
}
