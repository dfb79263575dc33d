//! Tree node records and the built snapshot.
//!
//! Nodes live in an arena-style map keyed by ID; `parent_id` is a string
//! key, never a reference, so no cyclic ownership exists. A `TreeData` is
//! immutable once returned by a build and may be shared freely by readers.

use crate::error::TreeError;
use crate::types::{NodeId, NodeKind, Origin};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One vertex of the built graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    /// Display label. Never contains `/`.
    pub name: String,
    pub kind: NodeKind,
    /// Empty only for the synthetic root.
    pub parent_id: NodeId,
    /// Ordered children.
    pub child_ids: Vec<NodeId>,
    /// Canonical POSIX-like position within the virtual tree.
    pub virtual_path: String,
    /// Display form of the real path after prefix stripping; absent for
    /// purely virtual folders.
    pub source_path: Option<String>,
    /// Set iff `kind` is `File`: the originating entry's ID.
    pub entry_id: Option<String>,
    pub is_virtual: bool,
    pub is_expanded: bool,
    pub is_selected: bool,
    pub origin: Origin,
}

impl TreeNode {
    /// True for kinds that can carry children.
    pub fn is_folder_like(&self) -> bool {
        matches!(self.kind, NodeKind::Root | NodeKind::Folder)
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TreeNode {}

/// A built tree: the node arena plus its entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeData {
    pub nodes: HashMap<NodeId, TreeNode>,
    pub root_id: NodeId,
    /// Where UI flattening begins after optional hoisting.
    pub visible_root_id: NodeId,
    pub omit_container_row_at_root: bool,
}

impl TreeData {
    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Children of a node in stored order. Unknown IDs yield nothing.
    pub fn children_of(&self, id: &str) -> Vec<&TreeNode> {
        self.get(id)
            .map(|node| {
                node.child_ids
                    .iter()
                    .filter_map(|child| self.nodes.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn file_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| n.kind == NodeKind::File)
            .count()
    }

    /// Verify the structural invariants of the graph.
    ///
    /// Run after materialization in debug builds; any failure is a bug in
    /// the builder, not bad input.
    pub fn verify_invariants(&self) -> Result<(), TreeError> {
        let root = self
            .nodes
            .get(&self.root_id)
            .ok_or_else(|| TreeError::InvariantViolation("root id not in nodes".to_string()))?;
        if root.kind != NodeKind::Root {
            return Err(TreeError::InvariantViolation(
                "root node kind is not Root".to_string(),
            ));
        }
        if !root.parent_id.is_empty() {
            return Err(TreeError::InvariantViolation(
                "root node has a parent".to_string(),
            ));
        }

        let mut entry_ids: HashSet<&str> = HashSet::new();
        for node in self.nodes.values() {
            if node.kind == NodeKind::Folder && node.name.contains('/') {
                return Err(TreeError::InvariantViolation(format!(
                    "node {} name contains '/': {}",
                    node.id, node.name
                )));
            }
            for child_id in &node.child_ids {
                let child = self.nodes.get(child_id).ok_or_else(|| {
                    TreeError::InvariantViolation(format!(
                        "child {} of {} not in nodes",
                        child_id, node.id
                    ))
                })?;
                if child.parent_id != node.id {
                    return Err(TreeError::InvariantViolation(format!(
                        "child {} does not point back to parent {}",
                        child_id, node.id
                    )));
                }
            }
            if node.kind == NodeKind::File {
                let entry_id = node.entry_id.as_deref().ok_or_else(|| {
                    TreeError::InvariantViolation(format!("file {} has no entry id", node.id))
                })?;
                if !entry_ids.insert(entry_id) {
                    return Err(TreeError::InvariantViolation(format!(
                        "entry id {} appears on two file nodes",
                        entry_id
                    )));
                }
            }
        }

        // Reachability: the graph from the root is a tree covering all nodes.
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![self.root_id.as_str()];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(TreeError::InvariantViolation(format!(
                    "node {} reached twice; graph is not a tree",
                    id
                )));
            }
            if let Some(node) = self.nodes.get(id) {
                for child in &node.child_ids {
                    stack.push(child);
                }
            }
        }
        if visited.len() != self.nodes.len() {
            return Err(TreeError::InvariantViolation(format!(
                "{} of {} nodes reachable from root",
                visited.len(),
                self.nodes.len()
            )));
        }

        let visible = self
            .nodes
            .get(&self.visible_root_id)
            .ok_or_else(|| TreeError::InvariantViolation("visible root not in nodes".to_string()))?;
        if !visible.is_folder_like() {
            return Err(TreeError::InvariantViolation(
                "visible root is not a root or folder".to_string(),
            ));
        }

        Ok(())
    }
}

/// One row of a flattened tree: exactly what a row renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleNode {
    pub id: NodeId,
    pub depth: usize,
    pub name: String,
    pub kind: NodeKind,
    /// Whether the source node has children, regardless of expansion.
    pub has_children: bool,
    pub virtual_path: String,
    pub entry_id: Option<String>,
    pub is_virtual: bool,
    pub source_path: Option<String>,
    pub origin: Origin,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: NodeKind, parent: &str, children: &[&str]) -> TreeNode {
        TreeNode {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            parent_id: parent.to_string(),
            child_ids: children.iter().map(|c| c.to_string()).collect(),
            virtual_path: format!("/{}", id),
            source_path: None,
            entry_id: if kind == NodeKind::File {
                Some(format!("e-{}", id))
            } else {
                None
            },
            is_virtual: false,
            is_expanded: false,
            is_selected: false,
            origin: Origin::None,
        }
    }

    fn data(nodes: Vec<TreeNode>) -> TreeData {
        TreeData {
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            root_id: "root".to_string(),
            visible_root_id: "root".to_string(),
            omit_container_row_at_root: false,
        }
    }

    #[test]
    fn test_valid_tree_passes() {
        let tree = data(vec![
            node("root", NodeKind::Root, "", &["a"]),
            node("a", NodeKind::Folder, "root", &["f"]),
            node("f", NodeKind::File, "a", &[]),
        ]);
        assert!(tree.verify_invariants().is_ok());
    }

    #[test]
    fn test_missing_child_fails() {
        let tree = data(vec![node("root", NodeKind::Root, "", &["ghost"])]);
        assert!(tree.verify_invariants().is_err());
    }

    #[test]
    fn test_unreachable_node_fails() {
        let tree = data(vec![
            node("root", NodeKind::Root, "", &[]),
            node("orphan", NodeKind::Folder, "root", &[]),
        ]);
        assert!(tree.verify_invariants().is_err());
    }

    #[test]
    fn test_duplicate_entry_id_fails() {
        let mut file_a = node("f1", NodeKind::File, "root", &[]);
        let mut file_b = node("f2", NodeKind::File, "root", &[]);
        file_a.entry_id = Some("shared".to_string());
        file_b.entry_id = Some("shared".to_string());
        let tree = data(vec![
            node("root", NodeKind::Root, "", &["f1", "f2"]),
            file_a,
            file_b,
        ]);
        assert!(tree.verify_invariants().is_err());
    }

    #[test]
    fn test_folder_name_with_separator_fails() {
        let mut bad = node("a", NodeKind::Folder, "root", &[]);
        bad.name = "a/b".to_string();
        let tree = data(vec![node("root", NodeKind::Root, "", &["a"]), bad]);
        assert!(tree.verify_invariants().is_err());
    }
}
