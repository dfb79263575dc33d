//! DFS linearization of a built tree.
//!
//! Walks the graph from the visible root, respecting the caller's expanded
//! set, and surfaces filter matches together with their full ancestor chain
//! even when those ancestors are collapsed. The subtree-match cache is
//! local to one call; flatten never mutates the tree.

use crate::filter::{compile_filter, extension_of, FilterPredicate};
use crate::sort::SortDelegate;
use crate::tree::node::{TreeData, VisibleNode};
use crate::types::NodeId;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Flatten with the default child order (`child_ids` as stored).
pub fn flatten(
    data: &TreeData,
    expanded_ids: &HashSet<NodeId>,
    filter_query: Option<&str>,
) -> Vec<VisibleNode> {
    flatten_with(data, expanded_ids, filter_query, None)
}

/// Flatten with an injected sort delegate deciding each parent's child
/// order. The delegate must return a stable total order.
pub fn flatten_with(
    data: &TreeData,
    expanded_ids: &HashSet<NodeId>,
    filter_query: Option<&str>,
    sort: Option<&dyn SortDelegate>,
) -> Vec<VisibleNode> {
    let has_filter = filter_query.map(|q| !q.trim().is_empty()).unwrap_or(false);
    let mut walker = Walker {
        data,
        expanded_ids,
        sort,
        has_filter,
        predicate: compile_filter(filter_query),
        memo: HashMap::new(),
        rows: Vec::new(),
    };

    let Some(start) = data.get(&data.visible_root_id) else {
        return walker.rows;
    };
    if data.omit_container_row_at_root && start.is_folder_like() {
        for child_id in walker.child_order(&start.id) {
            let force = has_filter && walker.subtree_matches(&child_id);
            walker.visit(&child_id, 0, force);
        }
    } else {
        let force = has_filter && walker.subtree_matches(&start.id);
        let start_id = start.id.clone();
        walker.visit(&start_id, 0, force);
    }
    debug!(rows = walker.rows.len(), filtered = has_filter, "flatten complete");
    walker.rows
}

struct Walker<'a> {
    data: &'a TreeData,
    expanded_ids: &'a HashSet<NodeId>,
    sort: Option<&'a dyn SortDelegate>,
    has_filter: bool,
    predicate: FilterPredicate,
    memo: HashMap<NodeId, bool>,
    rows: Vec<VisibleNode>,
}

impl Walker<'_> {
    fn visit(&mut self, id: &str, depth: usize, force_expand: bool) {
        if !self.subtree_matches(id) {
            return;
        }
        let Some(node) = self.data.get(id) else {
            return;
        };
        self.rows.push(VisibleNode {
            id: node.id.clone(),
            depth,
            name: node.name.clone(),
            kind: node.kind,
            has_children: !node.child_ids.is_empty(),
            virtual_path: node.virtual_path.clone(),
            entry_id: node.entry_id.clone(),
            is_virtual: node.is_virtual,
            source_path: node.source_path.clone(),
            origin: node.origin,
        });

        let recurse = node.is_folder_like()
            && !node.child_ids.is_empty()
            && (force_expand || self.expanded_ids.contains(id));
        if !recurse {
            return;
        }
        for child_id in self.child_order(id) {
            let child_force = self.has_filter && self.subtree_matches(&child_id);
            self.visit(&child_id, depth + 1, child_force);
        }
    }

    /// Whether this subtree contains any match. Always true without a
    /// filter; memoized per flatten call.
    fn subtree_matches(&mut self, id: &str) -> bool {
        if !self.has_filter {
            return true;
        }
        if let Some(&cached) = self.memo.get(id) {
            return cached;
        }
        let result = match self.data.get(id) {
            Some(node) => {
                (self.predicate)(&node.name, &extension_of(&node.name))
                    || node.child_ids.iter().any(|child| self.subtree_matches(child))
            }
            None => false,
        };
        self.memo.insert(id.to_string(), result);
        result
    }

    fn child_order(&self, parent_id: &str) -> Vec<NodeId> {
        match self.sort {
            Some(delegate) => delegate.sort_child_ids(self.data, parent_id),
            None => self
                .data
                .get(parent_id)
                .map(|n| n.child_ids.clone())
                .unwrap_or_default(),
        }
    }
}
