//! Minimal row-level delta between two flattened lists.
//!
//! Preserved rows are maximized by computing a Longest Increasing
//! Subsequence over the positions (in the new list) of IDs carried over
//! from the old one; everything outside the LIS becomes a removal or an
//! insertion. Applying `removes_desc` to the old list, then `inserts_asc`
//! to the result, yields the new list.

use crate::tree::node::VisibleNode;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Result of diffing two visible-row lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDelta {
    /// Indices to remove from the old list, descending.
    pub removes_desc: Vec<usize>,
    /// Indices at which to insert rows of the new list, ascending.
    pub inserts_asc: Vec<usize>,
}

impl ListDelta {
    pub fn is_empty(&self) -> bool {
        self.removes_desc.is_empty() && self.inserts_asc.is_empty()
    }
}

/// Compute the minimal delta between `before` and `after`, keyed by row ID.
///
/// Insertions plus removals total `before.len() + after.len() - 2 * LIS`.
pub fn diff_visible_lists(before: &[VisibleNode], after: &[VisibleNode]) -> ListDelta {
    if before.len() == after.len() && before.iter().zip(after).all(|(b, a)| b.id == a.id) {
        return ListDelta::default();
    }

    let after_index: HashMap<&str, usize> = after
        .iter()
        .enumerate()
        .map(|(i, row)| (row.id.as_str(), i))
        .collect();

    // Positions in `after` of every surviving row, in `before` order.
    let seq: Vec<usize> = before
        .iter()
        .filter_map(|row| after_index.get(row.id.as_str()).copied())
        .collect();

    let kept: HashSet<usize> = longest_increasing(&seq)
        .into_iter()
        .map(|position| seq[position])
        .collect();

    let mut removes_desc = Vec::new();
    for (i, row) in before.iter().enumerate().rev() {
        let keep = after_index
            .get(row.id.as_str())
            .is_some_and(|j| kept.contains(j));
        if !keep {
            removes_desc.push(i);
        }
    }

    let inserts_asc = (0..after.len()).filter(|j| !kept.contains(j)).collect();

    ListDelta {
        removes_desc,
        inserts_asc,
    }
}

/// Positions of one longest strictly increasing subsequence of `seq`,
/// via patience sorting with binary-searched tails and backpointers.
fn longest_increasing(seq: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];
    for (i, &value) in seq.iter().enumerate() {
        let slot = tails.partition_point(|&t| seq[t] < value);
        if slot > 0 {
            prev[i] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(i);
        } else {
            tails[slot] = i;
        }
    }

    let mut positions = Vec::with_capacity(tails.len());
    let mut current = tails.last().copied();
    while let Some(i) = current {
        positions.push(i);
        current = prev[i];
    }
    positions.reverse();
    positions
}
