//! Anchor universe, compression, and file grouping.
//!
//! An anchor is a canonical directory path nominated as a potential
//! top-level folder of the visible tree. Candidates come from the parents
//! of real files, directly selected directories, and legacy source roots;
//! compression removes candidates dominated by another anchor, and every
//! surviving top anchor then governs the files below it.

use crate::entry::NormalizedEntry;
use crate::paths;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A surviving top anchor and the files it governs, in input order.
#[derive(Debug, Clone)]
pub struct AnchorGroup {
    /// Canonical anchor path.
    pub anchor: String,
    /// Files governed by this anchor. May be empty.
    pub entries: Vec<NormalizedEntry>,
}

/// Candidate top-level directories.
///
/// With `auto_compute` set: the parent of every real file, every selected
/// directory, every source root. Without it: only the source roots. All
/// inputs must already be canonical.
pub fn anchor_universe(
    normalized: &[NormalizedEntry],
    selected_directories: &[String],
    source_roots: &[String],
    auto_compute: bool,
) -> Vec<String> {
    let mut universe = Vec::new();
    if auto_compute {
        for entry in normalized {
            universe.push(paths::parent_dir(&entry.canonical));
        }
        universe.extend(selected_directories.iter().cloned());
    }
    universe.extend(source_roots.iter().cloned());
    universe
}

/// Compress the universe down to the surviving top anchors.
///
/// Candidates are deduplicated under the case policy (first representative
/// wins), ordered by ancestor depth then lexicographically, and kept only
/// when no already-kept anchor dominates them. The default dominance rule
/// keeps the shallowest of mutually-ancestral candidates;
/// `prefer_deepest` inverts it. The result is shallowest-first either way.
pub fn compress_anchors(
    universe: &[String],
    case_insensitive: bool,
    prefer_deepest: bool,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<&String> = Vec::new();
    for candidate in universe {
        if seen.insert(paths::fold(candidate, case_insensitive)) {
            candidates.push(candidate);
        }
    }

    candidates.sort_by(|a, b| {
        let by_depth = paths::depth(a).cmp(&paths::depth(b));
        let ordering = by_depth.then_with(|| a.cmp(b));
        if prefer_deepest {
            ordering.reverse()
        } else {
            ordering
        }
    });

    let mut kept: Vec<String> = Vec::new();
    for candidate in candidates {
        let dominated = kept.iter().any(|k| {
            if prefer_deepest {
                paths::is_within(candidate, k, case_insensitive)
            } else {
                paths::is_within(k, candidate, case_insensitive)
            }
        });
        if !dominated {
            kept.push(candidate.clone());
        }
    }

    kept.sort_by(|a, b| paths::depth(a).cmp(&paths::depth(b)).then_with(|| a.cmp(b)));
    debug!(candidates = universe.len(), kept = kept.len(), "anchor compression");
    kept
}

/// Assign each file to its governing top anchor (the shallowest ancestor).
///
/// Files no anchor governs fall back to their own parent directory as a
/// synthetic top anchor, appended after the real anchors in first-appearance
/// order. Every anchor appears in the result, possibly with no files.
pub fn group_by_anchor(
    anchors: &[String],
    normalized: &[NormalizedEntry],
    case_insensitive: bool,
) -> Vec<AnchorGroup> {
    let mut groups: Vec<AnchorGroup> = anchors
        .iter()
        .map(|anchor| AnchorGroup {
            anchor: anchor.clone(),
            entries: Vec::new(),
        })
        .collect();
    let mut index: HashMap<String, usize> = anchors
        .iter()
        .enumerate()
        .map(|(i, anchor)| (paths::fold(anchor, case_insensitive), i))
        .collect();

    for entry in normalized {
        let governing = anchors
            .iter()
            .position(|anchor| paths::is_within(anchor, &entry.canonical, case_insensitive));
        let slot = match governing {
            Some(i) => i,
            None => {
                let parent = paths::parent_dir(&entry.canonical);
                let key = paths::fold(&parent, case_insensitive);
                *index.entry(key).or_insert_with(|| {
                    groups.push(AnchorGroup {
                        anchor: parent.clone(),
                        entries: Vec::new(),
                    });
                    groups.len() - 1
                })
            }
        };
        groups[slot].entries.push(entry.clone());
    }

    groups
}
