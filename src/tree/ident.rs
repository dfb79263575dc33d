//! Stable identifier derivation.
//!
//! IDs depend only on canonical inputs, never on build order or sibling
//! count, so external UI state keyed on them survives rebuilds. Each ID
//! pairs a sanitized human-readable stem with a truncated BLAKE3 digest of
//! the full path; the digest keeps paths distinct when sanitizing collides
//! (`foo-bar` vs `foo_bar`).

use crate::paths;
use crate::types::NodeId;

/// Fixed ID of the synthetic root.
pub const ROOT_ID: &str = "root";
/// Fixed ID of the container folder under the root.
pub const CONTAINER_ID: &str = "container";

/// Hex BLAKE3 digest, truncated to 12 bytes (24 hex chars).
fn digest(input: &str) -> String {
    hex::encode(&blake3::hash(input.as_bytes()).as_bytes()[..12])
}

/// Short digest used as a display tie-breaker.
pub fn short_digest(input: &str) -> String {
    let full = digest(input);
    full[..6].to_string()
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// ID of a top-anchor folder, derived from its canonical path.
pub fn top_anchor_folder_id(canonical: &str) -> NodeId {
    format!(
        "folder_sr_{}_{}",
        sanitize(paths::base_name(canonical)),
        digest(canonical)
    )
}

/// ID of a folder with a known canonical source path.
pub fn source_folder_id(canonical: &str) -> NodeId {
    format!(
        "folder_sp_{}_{}",
        sanitize(paths::base_name(canonical)),
        digest(canonical)
    )
}

/// ID of a purely virtual folder, derived from its virtual path.
pub fn virtual_folder_id(virtual_path: &str) -> NodeId {
    format!("folder_{}_{}", sanitize(virtual_path), digest(virtual_path))
}

/// ID of a file node, carrying the caller-stable entry ID.
pub fn file_node_id(entry_id: &str) -> NodeId {
    format!("node_{}", entry_id)
}

/// Display labels for the top anchors, unique within the set.
///
/// Labels start as the anchor's basename. Conflicting labels widen by one
/// additional ancestor segment (joined with `" - "`) until unique; anchors
/// whose segments are exhausted fall back to a short digest suffix, which
/// can only still be needed for case-only path differences.
pub fn unique_root_labels(anchors: &[String], case_insensitive: bool) -> Vec<String> {
    struct Labeled<'a> {
        segments: Vec<&'a str>,
        used: usize,
    }

    let mut labeled: Vec<Labeled> = anchors
        .iter()
        .map(|anchor| Labeled {
            segments: paths::segments(anchor),
            used: 1,
        })
        .collect();

    let render = |l: &Labeled, anchor: &str| -> String {
        if l.segments.is_empty() {
            // Root-form anchor ("/", "C:/"): no segment to show, and a
            // folder name must not contain a separator.
            let stripped: String = anchor.chars().filter(|c| *c != '/').collect();
            return if stripped.is_empty() {
                "root".to_string()
            } else {
                stripped
            };
        }
        let start = l.segments.len().saturating_sub(l.used);
        l.segments[start..].join(" - ")
    };

    loop {
        let labels: Vec<String> = labeled
            .iter()
            .zip(anchors)
            .map(|(l, anchor)| render(l, anchor))
            .collect();
        let mut counts = std::collections::HashMap::new();
        for label in &labels {
            *counts
                .entry(paths::fold(label, case_insensitive))
                .or_insert(0usize) += 1;
        }

        let mut widened = false;
        for (i, label) in labels.iter().enumerate() {
            if counts[&paths::fold(label, case_insensitive)] > 1
                && labeled[i].used < labeled[i].segments.len()
            {
                labeled[i].used += 1;
                widened = true;
            }
        }
        if !widened {
            // Anything still conflicted cannot widen further.
            return labels
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    if counts[&paths::fold(label, case_insensitive)] > 1 {
                        format!("{} [{}]", label, short_digest(&anchors[i]))
                    } else {
                        label.clone()
                    }
                })
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_specials() {
        assert_eq!(sanitize("a b/c.d"), "a_b_c_d");
        assert_eq!(sanitize("foo-bar_9"), "foo-bar_9");
    }

    #[test]
    fn test_ids_are_deterministic() {
        assert_eq!(
            top_anchor_folder_id("/repo/lib"),
            top_anchor_folder_id("/repo/lib")
        );
        assert_ne!(
            top_anchor_folder_id("/repo/lib"),
            top_anchor_folder_id("/repo/Lib")
        );
    }

    #[test]
    fn test_sanitize_collisions_stay_distinct() {
        assert_ne!(source_folder_id("/a/foo-bar"), source_folder_id("/a/foo_bar"));
    }

    #[test]
    fn test_file_id_carries_entry_id() {
        assert_eq!(file_node_id("abc"), "node_abc");
    }

    #[test]
    fn test_labels_unique_basenames_untouched() {
        let anchors = vec!["/a/x".to_string(), "/a/y".to_string()];
        assert_eq!(unique_root_labels(&anchors, true), vec!["x", "y"]);
    }

    #[test]
    fn test_labels_widen_on_conflict() {
        let anchors = vec!["/one/scan".to_string(), "/two/scan".to_string()];
        assert_eq!(
            unique_root_labels(&anchors, true),
            vec!["one - scan", "two - scan"]
        );
    }

    #[test]
    fn test_labels_widen_until_unique() {
        let anchors = vec!["/p/x/scan".to_string(), "/q/x/scan".to_string()];
        assert_eq!(
            unique_root_labels(&anchors, true),
            vec!["p - x - scan", "q - x - scan"]
        );
    }

    #[test]
    fn test_labels_digest_tie_breaker_for_case_only_difference() {
        let anchors = vec!["/a/scan".to_string(), "/a/Scan".to_string()];
        let labels = unique_root_labels(&anchors, true);
        assert_ne!(labels[0], labels[1]);
        assert!(labels[0].starts_with("a - scan ["));
        assert!(labels[1].starts_with("a - Scan ["));
    }
}
