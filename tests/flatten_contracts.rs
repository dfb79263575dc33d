//! Flatten contracts: DFS order, filter hoisting, container omission.

use arbor::config::BuildOptions;
use arbor::entry::TreeEntry;
use arbor::flatten::{flatten, flatten_with};
use arbor::sort::AlphabeticalSortDelegate;
use arbor::tree::builder::TreeBuilder;
use arbor::tree::node::TreeData;
use arbor::types::NodeKind;
use std::collections::HashSet;

fn scan_tree(omit_container: bool) -> TreeData {
    let entries = vec![
        TreeEntry::new(
            "f",
            "file_category.dart",
            "/repo/lib/src/features/scan/models/file_category.dart",
        ),
        TreeEntry::new(
            "s",
            "markdown_builder.dart",
            "/repo/lib/src/features/scan/services/markdown_builder.dart",
        ),
        TreeEntry::new("d", "scan.dart", "/repo/lib/src/features/scan/scan.dart"),
    ];
    let options = BuildOptions {
        strip_prefixes: vec!["/repo".to_string()],
        omit_container_row_at_root: omit_container,
        auto_pick_visible_root: false,
        ..BuildOptions::default()
    };
    TreeBuilder::new(entries).with_options(options).build().unwrap()
}

fn all_folder_ids(data: &TreeData) -> HashSet<String> {
    data.nodes
        .values()
        .filter(|n| n.is_folder_like())
        .map(|n| n.id.clone())
        .collect()
}

#[test]
fn fully_expanded_flatten_is_depth_first_with_graph_depths() {
    let data = scan_tree(false);
    let rows = flatten(&data, &all_folder_ids(&data), None);
    let listing: Vec<(usize, &str)> = rows.iter().map(|r| (r.depth, r.name.as_str())).collect();
    assert_eq!(
        listing,
        vec![
            (0, "tree"),
            (1, "scan"),
            (2, "models"),
            (3, "file_category.dart"),
            (2, "services"),
            (3, "markdown_builder.dart"),
            (2, "scan.dart"),
        ]
    );
}

#[test]
fn collapsed_folders_cut_the_walk() {
    let data = scan_tree(false);
    // Only the container expanded: its single child shows, nothing below.
    let expanded: HashSet<String> = [data.visible_root_id.clone()].into_iter().collect();
    let rows = flatten(&data, &expanded, None);
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["tree", "scan"]);
    // has_children reflects the graph, not the expansion state.
    assert!(rows[1].has_children);
}

#[test]
fn filter_match_surfaces_collapsed_ancestors() {
    let data = scan_tree(false);
    let rows = flatten(&data, &HashSet::new(), Some("markdown"));
    let listing: Vec<(usize, &str)> = rows.iter().map(|r| (r.depth, r.name.as_str())).collect();
    assert_eq!(
        listing,
        vec![
            (0, "tree"),
            (1, "scan"),
            (2, "services"),
            (3, "markdown_builder.dart"),
        ]
    );
}

#[test]
fn extension_filter_reaches_every_match() {
    let data = scan_tree(false);
    let rows = flatten(&data, &HashSet::new(), Some("ext:dart"));
    let files: Vec<&str> = rows
        .iter()
        .filter(|r| r.kind == NodeKind::File)
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(
        files,
        vec!["file_category.dart", "markdown_builder.dart", "scan.dart"]
    );
}

#[test]
fn negated_filter_excludes_matches() {
    let data = scan_tree(false);
    let rows = flatten(&data, &all_folder_ids(&data), Some("ext:dart !markdown"));
    let files: Vec<&str> = rows
        .iter()
        .filter(|r| r.kind == NodeKind::File)
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(files, vec!["file_category.dart", "scan.dart"]);
}

#[test]
fn omitted_container_emits_children_at_depth_zero() {
    let data = scan_tree(true);
    let rows = flatten(&data, &all_folder_ids(&data), None);
    assert!(rows.iter().all(|r| r.kind != NodeKind::Root));
    assert!(rows.iter().all(|r| r.id != data.visible_root_id));
    assert_eq!(rows[0].depth, 0);
    assert_eq!(rows[0].name, "scan");
}

#[test]
fn sort_delegate_overrides_stored_order() {
    let entries = vec![
        TreeEntry::new("z", "z.rs", "/pkg/z.rs"),
        TreeEntry::new("a", "a.rs", "/pkg/a.rs"),
    ];
    let options = BuildOptions {
        sort_children_by_name: false,
        auto_pick_visible_root: false,
        ..BuildOptions::default()
    };
    let data = TreeBuilder::new(entries).with_options(options).build().unwrap();
    let expanded = all_folder_ids(&data);

    let stored: Vec<String> = flatten(&data, &expanded, None)
        .iter()
        .filter(|r| r.kind == NodeKind::File)
        .map(|r| r.name.clone())
        .collect();
    assert_eq!(stored, vec!["z.rs", "a.rs"]);

    let delegate = AlphabeticalSortDelegate;
    let sorted: Vec<String> = flatten_with(&data, &expanded, None, Some(&delegate))
        .iter()
        .filter(|r| r.kind == NodeKind::File)
        .map(|r| r.name.clone())
        .collect();
    assert_eq!(sorted, vec!["a.rs", "z.rs"]);
}

#[test]
fn rows_carry_renderer_fields() {
    let data = scan_tree(false);
    let rows = flatten(&data, &all_folder_ids(&data), None);
    let file = rows
        .iter()
        .find(|r| r.name == "scan.dart")
        .expect("file row present");
    assert_eq!(file.kind, NodeKind::File);
    assert_eq!(file.entry_id.as_deref(), Some("d"));
    assert_eq!(
        file.source_path.as_deref(),
        Some("/lib/src/features/scan/scan.dart")
    );
    assert!(!file.has_children);
    assert!(file.virtual_path.ends_with("/scan.dart"));
}
