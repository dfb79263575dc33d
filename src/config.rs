//! Build configuration.
//!
//! Every knob of the build API as one serde-friendly options struct, so a
//! host can embed tree options in its own configuration files. Defaults
//! match the documented behavior of each option.

use serde::{Deserialize, Serialize};

/// Options accepted by a tree build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Legacy source roots; the whole anchor universe when
    /// `auto_compute_anchors` is off.
    #[serde(default)]
    pub source_roots: Vec<String>,

    /// Directories the user named directly. Always materialized, even when
    /// empty of files, and marked `Origin::Direct`.
    #[serde(default)]
    pub selected_directories: Vec<String>,

    /// Display label of the container folder under the root.
    #[serde(default = "default_root_folder_label")]
    pub root_folder_label: String,

    /// Initial expansion state baked into created folders.
    #[serde(default = "default_true")]
    pub expand_folders_by_default: bool,

    /// Initial selection state baked into created files.
    #[serde(default = "default_true")]
    pub select_new_files_by_default: bool,

    /// Invert anchor compression: the deepest of mutually-ancestral
    /// candidates survives instead of the shallowest.
    #[serde(default)]
    pub prefer_deepest_root: bool,

    /// Reorder every folder's children: folders before files,
    /// case-insensitive by name, ID tie-break.
    #[serde(default = "default_true")]
    pub sort_children_by_name: bool,

    /// Path prefixes removed from display `source_path` values.
    #[serde(default)]
    pub strip_prefixes: Vec<String>,

    /// Hoist the visible root past single-folder chains.
    #[serde(default = "default_true")]
    pub auto_pick_visible_root: bool,

    /// Maximum hoisting depth; `None` means unlimited.
    #[serde(default = "default_hoist_levels")]
    pub visible_root_max_hoist_levels: Option<u32>,

    /// Ignore virtual files when deciding whether a folder is hoistable.
    #[serde(default = "default_true")]
    pub visible_root_ignore_virtual_files: bool,

    /// Let virtual folders adopt same-named real siblings and vice versa.
    #[serde(default = "default_true")]
    pub merge_virtual_into_real_folders: bool,

    /// Compare paths case-insensitively.
    #[serde(default = "default_true")]
    pub case_insensitive_paths: bool,

    /// Derive anchors from file parents and selected directories; when off,
    /// only `source_roots` seed the universe.
    #[serde(default = "default_true")]
    pub auto_compute_anchors: bool,

    /// Emit the visible root's children at depth 0 instead of the visible
    /// root itself.
    #[serde(default)]
    pub omit_container_row_at_root: bool,
}

fn default_root_folder_label() -> String {
    "tree".to_string()
}

fn default_true() -> bool {
    true
}

fn default_hoist_levels() -> Option<u32> {
    Some(2)
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            source_roots: Vec::new(),
            selected_directories: Vec::new(),
            root_folder_label: default_root_folder_label(),
            expand_folders_by_default: default_true(),
            select_new_files_by_default: default_true(),
            prefer_deepest_root: false,
            sort_children_by_name: default_true(),
            strip_prefixes: Vec::new(),
            auto_pick_visible_root: default_true(),
            visible_root_max_hoist_levels: default_hoist_levels(),
            visible_root_ignore_virtual_files: default_true(),
            merge_virtual_into_real_folders: default_true(),
            case_insensitive_paths: default_true(),
            auto_compute_anchors: default_true(),
            omit_container_row_at_root: false,
        }
    }
}
