//! Tree construction.
//!
//! `TreeBuilder` turns a flat entry list plus directory hints into one
//! immutable `TreeData`. The build is pure and deterministic: anchors are
//! processed shallowest-first, files in input order, and every node ID
//! derives from canonical inputs alone, so identical inputs reproduce the
//! graph exactly.

use crate::anchors;
use crate::config::BuildOptions;
use crate::entry::{normalize_real_entries, NormalizedEntry, TreeEntry};
use crate::error::TreeError;
use crate::paths::{self, PrefixStripper, UnicodeNormalizer};
use crate::sort::compare_children;
use crate::tree::ident::{self, CONTAINER_ID, ROOT_ID};
use crate::tree::node::{TreeData, TreeNode};
use crate::types::{NodeId, NodeKind, Origin};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Builds a virtual directory tree from caller-supplied entries.
pub struct TreeBuilder {
    entries: Vec<TreeEntry>,
    options: BuildOptions,
    unicode_normalize: Option<UnicodeNormalizer>,
}

impl TreeBuilder {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self {
            entries,
            options: BuildOptions::default(),
            unicode_normalize: None,
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Install a Unicode normalization hook (typically NFC) applied during
    /// path canonicalization.
    pub fn with_unicode_normalizer(mut self, normalize: UnicodeNormalizer) -> Self {
        self.unicode_normalize = Some(normalize);
        self
    }

    /// Run the full pipeline and return the built tree.
    pub fn build(self) -> Result<TreeData, TreeError> {
        let TreeBuilder {
            entries,
            options,
            unicode_normalize,
        } = self;
        let ci = options.case_insensitive_paths;

        let normalized = normalize_real_entries(&entries, ci, unicode_normalize);
        let selected: Vec<String> = options
            .selected_directories
            .iter()
            .map(|d| paths::canonicalize(d, unicode_normalize))
            .collect();
        let roots: Vec<String> = options
            .source_roots
            .iter()
            .map(|r| paths::canonicalize(r, unicode_normalize))
            .collect();

        let universe =
            anchors::anchor_universe(&normalized, &selected, &roots, options.auto_compute_anchors);
        let tops = anchors::compress_anchors(&universe, ci, options.prefer_deepest_root);
        let groups = anchors::group_by_anchor(&tops, &normalized, ci);
        let anchor_paths: Vec<String> = groups.iter().map(|g| g.anchor.clone()).collect();
        let labels = ident::unique_root_labels(&anchor_paths, ci);

        let mut state = BuildState {
            nodes: HashMap::new(),
            canonical_by_node: HashMap::new(),
            anchor_nodes: Vec::new(),
            selected_keys: selected.iter().map(|s| paths::fold(s, ci)).collect(),
            stripper: PrefixStripper::new(&options.strip_prefixes, ci, unicode_normalize),
            options: &options,
        };

        state.create_scaffold();
        for (group, label) in groups.iter().zip(&labels) {
            let anchor_node = state.create_top_anchor(&group.anchor, label)?;
            for file in &group.entries {
                state.place_file(&group.anchor, &anchor_node, file, &entries)?;
            }
        }
        state.materialize_selected_directories(&selected)?;
        state.place_virtual_entries(&entries)?;

        if options.sort_children_by_name {
            state.sort_children();
        }
        let visible_root_id = state.pick_visible_root();
        debug!(
            nodes = state.nodes.len(),
            visible_root = %visible_root_id,
            "tree built"
        );

        let data = TreeData {
            nodes: state.nodes,
            root_id: ROOT_ID.to_string(),
            visible_root_id,
            omit_container_row_at_root: options.omit_container_row_at_root,
        };
        if cfg!(debug_assertions) {
            data.verify_invariants()?;
        }
        Ok(data)
    }
}

/// Mutable working set of one build.
struct BuildState<'a> {
    nodes: HashMap<NodeId, TreeNode>,
    /// Remembered canonical source path per folder; drives merge decisions.
    canonical_by_node: HashMap<NodeId, String>,
    /// Top anchors in creation order (shallowest first), with their nodes.
    anchor_nodes: Vec<(String, NodeId)>,
    /// Case-folded canonical selected directories.
    selected_keys: HashSet<String>,
    stripper: PrefixStripper,
    options: &'a BuildOptions,
}

/// One find-or-create request; mirrors the merge-policy contract.
struct FolderRequest<'a> {
    parent_id: &'a str,
    name: &'a str,
    source_path: Option<String>,
    canonical_source_path: Option<String>,
    forced_id: Option<NodeId>,
    expanded: bool,
    origin: Origin,
    is_virtual: bool,
}

impl<'a> BuildState<'a> {
    fn ci(&self) -> bool {
        self.options.case_insensitive_paths
    }

    fn create_scaffold(&mut self) {
        let label = &self.options.root_folder_label;
        let root = TreeNode {
            id: ROOT_ID.to_string(),
            name: String::new(),
            kind: NodeKind::Root,
            parent_id: String::new(),
            child_ids: vec![CONTAINER_ID.to_string()],
            virtual_path: "/".to_string(),
            source_path: None,
            entry_id: None,
            is_virtual: false,
            is_expanded: true,
            is_selected: false,
            origin: Origin::None,
        };
        let container = TreeNode {
            id: CONTAINER_ID.to_string(),
            name: label.clone(),
            kind: NodeKind::Folder,
            parent_id: ROOT_ID.to_string(),
            child_ids: Vec::new(),
            virtual_path: format!("/{}", label),
            source_path: None,
            entry_id: None,
            is_virtual: false,
            is_expanded: self.options.expand_folders_by_default,
            is_selected: false,
            origin: Origin::None,
        };
        self.nodes.insert(root.id.clone(), root);
        self.nodes.insert(container.id.clone(), container);
    }

    fn create_top_anchor(&mut self, anchor: &str, label: &str) -> Result<NodeId, TreeError> {
        let origin = if self.selected_keys.contains(&paths::fold(anchor, self.ci())) {
            Origin::Direct
        } else {
            Origin::Inferred
        };
        let id = self.find_or_create_folder(FolderRequest {
            parent_id: CONTAINER_ID,
            name: label,
            source_path: Some(self.stripper.strip(anchor)),
            canonical_source_path: Some(anchor.to_string()),
            forced_id: Some(ident::top_anchor_folder_id(anchor)),
            expanded: self.options.expand_folders_by_default,
            origin,
            is_virtual: false,
        })?;
        self.anchor_nodes.push((anchor.to_string(), id.clone()));
        Ok(id)
    }

    /// Place one real file below its governing anchor, creating interior
    /// folders as needed.
    fn place_file(
        &mut self,
        anchor: &str,
        anchor_node: &str,
        file: &NormalizedEntry,
        entries: &[TreeEntry],
    ) -> Result<(), TreeError> {
        let entry = &entries[file.index];
        let file_id = ident::file_node_id(&entry.id);
        if self.nodes.contains_key(&file_id) {
            trace!(entry = %entry.id, "duplicate entry id, skipping");
            return Ok(());
        }

        let segments = paths::relative_segments(anchor, &file.canonical);
        let interior = segments.len().saturating_sub(1);
        let mut parent = anchor_node.to_string();
        let mut canonical = anchor.to_string();
        for segment in &segments[..interior] {
            canonical = join_canonical(&canonical, segment);
            parent = self.find_or_create_folder(FolderRequest {
                parent_id: &parent.clone(),
                name: segment,
                source_path: Some(self.stripper.strip(&canonical)),
                canonical_source_path: Some(canonical.clone()),
                forced_id: None,
                expanded: self.options.expand_folders_by_default,
                origin: Origin::Inferred,
                is_virtual: false,
            })?;
        }

        trace!(entry = %entry.id, path = %file.canonical, "placing file");
        self.create_file_node(&file_id, entry, &parent, Some(self.stripper.strip(&file.canonical)), false);
        Ok(())
    }

    /// Guarantee every directly selected directory exists with
    /// `Origin::Direct`, even when no file lives under it.
    fn materialize_selected_directories(&mut self, selected: &[String]) -> Result<(), TreeError> {
        for directory in selected {
            let key = paths::fold(directory, self.ci());
            if self
                .anchor_nodes
                .iter()
                .any(|(anchor, _)| paths::fold(anchor, self.ci()) == key)
            {
                // Already a top anchor; marked direct on creation.
                continue;
            }
            match self.governing_anchor(directory) {
                Some((anchor, anchor_node)) => {
                    let segments = paths::relative_segments(&anchor, directory);
                    let mut parent = anchor_node;
                    let mut canonical = anchor;
                    for (i, segment) in segments.iter().enumerate() {
                        canonical = join_canonical(&canonical, segment);
                        let origin = if i + 1 == segments.len() {
                            Origin::Direct
                        } else {
                            Origin::Inferred
                        };
                        parent = self.find_or_create_folder(FolderRequest {
                            parent_id: &parent.clone(),
                            name: segment,
                            source_path: Some(self.stripper.strip(&canonical)),
                            canonical_source_path: Some(canonical.clone()),
                            forced_id: None,
                            expanded: self.options.expand_folders_by_default,
                            origin,
                            is_virtual: false,
                        })?;
                    }
                }
                None => {
                    // Reduced universe (no auto anchors): surface the
                    // selection as its own top-level folder.
                    let label = paths::base_name(directory).to_string();
                    let id = self.find_or_create_folder(FolderRequest {
                        parent_id: CONTAINER_ID,
                        name: &label,
                        source_path: Some(self.stripper.strip(directory)),
                        canonical_source_path: Some(directory.clone()),
                        forced_id: Some(ident::top_anchor_folder_id(directory)),
                        expanded: self.options.expand_folders_by_default,
                        origin: Origin::Direct,
                        is_virtual: false,
                    })?;
                    self.anchor_nodes.push((directory.clone(), id));
                }
            }
        }
        Ok(())
    }

    /// Place virtual entries using their `virtualParent` hint.
    fn place_virtual_entries(&mut self, entries: &[TreeEntry]) -> Result<(), TreeError> {
        for entry in entries.iter().filter(|e| e.is_virtual) {
            let file_id = ident::file_node_id(&entry.id);
            if self.nodes.contains_key(&file_id) {
                trace!(entry = %entry.id, "duplicate entry id, skipping");
                continue;
            }

            let hint = entry.virtual_parent().map(str::trim).unwrap_or("");
            let parent = if hint.is_empty() {
                CONTAINER_ID.to_string()
            } else {
                let hint_path = normalize_hint(hint);
                match self.governing_anchor(&hint_path) {
                    Some((anchor, anchor_node)) => {
                        // The hint lands inside real space: reuse the real
                        // chain rather than growing a parallel virtual one.
                        let segments = paths::relative_segments(&anchor, &hint_path);
                        let mut parent = anchor_node;
                        let mut canonical = anchor;
                        for segment in &segments {
                            canonical = join_canonical(&canonical, segment);
                            parent = self.find_or_create_folder(FolderRequest {
                                parent_id: &parent.clone(),
                                name: segment,
                                source_path: Some(self.stripper.strip(&canonical)),
                                canonical_source_path: Some(canonical.clone()),
                                forced_id: None,
                                expanded: self.options.expand_folders_by_default,
                                origin: Origin::Inferred,
                                is_virtual: false,
                            })?;
                        }
                        parent
                    }
                    None => {
                        let mut parent = CONTAINER_ID.to_string();
                        for segment in paths::segments(&hint_path) {
                            parent = self.find_or_create_folder(FolderRequest {
                                parent_id: &parent.clone(),
                                name: segment,
                                source_path: None,
                                canonical_source_path: None,
                                forced_id: None,
                                expanded: self.options.expand_folders_by_default,
                                origin: Origin::None,
                                is_virtual: true,
                            })?;
                        }
                        parent
                    }
                }
            };

            trace!(entry = %entry.id, "placing virtual entry");
            self.create_file_node(&file_id, entry, &parent, None, true);
        }
        Ok(())
    }

    fn create_file_node(
        &mut self,
        file_id: &str,
        entry: &TreeEntry,
        parent_id: &str,
        source_path: Option<String>,
        is_virtual: bool,
    ) {
        let parent_vp = self
            .nodes
            .get(parent_id)
            .map(|p| p.virtual_path.clone())
            .unwrap_or_else(|| "/".to_string());
        let node = TreeNode {
            id: file_id.to_string(),
            name: entry.name.clone(),
            kind: NodeKind::File,
            parent_id: parent_id.to_string(),
            child_ids: Vec::new(),
            virtual_path: join_virtual(&parent_vp, &entry.name),
            source_path,
            entry_id: Some(entry.id.clone()),
            is_virtual,
            is_expanded: false,
            is_selected: self.options.select_new_files_by_default,
            origin: Origin::None,
        };
        self.nodes.insert(node.id.clone(), node);
        self.attach_child(parent_id, file_id);
    }

    /// First top anchor (shallowest) that is equal to or an ancestor of
    /// `path`, with its node ID.
    fn governing_anchor(&self, path: &str) -> Option<(String, NodeId)> {
        self.anchor_nodes
            .iter()
            .find(|(anchor, _)| paths::is_within(anchor, path, self.ci()))
            .cloned()
    }

    /// Resolve a folder under `parent_id`, merging with an existing node
    /// when the merge policy allows, creating it otherwise.
    fn find_or_create_folder(&mut self, req: FolderRequest<'_>) -> Result<NodeId, TreeError> {
        if req.name.contains('/') {
            return Err(TreeError::InvariantViolation(format!(
                "folder name contains a path separator: {}",
                req.name
            )));
        }
        let ci = self.ci();
        let merge_virtual = self.options.merge_virtual_into_real_folders;

        // Forced ID short-circuits everything else.
        if let Some(forced) = &req.forced_id {
            if self.nodes.contains_key(forced.as_str()) {
                let existing_kind = self.nodes[forced.as_str()].kind;
                if existing_kind != NodeKind::Folder {
                    return Err(TreeError::InvariantViolation(format!(
                        "forced id {} resolves to a non-folder node",
                        forced
                    )));
                }
                let old_parent = self.nodes[forced.as_str()].parent_id.clone();
                if old_parent != req.parent_id {
                    if let Some(previous) = self.nodes.get_mut(&old_parent) {
                        previous.child_ids.retain(|c| c != forced);
                    }
                }
                let node = self.nodes.get_mut(forced.as_str()).expect("checked above");
                node.name = req.name.to_string();
                if let Some(source) = &req.source_path {
                    if node.source_path.as_deref() != Some(source) {
                        node.source_path = Some(source.clone());
                    }
                }
                node.is_expanded = req.expanded;
                node.origin = node.origin.merge(req.origin);
                node.parent_id = req.parent_id.to_string();
                if let Some(canonical) = &req.canonical_source_path {
                    self.canonical_by_node
                        .entry(forced.clone())
                        .or_insert_with(|| canonical.clone());
                }
                self.attach_child(req.parent_id, forced);
                return Ok(forced.clone());
            }
        }

        // Merge into a same-named sibling when canonical paths agree.
        let siblings: Vec<NodeId> = self
            .nodes
            .get(req.parent_id)
            .map(|p| p.child_ids.clone())
            .unwrap_or_default();
        for sibling_id in siblings {
            let Some(sibling) = self.nodes.get(&sibling_id) else {
                continue;
            };
            if sibling.kind != NodeKind::Folder || sibling.name != req.name {
                continue;
            }
            let existing = self.canonical_by_node.get(&sibling_id).cloned();
            let (mergeable, adopt_incoming) = match (&req.canonical_source_path, &existing) {
                (None, None) => (true, false),
                (Some(incoming), Some(known)) => {
                    (paths::fold(incoming, ci) == paths::fold(known, ci), false)
                }
                // Virtual walk adopting a real folder.
                (None, Some(_)) => (merge_virtual, false),
                // Real walk adopting a previously virtual folder.
                (Some(_), None) => (merge_virtual, merge_virtual),
            };
            if !mergeable {
                continue;
            }
            let node = self.nodes.get_mut(&sibling_id).expect("sibling exists");
            if adopt_incoming {
                node.source_path = req.source_path.clone().or_else(|| node.source_path.clone());
                node.is_virtual = false;
                if let Some(incoming) = &req.canonical_source_path {
                    self.canonical_by_node
                        .insert(sibling_id.clone(), incoming.clone());
                }
            } else if node.source_path.is_none() {
                node.source_path = req.source_path.clone();
            }
            let node = self.nodes.get_mut(&sibling_id).expect("sibling exists");
            node.origin = node.origin.merge(req.origin);
            return Ok(sibling_id);
        }

        // Create.
        let parent_vp = self
            .nodes
            .get(req.parent_id)
            .map(|p| p.virtual_path.clone())
            .unwrap_or_else(|| "/".to_string());
        let virtual_path = join_virtual(&parent_vp, req.name);
        let id = req.forced_id.clone().unwrap_or_else(|| {
            match &req.canonical_source_path {
                Some(canonical) => ident::source_folder_id(canonical),
                None => ident::virtual_folder_id(&virtual_path),
            }
        });
        let node = TreeNode {
            id: id.clone(),
            name: req.name.to_string(),
            kind: NodeKind::Folder,
            parent_id: req.parent_id.to_string(),
            child_ids: Vec::new(),
            virtual_path,
            source_path: req.source_path.clone(),
            entry_id: None,
            is_virtual: req.is_virtual,
            is_expanded: req.expanded,
            is_selected: false,
            origin: req.origin,
        };
        if let Some(canonical) = &req.canonical_source_path {
            self.canonical_by_node.insert(id.clone(), canonical.clone());
        }
        self.nodes.insert(id.clone(), node);
        self.attach_child(req.parent_id, &id);
        Ok(id)
    }

    fn attach_child(&mut self, parent_id: &str, child_id: &str) {
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            if !parent.child_ids.iter().any(|c| c == child_id) {
                parent.child_ids.push(child_id.to_string());
            }
        }
    }

    /// Apply the stable comparator to every folder's children.
    fn sort_children(&mut self) {
        let folder_ids: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| n.is_folder_like())
            .map(|n| n.id.clone())
            .collect();
        for id in folder_ids {
            let mut children = self.nodes[&id].child_ids.clone();
            children.sort_by(|a, b| compare_children(&self.nodes[a], &self.nodes[b]));
            self.nodes.get_mut(&id).expect("folder exists").child_ids = children;
        }
    }

    /// Hoist past single-folder chains, starting at the container.
    fn pick_visible_root(&self) -> NodeId {
        if !self.options.auto_pick_visible_root {
            return CONTAINER_ID.to_string();
        }
        let ignore_virtual = self.options.visible_root_ignore_virtual_files;
        let mut current = CONTAINER_ID.to_string();
        let mut travelled = 0u32;
        loop {
            if let Some(max) = self.options.visible_root_max_hoist_levels {
                if travelled >= max {
                    break;
                }
            }
            let node = &self.nodes[&current];
            let mut only_folder: Option<&NodeId> = None;
            let mut folder_count = 0usize;
            let mut file_count = 0usize;
            for child_id in &node.child_ids {
                let child = &self.nodes[child_id];
                match child.kind {
                    NodeKind::Folder => {
                        folder_count += 1;
                        only_folder = Some(child_id);
                    }
                    NodeKind::File => {
                        if !(child.is_virtual && ignore_virtual) {
                            file_count += 1;
                        }
                    }
                    NodeKind::Root => {}
                }
            }
            match only_folder {
                Some(next) if folder_count == 1 && file_count == 0 => {
                    current = next.clone();
                    travelled += 1;
                }
                _ => break,
            }
        }
        debug!(visible_root = %current, levels = travelled, "visible root picked");
        current
    }
}

/// Normalize a `virtualParent` hint: backslashes become `/`, the path is
/// rooted, navigation segments resolve, empties drop.
fn normalize_hint(hint: &str) -> String {
    let replaced = hint.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in replaced.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn join_virtual(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

fn join_canonical(parent: &str, segment: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, segment)
    } else {
        format!("{}/{}", parent, segment)
    }
}
