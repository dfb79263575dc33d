//! Input entries and their normalization.

use crate::paths::{self, UnicodeNormalizer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key hinting where a virtual entry should be placed.
pub const VIRTUAL_PARENT_KEY: &str = "virtualParent";

/// One input entry: a real file path or a virtual item.
///
/// `id` is caller-stable and becomes the file node's `entry_id`; `full_path`
/// is raw and may use any OS's separators. Metadata rides along untouched
/// except for the `virtualParent` placement hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub id: String,
    pub name: String,
    pub full_path: String,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl TreeEntry {
    /// A real file entry.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        full_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            full_path: full_path.into(),
            is_virtual: false,
            metadata: HashMap::new(),
        }
    }

    /// A virtual entry with no backing filesystem path.
    pub fn virtual_entry(
        id: impl Into<String>,
        name: impl Into<String>,
        full_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            full_path: full_path.into(),
            is_virtual: true,
            metadata: HashMap::new(),
        }
    }

    /// Attach a `virtualParent` placement hint.
    pub fn with_virtual_parent(mut self, parent: impl Into<String>) -> Self {
        self.metadata.insert(
            VIRTUAL_PARENT_KEY.to_string(),
            serde_json::Value::String(parent.into()),
        );
        self
    }

    /// The `virtualParent` hint, when present and a string.
    pub fn virtual_parent(&self) -> Option<&str> {
        self.metadata
            .get(VIRTUAL_PARENT_KEY)
            .and_then(|v| v.as_str())
    }
}

/// A real entry that survived normalization, keyed back to the input slice.
#[derive(Debug, Clone)]
pub struct NormalizedEntry {
    /// Index into the caller's entry list.
    pub index: usize,
    /// Canonical form of the entry's `full_path`.
    pub canonical: String,
}

/// Canonicalize real entries and drop exact path duplicates under the case
/// policy. The first occurrence of a path wins; virtual entries are not
/// path-addressed and are left for the placement phase.
pub fn normalize_real_entries(
    entries: &[TreeEntry],
    case_insensitive: bool,
    unicode_normalize: Option<UnicodeNormalizer>,
) -> Vec<NormalizedEntry> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        if entry.is_virtual {
            continue;
        }
        let canonical = paths::canonicalize(&entry.full_path, unicode_normalize);
        if seen.insert(paths::fold(&canonical, case_insensitive)) {
            out.push(NormalizedEntry { index, canonical });
        }
    }
    out
}
