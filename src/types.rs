//! Core types shared across the tree construction pipeline.

use serde::{Deserialize, Serialize};

/// NodeId: unique identifier of a node within one built tree.
///
/// Derived deterministically from canonical inputs (see `tree::ident`), so
/// identical builds yield identical IDs and UI state keyed on them survives
/// rebuilds.
pub type NodeId = String;

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// The single synthetic root of the graph.
    Root,
    /// A directory, real or virtual.
    Folder,
    /// A file leaf backed by an input entry.
    File,
}

/// How a folder came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Neither inferred from a file path nor named by the caller.
    None,
    /// Created on the way to a file or selected subdirectory.
    Inferred,
    /// Named by the caller in `selected_directories`.
    Direct,
}

impl Origin {
    /// Combine two origins: `Direct` dominates, then `Inferred`, then `None`.
    pub fn merge(self, other: Origin) -> Origin {
        match (self, other) {
            (Origin::Direct, _) | (_, Origin::Direct) => Origin::Direct,
            (Origin::Inferred, _) | (_, Origin::Inferred) => Origin::Inferred,
            _ => Origin::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_merge_direct_dominates() {
        assert_eq!(Origin::Direct.merge(Origin::None), Origin::Direct);
        assert_eq!(Origin::Inferred.merge(Origin::Direct), Origin::Direct);
    }

    #[test]
    fn test_origin_merge_inferred_over_none() {
        assert_eq!(Origin::None.merge(Origin::Inferred), Origin::Inferred);
        assert_eq!(Origin::None.merge(Origin::None), Origin::None);
    }
}
