//! Arbor: Deterministic Virtual Directory Trees
//!
//! A pure, in-memory engine that converts a flat list of file entries
//! (real and virtual) plus directory hints into a normalized, immutable
//! tree graph. Identical inputs always reproduce identical node IDs,
//! structure, and ordering, so UI state keyed on node IDs survives
//! rebuilds. Flattening and list diffing make the output directly usable
//! by row-based renderers.

pub mod anchors;
pub mod config;
pub mod diff;
pub mod entry;
pub mod error;
pub mod filter;
pub mod flatten;
pub mod logging;
pub mod paths;
pub mod sort;
pub mod tree;
pub mod types;
