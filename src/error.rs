//! Error types.
//!
//! The core defines no recoverable error kinds: every input is normalized
//! rather than rejected. The only failure a build can surface is a broken
//! internal invariant, which is a programmer error in the caller or in the
//! builder itself.

use thiserror::Error;

/// Errors raised by tree construction.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A structural invariant of the tree was violated (e.g. a folder name
    /// containing a path separator, or a child/parent link mismatch found
    /// by the debug-build verification pass).
    #[error("tree invariant violation: {0}")]
    InvariantViolation(String),
}
