//! Tree model and construction.

pub mod builder;
pub mod ident;
pub mod node;

pub use builder::TreeBuilder;
pub use node::{TreeData, TreeNode, VisibleNode};
