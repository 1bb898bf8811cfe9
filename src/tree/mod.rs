//! Directory tree of a test suite with per-node selection.
//!
//! The tree is two levels deep below a synthetic root: the entries of the
//! test directory and their immediate subdirectories.

mod builder;
mod dir_node;

pub use builder::TreeBuildError;
pub use dir_node::DirNode;
