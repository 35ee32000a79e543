// Hierarchy reconstruction: indentation-driven tree building over positioned
// elements, plus the arena tree it produces.

pub mod builder;
pub mod render;
pub mod tree;

pub use builder::HierarchyBuilder;
pub use tree::{HierarchyNode, HierarchyTree, NodeId, ROOT};
