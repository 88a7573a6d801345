//! An immutable, bulk-loaded RTree over 2D points.
//!
//! Build a tree with [`RTreeBuilder`], then query it through [`RTreeIndex`]:
//! [`within_distance`][RTreeIndex::within_distance] for every point inside a radius and
//! [`knn`][RTreeIndex::knn] / [`neighbors`][RTreeIndex::neighbors] for points in order of
//! distance.

pub mod builder;
pub mod index;
pub mod sort;
pub mod r#trait;
pub mod traversal;
pub(crate) mod util;

pub use builder::{RTreeBuilder, DEFAULT_RTREE_NODE_SIZE};
pub use index::{NodeId, RTree, RTreeMetadata, TreeNode};
pub use r#trait::RTreeIndex;
pub use sort::{HilbertSort, STRSort};
pub use traversal::Node;
