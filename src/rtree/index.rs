use crate::error::{IndexError, Result};
use crate::geometry::{Point, Rect};
use crate::r#type::IndexableNum;
use crate::rtree::util::compute_level_sizes;

/// Position of a node in the [`RTree`] node arena.
pub type NodeId = usize;

/// One node of the tree.
///
/// Each node is referenced by exactly one parent. Internal nodes keep a copy of each child's
/// rectangle next to the child's id, so that pruning never has to load the child itself.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode<N: IndexableNum> {
    /// A bottom-level node holding indexed points.
    Leaf {
        rect: Rect<N>,
        points: Vec<Point<N>>,
    },
    /// An intermediate node holding `(child_rect, child)` pairs.
    Internal {
        rect: Rect<N>,
        children: Vec<(Rect<N>, NodeId)>,
    },
}

impl<N: IndexableNum> TreeNode<N> {
    /// The tight bounding rectangle of everything below this node.
    #[inline]
    pub fn rect(&self) -> &Rect<N> {
        match self {
            Self::Leaf { rect, .. } => rect,
            Self::Internal { rect, .. } => rect,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Number of points or children in this node.
    pub fn len(&self) -> usize {
        match self {
            Self::Leaf { points, .. } => points.len(),
            Self::Internal { children, .. } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Common metadata to describe a tree
#[derive(Debug, Clone, PartialEq)]
pub struct RTreeMetadata {
    node_size: usize,
    num_items: usize,
    /// Number of nodes at each level, from the leaves up to the root.
    level_sizes: Vec<usize>,
}

impl RTreeMetadata {
    /// Create metadata for a tree of `num_items` points with at most `node_size` entries per
    /// node.
    pub fn try_new(num_items: u32, node_size: u16) -> Result<Self> {
        if node_size < 2 {
            return Err(IndexError::InvalidArgument(format!(
                "Node size must be at least 2, got {}.",
                node_size
            )));
        }
        Ok(Self::new_unchecked(num_items as usize, node_size as usize))
    }

    pub(crate) fn new_unchecked(num_items: usize, node_size: usize) -> Self {
        debug_assert!(node_size >= 2);
        Self {
            node_size,
            num_items,
            level_sizes: compute_level_sizes(num_items, node_size),
        }
    }

    /// The maximum number of entries in each node.
    pub fn node_size(&self) -> u16 {
        self.node_size as u16
    }

    /// The minimum number of entries in each non-root node.
    pub fn min_node_size(&self) -> usize {
        self.node_size / 2
    }

    pub fn num_items(&self) -> u32 {
        self.num_items as u32
    }

    /// The total number of nodes, including both leaf and intermediate nodes.
    pub fn num_nodes(&self) -> usize {
        self.level_sizes.iter().sum()
    }

    /// Number of nodes at each level. Index 0 is the leaf level; the last level is the root.
    pub fn level_sizes(&self) -> &[usize] {
        &self.level_sizes
    }

    /// Number of levels in the tree. A tree whose root is a leaf has height 1.
    pub fn height(&self) -> usize {
        self.level_sizes.len()
    }
}

/// An immutable, bulk-loaded RTree over points.
///
/// Usually this will be created via [`RTreeBuilder`][crate::rtree::RTreeBuilder]. Nodes live in
/// a flat arena and are laid out bottom-up: all leaves come first and the root is last.
#[derive(Debug, Clone, PartialEq)]
pub struct RTree<N: IndexableNum> {
    pub(crate) nodes: Vec<TreeNode<N>>,
    pub(crate) root: NodeId,
    pub(crate) metadata: RTreeMetadata,
}

impl<N: IndexableNum> RTree<N> {
    /// Consume the tree, returning every indexed point in insertion order.
    pub fn into_points(self) -> Vec<Point<N>> {
        let mut points = Vec::with_capacity(self.metadata.num_items);
        for node in self.nodes {
            if let TreeNode::Leaf { points: leaf, .. } = node {
                points.extend(leaf);
            }
        }
        points.sort_by_key(|p| p.id);
        points
    }
}
