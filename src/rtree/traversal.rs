//! Utilities to traverse the RTree structure.

use geo_traits::{Dimensions, RectTrait};

use crate::geometry::{Coord, Point, Rect};
use crate::r#type::IndexableNum;
use crate::rtree::index::{NodeId, TreeNode};
use crate::rtree::RTreeIndex;
use std::marker::PhantomData;

/// A node in the RTree.
#[derive(Debug, Clone)]
pub struct Node<'a, N: IndexableNum, T: RTreeIndex<N>> {
    /// The tree that this node is a reference onto
    tree: &'a T,

    /// Position of this node in the tree's node arena.
    id: NodeId,

    phantom: PhantomData<N>,
}

impl<'a, N: IndexableNum, T: RTreeIndex<N>> Node<'a, N, T> {
    fn new(tree: &'a T, id: NodeId) -> Self {
        Self {
            tree,
            id,
            phantom: PhantomData,
        }
    }

    pub(crate) fn from_root(tree: &'a T) -> Self {
        Self::new(tree, tree.root_id())
    }

    #[inline]
    fn data(&self) -> &'a TreeNode<N> {
        &self.tree.nodes()[self.id]
    }

    /// Position of this node in [RTreeIndex::nodes].
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tight bounding rectangle of everything below this node.
    pub fn rect(&self) -> &'a Rect<N> {
        self.data().rect()
    }

    /// Get the minimum `x` value of this node.
    pub fn min_x(&self) -> N {
        self.rect().min_x
    }

    /// Get the minimum `y` value of this node.
    pub fn min_y(&self) -> N {
        self.rect().min_y
    }

    /// Get the maximum `x` value of this node.
    pub fn max_x(&self) -> N {
        self.rect().max_x
    }

    /// Get the maximum `y` value of this node.
    pub fn max_y(&self) -> N {
        self.rect().max_y
    }

    /// Returns `true` if this is a leaf node holding points.
    pub fn is_leaf(&self) -> bool {
        self.data().is_leaf()
    }

    /// Returns `true` if this is an intermediate node with children.
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// Number of points (for a leaf) or children (for a parent) in this node.
    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the child nodes of this node. Leaves have no children.
    pub fn children(&self) -> impl Iterator<Item = Node<'a, N, T>> + 'a {
        let tree = self.tree;
        let children: &'a [(Rect<N>, NodeId)] = match self.data() {
            TreeNode::Internal { children, .. } => children,
            TreeNode::Leaf { .. } => &[],
        };
        children.iter().map(move |(_, id)| Node::new(tree, *id))
    }

    /// The points stored in this node. Parents hold no points directly.
    pub fn points(&self) -> &'a [Point<N>] {
        match self.data() {
            TreeNode::Leaf { points, .. } => points,
            TreeNode::Internal { .. } => &[],
        }
    }
}

impl<N: IndexableNum, T: RTreeIndex<N>> RectTrait for Node<'_, N, T> {
    type T = N;
    type CoordType<'a>
        = Coord<N>
    where
        Self: 'a;

    fn dim(&self) -> Dimensions {
        Dimensions::Xy
    }

    fn min(&self) -> Self::CoordType<'_> {
        self.rect().min()
    }

    fn max(&self) -> Self::CoordType<'_> {
        self.rect().max()
    }
}
