use geo_traits::CoordTrait;

use crate::error::{IndexError, Result};
use crate::geometry::{Point, Rect};
use crate::r#type::IndexableNum;
use crate::rtree::index::{NodeId, RTree, RTreeMetadata, TreeNode};
use crate::rtree::sort::{Sort, SortEntry, SortParams};

/// The default node size used by [`RTreeBuilder::new`]
pub const DEFAULT_RTREE_NODE_SIZE: u16 = 16;

/// A builder to create an [`RTree`].
///
/// ```
/// use point_index::rtree::{RTreeBuilder, RTreeIndex, STRSort};
///
/// let mut builder = RTreeBuilder::<f64>::new(3);
/// builder.add(0., 0.);
/// builder.add(1., 1.);
/// builder.add(2., 2.);
/// let tree = builder.finish::<STRSort>().unwrap();
/// assert_eq!(tree.num_items(), 3);
/// ```
pub struct RTreeBuilder<N: IndexableNum> {
    points: Vec<Point<N>>,
    metadata: RTreeMetadata,
    bounds: Rect<N>,
}

impl<N: IndexableNum> RTreeBuilder<N> {
    /// Create a new builder with the provided number of items and the default node size.
    pub fn new(num_items: u32) -> Self {
        let metadata =
            RTreeMetadata::new_unchecked(num_items as usize, DEFAULT_RTREE_NODE_SIZE as usize);
        Self::from_metadata(metadata)
    }

    /// Create a new builder with the provided number of items and node size.
    ///
    /// Fails with [`IndexError::InvalidArgument`] when `node_size < 2`.
    pub fn new_with_node_size(num_items: u32, node_size: u16) -> Result<Self> {
        let metadata = RTreeMetadata::try_new(num_items, node_size)?;
        Ok(Self::from_metadata(metadata))
    }

    /// Create a new builder with the provided metadata
    pub fn from_metadata(metadata: RTreeMetadata) -> Self {
        Self {
            points: Vec::with_capacity(metadata.num_items() as usize),
            metadata,
            bounds: Rect::empty(),
        }
    }

    /// Access the underlying [RTreeMetadata] of this instance.
    pub fn metadata(&self) -> &RTreeMetadata {
        &self.metadata
    }

    /// Add a point to the RTree.
    ///
    /// This returns the insertion index, which provides a lookup back into the original data.
    /// Every query returns this same insertion index. Coordinates are validated in
    /// [`finish`][Self::finish].
    #[inline]
    pub fn add(&mut self, x: N, y: N) -> u32 {
        let index = self.points.len() as u32;
        self.points.push(Point::new(x, y, index));
        self.bounds.expand_to_point(x, y);
        index
    }

    /// Add a point to the RTree from any coordinate.
    #[inline]
    pub fn add_coord(&mut self, coord: &impl CoordTrait<T = N>) -> u32 {
        self.add(coord.x(), coord.y())
    }

    /// Add points from an interleaved `[x0, y0, x1, y1, ...]` buffer.
    ///
    /// Returns the insertion indices of the added points.
    pub fn add_interleaved(&mut self, coords: &[N]) -> Result<Vec<u32>> {
        let pairs: &[[N; 2]] = bytemuck::try_cast_slice(coords).map_err(|_| {
            IndexError::InvalidInput(format!(
                "Interleaved coordinates must have an even length, got {}.",
                coords.len()
            ))
        })?;
        Ok(pairs.iter().map(|[x, y]| self.add(*x, *y)).collect())
    }

    /// Consume this builder, packing the points and generating an RTree ready for queries.
    ///
    /// [`STRSort`] and [`HilbertSort`] both implement [`Sort`], allowing you to choose the method
    /// used.
    ///
    /// Fails with [`IndexError::InvalidInput`] if the number of added points differs from the
    /// number announced to the builder or if any coordinate is NaN or infinite.
    ///
    /// [`HilbertSort`]: crate::rtree::sort::HilbertSort
    /// [`STRSort`]: crate::rtree::sort::STRSort
    pub fn finish<S: Sort<N>>(self) -> Result<RTree<N>> {
        let num_items = self.metadata.num_items() as usize;
        if self.points.len() != num_items {
            return Err(IndexError::InvalidInput(format!(
                "Added {} items when expected {}.",
                self.points.len(),
                num_items
            )));
        }
        if let Some(p) = self
            .points
            .iter()
            .find(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(IndexError::InvalidInput(format!(
                "Non-finite coordinate ({:?}, {:?}) for item {}.",
                p.x, p.y, p.id
            )));
        }

        let node_size = self.metadata.node_size() as usize;
        let mut nodes = Vec::with_capacity(self.metadata.num_nodes());

        if num_items <= node_size {
            // only one node, skip sorting and just fill the root leaf
            nodes.push(TreeNode::Leaf {
                rect: self.bounds,
                points: self.points,
            });
            return Ok(Self::tree_from_parts(nodes, self.metadata));
        }

        let params = SortParams::new(node_size, self.bounds);

        // pack the leaves
        let mut points = self.points;
        let group_sizes = S::sort(&params, &mut points);
        let mut level = Vec::with_capacity(group_sizes.len());
        let mut remaining = points.into_iter();
        for size in group_sizes {
            let points: Vec<Point<N>> = remaining.by_ref().take(size).collect();
            let rect = points.iter().fold(Rect::empty(), |mut rect, p| {
                rect.expand_to_point(p.x, p.y);
                rect
            });
            level.push(LevelEntry {
                rect,
                id: nodes.len(),
            });
            nodes.push(TreeNode::Leaf { rect, points });
        }

        // generate nodes at each tree level, bottom-up
        while level.len() > 1 {
            let group_sizes = S::sort(&params, &mut level);
            let mut next_level = Vec::with_capacity(group_sizes.len());
            let mut remaining = level.into_iter();
            for size in group_sizes {
                let children: Vec<(Rect<N>, NodeId)> = remaining
                    .by_ref()
                    .take(size)
                    .map(|entry| (entry.rect, entry.id))
                    .collect();
                let rect = children
                    .iter()
                    .fold(Rect::empty(), |rect, (child, _)| rect.union(child));
                next_level.push(LevelEntry {
                    rect,
                    id: nodes.len(),
                });
                nodes.push(TreeNode::Internal { rect, children });
            }
            level = next_level;
        }

        log::debug!(
            "Packed {} points into {} nodes (node size {}, height {}) with {}",
            num_items,
            nodes.len(),
            node_size,
            self.metadata.height(),
            std::any::type_name::<S>()
        );
        Ok(Self::tree_from_parts(nodes, self.metadata))
    }

    fn tree_from_parts(nodes: Vec<TreeNode<N>>, metadata: RTreeMetadata) -> RTree<N> {
        debug_assert_eq!(nodes.len(), metadata.num_nodes());
        RTree {
            root: nodes.len() - 1,
            nodes,
            metadata,
        }
    }
}

/// A packed node waiting to be grouped into the level above it.
struct LevelEntry<N: IndexableNum> {
    rect: Rect<N>,
    id: NodeId,
}

impl<N: IndexableNum> SortEntry<N> for LevelEntry<N> {
    #[inline]
    fn center(&self) -> (N, N) {
        self.rect.center()
    }
}
