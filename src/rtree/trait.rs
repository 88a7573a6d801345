use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use geo_traits::CoordTrait;
use tinyvec::TinyVec;

use crate::error::{IndexError, Result};
use crate::geometry::{Distance, Rect};
use crate::r#type::IndexableNum;
use crate::rtree::index::{NodeId, RTree, RTreeMetadata, TreeNode};
use crate::rtree::traversal::Node;

/// A trait for searching and accessing data out of an RTree.
pub trait RTreeIndex<N: IndexableNum>: Sized {
    /// All nodes of the tree, leaves first and the root last.
    fn nodes(&self) -> &[TreeNode<N>];

    /// Position of the root within [RTreeIndex::nodes].
    fn root_id(&self) -> NodeId;

    /// Access the metadata describing this RTree
    fn metadata(&self) -> &RTreeMetadata;

    /// The total number of items contained in this RTree.
    fn num_items(&self) -> u32 {
        self.metadata().num_items()
    }

    /// The total number of nodes in this RTree, including both leaf and intermediate nodes.
    fn num_nodes(&self) -> usize {
        self.nodes().len()
    }

    /// The maximum number of elements in each node.
    fn node_size(&self) -> u16 {
        self.metadata().node_size()
    }

    /// The minimum number of elements in each node other than the root.
    fn min_node_size(&self) -> usize {
        self.metadata().min_node_size()
    }

    /// The number of levels (height) of the tree.
    fn height(&self) -> usize {
        self.metadata().height()
    }

    /// The bounding rectangle of all points. Empty when the tree holds no points.
    fn bounds(&self) -> Rect<N> {
        *self.nodes()[self.root_id()].rect()
    }

    /// Search for all points within `radius` of the query point, boundary included.
    ///
    /// Results are the insertion indexes of the found points, in no particular order.
    ///
    /// Fails with [`IndexError::InvalidArgument`] if the radius is negative or NaN, and with
    /// [`IndexError::InvalidInput`] if the query point is not finite.
    ///
    /// ```
    /// use point_index::rtree::{RTreeBuilder, RTreeIndex, STRSort};
    ///
    /// let mut builder = RTreeBuilder::<f64>::new(4);
    /// builder.add(0., 0.);
    /// builder.add(1., 0.);
    /// builder.add(0., 1.);
    /// builder.add(5., 5.);
    /// let tree = builder.finish::<STRSort>().unwrap();
    ///
    /// let mut results = tree.within_distance(0., 0., 1.5).unwrap();
    /// results.sort();
    /// assert_eq!(results, vec![0, 1, 2]);
    /// ```
    fn within_distance(&self, x: N, y: N, radius: N) -> Result<Vec<u32>> {
        check_query_point(x, y)?;
        check_radius(radius)?;

        let nodes = self.nodes();
        let max_distance = Distance::from_radius(radius);

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[NodeId; 32]> = TinyVec::new();
        stack.push(self.root_id());

        let mut results = vec![];

        while let Some(node_id) = stack.pop() {
            match &nodes[node_id] {
                TreeNode::Leaf { points, .. } => {
                    for p in points {
                        if Distance::between(x, y, p.x, p.y) <= max_distance {
                            results.push(p.id);
                        }
                    }
                }
                TreeNode::Internal { children, .. } => {
                    for (rect, child) in children {
                        // skip subtrees whose rectangle cannot reach the query disk
                        if Distance::to_rect(x, y, rect) <= max_distance {
                            stack.push(*child);
                        }
                    }
                }
            }
        }

        Ok(results)
    }

    /// Search for all points within `radius` of the given coordinate.
    fn within_distance_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        radius: N,
    ) -> Result<Vec<u32>> {
        self.within_distance(coord.x(), coord.y(), radius)
    }

    /// The `k` points nearest to the query point, in ascending order of distance. Points at equal
    /// distance are ordered by insertion index.
    ///
    /// If `k` exceeds the number of points, all points are returned.
    ///
    /// Fails with [`IndexError::InvalidArgument`] if `k == 0`.
    ///
    /// ```
    /// use point_index::rtree::{RTreeBuilder, RTreeIndex, STRSort};
    ///
    /// let mut builder = RTreeBuilder::<f64>::new(4);
    /// builder.add(0., 0.);
    /// builder.add(1., 0.);
    /// builder.add(0., 1.);
    /// builder.add(5., 5.);
    /// let tree = builder.finish::<STRSort>().unwrap();
    ///
    /// assert_eq!(tree.knn(0., 0., 2).unwrap(), vec![0, 1]);
    /// assert_eq!(tree.knn(6., 6., 10).unwrap(), vec![3, 1, 2, 0]);
    /// ```
    fn knn(&self, x: N, y: N, k: usize) -> Result<Vec<u32>> {
        check_k(k)?;
        self.neighbors(x, y, Some(k), None)
    }

    /// Search items in order of distance from the given point.
    ///
    /// The search stops after `max_results` points, or at the first point farther than
    /// `max_distance` (a point exactly at `max_distance` is included). With neither limit, every
    /// point is returned in ascending order of distance.
    fn neighbors(
        &self,
        x: N,
        y: N,
        max_results: Option<usize>,
        max_distance: Option<N>,
    ) -> Result<Vec<u32>> {
        let results = best_first(self, x, y, max_results, max_distance)?;
        Ok(results.into_iter().map(|(id, _)| id).collect())
    }

    /// Search items in order of distance from the given coordinate.
    fn neighbors_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        max_results: Option<usize>,
        max_distance: Option<N>,
    ) -> Result<Vec<u32>> {
        self.neighbors(coord.x(), coord.y(), max_results, max_distance)
    }

    /// Like [RTreeIndex::neighbors], but each result is paired with its Euclidean distance to
    /// the query point.
    fn neighbors_with_distance(
        &self,
        x: N,
        y: N,
        max_results: Option<usize>,
        max_distance: Option<N>,
    ) -> Result<Vec<(u32, N)>> {
        let results = best_first(self, x, y, max_results, max_distance)?;
        Ok(results
            .into_iter()
            .map(|(id, dist)| (id, dist.value()))
            .collect())
    }

    /// Access the root node of the RTree for manual traversal.
    fn root(&self) -> Node<'_, N, Self> {
        Node::from_root(self)
    }
}

impl<N: IndexableNum> RTreeIndex<N> for RTree<N> {
    fn nodes(&self) -> &[TreeNode<N>] {
        &self.nodes
    }

    fn root_id(&self) -> NodeId {
        self.root
    }

    fn metadata(&self) -> &RTreeMetadata {
        &self.metadata
    }
}

/// Best-first traversal shared by the nearest neighbor searches.
///
/// Returns `(id, distance)` pairs in ascending order of distance, then id.
fn best_first<N: IndexableNum, T: RTreeIndex<N>>(
    tree: &T,
    x: N,
    y: N,
    max_results: Option<usize>,
    max_distance: Option<N>,
) -> Result<Vec<(u32, Distance<N>)>> {
    check_query_point(x, y)?;
    if let Some(max_distance) = max_distance {
        check_radius(max_distance)?;
    }

    let nodes = tree.nodes();
    let num_items = tree.num_items() as usize;
    let max_distance = Distance::from_radius(max_distance.unwrap_or(N::infinity()));

    let mut results = vec![];
    if num_items == 0 || max_results == Some(0) {
        return Ok(results);
    }

    // The k smallest point distances queued so far. Once it is full, its top bounds the distance
    // of the k-th nearest point and anything farther can be dropped without queueing it.
    let mut best = max_results.map(|k| KBest::new(k, num_items));
    let max_results = max_results.unwrap_or(usize::MAX);

    let root = tree.root_id();
    let mut queue = BinaryHeap::new();
    queue.push(Reverse(NeighborNode {
        dist: Distance::to_rect(x, y, nodes[root].rect()),
        item: Item::Node(root),
    }));

    while let Some(Reverse(node)) = queue.pop() {
        if node.dist > max_distance {
            break;
        }

        match node.item {
            Item::Point(id) => {
                // nothing left in the queue can be closer
                results.push((id, node.dist));
                if results.len() == max_results {
                    break;
                }
            }
            Item::Node(node_id) => {
                let bound = best
                    .as_ref()
                    .map_or(max_distance, |best| best.bound(max_distance));
                match &nodes[node_id] {
                    TreeNode::Leaf { points, .. } => {
                        for p in points {
                            let dist = Distance::between(x, y, p.x, p.y);
                            if dist <= bound {
                                if let Some(best) = best.as_mut() {
                                    best.offer(dist);
                                }
                                queue.push(Reverse(NeighborNode {
                                    dist,
                                    item: Item::Point(p.id),
                                }));
                            }
                        }
                    }
                    TreeNode::Internal { children, .. } => {
                        for (rect, child) in children {
                            let dist = Distance::to_rect(x, y, rect);
                            if dist <= bound {
                                queue.push(Reverse(NeighborNode {
                                    dist,
                                    item: Item::Node(*child),
                                }));
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(results)
}

/// An entry of the best-first priority queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Item {
    Node(NodeId),
    Point(u32),
}

/// A wrapper around a queue item and its distance for use in the priority queue.
///
/// Entries order by distance. At equal distance nodes come before points, so that every point
/// that could tie is queued before a tied point is emitted, and tied points order by id.
#[derive(Debug, Clone, Copy)]
struct NeighborNode<N: IndexableNum> {
    dist: Distance<N>,
    item: Item,
}

impl<N: IndexableNum> PartialEq for NeighborNode<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: IndexableNum> Eq for NeighborNode<N> {}

impl<N: IndexableNum> Ord for NeighborNode<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.cmp(&other.dist).then_with(|| match (self.item, other.item) {
            (Item::Node(a), Item::Node(b)) => a.cmp(&b),
            (Item::Node(_), Item::Point(_)) => Ordering::Less,
            (Item::Point(_), Item::Node(_)) => Ordering::Greater,
            (Item::Point(a), Item::Point(b)) => a.cmp(&b),
        })
    }
}

impl<N: IndexableNum> PartialOrd for NeighborNode<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Tracks the `k` smallest distances offered so far.
struct KBest<N: IndexableNum> {
    k: usize,
    heap: BinaryHeap<Distance<N>>,
}

impl<N: IndexableNum> KBest<N> {
    fn new(k: usize, num_items: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.min(num_items)),
        }
    }

    /// The largest distance that can still belong to the result.
    #[inline]
    fn bound(&self, max_distance: Distance<N>) -> Distance<N> {
        match self.heap.peek() {
            Some(kth) if self.heap.len() == self.k => (*kth).min(max_distance),
            _ => max_distance,
        }
    }

    #[inline]
    fn offer(&mut self, dist: Distance<N>) {
        if self.heap.len() < self.k {
            self.heap.push(dist);
        } else if self.heap.peek().is_some_and(|kth| dist < *kth) {
            self.heap.pop();
            self.heap.push(dist);
        }
    }
}

pub(crate) fn check_query_point<N: IndexableNum>(x: N, y: N) -> Result<()> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(IndexError::InvalidInput(format!(
            "Query point ({:?}, {:?}) is not finite.",
            x, y
        )))
    }
}

pub(crate) fn check_radius<N: IndexableNum>(radius: N) -> Result<()> {
    // also rejects NaN
    if radius >= N::zero() {
        Ok(())
    } else {
        Err(IndexError::InvalidArgument(format!(
            "Distance must be non-negative, got {:?}.",
            radius
        )))
    }
}

pub(crate) fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        Err(IndexError::InvalidArgument(
            "Number of neighbors k must be at least 1.".to_string(),
        ))
    } else {
        Ok(())
    }
}
