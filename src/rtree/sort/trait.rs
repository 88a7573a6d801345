use crate::geometry::{Point, Rect};
use crate::r#type::IndexableNum;

/// Parameters shared by every level of a bulk load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortParams<N: IndexableNum> {
    pub(crate) node_size: usize,
    /// Bounds of all indexed points. Every entry center at every level lies inside it.
    pub(crate) bounds: Rect<N>,
}

impl<N: IndexableNum> SortParams<N> {
    pub fn new(node_size: usize, bounds: Rect<N>) -> Self {
        Self { node_size, bounds }
    }
}

/// Something that can be packed into a tree node: a point at the leaf level or a child node's
/// rectangle above it.
pub trait SortEntry<N: IndexableNum> {
    /// The coordinate the packer orders this entry by.
    fn center(&self) -> (N, N);
}

impl<N: IndexableNum> SortEntry<N> for Point<N> {
    #[inline]
    fn center(&self) -> (N, N) {
        (self.x, self.y)
    }
}

/// A strategy for ordering one level of entries before they are grouped into nodes.
pub trait Sort<N: IndexableNum> {
    /// Reorder `entries` in place and return the sizes of the consecutive runs that become
    /// the nodes of the next level up.
    ///
    /// The returned sizes sum to `entries.len()`, each is at most `params.node_size`, and when
    /// there is more than one run each is at least `params.node_size / 2`.
    fn sort<E: SortEntry<N> + Send>(params: &SortParams<N>, entries: &mut [E]) -> Vec<usize>;
}
