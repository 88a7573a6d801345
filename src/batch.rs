//! Whole-matrix entry points: build a tree from a point set, then answer one query per row of a
//! query set.
//!
//! Every argument is validated before any traversal starts, so a call either fails up front or
//! answers every query. With the `rayon` feature, queries run in parallel; the output order
//! always matches the query order.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::Result;
use crate::r#type::IndexableNum;
use crate::rtree::r#trait::{check_k, check_query_point, check_radius};
use crate::rtree::{RTree, RTreeBuilder, RTreeIndex, STRSort};

/// Build an [`RTree`] over `points` with the default node size and STR packing.
///
/// Each point's identifier is its 0-based position in `points`. An empty slice builds an empty
/// tree.
///
/// ```
/// let tree = point_index::build(&[(0., 0.), (1., 0.), (0., 1.), (5., 5.)]).unwrap();
/// let results = point_index::knn(&tree, &[(0., 0.), (6., 6.)], 2).unwrap();
/// assert_eq!(results, vec![vec![0, 1], vec![3, 1]]);
/// ```
pub fn build<N: IndexableNum>(points: &[(N, N)]) -> Result<RTree<N>> {
    let mut builder = RTreeBuilder::new(points.len() as u32);
    for (x, y) in points {
        builder.add(*x, *y);
    }
    builder.finish::<STRSort>()
}

/// For each query point, the identifiers of all indexed points within `radius` of it, boundary
/// included. The order within each result is unspecified.
pub fn within_distance<N, T>(tree: &T, queries: &[(N, N)], radius: N) -> Result<Vec<Vec<u32>>>
where
    N: IndexableNum,
    T: RTreeIndex<N> + Sync,
{
    check_radius(radius)?;
    check_queries(queries)?;
    log::debug!(
        "Running {} within-distance queries (radius {:?}) against {} points",
        queries.len(),
        radius,
        tree.num_items()
    );

    #[cfg(feature = "rayon")]
    let queries = queries.par_iter();
    #[cfg(not(feature = "rayon"))]
    let queries = queries.iter();

    queries.map(|(x, y)| tree.within_distance(*x, *y, radius)).collect()
}

/// For each query point, the identifiers of its `k` nearest indexed points in ascending order of
/// distance, ties broken by identifier. Each result holds `min(k, num_items)` identifiers.
pub fn knn<N, T>(tree: &T, queries: &[(N, N)], k: usize) -> Result<Vec<Vec<u32>>>
where
    N: IndexableNum,
    T: RTreeIndex<N> + Sync,
{
    check_k(k)?;
    check_queries(queries)?;
    log::debug!(
        "Running {} k-nearest-neighbor queries (k = {}) against {} points",
        queries.len(),
        k,
        tree.num_items()
    );

    #[cfg(feature = "rayon")]
    let queries = queries.par_iter();
    #[cfg(not(feature = "rayon"))]
    let queries = queries.iter();

    queries.map(|(x, y)| tree.knn(*x, *y, k)).collect()
}

fn check_queries<N: IndexableNum>(queries: &[(N, N)]) -> Result<()> {
    queries
        .iter()
        .try_for_each(|(x, y)| check_query_point(*x, *y))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::IndexError;

    #[test]
    fn one_result_per_query_in_order() {
        let tree = build(&[(0., 0.), (1., 0.), (0., 1.), (5., 5.)]).unwrap();
        let queries = [(0., 0.), (5., 5.), (100., 100.)];

        let mut within = within_distance(&tree, &queries, 1.5).unwrap();
        within.iter_mut().for_each(|ids| ids.sort());
        assert_eq!(within, vec![vec![0, 1, 2], vec![3], vec![]]);

        let nearest = knn(&tree, &queries, 2).unwrap();
        assert_eq!(nearest, vec![vec![0, 1], vec![3, 1], vec![3, 1]]);
    }

    #[test]
    fn k_larger_than_point_count() {
        let tree = build(&[(0., 0.), (2., 0.), (1., 0.)]).unwrap();
        let nearest = knn(&tree, &[(0., 0.)], 5).unwrap();
        assert_eq!(nearest, vec![vec![0, 2, 1]]);
    }

    #[test]
    fn empty_inputs() {
        let tree = build::<f64>(&[]).unwrap();
        assert_eq!(tree.num_items(), 0);
        assert_eq!(
            within_distance(&tree, &[(0., 0.)], 1.).unwrap(),
            vec![Vec::<u32>::new()]
        );
        assert_eq!(knn(&tree, &[(0., 0.)], 1).unwrap(), vec![Vec::<u32>::new()]);

        let tree = build(&[(0., 0.)]).unwrap();
        assert!(knn(&tree, &[], 3).unwrap().is_empty());
    }

    #[test]
    fn errors_are_raised_before_any_query_runs() {
        let tree = build(&[(0., 0.), (1., 1.)]).unwrap();

        assert!(matches!(
            within_distance(&tree, &[(0., 0.)], -1.),
            Err(IndexError::InvalidArgument(_))
        ));
        assert!(matches!(
            knn(&tree, &[(0., 0.)], 0),
            Err(IndexError::InvalidArgument(_))
        ));
        assert!(matches!(
            knn(&tree, &[(0., 0.), (f64::NAN, 0.)], 1),
            Err(IndexError::InvalidInput(_))
        ));
        assert!(matches!(
            build(&[(0., 0.), (f64::INFINITY, 1.)]),
            Err(IndexError::InvalidInput(_))
        ));
    }
}
