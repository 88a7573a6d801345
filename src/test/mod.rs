//! Shared fixtures: random point sets, brute-force reference queries and a structural checker.


use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geometry::{Distance, Rect};
use crate::rtree::sort::Sort;
use crate::rtree::{RTree, RTreeBuilder, RTreeIndex};

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn uniform_points(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)))
        .collect()
}

/// Points on a small integer lattice, so that many points coincide and many distances tie.
pub(crate) fn lattice_points(n: usize, side: i32, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            (
                rng.gen_range(0..side) as f64,
                rng.gen_range(0..side) as f64,
            )
        })
        .collect()
}

/// A few tight clusters far apart from each other.
pub(crate) fn clustered_points(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers = [(-500., -500.), (0., 800.), (750., 20.), (10_000., 10_000.)];
    (0..n)
        .map(|i| {
            let (cx, cy) = centers[i % centers.len()];
            (cx + rng.gen_range(-5.0..5.0), cy + rng.gen_range(-5.0..5.0))
        })
        .collect()
}

pub(crate) fn make_tree<S: Sort<f64>>(points: &[(f64, f64)], node_size: u16) -> RTree<f64> {
    init_logger();
    let mut builder = RTreeBuilder::new_with_node_size(points.len() as u32, node_size).unwrap();
    for (x, y) in points {
        builder.add(*x, *y);
    }
    builder.finish::<S>().unwrap()
}

/// Points scaled by a power of two, which keeps every coordinate exact.
pub(crate) fn scaled(points: &[(f64, f64)], exponent: i32) -> Vec<(f64, f64)> {
    let scale = 2f64.powi(exponent);
    points.iter().map(|(x, y)| (x * scale, y * scale)).collect()
}

/// Linear scan with the same inclusive `<= radius` rule as the tree.
pub(crate) fn brute_within(points: &[(f64, f64)], x: f64, y: f64, radius: f64) -> Vec<u32> {
    let max_distance = Distance::from_radius(radius);
    points
        .iter()
        .enumerate()
        .filter(|(_, (px, py))| Distance::between(x, y, *px, *py) <= max_distance)
        .map(|(id, _)| id as u32)
        .collect()
}

/// Every point sorted by distance, then id, truncated to `k`.
pub(crate) fn brute_knn(points: &[(f64, f64)], x: f64, y: f64, k: usize) -> Vec<u32> {
    let mut all = points
        .iter()
        .enumerate()
        .map(|(id, (px, py))| (Distance::between(x, y, *px, *py), id as u32))
        .collect::<Vec<_>>();
    all.sort();
    all.into_iter().take(k).map(|(_, id)| id).collect()
}

pub(crate) fn sorted(mut ids: Vec<u32>) -> Vec<u32> {
    ids.sort_unstable();
    ids
}

/// Walk the whole tree and assert its structural invariants:
///
/// - every node's rectangle is exactly the bounds of its points or of its children's rectangles,
///   and so contains every descendant point
/// - the rectangle stored next to each child equals the child's own rectangle
/// - every non-root node holds between `min_node_size` and `node_size` entries
/// - all leaves sit at the same depth, which equals the tree height
/// - every point id appears exactly once and keeps its coordinates
pub(crate) fn check_invariants(tree: &RTree<f64>, points: &[(f64, f64)]) {
    let mut seen = HashSet::new();
    let mut leaf_depths = HashSet::new();
    let root = tree.root();
    if points.is_empty() {
        assert!(root.is_leaf());
        assert!(root.is_empty());
        return;
    }

    let mut stack = vec![(root, 1usize)];
    while let Some((node, depth)) = stack.pop() {
        let is_root = node.id() == tree.root_id();
        if !is_root {
            assert!(
                node.len() >= tree.min_node_size() && node.len() <= tree.node_size() as usize,
                "node {} holds {} entries",
                node.id(),
                node.len()
            );
        } else {
            assert!(node.len() <= tree.node_size() as usize);
        }

        let mut tight = Rect::empty();
        if node.is_leaf() {
            leaf_depths.insert(depth);
            for p in node.points() {
                assert!(node.rect().contains_point(p.x, p.y));
                assert_eq!((p.x, p.y), points[p.id as usize]);
                assert!(seen.insert(p.id), "point {} indexed twice", p.id);
                tight.expand_to_point(p.x, p.y);
            }
        } else {
            for child in node.children() {
                assert!(node.rect().contains_rect(child.rect()));
                tight = tight.union(child.rect());
                stack.push((child, depth + 1));
            }
            if let crate::rtree::TreeNode::Internal { children, .. } = &tree.nodes()[node.id()] {
                for (rect, child) in children {
                    assert_eq!(rect, tree.nodes()[*child].rect());
                }
            }
        }
        assert_eq!(&tight, node.rect(), "node {} is not tight", node.id());
    }

    assert_eq!(seen.len(), points.len());
    assert_eq!(leaf_depths.len(), 1, "leaves at depths {:?}", leaf_depths);
    assert!(leaf_depths.contains(&tree.height()));
}
