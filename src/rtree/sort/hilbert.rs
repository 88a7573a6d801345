use crate::r#type::IndexableNum;
use crate::rtree::sort::{Sort, SortEntry, SortParams};
use crate::rtree::util::group_sizes;

/// An implementation of hilbert packing.
///
/// Entries are ordered by the Hilbert value of their centers within the bounds of the whole
/// dataset, then cut into balanced nodes. The hilbert calculations are originally derived from
/// [a C++ implementation](https://github.com/rawrunprotected/hilbert_curves).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HilbertSort;

impl<N: IndexableNum> Sort<N> for HilbertSort {
    fn sort<E: SortEntry<N> + Send>(params: &SortParams<N>, entries: &mut [E]) -> Vec<usize> {
        let groups = group_sizes(entries.len(), params.node_size);
        if groups.len() <= 1 {
            return groups;
        }

        let bounds = &params.bounds;

        // map entry centers into Hilbert coordinate space and sort by Hilbert value
        entries.sort_by_cached_key(|entry| {
            let (cx, cy) = entry.center();
            let x = grid_cell(cx, bounds.min_x, bounds.max_x);
            let y = grid_cell(cy, bounds.min_y, bounds.max_y);
            hilbert(x, y)
        });

        groups
    }
}

/// Cell of `value` along one axis of the 16-bit Hilbert grid spanning `min..=max`.
///
/// Halves are taken before subtracting so that no finite extent overflows. All values may share
/// one coordinate on an axis, in which case every value maps to cell 0.
#[inline]
fn grid_cell<N: IndexableNum>(value: N, min: N, max: N) -> u32 {
    let two = N::one() + N::one();
    let extent = max / two - min / two;
    if extent <= N::zero() {
        return 0;
    }
    let fraction = ((value / two - min / two) / extent).to_f64();
    debug_assert!(
        fraction.is_some_and(|f| (0.0..=1.0).contains(&f)),
        "{:?} outside of {:?}..={:?}",
        value,
        min,
        max
    );
    // f32 and f64 always convert, and centers lie within the bounds
    let fraction = fraction.unwrap_or_default().clamp(0., 1.);
    (HILBERT_MAX * fraction).floor() as u32
}

const HILBERT_MAX: f64 = ((1 << 16) - 1) as f64;

// Taken from static_aabb2d_index under the mit/apache license
// https://github.com/jbuckmccready/static_aabb2d_index/blob/9e6add59d77b74d4de0ac32159db47fbcb3acc28/src/static_aabb2d_index.rs#L486C1-L544C2
#[inline]
fn hilbert(x: u32, y: u32) -> u32 {
    // Fast Hilbert curve algorithm by http://threadlocalmutex.com/
    // Ported from C++ https://github.com/rawrunprotected/hilbert_curves (public domain)
    let mut a_1 = x ^ y;
    let mut b_1 = 0xFFFF ^ a_1;
    let mut c_1 = 0xFFFF ^ (x | y);
    let mut d_1 = x & (y ^ 0xFFFF);

    let mut a_2 = a_1 | (b_1 >> 1);
    let mut b_2 = (a_1 >> 1) ^ a_1;
    let mut c_2 = ((c_1 >> 1) ^ (b_1 & (d_1 >> 1))) ^ c_1;
    let mut d_2 = ((a_1 & (c_1 >> 1)) ^ (d_1 >> 1)) ^ d_1;

    a_1 = a_2;
    b_1 = b_2;
    c_1 = c_2;
    d_1 = d_2;
    a_2 = (a_1 & (a_1 >> 2)) ^ (b_1 & (b_1 >> 2));
    b_2 = (a_1 & (b_1 >> 2)) ^ (b_1 & ((a_1 ^ b_1) >> 2));
    c_2 ^= (a_1 & (c_1 >> 2)) ^ (b_1 & (d_1 >> 2));
    d_2 ^= (b_1 & (c_1 >> 2)) ^ ((a_1 ^ b_1) & (d_1 >> 2));

    a_1 = a_2;
    b_1 = b_2;
    c_1 = c_2;
    d_1 = d_2;
    a_2 = (a_1 & (a_1 >> 4)) ^ (b_1 & (b_1 >> 4));
    b_2 = (a_1 & (b_1 >> 4)) ^ (b_1 & ((a_1 ^ b_1) >> 4));
    c_2 ^= (a_1 & (c_1 >> 4)) ^ (b_1 & (d_1 >> 4));
    d_2 ^= (b_1 & (c_1 >> 4)) ^ ((a_1 ^ b_1) & (d_1 >> 4));

    a_1 = a_2;
    b_1 = b_2;
    c_1 = c_2;
    d_1 = d_2;
    c_2 ^= (a_1 & (c_1 >> 8)) ^ (b_1 & (d_1 >> 8));
    d_2 ^= (b_1 & (c_1 >> 8)) ^ ((a_1 ^ b_1) & (d_1 >> 8));

    a_1 = c_2 ^ (c_2 >> 1);
    b_1 = d_2 ^ (d_2 >> 1);

    let mut i0 = x ^ y;
    let mut i1 = b_1 | (0xFFFF ^ (i0 | a_1));

    i0 = (i0 | (i0 << 8)) & 0x00FF_00FF;
    i0 = (i0 | (i0 << 4)) & 0x0F0F_0F0F;
    i0 = (i0 | (i0 << 2)) & 0x3333_3333;
    i0 = (i0 | (i0 << 1)) & 0x5555_5555;

    i1 = (i1 | (i1 << 8)) & 0x00FF_00FF;
    i1 = (i1 | (i1 << 4)) & 0x0F0F_0F0F;
    i1 = (i1 | (i1 << 2)) & 0x3333_3333;
    i1 = (i1 | (i1 << 1)) & 0x5555_5555;

    (i1 << 1) | i0
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Point, Rect};

    #[test]
    fn hilbert_curve_runs_corner_to_corner() {
        assert_eq!(hilbert(0, 0), 0);
        // the curve ends at one of the corners adjacent to the origin
        assert!(hilbert(0xFFFF, 0) == u32::MAX || hilbert(0, 0xFFFF) == u32::MAX);
        assert_ne!(hilbert(0xFFFF, 0xFFFF), u32::MAX);
    }

    #[test]
    fn groups_neighbouring_points() {
        // two well separated clusters of 8 points, interleaved in insertion order
        let mut points = (0..16)
            .map(|i| {
                let offset = if i % 2 == 0 { 0. } else { 100. };
                Point::new(offset + (i / 2) as f64 * 0.1, offset, i)
            })
            .collect::<Vec<_>>();
        let params = SortParams::new(8, Rect::new(0., 0., 100.7, 100.));
        let groups = HilbertSort::sort(&params, &mut points);
        assert_eq!(groups, vec![8, 8]);

        for node in points.chunks(8) {
            let first_cluster = node[0].id % 2;
            assert!(node.iter().all(|p| p.id % 2 == first_cluster));
        }
    }

    #[test]
    fn grid_cells_span_the_bounds() {
        assert_eq!(grid_cell(0., 0., 10.), 0);
        assert_eq!(grid_cell(10., 0., 10.), 0xFFFF);
        assert_eq!(grid_cell(5., 0., 10.), 0x7FFF);
        assert_eq!(grid_cell(3., 3., 3.), 0);

        // the extent of these bounds overflows when not halved first
        assert_eq!(grid_cell(-f64::MAX, -f64::MAX, f64::MAX), 0);
        assert_eq!(grid_cell(f64::MAX, -f64::MAX, f64::MAX), 0xFFFF);
        assert_eq!(grid_cell(0f32, -f32::MAX, f32::MAX), 0x7FFF);
    }

    #[test]
    fn handles_degenerate_bounds() {
        let mut points = (0..10).map(|i| Point::new(1., 1., i)).collect::<Vec<_>>();
        let params = SortParams::new(4, Rect::new(1., 1., 1., 1.));
        let groups = HilbertSort::sort(&params, &mut points);
        assert_eq!(groups, vec![4, 3, 3]);
    }
}
