use std::cmp::Ordering;

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::r#type::IndexableNum;
use crate::rtree::sort::{Sort, SortEntry, SortParams};
use crate::rtree::util::{even_split, group_sizes};

/// An implementation of sort-tile-recursive (STR) packing.
///
/// Entries are sorted by `x` and cut into `ceil(sqrt(num_nodes))` vertical slices, then each
/// slice is sorted by `y` and cut into nodes. Slice and node sizes are balanced so that no node
/// is left underfull.
///
/// The implementation is derived from [this
/// paper](https://ia600900.us.archive.org/27/items/nasa_techdoc_19970016975/19970016975.pdf).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct STRSort;

impl<N: IndexableNum> Sort<N> for STRSort {
    fn sort<E: SortEntry<N> + Send>(params: &SortParams<N>, entries: &mut [E]) -> Vec<usize> {
        let groups = group_sizes(entries.len(), params.node_size);
        if groups.len() <= 1 {
            return groups;
        }

        // Sort items by their x values
        sort_by_axis::<N, E>(entries, Axis::X);

        let num_vertical_slices = (groups.len() as f64).sqrt().ceil() as usize;
        let mut slices: Vec<&mut [E]> = Vec::with_capacity(num_vertical_slices);
        let mut remaining = entries;
        let mut group_start = 0;
        for groups_in_slice in even_split(groups.len(), num_vertical_slices) {
            let group_end = group_start + groups_in_slice;
            let slice_len = groups[group_start..group_end].iter().sum();
            let (slice, rest) = std::mem::take(&mut remaining).split_at_mut(slice_len);
            slices.push(slice);
            remaining = rest;
            group_start = group_end;
        }
        debug_assert!(remaining.is_empty());

        // Within each x partition, sort by y values
        #[cfg(feature = "rayon")]
        {
            slices
                .into_par_iter()
                .for_each(|slice| sort_by_axis::<N, E>(slice, Axis::Y));
        }

        #[cfg(not(feature = "rayon"))]
        {
            for slice in slices {
                sort_by_axis::<N, E>(slice, Axis::Y);
            }
        }

        groups
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    X,
    Y,
}

/// Stable sort on one coordinate of the entry centers, so that equal keys keep their insertion
/// order and the packing is deterministic.
fn sort_by_axis<N: IndexableNum, E: SortEntry<N>>(entries: &mut [E], axis: Axis) {
    let key = |entry: &E| {
        let (x, y) = entry.center();
        match axis {
            Axis::X => x,
            Axis::Y => y,
        }
    };
    entries.sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal));
}
