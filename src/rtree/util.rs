//! Utilities for generating RTrees.

/// Split `total` items into `parts` contiguous runs whose lengths differ by at most one.
///
/// Longer runs come first. Returns an empty vec when `parts == 0`.
pub(crate) fn even_split(total: usize, parts: usize) -> Vec<usize> {
    if parts == 0 {
        return vec![];
    }
    let base = total / parts;
    let remainder = total % parts;
    (0..parts)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Split `num_items` entries into the fewest groups of at most `node_size` entries, balancing
/// group sizes so that every group holds at least `node_size / 2` entries when more than one
/// group is needed.
pub(crate) fn group_sizes(num_items: usize, node_size: usize) -> Vec<usize> {
    let num_groups = num_items.div_ceil(node_size);
    even_split(num_items, num_groups)
}

/// Calculate the number of nodes at each level of a packed tree, bottom-up, starting with the
/// leaf level. The last entry is always `1`, the root.
pub(crate) fn compute_level_sizes(num_items: usize, node_size: usize) -> Vec<usize> {
    let mut n = num_items.div_ceil(node_size).max(1);
    let mut level_sizes = vec![n];
    while n != 1 {
        n = n.div_ceil(node_size);
        level_sizes.push(n);
    }
    level_sizes
}
