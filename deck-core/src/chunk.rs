//! Chunking, padding and copy-expansion helpers shared by both layout modes.

/// Integer ceiling division; `b` must be non-zero.
pub fn ceil_div(a: usize, b: usize) -> usize {
    a.div_ceil(b)
}

/// Length of a set's sequence once `copies` repetitions are laid end to end.
///
/// The product must fit in `usize`; the planner rejects configurations where
/// it does not.
pub fn expanded_len(len: usize, copies: usize) -> usize {
    len * copies
}

/// Maps an index of the copy-expanded sequence back to `(card, copy)`.
///
/// Repetitions run card by card (`a,b,c,a,b,c`), so duplicates of one card
/// never sit next to each other. Returns `None` past the end.
pub fn source_of(index: usize, len: usize, copies: usize) -> Option<(usize, usize)> {
    if len == 0 || index >= expanded_len(len, copies) {
        return None;
    }
    Some((index % len, index / len))
}

/// Splits `count` ordered items into consecutive groups of `size`.
///
/// The last group is padded with `None` so every group has exactly `size`
/// members. `size` must be non-zero.
pub fn chunk_padded(count: usize, size: usize) -> Vec<Vec<Option<usize>>> {
    let mut groups = Vec::with_capacity(ceil_div(count, size));
    let mut start = 0;
    while start < count {
        let group = (start..start + size)
            .map(|i| (i < count).then_some(i))
            .collect();
        groups.push(group);
        start += size;
    }
    groups
}
