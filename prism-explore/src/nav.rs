//! Wrap-around page navigation.

/// Index after `current` in a collection of `len`, wrapping to 0.
/// `None` when the collection is empty.
pub fn next_index(current: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some((current % len + 1) % len)
}

/// Index before `current` in a collection of `len`, wrapping to `len - 1`.
/// `None` when the collection is empty.
pub fn previous_index(current: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some((current % len + len - 1) % len)
}
