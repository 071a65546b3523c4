//! Row cursor arithmetic shared by every list page.
//!
//! Results are always clamped into `[0, len - 1]`, or 0 for an empty list.

pub fn advance(index: usize, n: usize, len: usize) -> usize {
    clamp(index.saturating_add(n), len)
}

pub fn retreat(index: usize, n: usize, len: usize) -> usize {
    clamp(index.saturating_sub(n), len)
}

pub fn clamp(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index.min(len - 1)
    }
}
