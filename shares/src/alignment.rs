//! Non-interactive default alignment of messages.
//!
//! A message occupying `len` shares in a square of width `width` must start at a multiple
//! of the largest power of two not exceeding `min(len, width)`. Anyone who knows the length
//! of a message and the width of the square can therefore bound where the message begins
//! without inspecting any of the data that precedes it.

/// Returns the largest power of two not exceeding `n`, or `None` if `n` is zero.
pub fn round_down_power_of_two(n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    Some(1 << (usize::BITS - 1 - n.leading_zeros()))
}

/// Returns the smallest multiple of `multiple` that is at least `cursor`.
pub fn round_up(cursor: usize, multiple: usize) -> Option<usize> {
    if multiple == 0 {
        return None;
    }
    cursor.checked_next_multiple_of(multiple)
}

/// Returns the share index at which a message of `len` shares must start, given that the
/// next free share is `cursor` and the square has rows of `width` shares.
///
/// Returns `None` if `width` is not a non-zero power of two or the start does not fit in
/// a `usize`. The result is never smaller than `cursor`.
pub fn next_aligned_start(cursor: usize, len: usize, width: usize) -> Option<usize> {
    if !width.is_power_of_two() {
        return None;
    }
    let Some(alignment) = round_down_power_of_two(len.min(width)) else {
        return Some(cursor);
    };
    round_up(cursor, alignment)
}
