use std::fmt::Debug;

pub mod treap;

/// An ordered sequence of 64-bit integers with range updates, range queries
/// and in-place permutation steps on contiguous sub-ranges.
///
/// Positions are 0-indexed and ranges are inclusive on both ends.
pub trait Sequence: Sized + Debug {
    /// New empty sequence with room for `capacity` elements.
    fn with_capacity(capacity: usize) -> Self;
    /// New empty sequence.
    fn new() -> Self {
        Self::with_capacity(0)
    }
    /// Build a sequence holding the given values, in order.
    fn from_values(values: impl IntoIterator<Item = i64>) -> Self {
        let values = values.into_iter();
        let mut seq = Self::with_capacity(values.size_hint().0);
        for (i, v) in values.enumerate() {
            seq.insert(i, v);
        }
        seq
    }
    /// Number of elements currently stored.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // OPERATIONS
    // They panic if a position or range is out of bounds, before any mutation.

    /// Insert `value` so that it ends up at position `pos`. `pos` may equal
    /// the current length to append.
    fn insert(&mut self, pos: usize, value: i64);
    /// Remove the element at position `pos`.
    fn remove(&mut self, pos: usize);
    /// Sum of the values at positions `l..=r`.
    fn sum(&mut self, l: usize, r: usize) -> i64;
    /// Overwrite every value at positions `l..=r` with `value`.
    fn assign(&mut self, value: i64, l: usize, r: usize);
    /// Add `delta` to every value at positions `l..=r`.
    fn add(&mut self, delta: i64, l: usize, r: usize);
    /// Rearrange positions `l..=r` into the lexicographically next
    /// arrangement of the same values, wrapping around from the largest
    /// arrangement to the smallest. `l == r` is a no-op.
    fn next_permutation(&mut self, l: usize, r: usize);
    /// Inverse of [`Sequence::next_permutation`], wrapping around from the
    /// smallest arrangement to the largest.
    fn prev_permutation(&mut self, l: usize, r: usize);
    /// Current contents of the sequence, in order.
    fn extract(&mut self) -> Vec<i64>;
}
