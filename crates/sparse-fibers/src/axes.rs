//! Axis combinations.
//!
//! A tensor with `dim` axes has `dim * (dim - 1) / 2` frames, one per
//! [`AxisPair`], and `dim` fiber groupings, one per [`FiberAxes`]. Both are
//! enumerated in lexicographic order of their index combinations.

use serde::{Deserialize, Serialize};

// =============================================================================
// AxisPair
// =============================================================================

/// An unordered pair of distinct axes, stored as `first < second`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AxisPair {
    pub first: usize,
    pub second: usize,
}

impl AxisPair {
    /// Create a pair from two distinct axes in either order.
    ///
    /// Returns `None` if `a == b`.
    pub fn new(a: usize, b: usize) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Project a record onto this pair.
    ///
    /// # Panics
    ///
    /// Panics if `record` has no coordinate for `self.second`.
    #[inline]
    pub fn project(&self, record: &[i64]) -> (i64, i64) {
        (record[self.first], record[self.second])
    }
}

impl std::fmt::Display for AxisPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// All axis pairs of a `dim`-axis tensor in lexicographic order.
pub fn axis_pairs(dim: usize) -> Vec<AxisPair> {
    (0..dim)
        .flat_map(|first| ((first + 1)..dim).map(move |second| AxisPair { first, second }))
        .collect()
}

// =============================================================================
// FiberAxes
// =============================================================================

/// A choice of `dim - 1` fixed axes; the remaining axis is free.
///
/// Ordering compares the fixed axes lexicographically, so a sorted
/// collection of `FiberAxes` follows combination order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FiberAxes {
    fixed: Box<[usize]>,
    free: usize,
}

impl FiberAxes {
    /// The grouping of a `dim`-axis tensor whose free axis is `free`.
    ///
    /// Returns `None` if `free >= dim`.
    pub fn with_free_axis(dim: usize, free: usize) -> Option<Self> {
        (free < dim).then(|| Self {
            fixed: (0..dim).filter(|&axis| axis != free).collect(),
            free,
        })
    }

    /// Axes held fixed, ascending.
    #[inline]
    pub fn fixed(&self) -> &[usize] {
        &self.fixed
    }

    /// The axis the fiber runs along.
    #[inline]
    pub fn free(&self) -> usize {
        self.free
    }

    /// Number of axes in the tensor this grouping belongs to.
    #[inline]
    pub fn dim(&self) -> usize {
        self.fixed.len() + 1
    }

    /// The fixed-coordinate tuple identifying the fiber through `record`.
    #[inline]
    pub fn project(&self, record: &[i64]) -> Box<[i64]> {
        self.fixed.iter().map(|&axis| record[axis]).collect()
    }
}

impl std::fmt::Display for FiberAxes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fixed {:?}, free {}", self.fixed, self.free)
    }
}

/// All fiber groupings of a `dim`-axis tensor in lexicographic order of
/// their fixed axes.
///
/// The `(dim - 1)`-combinations of `0..dim` in lexicographic order drop the
/// last axis first, so the free axis runs from `dim - 1` down to `0`.
pub fn fiber_axes(dim: usize) -> Vec<FiberAxes> {
    (0..dim)
        .rev()
        .filter_map(|free| FiberAxes::with_free_axis(dim, free))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_lexicographic() {
        let pairs: Vec<(usize, usize)> = axis_pairs(4)
            .into_iter()
            .map(|p| (p.first, p.second))
            .collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn pair_normalizes_order() {
        assert_eq!(AxisPair::new(2, 0), AxisPair::new(0, 2));
        assert_eq!(AxisPair::new(1, 1), None);
    }

    #[test]
    fn fiber_axes_follow_combination_order() {
        let groupings = fiber_axes(3);
        let fixed: Vec<Vec<usize>> = groupings.iter().map(|g| g.fixed().to_vec()).collect();
        assert_eq!(fixed, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);

        let free: Vec<usize> = groupings.iter().map(|g| g.free()).collect();
        assert_eq!(free, vec![2, 1, 0]);

        let mut sorted = groupings.clone();
        sorted.sort();
        assert_eq!(sorted, groupings);
    }

    #[test]
    fn projection_skips_free_axis() {
        let axes = FiberAxes::with_free_axis(4, 1).unwrap();
        assert_eq!(&*axes.project(&[10, 20, 30, 40]), &[10, 30, 40]);
        assert_eq!(axes.dim(), 4);
        assert!(FiberAxes::with_free_axis(4, 4).is_none());
    }
}
