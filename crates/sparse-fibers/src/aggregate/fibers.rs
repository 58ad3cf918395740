//! Fiber groupings: for each choice of free axis, every fiber of the tensor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::axes::{fiber_axes, FiberAxes};
use crate::data::CoordinateMatrix;
use crate::fiber::{Fiber, FiberStats};
use crate::utils::Parallelism;

// =============================================================================
// FiberGroup
// =============================================================================

/// All fibers running along one free axis, keyed by their fixed coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct FiberGroup {
    axes: FiberAxes,
    fibers: BTreeMap<Box<[i64]>, Fiber>,
}

impl FiberGroup {
    pub fn new(axes: FiberAxes) -> Self {
        Self {
            axes,
            fibers: BTreeMap::new(),
        }
    }

    pub fn axes(&self) -> &FiberAxes {
        &self.axes
    }

    /// Append the free-axis coordinate of `record` to its fiber.
    #[inline]
    pub fn record(&mut self, record: &[i64]) {
        let key = self.axes.project(record);
        let value = record[self.axes.free()];
        self.fibers.entry(key).or_default().add(value);
    }

    /// The fiber through the given fixed coordinates.
    pub fn fiber(&self, fixed_coords: &[i64]) -> Option<&Fiber> {
        self.fibers.get(fixed_coords)
    }

    /// Fibers in fixed-coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (&[i64], &Fiber)> {
        self.fibers.iter().map(|(k, v)| (&**k, v))
    }

    /// Number of distinct fibers.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Total elements over all fibers.
    pub fn total_elements(&self) -> u64 {
        self.fibers.values().map(|f| f.count() as u64).sum()
    }

    /// Finalize every fiber.
    pub fn finalize(&mut self) {
        for fiber in self.fibers.values_mut() {
            fiber.finalize();
        }
    }

    /// Distribution summary of this grouping.
    ///
    /// Uses cached stats where present and computes the rest on the fly.
    pub fn summary(&self) -> FiberGroupSummary {
        let mut element_counts = Vec::with_capacity(self.fibers.len());
        let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
        let mut variances = Vec::new();

        for fiber in self.fibers.values() {
            let count = fiber.count();
            element_counts.push(count);
            *histogram.entry(count).or_insert(0) += 1;

            let variance = match fiber.stats() {
                Some(stats) => stats.variance,
                None => fiber.compute_stats().and_then(|s| s.variance),
            };
            if let Some(variance) = variance {
                variances.push(variance.trunc() as i64);
            }
        }

        FiberGroupSummary {
            fixed_axes: self.axes.fixed().to_vec(),
            free_axis: self.axes.free(),
            n_fibers: self.fibers.len(),
            element_counts,
            element_count_histogram: histogram
                .into_iter()
                .map(|(elements, fibers)| CountBucket { elements, fibers })
                .collect(),
            variances,
        }
    }
}

// =============================================================================
// Summaries
// =============================================================================

/// Number of fibers holding exactly `elements` elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBucket {
    pub elements: usize,
    pub fibers: usize,
}

/// Per-grouping distributions feeding the fiber histograms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiberGroupSummary {
    pub fixed_axes: Vec<usize>,
    pub free_axis: usize,
    pub n_fibers: usize,
    /// Element count of every fiber, in fixed-coordinate order.
    pub element_counts: Vec<usize>,
    pub element_count_histogram: Vec<CountBucket>,
    /// Variances truncated toward zero, non-degenerate fibers only.
    pub variances: Vec<i64>,
}

/// A finalized fiber with its fixed coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiberEntry {
    pub fixed_coords: Vec<i64>,
    pub stats: FiberStats,
}

// =============================================================================
// FiberAggregator
// =============================================================================

/// One [`FiberGroup`] per choice of `dim - 1` fixed axes.
#[derive(Clone, Debug, PartialEq)]
pub struct FiberAggregator {
    groups: BTreeMap<FiberAxes, FiberGroup>,
}

impl FiberAggregator {
    /// Empty groupings for every free axis.
    pub fn new(dim: usize) -> Self {
        Self {
            groups: fiber_axes(dim)
                .into_iter()
                .map(|axes| (axes.clone(), FiberGroup::new(axes)))
                .collect(),
        }
    }

    /// Build all groupings from a buffered tensor, one worker per grouping.
    ///
    /// Fiber values keep record order, as in a streaming pass.
    pub fn from_matrix(matrix: &CoordinateMatrix, parallelism: Parallelism) -> Self {
        let mut groups: Vec<FiberGroup> = fiber_axes(matrix.dim()).into_iter().map(FiberGroup::new).collect();
        parallelism.maybe_par_for_each_mut(&mut groups, |group| {
            let mut scratch = Vec::with_capacity(matrix.dim());
            for row in matrix.records() {
                scratch.clear();
                scratch.extend(row.iter().copied());
                group.record(&scratch);
            }
        });
        Self {
            groups: groups.into_iter().map(|g| (g.axes.clone(), g)).collect(),
        }
    }

    /// Append `record` to its fiber in the grouping of `axes`.
    pub fn record(&mut self, axes: &FiberAxes, record: &[i64]) {
        self.groups
            .entry(axes.clone())
            .or_insert_with(|| FiberGroup::new(axes.clone()))
            .record(record);
    }

    /// Append `record` to its fiber in every grouping.
    pub fn record_all(&mut self, record: &[i64]) {
        for group in self.groups.values_mut() {
            group.record(record);
        }
    }

    pub fn group(&self, axes: &FiberAxes) -> Option<&FiberGroup> {
        self.groups.get(axes)
    }

    /// The grouping whose fibers run along `free`.
    pub fn group_by_free_axis(&self, free: usize) -> Option<&FiberGroup> {
        self.groups.values().find(|g| g.axes.free() == free)
    }

    /// Groupings in fixed-axes order.
    pub fn groups(&self) -> impl Iterator<Item = &FiberGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Finalize every fiber of every grouping.
    pub fn finalize(&mut self, parallelism: Parallelism) {
        let mut groups: Vec<&mut FiberGroup> = self.groups.values_mut().collect();
        parallelism.maybe_par_for_each_mut(&mut groups, |group| group.finalize());
    }
}
