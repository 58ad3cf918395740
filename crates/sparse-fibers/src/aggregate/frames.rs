//! Frame histograms: one sparse 2D bin grid per axis pair.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::axes::{axis_pairs, AxisPair};
use crate::data::CoordinateMatrix;
use crate::utils::Parallelism;

// =============================================================================
// Quantization
// =============================================================================

/// Bin index of `value` for bins of `width`.
///
/// Floor division: values `0..width` map to bin 0, and negative values round
/// toward negative infinity (`-1` and `-width` map to bin -1).
///
/// `width` must be positive.
#[inline]
pub fn quantize(value: i64, width: i64) -> i64 {
    debug_assert!(width > 0, "bin width must be positive");
    value.div_euclid(width)
}

/// A coarse 2D bucket of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BinKey {
    pub x: i64,
    pub y: i64,
}

impl BinKey {
    #[inline]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// One occupied bin, flattened for heatmap consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePoint {
    pub x: i64,
    pub y: i64,
    pub count: u64,
}

// =============================================================================
// FrameMap
// =============================================================================

/// Bin counts of the projection of the tensor onto one axis pair.
///
/// Counts only ever grow. Bins iterate in `(x, y)` order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameMap {
    axes: AxisPair,
    bins: BTreeMap<BinKey, u64>,
}

impl FrameMap {
    pub fn new(axes: AxisPair) -> Self {
        Self {
            axes,
            bins: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn axes(&self) -> AxisPair {
        self.axes
    }

    /// Count one record in its bin.
    #[inline]
    pub fn record(&mut self, record: &[i64], bucket_width: i64) {
        let (x, y) = self.axes.project(record);
        let key = BinKey::new(quantize(x, bucket_width), quantize(y, bucket_width));
        *self.bins.entry(key).or_insert(0) += 1;
    }

    /// Count of `key`, zero if the bin is empty.
    pub fn count(&self, key: BinKey) -> u64 {
        self.bins.get(&key).copied().unwrap_or(0)
    }

    /// Sum of all bin counts.
    pub fn total(&self) -> u64 {
        self.bins.values().sum()
    }

    /// Number of occupied bins.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BinKey, u64)> + '_ {
        self.bins.iter().map(|(&k, &v)| (k, v))
    }

    /// Occupied bins as `(x, y, count)` points.
    pub fn points(&self) -> Vec<FramePoint> {
        self.iter()
            .map(|(key, count)| FramePoint {
                x: key.x,
                y: key.y,
                count,
            })
            .collect()
    }
}

// =============================================================================
// FrameAggregator
// =============================================================================

/// One [`FrameMap`] per axis pair of a `dim`-axis tensor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameAggregator {
    bucket_width: i64,
    frames: BTreeMap<AxisPair, FrameMap>,
}

impl FrameAggregator {
    /// Empty frames for every axis pair.
    pub fn new(dim: usize, bucket_width: i64) -> Self {
        let frames = axis_pairs(dim)
            .into_iter()
            .map(|pair| (pair, FrameMap::new(pair)))
            .collect();
        Self {
            bucket_width,
            frames,
        }
    }

    /// Build all frames from a buffered tensor, one worker per axis pair.
    pub fn from_matrix(matrix: &CoordinateMatrix, bucket_width: i64, parallelism: Parallelism) -> Self {
        let mut frames: Vec<FrameMap> = axis_pairs(matrix.dim()).into_iter().map(FrameMap::new).collect();
        parallelism.maybe_par_for_each_mut(&mut frames, |frame| {
            let (first, second) = (frame.axes.first, frame.axes.second);
            for row in matrix.records() {
                let key = BinKey::new(
                    quantize(row[first], bucket_width),
                    quantize(row[second], bucket_width),
                );
                *frame.bins.entry(key).or_insert(0) += 1;
            }
        });
        Self {
            bucket_width,
            frames: frames.into_iter().map(|f| (f.axes, f)).collect(),
        }
    }

    #[inline]
    pub fn bucket_width(&self) -> i64 {
        self.bucket_width
    }

    /// Count `record` in the frame of `axes`.
    ///
    /// # Panics
    ///
    /// Panics if `record` has no coordinate for `axes.second`.
    pub fn record(&mut self, axes: AxisPair, record: &[i64]) {
        let width = self.bucket_width;
        self.frames
            .entry(axes)
            .or_insert_with(|| FrameMap::new(axes))
            .record(record, width);
    }

    /// Count `record` in every frame.
    pub fn record_all(&mut self, record: &[i64]) {
        let width = self.bucket_width;
        for frame in self.frames.values_mut() {
            frame.record(record, width);
        }
    }

    pub fn frame(&self, axes: AxisPair) -> Option<&FrameMap> {
        self.frames.get(&axes)
    }

    /// Frames in axis pair order.
    pub fn frames(&self) -> impl Iterator<Item = &FrameMap> {
        self.frames.values()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
