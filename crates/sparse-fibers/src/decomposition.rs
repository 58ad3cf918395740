//! The per-run aggregation state.

use crate::aggregate::{FiberAggregator, FrameAggregator};
use crate::config::AnalysisConfig;
use crate::data::{CoordinateMatrix, TensorHeader};
use crate::error::AnalysisError;
use crate::report::{DecompositionReport, ReportDetail};
use crate::utils::Parallelism;

/// Frames and fiber groupings of one tensor, plus running totals.
///
/// Constructed once per run and fed record by record, either through
/// [`ingest`](Self::ingest) or all at once from a [`CoordinateMatrix`].
#[derive(Clone, Debug, PartialEq)]
pub struct TensorDecomposition {
    dim: usize,
    frames: FrameAggregator,
    fibers: FiberAggregator,
    total_records: u64,
    skipped_records: u64,
    header: Option<TensorHeader>,
    finalized: bool,
}

impl TensorDecomposition {
    /// Empty decomposition of a `dim`-axis tensor.
    pub fn new(dim: usize, bucket_width: i64) -> Self {
        Self {
            dim,
            frames: FrameAggregator::new(dim, bucket_width),
            fibers: FiberAggregator::new(dim),
            total_records: 0,
            skipped_records: 0,
            header: None,
            finalized: false,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.dim, config.bucket_width)
    }

    /// Decompose a buffered tensor. Each axis pair and each fiber grouping
    /// is an independent task under [`Parallelism::Parallel`].
    pub fn from_matrix(matrix: &CoordinateMatrix, bucket_width: i64, parallelism: Parallelism) -> Self {
        let (frames, fibers) = if parallelism.is_parallel() {
            rayon::join(
                || FrameAggregator::from_matrix(matrix, bucket_width, parallelism),
                || FiberAggregator::from_matrix(matrix, parallelism),
            )
        } else {
            (
                FrameAggregator::from_matrix(matrix, bucket_width, parallelism),
                FiberAggregator::from_matrix(matrix, parallelism),
            )
        };
        Self {
            dim: matrix.dim(),
            frames,
            fibers,
            total_records: matrix.n_records() as u64,
            skipped_records: 0,
            header: None,
            finalized: false,
        }
    }

    /// Dispatch one record to every frame and every fiber grouping.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::DimensionMismatch`] if `record.len() != dim`; the
    /// decomposition is left unchanged.
    pub fn ingest(&mut self, record: &[i64]) -> Result<(), AnalysisError> {
        if record.len() != self.dim {
            return Err(AnalysisError::DimensionMismatch {
                expected: self.dim,
                found: record.len(),
            });
        }
        self.total_records += 1;
        self.frames.record_all(record);
        self.fibers.record_all(record);
        self.finalized = false;
        Ok(())
    }

    /// Compute statistics of every fiber.
    pub fn finalize(&mut self, parallelism: Parallelism) {
        self.fibers.finalize(parallelism);
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn bucket_width(&self) -> i64 {
        self.frames.bucket_width()
    }

    /// Records dispatched so far.
    #[inline]
    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    /// Malformed lines skipped by the driver.
    #[inline]
    pub fn skipped_records(&self) -> u64 {
        self.skipped_records
    }

    pub fn header(&self) -> Option<&TensorHeader> {
        self.header.as_ref()
    }

    pub fn frames(&self) -> &FrameAggregator {
        &self.frames
    }

    pub fn fibers(&self) -> &FiberAggregator {
        &self.fibers
    }

    /// Serializable view of the results.
    pub fn report(&self, detail: ReportDetail) -> DecompositionReport {
        DecompositionReport::from_decomposition(self, detail)
    }

    pub(crate) fn set_header(&mut self, header: Option<TensorHeader>) {
        self.header = header;
    }

    pub(crate) fn set_skipped(&mut self, skipped: u64) {
        self.skipped_records = skipped;
    }
}
