//! Buffered coordinate storage.

use ndarray::{Array2, ArrayView1, Axis};

use crate::error::AnalysisError;

/// All records of a tensor in one row-major `[n_records, dim]` array.
///
/// Used when the decomposition runs in parallel: every worker reads the same
/// immutable buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMatrix {
    coords: Array2<i64>,
}

impl CoordinateMatrix {
    /// Wrap an existing array. Rows are records, columns are axes.
    pub fn new(coords: Array2<i64>) -> Self {
        Self { coords }
    }

    /// Build from a flat row-major buffer of `n_records * dim` values.
    pub fn from_flat(flat: Vec<i64>, dim: usize) -> Result<Self, AnalysisError> {
        if dim == 0 {
            return Err(AnalysisError::DimensionMismatch {
                expected: dim,
                found: flat.len(),
            });
        }
        let n_records = flat.len() / dim;
        Ok(Self::new(Array2::from_shape_vec((n_records, dim), flat)?))
    }

    /// Build from individual records, checking each has `dim` coordinates.
    pub fn from_records<I, R>(records: I, dim: usize) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[i64]>,
    {
        let mut flat = Vec::new();
        for record in records {
            let record = record.as_ref();
            if record.len() != dim {
                return Err(AnalysisError::DimensionMismatch {
                    expected: dim,
                    found: record.len(),
                });
            }
            flat.extend_from_slice(record);
        }
        if flat.is_empty() {
            return Ok(Self::new(Array2::zeros((0, dim))));
        }
        Self::from_flat(flat, dim)
    }

    #[inline]
    pub fn n_records(&self) -> usize {
        self.coords.nrows()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.coords.ncols()
    }

    /// Iterate records in input order.
    pub fn records(&self) -> impl Iterator<Item = ArrayView1<'_, i64>> {
        self.coords.axis_iter(Axis(0))
    }

    /// Record `i` as a slice.
    ///
    /// Returns `None` if `i` is out of range.
    pub fn record(&self, i: usize) -> Option<&[i64]> {
        if i >= self.n_records() {
            return None;
        }
        let dim = self.dim();
        self.coords
            .as_slice()
            .map(|flat| &flat[i * dim..(i + 1) * dim])
    }
}
