//! Coordinate input.
//!
//! - [`RecordParser`] / [`CoordinateReader`]: the line-based text format
//! - [`CoordinateMatrix`]: all records buffered in an `ndarray` for parallel runs

mod matrix;
mod text;

pub use matrix::CoordinateMatrix;
pub use text::{CoordinateReader, Line, RecordParser, TensorHeader};
