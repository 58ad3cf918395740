//! sparse-fibers: frame histograms and fiber statistics for sparse tensors.
//!
//! Reads an N-dimensional sparse tensor stored as a coordinate list and, in
//! one pass, builds:
//!
//! - a **frame** for every pair of axes: a sparse 2D histogram of the
//!   nonzeros projected onto that pair, binned by floor division
//! - a **fiber grouping** for every axis: each line of nonzeros parallel to
//!   that axis, with its element count, min, max, density and variance
//!
//! # Key Types
//!
//! - [`AnalysisConfig`] - Run configuration (builder)
//! - [`StreamDriver`] - Reads a coordinate stream and runs the aggregation
//! - [`TensorDecomposition`] - Frames, fiber groupings and totals of a run
//! - [`Fiber`] / [`FiberStats`] - One fiber and its finalized statistics
//! - [`DecompositionReport`] - JSON-ready view of the results
//!
//! # Example
//!
//! ```
//! use sparse_fibers::{AnalysisConfig, AxisPair, BinKey, StreamDriver};
//!
//! let config = AnalysisConfig::builder().dim(3).build().unwrap();
//! let decomposition = StreamDriver::new(config)
//!     .unwrap()
//!     .run_str("0 0 0 9.0\n100 100 100 2.0\n0 0 50 1.0\n")
//!     .unwrap();
//!
//! let frame = decomposition.frames().frame(AxisPair::new(0, 1).unwrap()).unwrap();
//! assert_eq!(frame.count(BinKey::new(0, 0)), 2);
//! assert_eq!(frame.count(BinKey::new(1, 1)), 1);
//! ```

pub mod aggregate;
pub mod axes;
pub mod config;
pub mod data;
pub mod decomposition;
pub mod driver;
pub mod error;
pub mod fiber;
pub mod report;
pub mod testing;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use aggregate::{BinKey, FiberAggregator, FiberGroup, FrameAggregator, FrameMap, quantize};
pub use axes::{AxisPair, FiberAxes, axis_pairs, fiber_axes};
pub use config::{AnalysisConfig, ConfigError, IndexBase, MalformedPolicy};
pub use decomposition::TensorDecomposition;
pub use driver::{StreamDriver, decompose_file};
pub use error::{AnalysisError, ParseError, ParseErrorKind};
pub use fiber::{Density, Fiber, FiberStats};
pub use report::{DecompositionReport, ReportDetail};
pub use utils::{Parallelism, run_with_threads};
