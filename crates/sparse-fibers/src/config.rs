//! Run configuration with builder pattern.
//!
//! [`AnalysisConfig`] describes how a coordinate stream is read and
//! aggregated. It uses the `bon` crate for builder generation with
//! validation at build time.
//!
//! # Example
//!
//! ```
//! use sparse_fibers::config::{AnalysisConfig, IndexBase, MalformedPolicy};
//!
//! // Three-axis tensor, all defaults
//! let config = AnalysisConfig::builder().dim(3).build().unwrap();
//! assert_eq!(config.bucket_width, 100);
//!
//! // One-based input, tolerant of bad lines, four worker threads
//! let config = AnalysisConfig::builder()
//!     .dim(4)
//!     .index_base(IndexBase::One)
//!     .malformed(MalformedPolicy::Skip)
//!     .n_threads(4)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Default width of a frame quantization bin.
pub const DEFAULT_BUCKET_WIDTH: i64 = 100;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Frames and fibers need at least two axes.
    InvalidDimension(usize),
    /// Bucket width must be positive.
    InvalidBucketWidth(i64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimension(d) => write!(f, "dim must be at least 2, got {}", d),
            Self::InvalidBucketWidth(w) => {
                write!(f, "bucket_width must be positive, got {}", w)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// Policies
// =============================================================================

/// How coordinates in the input are numbered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexBase {
    /// Coordinates are used as written.
    #[default]
    Zero,
    /// Coordinates start at 1 and are shifted down by one on read.
    One,
}

/// What the driver does with a malformed line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Abort the run on the first malformed line.
    #[default]
    Fail,
    /// Log the line at `warn` level and continue.
    Skip,
}

// =============================================================================
// AnalysisConfig
// =============================================================================

/// Configuration for one decomposition run.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct AnalysisConfig {
    /// Number of tensor axes. Required; must be at least 2.
    pub dim: usize,

    /// Frame bin width. Default: 100.
    #[builder(default = DEFAULT_BUCKET_WIDTH)]
    pub bucket_width: i64,

    /// Coordinate numbering of the input. Default: zero-based.
    #[builder(default)]
    pub index_base: IndexBase,

    /// Malformed line handling. Default: fail fast.
    #[builder(default)]
    pub malformed: MalformedPolicy,

    /// Number of threads. Default: 1 (single streaming pass).
    ///
    /// `0` uses all available cores; anything other than `1` buffers the
    /// input and computes each axis grouping on its own worker.
    #[builder(default = 1)]
    pub n_threads: usize,
}

/// Custom finishing function that validates the config.
impl<S: analysis_config_builder::IsComplete> AnalysisConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - `dim < 2`
    /// - `bucket_width <= 0`
    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl AnalysisConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dim < 2 {
            return Err(ConfigError::InvalidDimension(self.dim));
        }
        if self.bucket_width <= 0 {
            return Err(ConfigError::InvalidBucketWidth(self.bucket_width));
        }
        Ok(())
    }
}
