//! Stream driver: reads a coordinate stream and feeds the aggregators.
//!
//! With one thread the input is read exactly once and every record is
//! dispatched as it arrives. With more threads the records are first
//! buffered into a [`CoordinateMatrix`] and every axis pair and fiber
//! grouping is built by its own worker; the results are identical.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{AnalysisConfig, MalformedPolicy};
use crate::data::{CoordinateMatrix, CoordinateReader, RecordParser, TensorHeader};
use crate::decomposition::TensorDecomposition;
use crate::error::AnalysisError;
use crate::utils::{run_with_threads, Parallelism};

/// Drives one decomposition run per call.
#[derive(Debug, Clone)]
pub struct StreamDriver {
    config: AnalysisConfig,
}

/// What a pass over the input saw besides the records themselves.
struct ReadOutcome {
    header: Option<TensorHeader>,
    skipped: u64,
}

impl StreamDriver {
    /// Create a driver, validating `config`.
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Decompose the tensor stored at `path`.
    pub fn run_path(&self, path: impl AsRef<Path>) -> Result<TensorDecomposition, AnalysisError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening coordinate file");
        let file = File::open(path)?;
        self.run(BufReader::new(file))
    }

    /// Decompose an in-memory coordinate stream.
    pub fn run_str(&self, text: &str) -> Result<TensorDecomposition, AnalysisError> {
        self.run(text.as_bytes())
    }

    /// Decompose a coordinate stream and finalize every fiber.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::Io`] if reading fails
    /// - [`AnalysisError::Parse`] on the first malformed line under
    ///   [`MalformedPolicy::Fail`], or on a header whose arity is not `dim`
    ///   under either policy
    pub fn run<R: BufRead>(&self, reader: R) -> Result<TensorDecomposition, AnalysisError> {
        let started = Instant::now();
        let parallelism = Parallelism::from_threads(self.config.n_threads);
        debug!(
            dim = self.config.dim,
            bucket_width = self.config.bucket_width,
            ?parallelism,
            "starting decomposition"
        );

        let decomposition = match parallelism {
            Parallelism::Sequential => self.run_streaming(reader)?,
            Parallelism::Parallel => self.run_buffered(reader)?,
        };

        let n_fibers: usize = decomposition.fibers().groups().map(|g| g.len()).sum();
        let n_bins: usize = decomposition.frames().frames().map(|f| f.len()).sum();
        info!(
            records = decomposition.total_records(),
            skipped = decomposition.skipped_records(),
            bins = n_bins,
            fibers = n_fibers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "decomposition complete"
        );
        Ok(decomposition)
    }

    fn run_streaming<R: BufRead>(&self, reader: R) -> Result<TensorDecomposition, AnalysisError> {
        let mut decomposition = TensorDecomposition::from_config(&self.config);
        let outcome = self.read_records(reader, |record| decomposition.ingest(record))?;
        decomposition.finalize(Parallelism::Sequential);
        decomposition.set_header(outcome.header);
        decomposition.set_skipped(outcome.skipped);
        Ok(decomposition)
    }

    fn run_buffered<R: BufRead>(&self, reader: R) -> Result<TensorDecomposition, AnalysisError> {
        let mut flat = Vec::new();
        let outcome = self.read_records(reader, |record| {
            flat.extend_from_slice(record);
            Ok(())
        })?;
        let matrix = CoordinateMatrix::from_flat(flat, self.config.dim)?;
        debug!(records = matrix.n_records(), "buffered coordinates");

        let bucket_width = self.config.bucket_width;
        let mut decomposition = run_with_threads(self.config.n_threads, |par| {
            let mut decomposition = TensorDecomposition::from_matrix(&matrix, bucket_width, par);
            decomposition.finalize(par);
            decomposition
        })?;
        decomposition.set_header(outcome.header);
        decomposition.set_skipped(outcome.skipped);
        Ok(decomposition)
    }

    /// Parse every record of `reader` into `sink`, applying the malformed
    /// line policy.
    fn read_records<R, F>(&self, reader: R, mut sink: F) -> Result<ReadOutcome, AnalysisError>
    where
        R: BufRead,
        F: FnMut(&[i64]) -> Result<(), AnalysisError>,
    {
        let parser = RecordParser::new(self.config.dim, self.config.index_base);
        let mut records = CoordinateReader::new(reader, parser);
        let mut skipped = 0u64;

        for item in records.by_ref() {
            match item {
                Ok(record) => sink(&record)?,
                Err(AnalysisError::Parse(e))
                    if self.config.malformed == MalformedPolicy::Skip && e.is_recoverable() =>
                {
                    warn!(line = e.line, error = %e.kind, "skipping malformed line");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(header) = records.header() {
            debug!(widths = ?header.widths, "read tensor header");
        }
        Ok(ReadOutcome {
            header: records.into_header(),
            skipped,
        })
    }
}

/// Decompose the tensor at `path` with `config`.
pub fn decompose_file(config: AnalysisConfig, path: impl AsRef<Path>) -> Result<TensorDecomposition, AnalysisError> {
    StreamDriver::new(config)?.run_path(path)
}
