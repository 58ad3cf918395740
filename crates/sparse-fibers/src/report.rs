//! Serializable results handed to plotting and other consumers.
//!
//! Maps keyed by structured values do not fit JSON objects, so the report
//! flattens every map into ordered lists: frames become `(x, y, count)`
//! points and fibers become `(fixed_coords, stats)` entries.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::aggregate::{FiberEntry, FiberGroup, FiberGroupSummary, FrameMap, FramePoint};
use crate::axes::AxisPair;
use crate::data::TensorHeader;
use crate::decomposition::TensorDecomposition;
use crate::error::AnalysisError;

/// How much per-fiber detail a report carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportDetail {
    /// Frames and per-grouping distributions only.
    #[default]
    Summary,
    /// Also every fiber's statistics.
    Full,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    pub axes: AxisPair,
    pub points: Vec<FramePoint>,
}

impl From<&FrameMap> for FrameReport {
    fn from(frame: &FrameMap) -> Self {
        Self {
            axes: frame.axes(),
            points: frame.points(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiberGroupReport {
    #[serde(flatten)]
    pub summary: FiberGroupSummary,
    /// Empty unless the report was built with [`ReportDetail::Full`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fibers: Vec<FiberEntry>,
}

impl FiberGroupReport {
    fn new(group: &FiberGroup, detail: ReportDetail) -> Self {
        let fibers = match detail {
            ReportDetail::Summary => Vec::new(),
            ReportDetail::Full => group
                .iter()
                .filter_map(|(coords, fiber)| {
                    let stats = fiber.stats().cloned().or_else(|| fiber.compute_stats())?;
                    Some(FiberEntry {
                        fixed_coords: coords.to_vec(),
                        stats,
                    })
                })
                .collect(),
        };
        Self {
            summary: group.summary(),
            fibers,
        }
    }
}

/// Everything a decomposition run produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecompositionReport {
    pub dim: usize,
    pub bucket_width: i64,
    pub total_records: u64,
    pub skipped_records: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<TensorHeader>,
    pub frames: Vec<FrameReport>,
    pub fiber_groups: Vec<FiberGroupReport>,
}

impl DecompositionReport {
    pub fn from_decomposition(decomposition: &TensorDecomposition, detail: ReportDetail) -> Self {
        Self {
            dim: decomposition.dim(),
            bucket_width: decomposition.bucket_width(),
            total_records: decomposition.total_records(),
            skipped_records: decomposition.skipped_records(),
            header: decomposition.header().cloned(),
            frames: decomposition.frames().frames().map(FrameReport::from).collect(),
            fiber_groups: decomposition
                .fibers()
                .groups()
                .map(|g| FiberGroupReport::new(g, detail))
                .collect(),
        }
    }

    /// Write pretty-printed JSON.
    pub fn to_json_writer<W: Write>(&self, writer: W) -> Result<(), AnalysisError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, AnalysisError> {
        Ok(serde_json::from_str(json)?)
    }
}
