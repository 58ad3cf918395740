//! Fiber accumulator and its descriptive statistics.
//!
//! A fiber is the set of nonzeros sharing every coordinate but one. The
//! [`Fiber`] keeps the free-axis coordinates in arrival order; statistics are
//! computed once, by [`Fiber::finalize`], after the stream is consumed.
//!
//! # Low-data fibers
//!
//! Spread statistics need two observations. For a fiber with one element
//! [`FiberStats::density`] and [`FiberStats::variance`] are `None` ("not
//! computed"); count, min and max are still reported.
//!
//! # Density
//!
//! `density = count / (max - min)`: elements per unit of free-axis extent,
//! not a mean. When every value is identical the extent is zero and the
//! density is [`Density::Unbounded`].

use serde::{Deserialize, Serialize};

// =============================================================================
// Density
// =============================================================================

/// Elements per unit of extent along the free axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Density {
    Finite(f64),
    /// Two or more elements at a single coordinate.
    Unbounded,
}

impl Density {
    fn from_extent(count: usize, extent: u64) -> Self {
        if extent == 0 {
            Density::Unbounded
        } else {
            Density::Finite(count as f64 / extent as f64)
        }
    }

    /// The density as a float; `Unbounded` maps to `f64::INFINITY`.
    #[inline]
    pub fn value(self) -> f64 {
        match self {
            Density::Finite(v) => v,
            Density::Unbounded => f64::INFINITY,
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        matches!(self, Density::Finite(_))
    }
}

// =============================================================================
// FiberStats
// =============================================================================

/// Finalized statistics of one fiber.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiberStats {
    pub count: usize,
    pub max: i64,
    pub min: i64,
    /// `None` when `count < 2`.
    pub density: Option<Density>,
    /// Population variance. `None` when `count < 2`.
    pub variance: Option<f64>,
}

impl FiberStats {
    /// Fewer than two elements: spread statistics were not computed.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.count < 2
    }

    /// `max - min` along the free axis.
    #[inline]
    pub fn extent(&self) -> u64 {
        self.max.abs_diff(self.min)
    }
}

// =============================================================================
// Fiber
// =============================================================================

/// Free-axis coordinates of one fiber, in arrival order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fiber {
    values: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    stats: Option<FiberStats>,
}

impl Fiber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation.
    ///
    /// Adding after [`finalize`](Self::finalize) discards the cached stats.
    #[inline]
    pub fn add(&mut self, value: i64) {
        self.values.push(value);
        self.stats = None;
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Compute and cache the statistics.
    ///
    /// Returns `None` for an empty fiber, which has no min or max.
    pub fn finalize(&mut self) -> Option<&FiberStats> {
        if self.stats.is_none() {
            self.stats = self.compute_stats();
        }
        self.stats.as_ref()
    }

    /// Statistics cached by the last [`finalize`](Self::finalize).
    #[inline]
    pub fn stats(&self) -> Option<&FiberStats> {
        self.stats.as_ref()
    }

    /// Compute statistics without caching them.
    pub fn compute_stats(&self) -> Option<FiberStats> {
        let max = *self.values.iter().max()?;
        let min = *self.values.iter().min()?;
        let count = self.values.len();

        let (density, variance) = if count < 2 {
            (None, None)
        } else {
            (
                Some(Density::from_extent(count, max.abs_diff(min))),
                Some(population_variance(&self.values)),
            )
        };

        Some(FiberStats {
            count,
            max,
            min,
            density,
            variance,
        })
    }
}

impl FromIterator<i64> for Fiber {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            stats: None,
        }
    }
}

/// Population variance (divides by `n`). Two-pass for numerical stability.
fn population_variance(values: &[i64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}
