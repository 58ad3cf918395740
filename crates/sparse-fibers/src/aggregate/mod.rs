//! Aggregators fed by the stream driver.
//!
//! - [`FrameAggregator`]: per axis pair, bin → count
//! - [`FiberAggregator`]: per fixed-axes choice, fixed coordinates → [`Fiber`](crate::fiber::Fiber)
//!
//! Both create entries lazily on first occurrence of a key and only ever
//! grow. Every operation commutes across records, so the buffered parallel
//! builders produce exactly what a sequential stream does.

mod fibers;
mod frames;

pub use fibers::{CountBucket, FiberAggregator, FiberEntry, FiberGroup, FiberGroupSummary};
pub use frames::{quantize, BinKey, FrameAggregator, FrameMap, FramePoint};
