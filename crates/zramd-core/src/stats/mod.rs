//! Running statistics for a zram device.
//!
//! Pure data and arithmetic, no I/O. [`AggregateStats::update`] never fails;
//! degenerate inputs (empty device, zero-sized device) are classified by
//! fixed rules instead.

mod model;
mod summary;

pub use model::{
    AggregateStats, CompressionStats, DeviceConfig, HOURS_PER_DAY, MemoryStats, RatioBucket,
    RawSample, SystemImpact, SystemInfo, TimeAnalysis, UsageBucket, usage_fraction,
};
pub use summary::{describe_sample, summarize};
