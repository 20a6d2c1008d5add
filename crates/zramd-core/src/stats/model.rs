//! Aggregate statistics structures and the per-sample update.
//!
//! `AggregateStats` is the single unit of durable state. Its JSON layout is
//! the on-disk format of `zram_stats.json`, so field names are part of the
//! file format and must not be renamed.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Number of hour-of-day slots in [`TimeAnalysis`].
pub const HOURS_PER_DAY: usize = 24;

/// One reading of a zram device. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawSample {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub memory_used_bytes: u64,
}

impl RawSample {
    /// Compressed size divided by original size; lower is better.
    ///
    /// An empty device (`original_bytes == 0`) yields 1.0, i.e. no benefit.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 1.0;
        }
        self.compressed_bytes as f64 / self.original_bytes as f64
    }
}

/// Compression ratio classes, upper bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioBucket {
    /// ratio <= 0.2
    Excellent,
    /// 0.2 < ratio <= 0.3
    Good,
    /// 0.3 < ratio <= 0.4
    Fair,
    /// ratio > 0.4
    Poor,
}

impl RatioBucket {
    pub fn classify(ratio: f64) -> Self {
        if ratio <= 0.2 {
            RatioBucket::Excellent
        } else if ratio <= 0.3 {
            RatioBucket::Good
        } else if ratio <= 0.4 {
            RatioBucket::Fair
        } else {
            RatioBucket::Poor
        }
    }
}

/// Device usage classes as a fraction of the configured size, upper bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageBucket {
    /// <= 25%
    Low,
    /// 25% < usage <= 50%
    Medium,
    /// 50% < usage <= 75%
    High,
    /// > 75%
    Critical,
}

impl UsageBucket {
    pub fn classify(fraction: f64) -> Self {
        if fraction <= 0.25 {
            UsageBucket::Low
        } else if fraction <= 0.50 {
            UsageBucket::Medium
        } else if fraction <= 0.75 {
            UsageBucket::High
        } else {
            UsageBucket::Critical
        }
    }
}

/// Fraction of `device_size` occupied by `used` bytes.
///
/// A zero-sized device is either empty (0.0) or fully over budget (1.0).
pub fn usage_fraction(used: u64, device_size: u64) -> f64 {
    if device_size == 0 {
        return if used == 0 { 0.0 } else { 1.0 };
    }
    used as f64 / device_size as f64
}

/// Host facts captured once when the statistics file is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Physical memory in bytes.
    pub total_memory: u64,
    pub kernel_version: String,
    pub start_time: DateTime<Utc>,
}

/// Device configuration captured once when the statistics file is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub algorithm: String,
    /// Configured device size in bytes; denominator of usage classes.
    pub initial_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressionStats {
    /// Lowest ratio seen. Meaningless while `sample_count == 0`.
    pub best_ratio: f64,
    /// Highest ratio seen. Meaningless while `sample_count == 0`.
    pub worst_ratio: f64,
    pub total_ratio: f64,
    pub sample_count: u64,
    pub excellent_count: u64,
    pub good_count: u64,
    pub fair_count: u64,
    pub poor_count: u64,
}

impl CompressionStats {
    fn record(&mut self, ratio: f64) {
        if self.sample_count == 0 {
            self.best_ratio = ratio;
            self.worst_ratio = ratio;
        } else {
            self.best_ratio = self.best_ratio.min(ratio);
            self.worst_ratio = self.worst_ratio.max(ratio);
        }
        self.total_ratio += ratio;
        self.sample_count += 1;

        match RatioBucket::classify(ratio) {
            RatioBucket::Excellent => self.excellent_count += 1,
            RatioBucket::Good => self.good_count += 1,
            RatioBucket::Fair => self.fair_count += 1,
            RatioBucket::Poor => self.poor_count += 1,
        }
    }

    /// Sum of the four class counters; equals `sample_count`.
    pub fn bucket_total(&self) -> u64 {
        self.excellent_count + self.good_count + self.fair_count + self.poor_count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub peak_usage: u64,
    /// Lowest usage seen. Meaningless while no samples were taken.
    pub min_usage: u64,
    pub total_usage: u64,
    pub low_count: u64,
    pub medium_count: u64,
    pub high_count: u64,
    pub critical_count: u64,
}

impl MemoryStats {
    fn record(&mut self, used: u64, device_size: u64, first: bool) {
        if first {
            self.min_usage = used;
            self.peak_usage = used;
        } else {
            self.min_usage = self.min_usage.min(used);
            self.peak_usage = self.peak_usage.max(used);
        }
        self.total_usage = self.total_usage.saturating_add(used);

        match UsageBucket::classify(usage_fraction(used, device_size)) {
            UsageBucket::Low => self.low_count += 1,
            UsageBucket::Medium => self.medium_count += 1,
            UsageBucket::High => self.high_count += 1,
            UsageBucket::Critical => self.critical_count += 1,
        }
    }

    /// Sum of the four class counters; equals the compression `sample_count`.
    pub fn bucket_total(&self) -> u64 {
        self.low_count + self.medium_count + self.high_count + self.critical_count
    }
}

/// Counters owned by collaborators outside the sampling path.
///
/// `update` never touches these; they are carried through save and load as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemImpact {
    pub oom_events: u64,
    pub max_swap_used: u64,
    /// Minutes spent under swap pressure.
    pub swap_pressure_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeAnalysis {
    /// Accumulated memory usage per local hour of day.
    pub hourly_usage: [u64; HOURS_PER_DAY],
    /// Sample count per local hour of day.
    pub hourly_samples: [u64; HOURS_PER_DAY],
}

/// Running aggregates for one zram device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub system_info: SystemInfo,
    pub config: DeviceConfig,
    pub compression_stats: CompressionStats,
    pub memory_stats: MemoryStats,
    pub system_impact: SystemImpact,
    pub time_analysis: TimeAnalysis,
}

impl AggregateStats {
    /// Creates empty aggregates with the write-once sections filled in.
    pub fn new(system_info: SystemInfo, config: DeviceConfig) -> Self {
        Self {
            system_info,
            config,
            ..Self::default()
        }
    }

    /// Folds one sample into the running aggregates.
    ///
    /// `now` selects the hour-of-day slot in its own time zone; pass
    /// `chrono::Local::now()` for local-time analysis.
    pub fn update<Tz: TimeZone>(&mut self, sample: RawSample, now: &DateTime<Tz>) {
        let first = self.compression_stats.sample_count == 0;

        self.compression_stats.record(sample.ratio());
        self.memory_stats
            .record(sample.memory_used_bytes, self.config.initial_size, first);

        let hour = now.hour() as usize;
        let slot = &mut self.time_analysis.hourly_usage[hour];
        *slot = slot.saturating_add(sample.memory_used_bytes);
        self.time_analysis.hourly_samples[hour] += 1;
    }

    pub fn sample_count(&self) -> u64 {
        self.compression_stats.sample_count
    }

    pub fn best_ratio(&self) -> Option<f64> {
        (self.sample_count() > 0).then_some(self.compression_stats.best_ratio)
    }

    pub fn worst_ratio(&self) -> Option<f64> {
        (self.sample_count() > 0).then_some(self.compression_stats.worst_ratio)
    }

    pub fn average_ratio(&self) -> Option<f64> {
        (self.sample_count() > 0)
            .then(|| self.compression_stats.total_ratio / self.sample_count() as f64)
    }

    pub fn min_usage(&self) -> Option<u64> {
        (self.sample_count() > 0).then_some(self.memory_stats.min_usage)
    }

    pub fn peak_usage(&self) -> Option<u64> {
        (self.sample_count() > 0).then_some(self.memory_stats.peak_usage)
    }

    pub fn average_usage(&self) -> Option<u64> {
        (self.sample_count() > 0).then(|| self.memory_stats.total_usage / self.sample_count())
    }

    /// Mean usage of samples taken during `hour` (0-23).
    pub fn hourly_average(&self, hour: usize) -> Option<u64> {
        let samples = *self.time_analysis.hourly_samples.get(hour)?;
        if samples == 0 {
            return None;
        }
        Some(self.time_analysis.hourly_usage[hour] / samples)
    }

    /// Hour of day with the highest mean usage, if any samples exist.
    pub fn busiest_hour(&self) -> Option<usize> {
        (0..HOURS_PER_DAY)
            .filter_map(|h| self.hourly_average(h).map(|avg| (h, avg)))
            .max_by_key(|&(_, avg)| avg)
            .map(|(h, _)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EIGHT_GIB: u64 = 8_589_934_592;

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, 30, 0).unwrap()
    }

    fn fresh(initial_size: u64) -> AggregateStats {
        AggregateStats::new(
            SystemInfo {
                total_memory: 16 << 30,
                kernel_version: "Linux version 6.1.0".to_string(),
                start_time: at_hour(0),
            },
            DeviceConfig {
                algorithm: "zstd".to_string(),
                initial_size,
            },
        )
    }

    fn sample(orig: u64, compr: u64, used: u64) -> RawSample {
        RawSample {
            original_bytes: orig,
            compressed_bytes: compr,
            memory_used_bytes: used,
        }
    }

    #[test]
    fn test_new_stats_are_unset() {
        let stats = fresh(EIGHT_GIB);

        assert_eq!(stats.sample_count(), 0);
        assert_eq!(stats.best_ratio(), None);
        assert_eq!(stats.worst_ratio(), None);
        assert_eq!(stats.average_ratio(), None);
        assert_eq!(stats.min_usage(), None);
        assert_eq!(stats.peak_usage(), None);
        assert_eq!(stats.average_usage(), None);
        assert_eq!(stats.busiest_hour(), None);
    }

    #[test]
    fn test_ratio_classes_scenario() {
        let mut stats = fresh(EIGHT_GIB);
        stats.update(sample(100, 15, 1000), &at_hour(9));
        stats.update(sample(100, 35, 1000), &at_hour(9));
        stats.update(sample(100, 45, 1000), &at_hour(9));

        let c = &stats.compression_stats;
        assert_eq!(c.excellent_count, 1);
        assert_eq!(c.good_count, 0);
        assert_eq!(c.fair_count, 1);
        assert_eq!(c.poor_count, 1);
        assert_eq!(stats.best_ratio(), Some(0.15));
        assert_eq!(stats.worst_ratio(), Some(0.45));
        assert_eq!(c.sample_count, 3);
    }

    #[test]
    fn test_zero_original_bytes_is_poor() {
        let mut stats = fresh(EIGHT_GIB);
        stats.update(sample(0, 0, 0), &at_hour(3));

        assert_eq!(stats.best_ratio(), Some(1.0));
        assert_eq!(stats.worst_ratio(), Some(1.0));
        assert_eq!(stats.compression_stats.poor_count, 1);
        assert!(stats.compression_stats.total_ratio.is_finite());
    }

    #[test]
    fn test_usage_class_scenario() {
        let mut stats = fresh(EIGHT_GIB);
        stats.update(sample(100, 20, 6_000_000_000), &at_hour(12));

        assert_eq!(stats.memory_stats.high_count, 1);
        assert_eq!(stats.memory_stats.bucket_total(), 1);
    }

    #[test]
    fn test_usage_class_boundaries() {
        assert_eq!(UsageBucket::classify(0.25), UsageBucket::Low);
        assert_eq!(UsageBucket::classify(0.2500001), UsageBucket::Medium);
        assert_eq!(UsageBucket::classify(0.5), UsageBucket::Medium);
        assert_eq!(UsageBucket::classify(0.75), UsageBucket::High);
        assert_eq!(UsageBucket::classify(0.76), UsageBucket::Critical);
    }

    #[test]
    fn test_ratio_class_boundaries() {
        assert_eq!(RatioBucket::classify(0.2), RatioBucket::Excellent);
        assert_eq!(RatioBucket::classify(0.25), RatioBucket::Good);
        assert_eq!(RatioBucket::classify(0.3), RatioBucket::Good);
        assert_eq!(RatioBucket::classify(0.4), RatioBucket::Fair);
        assert_eq!(RatioBucket::classify(0.41), RatioBucket::Poor);
        assert_eq!(RatioBucket::classify(1.0), RatioBucket::Poor);
    }

    #[test]
    fn test_zero_sized_device() {
        assert_eq!(usage_fraction(0, 0), 0.0);
        assert_eq!(usage_fraction(1, 0), 1.0);

        let mut stats = fresh(0);
        stats.update(sample(100, 20, 0), &at_hour(1));
        stats.update(sample(100, 20, 4096), &at_hour(1));
        assert_eq!(stats.memory_stats.low_count, 1);
        assert_eq!(stats.memory_stats.critical_count, 1);
    }

    #[test]
    fn test_zero_first_usage_seeds_min() {
        let mut stats = fresh(EIGHT_GIB);
        stats.update(sample(100, 20, 0), &at_hour(5));
        stats.update(sample(100, 20, 4096), &at_hour(5));

        assert_eq!(stats.min_usage(), Some(0));
        assert_eq!(stats.peak_usage(), Some(4096));
    }

    #[test]
    fn test_min_and_peak_usage() {
        let mut stats = fresh(EIGHT_GIB);
        for used in [5000, 2000, 9000, 3000] {
            stats.update(sample(100, 30, used), &at_hour(7));
        }

        assert_eq!(stats.min_usage(), Some(2000));
        assert_eq!(stats.peak_usage(), Some(9000));
        assert_eq!(stats.memory_stats.total_usage, 19000);
        assert_eq!(stats.average_usage(), Some(4750));
    }

    #[test]
    fn test_first_ratio_seeds_best_and_worst() {
        let mut stats = fresh(EIGHT_GIB);
        stats.update(sample(100, 50, 10), &at_hour(2));

        assert_eq!(stats.best_ratio(), Some(0.5));
        assert_eq!(stats.worst_ratio(), Some(0.5));

        stats.update(sample(100, 10, 10), &at_hour(2));
        assert_eq!(stats.best_ratio(), Some(0.1));
        assert_eq!(stats.worst_ratio(), Some(0.5));
    }

    #[test]
    fn test_hourly_slots() {
        let mut stats = fresh(EIGHT_GIB);
        stats.update(sample(100, 20, 1000), &at_hour(0));
        stats.update(sample(100, 20, 3000), &at_hour(23));
        stats.update(sample(100, 20, 5000), &at_hour(23));

        let t = &stats.time_analysis;
        assert_eq!(t.hourly_samples[0], 1);
        assert_eq!(t.hourly_samples[23], 2);
        assert_eq!(t.hourly_usage[23], 8000);
        assert_eq!(stats.hourly_average(23), Some(4000));
        assert_eq!(stats.hourly_average(12), None);
        assert_eq!(stats.hourly_average(24), None);
        assert_eq!(stats.busiest_hour(), Some(23));
    }

    #[test]
    fn test_hour_follows_time_zone_of_timestamp() {
        let offset = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2024, 6, 1, 1, 0, 0).unwrap();

        let mut stats = fresh(EIGHT_GIB);
        stats.update(sample(100, 20, 1000), &now);
        assert_eq!(stats.time_analysis.hourly_samples[1], 1);
    }

    #[test]
    fn test_system_impact_untouched() {
        let mut stats = fresh(EIGHT_GIB);
        stats.system_impact = SystemImpact {
            oom_events: 3,
            max_swap_used: 123,
            swap_pressure_time: 45,
        };
        stats.update(sample(100, 20, 1000), &at_hour(4));

        assert_eq!(stats.system_impact.oom_events, 3);
        assert_eq!(stats.system_impact.max_swap_used, 123);
        assert_eq!(stats.system_impact.swap_pressure_time, 45);
    }

    #[test]
    fn test_invariants_over_sample_sequence() {
        let mut stats = fresh(EIGHT_GIB);
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for i in 0..500u64 {
            let orig = next() % (4 << 30);
            let compr = if orig == 0 { 0 } else { next() % orig };
            let used = next() % (EIGHT_GIB + (1 << 30));
            stats.update(sample(orig, compr, used), &at_hour((i % 24) as u32));

            let c = &stats.compression_stats;
            assert_eq!(c.sample_count, i + 1);
            assert_eq!(c.bucket_total(), c.sample_count);
            assert_eq!(stats.memory_stats.bucket_total(), c.sample_count);
            assert_eq!(
                stats.time_analysis.hourly_samples.iter().sum::<u64>(),
                c.sample_count
            );

            let avg = stats.average_ratio().unwrap();
            assert!(stats.best_ratio().unwrap() <= avg + 1e-12);
            assert!(avg <= stats.worst_ratio().unwrap() + 1e-12);
        }
    }

    #[test]
    fn test_json_field_names() {
        let mut stats = fresh(EIGHT_GIB);
        stats.update(sample(100, 20, 1000), &at_hour(8));

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["config"]["algorithm"], "zstd");
        assert_eq!(value["config"]["initial_size"], EIGHT_GIB);
        assert_eq!(value["compression_stats"]["excellent_count"], 1);
        assert_eq!(value["memory_stats"]["low_count"], 1);
        assert_eq!(value["system_impact"]["oom_events"], 0);
        assert_eq!(value["time_analysis"]["hourly_samples"][8], 1);
        assert_eq!(
            value["time_analysis"]["hourly_usage"]
                .as_array()
                .unwrap()
                .len(),
            HOURS_PER_DAY
        );
        assert_eq!(
            value["system_info"]["start_time"],
            "2024-01-15T00:30:00Z"
        );
    }
}
