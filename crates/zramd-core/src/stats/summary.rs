//! One-line descriptions of samples and aggregates for log output.

use crate::fmt::{format_bytes, format_percent, format_ratio};

use super::model::{AggregateStats, RawSample, usage_fraction};

/// Describes a single sample: sizes, ratio and device fill level.
pub fn describe_sample(sample: &RawSample, device_size: u64) -> String {
    format!(
        "original {}, compressed {}, memory used {} (ratio {}, {} of device)",
        format_bytes(sample.original_bytes),
        format_bytes(sample.compressed_bytes),
        format_bytes(sample.memory_used_bytes),
        format_ratio(Some(sample.ratio())),
        format_percent(usage_fraction(sample.memory_used_bytes, device_size)),
    )
}

/// Summarizes the running aggregates.
pub fn summarize(stats: &AggregateStats) -> String {
    if stats.sample_count() == 0 {
        return format!(
            "no samples yet ({} on {})",
            stats.config.algorithm,
            format_bytes(stats.config.initial_size)
        );
    }

    let mut parts = vec![
        format!("{} samples", stats.sample_count()),
        format!(
            "ratio avg {} best {} worst {}",
            format_ratio(stats.average_ratio()),
            format_ratio(stats.best_ratio()),
            format_ratio(stats.worst_ratio())
        ),
        format!(
            "usage avg {} min {} peak {}",
            format_bytes(stats.average_usage().unwrap_or(0)),
            format_bytes(stats.min_usage().unwrap_or(0)),
            format_bytes(stats.peak_usage().unwrap_or(0))
        ),
    ];
    if let Some(hour) = stats.busiest_hour() {
        parts.push(format!("busiest hour {:02}:00", hour));
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::DeviceConfig;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_describe_sample() {
        let sample = RawSample {
            original_bytes: 4 * 1024 * 1024,
            compressed_bytes: 1024 * 1024,
            memory_used_bytes: 2 * 1024 * 1024,
        };
        let desc = describe_sample(&sample, 8 * 1024 * 1024);

        assert!(desc.contains("original 4.0M"));
        assert!(desc.contains("ratio 0.250"));
        assert!(desc.contains("25.0% of device"));
    }

    #[test]
    fn test_summarize_empty() {
        let stats = AggregateStats {
            config: DeviceConfig {
                algorithm: "lz4".to_string(),
                initial_size: 1 << 30,
            },
            ..AggregateStats::default()
        };
        assert_eq!(summarize(&stats), "no samples yet (lz4 on 1.0G)");
    }

    #[test]
    fn test_summarize_with_samples() {
        let mut stats = AggregateStats::default();
        stats.config.initial_size = 1 << 30;
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
        stats.update(
            RawSample {
                original_bytes: 1000,
                compressed_bytes: 300,
                memory_used_bytes: 2048,
            },
            &now,
        );

        let summary = summarize(&stats);
        assert!(summary.starts_with("1 samples"));
        assert!(summary.contains("best 0.300"));
        assert!(summary.contains("peak 2.0K"));
        assert!(summary.contains("busiest hour 18:00"));
    }
}
