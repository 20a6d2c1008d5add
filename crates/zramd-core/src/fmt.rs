//! Formatting helpers for log output.

/// Format byte count as human-readable size: `"1.5G"`, `"100.3M"`, `"50.0K"`, `"512B"`.
pub fn format_bytes(bytes: u64) -> String {
    const GB: u64 = 1024 * 1024 * 1024;
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;

    if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format an optional compression ratio with three decimals, `"-"` when unset.
pub fn format_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.3}", r),
        None => "-".to_string(),
    }
}

/// Format a fraction as a percentage with one decimal: `0.699` -> `"69.9%"`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(1536), "1.5K");
        assert_eq!(format_bytes(100 * 1024 * 1024), "100.0M");
        assert_eq!(format_bytes(8_589_934_592), "8.0G");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(Some(0.25)), "0.250");
        assert_eq!(format_ratio(None), "-");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.699), "69.9%");
        assert_eq!(format_percent(0.0), "0.0%");
    }
}
