//! Parsers for zram sysfs attribute files.
//!
//! Pure functions over file content, testable with string inputs.
//! Attribute layout follows Documentation/admin-guide/blockdev/zram.rst.

use crate::collector::error::ParseError;

/// The leading columns of `/sys/block/zram<id>/mm_stat`.
///
/// The kernel appends further columns (mem_limit, mem_used_max,
/// same_pages, pages_compacted, huge_pages, ...) that are not needed here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MmStat {
    pub orig_data_size: u64,
    pub compr_data_size: u64,
    pub mem_used_total: u64,
}

/// Parses `mm_stat` content.
pub fn parse_mm_stat(content: &str) -> Result<MmStat, ParseError> {
    let fields: Vec<&str> = content.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(ParseError::new(format!(
            "not enough fields in mm_stat: expected 3+, got {}",
            fields.len()
        )));
    }

    let parse_field = |idx: usize, name: &str| -> Result<u64, ParseError> {
        fields[idx]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {} '{}'", name, fields[idx])))
    };

    Ok(MmStat {
        orig_data_size: parse_field(0, "orig_data_size")?,
        compr_data_size: parse_field(1, "compr_data_size")?,
        mem_used_total: parse_field(2, "mem_used_total")?,
    })
}

/// Parses a single-value attribute such as `disksize` or `orig_data_size`.
pub fn parse_u64_value(content: &str, name: &str) -> Result<u64, ParseError> {
    let value = content.trim();
    value
        .parse()
        .map_err(|_| ParseError::new(format!("invalid {} '{}'", name, value)))
}

/// Parses `comp_algorithm` content and returns the selected algorithm.
///
/// The kernel lists every available algorithm and brackets the active one:
/// `lzo lzo-rle [lz4] zstd`. When nothing is bracketed the first entry wins.
pub fn parse_comp_algorithm(content: &str) -> Result<String, ParseError> {
    let algorithms: Vec<&str> = content.split_whitespace().collect();

    if let Some(selected) = algorithms
        .iter()
        .find(|a| a.len() > 2 && a.starts_with('[') && a.ends_with(']'))
    {
        return Ok(selected[1..selected.len() - 1].to_string());
    }

    algorithms
        .first()
        .map(|a| a.to_string())
        .ok_or_else(|| ParseError::new("no compression algorithm found"))
}

/// Extracts the device index from a block device name (`zram3` -> 3).
pub fn parse_device_name(name: &str) -> Option<u32> {
    name.strip_prefix("zram")?.parse().ok()
}
