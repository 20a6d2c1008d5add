//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/sys/block/zram*` and `/proc`
//! states for exercising the readers and the collection loop.

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a host with the zram module loaded and a single device
    /// exposing `mm_stat` (kernels 4.1 and newer).
    ///
    /// `mm_stat` holds original, compressed and memory-used bytes; the
    /// remaining kernel columns are filled with zeros.
    pub fn zram_device(
        id: u32,
        orig: u64,
        compr: u64,
        mem_used: u64,
        algorithm: &str,
        disksize: u64,
    ) -> Self {
        let mut fs = Self::typical_host();
        let base = format!("/sys/block/zram{}", id);
        fs.add_file(
            format!("{}/mm_stat", base),
            format!(
                "{:>16} {:>16} {:>16}        0 {:>16}        0        0        0        0\n",
                orig, compr, mem_used, mem_used
            ),
        );
        fs.add_file(format!("{}/comp_algorithm", base), algorithm_line(algorithm));
        fs.add_file(format!("{}/disksize", base), format!("{}\n", disksize));
        fs
    }

    /// Creates a host whose zram device only exposes the per-counter files
    /// used by kernels before `mm_stat` existed.
    pub fn legacy_zram_device(
        id: u32,
        orig: u64,
        compr: u64,
        mem_used: u64,
        algorithm: &str,
        disksize: u64,
    ) -> Self {
        let mut fs = Self::typical_host();
        let base = format!("/sys/block/zram{}", id);
        fs.add_file(format!("{}/orig_data_size", base), format!("{}\n", orig));
        fs.add_file(format!("{}/compr_data_size", base), format!("{}\n", compr));
        fs.add_file(format!("{}/mem_used_total", base), format!("{}\n", mem_used));
        fs.add_file(format!("{}/comp_algorithm", base), algorithm_line(algorithm));
        fs.add_file(format!("{}/disksize", base), format!("{}\n", disksize));
        fs
    }

    /// Creates a host with procfs files and the zram module loaded, but no devices.
    pub fn typical_host() -> Self {
        let mut fs = Self::new();

        fs.add_dir("/sys/module/zram");
        fs.add_dir("/sys/block/sda");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       8388604 kB
SwapFree:        8388604 kB
",
        );
        fs.add_file(
            "/proc/version",
            "Linux version 6.1.0-13-amd64 (debian-kernel@lists.debian.org) (gcc-12 (Debian 12.2.0-14) 12.2.0, GNU ld (GNU Binutils for Debian) 2.40) #1 SMP PREEMPT_DYNAMIC Debian 6.1.55-1 (2023-09-29)\n",
        );
        fs.add_file("/proc/sys/kernel/osrelease", "6.1.0-13-amd64\n");

        fs
    }
}

/// Renders the kernel's `comp_algorithm` format with the selected entry bracketed.
fn algorithm_line(selected: &str) -> String {
    let mut names = vec!["lzo", "lzo-rle", "lz4", "lz4hc", "842", "zstd"];
    if !names.contains(&selected) {
        names.push(selected);
    }
    let parts: Vec<String> = names
        .iter()
        .map(|name| {
            if *name == selected {
                format!("[{}]", name)
            } else {
                name.to_string()
            }
        })
        .collect();
    format!("{}\n", parts.join(" "))
}
