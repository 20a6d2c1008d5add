//! Host facts captured once when a new statistics file is created.

use std::path::{Path, PathBuf};

use crate::collector::error::{CollectError, ParseError};
use crate::collector::traits::FileSystem;
use crate::util::KernelVersion;

/// Returned by [`HostInfo::kernel_version`] when `/proc/version` is unreadable.
pub const UNKNOWN_KERNEL: &str = "unknown";

/// Reads memory size, kernel identification and zram module state.
pub struct HostInfo<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
    sys_path: PathBuf,
}

impl<F: FileSystem> HostInfo<F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    /// * `sys_path` - Base path to sysfs (usually "/sys")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>, sys_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            sys_path: sys_path.into(),
        }
    }

    /// Total physical memory in bytes, from `MemTotal` in `/proc/meminfo`.
    pub fn total_memory(&self) -> Result<u64, CollectError> {
        let path = self.proc_path.join("meminfo");
        let content = self.read(&path)?;
        parse_mem_total(&content).map_err(|e| CollectError::parse(path.display().to_string(), e))
    }

    /// Full kernel banner from `/proc/version`, or [`UNKNOWN_KERNEL`].
    pub fn kernel_version(&self) -> String {
        self.fs
            .read_to_string(&self.proc_path.join("version"))
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| UNKNOWN_KERNEL.to_string())
    }

    /// Parsed kernel release from `/proc/sys/kernel/osrelease`.
    pub fn kernel_release(&self) -> Option<KernelVersion> {
        self.fs
            .read_to_string(&self.proc_path.join("sys/kernel/osrelease"))
            .ok()
            .and_then(|s| KernelVersion::parse(&s))
    }

    /// Returns `true` if the zram kernel module is loaded.
    pub fn zram_module_loaded(&self) -> bool {
        self.fs.exists(&self.sys_path.join("module/zram"))
    }

    fn read(&self, path: &Path) -> Result<String, CollectError> {
        self.fs
            .read_to_string(path)
            .map_err(|e| CollectError::io(path.display().to_string(), e))
    }
}

/// Extracts `MemTotal` from `/proc/meminfo` content, converted from kB to bytes.
pub fn parse_mem_total(content: &str) -> Result<u64, ParseError> {
    let line = content
        .lines()
        .find(|l| l.starts_with("MemTotal:"))
        .ok_or_else(|| ParseError::new("MemTotal not found in meminfo"))?;

    let kb: u64 = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ParseError::new(format!("invalid MemTotal line: {}", line)))?
        .parse()
        .map_err(|_| ParseError::new(format!("invalid MemTotal line: {}", line)))?;

    kb.checked_mul(1024)
        .ok_or_else(|| ParseError::new(format!("MemTotal out of range: {} kB", kb)))
}
