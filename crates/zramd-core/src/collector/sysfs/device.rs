//! Reader for a single zram block device under `/sys/block/zram<id>/`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collector::error::CollectError;
use crate::collector::sysfs::parser::{
    MmStat, parse_comp_algorithm, parse_device_name, parse_mm_stat, parse_u64_value,
};
use crate::collector::traits::{FileSystem, SampleSource};
use crate::stats::RawSample;

/// Reads configuration and usage counters of one zram device.
pub struct ZramDevice<F: FileSystem> {
    fs: F,
    id: u32,
    device_path: PathBuf,
}

impl<F: FileSystem> ZramDevice<F> {
    /// Creates a reader for `zram<id>`.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `sys_path` - Base path to sysfs (usually "/sys")
    /// * `id` - Device index
    pub fn new(fs: F, sys_path: impl AsRef<Path>, id: u32) -> Self {
        let device_path = sys_path.as_ref().join("block").join(format!("zram{}", id));
        Self {
            fs,
            id,
            device_path,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns `true` if the device directory is present.
    pub fn exists(&self) -> bool {
        self.fs.exists(&self.device_path)
    }

    /// Reads the selected compression algorithm from `comp_algorithm`.
    pub fn algorithm(&self) -> Result<String, CollectError> {
        let (path, content) = self.read_attr("comp_algorithm")?;
        parse_comp_algorithm(&content).map_err(|e| CollectError::parse(path, e))
    }

    /// Reads the configured device size in bytes from `disksize`.
    pub fn disk_size(&self) -> Result<u64, CollectError> {
        self.read_value("disksize")
    }

    /// Reads the current original, compressed and memory-used byte counts.
    ///
    /// `mm_stat` is preferred; devices on kernels that predate it expose
    /// one file per counter instead.
    pub fn read_sample(&self) -> Result<RawSample, CollectError> {
        if !self.exists() {
            return Err(CollectError::MissingDevice(self.id));
        }

        match self.read_mm_stat() {
            Ok(stat) => Ok(RawSample {
                original_bytes: stat.orig_data_size,
                compressed_bytes: stat.compr_data_size,
                memory_used_bytes: stat.mem_used_total,
            }),
            Err(e) => {
                debug!("zram{}: mm_stat unavailable ({}), reading per-counter files", self.id, e);
                Ok(RawSample {
                    original_bytes: self.read_value("orig_data_size")?,
                    compressed_bytes: self.read_value("compr_data_size")?,
                    memory_used_bytes: self.read_value("mem_used_total")?,
                })
            }
        }
    }

    fn read_mm_stat(&self) -> Result<MmStat, CollectError> {
        let (path, content) = self.read_attr("mm_stat")?;
        parse_mm_stat(&content).map_err(|e| CollectError::parse(path, e))
    }

    fn read_value(&self, name: &str) -> Result<u64, CollectError> {
        let (path, content) = self.read_attr(name)?;
        parse_u64_value(&content, name).map_err(|e| CollectError::parse(path, e))
    }

    fn read_attr(&self, name: &str) -> Result<(String, String), CollectError> {
        let path = self.device_path.join(name);
        let display = path.display().to_string();
        match self.fs.read_to_string(&path) {
            Ok(content) => Ok((display, content)),
            Err(e) => Err(CollectError::io(display, e)),
        }
    }
}

impl<F: FileSystem> SampleSource for ZramDevice<F> {
    fn collect(&mut self) -> Result<RawSample, CollectError> {
        self.read_sample()
    }
}

/// Lists the indexes of all zram devices present under `<sys_path>/block`.
pub fn list_devices<F: FileSystem>(fs: &F, sys_path: impl AsRef<Path>) -> Vec<u32> {
    let block = sys_path.as_ref().join("block");
    let mut ids: Vec<u32> = fs
        .read_dir(&block)
        .unwrap_or_default()
        .iter()
        .filter_map(|p| p.file_name()?.to_str().and_then(parse_device_name))
        .collect();
    ids.sort_unstable();
    ids
}
