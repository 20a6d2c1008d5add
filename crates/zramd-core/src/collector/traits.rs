//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait lets the sysfs and procfs readers work against the
//! real kernel interfaces on Linux and against in-memory fixtures in tests.

use std::io;
use std::path::{Path, PathBuf};

use crate::collector::error::CollectError;
use crate::stats::RawSample;

/// Abstraction for read-only filesystem operations.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}

/// Produces one raw reading of a compressed swap device per call.
pub trait SampleSource {
    fn collect(&mut self) -> Result<RawSample, CollectError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_real_fs_reads_and_lists() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("disksize"), "1073741824\n").unwrap();
        std::fs::write(dir.path().join("comp_algorithm"), "lzo [zstd]\n").unwrap();

        let fs = RealFs::new();
        let content = fs.read_to_string(&dir.path().join("disksize")).unwrap();
        assert_eq!(content.trim(), "1073741824");

        let entries = fs.read_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_real_fs_exists() {
        let dir = tempdir().unwrap();
        let fs = RealFs::new();
        assert!(fs.exists(dir.path()));
        assert!(!fs.exists(&dir.path().join("zram42")));
    }
}
