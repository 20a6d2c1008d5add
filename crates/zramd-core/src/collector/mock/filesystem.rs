//! In-memory sysfs/procfs tree for tests.
//!
//! Paths are kept ordered, so `read_dir` lists entries the way a sorted
//! directory walk would and device enumeration is reproducible.

use crate::collector::traits::FileSystem;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a file, creating any missing parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref();
        self.add_ancestors(path);
        self.files.insert(path.to_path_buf(), content.into());
    }

    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.add_ancestors(path);
        self.directories.insert(path.to_path_buf());
    }

    /// Drops one attribute file, as when a counter is missing on older kernels.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        self.files.remove(path.as_ref());
    }

    /// Drops a directory and everything below it, as on `hot_remove`.
    pub fn remove_dir(&mut self, path: impl AsRef<Path>) {
        let root = path.as_ref();
        self.files.retain(|p, _| !p.starts_with(root));
        self.directories.retain(|p| !p.starts_with(root));
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.as_os_str().is_empty() {
                self.directories.insert(ancestor.to_path_buf());
            }
        }
    }

    fn not_found(kind: &str, path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found: {}", kind, path.display()),
        )
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found("file", path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(Self::not_found("directory", path));
        }

        let children: BTreeSet<&PathBuf> = self
            .files
            .keys()
            .chain(self.directories.iter())
            .filter(|p| p.parent() == Some(path))
            .collect();

        Ok(children.into_iter().cloned().collect())
    }
}
