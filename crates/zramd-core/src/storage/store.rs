//! Durable JSON storage of [`AggregateStats`] with a backup generation.
//!
//! Every save writes `zram_stats.json.bak` first and `zram_stats.json`
//! second. Each file is replaced atomically via a `.tmp` intermediate, so
//! an interrupted save leaves at least one complete copy behind.

use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::collector::{CollectError, FileSystem, HostInfo};
use crate::stats::{AggregateStats, DeviceConfig, SystemInfo};

/// Default directory for the statistics file.
pub const DEFAULT_DATA_DIR: &str = "/var/log/zramd/metrics";
/// Name of the canonical statistics file.
pub const STATS_FILE: &str = "zram_stats.json";
/// Suffix appended to the canonical file name for the backup copy.
pub const BACKUP_SUFFIX: &str = ".bak";

const TMP_SUFFIX: &str = ".tmp";
const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// Error type for statistics persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Neither the canonical file nor its backup exists.
    #[error("stats file not found at {}, initialize first", .0.display())]
    NotFound(PathBuf),
    /// Filesystem failure on a directory or file.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// File content is not a valid statistics document.
    #[error("parsing {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoding stats: {0}")]
    Encode(#[source] serde_json::Error),
    /// Host facts for a new statistics file could not be read.
    #[error("reading host facts: {0}")]
    Host(#[from] CollectError),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// File-backed store for one device's aggregate statistics.
#[derive(Debug, Clone)]
pub struct StatsStore {
    dir: PathBuf,
}

impl StatsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store at [`DEFAULT_DATA_DIR`].
    pub fn default_location() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical statistics file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(STATS_FILE)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.dir.join(format!("{}{}", STATS_FILE, BACKUP_SUFFIX))
    }

    /// Returns `true` if either the canonical file or the backup is present.
    pub fn exists(&self) -> bool {
        self.path().exists() || self.backup_path().exists()
    }

    /// Builds fresh statistics from live host facts and the device config.
    ///
    /// Creates the storage directory if needed. The new statistics are
    /// written only when no canonical file exists yet; an existing file is
    /// neither read nor replaced.
    pub fn initialize<F: FileSystem>(
        &self,
        algorithm: &str,
        initial_size: u64,
        host: &HostInfo<F>,
    ) -> Result<AggregateStats, StoreError> {
        self.prepare_dir()?;

        let system_info = SystemInfo {
            total_memory: host.total_memory()?,
            kernel_version: host.kernel_version(),
            start_time: Utc::now(),
        };
        let config = DeviceConfig {
            algorithm: algorithm.to_string(),
            initial_size,
        };
        let stats = AggregateStats::new(system_info, config);

        let path = self.path();
        if !path.exists() {
            write_atomic(&path, &stats)?;
            info!("Created stats file {}", path.display());
        }

        Ok(stats)
    }

    /// Reads the canonical file, falling back to the backup copy.
    ///
    /// The backup is consulted when the canonical file is missing,
    /// unreadable or unparsable. When both parse and the backup holds more
    /// samples, a save was interrupted after its backup write and the backup
    /// is returned. If both fail, the canonical file's error is returned
    /// ([`StoreError::NotFound`] when neither exists).
    pub fn load(&self) -> Result<AggregateStats, StoreError> {
        let path = self.path();
        let backup = self.backup_path();
        let primary = read_stats(&path);
        let secondary = if backup.exists() {
            Some(read_stats(&backup))
        } else {
            None
        };

        match (primary, secondary) {
            (Ok(stats), None) => Ok(stats),
            (Ok(stats), Some(Ok(newer))) if newer.sample_count() > stats.sample_count() => {
                warn!(
                    "Backup {} is ahead of {} ({} vs {} samples), using backup",
                    backup.display(),
                    path.display(),
                    newer.sample_count(),
                    stats.sample_count()
                );
                Ok(newer)
            }
            (Ok(stats), Some(Ok(_))) => Ok(stats),
            (Ok(stats), Some(Err(e))) => {
                warn!("Backup {} is unusable: {}", backup.display(), e);
                Ok(stats)
            }
            (Err(primary), None) => Err(primary),
            (Err(primary), Some(Ok(stats))) => {
                warn!(
                    "Recovered stats from backup {} ({})",
                    backup.display(),
                    primary
                );
                Ok(stats)
            }
            (Err(primary), Some(Err(backup_err))) => {
                warn!("Backup {} is unusable: {}", backup.display(), backup_err);
                match primary {
                    StoreError::NotFound(_) => Err(backup_err),
                    other => Err(other),
                }
            }
        }
    }

    /// Writes `stats` to the backup path, then to the canonical path.
    ///
    /// A failed backup write returns before the canonical file is touched.
    pub fn save(&self, stats: &AggregateStats) -> Result<(), StoreError> {
        write_atomic(&self.backup_path(), stats)?;
        write_atomic(&self.path(), stats)?;
        debug!("Saved {} samples to {}", stats.sample_count(), self.path().display());
        Ok(())
    }

    /// Loads existing statistics, or initializes new ones if none exist.
    ///
    /// Loaded statistics keep their recorded configuration; a differing live
    /// algorithm or size is logged but not applied.
    pub fn load_or_initialize<F: FileSystem>(
        &self,
        algorithm: &str,
        initial_size: u64,
        host: &HostInfo<F>,
    ) -> Result<AggregateStats, StoreError> {
        if !self.exists() {
            return self.initialize(algorithm, initial_size, host);
        }

        self.prepare_dir()?;
        let stats = self.load()?;
        info!(
            "Loaded stats from {}: {} samples since {}",
            self.dir.display(),
            stats.sample_count(),
            stats.system_info.start_time.to_rfc3339()
        );

        if stats.config.algorithm != algorithm || stats.config.initial_size != initial_size {
            warn!(
                "Device config changed since stats were created (recorded {} / {} bytes, live {} / {} bytes); keeping recorded config",
                stats.config.algorithm, stats.config.initial_size, algorithm, initial_size
            );
        }

        Ok(stats)
    }

    /// Creates the storage directory and removes leftovers of interrupted writes.
    fn prepare_dir(&self) -> Result<(), StoreError> {
        create_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        if let Ok(entries) = fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(TMP_SUFFIX))
                {
                    debug!("Removing stale {}", path.display());
                    let _ = fs::remove_file(&path);
                }
            }
        }

        Ok(())
    }
}

fn read_stats(path: &Path) -> Result<AggregateStats, StoreError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    serde_json::from_slice(&data).map_err(|source| StoreError::Format {
        path: path.to_path_buf(),
        source,
    })
}

/// Replaces `path` with the pretty-printed JSON of `stats` via a synced `.tmp` file.
fn write_atomic(path: &Path, stats: &AggregateStats) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(stats).map_err(StoreError::Encode)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(TMP_SUFFIX);
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| -> io::Result<()> {
        let mut file = open_for_write(&tmp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, path)
    })();

    result.map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::io(path, e)
    })
}

#[cfg(unix)]
fn open_for_write(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(FILE_MODE)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_write(path: &Path) -> io::Result<fs::File> {
    let _ = FILE_MODE;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn create_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    DirBuilder::new().recursive(true).mode(DIR_MODE).create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> io::Result<()> {
    let _ = DIR_MODE;
    DirBuilder::new().recursive(true).create(path)
}
