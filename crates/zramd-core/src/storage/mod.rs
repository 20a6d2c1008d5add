//! Persistence of aggregate statistics.

mod store;

pub use store::{BACKUP_SUFFIX, DEFAULT_DATA_DIR, STATS_FILE, StatsStore, StoreError};
