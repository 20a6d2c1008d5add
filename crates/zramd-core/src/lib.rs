//! zramd-core — statistics engine for the zramd metrics collector.
//!
//! Provides:
//! - `collector` — zram sysfs reader and host facts, behind a `FileSystem` trait
//! - `stats` — running aggregate statistics and the per-sample update
//! - `storage` — crash-safe JSON persistence with a backup generation
//! - `monitor` — the collection loop driving sample, update and save
//! - `util` — kernel version helpers
//! - `fmt` — byte and ratio formatting for log output

pub mod collector;
pub mod fmt;
pub mod monitor;
pub mod stats;
pub mod storage;
pub mod util;
