//! zram counter and host fact collection for Linux.
//!
//! This module reads the zram sysfs interface and a few `/proc` files,
//! with support for mocking so tests run without a zram device.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │   ZramDevice (SampleSource)         HostInfo         │
//! │   - /sys/block/zram<id>/mm_stat     - /proc/meminfo  │
//! │   - comp_algorithm, disksize        - /proc/version  │
//! │   - orig_data_size, ... (legacy)    - /sys/module    │
//! │                 └──────────┬──────────┘              │
//! │                     ┌──────▼──────┐                  │
//! │                     │  FileSystem │ (trait)          │
//! │                     └──────┬──────┘                  │
//! └────────────────────────────┼─────────────────────────┘
//!                     ┌────────┴────────┐
//!              ┌──────▼──────┐   ┌──────▼──────┐
//!              │   RealFs    │   │   MockFs    │
//!              └─────────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use zramd_core::collector::{MockFs, SampleSource, ZramDevice};
//!
//! let fs = MockFs::zram_device(0, 4096, 1024, 2048, "zstd", 1 << 30);
//! let mut device = ZramDevice::new(fs, "/sys", 0);
//! let sample = device.collect().unwrap();
//! assert_eq!(sample.compressed_bytes, 1024);
//! ```

mod error;
pub mod host;
pub mod mock;
pub mod sysfs;
pub mod traits;

pub use error::{CollectError, ParseError};
pub use host::HostInfo;
pub use mock::MockFs;
pub use sysfs::{ZramDevice, list_devices};
pub use traits::{FileSystem, RealFs, SampleSource};
