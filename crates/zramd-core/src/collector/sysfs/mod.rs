//! Readers for the zram sysfs interface.
//!
//! This module provides parsers and a device reader for the attribute files
//! the kernel exposes under `/sys/block/zram<id>/`.

mod device;
pub mod parser;

pub use device::{ZramDevice, list_devices};
