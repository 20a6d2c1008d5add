//! Utility modules for zramd.

pub mod kernel;

pub use kernel::KernelVersion;
