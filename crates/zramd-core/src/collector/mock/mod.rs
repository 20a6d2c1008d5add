//! Mock filesystem and fixtures for testing without a real zram device.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
