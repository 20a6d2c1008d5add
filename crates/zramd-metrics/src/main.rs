//! zramd-metrics - zram statistics collector daemon.
//!
//! Samples one zram device on a fixed interval and keeps running
//! compression, usage and time-of-day aggregates in a JSON file that
//! survives restarts.

use std::process::ExitCode;
use std::sync::mpsc::channel;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use zramd_core::collector::{CollectError, HostInfo, RealFs, ZramDevice, list_devices};
use zramd_core::fmt::format_bytes;
use zramd_core::monitor::Monitor;
use zramd_core::stats::summarize;
use zramd_core::storage::{DEFAULT_DATA_DIR, StatsStore, StoreError};

/// zram statistics collector daemon.
#[derive(Parser, Debug)]
#[command(name = "zramd-metrics", about = "zram statistics collector daemon", version)]
struct Args {
    /// zram device ID to monitor.
    #[arg(short, long, default_value = "0")]
    device: u32,

    /// Collection interval in seconds.
    #[arg(short, long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Directory holding zram_stats.json and its backup.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: String,

    /// Path to sysfs (for testing/mocking).
    #[arg(long, default_value = "/sys")]
    sys_path: String,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Run without root privileges (the data directory must be writable).
    #[arg(long)]
    skip_root_check: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Conditions that prevent monitoring from starting.
#[derive(Debug, Error)]
enum StartupError {
    #[error("root privileges are required")]
    NotRoot,
    #[error("zram module is not loaded")]
    ModuleNotLoaded,
    #[error("zram{device} device does not exist (available: {available})")]
    MissingDevice { device: u32, available: String },
    #[error("getting device {what}: {source}")]
    DeviceConfig {
        what: &'static str,
        #[source]
        source: CollectError,
    },
    #[error("initializing stats: {0}")]
    Stats(#[from] StoreError),
    #[error("installing signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = log_level(verbose, quiet);

    let mut filter = EnvFilter::from_default_env();
    for target in ["zramd_metrics", "zramd_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn describe_available(ids: &[u32]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(|id| format!("zram{}", id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn run(args: &Args) -> Result<(), StartupError> {
    if !args.skip_root_check && !nix::unistd::geteuid().is_root() {
        return Err(StartupError::NotRoot);
    }

    let host = HostInfo::new(RealFs::new(), &args.proc_path, &args.sys_path);
    if !host.zram_module_loaded() {
        return Err(StartupError::ModuleNotLoaded);
    }

    let kernel = host.kernel_release();
    match kernel {
        Some(v) if !v.supports_zram() => warn!("Kernel {} predates zram swap support (3.14)", v),
        Some(_) => {}
        None => warn!("Could not determine kernel release"),
    }

    let device = ZramDevice::new(RealFs::new(), &args.sys_path, args.device);
    if !device.exists() {
        return Err(StartupError::MissingDevice {
            device: args.device,
            available: describe_available(&list_devices(&RealFs::new(), &args.sys_path)),
        });
    }

    let algorithm = device
        .algorithm()
        .map_err(|source| StartupError::DeviceConfig {
            what: "algorithm",
            source,
        })?;
    let size = device
        .disk_size()
        .map_err(|source| StartupError::DeviceConfig {
            what: "size",
            source,
        })?;
    info!(
        "Device zram{}: algorithm={}, disksize={}",
        args.device,
        algorithm,
        format_bytes(size)
    );
    if algorithm == "zstd" && kernel.is_some_and(|v| !v.supports_zstd()) {
        warn!("The zstd algorithm is not supported on kernels < 4.19");
    }

    let store = StatsStore::new(&args.data_dir);
    let stats = store.load_or_initialize(&algorithm, size, &host)?;
    info!("Stats: {}", summarize(&stats));

    let (tx, rx) = channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })?;

    let interval = Duration::from_secs(args.interval);
    let mut monitor = Monitor::new(device, store, stats, interval);
    monitor.run(&rx);

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("zramd-metrics {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: device=zram{}, interval={}s, data_dir={}, sys={}, proc={}",
        args.device, args.interval, args.data_dir, args.sys_path, args.proc_path
    );

    match run(&args) {
        Ok(()) => {
            info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_defaults() {
        let args = Args::try_parse_from(["zramd-metrics"]).unwrap();
        assert_eq!(args.device, 0);
        assert_eq!(args.interval, 60);
        assert_eq!(args.data_dir, "/var/log/zramd/metrics");
        assert_eq!(args.sys_path, "/sys");
        assert!(!args.skip_root_check);
    }

    #[test]
    fn args_reject_zero_interval() {
        assert!(Args::try_parse_from(["zramd-metrics", "--interval", "0"]).is_err());
    }

    #[test]
    fn args_device_and_verbosity() {
        let args = Args::try_parse_from(["zramd-metrics", "-d", "2", "-vv"]).unwrap();
        assert_eq!(args.device, 2);
        assert_eq!(log_level(args.verbose, args.quiet), Level::TRACE);
        assert_eq!(log_level(0, true), Level::ERROR);
        assert_eq!(log_level(0, false), Level::INFO);
    }

    #[test]
    fn describe_available_devices() {
        assert_eq!(describe_available(&[]), "none");
        assert_eq!(describe_available(&[0, 3]), "zram0, zram3");
    }

    #[test]
    fn missing_device_message() {
        let err = StartupError::MissingDevice {
            device: 4,
            available: "zram0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "zram4 device does not exist (available: zram0)"
        );
    }
}
