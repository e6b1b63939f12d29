use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{LoadError, Result};

/// First instance port; instance `N` listens on `BASE_PORT + N`.
pub const BASE_PORT: u16 = 63000;

pub const DEFAULT_MAX_KEYS: u64 = 5000;
pub const DEFAULT_RATIO: u32 = 4;
pub const DEFAULT_MAX_PAUSE: Duration = Duration::from_millis(25);
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const IO_TIMEOUT: Duration = Duration::from_secs(1);
pub const STATUS_INTERVAL: Duration = Duration::from_millis(50);

/// Driver configuration. Fixed once the driver is built.
#[derive(Debug, Clone)]
pub struct Config {
    /// Main directory of the split installation
    pub main_dir: PathBuf,
    /// Keys are drawn from `[0, max_keys)`
    pub max_keys: u64,
    /// One write per `ratio` operations on average
    pub ratio: u32,
    /// Upper bound of the random pause before each operation
    pub max_pause: Duration,
    pub refresh_interval: Duration,
    pub host: IpAddr,
    pub base_port: u16,
    /// Applied separately to connect, read and write
    pub io_timeout: Duration,
    pub status_interval: Duration,
}

impl Config {
    pub fn new(main_dir: impl Into<PathBuf>) -> Self {
        Self {
            main_dir: main_dir.into(),
            max_keys: DEFAULT_MAX_KEYS,
            ratio: DEFAULT_RATIO,
            max_pause: DEFAULT_MAX_PAUSE,
            refresh_interval: REFRESH_INTERVAL,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            base_port: BASE_PORT,
            io_timeout: IO_TIMEOUT,
            status_interval: STATUS_INTERVAL,
        }
    }

    pub fn max_keys(mut self, max_keys: u64) -> Self {
        self.max_keys = max_keys;
        self
    }

    pub fn ratio(mut self, ratio: u32) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn max_pause(mut self, max_pause: Duration) -> Self {
        self.max_pause = max_pause;
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn base_port(mut self, port: u16) -> Self {
        self.base_port = port;
        self
    }

    pub fn status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_keys == 0 {
            return Err(LoadError::InvalidConfig("key space must not be empty".into()));
        }
        if self.ratio == 0 {
            return Err(LoadError::InvalidConfig("ratio must be at least 1".into()));
        }
        if self.io_timeout.is_zero() {
            return Err(LoadError::InvalidConfig("I/O timeout must be positive".into()));
        }
        Ok(())
    }
}
