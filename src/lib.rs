//! splitload - payload generator for split Redis-compatible deployments
//!
//! Discovers instances from the installation directory, tracks their
//! liveness through marker files and keeps sending a random mix of GET and
//! SET requests to whichever instances are up.
//!
//! # Example
//!
//! ```no_run
//! use rand::SeedableRng;
//! use splitload::{Config, Driver};
//!
//! # async fn example() {
//! let config = Config::new("/opt/redis-split").max_keys(35000).ratio(10);
//! let mut driver = Driver::new(&config, rand::rngs::StdRng::seed_from_u64(7));
//! driver.run_cycles(10_000).await;
//! println!("{} writes", driver.counters().writes);
//! # }
//! ```

pub mod client;
pub mod config;
pub mod directory;
pub mod driver;
pub mod error;
pub mod layout;
pub mod liveness;
pub mod pacing;
pub mod pool;
pub mod resp;
pub mod selector;
pub mod stats;
pub mod types;

pub use client::Connection;
pub use config::Config;
pub use directory::InstanceDirectory;
pub use driver::{CycleOutcome, Driver, StopReason};
pub use error::{LoadError, Result};
pub use layout::Layout;
pub use liveness::LivenessChecker;
pub use pacing::Pacer;
pub use pool::ConnectionPool;
pub use resp::RespValue;
pub use selector::{OperationSelector, RandomSource};
pub use stats::{Counters, StatusLine, Throttle};
pub use types::{InstanceId, InstanceSet, OpKind, Operation};
