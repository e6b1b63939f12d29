use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("directory {0} doesn't exist")]
    MissingDirectory(PathBuf),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("directory {path} is not accessible: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no instances are created in {0}")]
    NoInstances(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("instance id {0:?} has no usable numeric suffix")]
    InvalidInstanceId(String),

    #[error("port for instance {id} overflows (base {base})")]
    PortOverflow { id: String, base: u16 },

    #[error("can't connect to instance {id} at {addr}: {source}")]
    Connect {
        id: String,
        addr: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Whether the connection that produced this error can't be used again.
    ///
    /// Error replies such as `-ERR` or `-READONLY` leave the connection
    /// usable. Transport failures and timeouts don't.
    pub fn breaks_connection(&self) -> bool {
        match self {
            LoadError::Redis(e) => e.is_io_error() || e.is_connection_dropped() || e.is_timeout(),
            _ => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
