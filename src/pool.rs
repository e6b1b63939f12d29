use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::client::Connection;
use crate::config::Config;
use crate::error::{LoadError, Result};
use crate::types::InstanceId;

/// At most one open connection per instance, created on first use.
pub struct ConnectionPool {
    conns: HashMap<InstanceId, Connection>,
    host: IpAddr,
    base_port: u16,
    timeout: Duration,
}

impl ConnectionPool {
    pub fn new(host: IpAddr, base_port: u16, timeout: Duration) -> Self {
        Self {
            conns: HashMap::new(),
            host,
            base_port,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.host, config.base_port, config.io_timeout)
    }

    pub fn address(&self, id: &InstanceId) -> Result<SocketAddr> {
        Ok(SocketAddr::new(self.host, id.port(self.base_port)?))
    }

    /// Pooled connection for `id`, connecting first if there is none.
    ///
    /// Liveness is the caller's business. A failed connect leaves nothing
    /// in the pool.
    pub async fn get(&mut self, id: &InstanceId) -> Result<&mut Connection> {
        let addr = self.address(id)?;
        match self.conns.entry(id.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let conn = Connection::connect(addr, self.timeout)
                    .await
                    .map_err(|source| LoadError::Connect {
                        id: id.to_string(),
                        addr: addr.to_string(),
                        source,
                    })?;
                tracing::debug!("Connected to instance {} at {}", id, addr);
                Ok(entry.insert(conn))
            }
        }
    }

    /// Drop the connection for `id`. Returns whether one existed.
    pub fn remove(&mut self, id: &InstanceId) -> bool {
        match self.conns.remove(id) {
            Some(_) => {
                tracing::debug!("Closed connection to instance {}", id);
                true
            }
            None => false,
        }
    }

    pub fn close_all(&mut self) {
        self.conns.clear();
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.conns.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }
}
