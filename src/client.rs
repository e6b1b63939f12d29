use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::{Client, Cmd, ConnectionAddr, ConnectionInfo, FromRedisValue, RedisConnectionInfo};
use tokio::time::timeout;

use crate::error::{LoadError, Result};
use crate::types::Operation;

/// Value stored by every generated write.
pub const WRITE_VALUE: &[u8] = b"1";

/// A single connection to one instance.
///
/// Connecting and every command are bounded by the same timeout. When an
/// error reports [`LoadError::breaks_connection`] the connection must be
/// dropped.
pub struct Connection {
    inner: MultiplexedConnection,
    addr: SocketAddr,
    timeout: Duration,
}

impl Connection {
    pub async fn connect(addr: SocketAddr, io_timeout: Duration) -> redis::RedisResult<Self> {
        let client = Client::open(ConnectionInfo {
            addr: ConnectionAddr::Tcp(addr.ip().to_string(), addr.port()),
            redis: RedisConnectionInfo::default(),
        })?;

        let inner = timeout(io_timeout, client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;

        Ok(Self {
            inner,
            addr,
            timeout: io_timeout,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.query("GET", &cmd).await
    }

    pub async fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        self.query("SET", &cmd).await
    }

    pub async fn execute(&mut self, op: &Operation) -> Result<()> {
        match op {
            Operation::Write { key } => self.set(key, WRITE_VALUE).await,
            Operation::Read { key } => self.get(key).await.map(|_| ()),
        }
    }

    async fn query<T: FromRedisValue>(&mut self, name: &'static str, cmd: &Cmd) -> Result<T> {
        let reply: T = timeout(self.timeout, cmd.query_async(&mut self.inner))
            .await
            .map_err(|_| LoadError::Timeout(name))??;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resp::RespReader;
    use std::sync::{Arc, Mutex};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<Vec<Vec<u8>>>>>;

    /// Accept one connection. Handshake commands get `+OK`, every other
    /// command is recorded and answered with `reply`, or left unanswered
    /// when `reply` is `None`. An empty `reply` closes the socket instead.
    async fn scripted_peer(reply: Option<&'static [u8]>) -> (SocketAddr, Seen) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Seen::default();
        let shared = seen.clone();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = socket.into_split();
            let mut reader = RespReader::new(reader);
            while let Ok(Some(args)) = reader.read_command().await {
                if args[0].eq_ignore_ascii_case(b"CLIENT") {
                    writer.write_all(b"+OK\r\n").await.unwrap();
                    continue;
                }
                shared.lock().unwrap().push(args);
                match reply {
                    Some(b"") => return,
                    Some(reply) => writer.write_all(reply).await.unwrap(),
                    None => {}
                }
            }
        });
        (addr, seen)
    }

    fn args(parts: &[&str]) -> Vec<Vec<u8>> {
        parts.iter().map(|p| p.as_bytes().to_vec()).collect()
    }

    #[tokio::test]
    async fn test_get_returns_bulk() {
        let (addr, seen) = scripted_peer(Some(b"$3\r\nabc\r\n")).await;
        let mut conn = Connection::connect(addr, Duration::from_secs(1)).await.unwrap();
        assert_eq!(conn.addr(), addr);
        assert_eq!(conn.get("KEY1").await.unwrap(), Some(b"abc".to_vec()));
        assert_eq!(*seen.lock().unwrap(), vec![args(&["GET", "KEY1"])]);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (addr, _seen) = scripted_peer(Some(b"$-1\r\n")).await;
        let mut conn = Connection::connect(addr, Duration::from_secs(1)).await.unwrap();
        assert_eq!(conn.get("KEY2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_execute_write_sends_fixed_value() {
        let (addr, seen) = scripted_peer(Some(b"+OK\r\n")).await;
        let mut conn = Connection::connect(addr, Duration::from_secs(1)).await.unwrap();
        let op = Operation::Write {
            key: "KEY9".to_string(),
        };
        conn.execute(&op).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![args(&["SET", "KEY9", "1"])]);
    }

    #[tokio::test]
    async fn test_server_error_reply_keeps_connection() {
        let (addr, _seen) =
            scripted_peer(Some(b"-READONLY You can't write against a read only replica.\r\n")).await;
        let mut conn = Connection::connect(addr, Duration::from_secs(1)).await.unwrap();
        let err = conn.set("k", b"v").await.unwrap_err();
        assert!(matches!(err, LoadError::Redis(_)));
        assert!(!err.breaks_connection());

        // Same connection, same answer
        let err = conn.set("k", b"v").await.unwrap_err();
        assert!(matches!(err, LoadError::Redis(_)));
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let (addr, _seen) = scripted_peer(None).await;
        let mut conn = Connection::connect(addr, Duration::from_millis(100)).await.unwrap();
        let err = conn.get("KEY1").await.unwrap_err();
        assert!(matches!(err, LoadError::Timeout("GET")));
        assert!(err.breaks_connection());
    }

    #[tokio::test]
    async fn test_closed_by_peer() {
        let (addr, _seen) = scripted_peer(Some(b"")).await;
        let mut conn = Connection::connect(addr, Duration::from_secs(1)).await.unwrap();
        let err = conn.get("KEY1").await.unwrap_err();
        assert!(err.breaks_connection());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert!(Connection::connect(addr, Duration::from_secs(1)).await.is_err());
    }
}
