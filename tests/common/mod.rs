//! Shared fixtures: a throwaway installation directory and in-process
//! RESP instances that count what they receive.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use splitload::layout::{INSTANCES_DIR, LIVENESS_DIR};
use splitload::resp::{RespReader, RespValue};
use splitload::{Config, InstanceId, Layout};

pub struct Installation {
    pub dir: TempDir,
}

impl Installation {
    pub fn new(ids: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(INSTANCES_DIR)).unwrap();
        fs::create_dir(dir.path().join(LIVENESS_DIR)).unwrap();
        let installation = Self { dir };
        for id in ids {
            installation.add_instance(id);
        }
        installation
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn add_instance(&self, id: &str) {
        fs::write(self.path().join(INSTANCES_DIR).join(id), b"").unwrap();
    }

    pub fn mark_alive(&self, id: &str) {
        fs::write(self.layout().marker_path(&InstanceId::from(id)), b"").unwrap();
    }

    pub fn mark_dead(&self, id: &str) {
        fs::remove_file(self.layout().marker_path(&InstanceId::from(id))).unwrap();
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.path())
    }

    /// No pacing, so tests run as fast as the loopback allows.
    pub fn config(&self, base_port: u16) -> Config {
        Config::new(self.path())
            .max_pause(Duration::ZERO)
            .base_port(base_port)
    }
}

#[derive(Default)]
pub struct Received {
    pub connections: AtomicUsize,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub max_key: AtomicUsize,
    pub data: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl Received {
    pub fn commands(&self) -> usize {
        self.gets.load(Ordering::SeqCst) + self.sets.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Bind `count` listeners on consecutive loopback ports.
pub async fn bind_consecutive(count: u16) -> (u16, Vec<TcpListener>) {
    loop {
        let base = rand::thread_rng().gen_range(20_000..60_000u16);
        let mut listeners = Vec::new();
        for offset in 0..count {
            match TcpListener::bind(("127.0.0.1", base + offset)).await {
                Ok(listener) => listeners.push(listener),
                Err(_) => break,
            }
        }
        if listeners.len() == count as usize {
            return (base, listeners);
        }
    }
}

/// Serve GET/SET from memory on `listener` until the test ends.
pub fn spawn_instance(listener: TcpListener) -> Arc<Received> {
    let received = Arc::new(Received::default());
    let shared = received.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            shared.connections.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(serve(socket, shared.clone()));
        }
    });
    received
}

async fn serve(socket: TcpStream, received: Arc<Received>) {
    let (reader, mut writer) = socket.into_split();
    let mut reader = RespReader::new(reader);

    while let Ok(Some(args)) = reader.read_command().await {
        let cmd = String::from_utf8_lossy(&args[0]).to_uppercase();
        if let Some(n) = args
            .get(1)
            .and_then(|k| std::str::from_utf8(k).ok())
            .and_then(|k| k.strip_prefix("KEY"))
            .and_then(|n| n.parse::<usize>().ok())
        {
            received.max_key.fetch_max(n, Ordering::SeqCst);
        }

        let reply = match (cmd.as_str(), args.len()) {
            // Connection setup sent by the client library
            ("CLIENT", _) => RespValue::ok(),
            ("GET", 2) => {
                received.gets.fetch_add(1, Ordering::SeqCst);
                match received.data.lock().unwrap().get(&args[1]) {
                    Some(v) => RespValue::from_bytes(v.clone()),
                    None => RespValue::null(),
                }
            }
            ("SET", 3) => {
                received.sets.fetch_add(1, Ordering::SeqCst);
                received
                    .data
                    .lock()
                    .unwrap()
                    .insert(args[1].clone(), args[2].clone());
                RespValue::ok()
            }
            _ => RespValue::error(format!("unknown command '{}'", cmd)),
        };

        if writer.write_all(&reply.encode()).await.is_err() {
            break;
        }
    }
}
