//! On-disk layout of a split installation.
//!
//! ```text
//! <main>/instances/<id>          one entry per created instance
//! <main>/liveness/<id>.marker    present while the instance process runs
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, Result};
use crate::types::InstanceId;

pub const INSTANCES_DIR: &str = "instances";
pub const LIVENESS_DIR: &str = "liveness";
pub const MARKER_EXT: &str = "marker";

/// Tried in order when no main directory is given explicitly.
pub const DEFAULT_MAIN_DIRS: &[&str] = &[
    "/opt/redis-split",
    "/srv/redis-split",
    "/srv2/redis-split",
    "/srv3/redis-split",
    "/srv4/redis-split",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    main: PathBuf,
}

impl Layout {
    pub fn new(main: impl Into<PathBuf>) -> Self {
        Self { main: main.into() }
    }

    /// Pick the first usable main directory: `explicit` if given, then the
    /// well-known locations. Reports the first candidate's error if none fit.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let mut candidates: Vec<PathBuf> = explicit.map(Path::to_path_buf).into_iter().collect();
        candidates.extend(DEFAULT_MAIN_DIRS.iter().map(PathBuf::from));

        let mut first_err = None;
        for candidate in candidates {
            match check_dir(&candidate) {
                Ok(()) => return Ok(Self::new(candidate)),
                Err(e) => {
                    tracing::debug!("Skipping main directory candidate: {}", e);
                    first_err.get_or_insert(e);
                }
            }
        }

        Err(first_err.unwrap_or_else(|| LoadError::MissingDirectory(PathBuf::new())))
    }

    /// Startup checks. Any failure here is fatal for the generator.
    pub fn validate(&self) -> Result<()> {
        check_dir(&self.main)?;
        let instances = self.instances_dir();
        check_dir(&instances)?;

        if list_instances(&instances)?.is_empty() {
            return Err(LoadError::NoInstances(instances));
        }
        Ok(())
    }

    pub fn main_dir(&self) -> &Path {
        &self.main
    }

    pub fn instances_dir(&self) -> PathBuf {
        self.main.join(INSTANCES_DIR)
    }

    pub fn liveness_dir(&self) -> PathBuf {
        self.main.join(LIVENESS_DIR)
    }

    pub fn marker_path(&self, id: &InstanceId) -> PathBuf {
        self.liveness_dir()
            .join(format!("{}.{}", id.as_str(), MARKER_EXT))
    }
}

/// Non-recursive listing of instance ids. Hidden entries are ignored.
pub fn list_instances(dir: &Path) -> Result<Vec<InstanceId>> {
    let entries = fs::read_dir(dir).map_err(|e| inaccessible(dir, e))?;

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| inaccessible(dir, e))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        ids.push(InstanceId::new(name.into_owned()));
    }
    Ok(ids)
}

/// Directory must exist and be readable and traversable.
fn check_dir(path: &Path) -> Result<()> {
    let meta = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::MissingDirectory(path.to_path_buf()),
        _ => inaccessible(path, e),
    })?;

    if !meta.is_dir() {
        return Err(LoadError::NotADirectory(path.to_path_buf()));
    }

    fs::read_dir(path).map_err(|e| inaccessible(path, e))?;
    // stat through the directory needs search permission
    fs::metadata(path.join(".")).map_err(|e| inaccessible(path, e))?;
    Ok(())
}

fn inaccessible(path: &Path, source: io::Error) -> LoadError {
    LoadError::Inaccessible {
        path: path.to_path_buf(),
        source,
    }
}
