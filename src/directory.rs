use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::layout::list_instances;
use crate::types::InstanceSet;

/// Cached view of the instance listing, refreshed on a fixed cadence.
pub struct InstanceDirectory {
    dir: PathBuf,
    interval: Duration,
    current: InstanceSet,
    last_refresh: Option<Instant>,
}

impl InstanceDirectory {
    pub fn new(dir: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            interval,
            current: InstanceSet::default(),
            last_refresh: None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Re-read the listing if the interval has elapsed. Returns whether a
    /// refresh was attempted.
    ///
    /// A failed listing keeps the previous set; the next attempt waits for
    /// the following interval.
    pub fn refresh_if_due(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }

        self.last_refresh = Some(now);
        match self.refresh().map(|set| set.len()) {
            Ok(0) => {
                tracing::warn!("No instances listed in {}", self.dir.display());
            }
            Ok(count) => {
                tracing::debug!("Instance list refreshed: {} instances", count);
            }
            Err(e) => {
                tracing::warn!("Keeping previous instance list: {}", e);
            }
        }
        true
    }

    /// Unconditionally replace the cached set with the current listing.
    pub fn refresh(&mut self) -> Result<&InstanceSet> {
        let ids = list_instances(&self.dir)?;
        self.current = InstanceSet::new(ids);
        Ok(&self.current)
    }

    pub fn instances(&self) -> &InstanceSet {
        &self.current
    }
}
