//! The payload loop.
//!
//! One sequential path: refresh the instance list when due, pause, pick an
//! instance, check its marker, then send one GET or SET over its pooled
//! connection. Nothing runs concurrently, so the pool and the counters need
//! no synchronization.

use std::future::Future;
use std::time::Instant;

use crate::config::Config;
use crate::directory::InstanceDirectory;
use crate::layout::Layout;
use crate::liveness::LivenessChecker;
use crate::pacing::Pacer;
use crate::pool::ConnectionPool;
use crate::selector::{OperationSelector, RandomSource};
use crate::stats::{Counters, StatusLine, Throttle};
use crate::types::{InstanceId, InstanceSet, OpKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown signal fired
    Interrupted,
    /// The requested number of cycles ran
    CycleLimit,
}

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No instances are known
    Idle,
    /// The picked instance has no liveness marker
    Skipped(InstanceId),
    Completed(InstanceId, OpKind),
    /// Connecting or the request itself failed
    Failed(InstanceId),
}

pub struct Driver<R> {
    directory: InstanceDirectory,
    liveness: LivenessChecker,
    pool: ConnectionPool,
    selector: OperationSelector,
    pacer: Pacer,
    counters: Counters,
    throttle: Throttle,
    status: Option<StatusLine>,
    rng: R,
}

impl<R: RandomSource> Driver<R> {
    pub fn new(config: &Config, rng: R) -> Self {
        let layout = Layout::new(&config.main_dir);
        Self {
            directory: InstanceDirectory::new(layout.instances_dir(), config.refresh_interval),
            liveness: LivenessChecker::new(layout),
            pool: ConnectionPool::from_config(config),
            selector: OperationSelector::new(config.max_keys, config.ratio),
            pacer: Pacer::new(config.max_pause),
            counters: Counters::new(),
            throttle: Throttle::new(config.status_interval),
            status: None,
            rng,
        }
    }

    pub fn with_status_line(mut self, status: StatusLine) -> Self {
        self.status = Some(status);
        self
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn instances(&self) -> &InstanceSet {
        self.directory.instances()
    }

    pub fn status_line(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ConnectionPool {
        &mut self.pool
    }

    /// Run until `shutdown` resolves or `max_cycles` cycles have run.
    ///
    /// A cycle in flight when `shutdown` fires is abandoned.
    pub async fn run<F>(&mut self, max_cycles: Option<u64>, shutdown: F) -> StopReason
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut done = 0u64;

        loop {
            if max_cycles.map_or(false, |max| done >= max) {
                return StopReason::CycleLimit;
            }

            tokio::select! {
                _ = &mut shutdown => return StopReason::Interrupted,
                _ = self.cycle() => done += 1,
            }
        }
    }

    pub async fn run_cycles(&mut self, cycles: u64) -> StopReason {
        self.run(Some(cycles), std::future::pending()).await
    }

    pub async fn cycle(&mut self) -> CycleOutcome {
        self.directory.refresh_if_due(Instant::now());

        let pause = self.pacer.next_delay(&mut self.rng);
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        let instances = self.directory.instances();
        if instances.is_empty() {
            return CycleOutcome::Idle;
        }
        let index = self.rng.below(instances.len() as u64) as usize;
        let id = match instances.get(index) {
            Some(id) => id.clone(),
            None => return CycleOutcome::Idle,
        };

        if !self.liveness.is_alive(&id) {
            if self.pool.remove(&id) {
                tracing::debug!("Instance {} is down, connection dropped", id);
            }
            self.counters.record_skip();
            return CycleOutcome::Skipped(id);
        }

        let conn = match self.pool.get(&id).await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("{}", e);
                self.counters.record_failure();
                self.redraw();
                return CycleOutcome::Failed(id);
            }
        };

        let op = self.selector.next(&mut self.rng);
        match conn.execute(&op).await {
            Ok(()) => {
                self.counters.record(op.kind());
                self.redraw();
                CycleOutcome::Completed(id, op.kind())
            }
            Err(e) => {
                tracing::warn!("{} {} on instance {} failed: {}", op.kind().as_str(), op.key(), id, e);
                if e.breaks_connection() {
                    self.pool.remove(&id);
                }
                self.counters.record_failure();
                self.redraw();
                CycleOutcome::Failed(id)
            }
        }
    }

    /// Close pooled connections and leave the final counters on screen.
    pub fn shutdown(&mut self) {
        self.pool.close_all();
        if let Some(status) = &mut self.status {
            if let Err(e) = status.finish(&self.counters) {
                tracing::debug!("Status line: {}", e);
            }
        }
    }

    fn redraw(&mut self) {
        let status = match &mut self.status {
            Some(status) => status,
            None => return,
        };
        if !self.throttle.ready(Instant::now()) {
            return;
        }
        if let Err(e) = status.draw(&self.counters) {
            tracing::debug!("Status line: {}", e);
        }
    }
}
