//! Background scheduler for synchronization passes.
//!
//! One tokio task runs a pass, sleeps for the interval, and repeats until
//! shutdown. The sleep is interrupted by cancellation; a pass in flight
//! finishes its current family first.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::report::PassReport;

/// Something that can run one synchronization pass.
#[async_trait]
pub trait PassRunner: Send + Sync + 'static {
    /// Run a pass, observing `cancel` between units of work.
    async fn run_pass(&self, cancel: &CancellationToken) -> PassReport;
}

/// Lifecycle of the scheduler task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

pub struct Scheduler {
    token: CancellationToken,
    state: Arc<Mutex<SchedulerState>>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the scheduler task. The first pass starts immediately.
    pub fn start(runner: Arc<dyn PassRunner>, interval: Duration) -> Self {
        let token = CancellationToken::new();
        let state = Arc::new(Mutex::new(SchedulerState::Idle));

        let handle = tokio::spawn(run_loop(runner, interval, token.clone(), Arc::clone(&state)));
        info!("Synchronizer started (interval {:?})", interval);

        Self {
            token,
            state,
            handle: Some(handle),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.lock()
    }

    /// Request shutdown and wait for the task to exit.
    pub async fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        info!("Shutting down synchronizer...");
        transition(&self.state, SchedulerState::Stopping);
        self.token.cancel();

        if let Err(e) = handle.await {
            error!("Synchronizer task ended abnormally: {}", e);
            *self.state.lock() = SchedulerState::Stopped;
        }
    }
}

/// Move to `next` unless shutdown has already begun.
fn transition(state: &Mutex<SchedulerState>, next: SchedulerState) {
    let mut current = state.lock();
    if matches!(*current, SchedulerState::Stopping | SchedulerState::Stopped) {
        return;
    }
    *current = next;
}

async fn run_loop(
    runner: Arc<dyn PassRunner>,
    interval: Duration,
    token: CancellationToken,
    state: Arc<Mutex<SchedulerState>>,
) {
    let mut pass = 0u64;

    while !token.is_cancelled() {
        pass += 1;
        transition(&state, SchedulerState::Running);

        match AssertUnwindSafe(runner.run_pass(&token)).catch_unwind().await {
            Ok(report) => debug!("Pass {} complete: {}", pass, report),
            Err(_) => error!("Pass {} panicked, continuing with the next pass", pass),
        }

        transition(&state, SchedulerState::Idle);

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    *state.lock() = SchedulerState::Stopped;
    info!("Synchronizer stopped after {} passes", pass);
}
