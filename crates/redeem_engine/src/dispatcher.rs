use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::join_all;
use thiserror::Error;

use crate::attempt::run_attempt;
use crate::state::{RunSnapshot, RunState};
use crate::transport::Transport;
use crate::types::AttemptResult;

/// Worker count used when the caller does not pick one.
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Delay between sequential attempts, to stay under upstream rate
/// limits.
const PACING_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One attempt at a time, in submission order, paced.
    Sequential,
    /// Bounded pool of workers pulling from a shared queue.
    Pool { workers: usize },
}

impl RunMode {
    /// Pool mode with at least one worker.
    pub fn pool(workers: usize) -> Self {
        RunMode::Pool {
            workers: workers.max(1),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("a run is already active for this session")]
    AlreadyRunning,
}

/// Receives a state snapshot after every recorded attempt. Emission
/// happens outside the run's critical section; a panicking sink is
/// logged and ignored.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, snapshot: RunSnapshot);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<RunSnapshot>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<RunSnapshot>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, snapshot: RunSnapshot) {
        let _ = self.tx.send(snapshot);
    }
}

impl<F> ProgressSink for F
where
    F: Fn(RunSnapshot) + Send + Sync,
{
    fn emit(&self, snapshot: RunSnapshot) {
        self(snapshot)
    }
}

struct RunInner {
    state: RunState,
    results: Vec<AttemptResult>,
}

/// State shared between the driver task, its workers, and the handle.
/// One mutex covers the counters and the result list; nothing holds it
/// across a network call.
struct RunShared {
    inner: Mutex<RunInner>,
}

impl RunShared {
    fn new() -> Self {
        Self {
            inner: Mutex::new(RunInner {
                state: RunState::new(),
                results: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RunInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_started(&self, total: usize) {
        self.lock().state.mark_started(total);
    }

    fn mark_ended(&self) {
        self.lock().state.mark_ended();
    }

    fn is_active(&self) -> bool {
        self.lock().state.is_active()
    }

    fn stop_requested(&self) -> bool {
        self.lock().state.stop_requested()
    }

    fn request_stop(&self) {
        self.lock().state.request_stop();
    }

    fn set_current_code(&self, code: &str) {
        self.lock().state.set_current_code(code);
    }

    fn snapshot(&self) -> RunSnapshot {
        self.lock().state.snapshot()
    }

    fn results(&self) -> Vec<AttemptResult> {
        self.lock().results.clone()
    }

    /// Record one completed attempt. A success requests the stop in
    /// the same critical section, so the emitted snapshot already
    /// carries the flag.
    fn record(&self, result: AttemptResult) -> RunSnapshot {
        let mut inner = self.lock();
        inner.state.record_processed(result.classification);
        if result.classification.is_success() {
            inner.state.request_stop();
        }
        inner.results.push(result);
        inner.state.snapshot()
    }
}

/// Orchestrates runs for one logical session. At most one run is
/// active per dispatcher; a second `start` gets `AlreadyRunning`.
pub struct Dispatcher {
    pacing: Duration,
    current: Mutex<Option<Arc<RunShared>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_pacing(PACING_INTERVAL)
    }

    /// Override the sequential pacing interval.
    pub fn with_pacing(pacing: Duration) -> Self {
        Self {
            pacing,
            current: Mutex::new(None),
        }
    }

    /// Start a run over `codes`. Must be called from within a Tokio
    /// runtime; the run is driven by a spawned task and observed
    /// through the returned handle.
    pub fn start(
        &self,
        codes: Vec<String>,
        mode: RunMode,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<RunHandle, StartError> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().is_some_and(|run| run.is_active()) {
            return Err(StartError::AlreadyRunning);
        }

        let shared = Arc::new(RunShared::new());
        // Flip to Running before the driver task is scheduled so a
        // racing second `start` sees the gate closed.
        shared.mark_started(codes.len());
        *current = Some(Arc::clone(&shared));

        let driver = tokio::spawn(drive(
            Arc::clone(&shared),
            transport,
            codes,
            mode,
            self.pacing,
            sink,
        ));
        Ok(RunHandle {
            shared,
            driver: Mutex::new(Some(driver)),
        })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller's view of one run.
pub struct RunHandle {
    shared: Arc<RunShared>,
    driver: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl RunHandle {
    /// Cooperative: in-flight attempts still run to completion.
    pub fn request_stop(&self) {
        self.shared.request_stop();
    }

    pub fn state(&self) -> RunSnapshot {
        self.shared.snapshot()
    }

    /// Results in completion order; `AttemptResult::sequence` carries
    /// the submission order.
    pub fn results(&self) -> Vec<AttemptResult> {
        self.shared.results()
    }

    /// Wait for the run to drain and return the final snapshot.
    pub async fn wait(&self) -> RunSnapshot {
        let driver = self
            .driver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(driver) = driver {
            if driver.await.is_err() {
                log::warn!("run driver task failed");
            }
        }
        self.shared.snapshot()
    }
}

async fn drive(
    shared: Arc<RunShared>,
    transport: Arc<dyn Transport>,
    codes: Vec<String>,
    mode: RunMode,
    pacing: Duration,
    sink: Arc<dyn ProgressSink>,
) {
    match mode {
        RunMode::Sequential => {
            run_sequential(&shared, transport.as_ref(), &codes, pacing, sink.as_ref()).await;
        }
        RunMode::Pool { workers } => {
            run_pool(&shared, transport, codes, workers, sink).await;
        }
    }
    shared.mark_ended();

    let snapshot = shared.snapshot();
    log::info!(
        "run completed: {}/{} processed, {} succeeded, {} failed",
        snapshot.processed,
        snapshot.total,
        snapshot.success_count,
        snapshot.error_count
    );
}

async fn run_sequential(
    shared: &RunShared,
    transport: &dyn Transport,
    codes: &[String],
    pacing: Duration,
    sink: &dyn ProgressSink,
) {
    for (index, code) in codes.iter().enumerate() {
        if shared.stop_requested() {
            break;
        }
        if index > 0 {
            tokio::time::sleep(pacing).await;
            // A stop may have landed during the pause.
            if shared.stop_requested() {
                break;
            }
        }
        shared.set_current_code(code);
        let result = run_attempt(transport, code, index as u32 + 1).await;
        let snapshot = shared.record(result);
        emit_progress(sink, snapshot);
    }
}

async fn run_pool(
    shared: &Arc<RunShared>,
    transport: Arc<dyn Transport>,
    codes: Vec<String>,
    workers: usize,
    sink: Arc<dyn ProgressSink>,
) {
    let queue: VecDeque<(u32, String)> = codes
        .into_iter()
        .enumerate()
        .map(|(index, code)| (index as u32 + 1, code))
        .collect();
    let worker_count = workers.max(1).min(queue.len().max(1));
    let queue = Arc::new(Mutex::new(queue));

    let mut drivers = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let shared = Arc::clone(shared);
        let transport = Arc::clone(&transport);
        let sink = Arc::clone(&sink);
        let queue = Arc::clone(&queue);
        drivers.push(tokio::spawn(async move {
            loop {
                // Checked before pulling new work only; an attempt
                // already in flight always runs to completion, so two
                // successes can both land in the results.
                if shared.stop_requested() {
                    break;
                }
                let next = queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                let Some((sequence, code)) = next else {
                    break;
                };
                shared.set_current_code(&code);
                let result = run_attempt(transport.as_ref(), &code, sequence).await;
                let snapshot = shared.record(result);
                emit_progress(sink.as_ref(), snapshot);
            }
        }));
    }

    for outcome in join_all(drivers).await {
        if outcome.is_err() {
            log::warn!("pool worker task failed");
        }
    }
}

fn emit_progress(sink: &dyn ProgressSink, snapshot: RunSnapshot) {
    let emitted = catch_unwind(AssertUnwindSafe(|| sink.emit(snapshot)));
    if emitted.is_err() {
        log::warn!("progress sink panicked; continuing run");
    }
}
