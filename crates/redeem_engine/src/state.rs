use chrono::{DateTime, Utc};

use redeem_core::Classification;

/// Dispatcher lifecycle for one run. The phase never re-enters
/// `Running` once it has left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Stopping,
    Completed,
}

/// Mutable progress bookkeeping for one run. Only the dispatcher
/// touches it, always under the run's single mutex.
#[derive(Debug, Default)]
pub struct RunState {
    phase: RunPhase,
    total: usize,
    processed: usize,
    success_count: usize,
    error_count: usize,
    current_code: String,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    stop_requested: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_started(&mut self, total: usize) {
        self.phase = RunPhase::Running;
        self.total = total;
        self.started_at = Some(Utc::now());
    }

    /// Count one completed attempt. Everything that is not a success
    /// counts as an error, `Unclassified` included.
    pub fn record_processed(&mut self, classification: Classification) {
        self.processed += 1;
        if classification.is_success() {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }
    }

    /// Best-effort marker of the last code handed to a worker.
    pub fn set_current_code(&mut self, code: &str) {
        self.current_code.clear();
        self.current_code.push_str(code);
    }

    pub fn request_stop(&mut self) {
        self.stop_requested = true;
        if self.phase == RunPhase::Running {
            self.phase = RunPhase::Stopping;
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    pub fn mark_ended(&mut self) {
        self.phase = RunPhase::Completed;
        self.ended_at = Some(Utc::now());
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, RunPhase::Running | RunPhase::Stopping)
    }

    /// Immutable copy for progress sinks and external pollers.
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            phase: self.phase,
            running: self.is_active(),
            total: self.total,
            processed: self.processed,
            success_count: self.success_count,
            error_count: self.error_count,
            current_code: self.current_code.clone(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            stop_requested: self.stop_requested,
        }
    }
}

/// Read-only view of a run, detached from the live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSnapshot {
    pub phase: RunPhase,
    pub running: bool,
    pub total: usize,
    pub processed: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub current_code: String,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub stop_requested: bool,
}

#[cfg(test)]
mod tests {
    use super::{RunPhase, RunState};
    use redeem_core::Classification;

    #[test]
    fn processed_always_equals_success_plus_error() {
        let mut state = RunState::new();
        state.mark_started(4);
        for classification in [
            Classification::Success,
            Classification::NotFound,
            Classification::Timeout,
            Classification::Unclassified,
        ] {
            state.record_processed(classification);
            let snapshot = state.snapshot();
            assert_eq!(snapshot.processed, snapshot.success_count + snapshot.error_count);
        }
        let snapshot = state.snapshot();
        assert_eq!(snapshot.success_count, 1);
        assert_eq!(snapshot.error_count, 3);
    }

    #[test]
    fn stop_moves_running_to_stopping() {
        let mut state = RunState::new();
        state.mark_started(1);
        assert!(state.is_active());
        state.request_stop();
        assert_eq!(state.snapshot().phase, RunPhase::Stopping);
        assert!(state.snapshot().running);
        state.mark_ended();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.phase, RunPhase::Completed);
        assert!(!snapshot.running);
        assert!(snapshot.ended_at.is_some());
    }

    #[test]
    fn stop_before_start_does_not_mark_stopping() {
        let mut state = RunState::new();
        state.request_stop();
        assert_eq!(state.snapshot().phase, RunPhase::Idle);
        assert!(state.stop_requested());
    }
}
