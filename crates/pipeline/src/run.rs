//! Invocation state machine and observers.

use serde::{Deserialize, Serialize};

use crate::{PipelineRunId, Record, StepName, Timestamp};

/// Lifecycle of one pipeline invocation.
///
/// `NotStarted → Running(0) → … → Running(n-1) → Completed`, or `Failed` from
/// any `Running` state. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    /// The seed record has been accepted; no step has started.
    NotStarted,
    /// A step is executing.
    Running {
        /// The executing step.
        step: StepName,
        /// Zero-based position in the execution order.
        index: usize,
        /// Total number of steps in the execution order.
        total: usize,
    },
    /// Every step ran successfully.
    Completed,
    /// A step returned an error; no further steps ran.
    Failed {
        /// The failing step.
        step: StepName,
    },
}

impl RunState {
    /// Returns `true` for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed { .. })
    }
}

/// Receives progress notifications from an invocation.
///
/// Both methods default to no-ops.
pub trait RunObserver: Send {
    /// Called on every state transition.
    fn on_transition(&mut self, _run_id: PipelineRunId, _state: &RunState) {}

    /// Called after a step's partial record has been merged.
    fn on_merged(&mut self, _step: &StepName, _record: &Record) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Timing of one completed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTrace {
    /// The step that ran.
    pub step: StepName,
    /// When the step started.
    pub started_at: Timestamp,
    /// When its output was merged.
    pub finished_at: Timestamp,
}

impl StepTrace {
    /// Wall-clock duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.finished_at.millis_since(self.started_at)
    }
}

/// Observer that records the transition history, per-step timings, and the
/// last merged record.
///
/// Keeping the last merged record lets a caller recover the work done before a
/// failure, which `invoke` itself discards.
#[derive(Debug, Default)]
pub struct RunLog {
    run_id: Option<PipelineRunId>,
    states: Vec<RunState>,
    traces: Vec<StepTrace>,
    current: Option<(StepName, Timestamp)>,
    last_record: Option<Record>,
}

impl RunLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of the observed run, once it has started.
    pub fn run_id(&self) -> Option<PipelineRunId> {
        self.run_id
    }

    /// Every state the run passed through, in order.
    pub fn states(&self) -> &[RunState] {
        &self.states
    }

    /// The most recent state.
    pub fn last_state(&self) -> Option<&RunState> {
        self.states.last()
    }

    /// Timings of the steps that completed.
    pub fn traces(&self) -> &[StepTrace] {
        &self.traces
    }

    /// The record as it stood after the last successful step.
    pub fn last_record(&self) -> Option<&Record> {
        self.last_record.as_ref()
    }

    /// Consumes the log, returning the last merged record.
    pub fn into_last_record(self) -> Option<Record> {
        self.last_record
    }
}

impl RunObserver for RunLog {
    fn on_transition(&mut self, run_id: PipelineRunId, state: &RunState) {
        self.run_id = Some(run_id);
        if let RunState::Running { step, .. } = state {
            self.current = Some((step.clone(), Timestamp::now()));
        }
        self.states.push(state.clone());
    }

    fn on_merged(&mut self, step: &StepName, record: &Record) {
        if let Some((running, started_at)) = self.current.take() {
            if &running == step {
                self.traces.push(StepTrace {
                    step: running,
                    started_at,
                    finished_at: Timestamp::now(),
                });
            }
        }
        self.last_record = Some(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_log_tracks_states_and_traces() {
        let mut log = RunLog::new();
        let run_id = PipelineRunId::new_random();
        let step = StepName::from_static("a");

        log.on_transition(run_id, &RunState::NotStarted);
        log.on_transition(
            run_id,
            &RunState::Running {
                step: step.clone(),
                index: 0,
                total: 1,
            },
        );
        log.on_merged(&step, &Record::from_text("t"));
        log.on_transition(run_id, &RunState::Completed);

        assert_eq!(log.run_id(), Some(run_id));
        assert_eq!(log.states().len(), 3);
        assert!(log.last_state().is_some_and(RunState::is_terminal));
        assert_eq!(log.traces().len(), 1);
        assert_eq!(log.traces()[0].step, step);
        assert_eq!(log.last_record().and_then(|r| r.get_str("text")), Some("t"));
    }

    #[test]
    fn states_serialise_with_a_tag() {
        let json = serde_json::to_value(RunState::Failed {
            step: StepName::from_static("fetch"),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["step"], "fetch");
    }
}
