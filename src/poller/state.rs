//! Poller state and its transitions.
//!
//! Every transition is tagged with the attempt it was issued for. A
//! transition whose attempt is no longer the active one is rejected, which
//! is how late responses after a cancellation or a resubmission get dropped.

use tracing::{debug, info, warn};

use super::progress::{SUBMITTING_LABEL, step_for};
use crate::core::models::{StatusResponse, SummaryResult, TaskId, TaskStatus};
use crate::errors::SummaryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerPhase {
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
    Cancelled,
}

impl PollerPhase {
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Submitting | Self::Polling)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Outcome of feeding one status response into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response belonged to an attempt that is no longer active.
    Stale,
    Continue,
    Finished,
}

/// What the Result Renderer sees.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerSnapshot {
    /// Increments with every accepted submission.
    pub attempt: u64,
    pub phase: PollerPhase,
    pub task_id: Option<TaskId>,
    pub status: Option<TaskStatus>,
    pub progress: u8,
    pub step: String,
    pub polls: u32,
    pub result: Option<SummaryResult>,
    pub error: Option<SummaryError>,
}

impl Default for PollerSnapshot {
    fn default() -> Self {
        Self {
            attempt: 0,
            phase: PollerPhase::Idle,
            task_id: None,
            status: None,
            progress: 0,
            step: String::new(),
            polls: 0,
            result: None,
            error: None,
        }
    }
}

impl PollerSnapshot {
    /// Whether `attempt` is the one currently in flight.
    #[must_use]
    pub fn owns(&self, attempt: u64) -> bool {
        self.attempt == attempt && self.phase.is_active()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(SummaryError::user_message)
    }

    /// Starts a new attempt, discarding the previous result.
    ///
    /// # Errors
    ///
    /// Returns `TaskInProgress` while another attempt is submitting or polling.
    pub fn begin(&mut self) -> Result<u64, SummaryError> {
        if self.phase.is_active() {
            return Err(SummaryError::TaskInProgress);
        }

        *self = Self {
            attempt: self.attempt + 1,
            phase: PollerPhase::Submitting,
            step: SUBMITTING_LABEL.to_string(),
            ..Self::default()
        };
        Ok(self.attempt)
    }

    pub fn start_polling(&mut self, attempt: u64, task_id: TaskId) -> bool {
        if !self.owns(attempt) || self.phase != PollerPhase::Submitting {
            return false;
        }
        info!(attempt, task_id = %task_id, "Task accepted by backend");
        self.phase = PollerPhase::Polling;
        self.task_id = Some(task_id);
        true
    }

    pub fn record_poll(&mut self, attempt: u64) -> bool {
        if !self.owns(attempt) {
            return false;
        }
        self.polls += 1;
        true
    }

    pub fn apply_status(&mut self, attempt: u64, response: StatusResponse) -> Applied {
        if !self.owns(attempt) || self.phase != PollerPhase::Polling {
            debug!(attempt, "Discarding status for an inactive attempt");
            return Applied::Stale;
        }

        let Some(step) = step_for(response.status) else {
            debug!(attempt, "Ignoring unrecognised task status");
            return Applied::Continue;
        };

        self.status = Some(response.status);
        if step.progress >= self.progress {
            self.progress = step.progress;
            self.step = step.label.to_string();
        }
        debug!(attempt, status = ?response.status, progress = self.progress, "Status applied");

        match response.status {
            TaskStatus::Completed => match response.result {
                Some(result) => {
                    info!(attempt, title = %result.title, "Summary completed");
                    self.phase = PollerPhase::Completed;
                    self.result = Some(result);
                    Applied::Finished
                }
                None => {
                    self.fail(
                        attempt,
                        SummaryError::InvalidResponse("completed without a result".to_string()),
                    );
                    Applied::Finished
                }
            },
            TaskStatus::Failed => {
                self.fail(
                    attempt,
                    SummaryError::JobFailure("backend reported the task as failed".to_string()),
                );
                Applied::Finished
            }
            _ => Applied::Continue,
        }
    }

    pub fn fail(&mut self, attempt: u64, error: SummaryError) -> bool {
        if !self.owns(attempt) {
            debug!(attempt, %error, "Dropping failure for an inactive attempt");
            return false;
        }
        warn!(attempt, task_id = ?self.task_id, %error, "Summary task failed");
        self.phase = PollerPhase::Failed;
        self.error = Some(error);
        true
    }

    /// Client-side cancellation: nothing is sent to the backend.
    pub fn cancel(&mut self) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        info!(attempt = self.attempt, task_id = ?self.task_id, "Summary task cancelled");
        self.phase = PollerPhase::Cancelled;
        self.task_id = None;
        self.status = None;
        self.progress = 0;
        self.step.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polling() -> (PollerSnapshot, u64) {
        let mut state = PollerSnapshot::default();
        let attempt = state.begin().unwrap();
        assert!(state.start_polling(attempt, TaskId::new("7")));
        (state, attempt)
    }

    #[test]
    fn test_begin_rejects_active_attempt() {
        let mut state = PollerSnapshot::default();
        assert_eq!(state.begin(), Ok(1));
        assert_eq!(state.begin(), Err(SummaryError::TaskInProgress));
        assert_eq!(state.attempt, 1);
    }

    #[test]
    fn test_begin_after_terminal_clears_previous_outcome() {
        let (mut state, attempt) = polling();
        state.fail(attempt, SummaryError::PollingError("boom".into()));

        assert_eq!(state.begin(), Ok(2));
        assert_eq!(state.phase, PollerPhase::Submitting);
        assert!(state.error.is_none());
        assert!(state.task_id.is_none());
        assert_eq!(state.progress, 0);
    }

    #[test]
    fn test_progress_never_moves_backwards() {
        let (mut state, attempt) = polling();
        state.apply_status(attempt, StatusResponse::pending(TaskStatus::DataCollected));
        state.apply_status(attempt, StatusResponse::pending(TaskStatus::CollectingData));

        assert_eq!(state.progress, 60);
        assert_eq!(state.step, "Cross-referencing sources...");
        assert_eq!(state.status, Some(TaskStatus::CollectingData));
    }

    #[test]
    fn test_unknown_status_changes_nothing() {
        let (mut state, attempt) = polling();
        state.apply_status(attempt, StatusResponse::pending(TaskStatus::ValidatingIsbn));
        let before = state.clone();

        let applied = state.apply_status(attempt, StatusResponse::pending(TaskStatus::Unknown));
        assert_eq!(applied, Applied::Continue);
        assert_eq!(state, before);
    }

    #[test]
    fn test_failed_status_sets_job_failure() {
        let (mut state, attempt) = polling();
        let applied = state.apply_status(attempt, StatusResponse::pending(TaskStatus::Failed));

        assert_eq!(applied, Applied::Finished);
        assert_eq!(state.phase, PollerPhase::Failed);
        assert!(matches!(state.error, Some(SummaryError::JobFailure(_))));
        assert_eq!(state.progress, 100);
    }

    #[test]
    fn test_cancel_resets_and_rejects_late_status() {
        let (mut state, attempt) = polling();
        state.apply_status(attempt, StatusResponse::pending(TaskStatus::GeneratingSummary));

        assert!(state.cancel());
        assert_eq!(state.progress, 0);
        assert!(state.task_id.is_none());

        let before = state.clone();
        let applied = state.apply_status(attempt, StatusResponse::pending(TaskStatus::Failed));
        assert_eq!(applied, Applied::Stale);
        assert!(!state.fail(attempt, SummaryError::PollingError("late".into())));
        assert_eq!(state, before);
        assert!(!state.cancel());
    }

    #[test]
    fn test_stale_attempt_cannot_start_polling() {
        let mut state = PollerSnapshot::default();
        let first = state.begin().unwrap();
        state.cancel();
        let second = state.begin().unwrap();

        assert!(!state.start_polling(first, TaskId::new("old")));
        assert!(state.start_polling(second, TaskId::new("new")));
        assert_eq!(state.task_id, Some(TaskId::new("new")));
    }
}
