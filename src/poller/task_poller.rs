//! Drives one summary request from submission to a terminal state.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{Instrument, info, info_span, warn};

use super::state::{Applied, PollerSnapshot};
use crate::api::{SummaryBackend, TokenProvider};
use crate::core::config::PollerConfig;
use crate::core::models::{StatusResponse, SummaryRequest, TaskId};
use crate::errors::SummaryError;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

struct Shared {
    backend: Arc<dyn SummaryBackend>,
    tokens: Arc<dyn TokenProvider>,
    config: PollerConfig,
    state: watch::Sender<PollerSnapshot>,
}

/// Owns at most one in-flight summary task and its polling loop.
///
/// Independent instances share nothing, so several can run side by side.
pub struct TaskPoller {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TaskPoller {
    #[must_use]
    pub fn new(
        backend: Arc<dyn SummaryBackend>,
        tokens: Arc<dyn TokenProvider>,
        config: PollerConfig,
    ) -> Self {
        let (state, _) = watch::channel(PollerSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                backend,
                tokens,
                config,
                state,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Starts a new task and returns its attempt number. Must be called from
    /// within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `TaskInProgress` if a task is still submitting or polling.
    pub fn submit(&self, request: SummaryRequest) -> Result<u64, SummaryError> {
        let mut outcome = Err(SummaryError::TaskInProgress);
        self.shared.state.send_if_modified(|state| {
            outcome = state.begin();
            outcome.is_ok()
        });
        let attempt = outcome?;

        let span = info_span!(
            "summary_task",
            attempt,
            correlation_id = %request.correlation_id(),
            isbn = request.isbn()
        );
        let handle = tokio::spawn(run_attempt(Arc::clone(&self.shared), attempt, request).instrument(span));

        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = worker.replace(handle) {
            previous.abort();
        }
        Ok(attempt)
    }

    /// Stops polling the current task. A status check in progress is
    /// abandoned together with its pending retries, and a submission already
    /// on the wire has its answer discarded. Nothing is sent to the backend.
    /// Returns `false` when nothing was in flight.
    pub fn cancel(&self) -> bool {
        self.shared.state.send_if_modified(PollerSnapshot::cancel)
    }

    #[must_use]
    pub fn snapshot(&self) -> PollerSnapshot {
        self.shared.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollerSnapshot> {
        self.shared.state.subscribe()
    }

    /// Resolves once `attempt` has ended (or been superseded) and returns
    /// the state at that moment.
    pub async fn wait(&self, attempt: u64) -> PollerSnapshot {
        let mut rx = self.subscribe();
        let done = rx
            .wait_for(|state| state.attempt != attempt || state.phase.is_terminal())
            .await
            .map(|state| state.clone());
        done.unwrap_or_else(|_| self.snapshot())
    }
}

impl Drop for TaskPoller {
    fn drop(&mut self) {
        let worker = self.worker.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = worker.take() {
            handle.abort();
        }
    }
}

impl Shared {
    fn fail(&self, attempt: u64, error: SummaryError) {
        self.state.send_if_modified(|state| state.fail(attempt, error));
    }

    async fn submit(&self, request: &SummaryRequest) -> Result<TaskId, SummaryError> {
        let token = self.tokens.bearer_token().await?;
        self.backend.submit(&token, request).await
    }

    /// One status lookup, retried with backoff while the failure is
    /// transient. A fresh token is fetched for every try.
    async fn poll_status(&self, task_id: &TaskId) -> Result<StatusResponse, SummaryError> {
        let factor = u64::try_from(self.config.retry_base.as_millis() / 2)
            .unwrap_or(u64::MAX)
            .max(1);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(MAX_RETRY_DELAY)
            .map(jitter)
            .take(self.config.poll_retries);

        RetryIf::start(
            strategy,
            || async move {
                let token = self.tokens.bearer_token().await?;
                self.backend.status(&token, task_id).await
            },
            |error: &SummaryError| {
                let retry = error.is_transient();
                if retry {
                    warn!(task_id = %task_id, %error, "Status check failed, retrying");
                }
                retry
            },
        )
        .await
    }
}

/// Resolves when `attempt` stops being the active one.
async fn superseded(rx: &mut watch::Receiver<PollerSnapshot>, attempt: u64) {
    let _ = rx.wait_for(|state| !state.owns(attempt)).await;
}

async fn run_attempt(shared: Arc<Shared>, attempt: u64, request: SummaryRequest) {
    let task_id = match shared.submit(&request).await {
        Ok(task_id) => task_id,
        Err(error) => {
            let error = match error {
                SummaryError::AuthError(_) | SummaryError::SubmissionError(_) => error,
                other => SummaryError::SubmissionError(other.to_string()),
            };
            shared.fail(attempt, error);
            return;
        }
    };

    let accepted = shared
        .state
        .send_if_modified(|state| state.start_polling(attempt, task_id.clone()));
    if !accepted {
        info!(task_id = %task_id, "Submission answered after the attempt ended; ignoring");
        return;
    }

    let mut stop = shared.state.subscribe();
    let period = shared.config.poll_interval.max(MIN_POLL_INTERVAL);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    // A slow status call delays the next tick instead of bunching them up.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut polls: u32 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            () = superseded(&mut stop, attempt) => {
                info!(task_id = %task_id, "Polling stopped");
                return;
            }
        }

        if let Some(max_polls) = shared.config.max_polls
            && polls >= max_polls
        {
            shared.fail(attempt, SummaryError::PollTimeout(max_polls));
            return;
        }

        if !shared.state.send_if_modified(|state| state.record_poll(attempt)) {
            return;
        }
        polls += 1;

        // Cancelling drops the call together with any pending retry.
        let polled = tokio::select! {
            polled = shared.poll_status(&task_id) => polled,
            () = superseded(&mut stop, attempt) => {
                info!(task_id = %task_id, "Polling stopped during a status check");
                return;
            }
        };
        let response = match polled {
            Ok(response) => response,
            Err(error) => {
                shared.fail(attempt, error);
                return;
            }
        };

        let mut applied = Applied::Stale;
        shared.state.send_if_modified(|state| {
            applied = state.apply_status(attempt, response);
            applied != Applied::Stale
        });
        if applied != Applied::Continue {
            return;
        }
    }
}
