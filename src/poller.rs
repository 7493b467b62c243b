//! Polling loop for plan-generation jobs.
//!
//! A submitted job is polled at a fixed interval until the backend reports a
//! terminal state, the attempt budget runs out, or the caller cancels.
//! Polls are strictly sequential: the next one is scheduled only after the
//! previous response (or error) has been handled. Transport faults are
//! retried on the same schedule and consume the same budget.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::itinerary::{PlanPayload, PlanRequest};
use crate::traits::{Sleeper, TaskBackend, TokioSleeper};

/// Shown when a job fails without a backend message.
pub const GENERIC_FAILURE_MESSAGE: &str = "plan generation failed, please retry";

/// Backend job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job state as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// One poll response.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStatusReport {
    pub status: TaskStatus,
    pub payload: Option<PlanPayload>,
    pub error: Option<String>,
}

impl TaskStatusReport {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status,
            payload: None,
            error: None,
        }
    }

    pub fn completed(payload: PlanPayload) -> Self {
        Self {
            payload: Some(payload),
            ..Self::status(TaskStatus::Completed)
        }
    }

    pub fn failed(error: Option<String>) -> Self {
        Self {
            error,
            ..Self::status(TaskStatus::Failed)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Wait before the first poll.
    pub initial_delay: Duration,
    /// Wait between polls.
    pub interval: Duration,
    /// Poll budget; transport errors count against it.
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1000),
            interval: Duration::from_millis(3000),
            max_attempts: 40,
        }
    }
}

/// Per-job polling state, owned by a single polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    task_id: TaskId,
    attempts: u32,
    interval: Duration,
    max_attempts: u32,
}

impl TaskHandle {
    pub fn new(task_id: TaskId, config: &PollerConfig) -> Self {
        Self {
            task_id,
            attempts: 0,
            interval: config.interval,
            max_attempts: config.max_attempts.max(1),
        }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn record_attempt(&mut self) -> u32 {
        self.attempts = (self.attempts + 1).min(self.max_attempts);
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

/// Raw progress estimate for one poll. `None` for `Failed`, which reports
/// no percentage.
pub fn progress_percent(status: TaskStatus, attempts: u32, max_attempts: u32) -> Option<u8> {
    let ratio = f64::from(attempts) / f64::from(max_attempts.max(1));
    let percent = match status {
        TaskStatus::Pending => (ratio * 80.0).round().min(80.0),
        TaskStatus::Processing => (50.0 + (ratio * 30.0).round()).min(80.0),
        TaskStatus::Completed => 100.0,
        TaskStatus::Failed => return None,
    };
    Some(percent.clamp(0.0, 100.0) as u8)
}

/// Clamps successive estimates so reported progress never goes backwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressTracker {
    last: Option<u8>,
}

impl ProgressTracker {
    pub fn advance(&mut self, status: TaskStatus, attempts: u32, max_attempts: u32) -> Option<u8> {
        let raw = progress_percent(status, attempts, max_attempts)?;
        let reported = self.last.map_or(raw, |last| last.max(raw));
        self.last = Some(reported);
        Some(reported)
    }

    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

/// How a polling loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(PlanPayload),
    Failed(String),
    /// Budget exhausted without a terminal state. The job may still finish
    /// server-side.
    Timeout {
        attempts: u32,
        last_error: Option<String>,
    },
    Cancelled,
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Completed(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            PollOutcome::Completed(_) => "travel plan generated".to_string(),
            PollOutcome::Failed(message) => message.clone(),
            PollOutcome::Timeout {
                last_error: None, ..
            } => "plan generation timed out, check your plan list later".to_string(),
            PollOutcome::Timeout {
                last_error: Some(_),
                ..
            } => "could not get task status, check your plan list later".to_string(),
            PollOutcome::Cancelled => "plan generation tracking cancelled".to_string(),
        }
    }
}

/// Cooperative cancellation flag, checked before every wait and poll.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct TaskPoller<B, S = TokioSleeper> {
    backend: B,
    sleeper: S,
    config: PollerConfig,
}

impl<B: TaskBackend> TaskPoller<B, TokioSleeper> {
    pub fn new(backend: B, config: PollerConfig) -> Self {
        Self::with_sleeper(backend, TokioSleeper, config)
    }
}

impl<B: TaskBackend, S: Sleeper> TaskPoller<B, S> {
    pub fn with_sleeper(backend: B, sleeper: S, config: PollerConfig) -> Self {
        Self {
            backend,
            sleeper,
            config,
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Submits `request` and polls the resulting job.
    pub async fn submit_and_poll<F>(
        &self,
        request: &PlanRequest,
        cancel: &CancelToken,
        on_progress: F,
    ) -> Result<PollOutcome, BackendError>
    where
        F: FnMut(u8),
    {
        let task_id = self.backend.submit_plan(request).await?;
        tracing::info!(task_id = %task_id, "plan generation submitted");
        Ok(self.poll(task_id, cancel, on_progress).await)
    }

    /// Polls with progress and terminal callbacks, returning the outcome too.
    pub async fn start<P, T>(&self, task_id: TaskId, on_progress: P, on_terminal: T) -> PollOutcome
    where
        P: FnMut(u8),
        T: FnOnce(&PollOutcome),
    {
        let outcome = self.poll(task_id, &CancelToken::new(), on_progress).await;
        on_terminal(&outcome);
        outcome
    }

    /// Runs the polling loop for `task_id` to a terminal outcome.
    pub async fn poll<F>(
        &self,
        task_id: TaskId,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> PollOutcome
    where
        F: FnMut(u8),
    {
        let mut handle = TaskHandle::new(task_id, &self.config);
        let mut progress = ProgressTracker::default();

        if cancel.is_cancelled() {
            return cancelled(&handle);
        }
        self.sleeper.sleep(self.config.initial_delay).await;

        loop {
            if cancel.is_cancelled() {
                return cancelled(&handle);
            }

            let attempt = handle.record_attempt();
            let max_attempts = handle.max_attempts();
            // error of this attempt only; a later success clears it
            let last_error = match self.backend.task_status(handle.task_id()).await {
                Ok(report) => {
                    tracing::debug!(
                        task_id = %handle.task_id(),
                        attempt,
                        status = ?report.status,
                        "task status"
                    );
                    match report.status {
                        TaskStatus::Completed => {
                            if let Some(percent) =
                                progress.advance(TaskStatus::Completed, attempt, max_attempts)
                            {
                                on_progress(percent);
                            }
                            let payload = report.payload.unwrap_or_else(|| {
                                tracing::warn!(
                                    task_id = %handle.task_id(),
                                    "completed job carried no plan"
                                );
                                PlanPayload::default()
                            });
                            tracing::info!(
                                task_id = %handle.task_id(),
                                attempts = attempt,
                                "plan generation completed"
                            );
                            return PollOutcome::Completed(payload);
                        }
                        TaskStatus::Failed => {
                            let message = report
                                .error
                                .filter(|message| !message.trim().is_empty())
                                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                            tracing::warn!(
                                task_id = %handle.task_id(),
                                error = %message,
                                "plan generation failed"
                            );
                            return PollOutcome::Failed(message);
                        }
                        status @ (TaskStatus::Pending | TaskStatus::Processing) => {
                            if let Some(percent) = progress.advance(status, attempt, max_attempts)
                            {
                                on_progress(percent);
                            }
                            None
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        task_id = %handle.task_id(),
                        attempt,
                        error = %err,
                        "task status poll failed, will retry"
                    );
                    Some(err.to_string())
                }
            };

            if handle.is_exhausted() {
                tracing::warn!(
                    task_id = %handle.task_id(),
                    attempts = handle.attempts(),
                    "gave up polling, job may still finish"
                );
                return PollOutcome::Timeout {
                    attempts: handle.attempts(),
                    last_error,
                };
            }

            if cancel.is_cancelled() {
                return cancelled(&handle);
            }
            self.sleeper.sleep(handle.interval()).await;
        }
    }
}

fn cancelled(handle: &TaskHandle) -> PollOutcome {
    tracing::info!(task_id = %handle.task_id(), attempts = handle.attempts(), "polling cancelled");
    PollOutcome::Cancelled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TaskStatus::Pending, 1, 40, 2)]
    #[case(TaskStatus::Pending, 20, 40, 40)]
    #[case(TaskStatus::Pending, 40, 40, 80)]
    #[case(TaskStatus::Processing, 1, 40, 51)]
    #[case(TaskStatus::Processing, 3, 40, 52)]
    #[case(TaskStatus::Processing, 40, 40, 80)]
    #[case(TaskStatus::Completed, 1, 40, 100)]
    #[case(TaskStatus::Pending, 1, 3, 27)]
    fn test_progress_percent(
        #[case] status: TaskStatus,
        #[case] attempts: u32,
        #[case] max_attempts: u32,
        #[case] expected: u8,
    ) {
        assert_eq!(progress_percent(status, attempts, max_attempts), Some(expected));
    }

    #[test]
    fn test_failed_has_no_percent() {
        assert_eq!(progress_percent(TaskStatus::Failed, 5, 40), None);
    }

    #[test]
    fn test_tracker_never_regresses() {
        let mut tracker = ProgressTracker::default();
        assert_eq!(tracker.advance(TaskStatus::Processing, 3, 40), Some(52));
        // a late "pending" would compute 8
        assert_eq!(tracker.advance(TaskStatus::Pending, 4, 40), Some(52));
        assert_eq!(tracker.advance(TaskStatus::Completed, 5, 40), Some(100));
        assert_eq!(tracker.last(), Some(100));
    }

    #[test]
    fn test_handle_counts_up_to_budget() {
        let config = PollerConfig {
            max_attempts: 2,
            ..PollerConfig::default()
        };
        let mut handle = TaskHandle::new(TaskId::new("t"), &config);
        assert!(!handle.is_exhausted());
        assert_eq!(handle.record_attempt(), 1);
        assert_eq!(handle.record_attempt(), 2);
        assert!(handle.is_exhausted());
        assert_eq!(handle.record_attempt(), 2);
    }

    #[test]
    fn test_zero_budget_treated_as_one() {
        let config = PollerConfig {
            max_attempts: 0,
            ..PollerConfig::default()
        };
        assert_eq!(TaskHandle::new(TaskId::new("t"), &config).max_attempts(), 1);
    }

    #[test]
    fn test_status_deserializes_lowercase() {
        let status: TaskStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(status, TaskStatus::Processing);
        assert!(!status.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn test_user_messages() {
        let timeout = PollOutcome::Timeout {
            attempts: 40,
            last_error: None,
        };
        assert!(timeout.user_message().contains("plan list"));
        assert_eq!(PollOutcome::Failed("quota".to_string()).user_message(), "quota");
        assert!(PollOutcome::Completed(PlanPayload::default()).is_success());
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
