use crate::domain::model::RemoteTask;
use crate::domain::ports::TaskTracker;
use crate::utils::error::Result;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Waits on Site Factory WIP tasks.
///
/// There is no timeout and no cancellation: a wait lasts until the platform
/// reports the task as completed or a status request fails.
pub struct TaskPoller<'a, T: TaskTracker + ?Sized> {
    tracker: &'a T,
    interval: Duration,
}

impl<'a, T: TaskTracker + ?Sized> TaskPoller<'a, T> {
    pub fn new(tracker: &'a T) -> Self {
        Self {
            tracker,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll until the task completes and return its final status.
    ///
    /// `on_progress` is called after every poll, including the one that sees
    /// the task complete, with the task's completion flag.
    pub async fn wait_for_completion(
        &self,
        task_id: &str,
        on_progress: Option<&(dyn Fn(bool) + Send + Sync)>,
    ) -> Result<RemoteTask> {
        let mut polls = 0usize;
        loop {
            let status = self.tracker.task_status(task_id).await?;
            polls += 1;

            if let Some(pulse) = on_progress {
                pulse(status.completed);
            }

            if status.completed {
                tracing::debug!(
                    "Task {} finished after {} polls: {}",
                    task_id,
                    polls,
                    status.status_string
                );
                return Ok(status);
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
