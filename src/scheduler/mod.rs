//! Task Scheduler
//!
//! Cooperative, repeating tasks advanced one tick at a time. A task cancels
//! its own schedule through the [`CancelHandle`] passed into every run.

mod ticker;

pub use ticker::{run_until_cancelled, ScheduledHandle, TaskScheduler};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A unit of work invoked once per scheduler cycle.
///
/// At most one `run` call is in flight at any time; no call is made once the
/// handle has been cancelled.
pub trait ScheduledTask: Send + 'static {
    fn run(&mut self, handle: &CancelHandle);
}

/// Cancellation handle shared between a schedule and the task it drives
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop any further invocation of the task
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the handle is cancelled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("task did not complete within {0} ticks")]
    TickLimitReached(u64),
}
