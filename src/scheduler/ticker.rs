//! Tick Scheduler
//!
//! Background loop that invokes a task on a fixed period until it cancels.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::{CancelHandle, ScheduledTask, SchedulerError};

/// Repeating task scheduler
pub struct TaskScheduler;

impl TaskScheduler {
    /// Run `task` every `period` (first run immediately) until it cancels.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_repeating<T: ScheduledTask>(task: T, period: Duration) -> ScheduledHandle {
        let handle = CancelHandle::new();
        let join = tokio::spawn(Self::run(task, period, handle.clone()));
        ScheduledHandle { handle, join }
    }

    async fn run<T: ScheduledTask>(mut task: T, period: Duration, handle: CancelHandle) -> u64 {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Task scheduled, period: {:?}", period);

        let mut ticks = 0u64;
        loop {
            tokio::select! {
                _ = handle.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if handle.is_cancelled() {
                break;
            }

            task.run(&handle);
            ticks += 1;
        }

        debug!(ticks, "Task schedule cancelled");
        ticks
    }
}

/// Handle on a spawned schedule
#[derive(Debug)]
pub struct ScheduledHandle {
    handle: CancelHandle,
    join: JoinHandle<u64>,
}

impl ScheduledHandle {
    /// Cancellation handle shared with the task
    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.handle
    }

    /// Cancel from outside, e.g. on host shutdown
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the schedule to stop, returns how many times the task ran
    pub async fn join(self) -> Result<u64, tokio::task::JoinError> {
        self.join.await
    }
}

/// Drive `task` synchronously until it cancels its handle.
///
/// For hosts that own their own loop. Returns the number of ticks run.
pub fn run_until_cancelled<T: ScheduledTask>(
    task: &mut T,
    max_ticks: u64,
) -> Result<u64, SchedulerError> {
    let handle = CancelHandle::new();
    let mut ticks = 0;
    while !handle.is_cancelled() {
        if ticks == max_ticks {
            return Err(SchedulerError::TickLimitReached(max_ticks));
        }
        task.run(&handle);
        ticks += 1;
    }
    Ok(ticks)
}
