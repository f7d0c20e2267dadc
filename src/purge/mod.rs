//! Account Purging
//!
//! Tick-driven removal of player accounts: the [`PurgeTask`] walks the
//! request a slice at a time and the [`PurgeService`] coordinates purges and
//! performs the removal.

mod config;
mod service;
mod task;

pub use config::{PurgeConfig, MIN_DAYS_BEFORE_PURGE};
pub use service::PurgeService;
pub use task::{
    PurgeContext, PurgePhase, PurgeProgress, PurgeTask, TickOutcome, PROGRESS_INTERVAL, SLICE_SIZE,
};

use thiserror::Error;

use crate::account::OfflinePlayer;

/// Receiver of purge batches
pub trait PurgeSink: Send + Sync {
    /// Purge one batch; both slices may be empty
    fn execute_purge(&self, players: &[OfflinePlayer], names: &[String]);

    fn set_purging(&self, purging: bool);

    fn is_purging(&self) -> bool;
}

/// Removal of the data belonging to purged players
pub trait PurgeExecutor: Send + Sync {
    fn execute_purge_actions(&self, players: &[OfflinePlayer], names: &[String]);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurgeError {
    #[error("a purge is already in progress")]
    AlreadyInProgress,

    #[error("no players to purge")]
    NothingToPurge,

    #[error("refusing to purge accounts inactive for {days} days, the minimum is {min}")]
    RetentionTooShort { days: u32, min: u32 },
}
