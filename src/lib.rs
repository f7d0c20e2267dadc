//! AuthPurge - Incremental Account Purging
//!
//! Purges large sets of player accounts a few at a time, so the host's
//! single cooperative thread is never blocked. A purge task is ticked by a
//! scheduler, checks each candidate for the purge bypass permission and
//! hands the survivors to the purge executor in small batches.

pub mod account;
pub mod messaging;
pub mod permission;
pub mod purge;
pub mod scheduler;

pub use account::{AccountStore, OfflinePlayer, PlayerAuth, PlayerId};
pub use messaging::{Messenger, Recipient, SessionRegistry};
pub use permission::{GroupPermissions, Permission, PermissionChecker, PermissionError};
pub use purge::{PurgeConfig, PurgeError, PurgeService, PurgeSink, PurgeTask, TickOutcome};
pub use scheduler::{CancelHandle, ScheduledTask, TaskScheduler};
