//! Purge Task
//!
//! Resumable purge of a set of player names, a few candidates per tick.
//!
//! Each tick looks at the next page of known offline players and batches the
//! ones that were requested and are not exempt. Once a page yields no
//! purgeable player while names remain, the remaining names have no player
//! left to match and are swept by name in a single pass.

use hashbrown::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::PurgeSink;
use crate::account::{normalize_name, OfflinePlayer, PlayerId};
use crate::messaging::{Messenger, Recipient};
use crate::permission::{Permission, PermissionChecker};
use crate::scheduler::{CancelHandle, ScheduledTask};

/// Offline players examined per tick
pub const SLICE_SIZE: usize = 5;

/// Ticks between two progress messages
pub const PROGRESS_INTERVAL: usize = 20;

/// Traversal state of a purge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgePhase {
    /// Paging through the offline player table
    ScanningTable,
    /// Leftover names were swept without a player behind them
    NameSweep,
    /// Completion was signalled; nothing is left to do
    Finished,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Batches of the given sizes were handed to the sink
    Delivered { players: usize, names: usize },
    /// The purge is complete and its schedule cancelled
    Finished,
}

/// Processed versus requested names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeProgress {
    pub completed: usize,
    pub total: usize,
}

/// Collaborators a purge task reports to
#[derive(Clone)]
pub struct PurgeContext {
    pub permissions: Arc<dyn PermissionChecker>,
    pub sink: Arc<dyn PurgeSink>,
    pub messenger: Arc<dyn Messenger>,
}

/// Incremental purge of one request
pub struct PurgeTask {
    context: PurgeContext,
    recipient: Recipient,
    prefix: String,
    to_purge: HashSet<String>,
    offline_players: Arc<[OfflinePlayer]>,
    total: usize,
    current_page: usize,
    phase: PurgePhase,
    unavailable: usize,
}

impl PurgeTask {
    /// Create a task for `names`, matched against `offline_players`.
    ///
    /// Names are lowercased. `originator` receives progress messages; the
    /// console does when it is `None`.
    pub fn new<I, S>(
        context: PurgeContext,
        originator: Option<PlayerId>,
        prefix: impl Into<String>,
        names: I,
        offline_players: Arc<[OfflinePlayer]>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let to_purge: HashSet<String> = names
            .into_iter()
            .map(|name| normalize_name(name.as_ref()))
            .collect();

        Self {
            context,
            recipient: Recipient::from_originator(originator),
            prefix: prefix.into(),
            total: to_purge.len(),
            to_purge,
            offline_players,
            current_page: 0,
            phase: PurgePhase::ScanningTable,
            unavailable: 0,
        }
    }

    /// Process the next slice of work.
    ///
    /// Completes the purge instead when no names are left at entry.
    pub fn tick(&mut self, handle: &CancelHandle) -> TickOutcome {
        if self.phase == PurgePhase::Finished {
            return TickOutcome::Finished;
        }

        if self.to_purge.is_empty() {
            self.finish(handle);
            return TickOutcome::Finished;
        }

        let mut players = Vec::with_capacity(SLICE_SIZE);
        let mut names = Vec::with_capacity(SLICE_SIZE);

        if self.phase == PurgePhase::ScanningTable {
            self.scan_page(&mut players, &mut names);
            if !self.to_purge.is_empty() && players.is_empty() {
                info!(
                    remaining = self.to_purge.len(),
                    "Finished lookup of offline players, purging remaining names only"
                );
                self.phase = PurgePhase::NameSweep;
            }
        }

        if self.phase == PurgePhase::NameSweep {
            self.sweep_names(&mut names);
        }

        self.current_page += 1;
        debug!(
            page = self.current_page,
            players = players.len(),
            names = names.len(),
            "Delivering purge batch"
        );
        self.context.sink.execute_purge(&players, &names);

        if self.current_page % PROGRESS_INTERVAL == 0 {
            let progress = self.progress();
            self.send_message(&format!(
                "{} Purge progress {}/{}",
                self.prefix, progress.completed, progress.total
            ));
        }

        TickOutcome::Delivered {
            players: players.len(),
            names: names.len(),
        }
    }

    fn scan_page(&mut self, players: &mut Vec<OfflinePlayer>, names: &mut Vec<String>) {
        let start = self.current_page.saturating_mul(SLICE_SIZE);
        let end = start.saturating_add(SLICE_SIZE).min(self.offline_players.len());

        for position in start..end {
            let player = &self.offline_players[position];
            let Some(name) = player.name() else {
                continue;
            };
            if !self.to_purge.remove(&normalize_name(name)) {
                continue;
            }

            if let Err(err) = self.context.permissions.load_user_data(player) {
                warn!(
                    player = %name,
                    error = %err,
                    "Unable to check if the user can be purged"
                );
                self.unavailable += 1;
                continue;
            }

            if !self
                .context
                .permissions
                .has_permission_offline(player, Permission::BypassPurge)
            {
                names.push(name.to_string());
                players.push(player.clone());
            }
        }
    }

    fn sweep_names(&mut self, names: &mut Vec<String>) {
        let permissions = &self.context.permissions;
        names.extend(self.to_purge.drain().filter(|name| {
            !permissions.has_permission_offline_name(name, Permission::BypassPurge)
        }));
    }

    fn finish(&mut self, handle: &CancelHandle) {
        handle.cancel();

        self.send_message(&format!("{} Database has been purged successfully", self.prefix));

        info!(
            total = self.total,
            unavailable = self.unavailable,
            "Purge finished"
        );
        self.context.sink.set_purging(false);
        self.phase = PurgePhase::Finished;
    }

    fn send_message(&self, message: &str) {
        if !self.recipient.send(self.context.messenger.as_ref(), message) {
            debug!("Purge originator is offline, message dropped");
        }
    }

    /// Lowercase names not yet processed
    pub fn pending(&self) -> &HashSet<String> {
        &self.to_purge
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn phase(&self) -> PurgePhase {
        self.phase
    }

    /// Players skipped because their permission data could not be loaded
    pub fn unavailable(&self) -> usize {
        self.unavailable
    }

    pub fn progress(&self) -> PurgeProgress {
        PurgeProgress {
            completed: self.total - self.to_purge.len(),
            total: self.total,
        }
    }
}

impl Drop for PurgeTask {
    fn drop(&mut self) {
        if self.phase != PurgePhase::Finished {
            warn!(
                remaining = self.to_purge.len(),
                total = self.total,
                "Purge stopped before completion"
            );
            self.context.sink.set_purging(false);
        }
    }
}

impl ScheduledTask for PurgeTask {
    fn run(&mut self, handle: &CancelHandle) {
        self.tick(handle);
    }
}
