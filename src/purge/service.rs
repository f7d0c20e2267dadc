//! Purge Service
//!
//! Entry point for purges: refuses overlapping purges, selects inactive
//! accounts and hands the resulting batches to the executor.

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use super::config::MIN_DAYS_BEFORE_PURGE;
use super::{PurgeConfig, PurgeContext, PurgeError, PurgeExecutor, PurgeSink, PurgeTask};
use crate::account::{AccountStore, OfflinePlayer, PlayerId};
use crate::messaging::{Messenger, Recipient};
use crate::permission::PermissionChecker;
use crate::scheduler::{ScheduledHandle, TaskScheduler};

/// Purge coordinator, owner of the process-wide "purging" flag
pub struct PurgeService {
    config: PurgeConfig,
    accounts: AccountStore,
    executor: Arc<dyn PurgeExecutor>,
    permissions: Arc<dyn PermissionChecker>,
    messenger: Arc<dyn Messenger>,
    purging: AtomicBool,
}

impl PurgeService {
    /// Create a service purging records from `accounts`
    pub fn new(
        config: PurgeConfig,
        accounts: AccountStore,
        permissions: Arc<dyn PermissionChecker>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            config,
            executor: Arc::new(accounts.clone()),
            accounts,
            permissions,
            messenger,
            purging: AtomicBool::new(false),
        }
    }

    /// Replace the default executor, which only removes account records
    pub fn with_executor(mut self, executor: Arc<dyn PurgeExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn config(&self) -> &PurgeConfig {
        &self.config
    }

    /// Purge accounts that have not logged in since `until`
    pub fn run_purge(
        self: &Arc<Self>,
        originator: Option<PlayerId>,
        until: DateTime<Utc>,
        offline_players: Arc<[OfflinePlayer]>,
    ) -> Result<PurgeTask, PurgeError> {
        let to_purge = self.accounts.get_recently_inactive(until);
        if to_purge.is_empty() {
            self.send(originator, &format!("{} No players to purge", self.config.message_prefix));
            return Err(PurgeError::NothingToPurge);
        }

        info!(count = to_purge.len(), %until, "Purging inactive players");
        self.purge_players(originator, to_purge, offline_players)
    }

    /// Purge inactive accounts without an originator, if enabled.
    ///
    /// Returns `Ok(None)` when automatic purging is disabled.
    pub fn run_auto_purge(
        self: &Arc<Self>,
        offline_players: Arc<[OfflinePlayer]>,
    ) -> Result<Option<PurgeTask>, PurgeError> {
        if !self.config.auto_purge {
            return Ok(None);
        }

        let days = self.config.days_before_purge;
        if days < MIN_DAYS_BEFORE_PURGE {
            warn!(
                days,
                min = MIN_DAYS_BEFORE_PURGE,
                "Refusing to automatically purge recently active accounts"
            );
            return Err(PurgeError::RetentionTooShort {
                days,
                min: MIN_DAYS_BEFORE_PURGE,
            });
        }

        let until = Utc::now() - Duration::days(i64::from(days));
        self.run_purge(None, until, offline_players).map(Some)
    }

    /// Start purging `names`, matched against `offline_players`.
    ///
    /// The returned task must be ticked until it finishes; the purging flag
    /// stays set until then, or until the task is dropped unfinished.
    pub fn purge_players<I, S>(
        self: &Arc<Self>,
        originator: Option<PlayerId>,
        names: I,
        offline_players: Arc<[OfflinePlayer]>,
    ) -> Result<PurgeTask, PurgeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self
            .purging
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Purge is already in progress, aborting purge request");
            return Err(PurgeError::AlreadyInProgress);
        }

        let context = PurgeContext {
            permissions: self.permissions.clone(),
            sink: self.clone(),
            messenger: self.messenger.clone(),
        };

        Ok(PurgeTask::new(
            context,
            originator,
            self.config.message_prefix.clone(),
            names,
            offline_players,
        ))
    }

    /// Run `task` on the tick scheduler
    pub fn schedule(&self, task: PurgeTask) -> ScheduledHandle {
        TaskScheduler::spawn_repeating(task, self.config.tick_interval)
    }

    fn send(&self, originator: Option<PlayerId>, message: &str) {
        Recipient::from_originator(originator).send(self.messenger.as_ref(), message);
    }
}

impl PurgeSink for PurgeService {
    fn execute_purge(&self, players: &[OfflinePlayer], names: &[String]) {
        if players.is_empty() && names.is_empty() {
            return;
        }
        self.executor.execute_purge_actions(players, names);
    }

    fn set_purging(&self, purging: bool) {
        self.purging.store(purging, Ordering::Release);
    }

    fn is_purging(&self) -> bool {
        self.purging.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::PlayerAuth;
    use crate::messaging::SessionRegistry;
    use crate::permission::GroupPermissions;
    use crate::purge::TickOutcome;
    use crate::scheduler::{run_until_cancelled, CancelHandle};
    use parking_lot::Mutex;

    const PREFIX: &str = "[AuthPurge]";

    struct Fixture {
        accounts: AccountStore,
        permissions: Arc<GroupPermissions>,
        sessions: Arc<SessionRegistry>,
        service: Arc<PurgeService>,
    }

    fn fixture(config: PurgeConfig) -> Fixture {
        let accounts = AccountStore::new();
        let permissions = Arc::new(GroupPermissions::new());
        let sessions = Arc::new(SessionRegistry::new());
        let service = Arc::new(PurgeService::new(
            config,
            accounts.clone(),
            permissions.clone(),
            sessions.clone(),
        ));
        Fixture {
            accounts,
            permissions,
            sessions,
            service,
        }
    }

    fn long_ago() -> Option<DateTime<Utc>> {
        Some(Utc::now() - Duration::days(365))
    }

    fn offline(names: &[&str]) -> Arc<[OfflinePlayer]> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| OfflinePlayer::new(PlayerId::from_u128(i as u128), *name))
            .collect()
    }

    #[test]
    fn test_refuses_overlapping_purge() {
        let f = fixture(PurgeConfig::default());
        let mut task = f
            .service
            .purge_players(None, ["alice"], offline(&[]))
            .unwrap();
        assert!(f.service.is_purging());

        assert_eq!(
            f.service
                .purge_players(None, ["bob"], offline(&[]))
                .err(),
            Some(PurgeError::AlreadyInProgress)
        );

        run_until_cancelled(&mut task, 10).unwrap();
        assert!(!f.service.is_purging());
        assert!(f.service.purge_players(None, ["bob"], offline(&[])).is_ok());
    }

    #[test]
    fn test_run_purge_removes_inactive_accounts() {
        let f = fixture(PurgeConfig::default());
        f.accounts.save(PlayerAuth::new("Alice", long_ago()));
        f.accounts.save(PlayerAuth::new("Bob", long_ago()));
        f.accounts.save(PlayerAuth::new("Carol", Some(Utc::now())));
        f.accounts.save(PlayerAuth::new("Dave", None));
        f.permissions.assign_group("bob", "exempt");

        let originator = PlayerId::from_u128(100);
        f.sessions.connect(originator);

        let mut task = f
            .service
            .run_purge(
                Some(originator),
                Utc::now() - Duration::days(30),
                offline(&["Alice", "Bob", "Carol"]),
            )
            .unwrap();
        assert_eq!(task.total(), 3);

        run_until_cancelled(&mut task, 10).unwrap();

        let mut remaining = f.accounts.names();
        remaining.sort();
        assert_eq!(remaining, vec!["bob".to_string(), "carol".to_string()]);
        assert_eq!(
            f.sessions.inbox(&originator),
            vec![format!("{PREFIX} Database has been purged successfully")]
        );
    }

    #[test]
    fn test_nothing_to_purge() {
        let f = fixture(PurgeConfig::default());
        f.accounts.save(PlayerAuth::new("erin", Some(Utc::now())));

        let result = f
            .service
            .run_purge(None, Utc::now() - Duration::days(30), offline(&[]));
        assert_eq!(result.err(), Some(PurgeError::NothingToPurge));
        assert!(!f.service.is_purging());
        assert_eq!(
            f.sessions.console_log(),
            vec![format!("{PREFIX} No players to purge")]
        );
    }

    #[test]
    fn test_auto_purge() {
        let f = fixture(PurgeConfig::default());
        assert!(matches!(f.service.run_auto_purge(offline(&[])), Ok(None)));

        let f = fixture(PurgeConfig::default().with_auto_purge(7));
        assert_eq!(
            f.service.run_auto_purge(offline(&[])).err(),
            Some(PurgeError::RetentionTooShort { days: 7, min: 30 })
        );

        let f = fixture(PurgeConfig::default().with_auto_purge(60));
        f.accounts.save(PlayerAuth::new("frank", long_ago()));
        let mut task = f
            .service
            .run_auto_purge(offline(&[]))
            .unwrap()
            .expect("auto purge enabled");

        let handle = CancelHandle::new();
        assert_eq!(
            task.tick(&handle),
            TickOutcome::Delivered {
                players: 0,
                names: 1
            }
        );
        assert!(f.accounts.is_empty());
        assert_eq!(task.tick(&handle), TickOutcome::Finished);
        assert!(!f.service.is_purging());
    }

    /// Counts executor invocations
    #[derive(Default)]
    struct CountingExecutor {
        calls: Mutex<Vec<(usize, usize)>>,
    }

    impl PurgeExecutor for CountingExecutor {
        fn execute_purge_actions(&self, players: &[OfflinePlayer], names: &[String]) {
            self.calls.lock().push((players.len(), names.len()));
        }
    }

    #[test]
    fn test_empty_batches_skip_executor() {
        let executor = Arc::new(CountingExecutor::default());
        let service = PurgeService::new(
            PurgeConfig::default(),
            AccountStore::new(),
            Arc::new(GroupPermissions::new()),
            Arc::new(SessionRegistry::new()),
        )
        .with_executor(executor.clone());

        service.execute_purge(&[], &[]);
        service.execute_purge(&[], &["gina".to_string()]);
        assert_eq!(*executor.calls.lock(), vec![(0, 1)]);
    }

    #[tokio::test]
    async fn test_cancelled_schedule_allows_new_purge() {
        let f = fixture(
            PurgeConfig::default().with_tick_interval(std::time::Duration::from_secs(3600)),
        );
        let task = f
            .service
            .purge_players(None, ["sam", "tess"], offline(&["sam"]))
            .unwrap();

        let scheduled = f.service.schedule(task);
        scheduled.cancel();
        let ticks = scheduled.join().await.unwrap();
        assert!(ticks <= 1);

        assert!(!f.service.is_purging());
        assert!(f.service.purge_players(None, ["sam"], offline(&[])).is_ok());
    }

    #[tokio::test]
    async fn test_scheduled_purge() {
        let f = fixture(PurgeConfig::default().with_tick_interval(std::time::Duration::from_millis(1)));
        let names: Vec<String> = (0..12).map(|i| format!("user{i}")).collect();
        for name in &names {
            f.accounts.save(PlayerAuth::new(name.clone(), None));
        }
        let players: Arc<[OfflinePlayer]> = names
            .iter()
            .enumerate()
            .map(|(i, name)| OfflinePlayer::new(PlayerId::from_u128(i as u128), name.clone()))
            .collect();

        let task = f.service.purge_players(None, &names, players).unwrap();
        let scheduled = f.service.schedule(task);
        let ticks = scheduled.join().await.unwrap();

        assert_eq!(ticks, 4);
        assert!(f.accounts.is_empty());
        assert!(!f.service.is_purging());
    }
}
