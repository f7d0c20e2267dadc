//! In-Memory Account Store
//!
//! Thread-safe hashmap of authentication records keyed by lowercase name.

use chrono::{DateTime, Utc};
use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use super::{normalize_name, OfflinePlayer};
use crate::purge::PurgeExecutor;

/// Stored authentication record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerAuth {
    /// Name as the player registered it
    pub name: String,
    /// Last successful login, `None` if the player never logged in
    pub last_login: Option<DateTime<Utc>>,
}

impl PlayerAuth {
    pub fn new(name: impl Into<String>, last_login: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            last_login,
        }
    }

    /// Whether the player has not logged in since `until`
    fn is_inactive_since(&self, until: DateTime<Utc>) -> bool {
        self.last_login.map(|t| t < until).unwrap_or(true)
    }
}

/// Thread-safe in-memory account store
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    inner: Arc<RwLock<HashMap<String, PlayerAuth>>>,
}

impl AccountStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record
    pub fn save(&self, auth: PlayerAuth) {
        let key = normalize_name(&auth.name);
        self.inner.write().insert(key, auth);
    }

    /// Get a record by name, case-insensitively
    pub fn get(&self, name: &str) -> Option<PlayerAuth> {
        self.inner.read().get(&normalize_name(name)).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().contains_key(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored lowercase names
    pub fn names(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    /// Lowercase names of players whose last login is older than `until`
    pub fn get_recently_inactive(&self, until: DateTime<Utc>) -> HashSet<String> {
        self.inner
            .read()
            .iter()
            .filter(|(_, auth)| auth.is_inactive_since(until))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Remove records by name, returns count of removed records
    pub fn purge_records<'a, I>(&self, names: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = self.inner.write();
        names
            .into_iter()
            .filter(|name| map.remove(&normalize_name(name)).is_some())
            .count()
    }
}

impl PurgeExecutor for AccountStore {
    fn execute_purge_actions(&self, _players: &[OfflinePlayer], names: &[String]) {
        let removed = self.purge_records(names.iter().map(String::as_str));
        if removed > 0 {
            debug!(removed, "Purged authentication records");
        }
    }
}
