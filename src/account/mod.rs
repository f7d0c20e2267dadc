//! Accounts
//!
//! Player identities and the in-memory authentication record store.

mod loader;
mod store;

pub use loader::{load_accounts, parse_accounts, AccountFileError};
pub use store::{AccountStore, PlayerAuth};

use std::fmt;
use uuid::Uuid;

/// Stable identity of a player, independent of any live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A player known to the host, whether or not they are online.
///
/// The display name may be missing for accounts with corrupted profile data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflinePlayer {
    pub id: PlayerId,
    pub name: Option<String>,
}

impl OfflinePlayer {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// A player whose name could not be resolved
    pub fn unnamed(id: PlayerId) -> Self {
        Self { id, name: None }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Lowercase a player name the way every lookup key is stored
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unnamed_player() {
        let player = OfflinePlayer::unnamed(PlayerId::from_u128(7));
        assert_eq!(player.name(), None);
        assert_eq!(player.id, PlayerId::from_u128(7));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Alice_01"), "alice_01");
    }
}
