//! Permissions
//!
//! Offline permission checks used to exempt players from purging.

mod groups;

pub use groups::{Group, GroupPermissions};

use thiserror::Error;

use crate::account::OfflinePlayer;

/// Permission node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Never purged, whatever the inactivity
    BypassPurge,
    /// All permissions
    All,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("permission data for {name} could not be loaded")]
    UserDataUnavailable { name: String },

    #[error("player has no name to look up permissions with")]
    MissingName,
}

/// Authorization checks against players who may be offline
pub trait PermissionChecker: Send + Sync {
    /// Prepare the offline permission state of `player`.
    ///
    /// Must succeed before [`PermissionChecker::has_permission_offline`] gives a
    /// meaningful answer for that player.
    fn load_user_data(&self, player: &OfflinePlayer) -> Result<(), PermissionError>;

    fn has_permission_offline(&self, player: &OfflinePlayer, permission: Permission) -> bool;

    /// Check a bare name with no known player behind it
    fn has_permission_offline_name(&self, name: &str, permission: Permission) -> bool;
}
