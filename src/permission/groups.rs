//! Group-based permissions
//!
//! In-memory permission backend: players belong to groups, groups grant
//! permission nodes.

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;
use tracing::debug;

use super::{Permission, PermissionChecker, PermissionError};
use crate::account::{normalize_name, OfflinePlayer};

/// Group definition
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub permissions: HashSet<Permission>,
}

impl Group {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            permissions: HashSet::new(),
        }
    }

    pub fn with_permission(mut self, perm: Permission) -> Self {
        self.permissions.insert(perm);
        self
    }

    /// Check if permission is granted
    pub fn grants(&self, perm: Permission) -> bool {
        self.permissions.contains(&Permission::All) || self.permissions.contains(&perm)
    }
}

/// Predefined groups
impl Group {
    pub fn admin() -> Self {
        Self::new("admin").with_permission(Permission::All)
    }

    pub fn exempt() -> Self {
        Self::new("exempt").with_permission(Permission::BypassPurge)
    }
}

/// Group permission manager
#[derive(Debug)]
pub struct GroupPermissions {
    groups: RwLock<HashMap<String, Group>>,
    user_groups: RwLock<HashMap<String, Vec<String>>>,
    unavailable: RwLock<HashSet<String>>,
    loaded: RwLock<HashSet<String>>,
}

impl GroupPermissions {
    pub fn new() -> Self {
        let mut groups = HashMap::new();
        groups.insert("admin".to_string(), Group::admin());
        groups.insert("exempt".to_string(), Group::exempt());

        Self {
            groups: RwLock::new(groups),
            user_groups: RwLock::new(HashMap::new()),
            unavailable: RwLock::new(HashSet::new()),
            loaded: RwLock::new(HashSet::new()),
        }
    }

    /// Add a group
    pub fn add_group(&self, group: Group) {
        self.groups.write().insert(group.name.clone(), group);
    }

    /// Assign group to user
    pub fn assign_group(&self, username: &str, group_name: &str) {
        self.user_groups
            .write()
            .entry(normalize_name(username))
            .or_default()
            .push(group_name.to_string());
    }

    /// Make loading the user's data fail, as a broken backend would
    pub fn mark_unavailable(&self, username: &str) {
        self.unavailable.write().insert(normalize_name(username));
    }

    /// Whether the user's data has been loaded
    pub fn is_loaded(&self, username: &str) -> bool {
        self.loaded.read().contains(&normalize_name(username))
    }

    /// Check if user is granted a permission through any of its groups
    pub fn has_permission(&self, username: &str, perm: Permission) -> bool {
        let user_groups = self.user_groups.read();
        let groups = self.groups.read();

        user_groups
            .get(&normalize_name(username))
            .into_iter()
            .flatten()
            .filter_map(|name| groups.get(name))
            .any(|group| group.grants(perm))
    }
}

impl Default for GroupPermissions {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionChecker for GroupPermissions {
    fn load_user_data(&self, player: &OfflinePlayer) -> Result<(), PermissionError> {
        let name = normalize_name(player.name().ok_or(PermissionError::MissingName)?);
        if self.unavailable.read().contains(&name) {
            return Err(PermissionError::UserDataUnavailable { name });
        }

        debug!(player = %name, "Loaded offline permission data");
        self.loaded.write().insert(name);
        Ok(())
    }

    fn has_permission_offline(&self, player: &OfflinePlayer, permission: Permission) -> bool {
        player
            .name()
            .map(|name| self.has_permission(name, permission))
            .unwrap_or(false)
    }

    fn has_permission_offline_name(&self, name: &str, permission: Permission) -> bool {
        self.has_permission(name, permission)
    }
}
