//! Purge Configuration

use std::time::Duration;

/// Purges of accounts active more recently than this are refused
pub const MIN_DAYS_BEFORE_PURGE: u32 = 30;

/// Purge configuration
#[derive(Debug, Clone)]
pub struct PurgeConfig {
    /// Delay between two ticks of a running purge
    pub tick_interval: Duration,

    /// Prepended to every message sent to the purge originator
    pub message_prefix: String,

    /// Purge inactive accounts on startup
    pub auto_purge: bool,

    /// Days without login after which an account is purged
    pub days_before_purge: u32,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            message_prefix: "[AuthPurge]".to_string(),
            auto_purge: false,
            days_before_purge: 60,
        }
    }
}

impl PurgeConfig {
    /// Set delay between ticks
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set message prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.message_prefix = prefix.into();
        self
    }

    /// Enable purging on startup after `days` of inactivity
    pub fn with_auto_purge(mut self, days: u32) -> Self {
        self.auto_purge = true;
        self.days_before_purge = days;
        self
    }

    /// Set inactivity threshold in days
    pub fn with_days_before_purge(mut self, days: u32) -> Self {
        self.days_before_purge = days;
        self
    }
}
