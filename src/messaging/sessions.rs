//! Session Registry
//!
//! Online player sessions with bounded message inboxes, plus the console log.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::collections::VecDeque;
use tracing::{debug, info};

use super::Messenger;
use crate::account::PlayerId;

/// Online sessions and their received messages
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<PlayerId, VecDeque<String>>>,
    console: RwLock<VecDeque<String>>,
    /// Maximum messages kept per inbox
    max_size: usize,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            console: RwLock::new(VecDeque::with_capacity(max_size)),
            max_size,
        }
    }

    /// Open a session for the player; an existing session keeps its inbox
    pub fn connect(&self, player: PlayerId) {
        self.sessions.write().entry(player).or_default();
    }

    /// Close the player's session and discard its inbox
    pub fn disconnect(&self, player: &PlayerId) {
        self.sessions.write().remove(player);
    }

    pub fn is_online(&self, player: &PlayerId) -> bool {
        self.sessions.read().contains_key(player)
    }

    /// Messages received by the player's current session
    pub fn inbox(&self, player: &PlayerId) -> Vec<String> {
        self.sessions
            .read()
            .get(player)
            .map(|inbox| inbox.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Messages sent to the console
    pub fn console_log(&self) -> Vec<String> {
        self.console.read().iter().cloned().collect()
    }

    fn push_bounded(max_size: usize, buffer: &mut VecDeque<String>, message: &str) {
        if buffer.len() >= max_size {
            buffer.pop_front();
        }
        buffer.push_back(message.to_string());
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Messenger for SessionRegistry {
    fn send_to_player(&self, player: &PlayerId, message: &str) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(player) {
            Some(inbox) => {
                Self::push_bounded(self.max_size, inbox, message);
                true
            }
            None => {
                debug!(%player, "Player is offline, dropping message");
                false
            }
        }
    }

    fn send_to_console(&self, message: &str) {
        info!(target: "console", "{}", message);
        Self::push_bounded(self.max_size, &mut self.console.write(), message);
    }
}
