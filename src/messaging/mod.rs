//! Messaging
//!
//! Text messages to the operator who requested a purge, or to the console.

mod sessions;

pub use sessions::SessionRegistry;

use crate::account::PlayerId;

/// Delivery of plain text messages
pub trait Messenger: Send + Sync {
    /// Send to the player's current session.
    ///
    /// Returns `false` when the player is not online; the message is dropped.
    fn send_to_player(&self, player: &PlayerId, message: &str) -> bool;

    fn send_to_console(&self, message: &str);
}

/// Message target, captured as a stable identity rather than a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Player(PlayerId),
    Console,
}

impl Recipient {
    pub fn from_originator(originator: Option<PlayerId>) -> Self {
        originator.map(Recipient::Player).unwrap_or(Recipient::Console)
    }

    /// Send a message, returns `false` if it was dropped
    pub fn send(&self, messenger: &dyn Messenger, message: &str) -> bool {
        match self {
            Recipient::Player(id) => messenger.send_to_player(id, message),
            Recipient::Console => {
                messenger.send_to_console(message);
                true
            }
        }
    }
}
