use tokio::sync::broadcast;

use crate::types::{Appearance, Message};

const EVENT_CAPACITY: usize = 64;

/// Notifications delivered to the rendering layer.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatEvent {
    MessageAppended(Message),
    TypingStarted,
    TypingStopped,
    ThemeChanged(Appearance),
    PlayNotification,
    ConversationCleared,
}

/// Fan-out of [`ChatEvent`]s. Events emitted while nobody is subscribed are
/// dropped; a subscriber that falls more than the channel capacity behind
/// observes `RecvError::Lagged`.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<ChatEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: ChatEvent) {
        // Err only means there are no subscribers right now.
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
