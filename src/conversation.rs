//! Conversation state and the simulated reply cycle.
//!
//! Every accepted submission schedules exactly one delayed reply on the tokio
//! runtime. While that reply is outstanding further submissions are dropped,
//! so reply cycles never overlap. [`ConversationStore::submit`] must be called
//! from within a tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::events::{ChatEvent, EventBus};
use crate::responses::{RandomSource, ResponsePool, ThreadRandom};
use crate::settings::SettingsStore;
use crate::types::{Message, Sender};

/// What a reset does to a reply that is still waiting on its delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaleReplyPolicy {
    /// Abort the scheduled completion; nothing lands after the reset.
    #[default]
    Discard,
    /// Let the scheduled reply land in the fresh conversation.
    Deliver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { delay: Duration },
    /// Nothing left after trimming.
    Blank,
    /// A reply is pending; the submission was dropped, not queued.
    Busy,
}

#[derive(Default)]
struct ConversationState {
    messages: Vec<Message>,
    /// Cycle id of the outstanding reply.
    pending: Option<u64>,
    next_cycle: u64,
    reply: Option<JoinHandle<()>>,
}

struct Inner {
    state: Mutex<ConversationState>,
    random: Mutex<Box<dyn RandomSource>>,
    pool: ResponsePool,
    settings: Arc<SettingsStore>,
    events: EventBus,
    stale_replies: StaleReplyPolicy,
}

#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<Inner>,
}

pub struct ConversationBuilder {
    settings: Arc<SettingsStore>,
    events: EventBus,
    random: Box<dyn RandomSource>,
    pool: ResponsePool,
    stale_replies: StaleReplyPolicy,
}

impl ConversationBuilder {
    pub fn random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn pool(mut self, pool: ResponsePool) -> Self {
        self.pool = pool;
        self
    }

    pub fn stale_replies(mut self, policy: StaleReplyPolicy) -> Self {
        self.stale_replies = policy;
        self
    }

    pub fn build(self) -> ConversationStore {
        ConversationStore {
            inner: Arc::new(Inner {
                state: Mutex::new(ConversationState::default()),
                random: Mutex::new(self.random),
                pool: self.pool,
                settings: self.settings,
                events: self.events,
                stale_replies: self.stale_replies,
            }),
        }
    }
}

impl ConversationStore {
    pub fn new(settings: Arc<SettingsStore>, events: EventBus) -> Self {
        Self::builder(settings, events).build()
    }

    pub fn builder(settings: Arc<SettingsStore>, events: EventBus) -> ConversationBuilder {
        ConversationBuilder {
            settings,
            events,
            random: Box::new(ThreadRandom::default()),
            pool: ResponsePool::default(),
            stale_replies: StaleReplyPolicy::default(),
        }
    }

    pub fn submit(&self, text: &str) -> SubmitOutcome {
        let content = text.trim();
        if content.is_empty() {
            return SubmitOutcome::Blank;
        }

        let settings = self.inner.settings.snapshot();
        let mut state = self.lock_state();
        if state.pending.is_some() {
            tracing::debug!("reply pending, dropping submission");
            return SubmitOutcome::Busy;
        }

        let cycle = state.next_cycle;
        state.next_cycle += 1;
        state.pending = Some(cycle);
        self.append(&mut state, Message::user(content), settings.sound_enabled);

        let delay = {
            let mut random = self.lock_random();
            settings.response_speed.pick_delay(&mut **random)
        };
        if settings.typing_indicator {
            self.inner.events.emit(ChatEvent::TypingStarted);
        }

        let store = self.clone();
        state.reply = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            store.complete_reply(cycle);
        }));
        tracing::debug!(cycle, ?delay, speed = ?settings.response_speed, "reply scheduled");

        SubmitOutcome::Accepted { delay }
    }

    /// Clear the conversation. The outstanding reply, if any, is handled per
    /// [`StaleReplyPolicy`].
    pub fn reset(&self) {
        let (in_flight, task) = {
            let mut state = self.lock_state();
            state.messages.clear();
            (state.pending.take(), state.reply.take())
        };

        if self.inner.stale_replies == StaleReplyPolicy::Discard {
            if let Some(task) = task {
                task.abort();
            }
            if in_flight.is_some() {
                self.inner.events.emit(ChatEvent::TypingStopped);
            }
        }
        self.inner.events.emit(ChatEvent::ConversationCleared);
        tracing::info!(in_flight = in_flight.is_some(), "conversation reset");
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock_state().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.lock_state().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_state().messages.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.lock_state().pending.is_some()
    }

    pub fn pool(&self) -> &ResponsePool {
        &self.inner.pool
    }

    fn complete_reply(&self, cycle: u64) {
        let sound = self.inner.settings.snapshot().sound_enabled;
        let mut state = self.lock_state();
        let current = state.pending == Some(cycle);
        if !current && self.inner.stale_replies == StaleReplyPolicy::Discard {
            tracing::debug!(cycle, "discarding reply from a cleared conversation");
            return;
        }

        if current {
            self.inner.events.emit(ChatEvent::TypingStopped);
        }
        let content = {
            let mut random = self.lock_random();
            self.inner.pool.pick(&mut **random).to_string()
        };
        self.append(&mut state, Message::ai(content), sound);

        if current {
            state.pending = None;
            state.reply = None;
        }
    }

    fn append(&self, state: &mut ConversationState, message: Message, sound_enabled: bool) {
        let notify = message.sender == Sender::Ai && sound_enabled;
        state.messages.push(message.clone());
        self.inner.events.emit(ChatEvent::MessageAppended(message));
        if notify {
            self.inner.events.emit(ChatEvent::PlayNotification);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ConversationState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_random(&self) -> MutexGuard<'_, Box<dyn RandomSource>> {
        self.inner.random.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::ScriptedRandom;
    use crate::storage::MemoryStorage;

    fn store(random: ScriptedRandom) -> ConversationStore {
        let events = EventBus::new();
        let settings = Arc::new(SettingsStore::load(
            Arc::new(MemoryStorage::new()),
            events.clone(),
        ));
        ConversationStore::builder(settings, events)
            .random(random)
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_is_ignored() {
        let store = store(ScriptedRandom::new(vec![0.0]));
        assert_eq!(store.submit(""), SubmitOutcome::Blank);
        assert_eq!(store.submit(" \t\n "), SubmitOutcome::Blank);
        assert!(store.is_empty());
        assert!(!store.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_trims_and_marks_pending() {
        let store = store(ScriptedRandom::new(vec![0.0]));
        let outcome = store.submit("  hi  ");
        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                delay: Duration::from_millis(2000)
            }
        );

        let messages = store.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[0].sender, Sender::User);
        assert!(store.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_pool_is_used() {
        let events = EventBus::new();
        let settings = Arc::new(SettingsStore::load(
            Arc::new(MemoryStorage::new()),
            events.clone(),
        ));
        let store = ConversationStore::builder(settings, events)
            .random(ScriptedRandom::new(vec![0.3]))
            .pool(ResponsePool::new(["only answer"]).unwrap())
            .build();

        store.submit("question");
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(store.messages()[1].content, "only answer");
    }
}
