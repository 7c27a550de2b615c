use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::conversation::{ConversationBuilder, ConversationStore, SubmitOutcome};
use crate::events::{ChatEvent, EventBus};
use crate::settings::{SettingUpdate, SettingsStore};
use crate::storage::{FileStorage, Storage};
use crate::types::{Appearance, Message};

/// Greeting shown on start and after every reset. Rendered only, never
/// stored in the conversation.
pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

/// One chat session: both stores plus the event bus they publish on.
/// Construct once and hand it to whatever drives the UI.
pub struct Chatbot {
    pub conversation: ConversationStore,
    pub settings: Arc<SettingsStore>,
    events: EventBus,
}

impl Chatbot {
    /// Session backed by file storage, configured from `config`.
    pub fn open(config: &AppConfig) -> Self {
        let storage = match &config.data_dir {
            Some(dir) => FileStorage::new(dir),
            None => FileStorage::in_data_dir(),
        };
        tracing::debug!(root = %storage.root().display(), "using file storage");
        Self::with_storage(Arc::new(storage), config)
    }

    pub fn with_storage(storage: Arc<dyn Storage>, config: &AppConfig) -> Self {
        Self::build(storage, config, |builder| builder)
    }

    /// Like [`Chatbot::with_storage`] but lets the caller adjust the
    /// conversation (random source, pool) before it is built.
    pub fn build(
        storage: Arc<dyn Storage>,
        config: &AppConfig,
        customize: impl FnOnce(ConversationBuilder) -> ConversationBuilder,
    ) -> Self {
        let events = EventBus::new();
        let settings = Arc::new(
            SettingsStore::load(storage, events.clone())
                .with_system_appearance(config.system_appearance),
        );
        let builder = ConversationStore::builder(settings.clone(), events.clone())
            .stale_replies(config.stale_replies);
        let conversation = customize(builder).build();

        Self {
            conversation,
            settings,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    pub fn submit(&self, text: &str) -> SubmitOutcome {
        self.conversation.submit(text)
    }

    pub fn reset(&self) {
        self.conversation.reset();
    }

    pub fn update(&self, change: SettingUpdate) {
        self.settings.update(change);
    }

    pub fn set_system_appearance(&self, appearance: Appearance) {
        self.settings.set_system_appearance(appearance);
    }

    pub fn messages(&self) -> Vec<Message> {
        self.conversation.messages()
    }

    pub fn appearance(&self) -> Appearance {
        self.settings.appearance()
    }
}
