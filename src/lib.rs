pub mod composer;
pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod responses;
pub mod session;
pub mod settings;
pub mod storage;
pub mod theme;
pub mod types;
pub mod ui;

pub use conversation::{ConversationStore, StaleReplyPolicy, SubmitOutcome};
pub use events::{ChatEvent, EventBus};
pub use session::Chatbot;
pub use settings::{SettingUpdate, Settings, SettingsStore};
pub use types::{Appearance, Message, ResponseSpeed, Sender, Theme};
