//! Terminal front-end: turns [`ChatEvent`]s into lines and input lines into
//! commands.

use crate::composer::CharacterCount;
use crate::events::ChatEvent;
use crate::session::GREETING;
use crate::settings::Settings;
use crate::theme::theme_palette;
use crate::types::{Appearance, Message, Sender};

pub const HELP: &str = "\
Commands:
  /clear                 clear the conversation
  /set <key> <value>     theme light|dark|auto, responseSpeed fast|normal|slow,
                         soundEnabled on|off, typingIndicator on|off
  /settings              show current settings
  /system light|dark     simulate a system colour-scheme change
  /help                  show this help
  /quit                  exit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Clear,
    Set { key: String, value: String },
    Settings,
    System(Appearance),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Send(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("clear"), None, ..) => Command::Clear,
            (Some("settings"), None, ..) => Command::Settings,
            (Some("help"), None, ..) => Command::Help,
            (Some("quit" | "exit"), None, ..) => Command::Quit,
            (Some("set"), Some(key), Some(value), None) => Command::Set {
                key: key.to_string(),
                value: value.to_string(),
            },
            (Some("system"), Some("dark"), None, _) => Command::System(Appearance::Dark),
            (Some("system"), Some("light"), None, _) => Command::System(Appearance::Light),
            _ => Command::Unknown(trimmed.to_string()),
        }
    }
}

pub struct Renderer {
    appearance: Appearance,
}

impl Renderer {
    pub fn new(appearance: Appearance) -> Self {
        Self { appearance }
    }

    pub fn appearance(&self) -> Appearance {
        self.appearance
    }

    /// Line to print for `event`, if any. Theme changes restyle later output.
    pub fn render(&mut self, event: &ChatEvent) -> Option<String> {
        match event {
            ChatEvent::MessageAppended(message) => Some(self.message(message)),
            ChatEvent::TypingStarted => {
                let palette = theme_palette(self.appearance);
                Some(format!("{}🤖 typing...{}", palette.muted, palette.reset))
            }
            ChatEvent::TypingStopped => None,
            ChatEvent::ThemeChanged(appearance) => {
                self.appearance = *appearance;
                let palette = theme_palette(self.appearance);
                let name = match appearance {
                    Appearance::Light => "light",
                    Appearance::Dark => "dark",
                };
                Some(format!("{}[theme: {name}]{}", palette.muted, palette.reset))
            }
            ChatEvent::PlayNotification => Some("\x07".to_string()),
            ChatEvent::ConversationCleared => Some(self.greeting()),
        }
    }

    pub fn greeting(&self) -> String {
        let palette = theme_palette(self.appearance);
        format!("{}🤖 {GREETING}{}", palette.ai, palette.reset)
    }

    pub fn message(&self, message: &Message) -> String {
        let palette = theme_palette(self.appearance);
        let (avatar, color) = match message.sender {
            Sender::User => ("👤", palette.user),
            Sender::Ai => ("🤖", palette.ai),
        };
        format!(
            "{color}{avatar} {}{}  {}{}{}",
            message.content,
            palette.reset,
            palette.muted,
            message.formatted_time(),
            palette.reset
        )
    }

    /// Warning for long input; `None` while comfortably under the limit.
    pub fn input_warning(&self, input: &str) -> Option<String> {
        let count = CharacterCount::of(input);
        if !count.is_near_limit() {
            return None;
        }
        let palette = theme_palette(self.appearance);
        Some(format!(
            "{}{}{}",
            palette.warning,
            count.label(),
            palette.reset
        ))
    }
}

pub fn render_settings(settings: &Settings) -> String {
    let flag = |on: bool| if on { "on" } else { "off" };
    format!(
        "theme: {}\nresponseSpeed: {}\nsoundEnabled: {}\ntypingIndicator: {}",
        settings.theme.as_str(),
        settings.response_speed.as_str(),
        flag(settings.sound_enabled),
        flag(settings.typing_indicator)
    )
}
