use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

use crate::responses::RandomSource;

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub content: String,
    pub sender: Sender,
    pub timestamp: OffsetDateTime,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::now(content, Sender::User)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::now(content, Sender::Ai)
    }

    fn now(content: impl Into<String>, sender: Sender) -> Self {
        Self {
            content: content.into(),
            sender,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Bubble label in local time, e.g. `09:41 AM`. Falls back to UTC when
    /// the local offset cannot be determined.
    pub fn formatted_time(&self) -> String {
        let mut datetime = self.timestamp;
        if let Ok(offset) = UtcOffset::current_local_offset() {
            datetime = datetime.to_offset(offset);
        }
        datetime.format(MESSAGE_TIME_FORMAT).unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }
}

/// Effective light/dark look once `Theme::Auto` has been resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSpeed {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl ResponseSpeed {
    /// Lower bound of the delay bucket; every bucket is one second wide.
    pub fn base_delay(self) -> Duration {
        match self {
            ResponseSpeed::Fast => Duration::from_millis(1000),
            ResponseSpeed::Normal => Duration::from_millis(2000),
            ResponseSpeed::Slow => Duration::from_millis(3000),
        }
    }

    pub fn delay_bounds(self) -> (Duration, Duration) {
        let base = self.base_delay();
        (base, base + Duration::from_secs(1))
    }

    /// Uniform draw from `[base, base + 1s)` at millisecond resolution.
    pub fn pick_delay(self, random: &mut dyn RandomSource) -> Duration {
        let jitter_ms = ((random.next_unit() * 1000.0) as u64).min(999);
        self.base_delay() + Duration::from_millis(jitter_ms)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseSpeed::Fast => "fast",
            ResponseSpeed::Normal => "normal",
            ResponseSpeed::Slow => "slow",
        }
    }
}
