use std::env;
use std::path::PathBuf;

use crate::conversation::StaleReplyPolicy;
use crate::theme::appearance_from_colorfgbg;
use crate::types::Appearance;

const DEFAULT_LOG_FILTER: &str = "warn";

/// Bundled defaults, used when no .env file is present
pub const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

/// Load `.env`, falling back to [`BUNDLED_CONFIG`]. Variables already present
/// in the environment are never overridden.
pub fn load_env_files() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    // Runs before the tracing subscriber exists.
    if let Err(err) = dotenvy::from_read(BUNDLED_CONFIG.as_bytes()) {
        eprintln!("failed to load bundled config: {err}");
    }
}

/// Runtime configuration read from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
    pub stale_replies: StaleReplyPolicy,
    pub system_appearance: Appearance,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            stale_replies: StaleReplyPolicy::default(),
            system_appearance: Appearance::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_dir = lookup("MOCKINGBIRD_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let stale_replies = match lookup("MOCKINGBIRD_STALE_REPLIES")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "deliver" => StaleReplyPolicy::Deliver,
            "" | "discard" => StaleReplyPolicy::Discard,
            other => {
                tracing::warn!(value = other, "unknown MOCKINGBIRD_STALE_REPLIES, using discard");
                StaleReplyPolicy::Discard
            }
        };

        let system_appearance = lookup("MOCKINGBIRD_PREFERS_DARK")
            .map(|value| {
                if is_truthy(&value) {
                    Appearance::Dark
                } else {
                    Appearance::Light
                }
            })
            .or_else(|| lookup("COLORFGBG").and_then(|value| appearance_from_colorfgbg(&value)))
            .unwrap_or(defaults.system_appearance);

        let log_filter = lookup("MOCKINGBIRD_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or(defaults.log_filter);

        Self {
            data_dir,
            stale_replies,
            system_appearance,
            log_filter,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
