use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(
        "Unknown setting: '{0}'. Valid options: 'theme', 'responseSpeed', 'soundEnabled', 'typingIndicator'"
    )]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}, expected one of: {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Response pool must contain at least one entry")]
    Empty,
}
