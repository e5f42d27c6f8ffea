use thiserror::Error;

use crate::arcade::Variant;

/// Errors surfaced by the lofitab library.
#[derive(Debug, Error)]
pub enum Error {
    /// The embedded key-value store failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("embedded data file {0} is missing or unreadable")]
    Content(String),

    /// User input was rejected before any state changed.
    #[error("{0}")]
    InvalidInput(String),

    /// A session operation was requested from the wrong state.
    #[error("{variant} session is {state}")]
    InvalidTransition {
        variant: Variant,
        state: &'static str,
    },

    /// A key listener is still registered by another owner.
    #[error("a key listener is already registered")]
    ListenerBusy,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
