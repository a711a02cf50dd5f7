//! Error kinds shared by the engine, the master and the file stores.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    /// An engine operation ran against a deck with no remaining entries.
    /// Callers are expected to check `has_entries()` first.
    #[error("no entries remain in the deck")]
    EmptyDeck,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cannot score {mistakes} mistakes against an empty deck")]
    DivideByZero { mistakes: i64 },

    #[error("no saved session with id {id} ({len} saved)")]
    NotFound { id: usize, len: usize },

    #[error("no active session")]
    NoActiveSession,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
