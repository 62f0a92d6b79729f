//! Error types for the game server

use shared::NicknameRejection;
use std::io;
use thiserror::Error;

/// Failures while loading the keyword database
#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("failed to read keyword database: {0}")]
    Io(#[from] io::Error),

    #[error("keyword database is missing its entry count")]
    MissingCount,

    #[error("invalid entry count {0:?}")]
    InvalidCount(String),

    #[error("keyword database declares no entries")]
    Empty,

    #[error("keyword database declares {expected} entries but holds only {found}")]
    Truncated { expected: usize, found: usize },

    #[error("entry {index} has an invalid keyword {keyword:?}")]
    InvalidKeyword { index: usize, keyword: String },
}

/// Invalid game settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("player count must be between 1 and {max}, got {actual}")]
    PlayerCount { actual: usize, max: usize },

    #[error("guess budget must be at least 1")]
    ZeroGuesses,

    #[error("{0} timeout must be longer than zero")]
    ZeroTimeout(&'static str),
}

/// Reasons the registry refuses a nickname or a player
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("nickname is already taken")]
    NicknameTaken,

    #[error("nickname is longer than {max} characters")]
    NicknameTooLong { max: usize },

    #[error("nickname is empty")]
    EmptyNickname,

    #[error("the roster is already full")]
    RosterFull,
}

impl RegistrationError {
    /// Maps the error onto the reason reported to the client.
    pub fn rejection(&self) -> NicknameRejection {
        match self {
            RegistrationError::NicknameTaken | RegistrationError::RosterFull => {
                NicknameRejection::Taken
            }
            RegistrationError::NicknameTooLong { .. } => NicknameRejection::TooLong,
            RegistrationError::EmptyNickname => NicknameRejection::Empty,
        }
    }
}

/// Top-level server failures
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("network error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Keywords(#[from] KeywordError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("registration ended before the roster was complete")]
    RegistrarClosed,

    #[error("game session task failed: {0}")]
    Session(#[from] tokio::task::JoinError),
}
