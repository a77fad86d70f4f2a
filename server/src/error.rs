//! Errors raised by the game core.

use thiserror::Error;

use crate::entities::CharacterId;
use crate::persistence::StoreError;
use crate::session::SessionId;

/// Errors surfaced by hunting, arena and equipment operations
#[derive(Debug, Error)]
pub enum GameError {
    #[error("character {0} not found")]
    CharacterNotFound(CharacterId),

    #[error("session {0} not found or not bound to a character")]
    SessionNotFound(SessionId),

    #[error("unknown map '{0}'")]
    UnknownMap(String),

    #[error("unknown item '{0}'")]
    UnknownItem(String),

    #[error("no eligible monster on {map} for level {level}")]
    NoEligibleTarget { map: String, level: u32 },

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl GameError {
    /// Whether the request referenced something that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CharacterNotFound(_) | Self::SessionNotFound(_) | Self::UnknownMap(_) | Self::UnknownItem(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
