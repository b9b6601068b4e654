use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GameError {
    RoomNotFound { code: String },
    InvalidRoomCode { code: String },
    NotInRoom,
    IdentificationRequired,
    InvalidDisplayName { name: String },
    Forbidden { action: String },
    WriteFailed { message: String },
    Contention,
    RateLimitExceeded,
}

impl GameError {
    /// Whether the client may retry the same action unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::WriteFailed { .. } | GameError::Contention)
    }
}
