use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameError, PlayerId, Role, RoomView, Team};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClientMessage {
    /// Identity comes from the sign-in layer in front of this server.
    Hello {
        player_id: Option<PlayerId>,
        display_name: String,
        avatar: Option<String>,
    },
    CreateRoom,
    JoinRoom { code: String },
    LeaveRoom,
    JoinTeam { team: Team },
    SelectRole { role: Role },
    SubmitClue {
        word: String,
        number: u8,
    },
    GuessCard { card_id: u8 },
    EndTurn,
    StartGame,
    KickPlayer { player_id: PlayerId },
    DeleteRoom,
    ForceReset,
    ForceEnd,
    Heartbeat,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServerMessage {
    Welcome { player_id: PlayerId },
    RoomJoined { code: String },
    RoomUpdate { room: RoomView },
    RoomLeft,
    RoomClosed { code: String },
    Kicked { code: String },
    Error {
        error: GameError,
        message: String,
        retryable: bool,
    },
}

impl ServerMessage {
    pub fn error(error: GameError, message: impl Into<String>) -> Self {
        let retryable = error.is_retryable();
        ServerMessage::Error {
            error,
            message: message.into(),
            retryable,
        }
    }
}
