use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{
    CardType, Clue, GameLogEntry, Phase, Player, PlayerId, RoomStatus, Scores, Seat, Team, Teams,
    WinReason,
};

/// A card as one particular viewer is allowed to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CardView {
    pub id: u8,
    pub word: String,
    pub card_type: Option<CardType>,
    pub revealed: bool,
    pub revealed_by: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameView {
    pub board: Vec<CardView>,
    pub current_turn: Team,
    pub starting_team: Team,
    pub phase: Phase,
    pub current_clue: Option<Clue>,
    pub scores: Scores,
    pub winner: Option<Team>,
    pub win_reason: Option<WinReason>,
    pub log: Vec<GameLogEntry>,
}

/// Room state as pushed to a single subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomView {
    pub code: String,
    pub version: u64,
    pub status: RoomStatus,
    pub created_by: PlayerId,
    pub teams: Teams,
    pub players: Vec<Player>,
    pub game: Option<GameView>,
    pub viewer_seat: Option<Seat>,
    pub can_start: bool,
}
