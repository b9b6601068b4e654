use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::PlayerId;

/// Number of cards on every board.
pub const BOARD_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Red, Team::Blue];

    pub fn other(self) -> Self {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Red => write!(f, "red"),
            Team::Blue => write!(f, "blue"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Role {
    Spymaster,
    Operative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CardType {
    Red,
    Blue,
    Neutral,
    Assassin,
}

impl CardType {
    pub fn of_team(team: Team) -> Self {
        match team {
            Team::Red => CardType::Red,
            Team::Blue => CardType::Blue,
        }
    }

    /// The team a card counts towards, if any.
    pub fn team(self) -> Option<Team> {
        match self {
            CardType::Red => Some(Team::Red),
            CardType::Blue => Some(Team::Blue),
            CardType::Neutral | CardType::Assassin => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Card {
    pub id: u8,
    pub word: String,
    pub card_type: CardType,
    pub revealed: bool,
    pub revealed_by: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Clue {
    pub word: String,
    pub number: u8,
    pub guesses_remaining: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TeamScore {
    pub found: u8,
    pub total: u8,
}

impl TeamScore {
    pub fn new(total: u8) -> Self {
        Self { found: 0, total }
    }

    pub fn is_complete(&self) -> bool {
        self.found >= self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Scores {
    pub red: TeamScore,
    pub blue: TeamScore,
}

impl Scores {
    pub fn get(&self, team: Team) -> &TeamScore {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    pub fn get_mut(&mut self, team: Team) -> &mut TeamScore {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Phase {
    Clue,
    Guess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum WinReason {
    AllFound,
    Assassin,
}

/// Payload of a log entry, one variant per kind of turn action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind")]
#[ts(export)]
pub enum LogEvent {
    Clue { word: String, number: u8 },
    Guess {
        card_id: u8,
        word: String,
        revealed: CardType,
    },
    Pass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameLogEntry {
    pub team: Team,
    pub player_id: PlayerId,
    pub timestamp: String, // ISO 8601 string
    pub event: LogEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameState {
    pub board: Vec<Card>,
    pub current_turn: Team,
    pub starting_team: Team,
    pub phase: Phase,
    pub current_clue: Option<Clue>,
    pub scores: Scores,
    pub winner: Option<Team>,
    pub win_reason: Option<WinReason>,
    pub log: Vec<GameLogEntry>,
    pub started_at: String, // ISO 8601 string
}

impl GameState {
    /// A round is frozen once a winner has been declared.
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn card(&self, card_id: u8) -> Option<&Card> {
        self.board.get(card_id as usize)
    }
}
