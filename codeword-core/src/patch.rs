use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use codeword_types::{
    Card, Clue, GameLogEntry, GameState, Phase, Player, PlayerId, Room, RoomStatus, Scores, Team,
    WinReason,
};

/// One addressable field of a stored room document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPath {
    Status,
    Spymaster(Team),
    Operatives(Team),
    Player(PlayerId),
    Game,
    Board,
    CurrentTurn,
    Phase,
    CurrentClue,
    Scores,
    Winner,
    WinReason,
    Log,
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Status => write!(f, "status"),
            FieldPath::Spymaster(team) => write!(f, "teams.{}.spymaster", team),
            FieldPath::Operatives(team) => write!(f, "teams.{}.operatives", team),
            FieldPath::Player(id) => write!(f, "players.{}", id),
            FieldPath::Game => write!(f, "game"),
            FieldPath::Board => write!(f, "game.board"),
            FieldPath::CurrentTurn => write!(f, "game.currentTurn"),
            FieldPath::Phase => write!(f, "game.phase"),
            FieldPath::CurrentClue => write!(f, "game.currentClue"),
            FieldPath::Scores => write!(f, "game.scores"),
            FieldPath::Winner => write!(f, "game.winner"),
            FieldPath::WinReason => write!(f, "game.winReason"),
            FieldPath::Log => write!(f, "game.log"),
        }
    }
}

/// A value written to exactly one field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldWrite {
    Status(RoomStatus),
    Spymaster {
        team: Team,
        player: Option<PlayerId>,
    },
    Operatives {
        team: Team,
        players: Vec<PlayerId>,
    },
    /// `None` removes the player from the room.
    Player {
        id: PlayerId,
        player: Option<Player>,
    },
    Game(Option<GameState>),
    Board(Vec<Card>),
    CurrentTurn(Team),
    Phase(Phase),
    CurrentClue(Option<Clue>),
    Scores(Scores),
    Winner(Option<Team>),
    WinReason(Option<WinReason>),
    Log(Vec<GameLogEntry>),
}

impl FieldWrite {
    pub fn path(&self) -> FieldPath {
        match self {
            FieldWrite::Status(_) => FieldPath::Status,
            FieldWrite::Spymaster { team, .. } => FieldPath::Spymaster(*team),
            FieldWrite::Operatives { team, .. } => FieldPath::Operatives(*team),
            FieldWrite::Player { id, .. } => FieldPath::Player(*id),
            FieldWrite::Game(_) => FieldPath::Game,
            FieldWrite::Board(_) => FieldPath::Board,
            FieldWrite::CurrentTurn(_) => FieldPath::CurrentTurn,
            FieldWrite::Phase(_) => FieldPath::Phase,
            FieldWrite::CurrentClue(_) => FieldPath::CurrentClue,
            FieldWrite::Scores(_) => FieldPath::Scores,
            FieldWrite::Winner(_) => FieldPath::Winner,
            FieldWrite::WinReason(_) => FieldPath::WinReason,
            FieldWrite::Log(_) => FieldPath::Log,
        }
    }

    /// Read the current value at `path` out of `room`.
    pub fn capture(room: &Room, path: FieldPath) -> Option<Self> {
        let write = match path {
            FieldPath::Status => FieldWrite::Status(room.status),
            FieldPath::Spymaster(team) => FieldWrite::Spymaster {
                team,
                player: room.teams.get(team).spymaster,
            },
            FieldPath::Operatives(team) => FieldWrite::Operatives {
                team,
                players: room.teams.get(team).operatives.clone(),
            },
            FieldPath::Player(id) => FieldWrite::Player {
                id,
                player: room.players.get(&id).cloned(),
            },
            FieldPath::Game => FieldWrite::Game(room.game.clone()),
            FieldPath::Board => FieldWrite::Board(room.game.as_ref()?.board.clone()),
            FieldPath::CurrentTurn => FieldWrite::CurrentTurn(room.game.as_ref()?.current_turn),
            FieldPath::Phase => FieldWrite::Phase(room.game.as_ref()?.phase),
            FieldPath::CurrentClue => {
                FieldWrite::CurrentClue(room.game.as_ref()?.current_clue.clone())
            }
            FieldPath::Scores => FieldWrite::Scores(room.game.as_ref()?.scores),
            FieldPath::Winner => FieldWrite::Winner(room.game.as_ref()?.winner),
            FieldPath::WinReason => FieldWrite::WinReason(room.game.as_ref()?.win_reason),
            FieldPath::Log => FieldWrite::Log(room.game.as_ref()?.log.clone()),
        };
        Some(write)
    }

    fn apply_to(self, room: &mut Room) -> Result<(), PatchError> {
        let path = self.path();
        match self {
            FieldWrite::Status(status) => room.status = status,
            FieldWrite::Spymaster { team, player } => room.teams.get_mut(team).spymaster = player,
            FieldWrite::Operatives { team, players } => {
                room.teams.get_mut(team).operatives = players
            }
            FieldWrite::Player { id, player } => match player {
                Some(player) => {
                    room.players.insert(id, player);
                }
                None => {
                    room.players.remove(&id);
                }
            },
            FieldWrite::Game(game) => room.game = game,
            FieldWrite::Board(board) => game_mut(room, path)?.board = board,
            FieldWrite::CurrentTurn(team) => game_mut(room, path)?.current_turn = team,
            FieldWrite::Phase(phase) => game_mut(room, path)?.phase = phase,
            FieldWrite::CurrentClue(clue) => game_mut(room, path)?.current_clue = clue,
            FieldWrite::Scores(scores) => game_mut(room, path)?.scores = scores,
            FieldWrite::Winner(winner) => game_mut(room, path)?.winner = winner,
            FieldWrite::WinReason(reason) => game_mut(room, path)?.win_reason = reason,
            FieldWrite::Log(log) => game_mut(room, path)?.log = log,
        }
        Ok(())
    }
}

fn game_mut(room: &mut Room, path: FieldPath) -> Result<&mut GameState, PatchError> {
    room.game.as_mut().ok_or(PatchError::MissingGame(path))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("cannot write {0}: the room has no game")]
    MissingGame(FieldPath),
}

/// A partial-field mutation of one room. Sibling fields not named here are
/// left untouched when the patch is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPatch {
    writes: Vec<FieldWrite>,
}

impl RoomPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch carrying the values `room` holds at each of `paths`.
    /// Duplicate paths collapse into one write.
    pub fn capture(room: &Room, paths: &[FieldPath]) -> Self {
        let mut patch = Self::new();
        for &path in paths {
            if patch.touches(path) {
                continue;
            }
            if let Some(write) = FieldWrite::capture(room, path) {
                patch.writes.push(write);
            }
        }
        patch
    }

    pub fn push(&mut self, write: FieldWrite) {
        self.writes.retain(|existing| existing.path() != write.path());
        self.writes.push(write);
    }

    pub fn touches(&self, path: FieldPath) -> bool {
        self.writes.iter().any(|w| w.path() == path)
    }

    pub fn paths(&self) -> Vec<FieldPath> {
        self.writes.iter().map(FieldWrite::path).collect()
    }

    pub fn writes(&self) -> &[FieldWrite] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Apply every write in order. On error `room` may be partially
    /// updated, so callers apply to a scratch copy.
    pub fn apply_to(&self, room: &mut Room) -> Result<(), PatchError> {
        for write in &self.writes {
            write.clone().apply_to(room)?;
        }
        Ok(())
    }
}
