use thiserror::Error;

use codeword_types::{Phase, PlayerId, RoomStatus, Team};

/// An action attempted outside the state it is valid in. These are never
/// written to the store; the boundary treats them as no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("player is not in this room")]
    NotInRoom,
    #[error("player {0} is not in this room")]
    UnknownPlayer(PlayerId),
    #[error("player has not joined a team")]
    NotOnTeam,
    #[error("{team} already has a spymaster")]
    SpymasterTaken { team: Team },
    #[error("roles cannot change while a round is being played")]
    RoleLockedDuringPlay,
    #[error("room is {0:?}, a round cannot start")]
    NotStartable(RoomStatus),
    #[error("both teams need a spymaster and at least one operative must be seated")]
    TeamsNotReady,
    #[error("no round is being played")]
    NotPlaying,
    #[error("the round is over")]
    GameOver,
    #[error("expected the {expected:?} phase")]
    WrongPhase { expected: Phase },
    #[error("it is not this player's team's turn")]
    NotYourTurn,
    #[error("only the current team's spymaster may give a clue")]
    NotSpymaster,
    #[error("spymasters cannot reveal cards")]
    SpymasterCannotGuess,
    #[error("clue word must not be empty")]
    EmptyClue,
    #[error("clue number {0} is outside 1..=9")]
    ClueNumberOutOfRange(u8),
    #[error("there is no card {0}")]
    UnknownCard(u8),
    #[error("card {0} is already revealed")]
    CardAlreadyRevealed(u8),
}
