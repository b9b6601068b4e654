use rand::Rng;
use serde::{Deserialize, Serialize};

use codeword_types::{GameState, Player, PlayerId, Role, Room, RoomStatus, Team, Teams};

use crate::{
    ActionRejected, FieldPath, GuessOutcome, RoomPatch, TurnEngine, Vocabulary, team_formation,
};

/// Everything a participant (or an administrator, after the boundary has
/// checked the capability) can do to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomAction {
    JoinRoom {
        display_name: String,
        avatar: Option<String>,
    },
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
    UpdatePresence { online: bool },
    ForceReset,
    ForceEnd,
}

impl RoomAction {
    pub fn name(&self) -> &'static str {
        match self {
            RoomAction::JoinRoom { .. } => "join_room",
            RoomAction::LeaveRoom => "leave_room",
            RoomAction::JoinTeam { .. } => "join_team",
            RoomAction::SelectRole { .. } => "select_role",
            RoomAction::SubmitClue { .. } => "submit_clue",
            RoomAction::GuessCard { .. } => "guess_card",
            RoomAction::EndTurn => "end_turn",
            RoomAction::StartGame => "start_game",
            RoomAction::KickPlayer { .. } => "kick_player",
            RoomAction::UpdatePresence { .. } => "update_presence",
            RoomAction::ForceReset => "force_reset",
            RoomAction::ForceEnd => "force_end",
        }
    }
}

/// Compute the partial-field mutation `action` makes to the snapshot
/// `room`. The snapshot itself is never modified.
pub fn plan<R: Rng + ?Sized>(
    room: &Room,
    actor: PlayerId,
    action: &RoomAction,
    vocabulary: &Vocabulary,
    rng: &mut R,
) -> Result<RoomPatch, ActionRejected> {
    let mut next = room.clone();
    let touched = match action {
        RoomAction::JoinRoom {
            display_name,
            avatar,
        } => join_room(&mut next, actor, display_name, avatar.clone()),
        RoomAction::LeaveRoom => team_formation::remove_player(&mut next, actor)?,
        RoomAction::JoinTeam { team } => team_formation::join_team(&mut next, actor, *team)?,
        RoomAction::SelectRole { role } => team_formation::select_role(&mut next, actor, *role)?,
        RoomAction::SubmitClue { word, number } => {
            let (game, teams) = playing_game(&mut next, actor)?;
            TurnEngine::submit_clue(game, teams, actor, word, *number)?;
            vec![FieldPath::CurrentClue, FieldPath::Phase, FieldPath::Log]
        }
        RoomAction::GuessCard { card_id } => {
            let (game, teams) = playing_game(&mut next, actor)?;
            let resolution = TurnEngine::guess_card(game, teams, actor, *card_id)?;
            let mut touched = vec![FieldPath::Board, FieldPath::Scores, FieldPath::Log];
            match resolution.outcome {
                GuessOutcome::Continue { .. } => touched.push(FieldPath::CurrentClue),
                GuessOutcome::TurnPassed { .. } => touched.extend([
                    FieldPath::CurrentTurn,
                    FieldPath::Phase,
                    FieldPath::CurrentClue,
                ]),
                GuessOutcome::Won { .. } => {
                    next.status = RoomStatus::Finished;
                    touched.extend([FieldPath::Winner, FieldPath::WinReason, FieldPath::Status]);
                }
            }
            touched
        }
        RoomAction::EndTurn => {
            let (game, teams) = playing_game(&mut next, actor)?;
            TurnEngine::end_turn(game, teams, actor)?;
            vec![
                FieldPath::CurrentTurn,
                FieldPath::Phase,
                FieldPath::CurrentClue,
                FieldPath::Log,
            ]
        }
        RoomAction::StartGame => {
            ensure_member(&next, actor)?;
            if next.status == RoomStatus::Playing {
                return Err(ActionRejected::NotStartable(next.status));
            }
            if !team_formation::can_start(&next) {
                return Err(ActionRejected::TeamsNotReady);
            }
            next.game = Some(TurnEngine::new_round(vocabulary, rng));
            next.status = RoomStatus::Playing;
            vec![FieldPath::Game, FieldPath::Status]
        }
        RoomAction::KickPlayer { player_id } => {
            team_formation::remove_player(&mut next, *player_id)?
        }
        RoomAction::UpdatePresence { online } => {
            let player = next
                .players
                .get_mut(&actor)
                .ok_or(ActionRejected::NotInRoom)?;
            player.online = *online;
            player.last_seen = chrono::Utc::now().to_rfc3339();
            vec![FieldPath::Player(actor)]
        }
        RoomAction::ForceReset => {
            next.status = RoomStatus::Waiting;
            next.game = None;
            vec![FieldPath::Status, FieldPath::Game]
        }
        RoomAction::ForceEnd => {
            next.status = RoomStatus::Finished;
            vec![FieldPath::Status]
        }
    };

    Ok(RoomPatch::capture(&next, &touched))
}

fn join_room(
    room: &mut Room,
    actor: PlayerId,
    display_name: &str,
    avatar: Option<String>,
) -> Vec<FieldPath> {
    let now = chrono::Utc::now().to_rfc3339();
    match room.players.get_mut(&actor) {
        Some(player) => {
            player.display_name = display_name.to_string();
            player.avatar = avatar;
            player.online = true;
            player.last_seen = now;
        }
        None => {
            let player = Player::new(actor, display_name.to_string(), avatar, now);
            room.players.insert(actor, player);
        }
    }
    vec![FieldPath::Player(actor)]
}

fn ensure_member(room: &Room, actor: PlayerId) -> Result<(), ActionRejected> {
    if room.has_player(actor) {
        Ok(())
    } else {
        Err(ActionRejected::NotInRoom)
    }
}

fn playing_game(
    room: &mut Room,
    actor: PlayerId,
) -> Result<(&mut GameState, &Teams), ActionRejected> {
    ensure_member(room, actor)?;
    if room.status != RoomStatus::Playing {
        return Err(ActionRejected::NotPlaying);
    }
    let game = room.game.as_mut().ok_or(ActionRejected::NotPlaying)?;
    Ok((game, &room.teams))
}

