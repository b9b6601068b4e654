//! Team and role membership while players pick sides.
//!
//! The role lists in [`Teams`] are the source of truth; each player's own
//! `team`/`role` fields mirror them for the UI. Every operation returns the
//! field paths it changed so callers can turn it into a partial write.

use codeword_types::{PlayerId, Role, Room, RoomStatus, Team};

use crate::{ActionRejected, FieldPath};

/// Put `player_id` on `team` as an operative, leaving any previous seat.
/// Seated players cannot switch sides while a round is being played.
pub fn join_team(
    room: &mut Room,
    player_id: PlayerId,
    team: Team,
) -> Result<Vec<FieldPath>, ActionRejected> {
    if !room.has_player(player_id) {
        return Err(ActionRejected::NotInRoom);
    }

    let data = room.teams.get(team);
    if data.is_operative(player_id) && data.spymaster != Some(player_id) {
        return Ok(Vec::new());
    }
    if room.status == RoomStatus::Playing && room.seat_of(player_id).is_some() {
        return Err(ActionRejected::RoleLockedDuringPlay);
    }

    let mut touched = vacate(room, player_id);
    room.teams.get_mut(team).operatives.push(player_id);
    touched.push(FieldPath::Operatives(team));

    sync_player_seat(room, player_id, &mut touched);
    Ok(touched)
}

/// Switch role within the player's current team. A spymaster request is
/// refused while another player holds the slot. During a round the only
/// change allowed is filling a vacant spymaster slot.
pub fn select_role(
    room: &mut Room,
    player_id: PlayerId,
    role: Role,
) -> Result<Vec<FieldPath>, ActionRejected> {
    if !room.has_player(player_id) {
        return Err(ActionRejected::NotInRoom);
    }
    let seat = room.seat_of(player_id).ok_or(ActionRejected::NotOnTeam)?;
    let playing = room.status == RoomStatus::Playing;

    let team = seat.team;
    let mut touched = Vec::new();
    let data = room.teams.get_mut(team);

    match role {
        Role::Spymaster => {
            match data.spymaster {
                Some(holder) if holder == player_id => return Ok(Vec::new()),
                Some(_) => return Err(ActionRejected::SpymasterTaken { team }),
                None => {}
            }
            if data.is_operative(player_id) {
                data.operatives.retain(|&id| id != player_id);
                touched.push(FieldPath::Operatives(team));
            }
            data.spymaster = Some(player_id);
            touched.push(FieldPath::Spymaster(team));
        }
        Role::Operative => {
            if data.spymaster == Some(player_id) {
                if playing {
                    return Err(ActionRejected::RoleLockedDuringPlay);
                }
                data.spymaster = None;
                touched.push(FieldPath::Spymaster(team));
            }
            if !data.is_operative(player_id) {
                data.operatives.push(player_id);
                touched.push(FieldPath::Operatives(team));
            }
        }
    }

    if !touched.is_empty() {
        sync_player_seat(room, player_id, &mut touched);
    }
    Ok(touched)
}

/// Drop a player from the room entirely (leave or kick).
pub fn remove_player(
    room: &mut Room,
    player_id: PlayerId,
) -> Result<Vec<FieldPath>, ActionRejected> {
    if room.players.remove(&player_id).is_none() {
        return Err(ActionRejected::UnknownPlayer(player_id));
    }
    let mut touched = vacate(room, player_id);
    touched.push(FieldPath::Player(player_id));
    Ok(touched)
}

/// Both spymaster slots filled and at least one operative seated overall.
pub fn can_start(room: &Room) -> bool {
    let spymasters_ready = Team::ALL
        .iter()
        .all(|&team| room.teams.get(team).spymaster.is_some());
    let operatives: usize = Team::ALL
        .iter()
        .map(|&team| room.teams.get(team).operatives.len())
        .sum();

    spymasters_ready && operatives >= 1
}

/// Remove the player from every role list, returning the lists changed.
fn vacate(room: &mut Room, player_id: PlayerId) -> Vec<FieldPath> {
    let mut touched = Vec::new();
    for team in Team::ALL {
        let data = room.teams.get_mut(team);
        if data.spymaster == Some(player_id) {
            data.spymaster = None;
            touched.push(FieldPath::Spymaster(team));
        }
        if data.is_operative(player_id) {
            data.operatives.retain(|&id| id != player_id);
            touched.push(FieldPath::Operatives(team));
        }
    }
    touched
}

fn sync_player_seat(room: &mut Room, player_id: PlayerId, touched: &mut Vec<FieldPath>) {
    let seat = room.seat_of(player_id);
    if let Some(player) = room.players.get_mut(&player_id) {
        player.team = seat.map(|s| s.team);
        player.role = seat.map(|s| s.role);
        touched.push(FieldPath::Player(player_id));
    }
}
