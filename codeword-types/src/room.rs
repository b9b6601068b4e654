use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::{GameState, PlayerId, Role, Team};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub avatar: Option<String>,
    pub team: Option<Team>,
    pub role: Option<Role>,
    pub online: bool,
    pub last_seen: String, // ISO 8601 string
}

impl Player {
    pub fn new(id: PlayerId, display_name: String, avatar: Option<String>, now: String) -> Self {
        Self {
            id,
            display_name,
            avatar,
            team: None,
            role: None,
            online: true,
            last_seen: now,
        }
    }
}

/// Role membership for one team.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TeamData {
    pub spymaster: Option<PlayerId>,
    pub operatives: Vec<PlayerId>,
}

impl TeamData {
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.spymaster == Some(player_id) || self.operatives.contains(&player_id)
    }

    pub fn is_operative(&self, player_id: PlayerId) -> bool {
        self.operatives.contains(&player_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Teams {
    pub red: TeamData,
    pub blue: TeamData,
}

impl Teams {
    pub fn get(&self, team: Team) -> &TeamData {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    pub fn get_mut(&mut self, team: Team) -> &mut TeamData {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }

    /// Where a player currently sits, derived from the role lists.
    pub fn seat_of(&self, player_id: PlayerId) -> Option<Seat> {
        Team::ALL.into_iter().find_map(|team| {
            let data = self.get(team);
            if data.spymaster == Some(player_id) {
                Some(Seat {
                    team,
                    role: Role::Spymaster,
                })
            } else if data.is_operative(player_id) {
                Some(Seat {
                    team,
                    role: Role::Operative,
                })
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Seat {
    pub team: Team,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum RoomStatus {
    Waiting,  // Players picking teams
    Playing,  // Round in progress
    Finished, // Winner declared or ended by an administrator
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Room {
    pub code: String,
    pub created_at: String, // ISO 8601 string
    pub created_by: PlayerId,
    pub status: RoomStatus,
    pub teams: Teams,
    pub players: BTreeMap<PlayerId, Player>,
    pub game: Option<GameState>,
}

impl Room {
    pub fn new(code: String, host: Player) -> Self {
        let mut players = BTreeMap::new();
        let created_by = host.id;
        let created_at = host.last_seen.clone();
        players.insert(host.id, host);

        Self {
            code,
            created_at,
            created_by,
            status: RoomStatus::Waiting,
            teams: Teams::default(),
            players,
            game: None,
        }
    }

    pub fn seat_of(&self, player_id: PlayerId) -> Option<Seat> {
        self.teams.seat_of(player_id)
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.players.contains_key(&player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn player(name: &str) -> Player {
        Player::new(
            Uuid::new_v4(),
            name.to_string(),
            None,
            "2026-01-01T00:00:00Z".to_string(),
        )
    }

    #[test]
    fn test_new_room_registers_host() {
        let host = player("Alice");
        let host_id = host.id;
        let room = Room::new("ABCDE".to_string(), host);

        assert_eq!(room.created_by, host_id);
        assert_eq!(room.status, RoomStatus::Waiting);
        assert!(room.has_player(host_id));
        assert!(room.game.is_none());
        assert_eq!(room.seat_of(host_id), None);
    }

    #[test]
    fn test_seat_of() {
        let mut teams = Teams::default();
        let spy = Uuid::new_v4();
        let op = Uuid::new_v4();
        teams.blue.spymaster = Some(spy);
        teams.red.operatives.push(op);

        assert_eq!(
            teams.seat_of(spy),
            Some(Seat {
                team: Team::Blue,
                role: Role::Spymaster
            })
        );
        assert_eq!(
            teams.seat_of(op),
            Some(Seat {
                team: Team::Red,
                role: Role::Operative
            })
        );
        assert_eq!(teams.seat_of(Uuid::new_v4()), None);
    }
}
