#![allow(dead_code)]

use codeword_core::{RoomAction, RoomPatch, TurnEngine, Vocabulary, plan};
use codeword_types::{CardType, Player, PlayerId, Role, Room, RoomStatus, Team};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// A room with one spymaster and one operative per team, still waiting.
pub struct TestRoom {
    pub room: Room,
    pub red_spy: PlayerId,
    pub red_op: PlayerId,
    pub blue_spy: PlayerId,
    pub blue_op: PlayerId,
}

impl TestRoom {
    pub fn seated() -> Self {
        let red_spy = Uuid::new_v4();
        let host = Player::new(
            red_spy,
            "Rita".to_string(),
            None,
            chrono::Utc::now().to_rfc3339(),
        );
        let mut room = Room::new("TESTS".to_string(), host);
        let red_op = Uuid::new_v4();
        let blue_spy = Uuid::new_v4();
        let blue_op = Uuid::new_v4();

        for (id, name) in [(red_op, "Ravi"), (blue_spy, "Bea"), (blue_op, "Bo")] {
            apply(&mut room, id, join(name));
        }
        for (id, team) in [
            (red_spy, Team::Red),
            (red_op, Team::Red),
            (blue_spy, Team::Blue),
            (blue_op, Team::Blue),
        ] {
            apply(&mut room, id, RoomAction::JoinTeam { team });
        }
        for id in [red_spy, blue_spy] {
            let claim = RoomAction::SelectRole {
                role: Role::Spymaster,
            };
            apply(&mut room, id, claim);
        }

        Self {
            room,
            red_spy,
            red_op,
            blue_spy,
            blue_op,
        }
    }

    /// Seated room with a round in progress and a known starting team.
    pub fn playing(starting: Team) -> Self {
        let mut table = Self::seated();
        let game = TurnEngine::new_round_with_starting_team(
            &Vocabulary::builtin(),
            starting,
            &mut seeded_rng(2024),
        );
        table.room.game = Some(game);
        table.room.status = RoomStatus::Playing;
        table
    }

    pub fn spymaster(&self, team: Team) -> PlayerId {
        match team {
            Team::Red => self.red_spy,
            Team::Blue => self.blue_spy,
        }
    }

    pub fn operative(&self, team: Team) -> PlayerId {
        match team {
            Team::Red => self.red_op,
            Team::Blue => self.blue_op,
        }
    }

    pub fn apply(&mut self, actor: PlayerId, action: RoomAction) -> RoomPatch {
        apply(&mut self.room, actor, action)
    }
}

pub fn join(name: &str) -> RoomAction {
    RoomAction::JoinRoom {
        display_name: name.to_string(),
        avatar: None,
    }
}

/// Plan an action that must be accepted and apply it in place.
pub fn apply(room: &mut Room, actor: PlayerId, action: RoomAction) -> RoomPatch {
    let patch = plan(room, actor, &action, &Vocabulary::builtin(), &mut seeded_rng(1))
        .unwrap_or_else(|e| panic!("{:?} was rejected: {}", action, e));
    patch.apply_to(room).unwrap();
    patch
}

/// First unrevealed card of the given type.
pub fn card_of(room: &Room, card_type: CardType) -> u8 {
    room.game
        .as_ref()
        .unwrap()
        .board
        .iter()
        .find(|c| c.card_type == card_type && !c.revealed)
        .map(|c| c.id)
        .unwrap()
}
