mod common;

use codeword_core::{ActionRejected, FieldPath, RoomAction, Vocabulary, plan, room_view};
use codeword_types::{CardType, LogEvent, Phase, Role, RoomStatus, Team, TeamScore, WinReason};
use common::*;
use uuid::Uuid;

#[test]
fn test_clue_then_correct_then_wrong_guess() {
    let mut t = TestRoom::playing(Team::Red);
    {
        let game = t.room.game.as_ref().unwrap();
        assert_eq!(game.scores.red, TeamScore { found: 0, total: 9 });
        assert_eq!(game.scores.blue, TeamScore { found: 0, total: 8 });
    }

    t.apply(
        t.red_spy,
        RoomAction::SubmitClue {
            word: "ANIMAL".to_string(),
            number: 2,
        },
    );
    assert_eq!(
        t.room.game.as_ref().unwrap().current_clue.as_ref().unwrap().guesses_remaining,
        3
    );

    let red_card = card_of(&t.room, CardType::Red);
    t.apply(t.red_op, RoomAction::GuessCard { card_id: red_card });
    {
        let game = t.room.game.as_ref().unwrap();
        assert_eq!(game.scores.red.found, 1);
        assert_eq!(game.phase, Phase::Guess);
        assert_eq!(game.current_clue.as_ref().unwrap().guesses_remaining, 2);
    }

    let blue_card = card_of(&t.room, CardType::Blue);
    t.apply(t.red_op, RoomAction::GuessCard { card_id: blue_card });
    let game = t.room.game.as_ref().unwrap();
    assert_eq!(game.current_turn, Team::Blue);
    assert_eq!(game.phase, Phase::Clue);
    assert!(game.current_clue.is_none());
    assert_eq!(game.scores.red, TeamScore { found: 1, total: 9 });
    assert_eq!(game.log.len(), 3);
    assert_eq!(t.room.status, RoomStatus::Playing);
}

#[test]
fn test_join_room_creates_unseated_player() {
    let mut t = TestRoom::seated();
    let newcomer = Uuid::new_v4();
    let patch = t.apply(newcomer, join("Nia"));

    assert_eq!(patch.paths(), vec![FieldPath::Player(newcomer)]);
    let player = &t.room.players[&newcomer];
    assert_eq!(player.team, None);
    assert_eq!(player.role, None);
    assert!(player.online);
    assert_eq!(t.room.seat_of(newcomer), None);

    // Rejoining keeps the seat and refreshes the profile.
    t.apply(t.red_op, join("Ravi II"));
    assert_eq!(t.room.players[&t.red_op].display_name, "Ravi II");
    assert_eq!(t.room.players[&t.red_op].team, Some(Team::Red));
}

#[test]
fn test_start_game_requires_ready_teams() {
    let mut t = TestRoom::seated();
    let vocabulary = Vocabulary::builtin();

    // Two spymasters and no operatives.
    t.apply(t.red_op, RoomAction::LeaveRoom);
    t.apply(t.blue_op, RoomAction::LeaveRoom);
    let result = plan(&t.room, t.red_spy, &RoomAction::StartGame, &vocabulary, &mut seeded_rng(3));
    assert_eq!(result, Err(ActionRejected::TeamsNotReady));

    let op = Uuid::new_v4();
    t.apply(op, join("Omar"));
    t.apply(op, RoomAction::JoinTeam { team: Team::Blue });
    let patch = t.apply(op, RoomAction::StartGame);

    assert_eq!(patch.paths(), vec![FieldPath::Game, FieldPath::Status]);
    assert_eq!(t.room.status, RoomStatus::Playing);
    let game = t.room.game.as_ref().unwrap();
    assert_eq!(game.phase, Phase::Clue);
    assert_eq!(game.current_turn, game.starting_team);
    assert_eq!(game.scores.get(game.starting_team).total, 9);
    assert_eq!(game.scores.get(game.starting_team.other()).total, 8);
}

#[test]
fn test_start_game_rejected_while_playing() {
    let t = TestRoom::playing(Team::Blue);
    let result = plan(
        &t.room,
        t.red_op,
        &RoomAction::StartGame,
        &Vocabulary::builtin(),
        &mut seeded_rng(3),
    );
    assert_eq!(result, Err(ActionRejected::NotStartable(RoomStatus::Playing)));
}

#[test]
fn test_assassin_finishes_room_and_restart_resets_round() {
    let mut t = TestRoom::playing(Team::Red);
    t.apply(
        t.red_spy,
        RoomAction::SubmitClue {
            word: "RISK".to_string(),
            number: 1,
        },
    );
    let assassin = card_of(&t.room, CardType::Assassin);
    let patch = t.apply(t.red_op, RoomAction::GuessCard { card_id: assassin });

    assert!(patch.touches(FieldPath::Status));
    assert!(patch.touches(FieldPath::Winner));
    assert_eq!(t.room.status, RoomStatus::Finished);
    let game = t.room.game.as_ref().unwrap();
    assert_eq!(game.winner, Some(Team::Blue));
    assert_eq!(game.win_reason, Some(WinReason::Assassin));

    // Frozen: nothing else is accepted.
    let result = plan(
        &t.room,
        t.blue_spy,
        &RoomAction::SubmitClue {
            word: "LATE".to_string(),
            number: 1,
        },
        &Vocabulary::builtin(),
        &mut seeded_rng(3),
    );
    assert_eq!(result, Err(ActionRejected::NotPlaying));

    // Play again from finished.
    t.apply(t.blue_op, RoomAction::StartGame);
    let game = t.room.game.as_ref().unwrap();
    assert_eq!(t.room.status, RoomStatus::Playing);
    assert!(game.winner.is_none());
    assert!(game.log.is_empty());
    assert_eq!(game.scores.red.found + game.scores.blue.found, 0);
    assert!(game.board.iter().all(|c| !c.revealed));
}

#[test]
fn test_turn_actions_touch_only_their_fields() {
    let mut t = TestRoom::playing(Team::Blue);
    let patch = t.apply(
        t.blue_spy,
        RoomAction::SubmitClue {
            word: "SKY".to_string(),
            number: 2,
        },
    );
    assert_eq!(
        patch.paths(),
        vec![FieldPath::CurrentClue, FieldPath::Phase, FieldPath::Log]
    );

    let blue_card = card_of(&t.room, CardType::Blue);
    let patch = t.apply(t.blue_op, RoomAction::GuessCard { card_id: blue_card });
    assert_eq!(
        patch.paths(),
        vec![
            FieldPath::Board,
            FieldPath::Scores,
            FieldPath::Log,
            FieldPath::CurrentClue
        ]
    );

    let patch = t.apply(t.blue_spy, RoomAction::EndTurn);
    assert!(patch.touches(FieldPath::CurrentTurn));
    assert!(!patch.touches(FieldPath::Board));
    let game = t.room.game.as_ref().unwrap();
    assert_eq!(game.current_turn, Team::Red);
    assert_eq!(game.log.last().unwrap().event, LogEvent::Pass);
}

#[test]
fn test_turn_actions_outside_play_are_rejected() {
    let t = TestRoom::seated();
    let result = plan(
        &t.room,
        t.red_op,
        &RoomAction::GuessCard { card_id: 0 },
        &Vocabulary::builtin(),
        &mut seeded_rng(3),
    );
    assert_eq!(result, Err(ActionRejected::NotPlaying));

    let stranger = Uuid::new_v4();
    let result = plan(
        &t.room,
        stranger,
        &RoomAction::EndTurn,
        &Vocabulary::builtin(),
        &mut seeded_rng(3),
    );
    assert_eq!(result, Err(ActionRejected::NotInRoom));
}

#[test]
fn test_plan_does_not_mutate_snapshot() {
    let t = TestRoom::playing(Team::Red);
    let before = t.room.clone();
    let patch = plan(
        &t.room,
        t.red_spy,
        &RoomAction::SubmitClue {
            word: "CAT".to_string(),
            number: 3,
        },
        &Vocabulary::builtin(),
        &mut seeded_rng(3),
    )
    .unwrap();

    assert_eq!(t.room, before);
    assert!(!patch.is_empty());
}

#[test]
fn test_kick_leave_and_presence() {
    let mut t = TestRoom::seated();
    let kick = RoomAction::KickPlayer {
        player_id: t.blue_spy,
    };
    let patch = t.apply(t.red_spy, kick);
    assert!(!t.room.has_player(t.blue_spy));
    assert_eq!(t.room.teams.blue.spymaster, None);
    assert!(patch.touches(FieldPath::Spymaster(Team::Blue)));
    assert!(!patch.touches(FieldPath::Operatives(Team::Red)));

    let patch = t.apply(t.red_op, RoomAction::UpdatePresence { online: false });
    assert_eq!(patch.paths(), vec![FieldPath::Player(t.red_op)]);
    assert!(!t.room.players[&t.red_op].online);

    t.apply(t.red_op, RoomAction::LeaveRoom);
    assert!(t.room.teams.red.operatives.is_empty());

    let result = plan(
        &t.room,
        t.red_spy,
        &RoomAction::KickPlayer {
            player_id: t.red_op,
        },
        &Vocabulary::builtin(),
        &mut seeded_rng(3),
    );
    assert_eq!(result, Err(ActionRejected::UnknownPlayer(t.red_op)));
}

#[test]
fn test_force_reset_and_force_end() {
    let mut t = TestRoom::playing(Team::Red);
    t.apply(t.red_spy, RoomAction::ForceEnd);
    assert_eq!(t.room.status, RoomStatus::Finished);
    assert!(t.room.game.is_some());

    t.apply(t.red_spy, RoomAction::ForceReset);
    assert_eq!(t.room.status, RoomStatus::Waiting);
    assert!(t.room.game.is_none());
    assert_eq!(t.room.teams.red.spymaster, Some(t.red_spy));
}

#[test]
fn test_role_change_locked_during_play() {
    let t = TestRoom::playing(Team::Red);
    let reject = |actor, action: RoomAction| {
        plan(
            &t.room,
            actor,
            &action,
            &Vocabulary::builtin(),
            &mut seeded_rng(3),
        )
        .err()
    };

    let claim = RoomAction::SelectRole {
        role: Role::Spymaster,
    };
    assert_eq!(
        reject(t.red_op, claim),
        Some(ActionRejected::SpymasterTaken { team: Team::Red })
    );
    let step_down = RoomAction::SelectRole {
        role: Role::Operative,
    };
    assert_eq!(
        reject(t.red_spy, step_down),
        Some(ActionRejected::RoleLockedDuringPlay)
    );
}

#[test]
fn test_spymaster_cannot_switch_sides_during_play() {
    let t = TestRoom::playing(Team::Red);
    let result = plan(
        &t.room,
        t.red_spy,
        &RoomAction::JoinTeam { team: Team::Blue },
        &Vocabulary::builtin(),
        &mut seeded_rng(3),
    );

    assert_eq!(result, Err(ActionRejected::RoleLockedDuringPlay));
    assert_eq!(t.room.teams.red.spymaster, Some(t.red_spy));
}

#[test]
fn test_vacant_spymaster_slot_refilled_during_play() {
    let mut t = TestRoom::playing(Team::Blue);
    let kick = RoomAction::KickPlayer {
        player_id: t.blue_spy,
    };
    t.apply(t.red_spy, kick);
    assert_eq!(t.room.teams.blue.spymaster, None);

    let claim = RoomAction::SelectRole {
        role: Role::Spymaster,
    };
    t.apply(t.blue_op, claim);
    assert_eq!(t.room.teams.blue.spymaster, Some(t.blue_op));
    assert_eq!(t.room.status, RoomStatus::Playing);

    t.apply(
        t.blue_op,
        RoomAction::SubmitClue {
            word: "RIVER".to_string(),
            number: 1,
        },
    );
    let game = t.room.game.as_ref().unwrap();
    assert_eq!(game.phase, Phase::Guess);
    assert_eq!(game.current_turn, Team::Blue);
}

#[test]
fn test_room_view_hides_unrevealed_types_from_operatives() {
    let mut t = TestRoom::playing(Team::Red);
    t.apply(
        t.red_spy,
        RoomAction::SubmitClue {
            word: "CAT".to_string(),
            number: 1,
        },
    );
    let red_card = card_of(&t.room, CardType::Red);
    t.apply(t.red_op, RoomAction::GuessCard { card_id: red_card });

    let operative_view = room_view(&t.room, 7, Some(t.red_op));
    let board = &operative_view.game.as_ref().unwrap().board;
    assert_eq!(operative_view.version, 7);
    let revealed = board.iter().find(|c| c.id == red_card).unwrap();
    assert_eq!(revealed.card_type, Some(CardType::Red));
    assert_eq!(board.iter().filter(|c| c.card_type.is_some()).count(), 1);
    assert_eq!(operative_view.viewer_seat.unwrap().role, Role::Operative);

    let spymaster_view = room_view(&t.room, 7, Some(t.blue_spy));
    assert!(
        spymaster_view
            .game
            .unwrap()
            .board
            .iter()
            .all(|c| c.card_type.is_some())
    );

    let anonymous = room_view(&t.room, 7, None);
    assert!(anonymous.viewer_seat.is_none());
    assert!(anonymous.can_start);
}
