use codeword_types::{CardView, GameView, PlayerId, Role, Room, RoomStatus, RoomView};

use crate::team_formation;

/// Personalize a room for one subscriber. Spymasters see every card type;
/// everyone else only sees types of revealed cards until the room finishes.
pub fn room_view(room: &Room, version: u64, viewer: Option<PlayerId>) -> RoomView {
    let viewer_seat = viewer.and_then(|id| room.seat_of(id));
    let sees_everything = room.status == RoomStatus::Finished
        || viewer_seat.is_some_and(|seat| seat.role == Role::Spymaster);

    let game = room.game.as_ref().map(|game| GameView {
        board: game
            .board
            .iter()
            .map(|card| CardView {
                id: card.id,
                word: card.word.clone(),
                card_type: (sees_everything || card.revealed).then_some(card.card_type),
                revealed: card.revealed,
                revealed_by: card.revealed_by,
            })
            .collect(),
        current_turn: game.current_turn,
        starting_team: game.starting_team,
        phase: game.phase,
        current_clue: game.current_clue.clone(),
        scores: game.scores,
        winner: game.winner,
        win_reason: game.win_reason,
        log: game.log.clone(),
    });

    RoomView {
        code: room.code.clone(),
        version,
        status: room.status,
        created_by: room.created_by,
        teams: room.teams.clone(),
        players: room.players.values().cloned().collect(),
        game,
        viewer_seat,
        can_start: team_formation::can_start(room),
    }
}
