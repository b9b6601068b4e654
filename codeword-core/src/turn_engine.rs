use rand::Rng;

use codeword_types::{
    CardType, Clue, GameState, LogEvent, Phase, PlayerId, Team, Teams, WinReason,
};

use crate::{ActionRejected, BoardGenerator, Vocabulary, board, game_log};

pub const MAX_CLUE_NUMBER: u8 = 9;

/// What happened after a card was revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Correct card, the team may keep guessing.
    Continue { guesses_remaining: u8 },
    /// Wrong card or out of guesses; `next` now gives a clue.
    TurnPassed { next: Team },
    Won {
        winner: Team,
        reason: WinReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessResolution {
    pub card_type: CardType,
    pub outcome: GuessOutcome,
}

/// The clue → guess state machine for one round.
pub struct TurnEngine;

impl TurnEngine {
    /// Deal a fresh round with a coin-flipped starting team.
    pub fn new_round<R: Rng + ?Sized>(vocabulary: &Vocabulary, rng: &mut R) -> GameState {
        let starting_team = BoardGenerator::pick_starting_team(rng);
        Self::new_round_with_starting_team(vocabulary, starting_team, rng)
    }

    pub fn new_round_with_starting_team<R: Rng + ?Sized>(
        vocabulary: &Vocabulary,
        starting_team: Team,
        rng: &mut R,
    ) -> GameState {
        GameState {
            board: BoardGenerator::new(vocabulary).generate(starting_team, rng),
            current_turn: starting_team,
            starting_team,
            phase: Phase::Clue,
            current_clue: None,
            scores: board::initial_scores(starting_team),
            winner: None,
            win_reason: None,
            log: Vec::new(),
            started_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The current team's spymaster gives a clue; the team gets
    /// `number + 1` guesses.
    pub fn submit_clue(
        game: &mut GameState,
        teams: &Teams,
        actor: PlayerId,
        word: &str,
        number: u8,
    ) -> Result<(), ActionRejected> {
        Self::ensure_phase(game, Phase::Clue)?;
        let team = game.current_turn;
        if teams.get(team).spymaster != Some(actor) {
            return Err(ActionRejected::NotSpymaster);
        }

        let word = word.trim();
        if word.is_empty() {
            return Err(ActionRejected::EmptyClue);
        }
        if number == 0 || number > MAX_CLUE_NUMBER {
            return Err(ActionRejected::ClueNumberOutOfRange(number));
        }

        game.current_clue = Some(Clue {
            word: word.to_string(),
            number,
            guesses_remaining: number + 1,
        });
        game.phase = Phase::Guess;
        game_log::record(
            &mut game.log,
            team,
            actor,
            LogEvent::Clue {
                word: word.to_string(),
                number,
            },
        );
        Ok(())
    }

    /// An operative of the current team reveals a card.
    ///
    /// Resolution order: assassin, then a completed board for the card's
    /// team, then a turn pass on a wrong-team or neutral card, then the
    /// guess counter.
    pub fn guess_card(
        game: &mut GameState,
        teams: &Teams,
        actor: PlayerId,
        card_id: u8,
    ) -> Result<GuessResolution, ActionRejected> {
        Self::ensure_phase(game, Phase::Guess)?;
        let team = game.current_turn;
        let data = teams.get(team);
        if data.spymaster == Some(actor) {
            return Err(ActionRejected::SpymasterCannotGuess);
        }
        if !data.is_operative(actor) {
            return Err(ActionRejected::NotYourTurn);
        }

        let card = game
            .board
            .get_mut(card_id as usize)
            .ok_or(ActionRejected::UnknownCard(card_id))?;
        if card.revealed {
            return Err(ActionRejected::CardAlreadyRevealed(card_id));
        }
        card.revealed = true;
        card.revealed_by = Some(actor);
        let card_type = card.card_type;
        let word = card.word.clone();

        game_log::record(
            &mut game.log,
            team,
            actor,
            LogEvent::Guess {
                card_id,
                word,
                revealed: card_type,
            },
        );

        if card_type == CardType::Assassin {
            return Ok(Self::finish(game, team.other(), WinReason::Assassin, card_type));
        }

        if let Some(owner) = card_type.team() {
            let score = game.scores.get_mut(owner);
            score.found = (score.found + 1).min(score.total);
            if score.is_complete() {
                return Ok(Self::finish(game, owner, WinReason::AllFound, card_type));
            }
        }

        if card_type != CardType::of_team(team) {
            let next = Self::pass_turn(game);
            return Ok(GuessResolution {
                card_type,
                outcome: GuessOutcome::TurnPassed { next },
            });
        }

        let remaining = match game.current_clue.as_mut() {
            Some(clue) => {
                clue.guesses_remaining = clue.guesses_remaining.saturating_sub(1);
                clue.guesses_remaining
            }
            None => 0,
        };

        let outcome = if remaining == 0 {
            GuessOutcome::TurnPassed {
                next: Self::pass_turn(game),
            }
        } else {
            GuessOutcome::Continue {
                guesses_remaining: remaining,
            }
        };
        Ok(GuessResolution { card_type, outcome })
    }

    /// Any member of the current team may stop guessing.
    pub fn end_turn(
        game: &mut GameState,
        teams: &Teams,
        actor: PlayerId,
    ) -> Result<Team, ActionRejected> {
        Self::ensure_phase(game, Phase::Guess)?;
        let team = game.current_turn;
        if !teams.get(team).contains(actor) {
            return Err(ActionRejected::NotYourTurn);
        }

        game_log::record(&mut game.log, team, actor, LogEvent::Pass);
        Ok(Self::pass_turn(game))
    }

    fn ensure_phase(game: &GameState, expected: Phase) -> Result<(), ActionRejected> {
        if game.is_over() {
            return Err(ActionRejected::GameOver);
        }
        if game.phase != expected {
            return Err(ActionRejected::WrongPhase { expected });
        }
        Ok(())
    }

    fn pass_turn(game: &mut GameState) -> Team {
        game.current_turn = game.current_turn.other();
        game.phase = Phase::Clue;
        game.current_clue = None;
        game.current_turn
    }

    fn finish(
        game: &mut GameState,
        winner: Team,
        reason: WinReason,
        card_type: CardType,
    ) -> GuessResolution {
        game.winner = Some(winner);
        game.win_reason = Some(reason);
        GuessResolution {
            card_type,
            outcome: GuessOutcome::Won { winner, reason },
        }
    }
}
