use rand::Rng;
use rand::seq::SliceRandom;

use codeword_types::{BOARD_SIZE, Card, CardType, Scores, Team, TeamScore};

use crate::Vocabulary;

pub const STARTING_TEAM_CARDS: u8 = 9;
pub const OTHER_TEAM_CARDS: u8 = 8;
pub const NEUTRAL_CARDS: u8 = 7;
pub const ASSASSIN_CARDS: u8 = 1;

/// Deals fresh boards from a vocabulary.
pub struct BoardGenerator<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> BoardGenerator<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Fair coin flip, independent of the board itself.
    pub fn pick_starting_team<R: Rng + ?Sized>(rng: &mut R) -> Team {
        if rng.gen_bool(0.5) {
            Team::Red
        } else {
            Team::Blue
        }
    }

    /// Draw 25 distinct words and pair them with an independently shuffled
    /// 9/8/7/1 type multiset.
    pub fn generate<R: Rng + ?Sized>(&self, starting_team: Team, rng: &mut R) -> Vec<Card> {
        let mut words: Vec<String> = self
            .vocabulary
            .words()
            .choose_multiple(rng, BOARD_SIZE)
            .cloned()
            .collect();
        words.shuffle(rng);

        let mut types = type_distribution(starting_team);
        types.shuffle(rng);

        words
            .into_iter()
            .zip(types)
            .enumerate()
            .map(|(id, (word, card_type))| Card {
                id: id as u8,
                word,
                card_type,
                revealed: false,
                revealed_by: None,
            })
            .collect()
    }
}

/// The unshuffled type labels for a board started by `starting_team`.
pub fn type_distribution(starting_team: Team) -> Vec<CardType> {
    let mut types = Vec::with_capacity(BOARD_SIZE);
    types.extend(std::iter::repeat_n(
        CardType::of_team(starting_team),
        STARTING_TEAM_CARDS as usize,
    ));
    types.extend(std::iter::repeat_n(
        CardType::of_team(starting_team.other()),
        OTHER_TEAM_CARDS as usize,
    ));
    types.extend(std::iter::repeat_n(CardType::Neutral, NEUTRAL_CARDS as usize));
    types.extend(std::iter::repeat_n(CardType::Assassin, ASSASSIN_CARDS as usize));
    types
}

pub fn initial_scores(starting_team: Team) -> Scores {
    let mut scores = Scores::default();
    *scores.get_mut(starting_team) = TeamScore::new(STARTING_TEAM_CARDS);
    *scores.get_mut(starting_team.other()) = TeamScore::new(OTHER_TEAM_CARDS);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn count(board: &[Card], card_type: CardType) -> usize {
        board.iter().filter(|c| c.card_type == card_type).count()
    }

    #[test]
    fn test_distribution_sums_to_board_size() {
        assert_eq!(
            (STARTING_TEAM_CARDS + OTHER_TEAM_CARDS + NEUTRAL_CARDS + ASSASSIN_CARDS) as usize,
            BOARD_SIZE
        );
        assert_eq!(type_distribution(Team::Blue).len(), BOARD_SIZE);
    }

    #[test]
    fn test_board_type_counts_for_both_starting_teams() {
        let vocabulary = Vocabulary::builtin();
        let generator = BoardGenerator::new(&vocabulary);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for starting in Team::ALL {
            let board = generator.generate(starting, &mut rng);
            assert_eq!(board.len(), BOARD_SIZE);
            assert_eq!(count(&board, CardType::of_team(starting)), 9);
            assert_eq!(count(&board, CardType::of_team(starting.other())), 8);
            assert_eq!(count(&board, CardType::Neutral), 7);
            assert_eq!(count(&board, CardType::Assassin), 1);
        }
    }

    #[test]
    fn test_board_cards_are_distinct_and_unrevealed() {
        let vocabulary = Vocabulary::builtin();
        let generator = BoardGenerator::new(&vocabulary);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let board = generator.generate(Team::Red, &mut rng);

        let words: HashSet<_> = board.iter().map(|c| c.word.clone()).collect();
        assert_eq!(words.len(), BOARD_SIZE);

        for (position, card) in board.iter().enumerate() {
            assert_eq!(card.id as usize, position);
            assert!(!card.revealed);
            assert!(card.revealed_by.is_none());
            assert!(vocabulary.contains(&card.word));
        }
    }

    #[test]
    fn test_different_seeds_give_different_boards() {
        let vocabulary = Vocabulary::builtin();
        let generator = BoardGenerator::new(&vocabulary);
        let pairing = |seed: u64| -> Vec<(String, CardType)> {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            generator
                .generate(Team::Red, &mut rng)
                .into_iter()
                .map(|c| (c.word, c.card_type))
                .collect()
        };

        assert_eq!(pairing(1), pairing(1));
        assert_ne!(pairing(1), pairing(2));
    }

    #[test]
    fn test_small_vocabulary_uses_every_word() {
        let list = (0..25).map(|i| format!("w{}", i)).collect::<Vec<_>>().join("\n");
        let vocabulary = Vocabulary::from_word_list(&list).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let board = BoardGenerator::new(&vocabulary).generate(Team::Blue, &mut rng);

        let words: HashSet<_> = board.iter().map(|c| c.word.as_str()).collect();
        assert_eq!(words.len(), 25);
    }

    #[test]
    fn test_starting_team_is_not_constant() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let picks: HashSet<Team> = (0..64)
            .map(|_| BoardGenerator::pick_starting_team(&mut rng))
            .collect();
        assert_eq!(picks.len(), 2);
    }

    #[test]
    fn test_initial_scores() {
        let scores = initial_scores(Team::Blue);
        assert_eq!(scores.blue, TeamScore { found: 0, total: 9 });
        assert_eq!(scores.red, TeamScore { found: 0, total: 8 });
    }
}
