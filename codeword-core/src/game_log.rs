//! Append-only history of clue, guess and pass actions.

use codeword_types::{GameLogEntry, LogEvent, PlayerId, Team};

/// Append an entry stamped with the current time. Entries are never edited
/// or removed; order is append order.
pub fn record(log: &mut Vec<GameLogEntry>, team: Team, player_id: PlayerId, event: LogEvent) {
    log.push(GameLogEntry {
        team,
        player_id,
        timestamp: chrono::Utc::now().to_rfc3339(),
        event,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeword_types::CardType;
    use uuid::Uuid;

    fn guess(card_id: u8) -> LogEvent {
        LogEvent::Guess {
            card_id,
            word: format!("WORD{}", card_id),
            revealed: CardType::Neutral,
        }
    }

    #[test]
    fn test_record_preserves_append_order() {
        let mut log = Vec::new();
        let player = Uuid::new_v4();
        let clue = LogEvent::Clue {
            word: "ANIMAL".into(),
            number: 2,
        };
        record(&mut log, Team::Red, player, clue);
        record(&mut log, Team::Red, player, guess(3));
        record(&mut log, Team::Red, player, LogEvent::Pass);

        assert_eq!(log.len(), 3);
        assert!(matches!(log[0].event, LogEvent::Clue { .. }));
        assert!(matches!(log[1].event, LogEvent::Guess { card_id: 3, .. }));
        assert_eq!(log[2].event, LogEvent::Pass);
        assert!(chrono::DateTime::parse_from_rfc3339(&log[0].timestamp).is_ok());
    }

    #[test]
    fn test_entries_keep_acting_team() {
        let mut log = Vec::new();
        record(&mut log, Team::Blue, Uuid::new_v4(), LogEvent::Pass);

        assert_eq!(log[0].team, Team::Blue);
    }
}
