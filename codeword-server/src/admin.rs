use std::collections::HashSet;

use codeword_types::{GameError, PlayerId, Room};

/// Who may perform moderation actions. The game core never sees this; it is
/// consulted only before forwarding an action to a room.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    admins: HashSet<PlayerId>,
}

impl AdminPolicy {
    pub fn new(admins: HashSet<PlayerId>) -> Self {
        Self { admins }
    }

    pub fn is_admin(&self, player_id: PlayerId) -> bool {
        self.admins.contains(&player_id)
    }

    /// Room deletion and forced reset/end.
    pub fn require_admin(&self, player_id: PlayerId, action: &str) -> Result<(), GameError> {
        if self.is_admin(player_id) {
            Ok(())
        } else {
            Err(GameError::Forbidden {
                action: action.to_string(),
            })
        }
    }

    /// The room's creator may kick, as may any administrator.
    pub fn require_kick(&self, room: &Room, player_id: PlayerId) -> Result<(), GameError> {
        if room.created_by == player_id || self.is_admin(player_id) {
            Ok(())
        } else {
            Err(GameError::Forbidden {
                action: "kick_player".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeword_types::Player;
    use uuid::Uuid;

    fn room_hosted_by(host: PlayerId) -> Room {
        let player = Player::new(
            host,
            "Host".to_string(),
            None,
            "2026-01-01T00:00:00Z".to_string(),
        );
        Room::new("HQKMN".to_string(), player)
    }

    #[test]
    fn test_admin_actions_need_membership_in_admin_set() {
        let admin = Uuid::new_v4();
        let policy = AdminPolicy::new(HashSet::from([admin]));

        assert!(policy.require_admin(admin, "delete_room").is_ok());
        assert_eq!(
            policy.require_admin(Uuid::new_v4(), "delete_room"),
            Err(GameError::Forbidden {
                action: "delete_room".to_string()
            })
        );
    }

    #[test]
    fn test_kick_allowed_for_host_and_admin_only() {
        let host = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let room = room_hosted_by(host);
        let policy = AdminPolicy::new(HashSet::from([admin]));

        assert!(policy.require_kick(&room, host).is_ok());
        assert!(policy.require_kick(&room, admin).is_ok());
        assert!(policy.require_kick(&room, Uuid::new_v4()).is_err());
    }
}
