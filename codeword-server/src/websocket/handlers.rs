use regex::Regex;
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::admin::AdminPolicy;
use crate::room_manager::RoomManager;
use crate::websocket::connection::{ConnectionId, ConnectionManager, Identity};
use codeword_core::{DispatchOutcome, RoomAction, RoomCode, RoomSnapshot, SyncError, room_view};
use codeword_types::{ClientMessage, GameError, PlayerId, Role, ServerMessage, Team};

static DISPLAY_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 _.\-]{1,24}$").unwrap());

/// Trimmed display name, or the reason it was refused.
pub fn validate_display_name(name: &str) -> Result<String, GameError> {
    let trimmed = name.trim();
    if DISPLAY_NAME_REGEX.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(GameError::InvalidDisplayName {
            name: name.to_string(),
        })
    }
}

pub fn game_error(error: &SyncError) -> GameError {
    match error {
        SyncError::RoomNotFound(code) => GameError::RoomNotFound {
            code: code.to_string(),
        },
        SyncError::WriteFailed { message, .. } => GameError::WriteFailed {
            message: message.clone(),
        },
        SyncError::Contention { .. } => GameError::Contention,
    }
}

fn describe(error: &GameError) -> String {
    match error {
        GameError::RoomNotFound { code } => format!("Room {} does not exist", code),
        GameError::InvalidRoomCode { code } => format!("{:?} is not a room code", code),
        GameError::NotInRoom => "Join a room first".to_string(),
        GameError::IdentificationRequired => "Say hello first".to_string(),
        GameError::InvalidDisplayName { .. } => {
            "Display names are 1-24 letters, digits, spaces, '_', '.' or '-'".to_string()
        }
        GameError::Forbidden { action } => format!("Not allowed to {}", action),
        GameError::WriteFailed { message } => format!("Could not save the change: {}", message),
        GameError::Contention => "The room is busy, try again".to_string(),
        GameError::RateLimitExceeded => "Slow down".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    /// Reported back to the client; the connection stays open.
    #[error("{message}")]
    Rejected {
        error: GameError,
        message: String,
    },
    #[error("{0}")]
    Closed(String),
}

impl From<GameError> for HandlerError {
    fn from(error: GameError) -> Self {
        let message = describe(&error);
        HandlerError::Rejected { error, message }
    }
}

impl From<SyncError> for HandlerError {
    fn from(error: SyncError) -> Self {
        HandlerError::Rejected {
            error: game_error(&error),
            message: error.to_string(),
        }
    }
}

type HandlerResult = Result<(), HandlerError>;

#[derive(Clone)]
pub struct MessageHandler {
    connection_id: ConnectionId,
    connection_manager: Arc<ConnectionManager>,
    room_manager: Arc<RoomManager>,
    admin_policy: Arc<AdminPolicy>,
}

impl MessageHandler {
    pub fn new(
        connection_id: ConnectionId,
        connection_manager: Arc<ConnectionManager>,
        room_manager: Arc<RoomManager>,
        admin_policy: Arc<AdminPolicy>,
    ) -> Self {
        Self {
            connection_id,
            connection_manager,
            room_manager,
            admin_policy,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Errors only when the connection itself is gone.
    pub async fn handle_message(&self, message: ClientMessage) -> Result<(), String> {
        self.connection_manager
            .update_activity(self.connection_id)
            .await;

        let result = match message {
            ClientMessage::Hello {
                player_id,
                display_name,
                avatar,
            } => self.handle_hello(player_id, display_name, avatar).await,
            ClientMessage::CreateRoom => self.handle_create_room().await,
            ClientMessage::JoinRoom { code } => self.handle_join_room(code).await,
            ClientMessage::LeaveRoom => self.handle_leave_room().await,
            ClientMessage::JoinTeam { team } => self.handle_join_team(team).await,
            ClientMessage::SelectRole { role } => self.handle_select_role(role).await,
            ClientMessage::SubmitClue { word, number } => {
                self.room_action(RoomAction::SubmitClue { word, number })
                    .await
            }
            ClientMessage::GuessCard { card_id } => {
                self.room_action(RoomAction::GuessCard { card_id }).await
            }
            ClientMessage::EndTurn => self.room_action(RoomAction::EndTurn).await,
            ClientMessage::StartGame => self.room_action(RoomAction::StartGame).await,
            ClientMessage::KickPlayer { player_id } => self.handle_kick_player(player_id).await,
            ClientMessage::DeleteRoom => self.handle_delete_room().await,
            ClientMessage::ForceReset => self.admin_action(RoomAction::ForceReset).await,
            ClientMessage::ForceEnd => self.admin_action(RoomAction::ForceEnd).await,
            // Activity was already recorded above.
            ClientMessage::Heartbeat => Ok(()),
        };

        match result {
            Ok(()) => Ok(()),
            Err(HandlerError::Rejected { error, message }) => {
                debug!("Rejected request from {}: {}", self.connection_id, message);
                self.reply(ServerMessage::error(error, message)).await
            }
            Err(e @ HandlerError::Closed(_)) => Err(e.to_string()),
        }
    }

    pub async fn handle_disconnect(&self) {
        info!("Handling disconnect for connection {}", self.connection_id);

        if let Some(connection) = self
            .connection_manager
            .get_connection(self.connection_id)
            .await
        {
            if let (Some(player_id), Some(code)) = (connection.player_id(), connection.room_code) {
                self.room_manager.mark_offline(&code, player_id).await;
            }
        }
    }

    async fn handle_hello(
        &self,
        player_id: Option<PlayerId>,
        display_name: String,
        avatar: Option<String>,
    ) -> HandlerResult {
        let display_name = validate_display_name(&display_name)?;
        let player_id = player_id.unwrap_or_else(Uuid::new_v4);

        let identity = Identity {
            player_id,
            display_name,
            avatar,
        };
        self.connection_manager
            .identify(self.connection_id, identity)
            .await
            .map_err(|reason| HandlerError::Rejected {
                error: GameError::Forbidden {
                    action: "hello".to_string(),
                },
                message: reason,
            })?;

        info!("Connection {} identified as {}", self.connection_id, player_id);
        self.send_message(ServerMessage::Welcome { player_id }).await
    }

    async fn handle_create_room(&self) -> HandlerResult {
        let identity = self.identity().await?;
        self.leave_current_room(identity.player_id).await;

        let (code, _) = self
            .room_manager
            .create_room(
                identity.player_id,
                &identity.display_name,
                identity.avatar.clone(),
            )
            .await?;
        self.enter_room(identity.player_id, code).await
    }

    async fn handle_join_room(&self, code: String) -> HandlerResult {
        let identity = self.identity().await?;
        let code = RoomCode::parse(&code).map_err(|_| GameError::InvalidRoomCode { code })?;

        let current = self.current_room_code().await;
        if current.as_ref() != Some(&code) {
            self.leave_current_room(identity.player_id).await;
        }

        let action = RoomAction::JoinRoom {
            display_name: identity.display_name.clone(),
            avatar: identity.avatar.clone(),
        };
        match self
            .room_manager
            .dispatch(&code, identity.player_id, action)
            .await?
        {
            DispatchOutcome::Ignored(reason) => {
                debug!(room = %code, player = %identity.player_id, reason = %reason, "Join ignored");
                Ok(())
            }
            DispatchOutcome::Applied(_) | DispatchOutcome::Unchanged => {
                self.enter_room(identity.player_id, code).await
            }
        }
    }

    async fn handle_leave_room(&self) -> HandlerResult {
        let identity = self.identity().await?;
        if self.current_room_code().await.is_none() {
            return Err(GameError::NotInRoom.into());
        }
        self.leave_current_room(identity.player_id).await;
        self.send_message(ServerMessage::RoomLeft).await
    }

    async fn handle_join_team(&self, team: Team) -> HandlerResult {
        self.room_action(RoomAction::JoinTeam { team }).await
    }

    async fn handle_select_role(&self, role: Role) -> HandlerResult {
        self.room_action(RoomAction::SelectRole { role }).await
    }

    async fn handle_kick_player(&self, target: PlayerId) -> HandlerResult {
        let (identity, code) = self.current_room().await?;
        let snapshot = self.room_manager.snapshot(&code).await?;
        self.admin_policy
            .require_kick(&snapshot.room, identity.player_id)?;

        info!(room = %code, actor = %identity.player_id, target = %target, "Kicking player");
        // The target's own room feed notices the removal and tells them.
        self.dispatch(&code, identity.player_id, RoomAction::KickPlayer { player_id: target })
            .await
    }

    async fn handle_delete_room(&self) -> HandlerResult {
        let (identity, code) = self.current_room().await?;
        self.admin_policy
            .require_admin(identity.player_id, "delete_room")?;

        info!(room = %code, admin = %identity.player_id, "Deleting room");
        // Every subscriber, this one included, sees its feed close.
        self.room_manager.delete_room(&code).await?;
        Ok(())
    }

    async fn admin_action(&self, action: RoomAction) -> HandlerResult {
        let (identity, code) = self.current_room().await?;
        self.admin_policy
            .require_admin(identity.player_id, action.name())?;

        info!(room = %code, admin = %identity.player_id, action = action.name(), "Administrative action");
        self.dispatch(&code, identity.player_id, action).await
    }

    async fn room_action(&self, action: RoomAction) -> HandlerResult {
        let (identity, code) = self.current_room().await?;
        self.dispatch(&code, identity.player_id, action).await
    }

    async fn dispatch(
        &self,
        code: &RoomCode,
        actor: PlayerId,
        action: RoomAction,
    ) -> HandlerResult {
        let name = action.name();
        match self.room_manager.dispatch(code, actor, action).await? {
            DispatchOutcome::Ignored(reason) => {
                debug!(room = %code, actor = %actor, action = name, reason = %reason, "Action ignored");
            }
            DispatchOutcome::Applied(_) | DispatchOutcome::Unchanged => {}
        }
        Ok(())
    }

    /// Subscribe first, then send the current view, so no write between the
    /// two is lost.
    async fn enter_room(&self, player_id: PlayerId, code: RoomCode) -> HandlerResult {
        let updates = self.room_manager.subscribe(&code).await?;
        let view = self.room_manager.view(&code, Some(player_id)).await?;
        let version = view.version;

        self.connection_manager
            .set_connection_room(self.connection_id, Some(code.clone()))
            .await;
        self.send_message(ServerMessage::RoomJoined {
            code: code.to_string(),
        })
        .await?;
        self.send_message(ServerMessage::RoomUpdate { room: view })
            .await?;

        let feed = tokio::spawn(forward_room_updates(
            self.connection_id,
            player_id,
            code,
            updates,
            version,
            self.connection_manager.clone(),
        ));
        self.connection_manager
            .attach_room_feed(self.connection_id, feed.abort_handle())
            .await;
        Ok(())
    }

    async fn leave_current_room(&self, player_id: PlayerId) {
        let Some(code) = self.current_room_code().await else {
            return;
        };
        self.connection_manager
            .detach_room_feed(self.connection_id)
            .await;
        self.connection_manager
            .set_connection_room(self.connection_id, None)
            .await;

        if let Err(e) = self
            .room_manager
            .dispatch(&code, player_id, RoomAction::LeaveRoom)
            .await
        {
            warn!(room = %code, player = %player_id, error = %e, "Failed to leave room");
        }
    }

    async fn identity(&self) -> Result<Identity, HandlerError> {
        self.connection_manager
            .get_connection(self.connection_id)
            .await
            .and_then(|conn| conn.identity)
            .ok_or_else(|| GameError::IdentificationRequired.into())
    }

    async fn current_room_code(&self) -> Option<RoomCode> {
        self.connection_manager
            .get_connection(self.connection_id)
            .await
            .and_then(|conn| conn.room_code)
    }

    async fn current_room(&self) -> Result<(Identity, RoomCode), HandlerError> {
        let identity = self.identity().await?;
        let code = self
            .current_room_code()
            .await
            .ok_or(HandlerError::from(GameError::NotInRoom))?;
        Ok((identity, code))
    }

    pub async fn reply(&self, message: ServerMessage) -> Result<(), String> {
        self.connection_manager
            .send_to_connection(self.connection_id, message)
            .await
    }

    async fn send_message(&self, message: ServerMessage) -> HandlerResult {
        self.reply(message).await.map_err(HandlerError::Closed)
    }
}

/// Push a personalized view of every newer snapshot to one connection until
/// the room goes away or the player is no longer in it.
async fn forward_room_updates(
    connection_id: ConnectionId,
    player_id: PlayerId,
    code: RoomCode,
    mut updates: broadcast::Receiver<RoomSnapshot>,
    mut last_version: u64,
    connection_manager: Arc<ConnectionManager>,
) {
    loop {
        match updates.recv().await {
            Ok(snapshot) => {
                if snapshot.version <= last_version {
                    continue;
                }
                last_version = snapshot.version;

                if !snapshot.room.has_player(player_id) {
                    info!(room = %code, player = %player_id, "Player removed from room");
                    connection_manager
                        .set_connection_room(connection_id, None)
                        .await;
                    let _ = connection_manager
                        .send_to_connection(
                            connection_id,
                            ServerMessage::Kicked {
                                code: code.to_string(),
                            },
                        )
                        .await;
                    break;
                }

                let room = room_view(&snapshot.room, snapshot.version, Some(player_id));
                if connection_manager
                    .send_to_connection(connection_id, ServerMessage::RoomUpdate { room })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                // The next snapshot received is complete, so skipping is safe.
                warn!(room = %code, connection = %connection_id, skipped, "Room feed lagged");
            }
            Err(RecvError::Closed) => {
                connection_manager
                    .set_connection_room(connection_id, None)
                    .await;
                let _ = connection_manager
                    .send_to_connection(
                        connection_id,
                        ServerMessage::RoomClosed {
                            code: code.to_string(),
                        },
                    )
                    .await;
                break;
            }
        }
    }
}
