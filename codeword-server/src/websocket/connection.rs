use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, mpsc};
use tokio::task::AbortHandle;
use uuid::Uuid;

use codeword_core::RoomCode;
use codeword_types::{PlayerId, ServerMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who is on the other end, as announced by `Hello`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub player_id: PlayerId,
    pub display_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Option<Identity>,
    pub room_code: Option<RoomCode>,
    pub connected_at: Instant,
    pub last_activity: Instant,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let now = Instant::now();

        let connection = Self {
            id,
            identity: None,
            room_code: None,
            connected_at: now,
            last_activity: now,
            sender,
        };

        (connection, receiver)
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.identity.as_ref().map(|identity| identity.player_id)
    }

    pub fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }

    pub fn is_inactive(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

/// A connection dropped by the inactivity sweep, with the room seat it held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedConnection {
    pub id: ConnectionId,
    pub player_id: Option<PlayerId>,
    pub room_code: Option<RoomCode>,
}

pub struct ConnectionManager {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    player_to_connection: RwLock<HashMap<PlayerId, ConnectionId>>,
    room_feeds: RwLock<HashMap<ConnectionId, AbortHandle>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            player_to_connection: RwLock::new(HashMap::new()),
            room_feeds: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_connection(
        &self,
        id: ConnectionId,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (conn, receiver) = Connection::new(id);
        self.connections.write().await.insert(id, conn);
        receiver
    }

    pub async fn remove_connection(&self, id: ConnectionId) -> Option<Connection> {
        self.detach_room_feed(id).await;

        let removed = self.connections.write().await.remove(&id);
        if let Some(player_id) = removed.as_ref().and_then(Connection::player_id) {
            let mut player_to_connection = self.player_to_connection.write().await;
            if player_to_connection.get(&player_id) == Some(&id) {
                player_to_connection.remove(&player_id);
            }
        }
        removed
    }

    pub async fn get_connection(&self, id: ConnectionId) -> Option<Connection> {
        self.connections.read().await.get(&id).cloned()
    }

    /// Bind a player identity to this connection. A player may only be
    /// connected once; the same connection may re-identify with its own id.
    pub async fn identify(&self, id: ConnectionId, identity: Identity) -> Result<(), String> {
        let player_id = identity.player_id;
        {
            let player_to_connection = self.player_to_connection.read().await;
            if let Some(existing) = player_to_connection.get(&player_id) {
                if *existing != id {
                    return Err("Player already connected".to_string());
                }
            }
        }

        let previous = {
            let mut connections = self.connections.write().await;
            let connection = connections
                .get_mut(&id)
                .ok_or_else(|| "Connection not found".to_string())?;
            connection.identity.replace(identity)
        };

        let mut player_to_connection = self.player_to_connection.write().await;
        if let Some(previous) = previous.filter(|p| p.player_id != player_id) {
            player_to_connection.remove(&previous.player_id);
        }
        player_to_connection.insert(player_id, id);
        Ok(())
    }

    pub async fn update_activity(&self, id: ConnectionId) {
        if let Some(connection) = self.connections.write().await.get_mut(&id) {
            connection.update_activity();
        }
    }

    pub async fn send_to_connection(
        &self,
        id: ConnectionId,
        message: ServerMessage,
    ) -> Result<(), String> {
        let connections = self.connections.read().await;
        match connections.get(&id) {
            Some(connection) => connection.send_message(message),
            None => Err("Connection not found".to_string()),
        }
    }

    pub async fn set_connection_room(&self, id: ConnectionId, room_code: Option<RoomCode>) {
        if let Some(connection) = self.connections.write().await.get_mut(&id) {
            connection.room_code = room_code;
        }
    }

    /// Replace the task forwarding room snapshots to this connection.
    pub async fn attach_room_feed(&self, id: ConnectionId, feed: AbortHandle) {
        if let Some(previous) = self.room_feeds.write().await.insert(id, feed) {
            previous.abort();
        }
    }

    pub async fn detach_room_feed(&self, id: ConnectionId) {
        if let Some(feed) = self.room_feeds.write().await.remove(&id) {
            feed.abort();
        }
    }

    pub async fn get_connections_in_room(&self, code: &RoomCode) -> Vec<ConnectionId> {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.room_code.as_ref() == Some(code))
            .map(|conn| conn.id)
            .collect()
    }

    pub async fn cleanup_inactive_connections(&self, timeout: Duration) -> Vec<DroppedConnection> {
        let inactive: Vec<ConnectionId> = {
            let connections = self.connections.read().await;
            connections
                .values()
                .filter(|conn| conn.is_inactive(timeout))
                .map(|conn| conn.id)
                .collect()
        };

        let mut dropped = Vec::new();
        for connection_id in inactive {
            tracing::info!("Removing inactive connection: {}", connection_id);
            if let Some(conn) = self.remove_connection(connection_id).await {
                dropped.push(DroppedConnection {
                    id: conn.id,
                    player_id: conn.player_id(),
                    room_code: conn.room_code,
                });
            }
        }
        dropped
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn player_connection_count(&self) -> usize {
        self.player_to_connection.read().await.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
