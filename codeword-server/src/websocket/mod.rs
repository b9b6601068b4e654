use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::admin::AdminPolicy;
use crate::room_manager::RoomManager;
use codeword_types::{ClientMessage, GameError, ServerMessage};

pub mod connection;
pub mod handlers;
pub mod rate_limiter;

use connection::ConnectionId;
pub use connection::ConnectionManager;
use handlers::MessageHandler;
use rate_limiter::RateLimiter;

/// Drives one socket until either direction stops, then releases the
/// player's presence and the connection's room feed.
pub async fn handle_connection(
    websocket: WebSocket,
    connection_manager: Arc<ConnectionManager>,
    room_manager: Arc<RoomManager>,
    admin_policy: Arc<AdminPolicy>,
    rate_limit_tokens: u32,
) {
    let connection_id = ConnectionId::new();
    info!(connection = %connection_id, "WebSocket connected");

    let (ws_sender, ws_receiver) = websocket.split();
    let outbox = connection_manager.create_connection(connection_id).await;
    let message_handler = MessageHandler::new(
        connection_id,
        connection_manager.clone(),
        room_manager,
        admin_policy,
    );

    tokio::select! {
        _ = read_incoming(ws_receiver, &message_handler, RateLimiter::new(rate_limit_tokens)) => {},
        _ = write_outgoing(ws_sender, outbox, connection_id) => {},
    }

    message_handler.handle_disconnect().await;
    if let Some(connection) = connection_manager.remove_connection(connection_id).await {
        info!(
            connection = %connection_id,
            player = ?connection.player_id(),
            session_secs = connection.connected_at.elapsed().as_secs(),
            "WebSocket disconnected"
        );
    }
}

async fn read_incoming(
    mut ws_receiver: SplitStream<WebSocket>,
    message_handler: &MessageHandler,
    mut rate_limiter: RateLimiter,
) {
    let connection_id = message_handler.connection_id();
    while let Some(frame) = ws_receiver.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                warn!(connection = %connection_id, error = %e, "WebSocket read failed");
                return;
            }
        };
        if msg.is_close() {
            debug!(connection = %connection_id, "Client closed the socket");
            return;
        }
        if let Err(e) = handle_frame(msg, &mut rate_limiter, message_handler).await {
            error!(connection = %connection_id, error = %e, "Dropping connection");
            return;
        }
    }
}

async fn write_outgoing(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut outbox: mpsc::UnboundedReceiver<ServerMessage>,
    connection_id: ConnectionId,
) {
    while let Some(message) = outbox.recv().await {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                error!(connection = %connection_id, error = %e, "Failed to serialize message");
                continue;
            }
        };

        if let Err(e) = ws_sender.send(Message::text(json)).await {
            warn!(connection = %connection_id, error = %e, "WebSocket write failed");
            return;
        }
    }
}

/// Errors returned here end the connection; rate limiting and rejected
/// requests are answered in-band instead.
async fn handle_frame(
    msg: Message,
    rate_limiter: &mut RateLimiter,
    message_handler: &MessageHandler,
) -> anyhow::Result<()> {
    // Pings are answered by warp.
    let Ok(text) = msg.to_str() else {
        return Ok(());
    };

    if !rate_limiter.try_acquire() {
        warn!(connection = %message_handler.connection_id(), "Rate limit exceeded");
        message_handler
            .reply(ServerMessage::error(
                GameError::RateLimitExceeded,
                "Too many messages",
            ))
            .await
            .map_err(anyhow::Error::msg)?;
        return Ok(());
    }

    let client_message: ClientMessage = serde_json::from_str(text)
        .map_err(|e| anyhow::anyhow!("Invalid JSON message: {}", e))?;

    message_handler
        .handle_message(client_message)
        .await
        .map_err(|e| anyhow::anyhow!("Message handling error: {}", e))
}
