use std::sync::Arc;
use warp::Filter;

use crate::admin::AdminPolicy;
use crate::room_manager::RoomManager;
use crate::websocket::ConnectionManager;
use codeword_core::{RoomCode, SyncError};

pub mod admin;
pub mod config;
pub mod room_coordinator;
pub mod room_manager;
pub mod websocket;

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    room_manager: Arc<RoomManager>,
    admin_policy: Arc<AdminPolicy>,
    rate_limit_tokens: u32,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let room_manager_filter = warp::any().map({
        let room_manager = room_manager.clone();
        move || room_manager.clone()
    });

    let admin_filter = warp::any().map({
        let admin_policy = admin_policy.clone();
        move || admin_policy.clone()
    });

    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter)
        .and(room_manager_filter.clone())
        .and(admin_filter)
        .map(move |ws: warp::ws::Ws, conn_mgr, room_mgr, admins| {
            ws.on_upgrade(move |socket| {
                websocket::handle_connection(socket, conn_mgr, room_mgr, admins, rate_limit_tokens)
            })
        });

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // Read-only view with every unrevealed card type hidden
    let room_state = warp::path!("rooms" / String)
        .and(warp::get())
        .and(room_manager_filter)
        .and_then(handle_room_request);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET"]);

    websocket
        .or(health)
        .or(room_state)
        .with(cors)
        .with(warp::log("codeword"))
}

async fn handle_room_request(
    code: String,
    room_manager: Arc<RoomManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let code = match RoomCode::parse(&code) {
        Ok(code) => code,
        Err(_) => {
            return Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({
                    "error": "Invalid room code"
                })),
                warp::http::StatusCode::BAD_REQUEST,
            ));
        }
    };

    match room_manager.view(&code, None).await {
        Ok(view) => Ok(warp::reply::with_status(
            warp::reply::json(&view),
            warp::http::StatusCode::OK,
        )),
        Err(SyncError::RoomNotFound(_)) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({
                "error": "Room not found"
            })),
            warp::http::StatusCode::NOT_FOUND,
        )),
        Err(err) => {
            tracing::error!("Failed to read room {}: {}", code, err);
            Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({
                    "error": "Failed to read room"
                })),
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}
