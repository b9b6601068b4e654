use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use codeword_core::Vocabulary;
use codeword_server::{
    admin::AdminPolicy, config::Config, create_routes, room_manager::RoomManager,
    websocket::ConnectionManager,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    info!("Starting Codeword server...");

    let config = Config::new();
    let connection_manager = Arc::new(ConnectionManager::new());

    let room_manager = match &config.words_directory {
        Some(words_dir) => {
            info!("Loading words from directory: {}", words_dir);
            match RoomManager::from_words_directory(words_dir, config.sync_max_retries) {
                Ok(rm) => Arc::new(rm),
                Err(e) => {
                    tracing::error!("Failed to load words from directory '{}': {}", words_dir, e);
                    tracing::error!(
                        "Unset WORDS_DIRECTORY to use the built-in list, or point it at a directory of .txt word files."
                    );
                    std::process::exit(1);
                }
            }
        }
        None => {
            let vocabulary = Vocabulary::builtin();
            info!("Using built-in word list ({} words)", vocabulary.len());
            Arc::new(RoomManager::with_vocabulary(vocabulary, config.sync_max_retries))
        }
    };

    if config.admin_player_ids.is_empty() {
        info!("No administrators configured");
    }
    let admin_policy = Arc::new(AdminPolicy::new(config.admin_player_ids.clone()));

    let routes = create_routes(
        connection_manager.clone(),
        room_manager.clone(),
        admin_policy,
        config.rate_limit_tokens,
    );

    let cleanup_connection_manager = connection_manager.clone();
    let cleanup_room_manager = room_manager.clone();
    let connection_timeout = Duration::from_secs(config.connection_timeout_seconds);
    let room_timeout = Duration::from_secs(config.room_idle_timeout_minutes * 60);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;

            let dropped = cleanup_connection_manager
                .cleanup_inactive_connections(connection_timeout)
                .await;
            for conn in dropped {
                if let (Some(player_id), Some(code)) = (conn.player_id, conn.room_code) {
                    cleanup_room_manager.mark_offline(&code, player_id).await;
                }
            }

            let removed = cleanup_room_manager
                .cleanup_abandoned_rooms(room_timeout)
                .await;
            if !removed.is_empty() {
                info!("Cleaned up {} abandoned rooms", removed.len());
            }
        }
    });

    let host: std::net::IpAddr = match config.host.parse() {
        Ok(host) => host,
        Err(e) => {
            tracing::error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    info!("Server starting on {}:{}", host, config.port);

    let (addr, server) =
        warp::serve(routes).bind_with_graceful_shutdown((host, config.port), shutdown_signal());

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let (mut sigint, mut sigterm) = match (
            signal::unix::signal(signal::unix::SignalKind::interrupt()),
            signal::unix::signal(signal::unix::SignalKind::terminate()),
        ) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            _ => {
                tracing::error!("Failed to install signal handlers");
                return std::future::pending().await;
            }
        };

        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }
}
