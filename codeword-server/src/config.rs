use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

use codeword_types::PlayerId;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` uses the word list compiled into the binary.
    pub words_directory: Option<String>,
    pub admin_player_ids: HashSet<PlayerId>,
    pub room_idle_timeout_minutes: u64,
    pub connection_timeout_seconds: u64,
    pub sync_max_retries: u32,
    pub rate_limit_tokens: u32,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            words_directory: env::var("WORDS_DIRECTORY").ok().filter(|dir| !dir.is_empty()),
            admin_player_ids: env::var("ADMIN_PLAYER_IDS")
                .map(|ids| parse_admin_ids(&ids))
                .unwrap_or_default(),
            room_idle_timeout_minutes: parse_var("ROOM_IDLE_TIMEOUT_MINUTES", 60),
            connection_timeout_seconds: parse_var("CONNECTION_TIMEOUT_SECONDS", 300),
            sync_max_retries: parse_var("SYNC_MAX_RETRIES", codeword_core::DEFAULT_MAX_RETRIES),
            rate_limit_tokens: parse_var("RATE_LIMIT_TOKENS", 30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// Comma separated player ids. Entries that are not UUIDs are skipped.
pub fn parse_admin_ids(raw: &str) -> HashSet<PlayerId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter_map(|id| match Uuid::parse_str(id) {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("Ignoring malformed admin id {:?}", id);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_ids_skips_garbage() {
        let id = Uuid::new_v4();
        let ids = parse_admin_ids(&format!(" {} , nope,,", id));
        assert_eq!(ids.len(), 1);
        assert!(ids.contains(&id));
    }

    #[test]
    fn test_parse_admin_ids_empty() {
        assert!(parse_admin_ids("").is_empty());
    }
}
