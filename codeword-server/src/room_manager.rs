use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use crate::room_coordinator::{RoomHandle, SharedSynchronizer, spawn_room_coordinator};
use codeword_core::{
    DispatchOutcome, MemoryStore, RoomAction, RoomCode, RoomSnapshot, RoomStore, RoomSynchronizer,
    SyncError, Vocabulary, VocabularyError, room_view,
};
use codeword_types::{PlayerId, Room, RoomView};

/// Owns the synchronizer and one coordinator per room this process has
/// touched.
pub struct RoomManager {
    synchronizer: SharedSynchronizer,
    coordinators: RwLock<HashMap<RoomCode, RoomHandle>>,
}

impl RoomManager {
    pub fn new(synchronizer: SharedSynchronizer) -> Self {
        Self {
            synchronizer,
            coordinators: RwLock::new(HashMap::new()),
        }
    }

    /// In-memory store with the given word list.
    pub fn with_vocabulary(vocabulary: Vocabulary, max_retries: u32) -> Self {
        let store: Arc<dyn RoomStore> = Arc::new(MemoryStore::new());
        let synchronizer =
            RoomSynchronizer::new(store, Arc::new(vocabulary)).with_max_retries(max_retries);
        Self::new(Arc::new(synchronizer))
    }

    /// Load word lists from a directory of `.txt` files.
    pub fn from_words_directory<P: AsRef<Path>>(
        words_dir: P,
        max_retries: u32,
    ) -> Result<Self, VocabularyError> {
        let vocabulary = Vocabulary::from_directory(words_dir)?;
        info!("Loaded {} words", vocabulary.len());
        Ok(Self::with_vocabulary(vocabulary, max_retries))
    }

    pub fn synchronizer(&self) -> &SharedSynchronizer {
        &self.synchronizer
    }

    pub async fn create_room(
        &self,
        host: PlayerId,
        display_name: &str,
        avatar: Option<String>,
    ) -> Result<(RoomCode, RoomSnapshot), SyncError> {
        let (code, snapshot) = self
            .synchronizer
            .create_room(host, display_name, avatar)
            .await?;
        self.handle_for(&code).await;
        Ok((code, snapshot))
    }

    pub async fn dispatch(
        &self,
        code: &RoomCode,
        actor: PlayerId,
        action: RoomAction,
    ) -> Result<DispatchOutcome, SyncError> {
        let handle = self.handle_for(code).await;
        handle.dispatch(actor, action).await
    }

    pub async fn snapshot(&self, code: &RoomCode) -> Result<RoomSnapshot, SyncError> {
        self.synchronizer.snapshot(code).await
    }

    pub async fn get_room(&self, code: &RoomCode) -> Option<Room> {
        self.snapshot(code).await.ok().map(|snapshot| snapshot.room)
    }

    pub async fn view(
        &self,
        code: &RoomCode,
        viewer: Option<PlayerId>,
    ) -> Result<RoomView, SyncError> {
        let snapshot = self.snapshot(code).await?;
        Ok(room_view(&snapshot.room, snapshot.version, viewer))
    }

    pub async fn subscribe(
        &self,
        code: &RoomCode,
    ) -> Result<broadcast::Receiver<RoomSnapshot>, SyncError> {
        self.synchronizer.subscribe(code).await
    }

    pub async fn delete_room(&self, code: &RoomCode) -> Result<(), SyncError> {
        self.coordinators.write().await.remove(code);
        self.synchronizer.delete_room(code).await
    }

    pub async fn mark_offline(&self, code: &RoomCode, player_id: PlayerId) {
        match self
            .dispatch(code, player_id, RoomAction::UpdatePresence { online: false })
            .await
        {
            Ok(_) => info!(room = %code, player = %player_id, "Player went offline"),
            Err(e) => warn!(room = %code, player = %player_id, error = %e, "Failed to mark player offline"),
        }
    }

    /// Remove rooms where nobody is online and nobody has been seen for
    /// longer than `timeout`. Returns the codes removed.
    pub async fn cleanup_abandoned_rooms(&self, timeout: Duration) -> Vec<RoomCode> {
        let codes: Vec<RoomCode> = {
            let coordinators = self.coordinators.read().await;
            coordinators.keys().cloned().collect()
        };

        let mut removed = Vec::new();
        for code in codes {
            match self.synchronizer.snapshot(&code).await {
                Ok(snapshot) if is_abandoned(&snapshot.room, timeout) => {
                    if self.delete_room(&code).await.is_ok() {
                        info!(room = %code, "Removed abandoned room");
                        removed.push(code);
                    }
                }
                Ok(_) => {}
                Err(SyncError::RoomNotFound(_)) => {
                    self.coordinators.write().await.remove(&code);
                }
                Err(e) => warn!(room = %code, error = %e, "Could not inspect room during cleanup"),
            }
        }
        removed
    }

    pub async fn room_count(&self) -> usize {
        self.coordinators.read().await.len()
    }

    async fn handle_for(&self, code: &RoomCode) -> RoomHandle {
        if let Some(handle) = self.coordinators.read().await.get(code) {
            return handle.clone();
        }

        let mut coordinators = self.coordinators.write().await;
        coordinators
            .entry(code.clone())
            .or_insert_with(|| spawn_room_coordinator(code.clone(), self.synchronizer.clone()).0)
            .clone()
    }
}

fn is_abandoned(room: &Room, timeout: Duration) -> bool {
    let now = chrono::Utc::now();
    room.players.values().all(|player| {
        if player.online {
            return false;
        }
        match chrono::DateTime::parse_from_rfc3339(&player.last_seen) {
            Ok(seen) => now
                .signed_duration_since(seen)
                .to_std()
                .map(|idle| idle > timeout)
                .unwrap_or(false),
            Err(_) => true,
        }
    })
}
