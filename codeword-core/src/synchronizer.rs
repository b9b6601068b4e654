use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use codeword_types::{Player, PlayerId, Room};

use crate::{
    ActionRejected, RoomAction, RoomCode, RoomSnapshot, RoomStore, StoreError, Vocabulary, plan,
};

pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// How writes are checked against concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Compare-and-swap on the snapshot version; stale writes are re-planned.
    #[default]
    Versioned,
    /// Blind partial writes; the last writer of a field wins.
    LastWriteWins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied(RoomSnapshot),
    /// The action was valid but changed nothing.
    Unchanged,
    /// The action was not valid in the current state and was dropped.
    Ignored(ActionRejected),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),
    #[error("write to room {code} failed: {message}")]
    WriteFailed {
        code: RoomCode,
        message: String,
    },
    #[error("room {code} kept changing underneath the write, gave up after {attempts} attempts")]
    Contention {
        code: RoomCode,
        attempts: u32,
    },
}

/// Turns room actions into partial writes against a shared store and hands
/// out full snapshots to subscribers.
pub struct RoomSynchronizer<S: RoomStore + ?Sized> {
    store: Arc<S>,
    vocabulary: Arc<Vocabulary>,
    rng: Mutex<ChaCha8Rng>,
    max_retries: u32,
    write_mode: WriteMode,
}

impl<S: RoomStore + ?Sized> RoomSynchronizer<S> {
    pub fn new(store: Arc<S>, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            store,
            vocabulary,
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
            max_retries: DEFAULT_MAX_RETRIES,
            write_mode: WriteMode::default(),
        }
    }

    /// Reproducible boards and room codes.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(ChaCha8Rng::seed_from_u64(seed));
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn create_room(
        &self,
        host: PlayerId,
        display_name: &str,
        avatar: Option<String>,
    ) -> Result<(RoomCode, RoomSnapshot), SyncError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let code = RoomCode::generate(&mut *self.rng());
            let player = Player::new(
                host,
                display_name.to_string(),
                avatar.clone(),
                chrono::Utc::now().to_rfc3339(),
            );
            let room = Room::new(code.to_string(), player);

            match self.store.create(&code, room).await {
                Ok(snapshot) => {
                    info!(room = %code, host = %host, "Created room");
                    return Ok((code, snapshot));
                }
                Err(StoreError::AlreadyExists(_)) if attempts <= self.max_retries => continue,
                Err(StoreError::AlreadyExists(_)) => {
                    return Err(SyncError::Contention { code, attempts });
                }
                Err(e) => return Err(write_failed(&code, e)),
            }
        }
    }

    /// Apply one action on behalf of `actor`, re-planning from a fresh
    /// snapshot whenever the versioned write loses a race.
    pub async fn dispatch(
        &self,
        code: &RoomCode,
        actor: PlayerId,
        action: &RoomAction,
    ) -> Result<DispatchOutcome, SyncError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let snapshot = self.snapshot(code).await?;

            let planned = {
                let mut rng = self.rng();
                plan(&snapshot.room, actor, action, &self.vocabulary, &mut *rng)
            };
            let patch = match planned {
                Ok(patch) => patch,
                Err(rejected) => {
                    debug!(room = %code, actor = %actor, action = action.name(), reason = %rejected, "Ignoring action");
                    return Ok(DispatchOutcome::Ignored(rejected));
                }
            };
            if patch.is_empty() {
                return Ok(DispatchOutcome::Unchanged);
            }

            let expected = match self.write_mode {
                WriteMode::Versioned => Some(snapshot.version),
                WriteMode::LastWriteWins => None,
            };

            match self.store.write_fields(code, &patch, expected).await {
                Ok(written) => {
                    debug!(room = %code, actor = %actor, action = action.name(), version = written.version, "Applied action");
                    return Ok(DispatchOutcome::Applied(written));
                }
                Err(StoreError::VersionConflict { actual, .. }) if attempts <= self.max_retries => {
                    debug!(room = %code, action = action.name(), based_on = snapshot.version, actual, "Stale snapshot, re-planning");
                }
                Err(StoreError::VersionConflict { .. }) => {
                    warn!(room = %code, action = action.name(), attempts, "Giving up after repeated conflicts");
                    return Err(SyncError::Contention {
                        code: code.clone(),
                        attempts,
                    });
                }
                Err(StoreError::NotFound(_)) => return Err(SyncError::RoomNotFound(code.clone())),
                Err(e) => {
                    warn!(room = %code, action = action.name(), error = %e, "Write failed");
                    return Err(write_failed(code, e));
                }
            }
        }
    }

    pub async fn snapshot(&self, code: &RoomCode) -> Result<RoomSnapshot, SyncError> {
        match self.store.read(code).await {
            Ok(Some(snapshot)) => Ok(snapshot),
            Ok(None) => Err(SyncError::RoomNotFound(code.clone())),
            Err(e) => Err(write_failed(code, e)),
        }
    }

    pub async fn subscribe(
        &self,
        code: &RoomCode,
    ) -> Result<broadcast::Receiver<RoomSnapshot>, SyncError> {
        self.store.subscribe(code).await.map_err(|e| match e {
            StoreError::NotFound(_) => SyncError::RoomNotFound(code.clone()),
            e => write_failed(code, e),
        })
    }

    pub async fn delete_room(&self, code: &RoomCode) -> Result<(), SyncError> {
        match self.store.delete(code).await {
            Ok(true) => {
                info!(room = %code, "Deleted room");
                Ok(())
            }
            Ok(false) => Err(SyncError::RoomNotFound(code.clone())),
            Err(e) => Err(write_failed(code, e)),
        }
    }

    fn rng(&self) -> MutexGuard<'_, ChaCha8Rng> {
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn write_failed(code: &RoomCode, error: StoreError) -> SyncError {
    SyncError::WriteFailed {
        code: code.clone(),
        message: error.to_string(),
    }
}
