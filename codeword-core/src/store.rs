use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;

use codeword_types::Room;

use crate::{PatchError, RoomCode, RoomPatch};

const SUBSCRIBER_BUFFER: usize = 64;

/// A full room document at a given version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub version: u64,
    pub room: Room,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("room {0} not found")]
    NotFound(RoomCode),
    #[error("room {0} already exists")]
    AlreadyExists(RoomCode),
    #[error("room {code} is at version {actual}, write was based on {expected}")]
    VersionConflict {
        code: RoomCode,
        expected: u64,
        actual: u64,
    },
    #[error(transparent)]
    InvalidPatch(#[from] PatchError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Shared key-value store holding one document per room code.
///
/// Writes are partial: only the paths named by the patch change. Every
/// successful write bumps the version and pushes the full snapshot to all
/// subscribers of that room.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn create(&self, code: &RoomCode, room: Room) -> Result<RoomSnapshot, StoreError>;

    async fn read(&self, code: &RoomCode) -> Result<Option<RoomSnapshot>, StoreError>;

    /// `expected_version: None` is last-write-wins; `Some(v)` only applies
    /// the patch if the stored room is still at version `v`.
    async fn write_fields(
        &self,
        code: &RoomCode,
        patch: &RoomPatch,
        expected_version: Option<u64>,
    ) -> Result<RoomSnapshot, StoreError>;

    async fn subscribe(
        &self,
        code: &RoomCode,
    ) -> Result<broadcast::Receiver<RoomSnapshot>, StoreError>;

    /// Returns whether a room was removed. Subscribers see their channel close.
    async fn delete(&self, code: &RoomCode) -> Result<bool, StoreError>;
}

struct Slot {
    room: Room,
    version: u64,
    notifier: broadcast::Sender<RoomSnapshot>,
}

impl Slot {
    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            version: self.version,
            room: self.room.clone(),
        }
    }
}

/// In-process store. Each room's slot is locked only for the duration of a
/// single read or write, never across an await.
#[derive(Default)]
pub struct MemoryStore {
    rooms: DashMap<RoomCode, Slot>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent create/write fail as if the backend were down.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("write rejected by backend".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn create(&self, code: &RoomCode, room: Room) -> Result<RoomSnapshot, StoreError> {
        self.check_available()?;
        match self.rooms.entry(code.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(code.clone())),
            Entry::Vacant(vacant) => {
                let (notifier, _) = broadcast::channel(SUBSCRIBER_BUFFER);
                let slot = vacant.insert(Slot {
                    room,
                    version: 1,
                    notifier,
                });
                Ok(slot.snapshot())
            }
        }
    }

    async fn read(&self, code: &RoomCode) -> Result<Option<RoomSnapshot>, StoreError> {
        Ok(self.rooms.get(code).map(|slot| slot.snapshot()))
    }

    async fn write_fields(
        &self,
        code: &RoomCode,
        patch: &RoomPatch,
        expected_version: Option<u64>,
    ) -> Result<RoomSnapshot, StoreError> {
        self.check_available()?;
        let mut slot = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| StoreError::NotFound(code.clone()))?;

        if let Some(expected) = expected_version {
            if slot.version != expected {
                return Err(StoreError::VersionConflict {
                    code: code.clone(),
                    expected,
                    actual: slot.version,
                });
            }
        }

        let mut next = slot.room.clone();
        patch.apply_to(&mut next)?;
        slot.room = next;
        slot.version += 1;

        let snapshot = slot.snapshot();
        // No subscribers is not an error.
        let _ = slot.notifier.send(snapshot.clone());
        Ok(snapshot)
    }

    async fn subscribe(
        &self,
        code: &RoomCode,
    ) -> Result<broadcast::Receiver<RoomSnapshot>, StoreError> {
        self.rooms
            .get(code)
            .map(|slot| slot.notifier.subscribe())
            .ok_or_else(|| StoreError::NotFound(code.clone()))
    }

    async fn delete(&self, code: &RoomCode) -> Result<bool, StoreError> {
        Ok(self.rooms.remove(code).is_some())
    }
}
