//! One task per active room. Every action for a room is funnelled through
//! its coordinator so this process never races itself on a room; the
//! versioned write in the synchronizer still guards against other writers
//! sharing the same store.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use codeword_core::{DispatchOutcome, RoomAction, RoomCode, RoomStore, RoomSynchronizer, SyncError};
use codeword_types::PlayerId;

pub type SharedSynchronizer = Arc<RoomSynchronizer<dyn RoomStore>>;

#[derive(Debug)]
pub struct RoomCommand {
    pub actor: PlayerId,
    pub action: RoomAction,
    pub reply: oneshot::Sender<Result<DispatchOutcome, SyncError>>,
}

/// Cheap handle to a running coordinator. The task exits once every handle
/// has been dropped.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    commands: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub async fn dispatch(
        &self,
        actor: PlayerId,
        action: RoomAction,
    ) -> Result<DispatchOutcome, SyncError> {
        let (reply, response) = oneshot::channel();
        let command = RoomCommand {
            actor,
            action,
            reply,
        };
        if self.commands.send(command).is_err() {
            return Err(SyncError::RoomNotFound(self.code.clone()));
        }
        response
            .await
            .unwrap_or_else(|_| Err(SyncError::RoomNotFound(self.code.clone())))
    }
}

pub fn spawn_room_coordinator(
    code: RoomCode,
    synchronizer: SharedSynchronizer,
) -> (RoomHandle, JoinHandle<()>) {
    let (commands, command_rx) = mpsc::unbounded_channel();
    let handle = RoomHandle {
        code: code.clone(),
        commands,
    };
    let task = tokio::spawn(run_room_coordinator(code, synchronizer, command_rx));
    (handle, task)
}

async fn run_room_coordinator(
    code: RoomCode,
    synchronizer: SharedSynchronizer,
    mut command_rx: mpsc::UnboundedReceiver<RoomCommand>,
) {
    debug!(room = %code, "Room coordinator started");

    while let Some(command) = command_rx.recv().await {
        let result = synchronizer
            .dispatch(&code, command.actor, &command.action)
            .await;
        if let Err(e) = &result {
            warn!(room = %code, actor = %command.actor, action = command.action.name(), error = %e, "Dispatch failed");
        }
        // The requester may have gone away; the write already happened.
        let _ = command.reply.send(result);
    }

    debug!(room = %code, "Room coordinator stopped");
}
