//! Async driver that owns a [`LifeSession`] on a tokio task.
//!
//! Commands arrive over an mpsc channel and are applied one at a time, so the
//! state has a single writer. The armed arrival deadline races the command
//! queue inside `select!`; snapshots go out on a `watch` channel and events
//! on a `broadcast` channel.

use std::future;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::constants::LOG_TARGET;
use crate::engine::EngineCommand;
use crate::event::EngineEvent;
use crate::session::LifeSession;
use crate::state::GameState;

const COMMAND_QUEUE: usize = 32;
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("session task has stopped")]
    Closed,
}

/// Cloneable front door to a running session task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<EngineCommand>,
    snapshots: watch::Receiver<GameState>,
    events: broadcast::Sender<EngineEvent>,
}

impl SessionHandle {
    /// Queue a command for the session task.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Closed`] once the task has exited.
    pub async fn send(&self, command: EngineCommand) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DriverError::Closed)
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> GameState {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.snapshots.clone()
    }

    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

/// Spawn the session onto the current runtime.
///
/// The task ends when every handle is dropped and hands the session back
/// through the join handle.
#[must_use]
pub fn spawn(session: LifeSession) -> (SessionHandle, JoinHandle<LifeSession>) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.state().clone());
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
    let task = tokio::spawn(run(session, command_rx, snapshot_tx, event_tx.clone()));
    let handle = SessionHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        events: event_tx,
    };
    (handle, task)
}

async fn arrival_due(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(due) => sleep_until(Instant::from_std(due)).await,
        None => future::pending().await,
    }
}

async fn run(
    mut session: LifeSession,
    mut commands: mpsc::Receiver<EngineCommand>,
    snapshots: watch::Sender<GameState>,
    events: broadcast::Sender<EngineEvent>,
) -> LifeSession {
    loop {
        let deadline = session.next_deadline();
        let emitted = tokio::select! {
            command = commands.recv() => match command {
                Some(command) => session.dispatch(command, Instant::now().into_std()),
                None => break,
            },
            () = arrival_due(deadline) => session.poll(Instant::now().into_std()),
        };
        if emitted.is_empty() {
            continue;
        }
        snapshots.send_replace(session.state().clone());
        for event in emitted {
            // No subscribers is fine.
            let _ = events.send(event);
        }
    }
    log::debug!(target: LOG_TARGET, "session task stopping on day {}", session.state().day);
    session
}
