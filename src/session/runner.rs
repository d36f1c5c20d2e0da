use super::outcome::CallOutcome;
use super::session::CallSession;
use super::transcript::CallSnapshot;
use crate::voice::VoiceEvent;
use std::future::Future;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Requests from the caller to a running call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallCommand {
    Disconnect,
}

/// Handle to a call driven by its own task
pub struct RunningCall {
    commands: mpsc::Sender<CallCommand>,
    snapshot: watch::Receiver<CallSnapshot>,
    task: JoinHandle<Option<CallOutcome>>,
}

impl RunningCall {
    /// Drive a started session on a new task
    pub fn spawn(session: CallSession) -> Self {
        let (commands, command_rx) = mpsc::channel(8);
        let (updates, snapshot) = watch::channel(session.snapshot());
        let task = tokio::spawn(run(session, command_rx, updates));

        Self {
            commands,
            snapshot,
            task,
        }
    }

    /// Latest published state
    pub fn snapshot(&self) -> CallSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that sees every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<CallSnapshot> {
        self.snapshot.clone()
    }

    /// Ask the call to hang up; a no-op once it has finished
    ///
    /// Never waits: while the runner is busy dispatching, repeated requests
    /// collapse into the ones already queued.
    pub fn disconnect(&self) {
        match self.commands.try_send(CallCommand::Disconnect) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("Disconnect already pending"),
            Err(TrySendError::Closed(_)) => info!("Call already finished"),
        }
    }

    /// Resolves with the final snapshot once the event loop has stopped
    pub fn closed(&self) -> impl Future<Output = CallSnapshot> + Send + 'static {
        let mut updates = self.snapshot.clone();
        async move {
            while updates.changed().await.is_ok() {}
            let last = updates.borrow().clone();
            last
        }
    }

    /// Wait for the call to end and return its outcome
    pub async fn join(self) -> Option<CallOutcome> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Call task failed: {}", e);
                None
            }
        }
    }
}

/// Event loop for one call session
///
/// Returns the dispatched outcome, or `None` when the call fell back to
/// `Idle` without ever finishing.
pub async fn run(
    mut session: CallSession,
    mut commands: mpsc::Receiver<CallCommand>,
    updates: watch::Sender<CallSnapshot>,
) -> Option<CallOutcome> {
    info!("Call {} event loop started", session.call_id());

    while session.status().is_live() {
        let outcome = tokio::select! {
            event = session.next_event() => match event {
                Some(event) => session.handle_event(event).await,
                None => {
                    warn!("Voice events for {} closed without call end", session.call_id());
                    session.handle_event(VoiceEvent::Ended).await
                }
            },
            command = commands.recv() => match command {
                Some(CallCommand::Disconnect) => session.disconnect().await,
                // Every handle is gone, nobody can hang up any more
                None => session.disconnect().await,
            },
        };

        updates.send_replace(session.snapshot());

        if outcome.is_some() {
            break;
        }
    }

    info!(
        "Call {} event loop stopped ({})",
        session.call_id(),
        session.status()
    );
    updates.send_replace(session.snapshot());
    session.outcome().cloned()
}
