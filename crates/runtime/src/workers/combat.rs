//! Combat worker that owns the authoritative [`CombatSession`].
//!
//! Receives commands from [`crate::RuntimeHandle`] and runs them one at a
//! time. While a command is in flight the worker keeps draining its channel:
//! further mutations are rejected as busy and snapshot queries are answered
//! from the state captured when the command began. A shutdown that arrives
//! mid-command takes effect once that command has finished.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use combat_core::{CombatError, CombatEvent};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus};
use crate::session::{BattleSnapshot, CombatSession, Mutation};

/// Commands that can be sent to the combat worker
pub(crate) enum Command {
    /// Run a mutation to completion.
    Mutate {
        mutation: Mutation,
        reply: oneshot::Sender<Result<BattleSnapshot>>,
    },
    /// Query the current battle state (read-only).
    Snapshot {
        reply: oneshot::Sender<BattleSnapshot>,
    },
    /// Stop the worker even if other handles are still alive.
    Shutdown,
}

pub(crate) struct CombatWorker {
    session: CombatSession,
    command_rx: mpsc::Receiver<Command>,
}

impl CombatWorker {
    pub(crate) fn new(session: CombatSession, command_rx: mpsc::Receiver<Command>) -> Self {
        Self {
            session,
            command_rx,
        }
    }

    /// Main worker loop. Ends on [`Command::Shutdown`] or once every handle
    /// is dropped.
    pub(crate) async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                Command::Mutate { mutation, reply } => {
                    let (result, stopping) = self.mutate(mutation).await;
                    if reply.send(result).is_err() {
                        debug!(target: "runtime::worker", ?mutation, "reply channel closed (caller dropped)");
                    }
                    if stopping {
                        break;
                    }
                }
                Command::Snapshot { reply } => {
                    if reply.send(self.session.snapshot()).is_err() {
                        debug!(target: "runtime::worker", "snapshot reply channel closed (caller dropped)");
                    }
                }
                Command::Shutdown => break,
            }
        }
        info!(target: "runtime::worker", "combat worker stopped");
    }

    /// Runs `mutation`, answering other commands meanwhile. The flag reports
    /// whether a shutdown was requested while it ran.
    async fn mutate(&mut self, mutation: Mutation) -> (Result<BattleSnapshot>, bool) {
        let mut in_flight = self.session.snapshot();
        in_flight.busy = true;
        let bus = self.session.bus().clone();

        let Self {
            session,
            command_rx,
        } = self;
        let operation = session.apply(mutation);
        tokio::pin!(operation);

        let mut stopping = false;
        loop {
            tokio::select! {
                biased;
                result = &mut operation => return (result, stopping),
                Some(cmd) = command_rx.recv() => {
                    stopping |= reject_busy(cmd, &in_flight, &bus);
                }
            }
        }
    }
}

/// Answers `cmd` while a mutation runs. Returns true for a shutdown request.
fn reject_busy(cmd: Command, in_flight: &BattleSnapshot, bus: &EventBus) -> bool {
    match cmd {
        Command::Mutate { mutation, reply } => {
            let error = RuntimeError::Busy;
            debug!(target: "runtime::worker", ?mutation, "command rejected while busy");
            bus.publish(Event {
                turn: in_flight.turn,
                payload: CombatEvent::diagnostic(error.error_code(), error.to_string()),
            });
            let _ = reply.send(Err(error));
            false
        }
        Command::Snapshot { reply } => {
            let _ = reply.send(in_flight.clone());
            false
        }
        Command::Shutdown => {
            debug!(target: "runtime::worker", "shutdown deferred until the running command completes");
            true
        }
    }
}
