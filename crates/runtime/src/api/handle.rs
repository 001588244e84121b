//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for the
//! combat commands and for streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{Actor, PhaseKind, UnitId};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::session::{BattleSnapshot, Mutation};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Sends a mutation and waits until the worker has fully processed it.
    pub async fn apply(&self, mutation: Mutation) -> Result<BattleSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Mutate {
                mutation,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    pub async fn start_game(&self) -> Result<BattleSnapshot> {
        self.apply(Mutation::StartGame).await
    }

    pub async fn draw(&self, phase: PhaseKind) -> Result<BattleSnapshot> {
        self.apply(Mutation::Draw(phase)).await
    }

    pub async fn accept(&self, phase: PhaseKind) -> Result<BattleSnapshot> {
        self.apply(Mutation::Accept(phase)).await
    }

    pub async fn select_target(&self, enemy: UnitId) -> Result<BattleSnapshot> {
        self.apply(Mutation::SelectTarget(enemy)).await
    }

    pub async fn set_threshold(
        &self,
        actor: Actor,
        phase: PhaseKind,
        value: u32,
    ) -> Result<BattleSnapshot> {
        self.apply(Mutation::SetThreshold {
            actor,
            phase,
            value,
        })
        .await
    }

    /// Query the current battle state (read-only snapshot).
    ///
    /// Answered even while a command is running; `busy` is then set.
    pub async fn snapshot(&self) -> Result<BattleSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Asks the worker to stop after its current command.
    pub(crate) async fn request_shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut combat_rx = handle.subscribe(Topic::Combat);
    /// while let Ok(event) = combat_rx.recv().await {
    ///     // damage, blocks, game over
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to every event in publication order.
    pub fn subscribe_all(&self) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe_all()
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
