//! High-level runtime orchestrator.
//!
//! The runtime owns the combat worker, wires up the command and event
//! channels, and exposes a builder-based API for clients to drive an
//! encounter.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::{self, JoinHandle};
use tokio::time;
use tracing::{debug, info};

use combat_content::EncounterSetup;
use combat_core::{CombatError, Outcome};

use crate::animation::{AnimationBridge, InstantAnimationBridge};
use crate::api::{PlayerProvider, Result, RuntimeError, RuntimeHandle};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Topic};
use crate::session::CombatSession;
use crate::workers::{Command, CombatWorker};

/// Main runtime that orchestrates one encounter
///
/// Runtime owns the worker; [`RuntimeHandle`] provides a cloneable façade
/// for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    pub fn subscribe_all(&self) -> broadcast::Receiver<Event> {
        self.handle.subscribe_all()
    }

    /// Plays the encounter to the end with commands from `provider`.
    ///
    /// Starts combat if needed. Debounced and busy rejections are waited
    /// out; any other rejection ends the loop with that error.
    pub async fn play(&self, provider: &dyn PlayerProvider) -> Result<Outcome> {
        let mut snapshot = self.handle.snapshot().await?;
        if snapshot.turn == 0 {
            snapshot = self.handle.start_game().await?;
        }

        loop {
            if let Some(outcome) = snapshot.outcome {
                info!(target: "runtime", %outcome, turn = snapshot.turn, "encounter finished");
                return Ok(outcome);
            }

            let command = provider.decide(&snapshot).await?;
            match self.handle.apply(command.into()).await {
                Ok(next) => snapshot = next,
                Err(RuntimeError::Debounced { remaining }) => time::sleep(remaining).await,
                Err(e) if e.severity().is_recoverable() => {
                    debug!(target: "runtime", error = %e, "command deferred");
                    task::yield_now().await;
                    snapshot = self.handle.snapshot().await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Shutdown the runtime gracefully
    ///
    /// Stops the worker even while cloned handles are still held; their
    /// later commands fail with [`RuntimeError::CommandChannelClosed`].
    pub async fn shutdown(self) -> Result<()> {
        if let Err(e) = self.handle.request_shutdown().await {
            debug!(target: "runtime", error = %e, "worker already stopped");
        }
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    setup: Option<EncounterSetup>,
    bridge: Option<Arc<dyn AnimationBridge>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            setup: None,
            bridge: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the encounter to play (required)
    pub fn encounter(mut self, setup: EncounterSetup) -> Self {
        self.setup = Some(setup);
        self
    }

    /// Set the presentation bridge. Without one, attacks resolve instantly.
    pub fn animation_bridge(mut self, bridge: Arc<dyn AnimationBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Build the runtime and spawn its worker
    pub async fn build(self) -> Result<Runtime> {
        let setup = self.setup.ok_or(RuntimeError::MissingEncounter)?;
        let bridge = self
            .bridge
            .unwrap_or_else(|| Arc::new(InstantAnimationBridge));

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let session = CombatSession::from_setup(setup, &self.config, bridge, event_bus.clone())?;
        let worker = tokio::spawn(CombatWorker::new(session, command_rx).run());

        info!(
            target: "runtime",
            command_buffer = self.config.command_buffer_size,
            event_buffer = self.config.event_buffer_size,
            "runtime started"
        );

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, event_bus),
            worker,
        })
    }
}
