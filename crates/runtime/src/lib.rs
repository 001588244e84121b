//! Async orchestration for the combat engine.
//!
//! This crate wires the deterministic `combat-core` rules into a running
//! encounter: a single worker task owns the [`CombatSession`], clients talk to
//! it through [`RuntimeHandle`], and every state change is published on the
//! topic-based [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`session`] owns the combat state and the command surface
//! - [`controllers`] drive the player, enemy and resolution phases
//! - [`animation`] bridges resolution to an external presentation layer
//! - [`oracle`] provides in-memory tuning and deck providers
//! - [`config`] holds pacing, buffer and seed settings
pub mod animation;
pub mod api;
pub mod config;
pub mod controllers;
pub mod events;
pub mod oracle;
pub mod runtime;
pub mod session;

mod workers;

pub use animation::{
    AnimationAck, AnimationBridge, AnimationReport, AnimationTicket, AttackRequest,
    InstantAnimationBridge,
};
pub use api::{PlayerCommand, PlayerProvider, Result, RuntimeError, RuntimeHandle};
pub use config::{PacingConfig, RuntimeConfig};
pub use events::{Event, EventBus, Topic};
pub use oracle::{OracleManager, StaticDeckOracle, StaticTuningOracle};
pub use runtime::{Runtime, RuntimeBuilder};
pub use session::{BattleSnapshot, CombatSession, EnemyView, Mutation, RelicView};
