//! Asynchronous abstraction for sourcing player intent.
//!
//! Clients plug in [`PlayerProvider`] implementations so an encounter can be
//! driven by human input, scripted fixtures or a simple heuristic.
use async_trait::async_trait;

use combat_core::{PhaseKind, UnitId};

use super::errors::Result;
use crate::session::{BattleSnapshot, Mutation};

/// The commands a player may issue once combat is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Draw(PhaseKind),
    Accept(PhaseKind),
    SelectTarget(UnitId),
}

impl From<PlayerCommand> for Mutation {
    fn from(command: PlayerCommand) -> Self {
        match command {
            PlayerCommand::Draw(phase) => Mutation::Draw(phase),
            PlayerCommand::Accept(phase) => Mutation::Accept(phase),
            PlayerCommand::SelectTarget(enemy) => Mutation::SelectTarget(enemy),
        }
    }
}

/// Decides the player's next command from a read-only snapshot.
///
/// Only called while the encounter is running and the session is idle.
#[async_trait]
pub trait PlayerProvider: Send + Sync {
    async fn decide(&self, snapshot: &BattleSnapshot) -> Result<PlayerCommand>;
}
