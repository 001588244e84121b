//! Scripted player policy.

use async_trait::async_trait;

use runtime::{BattleSnapshot, PlayerCommand, PlayerProvider, RuntimeError};

/// Draws until the phase total is within `stand_margin` of its threshold,
/// then accepts. Always targets the living enemy with the least HP.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedPlayer {
    pub stand_margin: u32,
}

impl Default for ScriptedPlayer {
    fn default() -> Self {
        Self { stand_margin: 4 }
    }
}

#[async_trait]
impl PlayerProvider for ScriptedPlayer {
    async fn decide(&self, snapshot: &BattleSnapshot) -> runtime::Result<PlayerCommand> {
        if let Some(phase) = snapshot.open_phase() {
            let total = snapshot.accumulator(phase).total();
            let target = snapshot.threshold(phase).saturating_sub(self.stand_margin);
            return Ok(if total >= target {
                PlayerCommand::Accept(phase)
            } else {
                PlayerCommand::Draw(phase)
            });
        }

        snapshot
            .living_enemies()
            .min_by_key(|enemy| (enemy.unit.hp, enemy.unit.id))
            .map(|enemy| PlayerCommand::SelectTarget(enemy.unit.id))
            .ok_or(RuntimeError::InvalidEncounter {
                reason: "no living enemy to target".to_owned(),
            })
    }
}
