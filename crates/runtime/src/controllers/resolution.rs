//! Resolution controller.

use std::sync::Arc;

use tokio::time;
use tracing::{debug, info};

use combat_core::resolution::{apply_strike, evaluate_outcome};
use combat_core::{
    ActionOutcome, CombatAction, CombatEvent, LifecycleHook, Outcome, ResolutionPlan, UnitId,
};

use super::runner::run_queue;
use crate::animation::{self, AnimationBridge, AttackRequest};
use crate::config::PacingConfig;
use crate::events::EventBus;
use crate::session::SessionState;

/// Applies the round's damage in a fixed order and checks for the end.
///
/// The player strikes the selected target first. Every remaining living
/// enemy then attacks against a shared, depleting block pool. HP only
/// changes at animation impact.
pub struct ResolutionController {
    bridge: Arc<dyn AnimationBridge>,
    pacing: PacingConfig,
}

impl ResolutionController {
    pub fn new(bridge: Arc<dyn AnimationBridge>, pacing: PacingConfig) -> Self {
        Self { bridge, pacing }
    }

    /// Resolves the round. Returns the outcome when the encounter ended;
    /// otherwise the round is closed and the caller starts the next turn.
    pub(crate) async fn resolve(
        &self,
        state: &mut SessionState,
        bus: &EventBus,
    ) -> Option<Outcome> {
        state.queue.enqueue(CombatAction::Resolve);
        let plan = run_queue(state, bus)
            .await
            .into_iter()
            .find_map(|(_, result)| match result {
                Ok(ActionOutcome::Resolution(plan)) => Some(plan),
                _ => None,
            })
            .unwrap_or_default();

        self.apply(state, bus, &plan).await;

        let turn = state.battle.turn;
        if let Some(outcome) = evaluate_outcome(&state.combat) {
            state.battle.outcome = Some(outcome);
            state.combat.emit(CombatEvent::GameOver { outcome });
            state.flush(bus);
            info!(target: "runtime::resolution", turn, %outcome, "combat over");
            return Some(outcome);
        }

        state.battle.clear_attack_values();
        state
            .relics
            .notify(&LifecycleHook::TurnEnd { turn }, Some(&mut state.combat));
        state.combat.emit(CombatEvent::RoundResolved { turn });
        state.flush(bus);
        info!(
            target: "runtime::resolution",
            turn,
            player_hp = state.combat.player().hp,
            "round resolved"
        );
        None
    }

    async fn apply(&self, state: &mut SessionState, bus: &EventBus, plan: &ResolutionPlan) {
        match plan.player_strike {
            Some(strike) => {
                self.strike(state, bus, UnitId::PLAYER, strike.target, strike.damage)
                    .await;
            }
            None => debug!(target: "runtime::resolution", "no living target, player strike skipped"),
        }

        let last = plan.enemy_strikes.len().saturating_sub(1);
        for (index, strike) in plan.enemy_strikes.iter().enumerate() {
            self.strike(state, bus, strike.enemy, UnitId::PLAYER, strike.damage)
                .await;
            if index < last && !self.pacing.inter_enemy_delay.is_zero() {
                time::sleep(self.pacing.inter_enemy_delay).await;
            }
        }
    }

    async fn strike(
        &self,
        state: &mut SessionState,
        bus: &EventBus,
        attacker: UnitId,
        defender: UnitId,
        damage: u32,
    ) {
        let request = AttackRequest {
            attacker,
            defender,
            damage,
        };
        let combat = &mut state.combat;
        animation::play_attack(
            self.bridge.as_ref(),
            request,
            self.pacing.animation_timeout,
            || {
                if damage == 0 {
                    debug!(target: "runtime::resolution", %attacker, %defender, "blocked");
                }
                apply_strike(combat, attacker, defender, damage);
            },
        )
        .await;
        state.flush(bus);
    }
}

impl std::fmt::Debug for ResolutionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionController")
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}
