//! Enemy phase controller.

use std::sync::Arc;

use tokio::time;
use tracing::{debug, info};

use combat_core::{
    Actor, CombatAction, CombatEvent, EnemyPolicy, EnemyTuningOracle, PhaseKind, UnitId,
};

use super::runner::run_queue;
use crate::config::PacingConfig;
use crate::events::EventBus;
use crate::session::SessionState;

/// Pre-computes both enemy phases for the round.
///
/// Defense first, then Attack; within a phase, living enemies in spawn
/// order. Each enemy is bound to the `Enemy` actor in turn and driven by its
/// [`EnemyPolicy`], pausing a random delay after every draw.
pub struct EnemyPhaseController {
    tuning: Arc<dyn EnemyTuningOracle>,
    pacing: PacingConfig,
}

impl EnemyPhaseController {
    pub fn new(tuning: Arc<dyn EnemyTuningOracle>, pacing: PacingConfig) -> Self {
        Self { tuning, pacing }
    }

    pub(crate) async fn run(&self, state: &mut SessionState, bus: &EventBus) {
        for phase in [PhaseKind::Defense, PhaseKind::Attack] {
            for enemy in state.combat.living_enemy_ids() {
                self.run_enemy(state, bus, enemy, phase).await;
            }
        }
        info!(
            target: "runtime::enemy",
            turn = state.battle.turn,
            enemies = state.battle.enemy_totals.len(),
            "enemy totals locked"
        );
    }

    async fn run_enemy(
        &self,
        state: &mut SessionState,
        bus: &EventBus,
        enemy: UnitId,
        phase: PhaseKind,
    ) {
        if !state.combat.bind_enemy(enemy) {
            return;
        }
        state
            .combat
            .emit(CombatEvent::EnemyPhaseStarted { enemy, phase });
        state.flush(bus);

        let threshold = state
            .combat
            .effective_threshold(Actor::Enemy, phase, &state.relics);
        let policy = EnemyPolicy::new(&self.tuning.tuning(enemy), phase, threshold);
        let mut steps = policy.enumerate(phase);

        while let Some(action) = steps.next_action(&state.combat) {
            state.queue.enqueue(action);
            let failed = run_queue(state, bus)
                .await
                .iter()
                .any(|(_, result)| result.is_err());
            if failed {
                // Nothing to draw from; close the phase with what it has.
                state.queue.enqueue(CombatAction::Stand {
                    actor: Actor::Enemy,
                    phase,
                });
                run_queue(state, bus).await;
                break;
            }

            if matches!(action, CombatAction::Draw { .. }) {
                let delay = self.pacing.enemy_draw_delay(&mut state.rng);
                if !delay.is_zero() {
                    time::sleep(delay).await;
                }
            }
        }

        let acc = state.combat.accumulator(Actor::Enemy, phase);
        let (total, busted) = (acc.total(), acc.is_busted());
        state.battle.lock_enemy_total(enemy, phase, total);
        state.combat.emit(CombatEvent::TotalLocked {
            actor: Actor::Enemy,
            unit: enemy,
            phase,
            total,
            busted,
        });
        state
            .combat
            .emit(CombatEvent::EnemyPhaseEnded { enemy, phase, total });
        state.flush(bus);

        debug!(
            target: "runtime::enemy",
            %enemy,
            %phase,
            total,
            busted,
            threshold = threshold.get(),
            steps = steps.steps(),
            "enemy phase ended"
        );
    }
}

impl std::fmt::Debug for EnemyPhaseController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnemyPhaseController")
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}
