//! Player phase controller.

use tracing::info;

use combat_core::{
    Actor, ActionOutcome, CombatAction, CombatEvent, PhaseKind, PhaseReport, Step, UnitId,
};

use super::runner::run_queue;
use crate::events::EventBus;
use crate::session::SessionState;

/// Runs the player's draw and accept commands for the open phase.
///
/// After each command the accumulator is inspected: a busted phase locks a
/// zero total, a standing phase locks the relic-adjusted total, and either
/// one advances the step. Leaving `PlayerAtk` enters target mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerPhaseController;

impl PlayerPhaseController {
    pub(crate) async fn draw(
        &self,
        state: &mut SessionState,
        bus: &EventBus,
        phase: PhaseKind,
    ) -> Option<PhaseReport> {
        self.run(
            state,
            bus,
            CombatAction::Draw {
                actor: Actor::Player,
                phase,
            },
        )
        .await
    }

    pub(crate) async fn accept(
        &self,
        state: &mut SessionState,
        bus: &EventBus,
        phase: PhaseKind,
    ) -> Option<PhaseReport> {
        self.run(
            state,
            bus,
            CombatAction::Stand {
                actor: Actor::Player,
                phase,
            },
        )
        .await
    }

    async fn run(
        &self,
        state: &mut SessionState,
        bus: &EventBus,
        action: CombatAction,
    ) -> Option<PhaseReport> {
        state.queue.enqueue(action);
        let report = run_queue(state, bus)
            .await
            .into_iter()
            .rev()
            .find_map(|(_, result)| match result {
                Ok(ActionOutcome::Phase(report)) => Some(report),
                _ => None,
            });

        if let Some(report) = &report
            && report.is_terminal()
        {
            self.lock(state, report);
        }
        state.flush(bus);
        report
    }

    fn lock(&self, state: &mut SessionState, report: &PhaseReport) {
        let total = match (report.busted, report.phase) {
            (true, _) => 0,
            (false, PhaseKind::Attack) => state.relics.attack_value(report.total),
            (false, PhaseKind::Defense) => state.relics.defense_value(report.total),
        };

        state.battle.lock_player_total(report.phase, total);
        state.combat.emit(CombatEvent::TotalLocked {
            actor: Actor::Player,
            unit: UnitId::PLAYER,
            phase: report.phase,
            total,
            busted: report.busted,
        });
        info!(
            target: "runtime::player",
            phase = %report.phase,
            raw = report.total,
            total,
            busted = report.busted,
            "player total locked"
        );

        if state.advance_step() == Step::SelectTarget {
            state
                .targeting
                .begin_target_mode(&mut state.combat, &mut state.battle);
        }
    }
}
