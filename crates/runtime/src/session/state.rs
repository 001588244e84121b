use rand::rngs::StdRng;
use tracing::debug;

use combat_core::{
    ActionQueue, BattleState, CombatContext, CombatError, CombatEvent, RelicManager, Step,
    TargetingController,
};

use crate::events::{Event, EventBus};

/// Everything one encounter mutates, owned by a single task.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) combat: CombatContext,
    pub(crate) battle: BattleState,
    pub(crate) relics: RelicManager,
    pub(crate) targeting: TargetingController,
    pub(crate) queue: ActionQueue,
    pub(crate) rng: StdRng,
}

impl SessionState {
    /// Publishes every event collected since the last flush.
    pub(crate) fn flush(&mut self, bus: &EventBus) {
        let turn = self.battle.turn;
        for payload in self.combat.drain_events() {
            bus.publish(Event { turn, payload });
        }
    }

    pub(crate) fn advance_step(&mut self) -> Step {
        let step = self.battle.advance();
        self.combat.emit(CombatEvent::StepChanged { step });
        debug!(target: "runtime::session", %step, turn = self.battle.turn, "step advanced");
        step
    }

    pub(crate) fn diagnose(&mut self, error: &dyn CombatError) {
        self.combat
            .emit(CombatEvent::diagnostic(error.error_code(), error.to_string()));
    }
}
