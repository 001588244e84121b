//! Async action queue runner.

use tokio::task;
use tracing::{debug, error, warn};

use combat_core::{ActionEnv, ActionError, ActionOutcome, CombatAction, CombatError};

use crate::events::EventBus;
use crate::session::SessionState;

pub(crate) type ActionResult = (CombatAction, Result<ActionOutcome, ActionError>);

/// Executes the pending actions in FIFO order.
///
/// Events are published after every action and the task yields once per
/// action. A failing action is reported as a diagnostic and the queue moves
/// on; actions are never retried.
pub(crate) async fn run_queue(state: &mut SessionState, bus: &EventBus) -> Vec<ActionResult> {
    let mut results = Vec::with_capacity(state.queue.len());

    while let Some(action) = state.queue.pop() {
        let result = {
            let mut env = ActionEnv {
                combat: &mut state.combat,
                battle: &state.battle,
                relics: &state.relics,
                rng: &mut state.rng,
            };
            action.execute(&mut env)
        };

        match &result {
            Ok(_) => debug!(target: "runtime::queue", action = ?action, "action executed"),
            Err(e) if e.severity().is_skippable() => {
                warn!(target: "runtime::queue", action = ?action, error = %e, "action skipped");
                state.diagnose(e);
            }
            Err(e) => {
                error!(target: "runtime::queue", action = ?action, error = %e, "action failed");
                state.diagnose(e);
            }
        }

        state.flush(bus);
        results.push((action, result));
        task::yield_now().await;
    }

    results
}
