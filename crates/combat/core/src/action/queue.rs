use std::collections::VecDeque;

use super::{ActionEnv, ActionError, ActionOutcome, CombatAction};

/// Strict FIFO of pending actions.
///
/// The queue itself never suspends. Async runners pop one action at a time
/// and yield between them; [`ActionQueue::run_to_completion`] is the
/// synchronous equivalent.
#[derive(Clone, Debug, Default)]
pub struct ActionQueue {
    pending: VecDeque<CombatAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, action: CombatAction) {
        self.pending.push_back(action);
    }

    pub fn pop(&mut self) -> Option<CombatAction> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Executes every pending action in order, collecting each result.
    pub fn run_to_completion(
        &mut self,
        env: &mut ActionEnv<'_>,
    ) -> Vec<(CombatAction, Result<ActionOutcome, ActionError>)> {
        let mut results = Vec::with_capacity(self.pending.len());
        while let Some(action) = self.pop() {
            results.push((action, action.execute(env)));
        }
        results
    }
}
