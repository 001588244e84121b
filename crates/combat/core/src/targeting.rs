//! Target acquisition sub-state-machine.
//!
//! ```text
//! Idle ──begin──► Selected { auto: true }      (exactly one living enemy)
//!   │
//!   └──begin──► WaitingForTarget ──try_select──► Selected { auto: false }
//!
//! any ──cancel──► Idle
//! ```

use tracing::debug;

use crate::error::{CombatError, ErrorSeverity};
use crate::event::CombatEvent;
use crate::state::{BattleState, CombatContext, Step, UnitId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetingState {
    #[default]
    Idle,
    WaitingForTarget,
    Selected { target: UnitId, auto: bool },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TargetingError {
    #[error("targeting is only possible during SelectTarget, current step is {step}")]
    WrongStep { step: Step },

    #[error("not waiting for a target")]
    NotWaiting,

    #[error("{enemy} is not a known enemy")]
    UnknownEnemy { enemy: UnitId },

    #[error("{enemy} is already dead")]
    DeadEnemy { enemy: UnitId },
}

impl CombatError for TargetingError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotWaiting => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::WrongStep { .. } => "TARGET_WRONG_STEP",
            Self::NotWaiting => "TARGET_NOT_WAITING",
            Self::UnknownEnemy { .. } => "TARGET_UNKNOWN_ENEMY",
            Self::DeadEnemy { .. } => "TARGET_DEAD_ENEMY",
        }
    }
}

/// Owns the targeting state and mirrors it into [`BattleState`].
#[derive(Clone, Debug, Default)]
pub struct TargetingController {
    state: TargetingState,
}

impl TargetingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TargetingState {
        self.state
    }

    pub fn selected(&self) -> Option<UnitId> {
        match self.state {
            TargetingState::Selected { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Entered with the battle step at `SelectTarget`.
    ///
    /// Auto-selects a lone living enemy; otherwise waits for
    /// [`TargetingController::try_select_target`].
    pub fn begin_target_mode(
        &mut self,
        combat: &mut CombatContext,
        battle: &mut BattleState,
    ) -> TargetingState {
        let living = combat.living_enemy_ids();
        if let [only] = living[..] {
            self.select(combat, battle, only, true);
        } else {
            self.state = TargetingState::WaitingForTarget;
            battle.waiting_for_target = true;
            battle.current_target = None;
            debug!(candidates = living.len(), "waiting for target");
        }
        self.state
    }

    /// Selects `enemy`. Rejected without any mutation unless the step is
    /// `SelectTarget`, a target is awaited and `enemy` is alive.
    pub fn try_select_target(
        &mut self,
        combat: &mut CombatContext,
        battle: &mut BattleState,
        enemy: UnitId,
    ) -> Result<UnitId, TargetingError> {
        if battle.step != Step::SelectTarget {
            return Err(TargetingError::WrongStep { step: battle.step });
        }
        if !battle.waiting_for_target || self.state != TargetingState::WaitingForTarget {
            return Err(TargetingError::NotWaiting);
        }
        let unit = combat
            .enemy(enemy)
            .ok_or(TargetingError::UnknownEnemy { enemy })?;
        if !unit.is_alive() {
            return Err(TargetingError::DeadEnemy { enemy });
        }

        self.select(combat, battle, enemy, false);
        Ok(enemy)
    }

    pub fn cancel_target_mode(&mut self, battle: &mut BattleState) {
        self.state = TargetingState::Idle;
        battle.waiting_for_target = false;
    }

    fn select(
        &mut self,
        combat: &mut CombatContext,
        battle: &mut BattleState,
        target: UnitId,
        auto: bool,
    ) {
        self.state = TargetingState::Selected { target, auto };
        battle.waiting_for_target = false;
        battle.current_target = Some(target);
        combat.emit(CombatEvent::TargetChanged {
            target: Some(target),
            auto,
        });
        debug!(%target, auto, "target selected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Threshold, Unit};

    fn setup(enemies: &[u32]) -> (CombatContext, BattleState, Vec<UnitId>) {
        let mut ctx = CombatContext::new(Unit::new(UnitId::PLAYER, "Hero", 30), Threshold::DEFAULT);
        let ids = enemies
            .iter()
            .map(|&hp| ctx.spawn_enemy("Goblin", hp))
            .collect();
        let battle = BattleState {
            step: Step::SelectTarget,
            ..BattleState::default()
        };
        (ctx, battle, ids)
    }

    #[test]
    fn single_living_enemy_is_auto_selected() {
        let (mut ctx, mut battle, ids) = setup(&[10, 0]);
        let mut targeting = TargetingController::new();

        let state = targeting.begin_target_mode(&mut ctx, &mut battle);
        assert_eq!(
            state,
            TargetingState::Selected {
                target: ids[0],
                auto: true
            }
        );
        assert_eq!(battle.current_target, Some(ids[0]));
        assert!(!battle.waiting_for_target);
    }

    #[test]
    fn several_enemies_wait_for_selection() {
        let (mut ctx, mut battle, ids) = setup(&[10, 12]);
        let mut targeting = TargetingController::new();

        assert_eq!(
            targeting.begin_target_mode(&mut ctx, &mut battle),
            TargetingState::WaitingForTarget
        );
        assert!(battle.waiting_for_target);

        assert_eq!(targeting.try_select_target(&mut ctx, &mut battle, ids[1]), Ok(ids[1]));
        assert_eq!(battle.current_target, Some(ids[1]));
        assert!(!battle.waiting_for_target);
        assert!(matches!(
            ctx.drain_events().last(),
            Some(CombatEvent::TargetChanged { auto: false, .. })
        ));
    }

    #[test]
    fn rejections_leave_state_untouched() {
        let (mut ctx, mut battle, ids) = setup(&[10, 0, 7]);
        let mut targeting = TargetingController::new();
        targeting.begin_target_mode(&mut ctx, &mut battle);
        let before = (targeting.state(), battle.clone());

        assert_eq!(
            targeting.try_select_target(&mut ctx, &mut battle, ids[1]),
            Err(TargetingError::DeadEnemy { enemy: ids[1] })
        );
        assert_eq!(
            targeting.try_select_target(&mut ctx, &mut battle, UnitId(42)),
            Err(TargetingError::UnknownEnemy { enemy: UnitId(42) })
        );
        assert_eq!(
            targeting.try_select_target(&mut ctx, &mut battle, UnitId::PLAYER),
            Err(TargetingError::UnknownEnemy {
                enemy: UnitId::PLAYER
            })
        );
        assert_eq!((targeting.state(), battle.clone()), before);

        battle.step = Step::PlayerAtk;
        assert!(matches!(
            targeting.try_select_target(&mut ctx, &mut battle, ids[0]),
            Err(TargetingError::WrongStep { .. })
        ));
    }

    #[test]
    fn selecting_twice_is_rejected() {
        let (mut ctx, mut battle, ids) = setup(&[10, 12]);
        let mut targeting = TargetingController::new();
        targeting.begin_target_mode(&mut ctx, &mut battle);
        targeting.try_select_target(&mut ctx, &mut battle, ids[0]).unwrap();

        assert_eq!(
            targeting.try_select_target(&mut ctx, &mut battle, ids[1]),
            Err(TargetingError::NotWaiting)
        );
        assert_eq!(targeting.selected(), Some(ids[0]));
    }

    #[test]
    fn cancel_returns_to_idle() {
        let (mut ctx, mut battle, _) = setup(&[10, 12]);
        let mut targeting = TargetingController::new();
        targeting.begin_target_mode(&mut ctx, &mut battle);
        targeting.cancel_target_mode(&mut battle);
        assert_eq!(targeting.state(), TargetingState::Idle);
        assert!(!battle.waiting_for_target);
    }
}
