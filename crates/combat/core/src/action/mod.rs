//! Discrete commands that mutate the combat context.
//!
//! Every action carries its own parameters and mutates [`CombatContext`]
//! exactly once when executed. Actions are queued in an [`ActionQueue`] and
//! never retried; a failing action is reported and the queue moves on.

mod queue;

pub use queue::ActionQueue;

use rand::RngCore;
use strum::Display;
use tracing::{debug, warn};

use crate::card::Card;
use crate::error::{CombatError, ErrorSeverity};
use crate::event::CombatEvent;
use crate::relic::{LifecycleHook, RelicManager};
use crate::resolution::ResolutionPlan;
use crate::state::{Actor, BattleState, CombatContext, HitOutcome, PhaseKind, UnitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatAction {
    /// Resets every accumulator. Decks are left alone.
    StartTurn,
    /// Draws the relic-adjusted number of cards, rebuilding an empty deck first.
    Draw { actor: Actor, phase: PhaseKind },
    /// Locks the current total, re-checking for a late bust.
    Stand { actor: Actor, phase: PhaseKind },
    /// Computes the damage plan from the locked totals.
    Resolve,
}

/// Everything an action may read or mutate.
pub struct ActionEnv<'a> {
    pub combat: &'a mut CombatContext,
    pub battle: &'a BattleState,
    pub relics: &'a RelicManager,
    pub rng: &'a mut dyn RngCore,
}

/// Accumulator state after a Draw or Stand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseReport {
    pub actor: Actor,
    pub phase: PhaseKind,
    pub drawn: Vec<Card>,
    pub total: u32,
    pub standing: bool,
    pub busted: bool,
}

impl PhaseReport {
    pub fn is_terminal(&self) -> bool {
        self.standing || self.busted
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    TurnStarted,
    Phase(PhaseReport),
    Resolution(ResolutionPlan),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("no unit is bound to {actor}")]
    NoUnitBound { actor: Actor },

    #[error("{unit} has no deck")]
    NoDeck { unit: UnitId },

    #[error("{unit} has no cards left, even after rebuilding")]
    DeckExhausted { unit: UnitId },
}

impl CombatError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Configuration
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoUnitBound { .. } => "ACTION_NO_UNIT_BOUND",
            Self::NoDeck { .. } => "ACTION_NO_DECK",
            Self::DeckExhausted { .. } => "ACTION_DECK_EXHAUSTED",
        }
    }
}

impl CombatAction {
    pub fn execute(&self, env: &mut ActionEnv<'_>) -> Result<ActionOutcome, ActionError> {
        match *self {
            CombatAction::StartTurn => {
                env.combat.reset_all_accumulators();
                Ok(ActionOutcome::TurnStarted)
            }
            CombatAction::Draw { actor, phase } => draw(env, actor, phase).map(ActionOutcome::Phase),
            CombatAction::Stand { actor, phase } => {
                stand(env, actor, phase).map(ActionOutcome::Phase)
            }
            CombatAction::Resolve => Ok(ActionOutcome::Resolution(ResolutionPlan::compute(
                env.combat, env.battle,
            ))),
        }
    }
}

fn report(combat: &CombatContext, actor: Actor, phase: PhaseKind, drawn: Vec<Card>) -> PhaseReport {
    let acc = combat.accumulator(actor, phase);
    PhaseReport {
        actor,
        phase,
        drawn,
        total: acc.total(),
        standing: acc.is_standing(),
        busted: acc.is_busted(),
    }
}

fn draw(env: &mut ActionEnv<'_>, actor: Actor, phase: PhaseKind) -> Result<PhaseReport, ActionError> {
    let unit = env
        .combat
        .bound_unit(actor)
        .ok_or(ActionError::NoUnitBound { actor })?;
    if env.combat.deck(unit).is_none() {
        return Err(ActionError::NoDeck { unit });
    }

    let threshold = env.combat.effective_threshold(actor, phase, env.relics);
    // Relics belong to the player; enemies always draw one card.
    let count = match actor {
        Actor::Player => env.relics.draw_count(1),
        Actor::Enemy => 1,
    };

    let was_open = !env.combat.accumulator(actor, phase).is_terminal();
    let mut drawn = Vec::new();
    for _ in 0..count {
        if env.combat.accumulator(actor, phase).is_terminal() {
            break;
        }

        if env.combat.deck(unit).is_some_and(|deck| deck.is_empty()) {
            let size = env
                .combat
                .deck_mut(unit)
                .map_or(0, |deck| deck.rebuild_and_shuffle(&mut *env.rng));
            if size == 0 {
                if drawn.is_empty() {
                    return Err(ActionError::DeckExhausted { unit });
                }
                warn!(%unit, "deck exhausted mid-draw");
                break;
            }
            debug!(%unit, size, "deck rebuilt");
            env.combat.emit(CombatEvent::DeckShuffled { unit, size });
            env.relics
                .notify(&LifecycleHook::Shuffle { unit }, Some(&mut *env.combat));
        }

        match env.combat.hit(actor, phase, threshold) {
            Some(HitOutcome::Drew(card)) => {
                drawn.push(card);
                env.relics.notify(
                    &LifecycleHook::CardDrawn { actor, phase, card },
                    Some(&mut *env.combat),
                );
            }
            Some(HitOutcome::Ignored | HitOutcome::DeckEmpty) => break,
            None => return Err(ActionError::NoDeck { unit }),
        }
    }

    // A Joker auto-stand locks the phase inside the draw.
    if was_open && env.combat.accumulator(actor, phase).is_standing() {
        play_locked_cards(env, actor, phase);
    }

    Ok(report(env.combat, actor, phase, drawn))
}

fn stand(env: &mut ActionEnv<'_>, actor: Actor, phase: PhaseKind) -> Result<PhaseReport, ActionError> {
    if env.combat.bound_unit(actor).is_none() {
        return Err(ActionError::NoUnitBound { actor });
    }

    let threshold = env.combat.effective_threshold(actor, phase, env.relics);
    if env.combat.stand(actor, phase, threshold) && env.combat.accumulator(actor, phase).is_standing() {
        play_locked_cards(env, actor, phase);
    }

    Ok(report(env.combat, actor, phase, Vec::new()))
}

/// Fires `CardPlayed` for every card held by a freshly locked accumulator.
fn play_locked_cards(env: &mut ActionEnv<'_>, actor: Actor, phase: PhaseKind) {
    let played = env.combat.accumulator(actor, phase).cards().to_vec();
    for card in played {
        env.relics.notify(
            &LifecycleHook::CardPlayed { actor, phase, card },
            Some(&mut *env.combat),
        );
    }
}
