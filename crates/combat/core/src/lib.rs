//! Deterministic combat rules for the blackjack-style card battler.
//!
//! `combat-core` defines the canonical rules of an encounter: cards and decks,
//! the per-(actor, phase) accumulators, the action queue that mutates them,
//! the enemy draw/stand policy, the battle step machine, target acquisition,
//! resolution planning and the relic modifier pipeline. Everything here is
//! synchronous and free of I/O; the `runtime` crate layers async pacing,
//! animation acknowledgment and event delivery on top.
//!
//! All state mutation flows through [`action::CombatAction`] executed against
//! [`state::CombatContext`].
pub mod action;
pub mod card;
pub mod config;
pub mod deck;
pub mod env;
pub mod error;
pub mod event;
pub mod policy;
pub mod relic;
pub mod resolution;
pub mod state;
pub mod targeting;

pub use action::{ActionEnv, ActionError, ActionOutcome, ActionQueue, CombatAction, PhaseReport};
pub use card::{Card, Rank, Suit};
pub use config::CombatConfig;
pub use deck::Deck;
pub use env::{Band, DeckOracle, EnemyTuning, EnemyTuningOracle};
pub use error::{CombatError, ErrorSeverity};
pub use event::CombatEvent;
pub use policy::{EnemyPolicy, PhaseEnumerator, PolicyDecision};
pub use relic::{
    AcquireOutcome, Bonus, BonusStack, EffectRegistry, EffectSpec, LifecycleHook, Modification,
    RelicDefinition, RelicEffect, RelicError, RelicManager, RelicRuntime, RelicSpec, StackingRule,
    StatTarget,
};
pub use resolution::{EnemyStrike, Outcome, PlayerStrike, ResolutionPlan};
pub use state::{
    Actor, BattleState, CombatContext, EnemyTotals, HitOutcome, PhaseAccumulator, PhaseKind, Step,
    Threshold, ThresholdError, Unit, UnitId,
};
pub use targeting::{TargetingController, TargetingError, TargetingState};
