//! Combat state: units, thresholds, accumulators and the shared context.
//!
//! [`CombatContext`] is the aggregate root for a single encounter. It is the
//! only place accumulators and decks live, and every action reads and mutates
//! it. [`BattleState`] tracks the turn step machine and the per-round values
//! locked in by the phase controllers.

mod accumulator;
mod battle;
mod context;
mod threshold;
mod unit;

pub use accumulator::{Actor, HitOutcome, PhaseAccumulator, PhaseKind};
pub use battle::{BattleState, EnemyTotals, Step};
pub use context::CombatContext;
pub use threshold::{Threshold, ThresholdError};
pub use unit::{Unit, UnitId};
