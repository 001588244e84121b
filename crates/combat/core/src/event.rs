//! Notifications produced by the combat engine.
//!
//! The core never delivers events itself. [`crate::CombatContext`] collects
//! them in an outbox that the runtime drains and publishes after each action.
//! None of these are awaited; they exist purely for presentation layers.

use crate::card::Card;
use crate::resolution::Outcome;
use crate::state::{Actor, PhaseKind, Step, UnitId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    /// Accumulator total changed (or was reset to zero).
    PhaseProgress {
        actor: Actor,
        unit: Option<UnitId>,
        phase: PhaseKind,
        total: u32,
        threshold: u32,
    },
    CardDrawn {
        actor: Actor,
        unit: Option<UnitId>,
        phase: PhaseKind,
        card: Card,
    },
    DeckShuffled {
        unit: UnitId,
        size: usize,
    },
    /// A phase total became final for this round.
    TotalLocked {
        actor: Actor,
        unit: UnitId,
        phase: PhaseKind,
        total: u32,
        busted: bool,
    },
    StepChanged {
        step: Step,
    },
    TargetChanged {
        target: Option<UnitId>,
        auto: bool,
    },
    EnemyPhaseStarted {
        enemy: UnitId,
        phase: PhaseKind,
    },
    EnemyPhaseEnded {
        enemy: UnitId,
        phase: PhaseKind,
        total: u32,
    },
    RoundStarted {
        turn: u32,
    },
    RoundResolved {
        turn: u32,
    },
    DamageApplied {
        attacker: UnitId,
        defender: UnitId,
        amount: u32,
        remaining_hp: u32,
    },
    Blocked {
        attacker: UnitId,
        defender: UnitId,
    },
    UnitHealed {
        unit: UnitId,
        amount: u32,
    },
    RelicAcquired {
        relic: String,
        stacks: u32,
    },
    RelicLost {
        relic: String,
    },
    GameOver {
        outcome: Outcome,
    },
    /// A command or operation was rejected or skipped.
    Diagnostic {
        code: String,
        message: String,
    },
}

impl CombatEvent {
    pub fn diagnostic(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Diagnostic {
            code: code.into(),
            message: message.into(),
        }
    }
}
