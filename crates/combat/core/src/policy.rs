//! Enemy draw/stand policy.
//!
//! The policy is a pure decision function over the bound enemy accumulator.
//! [`PhaseEnumerator`] turns it into a lazy action sequence: every call
//! re-reads the accumulator, so the caller must execute each yielded action
//! before asking for the next one.

use tracing::warn;

use crate::action::CombatAction;
use crate::config::CombatConfig;
use crate::env::{Band, EnemyTuning};
use crate::state::{Actor, CombatContext, PhaseAccumulator, PhaseKind, Threshold};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyDecision {
    Draw,
    /// `forced` is set when the safety limit cut the loop short.
    Stand { forced: bool },
}

/// Resolved policy parameters for one enemy phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyPolicy {
    cap: u32,
    band: Option<Band>,
}

impl EnemyPolicy {
    /// Cap is the phase threshold, lowered by the enemy's own cap if smaller.
    /// The band is the enemy's own or the threshold-relative fallback; an
    /// empty band is ignored.
    pub fn new(tuning: &EnemyTuning, phase: PhaseKind, threshold: Threshold) -> Self {
        let cap = tuning
            .cap(phase)
            .map_or(threshold.get(), |cap| cap.min(threshold.get()));

        let band = match tuning.band(phase) {
            Some(band) if band.is_valid() => Some(band),
            Some(band) => {
                warn!(min = band.min, max = band.max, %phase, "empty enemy band, using fallback");
                Some(Band::fallback(threshold))
            }
            None => Some(Band::fallback(threshold)),
        }
        .filter(Band::is_valid);

        Self { cap, band }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn band(&self) -> Option<Band> {
        self.band
    }

    /// Next move for `total`. Cap is checked first, then the band.
    pub fn decide(&self, total: u32) -> PolicyDecision {
        if total >= self.cap {
            return PolicyDecision::Stand { forced: false };
        }
        if self.band.is_some_and(|band| band.contains(total)) {
            return PolicyDecision::Stand { forced: false };
        }
        PolicyDecision::Draw
    }

    pub fn enumerate(self, phase: PhaseKind) -> PhaseEnumerator {
        PhaseEnumerator {
            policy: self,
            phase,
            steps: 0,
            finished: false,
        }
    }
}

/// Lazy action sequence for the bound enemy's phase.
#[derive(Clone, Debug)]
pub struct PhaseEnumerator {
    policy: EnemyPolicy,
    phase: PhaseKind,
    steps: u32,
    finished: bool,
}

impl PhaseEnumerator {
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Yields the next action, or `None` once the accumulator is terminal or
    /// a Stand has been yielded.
    pub fn next_action(&mut self, combat: &CombatContext) -> Option<CombatAction> {
        let acc = combat.accumulator(Actor::Enemy, self.phase);
        let decision = self.next_decision(acc)?;
        Some(match decision {
            PolicyDecision::Draw => CombatAction::Draw {
                actor: Actor::Enemy,
                phase: self.phase,
            },
            PolicyDecision::Stand { .. } => CombatAction::Stand {
                actor: Actor::Enemy,
                phase: self.phase,
            },
        })
    }

    pub fn next_decision(&mut self, acc: &PhaseAccumulator) -> Option<PolicyDecision> {
        if self.finished || acc.is_terminal() {
            self.finished = true;
            return None;
        }

        self.steps += 1;
        if self.steps > CombatConfig::ENEMY_POLICY_SAFETY_LIMIT {
            warn!(
                phase = %self.phase,
                total = acc.total(),
                limit = CombatConfig::ENEMY_POLICY_SAFETY_LIMIT,
                "enemy policy hit safety limit, forcing stand"
            );
            self.finished = true;
            return Some(PolicyDecision::Stand { forced: true });
        }

        let decision = self.policy.decide(acc.total());
        if matches!(decision, PolicyDecision::Stand { .. }) {
            self.finished = true;
        }
        Some(decision)
    }
}
