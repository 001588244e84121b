//! Bonus arithmetic used by stat-modifying relic effects.
//!
//! Application order is fixed: Flat → %Inc → More → Less. Each stack of a
//! relic contributes one copy of its bonus.

/// A single bonus that can be applied to a value.
///
/// - **Flat**: additive, applied first (e.g. +2 attack)
/// - **Increased**: percentage, summed then multiplied (e.g. +20%)
/// - **More**: sequential multiplier (50 = ×1.5)
/// - **Less**: sequential reduction (10 = ×0.9)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    Flat(i64),
    Increased(i64),
    More(i64),
    Less(i64),
}

impl Bonus {
    pub fn flat(value: i64) -> Self {
        Bonus::Flat(value)
    }

    pub fn increased(percent: i64) -> Self {
        Bonus::Increased(percent)
    }

    pub fn more(percent: i64) -> Self {
        Bonus::More(percent)
    }

    pub fn less(percent: i64) -> Self {
        Bonus::Less(percent)
    }
}

/// A collection of bonuses applied in the fixed order.
///
/// # Example
/// ```
/// # use combat_core::relic::{Bonus, BonusStack};
/// let mut stack = BonusStack::new();
/// stack.add(Bonus::flat(5));           // +5
/// stack.add(Bonus::increased(20));     // +20%
/// stack.add(Bonus::more(50));          // ×1.5
///
/// // (10 + 5) × 1.2 × 1.5 = 27
/// assert_eq!(stack.apply(10), 27);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BonusStack {
    bonuses: Vec<Bonus>,
}

impl BonusStack {
    pub fn new() -> Self {
        Self {
            bonuses: Vec::new(),
        }
    }

    /// A stack holding `copies` repetitions of `bonus`.
    pub fn repeated(bonus: &Bonus, copies: u32) -> Self {
        Self {
            bonuses: (0..copies).map(|_| bonus.clone()).collect(),
        }
    }

    pub fn add(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }

    /// Applies all bonuses to `base`.
    ///
    /// ```text
    /// result = (base + flat_sum) × (1 + inc_sum/100) × Π more × Π less
    /// ```
    pub fn apply(&self, base: i64) -> i64 {
        let flat_sum: i64 = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Flat(v) => Some(*v),
                _ => None,
            })
            .sum();

        let inc_sum: i64 = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Increased(p) => Some(*p),
                _ => None,
            })
            .sum();

        let after_inc = if inc_sum == 0 {
            base + flat_sum
        } else {
            ((base + flat_sum) * (100 + inc_sum)) / 100
        };

        let after_more = self
            .bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::More(p) => Some(*p),
                _ => None,
            })
            .fold(after_inc, |acc, more| (acc * (100 + more)) / 100);

        self.bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Less(p) => Some(*p),
                _ => None,
            })
            .fold(after_more, |acc, less| (acc * (100 - less)) / 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_bonuses_sum() {
        let stack = BonusStack::repeated(&Bonus::flat(3), 2);
        assert_eq!(stack.apply(10), 16);
    }

    #[test]
    fn increased_bonuses_sum_before_multiplying() {
        let mut stack = BonusStack::new();
        stack.add(Bonus::increased(20));
        stack.add(Bonus::increased(30));
        assert_eq!(stack.apply(10), 15);
    }

    #[test]
    fn more_and_less_apply_sequentially() {
        let mut stack = BonusStack::new();
        stack.add(Bonus::more(100));
        stack.add(Bonus::less(50));
        assert_eq!(stack.apply(10), 10);
    }

    #[test]
    fn empty_stack_is_identity() {
        assert_eq!(BonusStack::new().apply(13), 13);
    }
}
