use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::CombatConfig;
use crate::deck::Deck;
use crate::event::CombatEvent;
use crate::relic::RelicManager;

use super::{Actor, HitOutcome, PhaseAccumulator, PhaseKind, Threshold, Unit, UnitId};

const SLOTS: [(Actor, PhaseKind); 4] = [
    (Actor::Player, PhaseKind::Defense),
    (Actor::Player, PhaseKind::Attack),
    (Actor::Enemy, PhaseKind::Defense),
    (Actor::Enemy, PhaseKind::Attack),
];

const fn slot(actor: Actor, phase: PhaseKind) -> usize {
    match (actor, phase) {
        (Actor::Player, PhaseKind::Defense) => 0,
        (Actor::Player, PhaseKind::Attack) => 1,
        (Actor::Enemy, PhaseKind::Defense) => 2,
        (Actor::Enemy, PhaseKind::Attack) => 3,
    }
}

/// Shared state registry for one encounter.
///
/// Owns the units, the four (actor, phase) accumulators, threshold overrides
/// and the per-unit decks. The `Enemy` actor is bound to one enemy at a time;
/// [`CombatContext::bind_enemy`] swaps the binding in place.
#[derive(Clone, Debug)]
pub struct CombatContext {
    player: Unit,
    enemies: Vec<Unit>,
    active_enemy: Option<UnitId>,
    accumulators: [PhaseAccumulator; 4],
    global_threshold: Threshold,
    overrides: HashMap<(Actor, PhaseKind), Threshold>,
    enemy_overrides: HashMap<UnitId, HashMap<PhaseKind, Threshold>>,
    decks: HashMap<UnitId, Deck>,
    events: Vec<CombatEvent>,
}

impl CombatContext {
    pub fn new(player: Unit, global_threshold: Threshold) -> Self {
        Self {
            player,
            enemies: Vec::new(),
            active_enemy: None,
            accumulators: SLOTS.map(|(actor, phase)| PhaseAccumulator::new(actor, phase)),
            global_threshold,
            overrides: HashMap::new(),
            enemy_overrides: HashMap::new(),
            decks: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Builds a context from configuration, falling back to the default
    /// threshold when the configured one is malformed.
    pub fn from_config(config: &CombatConfig) -> Self {
        let threshold = Threshold::new(config.global_threshold).unwrap_or_else(|e| {
            warn!(error = %e, "invalid global threshold, using default");
            Threshold::DEFAULT
        });
        let player = Unit::new(UnitId::PLAYER, "Player", config.player_max_hp);
        Self::new(player, threshold)
    }

    // ===== units =====

    /// Registers an enemy; ids follow spawn order.
    pub fn spawn_enemy(&mut self, name: impl Into<String>, max_hp: u32) -> UnitId {
        let id = UnitId(self.enemies.len() as u32 + 1);
        self.enemies.push(Unit::new(id, name, max_hp));
        debug!(enemy = %id, "enemy spawned");
        id
    }

    pub fn player(&self) -> &Unit {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Unit {
        &mut self.player
    }

    /// Enemies in registry (spawn) order, dead ones included.
    pub fn enemies(&self) -> &[Unit] {
        &self.enemies
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &Unit> {
        self.enemies.iter().filter(|enemy| enemy.is_alive())
    }

    pub fn living_enemy_ids(&self) -> Vec<UnitId> {
        self.living_enemies().map(|enemy| enemy.id).collect()
    }

    pub fn enemy(&self, id: UnitId) -> Option<&Unit> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        if id.is_player() {
            Some(&self.player)
        } else {
            self.enemy(id)
        }
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        if id.is_player() {
            Some(&mut self.player)
        } else {
            self.enemies.iter_mut().find(|enemy| enemy.id == id)
        }
    }

    /// Unit currently bound to `actor`.
    pub fn bound_unit(&self, actor: Actor) -> Option<UnitId> {
        match actor {
            Actor::Player => Some(UnitId::PLAYER),
            Actor::Enemy => self.active_enemy,
        }
    }

    pub fn active_enemy(&self) -> Option<UnitId> {
        self.active_enemy
    }

    /// Rebinds the `Enemy` actor to `enemy`.
    ///
    /// Resets both enemy accumulators and replaces the enemy threshold
    /// overrides with the ones registered for `enemy`. Returns `false` for
    /// unknown enemies.
    pub fn bind_enemy(&mut self, enemy: UnitId) -> bool {
        if self.enemy(enemy).is_none() {
            warn!(enemy = %enemy, "cannot bind unknown enemy");
            return false;
        }

        for phase in [PhaseKind::Defense, PhaseKind::Attack] {
            self.reset_accumulator(Actor::Enemy, phase);
            self.overrides.remove(&(Actor::Enemy, phase));
        }

        self.active_enemy = Some(enemy);
        if let Some(own) = self.enemy_overrides.get(&enemy) {
            for (&phase, &threshold) in own {
                self.overrides.insert((Actor::Enemy, phase), threshold);
            }
        }
        debug!(enemy = %enemy, "enemy bound");
        true
    }

    // ===== accumulators =====

    pub fn accumulator(&self, actor: Actor, phase: PhaseKind) -> &PhaseAccumulator {
        &self.accumulators[slot(actor, phase)]
    }

    /// Draws one card for (`actor`, `phase`) from the bound unit's deck.
    ///
    /// Returns `None` when no unit or no deck is bound to `actor`.
    pub fn hit(&mut self, actor: Actor, phase: PhaseKind, threshold: Threshold) -> Option<HitOutcome> {
        let unit = self.bound_unit(actor)?;
        let deck = self.decks.get_mut(&unit)?;
        let outcome = self.accumulators[slot(actor, phase)].hit(deck, threshold);

        if let HitOutcome::Drew(card) = outcome {
            self.events.push(CombatEvent::CardDrawn {
                actor,
                unit: Some(unit),
                phase,
                card,
            });
            self.emit_progress(actor, phase, threshold);
        }
        Some(outcome)
    }

    /// Stands (`actor`, `phase`). Returns `false` when already terminal.
    pub fn stand(&mut self, actor: Actor, phase: PhaseKind, threshold: Threshold) -> bool {
        let changed = self.accumulators[slot(actor, phase)].stand(threshold);
        if changed {
            self.emit_progress(actor, phase, threshold);
        }
        changed
    }

    /// Clears one accumulator, returning its cards to the owner's discard pile.
    pub fn reset_accumulator(&mut self, actor: Actor, phase: PhaseKind) {
        let released = self.accumulators[slot(actor, phase)].reset();
        if !released.is_empty()
            && let Some(deck) = self
                .bound_unit(actor)
                .and_then(|unit| self.decks.get_mut(&unit))
        {
            deck.discard_all(released);
        }
        let event = CombatEvent::PhaseProgress {
            actor,
            unit: self.bound_unit(actor),
            phase,
            total: 0,
            threshold: self.base_threshold(actor, phase).get(),
        };
        self.events.push(event);
    }

    /// Clears every known accumulator.
    pub fn reset_all_accumulators(&mut self) {
        for (actor, phase) in SLOTS {
            self.reset_accumulator(actor, phase);
        }
    }

    fn emit_progress(&mut self, actor: Actor, phase: PhaseKind, threshold: Threshold) {
        let event = CombatEvent::PhaseProgress {
            actor,
            unit: self.bound_unit(actor),
            phase,
            total: self.accumulators[slot(actor, phase)].total(),
            threshold: threshold.get(),
        };
        self.events.push(event);
    }

    // ===== thresholds =====

    pub fn global_threshold(&self) -> Threshold {
        self.global_threshold
    }

    pub fn set_global_threshold(&mut self, threshold: Threshold) {
        self.global_threshold = threshold;
    }

    /// Overrides the threshold for (`actor`, `phase`) until cleared.
    ///
    /// Enemy overrides set this way last until the next rebind.
    pub fn set_threshold_override(&mut self, actor: Actor, phase: PhaseKind, threshold: Threshold) {
        self.overrides.insert((actor, phase), threshold);
    }

    pub fn clear_threshold_override(&mut self, actor: Actor, phase: PhaseKind) {
        self.overrides.remove(&(actor, phase));
    }

    /// Registers a per-enemy override, applied whenever that enemy is bound.
    pub fn set_enemy_threshold(&mut self, enemy: UnitId, phase: PhaseKind, threshold: Threshold) {
        self.enemy_overrides
            .entry(enemy)
            .or_default()
            .insert(phase, threshold);
        if self.active_enemy == Some(enemy) {
            self.overrides.insert((Actor::Enemy, phase), threshold);
        }
    }

    /// Override for (`actor`, `phase`) or the global fallback.
    pub fn base_threshold(&self, actor: Actor, phase: PhaseKind) -> Threshold {
        self.overrides
            .get(&(actor, phase))
            .copied()
            .unwrap_or(self.global_threshold)
    }

    /// Base threshold run through the relic pipeline.
    pub fn effective_threshold(
        &self,
        actor: Actor,
        phase: PhaseKind,
        relics: &RelicManager,
    ) -> Threshold {
        relics.threshold(actor, phase, self.base_threshold(actor, phase))
    }

    // ===== decks =====

    pub fn bind_deck(&mut self, unit: UnitId, deck: Deck) {
        self.decks.insert(unit, deck);
    }

    pub fn deck(&self, unit: UnitId) -> Option<&Deck> {
        self.decks.get(&unit)
    }

    pub fn deck_mut(&mut self, unit: UnitId) -> Option<&mut Deck> {
        self.decks.get_mut(&unit)
    }

    // ===== events =====

    pub fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    /// Takes every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        core::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Rank, Suit};

    fn context() -> CombatContext {
        CombatContext::new(Unit::new(UnitId::PLAYER, "Hero", 40), Threshold::DEFAULT)
    }

    fn deck_of(values: &[u32]) -> Deck {
        Deck::new(
            values
                .iter()
                .rev()
                .map(|&v| Card::with_value(Rank::Five, Suit::Spades, v))
                .collect(),
        )
    }

    #[test]
    fn enemies_get_ids_in_spawn_order() {
        let mut ctx = context();
        let a = ctx.spawn_enemy("Slime", 10);
        let b = ctx.spawn_enemy("Bat", 8);
        assert_eq!(a, UnitId(1));
        assert_eq!(b, UnitId(2));
        assert_eq!(ctx.enemies().iter().map(|e| e.id).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn hit_without_deck_is_skipped() {
        let mut ctx = context();
        assert_eq!(ctx.hit(Actor::Player, PhaseKind::Attack, Threshold::DEFAULT), None);
        assert!(ctx.drain_events().is_empty());
    }

    #[test]
    fn rebinding_resets_enemy_accumulators_and_overrides() {
        let mut ctx = context();
        let a = ctx.spawn_enemy("Slime", 10);
        let b = ctx.spawn_enemy("Bat", 8);
        ctx.bind_deck(a, deck_of(&[7, 7]));
        ctx.bind_deck(b, deck_of(&[3]));
        ctx.set_enemy_threshold(a, PhaseKind::Attack, Threshold::new(12).unwrap());

        assert!(ctx.bind_enemy(a));
        assert_eq!(ctx.base_threshold(Actor::Enemy, PhaseKind::Attack).get(), 12);
        ctx.hit(Actor::Enemy, PhaseKind::Attack, Threshold::new(12).unwrap());
        assert_eq!(ctx.accumulator(Actor::Enemy, PhaseKind::Attack).total(), 7);

        assert!(ctx.bind_enemy(b));
        assert_eq!(ctx.accumulator(Actor::Enemy, PhaseKind::Attack).total(), 0);
        assert_eq!(ctx.base_threshold(Actor::Enemy, PhaseKind::Attack), Threshold::DEFAULT);
        // The released card went back to the previous enemy's discard pile.
        assert_eq!(ctx.deck(a).map(Deck::discard_count), Some(1));
    }

    #[test]
    fn bind_unknown_enemy_is_rejected() {
        let mut ctx = context();
        assert!(!ctx.bind_enemy(UnitId(9)));
        assert_eq!(ctx.active_enemy(), None);
    }

    #[test]
    fn hit_emits_card_and_progress_events() {
        let mut ctx = context();
        ctx.bind_deck(UnitId::PLAYER, deck_of(&[6]));
        ctx.hit(Actor::Player, PhaseKind::Defense, Threshold::DEFAULT);

        let events = ctx.drain_events();
        assert!(matches!(events[0], CombatEvent::CardDrawn { phase: PhaseKind::Defense, .. }));
        assert!(matches!(
            events[1],
            CombatEvent::PhaseProgress { total: 6, threshold: 21, .. }
        ));
    }

    #[test]
    fn reset_all_emits_zeroed_progress_for_every_slot() {
        let mut ctx = context();
        ctx.reset_all_accumulators();
        let events = ctx.drain_events();
        assert_eq!(events.len(), 4);
        assert!(events
            .iter()
            .all(|e| matches!(e, CombatEvent::PhaseProgress { total: 0, .. })));
    }
}
