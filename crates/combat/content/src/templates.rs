//! Content templates for units, decks and encounters.
//!
//! Templates are pure data. The runtime turns an [`EncounterSetup`] into a
//! live combat session: it spawns the units, binds their decks and registers
//! the tuning with its oracles.

use std::sync::Arc;

use combat_core::{Card, CombatConfig, EnemyTuning, PhaseKind, RelicDefinition, Threshold};

/// Deck composition: optional standard pack, Jokers and extra cards.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeckSpec {
    pub standard: bool,
    pub jokers: u8,
    pub extras: Vec<Card>,
}

impl Default for DeckSpec {
    fn default() -> Self {
        Self {
            standard: true,
            jokers: 0,
            extras: Vec::new(),
        }
    }
}

impl DeckSpec {
    pub fn standard_with_jokers(jokers: u8) -> Self {
        Self {
            jokers,
            ..Self::default()
        }
    }

    /// Only the given cards.
    pub fn custom(cards: Vec<Card>) -> Self {
        Self {
            standard: false,
            jokers: 0,
            extras: cards,
        }
    }

    /// Expands the composition into its (unshuffled) cards.
    pub fn cards(&self) -> Vec<Card> {
        let mut cards = if self.standard {
            Card::standard_pack()
        } else {
            Vec::new()
        };
        cards.extend((0..self.jokers).map(|_| Card::joker()));
        cards.extend(self.extras.iter().copied());
        cards
    }
}

/// Per-phase threshold overrides for one unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThresholdOverrides {
    pub defense: Option<Threshold>,
    pub attack: Option<Threshold>,
}

impl ThresholdOverrides {
    pub fn get(&self, phase: PhaseKind) -> Option<Threshold> {
        match phase {
            PhaseKind::Defense => self.defense,
            PhaseKind::Attack => self.attack,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhaseKind, Threshold)> + '_ {
        [PhaseKind::Defense, PhaseKind::Attack]
            .into_iter()
            .filter_map(|phase| self.get(phase).map(|threshold| (phase, threshold)))
    }
}

/// Enemy catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub max_hp: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tuning: EnemyTuning,
    #[cfg_attr(feature = "serde", serde(default))]
    pub thresholds: ThresholdOverrides,
    #[cfg_attr(feature = "serde", serde(default))]
    pub deck: DeckSpec,
}

impl EnemyTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_hp: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            max_hp,
            tuning: EnemyTuning::default(),
            thresholds: ThresholdOverrides::default(),
            deck: DeckSpec::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: EnemyTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_deck(mut self, deck: DeckSpec) -> Self {
        self.deck = deck;
        self
    }

    pub fn with_threshold(mut self, phase: PhaseKind, threshold: Threshold) -> Self {
        match phase {
            PhaseKind::Defense => self.thresholds.defense = Some(threshold),
            PhaseKind::Attack => self.thresholds.attack = Some(threshold),
        }
        self
    }
}

/// Player section of an encounter file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerSpec {
    pub name: Option<String>,
    /// Falls back to [`CombatConfig::player_max_hp`].
    pub max_hp: Option<u32>,
    /// Falls back to a standard pack with [`CombatConfig::player_jokers`] Jokers.
    pub deck: Option<DeckSpec>,
    pub thresholds: ThresholdOverrides,
}

/// Encounter file: references into the enemy and relic catalogs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterSpec {
    #[cfg_attr(feature = "serde", serde(default))]
    pub player: PlayerSpec,
    /// Enemy template ids in spawn order; duplicates spawn several copies.
    pub enemies: Vec<String>,
    /// Relic ids acquired before the first turn, in order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub relics: Vec<String>,
    /// Overrides the configured global threshold.
    #[cfg_attr(feature = "serde", serde(default))]
    pub global_threshold: Option<Threshold>,
}

/// Fully resolved encounter, ready to be turned into a session.
#[derive(Clone, Debug)]
pub struct EncounterSetup {
    pub config: CombatConfig,
    pub player_name: String,
    pub player_deck: Vec<Card>,
    pub player_thresholds: ThresholdOverrides,
    /// Enemies in spawn order.
    pub enemies: Vec<EnemyTemplate>,
    pub relics: Vec<Arc<RelicDefinition>>,
}

impl EncounterSetup {
    /// Player with a default deck, no enemies and no relics.
    pub fn new(config: CombatConfig) -> Self {
        let player_deck = DeckSpec::standard_with_jokers(config.player_jokers).cards();
        Self {
            config,
            player_name: "Player".to_owned(),
            player_deck,
            player_thresholds: ThresholdOverrides::default(),
            enemies: Vec::new(),
            relics: Vec::new(),
        }
    }

    pub fn with_player_deck(mut self, cards: Vec<Card>) -> Self {
        self.player_deck = cards;
        self
    }

    pub fn with_enemy(mut self, enemy: EnemyTemplate) -> Self {
        self.enemies.push(enemy);
        self
    }

    pub fn with_relic(mut self, relic: Arc<RelicDefinition>) -> Self {
        self.relics.push(relic);
        self
    }
}
