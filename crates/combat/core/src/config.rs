/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Bust ceiling used when no per-(actor, phase) override exists.
    pub global_threshold: u32,
    /// Starting and maximum HP of the player unit.
    pub player_max_hp: u32,
    /// Number of Jokers shuffled into the default player deck.
    pub player_jokers: u8,
}

impl CombatConfig {
    // ===== compile-time constants =====
    /// Smallest threshold accepted anywhere in the engine.
    pub const MIN_THRESHOLD: u32 = 5;
    /// Upper bound on enemy draw/stand iterations for a single phase.
    pub const ENEMY_POLICY_SAFETY_LIMIT: u32 = 64;
    /// Maximum number of enemies in one encounter.
    pub const MAX_ENEMIES: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_THRESHOLD: u32 = 21;
    pub const DEFAULT_PLAYER_MAX_HP: u32 = 60;
    pub const DEFAULT_PLAYER_JOKERS: u8 = 2;

    pub fn new() -> Self {
        Self {
            global_threshold: Self::DEFAULT_THRESHOLD,
            player_max_hp: Self::DEFAULT_PLAYER_MAX_HP,
            player_jokers: Self::DEFAULT_PLAYER_JOKERS,
        }
    }

    pub fn with_global_threshold(mut self, threshold: u32) -> Self {
        self.global_threshold = threshold;
        self
    }

    pub fn with_player_max_hp(mut self, hp: u32) -> Self {
        self.player_max_hp = hp;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
