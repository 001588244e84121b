//! Runtime configuration and environment loading.

use std::env;
use std::time::Duration;

use rand::Rng;

use combat_core::CombatConfig;

/// Cooperative pacing of enemy draws, resolution and animations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingConfig {
    /// Lower bound of the random pause after each enemy draw.
    pub enemy_draw_delay_min: Duration,
    /// Upper bound of the random pause after each enemy draw.
    pub enemy_draw_delay_max: Duration,
    /// Pause between two enemy attacks during resolution.
    pub inter_enemy_delay: Duration,
    /// Budget for one attack animation, impact and completion combined.
    pub animation_timeout: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enemy_draw_delay_min: Duration::from_millis(250),
            enemy_draw_delay_max: Duration::from_millis(600),
            inter_enemy_delay: Duration::from_millis(400),
            animation_timeout: Duration::from_secs(3),
        }
    }
}

impl PacingConfig {
    /// No pauses at all; animations still get a short timeout.
    pub fn instant() -> Self {
        Self {
            enemy_draw_delay_min: Duration::ZERO,
            enemy_draw_delay_max: Duration::ZERO,
            inter_enemy_delay: Duration::ZERO,
            animation_timeout: Duration::from_millis(100),
        }
    }

    /// Random pause within the configured draw delay range.
    pub fn enemy_draw_delay(&self, rng: &mut impl Rng) -> Duration {
        let (min, max) = if self.enemy_draw_delay_min <= self.enemy_draw_delay_max {
            (self.enemy_draw_delay_min, self.enemy_draw_delay_max)
        } else {
            (self.enemy_draw_delay_max, self.enemy_draw_delay_min)
        };
        if min == max {
            return min;
        }
        rng.gen_range(min..=max)
    }
}

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Rules for encounters built from configuration, such as the CLI's
    /// built-in skirmish. Not applied by [`crate::RuntimeBuilder`]: a
    /// session always plays with its [`EncounterSetup`]'s own config.
    ///
    /// [`EncounterSetup`]: combat_content::EncounterSetup
    pub combat: CombatConfig,
    pub pacing: PacingConfig,
    /// Minimum spacing between two accepted commands.
    pub input_debounce: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Seed for deck shuffles and pacing jitter. Random when unset.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            pacing: PacingConfig::default(),
            input_debounce: Duration::from_millis(150),
            event_buffer_size: 256,
            command_buffer_size: 32,
            seed: None,
        }
    }
}

impl RuntimeConfig {
    /// Zero pacing and no debounce, for tests and headless runs.
    pub fn instant() -> Self {
        Self {
            pacing: PacingConfig::instant(),
            input_debounce: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `COMBAT_GLOBAL_THRESHOLD` - Bust ceiling without overrides (default: 21)
    /// - `COMBAT_PLAYER_MAX_HP` - Player HP (default: 60)
    /// - `COMBAT_PLAYER_JOKERS` - Jokers in the default player deck (default: 2)
    ///
    ///   The three values above only reach encounters built from `combat`.
    ///
    /// - `COMBAT_ENEMY_DRAW_DELAY_MIN_MS` / `COMBAT_ENEMY_DRAW_DELAY_MAX_MS`
    /// - `COMBAT_INTER_ENEMY_DELAY_MS`
    /// - `COMBAT_ANIMATION_TIMEOUT_MS`
    /// - `COMBAT_INPUT_DEBOUNCE_MS`
    /// - `COMBAT_EVENT_BUFFER` / `COMBAT_COMMAND_BUFFER`
    /// - `COMBAT_SEED`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(threshold) = parse::<u32>(lookup("COMBAT_GLOBAL_THRESHOLD")) {
            config.combat.global_threshold = threshold;
        }
        if let Some(hp) = parse::<u32>(lookup("COMBAT_PLAYER_MAX_HP")) {
            config.combat.player_max_hp = hp.max(1);
        }
        if let Some(jokers) = parse::<u8>(lookup("COMBAT_PLAYER_JOKERS")) {
            config.combat.player_jokers = jokers;
        }

        if let Some(ms) = parse::<u64>(lookup("COMBAT_ENEMY_DRAW_DELAY_MIN_MS")) {
            config.pacing.enemy_draw_delay_min = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(lookup("COMBAT_ENEMY_DRAW_DELAY_MAX_MS")) {
            config.pacing.enemy_draw_delay_max = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(lookup("COMBAT_INTER_ENEMY_DELAY_MS")) {
            config.pacing.inter_enemy_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(lookup("COMBAT_ANIMATION_TIMEOUT_MS")) {
            config.pacing.animation_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64>(lookup("COMBAT_INPUT_DEBOUNCE_MS")) {
            config.input_debounce = Duration::from_millis(ms);
        }

        if let Some(capacity) = parse::<usize>(lookup("COMBAT_EVENT_BUFFER")) {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = parse::<usize>(lookup("COMBAT_COMMAND_BUFFER")) {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(seed) = parse::<u64>(lookup("COMBAT_SEED")) {
            config.seed = Some(seed);
        }

        config
    }
}

fn parse<T>(value: Option<String>) -> Option<T>
where
    T: std::str::FromStr,
{
    value?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = RuntimeConfig::from_lookup(|_| None);
        assert_eq!(config.combat, CombatConfig::default());
        assert_eq!(config.pacing, PacingConfig::default());
        assert_eq!(config.seed, None);
    }

    #[test]
    fn variables_override_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("COMBAT_GLOBAL_THRESHOLD", "17"),
            ("COMBAT_SEED", " 42 "),
            ("COMBAT_INPUT_DEBOUNCE_MS", "0"),
            ("COMBAT_ANIMATION_TIMEOUT_MS", "1500"),
            ("COMBAT_COMMAND_BUFFER", "0"),
        ]));
        assert_eq!(config.combat.global_threshold, 17);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.input_debounce, Duration::ZERO);
        assert_eq!(config.pacing.animation_timeout, Duration::from_millis(1500));
        assert_eq!(config.command_buffer_size, 1);
    }

    #[test]
    fn malformed_values_are_ignored() {
        let config = RuntimeConfig::from_lookup(lookup(&[("COMBAT_PLAYER_MAX_HP", "lots")]));
        assert_eq!(config.combat.player_max_hp, CombatConfig::DEFAULT_PLAYER_MAX_HP);
    }

    #[test]
    fn draw_delay_stays_in_range_even_when_bounds_are_swapped() {
        let pacing = PacingConfig {
            enemy_draw_delay_min: Duration::from_millis(500),
            enemy_draw_delay_max: Duration::from_millis(100),
            ..PacingConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let delay = pacing.enemy_draw_delay(&mut rng);
            assert!(delay >= Duration::from_millis(100) && delay <= Duration::from_millis(500));
        }
    }
}
