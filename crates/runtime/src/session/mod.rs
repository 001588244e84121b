//! Combat session: the command surface over one encounter.
//!
//! A [`CombatSession`] owns the combat context, battle state, relics and
//! targeting for a single encounter. Every mutation goes through
//! [`CombatSession::apply`], which enforces the guards in this order:
//! game over, busy, started, input debounce. A rejected command changes
//! nothing and publishes a diagnostic event.
mod snapshot;
mod state;

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use combat_content::EncounterSetup;
use combat_core::{
    AcquireOutcome, ActionQueue, Actor, BattleState, CombatAction, CombatConfig, CombatContext,
    CombatError, CombatEvent, Deck, LifecycleHook, PhaseKind, RelicDefinition, RelicManager,
    Step, TargetingController, Threshold, UnitId,
};

use crate::animation::AnimationBridge;
use crate::api::{Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::controllers::{
    EnemyPhaseController, PlayerPhaseController, ResolutionController, run_queue,
};
use crate::events::EventBus;
use crate::oracle::{OracleManager, StaticDeckOracle, StaticTuningOracle};

pub use snapshot::{BattleSnapshot, EnemyView, RelicView};

pub(crate) use state::SessionState;

/// Commands that mutate a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    StartGame,
    Draw(PhaseKind),
    Accept(PhaseKind),
    SelectTarget(UnitId),
    SetThreshold {
        actor: Actor,
        phase: PhaseKind,
        value: u32,
    },
}

impl Mutation {
    pub const fn name(&self) -> &'static str {
        match self {
            Mutation::StartGame => "start_game",
            Mutation::Draw(_) => "draw",
            Mutation::Accept(_) => "accept",
            Mutation::SelectTarget(_) => "select_target",
            Mutation::SetThreshold { .. } => "set_threshold",
        }
    }
}

pub struct CombatSession {
    state: SessionState,
    bus: EventBus,
    oracles: OracleManager,
    player: PlayerPhaseController,
    enemies: EnemyPhaseController,
    resolution: ResolutionController,
    input_debounce: Duration,
    last_input: Option<Instant>,
    started: bool,
    seed: u64,
}

impl CombatSession {
    /// Builds a session from a resolved encounter.
    ///
    /// Spawns the enemies in order, binds a shuffled deck to every unit the
    /// deck oracle knows, registers per-unit threshold overrides and acquires
    /// the starting relics. Events produced here are published by the first
    /// command.
    pub fn from_setup(
        setup: EncounterSetup,
        config: &RuntimeConfig,
        bridge: Arc<dyn AnimationBridge>,
        bus: EventBus,
    ) -> Result<Self> {
        if setup.enemies.is_empty() || setup.enemies.len() > CombatConfig::MAX_ENEMIES {
            return Err(RuntimeError::InvalidEncounter {
                reason: format!(
                    "expected 1 to {} enemies, got {}",
                    CombatConfig::MAX_ENEMIES,
                    setup.enemies.len()
                ),
            });
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut combat = CombatContext::from_config(&setup.config);
        combat.player_mut().name = setup.player_name.clone();
        for (phase, threshold) in setup.player_thresholds.iter() {
            combat.set_threshold_override(Actor::Player, phase, threshold);
        }

        let mut tuning = StaticTuningOracle::new();
        let mut decks = StaticDeckOracle::new().with(UnitId::PLAYER, setup.player_deck.clone());
        for template in &setup.enemies {
            let id = combat.spawn_enemy(template.name.clone(), template.max_hp);
            for (phase, threshold) in template.thresholds.iter() {
                combat.set_enemy_threshold(id, phase, threshold);
            }
            tuning.insert(id, template.tuning);
            decks.insert(id, template.deck.cards());
        }
        let oracles = OracleManager::new(Arc::new(tuning), Arc::new(decks));

        let units: Vec<UnitId> = std::iter::once(UnitId::PLAYER)
            .chain(combat.enemies().iter().map(|enemy| enemy.id))
            .collect();
        for unit in units {
            match oracles.decks().composition(unit) {
                Some(cards) => {
                    let mut deck = Deck::with_snapshot(cards);
                    deck.shuffle(&mut rng);
                    combat.bind_deck(unit, deck);
                }
                None => warn!(target: "runtime::session", %unit, "unit has no deck composition"),
            }
        }

        let mut relics = RelicManager::new();
        for relic in &setup.relics {
            if let Err(e) = relics.acquire(Arc::clone(relic), Some(&mut combat)) {
                warn!(target: "runtime::session", relic = %relic.id, error = %e, "starting relic rejected");
                combat.emit(CombatEvent::diagnostic(e.error_code(), e.to_string()));
            }
        }

        info!(
            target: "runtime::session",
            seed,
            enemies = setup.enemies.len(),
            relics = relics.len(),
            threshold = combat.global_threshold().get(),
            "combat session created"
        );

        Ok(Self {
            state: SessionState {
                combat,
                battle: BattleState::new(),
                relics,
                targeting: TargetingController::new(),
                queue: ActionQueue::new(),
                rng,
            },
            player: PlayerPhaseController,
            enemies: EnemyPhaseController::new(Arc::clone(&oracles.tuning), config.pacing.clone()),
            resolution: ResolutionController::new(bridge, config.pacing.clone()),
            bus,
            oracles,
            input_debounce: config.input_debounce,
            last_input: None,
            started: false,
            seed,
        })
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    /// Seed of the session RNG; replaying it reproduces every shuffle.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn combat(&self) -> &CombatContext {
        &self.state.combat
    }

    pub fn battle(&self) -> &BattleState {
        &self.state.battle
    }

    pub fn relics(&self) -> &RelicManager {
        &self.state.relics
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot::capture(&self.state)
    }

    pub async fn start_game(&mut self) -> Result<BattleSnapshot> {
        self.apply(Mutation::StartGame).await
    }

    pub async fn draw(&mut self, phase: PhaseKind) -> Result<BattleSnapshot> {
        self.apply(Mutation::Draw(phase)).await
    }

    pub async fn accept(&mut self, phase: PhaseKind) -> Result<BattleSnapshot> {
        self.apply(Mutation::Accept(phase)).await
    }

    pub async fn select_target(&mut self, enemy: UnitId) -> Result<BattleSnapshot> {
        self.apply(Mutation::SelectTarget(enemy)).await
    }

    pub async fn set_threshold(
        &mut self,
        actor: Actor,
        phase: PhaseKind,
        value: u32,
    ) -> Result<BattleSnapshot> {
        self.apply(Mutation::SetThreshold {
            actor,
            phase,
            value,
        })
        .await
    }

    /// Runs one command to completion and returns the resulting snapshot.
    pub async fn apply(&mut self, mutation: Mutation) -> Result<BattleSnapshot> {
        if let Err(e) = self.guard(&mutation) {
            return Err(self.reject(mutation, e));
        }
        debug!(target: "runtime::session", ?mutation, "command accepted");

        self.state.battle.busy = true;
        let result = match mutation {
            Mutation::StartGame => {
                self.start_game_inner().await;
                Ok(())
            }
            Mutation::Draw(phase) => self.player_command(phase, false).await,
            Mutation::Accept(phase) => self.player_command(phase, true).await,
            Mutation::SelectTarget(enemy) => self.select_target_inner(enemy).await,
            Mutation::SetThreshold {
                actor,
                phase,
                value,
            } => self.set_threshold_inner(actor, phase, value),
        };
        self.state.battle.busy = false;
        self.state.flush(&self.bus);

        match result {
            Ok(()) => Ok(self.snapshot()),
            Err(e) => Err(self.reject(mutation, e)),
        }
    }

    /// Acquires a relic mid-encounter. Lifecycle effects apply immediately.
    pub fn acquire_relic(&mut self, relic: Arc<RelicDefinition>) -> Result<AcquireOutcome> {
        let outcome = self
            .state
            .relics
            .acquire(relic, Some(&mut self.state.combat));
        self.state.flush(&self.bus);
        Ok(outcome?)
    }

    pub fn lose_relic(&mut self, id: &str) -> Result<()> {
        let result = self.state.relics.lose(id, Some(&mut self.state.combat));
        self.state.flush(&self.bus);
        result.map(|_| ()).map_err(RuntimeError::from)
    }

    // ===== guards =====

    fn guard(&mut self, mutation: &Mutation) -> Result<()> {
        if let Some(outcome) = self.state.battle.outcome {
            return Err(RuntimeError::GameOver { outcome });
        }
        if self.state.battle.busy {
            return Err(RuntimeError::Busy);
        }
        match mutation {
            Mutation::StartGame if self.started => return Err(RuntimeError::AlreadyStarted),
            Mutation::Draw(_) | Mutation::Accept(_) | Mutation::SelectTarget(_)
                if !self.started =>
            {
                return Err(RuntimeError::NotStarted);
            }
            _ => {}
        }

        let now = Instant::now();
        if let Some(last) = self.last_input {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.input_debounce {
                return Err(RuntimeError::Debounced {
                    remaining: self.input_debounce - elapsed,
                });
            }
        }
        self.last_input = Some(now);
        Ok(())
    }

    fn reject(&mut self, mutation: Mutation, error: RuntimeError) -> RuntimeError {
        debug!(
            target: "runtime::session",
            command = mutation.name(),
            code = error.error_code(),
            error = %error,
            "command rejected"
        );
        self.state.diagnose(&error);
        self.state.flush(&self.bus);
        error
    }

    // ===== commands =====

    async fn start_game_inner(&mut self) {
        self.started = true;
        info!(
            target: "runtime::session",
            player_hp = self.state.combat.player().hp,
            enemies = self.state.combat.enemies().len(),
            "combat started"
        );
        self.start_turn().await;
    }

    async fn player_command(&mut self, phase: PhaseKind, accept: bool) -> Result<()> {
        let step = self.state.battle.step;
        if step.player_phase() != Some(phase) {
            return Err(RuntimeError::InvalidStep {
                step,
                command: if accept { "accept" } else { "draw" },
            });
        }

        if accept {
            self.player.accept(&mut self.state, &self.bus, phase).await;
        } else {
            self.player.draw(&mut self.state, &self.bus, phase).await;
        }

        if self.state.battle.step == Step::SelectTarget && self.state.targeting.selected().is_some()
        {
            self.finish_round().await;
        }
        Ok(())
    }

    async fn select_target_inner(&mut self, enemy: UnitId) -> Result<()> {
        self.state
            .targeting
            .try_select_target(&mut self.state.combat, &mut self.state.battle, enemy)?;
        self.finish_round().await;
        Ok(())
    }

    fn set_threshold_inner(&mut self, actor: Actor, phase: PhaseKind, value: u32) -> Result<()> {
        let threshold = Threshold::new(value)?;
        match actor {
            Actor::Player => {
                let combat = &mut self.state.combat;
                combat.set_threshold_override(Actor::Player, phase, threshold);
                let effective = combat.effective_threshold(Actor::Player, phase, &self.state.relics);
                let total = combat.accumulator(Actor::Player, phase).total();
                combat.emit(CombatEvent::PhaseProgress {
                    actor,
                    unit: Some(UnitId::PLAYER),
                    phase,
                    total,
                    threshold: effective.get(),
                });
            }
            // Enemy overrides are per enemy and apply from the next rebind.
            Actor::Enemy => {
                let ids: Vec<UnitId> = self.state.combat.enemies().iter().map(|e| e.id).collect();
                for id in ids {
                    self.state.combat.set_enemy_threshold(id, phase, threshold);
                }
            }
        }
        info!(target: "runtime::session", %actor, %phase, value, "threshold override set");
        Ok(())
    }

    // ===== round flow =====

    async fn start_turn(&mut self) {
        self.state
            .targeting
            .cancel_target_mode(&mut self.state.battle);
        self.state.battle.reset_for_new_turn();
        self.state.battle.busy = true;

        let turn = self.state.battle.turn;
        let step = self.state.battle.step;
        self.state.combat.emit(CombatEvent::RoundStarted { turn });
        self.state.combat.emit(CombatEvent::StepChanged { step });
        self.state
            .relics
            .notify(&LifecycleHook::TurnStart { turn }, Some(&mut self.state.combat));
        self.state.flush(&self.bus);
        info!(target: "runtime::session", turn, "turn started");

        self.state.queue.enqueue(CombatAction::StartTurn);
        run_queue(&mut self.state, &self.bus).await;
        self.enemies.run(&mut self.state, &self.bus).await;
    }

    async fn finish_round(&mut self) {
        while self.state.battle.step != Step::Resolve {
            self.state.advance_step();
        }
        self.state.flush(&self.bus);

        if self
            .resolution
            .resolve(&mut self.state, &self.bus)
            .await
            .is_none()
        {
            self.start_turn().await;
        }
    }
}

impl std::fmt::Debug for CombatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatSession")
            .field("turn", &self.state.battle.turn)
            .field("step", &self.state.battle.step)
            .field("started", &self.started)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}
