use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, oneshot};
use tokio::time::{self, Instant};

use combat_content::{DeckSpec, EncounterSetup, EnemyTemplate};
use combat_core::{
    Band, Card, CombatConfig, CombatEvent, EnemyTuning, Outcome, PhaseKind, Rank, Step, Suit,
    UnitId,
};
use runtime::{
    AnimationBridge, AnimationTicket, AttackRequest, BattleSnapshot, Event, PacingConfig,
    PlayerCommand, PlayerProvider, Runtime, RuntimeConfig, RuntimeError, RuntimeHandle, Topic,
};

// ================================================================
// Fixtures
// ================================================================
//
// Every card is worth a fixed value so the whole encounter is
// deterministic regardless of shuffle order: the player stands on 6+6+6
// and every goblin stands on 5+5+5 inside its [14, 18] band.

fn cards(value: u32, count: usize) -> Vec<Card> {
    vec![Card::with_value(Rank::Two, Suit::None, value); count]
}

fn goblin(id: &str, hp: u32) -> EnemyTemplate {
    EnemyTemplate::new(id, "Goblin", hp)
        .with_deck(DeckSpec::custom(cards(5, 24)))
        .with_tuning(EnemyTuning {
            defense_band: Some(Band::new(14, 18)),
            attack_band: Some(Band::new(14, 18)),
            ..EnemyTuning::default()
        })
}

fn encounter(enemy_hp: &[u32]) -> EncounterSetup {
    enemy_hp.iter().enumerate().fold(
        EncounterSetup::new(CombatConfig::default()).with_player_deck(cards(6, 30)),
        |setup, (index, &hp)| setup.with_enemy(goblin(&format!("goblin-{index}"), hp)),
    )
}

async fn start(config: RuntimeConfig, setup: EncounterSetup) -> Runtime {
    Runtime::builder()
        .config(config.with_seed(11))
        .encounter(setup)
        .build()
        .await
        .expect("runtime should build")
}

/// Draws three cards and accepts, for one player phase.
async fn play_phase(handle: &RuntimeHandle, phase: PhaseKind) -> BattleSnapshot {
    for _ in 0..3 {
        handle.draw(phase).await.expect("draw should be accepted");
    }
    handle.accept(phase).await.expect("accept should be accepted")
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event.payload);
    }
    events
}

// ================================================================
// Round flow
// ================================================================

/// One full round against a single goblin:
/// player attack 18 vs defense 15 deals 3, goblin attack 15 is fully
/// absorbed by the player's 18 block, then turn 2 opens.
#[tokio::test(start_paused = true)]
async fn single_enemy_round_resolves_and_opens_next_turn() {
    let runtime = start(RuntimeConfig::instant(), encounter(&[20])).await;
    let handle = runtime.handle();
    let mut combat_rx = handle.subscribe(Topic::Combat);
    let mut turn_rx = handle.subscribe(Topic::Turn);

    let snapshot = handle.start_game().await.expect("combat should start");
    assert_eq!(snapshot.turn, 1);
    assert_eq!(snapshot.step, Step::PlayerDef);
    assert_eq!(snapshot.enemies[0].defense, Some(15));
    assert_eq!(snapshot.enemies[0].attack, Some(15));

    let snapshot = play_phase(&handle, PhaseKind::Defense).await;
    assert_eq!(snapshot.player_def_total, Some(18));
    assert_eq!(snapshot.step, Step::PlayerAtk);

    let snapshot = play_phase(&handle, PhaseKind::Attack).await;
    assert_eq!(snapshot.turn, 2);
    assert_eq!(snapshot.step, Step::PlayerDef);
    assert_eq!(snapshot.enemies[0].unit.hp, 17);
    assert_eq!(snapshot.player.hp, CombatConfig::DEFAULT_PLAYER_MAX_HP);

    let combat = drain(&mut combat_rx);
    assert!(combat.contains(&CombatEvent::DamageApplied {
        attacker: UnitId::PLAYER,
        defender: UnitId(1),
        amount: 3,
        remaining_hp: 17,
    }));
    assert!(combat.contains(&CombatEvent::Blocked {
        attacker: UnitId(1),
        defender: UnitId::PLAYER,
    }));

    let turn = drain(&mut turn_rx);
    assert!(turn.contains(&CombatEvent::TargetChanged {
        target: Some(UnitId(1)),
        auto: true,
    }));
    assert!(turn.contains(&CombatEvent::RoundResolved { turn: 1 }));
    assert!(turn.contains(&CombatEvent::RoundStarted { turn: 2 }));

    runtime.shutdown().await.expect("worker should stop");
}

/// With two goblins the round pauses at target selection; bad commands are
/// rejected without mutation and reported on the diagnostic topic.
#[tokio::test(start_paused = true)]
async fn multiple_enemies_wait_for_a_target() {
    let runtime = start(RuntimeConfig::instant(), encounter(&[20, 20])).await;
    let handle = runtime.handle();
    let mut diagnostics = handle.subscribe(Topic::Diagnostic);

    handle.start_game().await.expect("combat should start");
    play_phase(&handle, PhaseKind::Defense).await;
    let waiting = play_phase(&handle, PhaseKind::Attack).await;
    assert_eq!(waiting.step, Step::SelectTarget);
    assert!(waiting.waiting_for_target);
    assert_eq!(waiting.current_target, None);

    let err = handle.draw(PhaseKind::Attack).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::InvalidStep {
            step: Step::SelectTarget,
            ..
        }
    ));
    let err = handle.select_target(UnitId(9)).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Targeting(_)));
    assert_eq!(handle.snapshot().await.unwrap(), waiting);

    let rejected = drain(&mut diagnostics);
    assert_eq!(rejected.len(), 2);
    assert!(matches!(
        &rejected[0],
        CombatEvent::Diagnostic { code, .. } if code == "RUNTIME_INVALID_STEP"
    ));

    let snapshot = handle
        .select_target(UnitId(2))
        .await
        .expect("living enemy should be selectable");
    assert_eq!(snapshot.turn, 2);
    assert_eq!(snapshot.enemy(UnitId(1)).unwrap().unit.hp, 20);
    assert_eq!(snapshot.enemy(UnitId(2)).unwrap().unit.hp, 17);
    // Block 18 absorbs the first 15, the second goblin deals 15 - 3.
    assert_eq!(snapshot.player.hp, CombatConfig::DEFAULT_PLAYER_MAX_HP - 12);
}

#[tokio::test(start_paused = true)]
async fn killing_the_last_enemy_ends_combat() {
    let runtime = start(RuntimeConfig::instant(), encounter(&[3])).await;
    let handle = runtime.handle();
    let mut turn_rx = handle.subscribe(Topic::Turn);

    handle.start_game().await.expect("combat should start");
    play_phase(&handle, PhaseKind::Defense).await;
    let snapshot = play_phase(&handle, PhaseKind::Attack).await;

    assert_eq!(snapshot.outcome, Some(Outcome::Victory));
    assert_eq!(snapshot.turn, 1);
    assert!(snapshot.is_over());
    assert_eq!(snapshot.open_phase(), None);
    assert!(drain(&mut turn_rx).contains(&CombatEvent::GameOver {
        outcome: Outcome::Victory
    }));

    let err = handle.draw(PhaseKind::Defense).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::GameOver {
            outcome: Outcome::Victory
        }
    ));
}

// ================================================================
// Command guards
// ================================================================

/// Commands that arrive while enemies are still drawing are rejected as
/// busy; snapshot queries are still answered.
#[tokio::test(start_paused = true)]
async fn commands_during_enemy_phase_are_rejected_as_busy() {
    let config = RuntimeConfig {
        pacing: PacingConfig {
            enemy_draw_delay_min: Duration::from_secs(10),
            enemy_draw_delay_max: Duration::from_secs(10),
            ..PacingConfig::instant()
        },
        ..RuntimeConfig::instant()
    };
    let runtime = start(config, encounter(&[20])).await;
    let handle = runtime.handle();
    let mut diagnostics = handle.subscribe(Topic::Diagnostic);

    let starter = tokio::spawn({
        let handle = handle.clone();
        async move { handle.start_game().await }
    });
    time::sleep(Duration::from_millis(1)).await;

    let err = handle.draw(PhaseKind::Defense).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Busy));
    assert!(handle.snapshot().await.unwrap().busy);
    assert!(matches!(
        diagnostics.try_recv().unwrap().payload,
        CombatEvent::Diagnostic { ref code, .. } if code == "RUNTIME_BUSY"
    ));

    let snapshot = starter.await.unwrap().expect("start should finish");
    assert!(!snapshot.busy);
    assert_eq!(snapshot.enemies[0].attack, Some(15));
    handle
        .draw(PhaseKind::Defense)
        .await
        .expect("idle session accepts commands");
}

#[tokio::test(start_paused = true)]
async fn rapid_commands_are_debounced() {
    let config = RuntimeConfig {
        input_debounce: Duration::from_millis(150),
        ..RuntimeConfig::instant()
    };
    let runtime = start(config, encounter(&[20])).await;
    let handle = runtime.handle();

    handle.start_game().await.expect("combat should start");
    let err = handle.draw(PhaseKind::Defense).await.unwrap_err();
    let RuntimeError::Debounced { remaining } = err else {
        panic!("expected debounce, got {err:?}");
    };
    assert_eq!(remaining, Duration::from_millis(150));
    assert_eq!(handle.snapshot().await.unwrap().player_defense.total(), 0);

    time::sleep(remaining).await;
    let snapshot = handle
        .draw(PhaseKind::Defense)
        .await
        .expect("draw after the debounce window");
    assert_eq!(snapshot.player_defense.total(), 6);
}

// ================================================================
// Terminal draws
// ================================================================

fn against_one_goblin(config: CombatConfig, player_deck: Vec<Card>) -> EncounterSetup {
    EncounterSetup::new(config)
        .with_player_deck(player_deck)
        .with_enemy(goblin("goblin-0", 20))
}

/// Tens bust on the third card: defense locks at zero without an accept
/// and the goblin's 15 lands in full.
#[tokio::test(start_paused = true)]
async fn busted_defense_locks_zero_and_advances() {
    let setup = against_one_goblin(CombatConfig::default(), cards(10, 30));
    let runtime = start(RuntimeConfig::instant(), setup).await;
    let handle = runtime.handle();
    handle.start_game().await.expect("combat should start");

    handle.draw(PhaseKind::Defense).await.unwrap();
    handle.draw(PhaseKind::Defense).await.unwrap();
    let snapshot = handle.draw(PhaseKind::Defense).await.unwrap();
    assert_eq!(snapshot.player_def_total, Some(0));
    assert_eq!(snapshot.step, Step::PlayerAtk);
    let err = handle.accept(PhaseKind::Defense).await.unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidStep { .. }));

    handle.draw(PhaseKind::Attack).await.unwrap();
    handle.draw(PhaseKind::Attack).await.unwrap();
    let snapshot = handle.accept(PhaseKind::Attack).await.unwrap();
    assert_eq!(snapshot.turn, 2);
    assert_eq!(snapshot.enemies[0].unit.hp, 15);
    assert_eq!(snapshot.player.hp, CombatConfig::DEFAULT_PLAYER_MAX_HP - 15);
}

#[tokio::test(start_paused = true)]
async fn joker_locks_the_threshold_on_the_first_draw() {
    let setup = against_one_goblin(CombatConfig::default(), vec![Card::joker(); 30]);
    let runtime = start(RuntimeConfig::instant(), setup).await;
    let handle = runtime.handle();
    handle.start_game().await.expect("combat should start");

    let snapshot = handle.draw(PhaseKind::Defense).await.unwrap();
    assert_eq!(snapshot.player_def_total, Some(21));
    assert_eq!(snapshot.step, Step::PlayerAtk);

    let snapshot = handle.draw(PhaseKind::Attack).await.unwrap();
    // 21 against a defense of 15; the goblin's 15 is blocked.
    assert_eq!(snapshot.turn, 2);
    assert_eq!(snapshot.enemies[0].unit.hp, 14);
    assert_eq!(snapshot.player.hp, CombatConfig::DEFAULT_PLAYER_MAX_HP);
}

#[tokio::test(start_paused = true)]
async fn losing_all_hp_ends_in_defeat() {
    let setup = against_one_goblin(CombatConfig::default().with_player_max_hp(10), cards(10, 30));
    let runtime = start(RuntimeConfig::instant(), setup).await;
    let handle = runtime.handle();
    handle.start_game().await.expect("combat should start");

    for _ in 0..3 {
        handle.draw(PhaseKind::Defense).await.unwrap();
    }
    handle.draw(PhaseKind::Attack).await.unwrap();
    handle.draw(PhaseKind::Attack).await.unwrap();
    let snapshot = handle.accept(PhaseKind::Attack).await.unwrap();
    assert_eq!(snapshot.outcome, Some(Outcome::Defeat));
    assert_eq!(snapshot.player.hp, 0);
    assert_eq!(snapshot.enemies[0].unit.hp, 15);

    let err = handle.draw(PhaseKind::Defense).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::GameOver {
            outcome: Outcome::Defeat
        }
    ));
}

// ================================================================
// Animation
// ================================================================

/// Never acknowledges anything; keeps the senders alive so the runtime has
/// to fall back to its timeout.
#[derive(Default)]
struct StalledBridge {
    held: Mutex<Vec<(oneshot::Sender<()>, oneshot::Sender<()>)>>,
}

impl AnimationBridge for StalledBridge {
    fn play_attack(&self, _request: &AttackRequest) -> AnimationTicket {
        let (impact_tx, impact) = oneshot::channel();
        let (done_tx, done) = oneshot::channel();
        self.held.lock().unwrap().push((impact_tx, done_tx));
        AnimationTicket { impact, done }
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_animations_time_out_and_still_apply_damage() {
    let config = RuntimeConfig {
        pacing: PacingConfig {
            animation_timeout: Duration::from_secs(3),
            ..PacingConfig::instant()
        },
        ..RuntimeConfig::instant()
    };
    let bridge = Arc::new(StalledBridge::default());
    let runtime = Runtime::builder()
        .config(config.with_seed(5))
        .encounter(encounter(&[20]))
        .animation_bridge(bridge.clone())
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();

    handle.start_game().await.expect("combat should start");
    play_phase(&handle, PhaseKind::Defense).await;
    let started = Instant::now();
    let snapshot = play_phase(&handle, PhaseKind::Attack).await;

    // One player strike and one (blocked) goblin strike, 3s each.
    assert!(started.elapsed() >= Duration::from_secs(6));
    assert_eq!(bridge.held.lock().unwrap().len(), 2);
    assert_eq!(snapshot.enemies[0].unit.hp, 17);
    assert_eq!(snapshot.turn, 2);
}

// ================================================================
// Provider-driven play
// ================================================================

/// Draws to 18, then accepts; targets the weakest living enemy.
struct StandOnEighteen;

#[async_trait]
impl PlayerProvider for StandOnEighteen {
    async fn decide(&self, snapshot: &BattleSnapshot) -> runtime::Result<PlayerCommand> {
        if let Some(phase) = snapshot.open_phase() {
            return Ok(if snapshot.accumulator(phase).total() >= 18 {
                PlayerCommand::Accept(phase)
            } else {
                PlayerCommand::Draw(phase)
            });
        }
        let target = snapshot
            .living_enemies()
            .min_by_key(|enemy| enemy.unit.hp)
            .map(|enemy| enemy.unit.id)
            .ok_or(RuntimeError::NotStarted)?;
        Ok(PlayerCommand::SelectTarget(target))
    }
}

#[tokio::test(start_paused = true)]
async fn provider_plays_the_encounter_to_victory() {
    let config = RuntimeConfig {
        input_debounce: Duration::from_millis(50),
        ..RuntimeConfig::instant()
    };
    let runtime = start(config, encounter(&[9, 6])).await;

    let outcome = runtime
        .play(&StandOnEighteen)
        .await
        .expect("encounter should finish");
    assert_eq!(outcome, Outcome::Victory);

    let snapshot = runtime.handle().snapshot().await.unwrap();
    assert!(snapshot.living_enemies().next().is_none());
    assert!(snapshot.player.hp > 0);

    runtime.shutdown().await.expect("worker should stop");
}

// ================================================================
// Shutdown
// ================================================================

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_worker_while_handles_are_alive() {
    let runtime = start(RuntimeConfig::instant(), encounter(&[20])).await;
    let handle = runtime.handle();
    let _events = handle.subscribe_all();
    handle.start_game().await.expect("combat should start");

    time::timeout(Duration::from_secs(1), runtime.shutdown())
        .await
        .expect("shutdown should not wait for handles")
        .expect("worker should stop");

    let err = handle.snapshot().await.unwrap_err();
    assert!(matches!(err, RuntimeError::CommandChannelClosed));
}

/// A shutdown that arrives mid-command lets that command finish first.
#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_the_running_command() {
    let config = RuntimeConfig {
        pacing: PacingConfig {
            enemy_draw_delay_min: Duration::from_secs(1),
            enemy_draw_delay_max: Duration::from_secs(1),
            ..PacingConfig::instant()
        },
        ..RuntimeConfig::instant()
    };
    let runtime = start(config, encounter(&[20])).await;
    let handle = runtime.handle();

    let starter = tokio::spawn({
        let handle = handle.clone();
        async move { handle.start_game().await }
    });
    time::sleep(Duration::from_millis(1)).await;

    time::timeout(Duration::from_secs(60), runtime.shutdown())
        .await
        .expect("shutdown should finish once the command does")
        .expect("worker should stop");

    let snapshot = starter.await.unwrap().expect("start should complete");
    assert_eq!(snapshot.turn, 1);
    assert_eq!(snapshot.enemies[0].attack, Some(15));
    assert!(matches!(
        handle.draw(PhaseKind::Defense).await,
        Err(RuntimeError::CommandChannelClosed)
    ));
}
