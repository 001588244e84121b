//! Headless terminal driver for a single encounter.
//!
//! Loads `.env`, resolves the encounter (from a content directory when
//! `COMBAT_CONTENT_DIR` is set, otherwise a built-in skirmish), plays it with
//! [`ScriptedPlayer`] and prints every combat event as one JSON line.
mod logging;
mod player;

use std::env;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use combat_content::{ContentFactory, DeckSpec, EncounterSetup, EnemyTemplate};
use combat_core::{Band, CombatConfig, EffectRegistry, EnemyTuning};
use runtime::{Event, Runtime, RuntimeConfig};

use player::ScriptedPlayer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = logging::setup(env::var("COMBAT_SESSION_ID").ok())?;

    let config = RuntimeConfig::from_env();
    let setup = load_encounter(&config.combat)?;
    info!(
        player = %setup.player_name,
        enemies = setup.enemies.len(),
        relics = setup.relics.len(),
        "encounter loaded"
    );

    let runtime = Runtime::builder().config(config).encounter(setup).build().await?;
    let printer = print_events(runtime.subscribe_all());

    let outcome = runtime.play(&ScriptedPlayer::default()).await?;
    runtime.shutdown().await?;
    printer.await.context("event printer panicked")?;

    println!("{}", serde_json::json!({ "outcome": outcome }));
    Ok(())
}

/// Resolves the encounter named by `COMBAT_ENCOUNTER` (default `tutorial`)
/// in `COMBAT_CONTENT_DIR`, or the built-in skirmish when no directory is set.
fn load_encounter(combat: &CombatConfig) -> Result<EncounterSetup> {
    let Ok(dir) = env::var("COMBAT_CONTENT_DIR") else {
        return Ok(skirmish(combat.clone()));
    };
    let name = env::var("COMBAT_ENCOUNTER").unwrap_or_else(|_| "tutorial".to_owned());
    ContentFactory::new(&dir)
        .load_encounter(&name, &EffectRegistry::default())
        .with_context(|| format!("failed to load encounter '{name}' from {dir}"))
}

fn skirmish(config: CombatConfig) -> EncounterSetup {
    let cautious = EnemyTuning {
        defense_band: Some(Band::new(15, 19)),
        attack_band: Some(Band::new(13, 17)),
        ..EnemyTuning::default()
    };
    EncounterSetup::new(config)
        .with_enemy(EnemyTemplate::new("slime", "Slime", 18).with_tuning(cautious))
        .with_enemy(
            EnemyTemplate::new("bat", "Bat", 10)
                .with_deck(DeckSpec::standard_with_jokers(1))
                .with_tuning(EnemyTuning {
                    attack_cap: Some(17),
                    ..EnemyTuning::default()
                }),
        )
}

/// Prints each event as a JSON line until the runtime shuts down.
fn print_events(mut rx: tokio::sync::broadcast::Receiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "failed to serialize event"),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}
