//! Emberfall - Headless combat arena
//!
//! Loads settings, restores the player from a save slot when one exists,
//! runs the arena on a fixed-step clock, saves the result and prints a JSON
//! combat report.

mod arena;
mod save;
mod settings;

use anyhow::{bail, Context, Result};
use emberfall_core::SimClock;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::arena::Arena;
use crate::save::SaveGame;
use crate::settings::Settings;

const DEFAULT_SLOT: &str = "arena";

fn main() -> Result<()> {
    // Settings pick the log level, so they are loaded under a bootstrap subscriber
    let bootstrap = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    let settings = tracing::subscriber::with_default(bootstrap, Settings::load);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.logging.max_level())
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    if settings.simulation.fixed_timestep <= 0.0 || settings.simulation.time_scale <= 0.0 {
        bail!("fixed_timestep and time_scale must be positive");
    }

    let slot = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_SLOT.to_string());
    info!("Starting Emberfall arena (slot '{}')", slot);

    let (talents, player, timers, play_time) = if save::slot_exists(&slot) {
        let mut save = save::load_from_slot(&slot)
            .with_context(|| format!("Failed to load save slot '{}'", slot))?;
        info!(
            "Restored save from {} ({} played)",
            save.timestamp.format("%Y-%m-%d %H:%M:%S"),
            save::format_play_time(save.play_time_seconds)
        );
        if !save.player.is_alive() {
            info!("The hero fell last time, starting at full health");
            save.player.stats.hp = save.player.stats.max_hp;
        }
        (
            save.talents,
            Some(save.player),
            Some(save.timers),
            save.play_time_seconds,
        )
    } else {
        info!("No save in slot '{}', starting fresh", slot);
        (settings.talent_tree(), None, None, 0.0)
    };

    let mut arena = Arena::new(&settings, talents, player, timers)?;
    let mut clock = SimClock::new(settings.simulation.time_config());
    let duration = f64::from(settings.simulation.duration_secs);
    let frame = settings.simulation.fixed_timestep;

    while clock.elapsed < duration && arena.is_running() {
        for _ in 0..clock.advance(frame) {
            arena.step(clock.step_delta());
        }
    }

    let save = SaveGame::new(
        play_time + arena.elapsed(),
        arena.talents().clone(),
        arena.player_snapshot()?,
        arena.timers().clone(),
    );
    if let Err(e) = save::save_to_slot(&slot, &save) {
        warn!("Could not save the game: {:#}", e);
    }

    let report = arena.finish();
    info!(
        "Arena finished after {:.1}s: {} monsters slain, {} damage dealt, {} taken",
        report.simulated_seconds, report.monsters_slain, report.damage_dealt, report.damage_taken
    );
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
