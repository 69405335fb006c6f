//! Armory - headless driver for the equipment and effect runtime
//!
//! Builds one character from the configured layout, equips a loadout, runs fixed
//! simulation steps with a couple of timed effects, and pushes snapshots to a
//! display observer at a lower cadence.

mod settings;

use anyhow::{Context, Result};
use armory_core::{Name, SimClock};
use armory_game::{
    Character, CharacterSnapshot, EffectMirror, EffectObject, EffectObjects, ExpiryReason,
    ItemRegistry, PeriodicEffect,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use settings::ArmorySettings;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

/// Stand-in for the in-world object that would deal an effect's damage
struct LoggedEffect {
    name: Name,
}

impl EffectObject for LoggedEffect {
    fn stop(&mut self, reason: ExpiryReason) {
        info!("Effect object '{}' stopped ({:?})", self.name, reason);
    }
}

fn load_registry(settings: &ArmorySettings) -> Result<ItemRegistry> {
    match &settings.catalog_path {
        Some(path) => ItemRegistry::load(path)
            .with_context(|| format!("loading item catalog {}", path.display())),
        None => ItemRegistry::from_toml_str(BUILTIN_CATALOG).context("parsing built-in catalog"),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting Armory...");

    let settings = ArmorySettings::load();
    let registry = load_registry(&settings)?;
    let mut character = Character::new(&settings.layout)?;

    for entry in settings.effective_loadout() {
        if let Err(e) = character.equip(&registry, entry.slot, &entry.item) {
            warn!("Could not equip '{}' in slot {}: {}", entry.item, entry.slot, e);
        }
    }

    for (name, value) in character.attributes(&registry).totals() {
        info!("{:>14}: {:+.2}", name, value);
    }

    let mut objects = EffectObjects::new();
    let burning = objects.insert(Box::new(LoggedEffect {
        name: Name::from("Burning"),
    }));
    let tracker = character.effects_mut();
    tracker.activate(
        PeriodicEffect::new("Burning", 5.0)
            .with_damage_display(12.0)
            .with_object(burning),
        None,
    )?;
    let regen = tracker.activate(PeriodicEffect::new("Regeneration", 8.0), None)?;
    tracker.activate(PeriodicEffect::new("Haste", 10.0), Some(4.0))?;

    let mut clock = SimClock::new(settings.simulation.clock.clone())?;
    let mut mirror = EffectMirror::new();
    let mut since_snapshot = f32::MAX;
    let mut refreshed = false;

    while clock.total_time < settings.simulation.run_seconds as f64 {
        let frame = settings.simulation.frame_delta;
        clock.advance(frame);
        for _ in 0..clock.drain_steps() {
            for expired in character.step(clock.step_delta(), &mut objects) {
                info!(
                    "'{}' ended at t={:.2}s ({:?})",
                    expired.effect.name, clock.total_time, expired.reason
                );
            }
            since_snapshot += clock.step_delta();
        }

        // Ability system refreshes regeneration once, halfway through
        if !refreshed && clock.total_time >= 4.0 {
            character.effects_mut().refresh(regen, 8.0)?;
            refreshed = true;
        }

        if since_snapshot >= settings.effects.snapshot_interval {
            since_snapshot = 0.0;
            let wire = serde_json::to_string(&character.snapshot())?;
            let received: CharacterSnapshot = serde_json::from_str(&wire)?;
            mirror.apply_snapshot(&received.effects);
        }
        mirror.advance(frame);

        for (_, effect) in mirror.iter() {
            debug!(
                "[display] {} {:.2}s / {:.2}s",
                effect.name,
                effect.client_current_duration(),
                effect.max_duration()
            );
        }

        if character.effects().is_empty() && mirror.is_empty() {
            break;
        }
    }

    info!(
        "Finished after {} steps ({:.2}s simulated)",
        clock.step_count, clock.total_time
    );
    let final_state = serde_json::to_string_pretty(&character.snapshot())?;
    info!("Final state:\n{}", final_state);
    Ok(())
}
