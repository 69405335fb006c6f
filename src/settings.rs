//! Driver settings with persistence
//!
//! Settings are saved to `~/.config/armory/settings.toml`

use std::fs;
use std::path::PathBuf;

use armory_core::{ClockConfig, Name, SimClock};
use armory_game::{CharacterLayout, EffectConfig, SlotId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All driver settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorySettings {
    pub simulation: SimulationSettings,
    pub layout: CharacterLayout,
    pub effects: EffectConfig,
    /// Item catalog to load instead of the built-in one
    pub catalog_path: Option<PathBuf>,
    /// Items equipped at startup
    pub loadout: Vec<LoadoutEntry>,
}

impl ArmorySettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("armory"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => {
                let settings = Self::parse(&content);
                info!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Parse settings text, falling back to defaults for anything unusable
    fn parse(content: &str) -> Self {
        let mut settings: Self = match toml::from_str(content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to parse settings: {}, using defaults", e);
                return Self::default();
            }
        };
        if let Err(e) = settings.simulation.validate() {
            warn!("Invalid simulation settings: {}, using defaults", e);
            settings.simulation = SimulationSettings::default();
        }
        settings
    }

    /// Save settings to disk
    #[allow(dead_code)]
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Loadout used when none is configured
    pub fn effective_loadout(&self) -> Vec<LoadoutEntry> {
        if !self.loadout.is_empty() {
            return self.loadout.clone();
        }
        [
            (0, "Iron Helm"),
            (2, "Chainmail"),
            (5, "Traveler Boots"),
            (6, "Longsword"),
            (7, "Oak Buckler"),
        ]
        .into_iter()
        .map(|(slot, item)| LoadoutEntry {
            slot,
            item: Name::from(item),
        })
        .collect()
    }
}

/// Simulation run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub clock: ClockConfig,
    /// Simulated seconds to run before stopping
    pub run_seconds: f32,
    /// Raw frame delta fed to the clock
    pub frame_delta: f32,
}

impl SimulationSettings {
    /// Check that a run with these settings advances time and terminates
    pub fn validate(&self) -> anyhow::Result<()> {
        SimClock::new(self.clock.clone())?;
        if !(self.frame_delta.is_finite() && self.frame_delta > 0.0) {
            anyhow::bail!("frame delta must be positive and finite, got {}", self.frame_delta);
        }
        if !(self.run_seconds.is_finite() && self.run_seconds >= 0.0) {
            anyhow::bail!("run seconds must be non-negative and finite, got {}", self.run_seconds);
        }
        Ok(())
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            run_seconds: 12.0,
            frame_delta: 1.0 / 60.0,
        }
    }
}

/// One slot assignment in the startup loadout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadoutEntry {
    pub slot: SlotId,
    pub item: Name,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let settings = ArmorySettings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let back: ArmorySettings = toml::from_str(&text).unwrap();
        assert_eq!(back.layout, settings.layout);
        assert_eq!(back.simulation.run_seconds, settings.simulation.run_seconds);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let settings: ArmorySettings = toml::from_str("[simulation]\nrun_seconds = 3.0").unwrap();
        assert_eq!(settings.simulation.run_seconds, 3.0);
        assert_eq!(settings.effects, EffectConfig::default());
        assert_eq!(settings.effective_loadout().len(), 5);
    }

    #[test]
    fn zero_frame_delta_falls_back_to_defaults() {
        let settings = ArmorySettings::parse("[simulation]\nframe_delta = 0.0\nrun_seconds = 3.0");
        assert_eq!(settings.simulation.frame_delta, SimulationSettings::default().frame_delta);
        assert_eq!(settings.simulation.run_seconds, 12.0);
    }

    #[test]
    fn stalled_clock_settings_are_rejected() {
        let settings: ArmorySettings =
            toml::from_str("[simulation.clock]\ntime_scale = 0.0").unwrap();
        assert!(settings.simulation.validate().is_err());

        let settings: ArmorySettings =
            toml::from_str("[simulation.clock]\nmax_delta_time = -1.0").unwrap();
        assert!(settings.simulation.validate().is_err());

        let settings = ArmorySettings::parse("[simulation.clock]\nmax_delta_time = -1.0");
        assert!(settings.simulation.validate().is_ok());
    }

    #[test]
    fn default_simulation_is_valid() {
        assert!(SimulationSettings::default().validate().is_ok());
    }
}
