//! Simulation settings with persistence
//!
//! Settings are saved to `~/.config/emberfall/settings.toml`

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use emberfall_combat::{ExhaustionPolicy, TalentId, TalentTree};
use emberfall_core::TimeConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Level};

/// All settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub combat: CombatSettings,
    /// Starting talent levels by talent name
    pub talents: BTreeMap<String, u8>,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let talents = [
            (TalentId::Firewhirl, 2),
            (TalentId::FirewhirlSplit, 1),
            (TalentId::Firewall, 1),
            (TalentId::Pyromania, 1),
            (TalentId::Haste, 1),
        ]
        .into_iter()
        .map(|(id, level)| (id.name().to_string(), level))
        .collect();
        Self {
            simulation: SimulationSettings::default(),
            combat: CombatSettings::default(),
            talents,
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("emberfall"))
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
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Build the starting talent tree. Unknown names are skipped.
    pub fn talent_tree(&self) -> TalentTree {
        let mut tree = TalentTree::new();
        for (name, level) in &self.talents {
            match TalentId::from_name(name) {
                Some(id) => {
                    let applied = tree.set_level(id, *level);
                    if applied != *level {
                        warn!("Talent {} capped at level {}", name, applied);
                    }
                }
                None => warn!("Unknown talent '{}' in settings", name),
            }
        }
        tree
    }
}

/// Fixed-step loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Time scale multiplier (affects simulation speed)
    pub time_scale: f32,
    /// Length of one simulation step in seconds
    pub fixed_timestep: f32,
    /// How long the arena runs, in simulated seconds
    pub duration_secs: f32,
    /// Seed for every random roll
    pub rng_seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            duration_secs: 30.0,
            rng_seed: 0x5eed,
        }
    }
}

impl SimulationSettings {
    pub fn time_config(&self) -> TimeConfig {
        TimeConfig {
            time_scale: self.time_scale.max(0.0),
            fixed_timestep: self.fixed_timestep,
            ..TimeConfig::default()
        }
    }
}

/// Combat tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    /// Aura instances allocated up front
    pub aura_pool_capacity: usize,
    /// What to do when the pool runs dry
    pub pool_exhaustion: ExhaustionPolicy,
    /// Monsters spawned in the arena
    pub monster_count: u32,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            aura_pool_capacity: 64,
            pool_exhaustion: ExhaustionPolicy::Reject,
            monster_count: 6,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    /// Parsed level, falling back to `INFO`
    pub fn max_level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}
