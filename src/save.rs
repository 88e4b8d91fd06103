//! Save/load system with named save slots
//!
//! A save holds the player's talents, combat stats with active auras and the
//! world timers, written in the versioned binary format. Skill cooldowns are
//! not saved; skills are rebuilt from talents and start ready.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use emberfall_combat::{Statable, TalentTree, WorldTimers};
use emberfall_core::{BinaryReader, BinaryWriter, CodecError, Versioned};
use tracing::info;

/// Top-level save data
#[derive(Debug)]
pub struct SaveGame {
    /// When the save was written
    pub timestamp: DateTime<Utc>,
    /// Simulated seconds played
    pub play_time_seconds: f64,
    pub talents: TalentTree,
    pub player: Statable,
    pub timers: WorldTimers,
}

impl SaveGame {
    pub fn new(
        play_time_seconds: f64,
        talents: TalentTree,
        player: Statable,
        timers: WorldTimers,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            play_time_seconds,
            talents,
            player,
            timers,
        }
    }
}

/// Layout v1: timestamp millis, play time, talents, player, timers
impl Versioned for SaveGame {
    const TYPE_NAME: &'static str = "SaveGame";
    const VERSION: u32 = 1;
    const MIN_VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut BinaryWriter) {
        writer.write_u64(self.timestamp.timestamp_millis().max(0) as u64);
        writer.write_f64(self.play_time_seconds);
        self.talents.serialize(writer);
        self.player.serialize(writer);
        self.timers.serialize(writer);
    }

    fn read_fields(reader: &mut BinaryReader<'_>, _version: u32) -> Result<Self, CodecError> {
        let millis = reader.read_u64()?;
        let timestamp = i64::try_from(millis)
            .ok()
            .and_then(|m| Utc.timestamp_millis_opt(m).single())
            .unwrap_or_default();
        Ok(Self {
            timestamp,
            play_time_seconds: reader.read_f64()?,
            talents: TalentTree::deserialize(reader)?,
            player: Statable::deserialize(reader)?,
            timers: WorldTimers::deserialize(reader)?,
        })
    }
}

/// Get the save directory path, creating it if it doesn't exist
fn save_dir() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("emberfall")
        .join("saves");
    fs::create_dir_all(&dir).context("Failed to create save directory")?;
    Ok(dir)
}

/// Get the path for a named save slot
fn slot_path(slot: &str) -> Result<PathBuf> {
    Ok(save_dir()?.join(format!("{}.sav", sanitize_filename(slot))))
}

/// Sanitize a slot name into a valid filename
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}

/// Save to a named slot
pub fn save_to_slot(slot: &str, save: &SaveGame) -> Result<PathBuf> {
    let path = slot_path(slot)?;
    write_save(&path, save)?;
    info!("Saved game to {:?}", path);
    Ok(path)
}

/// Check if a save exists in the named slot
pub fn slot_exists(slot: &str) -> bool {
    slot_path(slot).map(|p| p.exists()).unwrap_or(false)
}

/// Load from a named slot
pub fn load_from_slot(slot: &str) -> Result<SaveGame> {
    let path = slot_path(slot)?;
    read_save(&path)
}

pub fn write_save(path: &Path, save: &SaveGame) -> Result<()> {
    fs::write(path, save.to_bytes()).context("Failed to write save file")?;
    Ok(())
}

pub fn read_save(path: &Path) -> Result<SaveGame> {
    let bytes = fs::read(path).context("Failed to read save file")?;
    let save = SaveGame::from_bytes(&bytes)
        .with_context(|| format!("Failed to decode save file {:?}", path))?;
    Ok(save)
}

/// Format play time as "Xh Ym" or "Ym Zs"
pub fn format_play_time(seconds: f64) -> String {
    let total_secs = seconds as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}
