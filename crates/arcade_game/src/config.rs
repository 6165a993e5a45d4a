//! Game configuration, read from an optional JSON file.
//!
//! Every field has a default matching the shipped game tuning, so the file only
//! needs the values being changed. A missing file means "all defaults"; a
//! file that exists but does not parse is an error.

use std::fs;
use std::path::Path;

use arcade_core::scene::SceneKey;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SceneArg {
    Platformer,
    Dungeon,
}

impl From<SceneArg> for SceneKey {
    fn from(arg: SceneArg) -> Self {
        match arg {
            SceneArg::Platformer => SceneKey::Platformer,
            SceneArg::Dungeon => SceneKey::Dungeon,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub start_scene: SceneArg,
    /// Fixed simulation step in seconds.
    pub fixed_dt: f32,
    pub platformer: PlatformerConfig,
    pub dungeon: DungeonConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            start_scene: SceneArg::Platformer,
            fixed_dt: 1.0 / 60.0,
            platformer: PlatformerConfig::default(),
            dungeon: DungeonConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Arcade Duo".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub player_sprite: String,
    pub world_width: f32,
    pub world_height: f32,
    pub gravity: f32,
    pub run_speed: f32,
    pub jump_speed: f32,
    pub drop_speed: f32,
    pub grounded_bounce: f32,
    pub player_start: [f32; 2],
    pub star_count: u32,
    pub star_start_x: f32,
    pub star_spacing: f32,
    pub star_bounce_min: f32,
    pub star_bounce_max: f32,
    pub star_seed: u64,
    pub score_per_star: u32,
    pub respawn_delay_ms: u64,
    pub pulse_scale: f32,
    pub pulse_ms: u64,
    pub pointer_tween_ms: u64,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            player_sprite: "assets/sprites/player.png".to_string(),
            world_width: 800.0,
            world_height: 600.0,
            gravity: 300.0,
            run_speed: 160.0,
            jump_speed: 330.0,
            drop_speed: 100.0,
            grounded_bounce: 0.2,
            player_start: [100.0, 450.0],
            star_count: 12,
            star_start_x: 12.0,
            star_spacing: 70.0,
            star_bounce_min: 0.4,
            star_bounce_max: 0.8,
            star_seed: 0x5eed,
            score_per_star: 10,
            respawn_delay_ms: 3000,
            pulse_scale: 1.5,
            pulse_ms: 100,
            pointer_tween_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    pub map_path: String,
    pub tile_sprite: String,
    pub player_sprite: String,
    pub tile_size: f32,
    pub player_speed: f32,
    pub player_scale: f32,
    /// Per-axis speed multiplier while moving diagonally.
    pub diagonal_factor: f32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            map_path: "assets/maps/dungeon_map.txt".to_string(),
            tile_sprite: "assets/sprites/dungeon/dungeon.png".to_string(),
            player_sprite: "assets/sprites/player/player_down1.png".to_string(),
            tile_size: 64.0,
            player_speed: 100.0,
            player_scale: 0.5,
            diagonal_factor: 0.707,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::warn!(
            "Config '{}' not found, using built-in defaults",
            path.display()
        );
        return Ok(GameConfig::default());
    }
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    log::info!("Loaded config '{}'", path.display());
    Ok(config)
}

/// Shortest step the microsecond timer clock can still count reliably.
const MIN_FIXED_DT: f32 = 0.001;
/// Matches the host's per-frame accumulator cap.
const MAX_FIXED_DT: f32 = 0.25;

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if !(MIN_FIXED_DT..=MAX_FIXED_DT).contains(&config.fixed_dt) {
        return Err(format!(
            "Config validation failed: fixed_dt {} must be within [{MIN_FIXED_DT}, {MAX_FIXED_DT}] s",
            config.fixed_dt
        ));
    }
    if config.window.width == 0 || config.window.height == 0 {
        return Err("Config validation failed: window size must be > 0".to_string());
    }
    let platformer = &config.platformer;
    if platformer.star_count == 0 {
        return Err("Config validation failed: platformer.star_count must be > 0".to_string());
    }
    if platformer.star_bounce_min > platformer.star_bounce_max {
        return Err(
            "Config validation failed: platformer.star_bounce_min exceeds star_bounce_max"
                .to_string(),
        );
    }
    if !(config.dungeon.tile_size > 0.0) {
        return Err("Config validation failed: dungeon.tile_size must be > 0".to_string());
    }
    Ok(())
}
