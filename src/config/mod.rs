use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// Tuning values for one simulation session. Defaults are the authored
/// constants; any field may be omitted from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub tick_rate: u32,
    /// `None` drains every due tick, however many
    pub max_catch_up_ticks: Option<u32>,
    /// Wall-clock spacing of frame arrivals in the threaded loop, in ms.
    /// `None` uses the tick duration.
    pub frame_interval_ms: Option<u64>,
    pub tile_size: f32,
    pub gravity: f32,
    pub max_vx: f32,
    pub max_vy: f32,
    pub player_speed: f32,
    pub jump_force: f32,
    pub deadzone: f32,
    pub enemy_speed: f32,
    pub entity_size: f32,
    pub pickup_size: f32,
    pub pickup_score: u32,
    pub starting_lives: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: constants::TICK_RATE,
            max_catch_up_ticks: Some(constants::MAX_CATCH_UP_TICKS),
            frame_interval_ms: None,
            tile_size: constants::TILE_SIZE,
            gravity: constants::GRAVITY,
            max_vx: constants::MAX_VX,
            max_vy: constants::MAX_VY,
            player_speed: constants::PLAYER_SPEED,
            jump_force: constants::JUMP_FORCE,
            deadzone: constants::INPUT_DEADZONE,
            enemy_speed: constants::ENEMY_SPEED,
            entity_size: constants::ENTITY_SIZE,
            pickup_size: constants::PICKUP_SIZE,
            pickup_score: constants::PICKUP_SCORE,
            starting_lives: constants::STARTING_LIVES,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

impl SimConfig {
    /// Fixed tick duration, rounded to the nearest nanosecond
    pub fn tick_duration(&self) -> Duration {
        let rate = u64::from(self.tick_rate.max(1));
        Duration::from_nanos((1_000_000_000 + rate / 2) / rate)
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.tick_duration())
    }

    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load by extension: `.json` is JSON, anything else RON
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&source),
            _ => Self::from_ron(&source),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn out_of_range(field: &'static str, reason: &str) -> ConfigError {
            ConfigError::OutOfRange {
                field,
                reason: reason.to_string(),
            }
        }

        if self.tick_rate == 0 {
            return Err(out_of_range("tick_rate", "must be at least 1"));
        }
        if self.max_catch_up_ticks == Some(0) {
            return Err(out_of_range("max_catch_up_ticks", "must be at least 1"));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(out_of_range("tile_size", "must be positive"));
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err(out_of_range("deadzone", "must be in [0, 1)"));
        }
        if !(self.entity_size > 0.0 && self.entity_size <= self.tile_size) {
            return Err(out_of_range("entity_size", "must be in (0, tile_size]"));
        }
        if !(self.pickup_size > 0.0) {
            return Err(out_of_range("pickup_size", "must be positive"));
        }
        if !(self.max_vx >= 0.0 && self.max_vy >= 0.0) {
            return Err(out_of_range("max_vx/max_vy", "must not be negative"));
        }
        if self.starting_lives == 0 {
            return Err(out_of_range("starting_lives", "must be at least 1"));
        }
        Ok(())
    }
}
