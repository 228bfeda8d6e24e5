//! Simulation settings
//!
//! Every tunable constant of the activity lives here. Settings serialize to
//! JSON so a host can ship overrides next to the activity.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{BOARD_HEIGHT, BOARD_WIDTH, HOLE_BASE_SIZE, HOLE_SHRINK_PER_LEVEL};
use crate::error::{MinigolfError, Result};

/// Inner limits of the playing field, plus the painted border thickness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayingField {
    pub min_x1: f64,
    pub min_x2: f64,
    pub min_y1: f64,
    pub min_y2: f64,
    /// Border in the background image; only used by the near-floor bounce
    pub border: f64,
}

impl Default for PlayingField {
    fn default() -> Self {
        Self {
            min_x1: 60.0,
            min_x2: BOARD_WIDTH - 60.0,
            min_y1: 65.0,
            min_y2: BOARD_HEIGHT - 30.0,
            border: 40.0,
        }
    }
}

/// Activity settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Host timer period driving `tick`
    pub timer_period_ms: u32,
    /// Logical time added per tick, independent of the timer period
    pub time_increment: f64,

    // === Physics ===
    /// Vertical acceleration given to the ball
    pub gravity: f64,
    /// Per-tick velocity decay while an axis is still moving
    pub velocity_decay: f64,
    /// Displacement below which an axis is considered settled
    pub settle_threshold: f64,
    /// Velocity per pixel of click offset from the ball's centre
    pub launch_scale: f64,
    /// Use each body's restitution for the reflected axis instead of -0.5
    pub restitution_bounce: bool,
    pub field: PlayingField,

    // === Levels ===
    pub max_level: u32,
    /// Wins needed within a level before moving on
    pub sublevels: u32,
    pub hole_position: DVec2,
    /// Ball spawn x, half-open `[lo, hi)`
    pub spawn_x: (i32, i32),
    /// Ball spawn y, inclusive `[lo, hi]`
    pub spawn_y: (i32, i32),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timer_period_ms: 40,
            time_increment: 0.1,

            gravity: 0.0,
            velocity_decay: 0.99,
            settle_threshold: 0.3,
            launch_scale: 20.0,
            restitution_bounce: false,
            field: PlayingField::default(),

            max_level: 6,
            sublevels: 1,
            hole_position: DVec2::new(750.0, 260.0),
            spawn_x: (60, 150),
            spawn_y: (70, 400),
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is absent or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(err) => {
                log::info!(
                    "Using default settings ({}: {})",
                    path.as_ref().display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let f = &self.field;
        if f.min_x1 >= f.min_x2 || f.min_y1 >= f.min_y2 {
            return Err(MinigolfError::InvalidSettings(format!(
                "playing field is empty: x {}..{}, y {}..{}",
                f.min_x1, f.min_x2, f.min_y1, f.min_y2
            )));
        }
        if f.border < 0.0 {
            return Err(MinigolfError::InvalidSettings(
                "border must not be negative".into(),
            ));
        }
        if self.time_increment <= 0.0 {
            return Err(MinigolfError::InvalidSettings(
                "time_increment must be positive".into(),
            ));
        }
        if self.timer_period_ms == 0 {
            return Err(MinigolfError::InvalidSettings(
                "timer_period_ms must be positive".into(),
            ));
        }
        if self.max_level == 0 || self.sublevels == 0 {
            return Err(MinigolfError::InvalidSettings(
                "max_level and sublevels must be at least 1".into(),
            ));
        }
        // The hole must keep a positive size at the last level
        if HOLE_BASE_SIZE - HOLE_SHRINK_PER_LEVEL * self.max_level as f64 <= 0.0 {
            return Err(MinigolfError::InvalidSettings(format!(
                "max_level {} leaves no hole",
                self.max_level
            )));
        }
        if self.spawn_x.0 >= self.spawn_x.1 || self.spawn_y.0 > self.spawn_y.1 {
            return Err(MinigolfError::InvalidSettings(format!(
                "empty spawn range: x {:?}, y {:?}",
                self.spawn_x, self.spawn_y
            )));
        }
        Ok(())
    }
}
