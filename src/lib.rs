//! Minigolf - the ball-and-hole activity of an educational game suite
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, physics world, level progression)
//! - `geometry`: Rectangles, the corner containment test and kinematics
//! - `host`: Capabilities supplied by the embedding shell (visuals, sound, timers, RNG)
//! - `settings`: Data-driven simulation constants

pub mod error;
pub mod geometry;
pub mod host;
pub mod settings;
pub mod sim;

pub use error::{MinigolfError, Result};
pub use geometry::Rect;
pub use host::{HeadlessHost, Host, SoundCue};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Board dimensions the playing field margins are derived from
    pub const BOARD_WIDTH: f64 = 800.0;
    pub const BOARD_HEIGHT: f64 = 520.0;

    /// Hole diameter at level 0; shrinks by `HOLE_SHRINK_PER_LEVEL` each level
    pub const HOLE_BASE_SIZE: f64 = 110.0;
    pub const HOLE_SHRINK_PER_LEVEL: f64 = 3.0;

    /// Ball defaults
    pub const BALL_SIZE: f64 = 40.0;

    /// Horizontal wall defaults
    pub const WALL_WIDTH: f64 = 100.0;
    pub const WALL_HEIGHT: f64 = 20.0;

    /// Flying ball launch state
    pub const FLYING_BALL_VELOCITY: (f64, f64) = (10.0, -5.0);
    pub const FLYING_BALL_ACCELERATION: (f64, f64) = (0.0, -0.5);
    /// Flying ball visual is stretched vertically
    pub const FLYING_BALL_STRETCH: f64 = 1.5;

    /// Per-kind restitution values
    pub const WALL_RESTITUTION: f64 = 5.0;
    pub const HOLE_RESTITUTION: f64 = 3.0;
    pub const BALL_RESTITUTION: f64 = 4.0;
    pub const FLYING_BALL_RESTITUTION: f64 = 1.0;

    /// Factor applied to the reflected axis on a bounce
    pub const BOUNCE_REFLECT: f64 = -0.5;
    /// Factor applied to the other axis on a bounce
    pub const BOUNCE_DAMP: f64 = 0.5;
}
