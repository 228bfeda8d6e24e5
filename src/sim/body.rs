//! Simulated bodies and their factory

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{MinigolfError, Result};
use crate::host::{VisualHandle, VisualShape, VisualStyle};

/// Body variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    HorizontalWall,
    /// Declared, no construction data yet
    VerticalWall,
    Hole,
    Ball,
    FlyingBall,
    /// Declared, no construction data yet
    DiagonalWall,
}

/// Which pointer event a body's visual reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerBinding {
    None,
    Press,
    Enter,
}

/// How a body asks the host to draw it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualSpec {
    pub shape: VisualShape,
    /// Top-left for rectangles, centre for ellipses
    pub anchor: DVec2,
    pub size: DVec2,
    pub style: VisualStyle,
    pub binding: PointerBinding,
}

/// One physical object on the board
///
/// Motion is integrated in segments: `reference` and `velocity` are the state
/// at the start of the current segment and `elapsed` the logical time since.
/// Bounces, impulses and settling start a new segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimBody {
    pub kind: BodyKind,
    pub moving: bool,
    pub elapsed: f64,
    pub position: DVec2,
    pub reference: DVec2,
    pub velocity: DVec2,
    pub acceleration: DVec2,
    pub restitution: f64,
    pub size: DVec2,
    /// Set once the host has created the visual
    pub visual: Option<VisualHandle>,
}

impl SimBody {
    /// Initialise a body of `kind` at `position` for the given level
    pub fn new(kind: BodyKind, position: DVec2, level: u32, gravity: f64) -> Result<Self> {
        let (moving, velocity, acceleration, restitution, size) = match kind {
            BodyKind::HorizontalWall => (
                false,
                DVec2::ZERO,
                DVec2::ZERO,
                WALL_RESTITUTION,
                DVec2::new(WALL_WIDTH, WALL_HEIGHT),
            ),
            BodyKind::Hole => (
                false,
                DVec2::ZERO,
                DVec2::ZERO,
                HOLE_RESTITUTION,
                DVec2::splat(Self::hole_size(level)),
            ),
            BodyKind::Ball => (
                true,
                DVec2::ZERO,
                DVec2::new(0.0, gravity),
                BALL_RESTITUTION,
                DVec2::splat(BALL_SIZE),
            ),
            BodyKind::FlyingBall => (
                true,
                DVec2::from(FLYING_BALL_VELOCITY),
                DVec2::from(FLYING_BALL_ACCELERATION),
                FLYING_BALL_RESTITUTION,
                DVec2::splat(BALL_SIZE),
            ),
            BodyKind::VerticalWall | BodyKind::DiagonalWall => {
                return Err(MinigolfError::UnsupportedKind(kind));
            }
        };

        Ok(Self {
            kind,
            moving,
            elapsed: 0.0,
            position,
            reference: position,
            velocity,
            acceleration,
            restitution,
            size,
            visual: None,
        })
    }

    /// Hole diameter for a level; higher levels get smaller holes
    pub fn hole_size(level: u32) -> f64 {
        HOLE_BASE_SIZE - HOLE_SHRINK_PER_LEVEL * level as f64
    }

    /// Start a new free-flight segment from the current position
    #[inline]
    pub fn restart_segment(&mut self) {
        self.elapsed = 0.0;
        self.reference = self.position;
    }

    pub fn is_at_rest(&self) -> bool {
        self.velocity == DVec2::ZERO
    }

    pub fn visual_spec(&self) -> VisualSpec {
        let (shape, size, style, binding) = match self.kind {
            BodyKind::HorizontalWall => (
                VisualShape::Rectangle,
                self.size,
                VisualStyle {
                    stroke_rgba: 0x000000FF,
                    fill_rgba: 0xFF10C0FF,
                    line_width: 1,
                },
                PointerBinding::Press,
            ),
            BodyKind::Hole => (
                VisualShape::Ellipse,
                self.size,
                VisualStyle {
                    stroke_rgba: 0xEEEEEEFF,
                    fill_rgba: 0x111111FF,
                    line_width: 2,
                },
                PointerBinding::None,
            ),
            BodyKind::Ball => (
                VisualShape::Ellipse,
                self.size,
                VisualStyle {
                    stroke_rgba: 0x000000FF,
                    fill_rgba: 0xFFFFFFFF,
                    line_width: 1,
                },
                PointerBinding::Press,
            ),
            BodyKind::FlyingBall => (
                VisualShape::Ellipse,
                DVec2::new(self.size.x, self.size.y * FLYING_BALL_STRETCH),
                VisualStyle {
                    stroke_rgba: 0x000000FF,
                    fill_rgba: 0xE03000FF,
                    line_width: 1,
                },
                PointerBinding::Enter,
            ),
            // No constructor produces these
            BodyKind::VerticalWall | BodyKind::DiagonalWall => (
                VisualShape::Rectangle,
                self.size,
                VisualStyle {
                    stroke_rgba: 0x000000FF,
                    fill_rgba: 0x000000FF,
                    line_width: 1,
                },
                PointerBinding::None,
            ),
        };

        VisualSpec {
            shape,
            anchor: self.position,
            size,
            style,
            binding,
        }
    }
}
