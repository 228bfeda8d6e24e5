//! Physics world: launch impulses and the fixed-increment tick
//!
//! Each tick advances logical time by `Settings::time_increment` no matter how
//! much wall-clock time passed, so a run is reproducible at any frame rate.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{BodyKind, PointerBinding, SimBody};
use crate::consts::{BOUNCE_DAMP, BOUNCE_REFLECT};
use crate::error::Result;
use crate::geometry::{Rect, contains_at_least_three_corners, displacement};
use crate::host::{Host, SoundCue, VisualHandle};
use crate::settings::Settings;

/// Lifecycle of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldPhase {
    /// Constructed or paused; ticks and clicks are ignored
    Idle,
    /// Ticks advance the simulation
    Running,
    /// A collision ended the level; bodies are gone
    Won,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep the timer running
    Continue,
    /// Level finished, stop the timer
    Won,
}

/// The bodies of one level and the rules that move them
#[derive(Debug)]
pub struct PhysicsWorld {
    settings: Settings,
    level: u32,
    /// Creation order; iteration order of the tick
    bodies: Vec<SimBody>,
    phase: WorldPhase,
}

impl PhysicsWorld {
    pub fn new(settings: Settings, level: u32) -> Self {
        Self {
            settings,
            level,
            bodies: Vec::new(),
            phase: WorldPhase::Idle,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> WorldPhase {
        self.phase
    }

    pub fn is_won(&self) -> bool {
        self.phase == WorldPhase::Won
    }

    pub fn bodies(&self) -> &[SimBody] {
        &self.bodies
    }

    /// The first ball, if the level has one
    pub fn ball(&self) -> Option<&SimBody> {
        self.bodies.iter().find(|b| b.kind == BodyKind::Ball)
    }

    pub fn body_by_visual(&self, handle: VisualHandle) -> Option<&SimBody> {
        self.bodies.iter().find(|b| b.visual == Some(handle))
    }

    /// Resume or pause. A won world stays won.
    pub fn set_running(&mut self, running: bool) {
        if self.phase == WorldPhase::Won {
            return;
        }
        self.phase = if running {
            WorldPhase::Running
        } else {
            WorldPhase::Idle
        };
    }

    /// Create a body of `kind` at `position`, with its visual and bindings
    pub fn create_body(
        &mut self,
        host: &mut dyn Host,
        kind: BodyKind,
        position: DVec2,
    ) -> Result<&SimBody> {
        let body = SimBody::new(kind, position, self.level, self.settings.gravity)?;
        self.insert_body(host, body)
    }

    /// Add an already initialised body, creating its visual from its own size
    pub fn insert_body(&mut self, host: &mut dyn Host, mut body: SimBody) -> Result<&SimBody> {
        let spec = body.visual_spec();
        let handle = host.create_visual(spec.shape, spec.anchor, spec.size, spec.style)?;
        let bound = match spec.binding {
            PointerBinding::Press => host.register_pointer_press(handle),
            PointerBinding::Enter => host.register_pointer_enter(handle),
            PointerBinding::None => Ok(()),
        };
        if let Err(err) = bound {
            if let Err(cleanup) = host.remove_visual(handle) {
                log::warn!("Could not remove unbound visual {:?}: {}", handle, cleanup);
            }
            return Err(err);
        }
        body.visual = Some(handle);

        let index = self.bodies.len();
        self.bodies.push(body);
        Ok(&self.bodies[index])
    }

    /// Launch the body bound to `handle` away from the clicked point.
    ///
    /// Each axis gets `(half - offset) * launch_scale`, where `offset` is the
    /// distance from the nearer edge of the visual's bounds: a click on an
    /// edge gives the strongest push toward the opposite side, a click on the
    /// centre gives none. Returns false when ignored (world not running or
    /// unknown handle).
    pub fn apply_launch_impulse(
        &mut self,
        host: &mut dyn Host,
        handle: VisualHandle,
        pointer: DVec2,
    ) -> Result<bool> {
        if self.phase != WorldPhase::Running {
            log::debug!("Ignoring click while {:?}", self.phase);
            return Ok(false);
        }
        let Some(body) = self.bodies.iter_mut().find(|b| b.visual == Some(handle)) else {
            return Ok(false);
        };

        let bounds = host.visual_bounds(handle)?;
        host.play_sound(SoundCue::Scroll);

        // Both axes use the width, visuals are square
        let half = bounds.width() / 2.0;
        let scale = self.settings.launch_scale;
        body.restart_segment();
        body.velocity = DVec2::new(
            launch_axis(pointer.x, bounds.x1, bounds.x2, half, scale),
            launch_axis(pointer.y, bounds.y1, bounds.y2, half, scale),
        );
        log::debug!("Launched {:?} with velocity {}", body.kind, body.velocity);
        Ok(true)
    }

    /// Advance every moving body by one time increment.
    ///
    /// A moving body whose bounds have 3 corners inside any other body's
    /// bounds wins the level, whatever that other body is. The world then
    /// removes all visuals, notifies the host and returns `Won`.
    pub fn tick(&mut self, host: &mut dyn Host) -> Result<TickOutcome> {
        match self.phase {
            WorldPhase::Won => return Ok(TickOutcome::Won),
            WorldPhase::Idle => return Ok(TickOutcome::Continue),
            WorldPhase::Running => {}
        }

        for i in 0..self.bodies.len() {
            if !self.bodies[i].moving {
                continue;
            }
            let Some(handle) = self.bodies[i].visual else {
                continue;
            };
            // Bounds from before this tick's move drive the bounce tests
            let bounds = host.visual_bounds(handle)?;
            self.bodies[i].elapsed += self.settings.time_increment;

            if let Some(j) = self.find_collision(host, i, &bounds)? {
                log::info!(
                    "{:?} reached {:?} on level {}",
                    self.bodies[i].kind,
                    self.bodies[j].kind,
                    self.level
                );
                host.play_sound(SoundCue::Flip);
                self.phase = WorldPhase::Won;
                self.destroy_all(host)?;
                host.on_level_complete(true);
                return Ok(TickOutcome::Won);
            }

            let body = &mut self.bodies[i];
            integrate(body, &self.settings);
            clamp_to_field(body, &self.settings);

            if !body.is_at_rest() {
                host.move_visual(handle, body.position)?;
            }

            resolve_bounces(body, &bounds, &self.settings, false, host);
        }

        Ok(TickOutcome::Continue)
    }

    /// Remove every body and its visual. All removals are attempted; the
    /// first failure is returned.
    pub fn destroy_all(&mut self, host: &mut dyn Host) -> Result<()> {
        let mut result = Ok(());
        for body in self.bodies.drain(..) {
            if let Some(handle) = body.visual {
                if let Err(err) = host.remove_visual(handle) {
                    log::warn!("Failed to remove {:?}: {}", body.kind, err);
                    if result.is_ok() {
                        result = Err(err);
                    }
                }
            }
        }
        result
    }

    fn find_collision(
        &self,
        host: &dyn Host,
        index: usize,
        bounds: &Rect,
    ) -> Result<Option<usize>> {
        for (j, other) in self.bodies.iter().enumerate() {
            if j == index {
                continue;
            }
            let Some(handle) = other.visual else {
                continue;
            };
            if contains_at_least_three_corners(bounds, &host.visual_bounds(handle)?) {
                return Ok(Some(j));
            }
        }
        Ok(None)
    }
}

/// Launch velocity on one axis
fn launch_axis(pointer: f64, near: f64, far: f64, half: f64, scale: f64) -> f64 {
    if pointer - near < half {
        (half - (pointer - near)) * scale
    } else {
        -(half - (far - pointer)) * scale
    }
}

/// Closed-form position update, then `v += a·t` on top.
///
/// An axis that moved more than the settle threshold keeps going with decayed
/// velocity; one that did not is snapped: its reference moves to the new
/// position and its velocity drops to zero.
fn integrate(body: &mut SimBody, settings: &Settings) {
    let t = body.elapsed;
    let y = step_axis(
        &mut body.reference.y,
        &mut body.velocity.y,
        body.position.y,
        body.acceleration.y,
        t,
        settings,
    );
    let x = step_axis(
        &mut body.reference.x,
        &mut body.velocity.x,
        body.position.x,
        body.acceleration.x,
        t,
        settings,
    );
    body.position = DVec2::new(x, y);
    body.velocity += body.acceleration * t;
}

fn step_axis(
    reference: &mut f64,
    velocity: &mut f64,
    current: f64,
    accel: f64,
    t: f64,
    settings: &Settings,
) -> f64 {
    let next = displacement(*reference, *velocity, accel, t);
    if (current - next).abs() > settings.settle_threshold {
        *velocity *= settings.velocity_decay;
    } else {
        *reference = next;
        *velocity = 0.0;
    }
    next
}

/// Keep the body inside the field. A clamp starts a new segment.
fn clamp_to_field(body: &mut SimBody, settings: &Settings) {
    let field = &settings.field;
    let mut p = body.position;

    if p.y >= field.min_y2 - body.size.y - 1.0 {
        p.y = field.min_y2 - body.size.y;
    }
    if p.y < field.min_y1 {
        p.y = field.min_y1;
    }
    if p.x < field.min_x1 {
        p.x = field.min_x1;
    }
    if p.x > field.min_x2 {
        p.x = field.min_x2;
    }

    if p != body.position {
        body.position = p;
        body.restart_segment();
    }
}

/// Boundary reflections. Each rule is checked in turn against the velocity
/// left by the previous one; `forced` fires all four.
fn resolve_bounces(
    body: &mut SimBody,
    bounds: &Rect,
    settings: &Settings,
    forced: bool,
    host: &mut dyn Host,
) {
    let field = &settings.field;
    let reflect = if settings.restitution_bounce {
        -1.0 / body.restitution
    } else {
        BOUNCE_REFLECT
    };
    let p = body.position;

    let near_floor = p.y >= field.min_y2 - body.size.y - field.border && bounds.y1 - p.y <= 0.0;
    if near_floor || forced {
        bounce(body, DVec2::new(BOUNCE_DAMP, reflect), "floor", host);
    }

    let at_top = bounds.y1 <= field.min_y1 && bounds.y1 - p.y >= 0.0;
    if at_top || forced {
        bounce(body, DVec2::new(BOUNCE_DAMP, reflect), "top", host);
    }

    if (bounds.x1 <= field.min_x1 && body.velocity.x < 0.0) || forced {
        bounce(body, DVec2::new(reflect, BOUNCE_DAMP), "left", host);
    }

    if (bounds.x2 >= field.min_x2 && body.velocity.x > 0.0) || forced {
        bounce(body, DVec2::new(reflect, BOUNCE_DAMP), "right", host);
    }
}

fn bounce(body: &mut SimBody, factors: DVec2, edge: &str, host: &mut dyn Host) {
    body.velocity *= factors;
    body.restart_segment();
    log::debug!("{:?} bounced off {} edge, velocity {}", body.kind, edge, body.velocity);
    host.play_sound(SoundCue::LineEnd);
}
