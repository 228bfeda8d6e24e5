//! Capabilities the embedding shell supplies to the simulation
//!
//! The core never draws, plays audio or owns a clock. It asks the host for
//! visuals, sound cues, a repeating timer and random numbers through the
//! [`Host`] trait. Events flow the other way as plain method calls: when the
//! timer fires the host calls `LevelDirector::tick`, and a pointer press on a
//! bound visual is delivered to `LevelDirector::pointer_press`.
//!
//! [`HeadlessHost`] is an in-memory implementation used by the demo binary
//! and by tests.

use std::collections::{BTreeMap, VecDeque};

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{MinigolfError, Result};
use crate::geometry::Rect;

/// Opaque reference to a host-rendered visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// Opaque reference to a scheduled repeating timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(pub u64);

/// Sound cues, named after the activity's sound assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Ball hit another body
    Flip,
    /// Ball bounced off the field boundary
    LineEnd,
    /// Ball launched by a click
    Scroll,
    /// Level advanced
    Bonus,
}

impl SoundCue {
    pub fn asset_path(&self) -> &'static str {
        match self {
            SoundCue::Flip => "sounds/flip.wav",
            SoundCue::LineEnd => "sounds/line_end.wav",
            SoundCue::Scroll => "sounds/scroll.wav",
            SoundCue::Bonus => "sounds/bonus.wav",
        }
    }
}

/// Shape of a visual
///
/// Rectangles are anchored at their top-left corner, ellipses at their
/// centre. Moving a visual always places its bounding box's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualShape {
    Rectangle,
    Ellipse,
}

/// Stroke and fill of a visual, colors as RGBA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualStyle {
    pub stroke_rgba: u32,
    pub fill_rgba: u32,
    pub line_width: u32,
}

/// What the embedding shell provides to the simulation
pub trait Host {
    /// Create a visual anchored at `position` with bounding `size`
    fn create_visual(
        &mut self,
        shape: VisualShape,
        position: DVec2,
        size: DVec2,
        style: VisualStyle,
    ) -> Result<VisualHandle>;

    /// Place the visual's bounding-box top-left corner at `position`
    fn move_visual(&mut self, handle: VisualHandle, position: DVec2) -> Result<()>;

    /// Destroy a visual and detach its event bindings
    fn remove_visual(&mut self, handle: VisualHandle) -> Result<()>;

    /// Current bounding box; reflects the last `move_visual`
    fn visual_bounds(&self, handle: VisualHandle) -> Result<Rect>;

    /// Deliver pointer presses on this visual to `LevelDirector::pointer_press`
    fn register_pointer_press(&mut self, handle: VisualHandle) -> Result<()>;

    /// Deliver pointer enters on this visual to `LevelDirector::pointer_enter`
    fn register_pointer_enter(&mut self, handle: VisualHandle) -> Result<()>;

    /// Fire and forget
    fn play_sound(&mut self, cue: SoundCue);

    /// Show the end-of-level overlay. The host resumes the board afterwards.
    fn on_level_complete(&mut self, won: bool);

    /// Call `LevelDirector::tick` every `period_ms` until cancelled
    fn schedule_repeating_timer(&mut self, period_ms: u32) -> Result<TimerHandle>;

    fn cancel_timer(&mut self, handle: TimerHandle);

    /// Uniform integer in `[low, high_exclusive)`
    fn random_int(&mut self, low: i32, high_exclusive: i32) -> i32;
}

/// A visual tracked by [`HeadlessHost`]
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessVisual {
    pub shape: VisualShape,
    pub bounds: Rect,
    pub style: VisualStyle,
    pub pointer_press: bool,
    pub pointer_enter: bool,
}

/// In-memory host: no window, no audio, seeded RNG
#[derive(Debug)]
pub struct HeadlessHost {
    rng: Pcg32,
    /// Values returned by `random_int` before falling back to the RNG
    scripted_rolls: VecDeque<i32>,
    visuals: BTreeMap<VisualHandle, HeadlessVisual>,
    next_visual: u64,
    timers: BTreeMap<TimerHandle, u32>,
    next_timer: u64,
    /// When set, visual and timer requests fail
    failing: bool,
    /// `create_visual` calls left before it starts failing
    visual_budget: Option<usize>,
    /// When set, pointer registrations fail
    refusing_pointers: bool,
    /// Every cue played, oldest first
    pub sounds: Vec<SoundCue>,
    /// Every `on_level_complete` notification, oldest first
    pub completions: Vec<bool>,
    /// Number of `move_visual` calls
    pub moves: usize,
}

impl HeadlessHost {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            scripted_rolls: VecDeque::new(),
            visuals: BTreeMap::new(),
            next_visual: 1,
            timers: BTreeMap::new(),
            next_timer: 1,
            failing: false,
            visual_budget: None,
            refusing_pointers: false,
            sounds: Vec::new(),
            completions: Vec::new(),
            moves: 0,
        }
    }

    /// Host whose first `random_int` calls return `rolls` in order
    pub fn with_rolls(seed: u64, rolls: impl IntoIterator<Item = i32>) -> Self {
        let mut host = Self::new(seed);
        host.scripted_rolls.extend(rolls);
        host
    }

    /// Queue more scripted rolls
    pub fn push_rolls(&mut self, rolls: impl IntoIterator<Item = i32>) {
        self.scripted_rolls.extend(rolls);
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Let the next `count` visuals succeed, then refuse every later one
    pub fn fail_visuals_after(&mut self, count: usize) {
        self.visual_budget = Some(count);
    }

    pub fn set_refusing_pointers(&mut self, refusing: bool) {
        self.refusing_pointers = refusing;
    }

    pub fn visual(&self, handle: VisualHandle) -> Option<&HeadlessVisual> {
        self.visuals.get(&handle)
    }

    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn timer_period(&self, handle: TimerHandle) -> Option<u32> {
        self.timers.get(&handle).copied()
    }

    /// Drain the recorded sound cues
    pub fn take_sounds(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.sounds)
    }

    fn check_available(&self, what: &str) -> Result<()> {
        if self.failing {
            return Err(MinigolfError::CollaboratorFailure(format!(
                "headless host refused {what}"
            )));
        }
        Ok(())
    }

    fn check_pointers(&self) -> Result<()> {
        if self.refusing_pointers {
            return Err(MinigolfError::CollaboratorFailure(
                "headless host refused pointer registration".to_string(),
            ));
        }
        Ok(())
    }

    fn visual_mut(&mut self, handle: VisualHandle) -> Result<&mut HeadlessVisual> {
        self.visuals.get_mut(&handle).ok_or_else(|| {
            MinigolfError::CollaboratorFailure(format!("unknown visual {:?}", handle))
        })
    }
}

impl Host for HeadlessHost {
    fn create_visual(
        &mut self,
        shape: VisualShape,
        position: DVec2,
        size: DVec2,
        style: VisualStyle,
    ) -> Result<VisualHandle> {
        self.check_available("create_visual")?;
        match self.visual_budget {
            Some(0) => {
                return Err(MinigolfError::CollaboratorFailure(
                    "headless host out of visuals".to_string(),
                ));
            }
            Some(ref mut left) => *left -= 1,
            None => {}
        }
        let bounds = match shape {
            VisualShape::Rectangle => Rect::from_origin(position, size),
            VisualShape::Ellipse => Rect::from_center(position, size),
        };
        let handle = VisualHandle(self.next_visual);
        self.next_visual += 1;
        self.visuals.insert(
            handle,
            HeadlessVisual {
                shape,
                bounds,
                style,
                pointer_press: false,
                pointer_enter: false,
            },
        );
        Ok(handle)
    }

    fn move_visual(&mut self, handle: VisualHandle, position: DVec2) -> Result<()> {
        self.check_available("move_visual")?;
        let visual = self.visual_mut(handle)?;
        visual.bounds = visual.bounds.moved_to(position);
        self.moves += 1;
        Ok(())
    }

    fn remove_visual(&mut self, handle: VisualHandle) -> Result<()> {
        self.visuals.remove(&handle).map(|_| ()).ok_or_else(|| {
            MinigolfError::CollaboratorFailure(format!("unknown visual {:?}", handle))
        })
    }

    fn visual_bounds(&self, handle: VisualHandle) -> Result<Rect> {
        self.visuals.get(&handle).map(|v| v.bounds).ok_or_else(|| {
            MinigolfError::CollaboratorFailure(format!("unknown visual {:?}", handle))
        })
    }

    fn register_pointer_press(&mut self, handle: VisualHandle) -> Result<()> {
        self.check_pointers()?;
        self.visual_mut(handle)?.pointer_press = true;
        Ok(())
    }

    fn register_pointer_enter(&mut self, handle: VisualHandle) -> Result<()> {
        self.check_pointers()?;
        self.visual_mut(handle)?.pointer_enter = true;
        Ok(())
    }

    fn play_sound(&mut self, cue: SoundCue) {
        log::trace!("sound {}", cue.asset_path());
        self.sounds.push(cue);
    }

    fn on_level_complete(&mut self, won: bool) {
        self.completions.push(won);
    }

    fn schedule_repeating_timer(&mut self, period_ms: u32) -> Result<TimerHandle> {
        self.check_available("schedule_repeating_timer")?;
        let handle = TimerHandle(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(handle, period_ms);
        Ok(handle)
    }

    fn cancel_timer(&mut self, handle: TimerHandle) {
        self.timers.remove(&handle);
    }

    fn random_int(&mut self, low: i32, high_exclusive: i32) -> i32 {
        if let Some(roll) = self.scripted_rolls.pop_front() {
            return roll;
        }
        self.rng.random_range(low..high_exclusive)
    }
}
