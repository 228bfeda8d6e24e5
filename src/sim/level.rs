//! Level progression and board lifecycle
//!
//! The director owns the world of the current level and the host timer that
//! drives it. A board starts paused; `start` builds level 1 and resumes.
//! When the world reports a win the timer stops and the host shows its
//! celebration. Resuming the board afterwards moves on to the next level.

use glam::DVec2;

use super::body::BodyKind;
use super::world::{PhysicsWorld, TickOutcome};
use crate::error::Result;
use crate::host::{Host, SoundCue, TimerHandle, VisualHandle};
use crate::settings::Settings;

#[derive(Debug)]
pub struct LevelDirector {
    settings: Settings,
    level: u32,
    sublevel: u32,
    paused: bool,
    /// Between `start` and `end`
    active: bool,
    world: PhysicsWorld,
    timer: Option<TimerHandle>,
}

impl LevelDirector {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let world = PhysicsWorld::new(settings.clone(), 1);
        Ok(Self {
            settings,
            level: 1,
            sublevel: 1,
            paused: true,
            active: false,
            world,
            timer: None,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn sublevel(&self) -> u32 {
        self.sublevel
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// Enter the board at level 1 and start playing
    pub fn start(&mut self, host: &mut dyn Host) -> Result<()> {
        log::info!("Starting minigolf board");
        self.active = true;
        self.level = 1;
        self.sublevel = 1;
        self.build_level(host)?;
        self.pause(host, false)
    }

    /// Leave the board: stop the timer and remove everything
    pub fn end(&mut self, host: &mut dyn Host) -> Result<()> {
        log::info!("Ending minigolf board at level {}", self.level);
        self.pause(host, true)?;
        self.active = false;
        self.teardown(host)
    }

    /// Pause or resume. Resuming a won level advances to the next one.
    /// Ignored outside `start`..`end`.
    pub fn pause(&mut self, host: &mut dyn Host, paused: bool) -> Result<()> {
        if !self.active {
            log::debug!("Ignoring pause({}) on an inactive board", paused);
            return Ok(());
        }
        log::debug!("Board {}", if paused { "paused" } else { "resumed" });
        self.paused = paused;

        if paused {
            self.stop_timer(host);
            self.world.set_running(false);
            return Ok(());
        }

        if self.world.is_won() {
            return self.on_level_won(host);
        }
        self.world.set_running(true);
        self.start_timer(host)
    }

    /// Host level selector: jump to `level`, clamped to the valid range.
    /// Ignored outside `start`..`end`.
    pub fn set_level(&mut self, host: &mut dyn Host, level: u32) -> Result<()> {
        if !self.active {
            log::debug!("Ignoring set_level({}) on an inactive board", level);
            return Ok(());
        }
        let clamped = level.clamp(1, self.settings.max_level);
        if clamped != level {
            log::warn!("Level {} out of range, using {}", level, clamped);
        }
        self.level = clamped;
        self.sublevel = 1;
        self.build_level(host)
    }

    /// Tear down the current level and build a fresh one at the current level.
    ///
    /// The goal hole goes first, then the ball at a random spot in the spawn
    /// area. The timer runs unless the board is paused. If the host fails
    /// midway, the visuals already created are removed again.
    pub fn build_level(&mut self, host: &mut dyn Host) -> Result<()> {
        self.teardown(host)?;

        let mut world = PhysicsWorld::new(self.settings.clone(), self.level);
        let spawn = match self.populate(&mut world, host) {
            Ok(spawn) => spawn,
            Err(err) => {
                if let Err(cleanup) = world.destroy_all(host) {
                    log::warn!("Cleanup after failed build also failed: {}", cleanup);
                }
                return Err(err);
            }
        };

        log::info!(
            "Built level {} (sublevel {}/{}), ball at {}",
            self.level,
            self.sublevel,
            self.settings.sublevels,
            spawn
        );

        self.world = world;
        if !self.paused {
            self.world.set_running(true);
            self.start_timer(host)?;
        }
        Ok(())
    }

    /// Count a win; after enough wins the level goes up, capped at the maximum
    pub fn on_level_won(&mut self, host: &mut dyn Host) -> Result<()> {
        self.sublevel += 1;
        if self.sublevel > self.settings.sublevels {
            self.sublevel = 1;
            self.level = (self.level + 1).min(self.settings.max_level);
            log::info!("Level won, advancing to level {}", self.level);
            host.play_sound(SoundCue::Bonus);
        } else {
            log::info!("Sublevel won, next sublevel {}", self.sublevel);
        }
        self.build_level(host)
    }

    /// Hole first, then the ball at a random spawn point
    fn populate(&self, world: &mut PhysicsWorld, host: &mut dyn Host) -> Result<DVec2> {
        world.create_body(host, BodyKind::Hole, self.settings.hole_position)?;

        let (x_lo, x_hi) = self.settings.spawn_x;
        let (y_lo, y_hi) = self.settings.spawn_y;
        let spawn = DVec2::new(
            host.random_int(x_lo, x_hi) as f64,
            host.random_int(y_lo, y_hi + 1) as f64,
        );
        world.create_body(host, BodyKind::Ball, spawn)?;
        Ok(spawn)
    }

    /// Timer callback
    pub fn tick(&mut self, host: &mut dyn Host) -> Result<TickOutcome> {
        let outcome = self.world.tick(host)?;
        if outcome == TickOutcome::Won {
            self.stop_timer(host);
        }
        Ok(outcome)
    }

    /// Pointer press on a bound visual; launches the ball while running
    pub fn pointer_press(
        &mut self,
        host: &mut dyn Host,
        handle: VisualHandle,
        pointer: DVec2,
    ) -> Result<bool> {
        self.world.apply_launch_impulse(host, handle, pointer)
    }

    /// Pointer enter on a bound visual (flying balls)
    pub fn pointer_enter(
        &mut self,
        host: &mut dyn Host,
        handle: VisualHandle,
        pointer: DVec2,
    ) -> Result<bool> {
        self.world.apply_launch_impulse(host, handle, pointer)
    }

    fn teardown(&mut self, host: &mut dyn Host) -> Result<()> {
        self.stop_timer(host);
        self.world.destroy_all(host)
    }

    fn start_timer(&mut self, host: &mut dyn Host) -> Result<()> {
        if self.timer.is_none() {
            self.timer = Some(host.schedule_repeating_timer(self.settings.timer_period_ms)?);
        }
        Ok(())
    }

    fn stop_timer(&mut self, host: &mut dyn Host) {
        if let Some(timer) = self.timer.take() {
            host.cancel_timer(timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MinigolfError;
    use crate::host::HeadlessHost;
    use crate::sim::world::WorldPhase;

    /// Started director whose first ball spawns at (x, y)
    fn started(x: i32, y: i32) -> (LevelDirector, HeadlessHost) {
        let mut host = HeadlessHost::with_rolls(1, [x, y]);
        let mut director = LevelDirector::new(Settings::default()).unwrap();
        director.start(&mut host).unwrap();
        (director, host)
    }

    fn ball_handle(director: &LevelDirector) -> VisualHandle {
        director.world().ball().unwrap().visual.unwrap()
    }

    #[test]
    fn test_new_board_is_paused_and_empty() {
        let director = LevelDirector::new(Settings::default()).unwrap();
        assert!(director.is_paused());
        assert!(director.world().bodies().is_empty());
        assert_eq!(director.world().phase(), WorldPhase::Idle);
    }

    #[test]
    fn test_start_builds_level_one() {
        let (director, host) = started(100, 100);
        assert_eq!(director.level(), 1);
        assert_eq!(director.sublevel(), 1);
        assert!(!director.is_paused());

        let bodies = director.world().bodies();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0].kind, BodyKind::Hole);
        assert_eq!(bodies[0].position, DVec2::new(750.0, 260.0));
        assert_eq!(bodies[0].size, DVec2::splat(107.0));
        assert_eq!(bodies[1].kind, BodyKind::Ball);
        assert_eq!(bodies[1].position, DVec2::new(100.0, 100.0));

        assert_eq!(host.active_timers(), 1);
        assert_eq!(host.timer_period(director.timer().unwrap()), Some(40));
        assert_eq!(director.world().phase(), WorldPhase::Running);
    }

    #[test]
    fn test_random_spawn_stays_in_range() {
        for seed in 0..20 {
            let mut host = HeadlessHost::new(seed);
            let mut director = LevelDirector::new(Settings::default()).unwrap();
            director.start(&mut host).unwrap();
            let p = director.world().ball().unwrap().position;
            assert!((60.0..150.0).contains(&p.x));
            assert!((70.0..=400.0).contains(&p.y));
        }
    }

    #[test]
    fn test_center_click_keeps_ball_still() {
        let (mut director, mut host) = started(100, 100);
        let handle = ball_handle(&director);

        let pressed = director
            .pointer_press(&mut host, handle, DVec2::new(100.0, 100.0))
            .unwrap();
        assert!(pressed);
        let ball = director.world().ball().unwrap();
        assert_eq!(ball.velocity, DVec2::ZERO);

        for _ in 0..10 {
            assert_eq!(director.tick(&mut host).unwrap(), TickOutcome::Continue);
        }
        let ball = director.world().ball().unwrap();
        assert!(ball.position.distance(DVec2::new(100.0, 100.0)) <= 0.3);
        assert!(!director.world().is_won());
        assert_eq!(host.moves, 0);
    }

    #[test]
    fn test_top_left_click_launches_at_full_speed() {
        let (mut director, mut host) = started(100, 100);
        let handle = ball_handle(&director);

        director.pointer_press(&mut host, handle, DVec2::new(80.0, 80.0)).unwrap();
        let ball = director.world().ball().unwrap();
        // halfWidth 20 * scale 20, away from the clicked corner
        assert_eq!(ball.velocity, DVec2::new(400.0, 400.0));
        assert!(host.sounds.contains(&SoundCue::Scroll));
    }

    #[test]
    fn test_click_ignored_while_paused() {
        let (mut director, mut host) = started(100, 100);
        let handle = ball_handle(&director);
        director.pause(&mut host, true).unwrap();

        let pressed = director
            .pointer_press(&mut host, handle, DVec2::new(80.0, 80.0))
            .unwrap();
        assert!(!pressed);
        assert!(director.world().ball().unwrap().is_at_rest());
    }

    #[test]
    fn test_pause_cancels_timer_and_resume_restarts_it() {
        let (mut director, mut host) = started(100, 100);
        director.pause(&mut host, true).unwrap();
        assert_eq!(host.active_timers(), 0);
        assert_eq!(director.world().phase(), WorldPhase::Idle);
        assert_eq!(director.tick(&mut host).unwrap(), TickOutcome::Continue);

        director.pause(&mut host, false).unwrap();
        assert_eq!(host.active_timers(), 1);
        assert_eq!(director.world().phase(), WorldPhase::Running);
    }

    #[test]
    fn test_win_then_resume_advances_level() {
        // Ball spawns inside the hole's bounds
        let (mut director, mut host) = started(750, 260);

        assert_eq!(director.tick(&mut host).unwrap(), TickOutcome::Won);
        assert!(director.world().is_won());
        assert_eq!(host.completions, vec![true]);
        assert_eq!(host.active_timers(), 0);
        assert_eq!(host.visual_count(), 0);
        assert_eq!(director.level(), 1);

        // Host shows its celebration paused, then resumes the board
        director.pause(&mut host, true).unwrap();
        host.push_rolls([100, 100]);
        director.pause(&mut host, false).unwrap();
        assert_eq!(director.level(), 2);
        assert_eq!(director.sublevel(), 1);
        assert!(host.sounds.contains(&SoundCue::Bonus));
        assert_eq!(director.world().bodies()[0].size, DVec2::splat(104.0));
        assert_eq!(director.world().ball().unwrap().position, DVec2::new(100.0, 100.0));
        assert_eq!(host.active_timers(), 1);
        assert_eq!(host.visual_count(), 2);
    }

    #[test]
    fn test_level_caps_at_max() {
        let (mut director, mut host) = started(100, 100);
        for _ in 0..10 {
            director.on_level_won(&mut host).unwrap();
        }
        assert_eq!(director.level(), 6);
        assert_eq!(director.sublevel(), 1);
        assert_eq!(host.active_timers(), 1);
        assert_eq!(host.visual_count(), 2);
    }

    #[test]
    fn test_sublevels_delay_level_up() {
        let settings = Settings {
            sublevels: 2,
            ..Default::default()
        };
        let mut host = HeadlessHost::new(3);
        let mut director = LevelDirector::new(settings).unwrap();
        director.start(&mut host).unwrap();

        director.on_level_won(&mut host).unwrap();
        assert_eq!((director.level(), director.sublevel()), (1, 2));
        assert!(!host.sounds.contains(&SoundCue::Bonus));

        director.on_level_won(&mut host).unwrap();
        assert_eq!((director.level(), director.sublevel()), (2, 1));
        assert!(host.sounds.contains(&SoundCue::Bonus));
    }

    #[test]
    fn test_set_level_resets_sublevel_and_clamps() {
        let settings = Settings {
            sublevels: 3,
            ..Default::default()
        };
        let mut host = HeadlessHost::new(5);
        let mut director = LevelDirector::new(settings).unwrap();
        director.start(&mut host).unwrap();
        director.on_level_won(&mut host).unwrap();
        assert_eq!(director.sublevel(), 2);

        director.set_level(&mut host, 4).unwrap();
        assert_eq!((director.level(), director.sublevel()), (4, 1));
        assert_eq!(director.world().level(), 4);
        assert_eq!(director.world().bodies()[0].size, DVec2::splat(98.0));

        director.set_level(&mut host, 42).unwrap();
        assert_eq!(director.level(), 6);
        director.set_level(&mut host, 0).unwrap();
        assert_eq!(director.level(), 1);

        // Rebuilding never leaks visuals or timers
        assert_eq!(host.visual_count(), 2);
        assert_eq!(host.active_timers(), 1);
    }

    #[test]
    fn test_end_clears_board() {
        let (mut director, mut host) = started(100, 100);
        director.end(&mut host).unwrap();
        assert!(director.is_paused());
        assert!(director.world().bodies().is_empty());
        assert_eq!(host.visual_count(), 0);
        assert_eq!(host.active_timers(), 0);
    }

    #[test]
    fn test_timer_failure_propagates() {
        let (mut director, mut host) = started(100, 100);
        director.pause(&mut host, true).unwrap();
        host.set_failing(true);
        assert!(matches!(
            director.pause(&mut host, false),
            Err(MinigolfError::CollaboratorFailure(_))
        ));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            max_level: 40,
            ..Default::default()
        };
        assert!(matches!(
            LevelDirector::new(settings),
            Err(MinigolfError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_resume_before_start_is_ignored() {
        let mut host = HeadlessHost::new(1);
        let mut director = LevelDirector::new(Settings::default()).unwrap();
        assert!(!director.is_active());

        director.pause(&mut host, false).unwrap();
        assert_eq!(host.active_timers(), 0);
        assert!(director.is_paused());
        assert_eq!(director.world().phase(), WorldPhase::Idle);

        director.set_level(&mut host, 3).unwrap();
        assert_eq!(director.level(), 1);
        assert_eq!(host.visual_count(), 0);
    }

    #[test]
    fn test_resume_after_end_is_ignored() {
        let (mut director, mut host) = started(100, 100);
        director.end(&mut host).unwrap();
        assert!(!director.is_active());

        director.pause(&mut host, false).unwrap();
        assert_eq!(host.active_timers(), 0);
        assert_eq!(director.world().phase(), WorldPhase::Idle);

        director.set_level(&mut host, 2).unwrap();
        assert_eq!(host.visual_count(), 0);
    }

    #[test]
    fn test_failed_build_leaves_no_visuals() {
        // Hole succeeds, ball visual fails
        let mut host = HeadlessHost::with_rolls(1, [100, 100]);
        host.fail_visuals_after(1);
        let mut director = LevelDirector::new(Settings::default()).unwrap();
        assert!(matches!(
            director.start(&mut host),
            Err(MinigolfError::CollaboratorFailure(_))
        ));
        assert_eq!(host.visual_count(), 0);
        assert!(director.world().bodies().is_empty());
    }

    #[test]
    fn test_failed_rebuild_leaves_no_visuals() {
        let (mut director, mut host) = started(100, 100);
        host.fail_visuals_after(1);
        host.push_rolls([100, 100]);
        assert!(director.set_level(&mut host, 2).is_err());
        assert_eq!(host.visual_count(), 0);
        assert_eq!(host.active_timers(), 0);
    }
}
