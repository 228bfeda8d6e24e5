//! Minigolf headless runner
//!
//! Plays the activity without a window. The headless host stands in for the
//! shell; this loop stands in for its timer and pointer events, clicking the
//! ball on the side facing away from the hole whenever it comes to rest.
//!
//! Usage: `minigolf [settings.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
use glam::DVec2;

#[cfg(not(target_arch = "wasm32"))]
use minigolf::host::Host;
#[cfg(not(target_arch = "wasm32"))]
use minigolf::sim::{LevelDirector, TickOutcome};
#[cfg(not(target_arch = "wasm32"))]
use minigolf::{HeadlessHost, Result, Settings};

/// Give up after this many ticks
#[cfg(not(target_arch = "wasm32"))]
const MAX_TICKS: u32 = 50_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("Minigolf stopped: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The headless runner is native only
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    log::info!("Minigolf (headless) starting, seed {}", seed);

    let max_level = settings.max_level;
    let mut host = HeadlessHost::new(seed);
    let mut director = LevelDirector::new(settings)?;
    director.start(&mut host)?;

    let mut wins = 0;
    let mut clicks = 0;
    let mut ticks = 0;
    while ticks < MAX_TICKS && wins < max_level {
        ticks += 1;
        if director.world().ball().is_some_and(|b| b.is_at_rest()) {
            aim_and_click(&mut director, &mut host)?;
            clicks += 1;
        }

        if director.tick(&mut host)? == TickOutcome::Won {
            wins += 1;
            log::info!("Won level {} after {} clicks", director.level(), clicks);
            // The host's celebration: pause, then resume into the next level
            director.pause(&mut host, true)?;
            director.pause(&mut host, false)?;
        }
    }

    director.end(&mut host)?;
    println!(
        "{} wins, {} clicks, {} ticks, reached level {}",
        wins,
        clicks,
        ticks,
        director.level()
    );
    Ok(())
}

/// Click the ball on the side opposite the hole, with a random strength
#[cfg(not(target_arch = "wasm32"))]
fn aim_and_click(director: &mut LevelDirector, host: &mut HeadlessHost) -> Result<()> {
    let Some(handle) = director.world().ball().and_then(|b| b.visual) else {
        return Ok(());
    };
    let bounds = host.visual_bounds(handle)?;
    let toward_hole = (director.settings().hole_position - bounds.center()).normalize_or_zero();
    let strength = host.random_int(20, 100) as f64 / 100.0;
    let pointer: DVec2 = bounds.center() - toward_hole * (bounds.width() / 2.0) * strength;
    director.pointer_press(host, handle, pointer)?;
    Ok(())
}
