//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed logical time step per tick
//! - Injected RNG only (through the host)
//! - Stable iteration order (creation order)
//! - No rendering or platform dependencies

pub mod body;
pub mod level;
pub mod world;

pub use body::{BodyKind, PointerBinding, SimBody, VisualSpec};
pub use level::LevelDirector;
pub use world::{PhysicsWorld, TickOutcome, WorldPhase};
