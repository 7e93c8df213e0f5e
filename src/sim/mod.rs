//! Deterministic target simulation
//!
//! Per-tick motion of live targets plus the millisecond timer wheel the round
//! logic runs on:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by target ID)
//! - No host, UI or audio dependencies

pub mod arena;
pub mod bounds;
pub mod movement;
pub mod target;
pub mod timer;

pub use arena::{Arena, HitOutcome};
pub use bounds::MovementBounds;
pub use movement::MovementBehavior;
pub use target::{KindProfile, TargetBody, TargetEntity, TargetId, TargetKind};
pub use timer::{TimerId, Timers};
