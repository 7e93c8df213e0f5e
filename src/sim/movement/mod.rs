//! Movement behaviors
//!
//! One closed set of motion strategies behind a single `update` call:
//! - `Static`: holds position, snaps back if pushed out of bounds
//! - `Wander`: straight travel + vertical bob, with anti-stuck escapes
//! - `SineWave`: base-axis travel + smoothed wave (horizontal or vertical)
//! - `PopUp` / `Rising`: vertical state machines that end in despawn
//! - `Parabolic`: timed projectile arc, despawns on landing
//! - `Pendulum`: swing about a pivot, never despawns itself
//!
//! After any variant runs, the body is pulled back inside its bounds, so the
//! position is legal at the end of every tick.

pub mod guard;
pub mod lift;
pub mod parabolic;
pub mod pendulum;
pub mod wander;
pub mod wave;

pub use guard::{Escape, EscapeReason, MotionGuard};
pub use lift::{PopUp, PopUpPhase, Rising, RisingPhase};
pub use parabolic::Parabolic;
pub use pendulum::Pendulum;
pub use wander::Wander;
pub use wave::{Axis, SineWave, VerticalBand, WaveParams};

use glam::Vec3;
use rand::Rng;

use super::target::{TargetBody, TargetKind};
use crate::settings::ArenaLayout;

#[derive(Debug, Clone)]
pub enum MovementBehavior {
    Static,
    Wander(Wander),
    SineWave(SineWave),
    PopUp(PopUp),
    Rising(Rising),
    Parabolic(Parabolic),
    Pendulum(Pendulum),
}

impl MovementBehavior {
    /// Build the behavior for `kind` with per-instance randomized parameters.
    /// `body` must already hold the spawn position.
    pub fn for_kind<R: Rng + ?Sized>(
        kind: TargetKind,
        body: &TargetBody,
        layout: &ArenaLayout,
        rng: &mut R,
    ) -> Self {
        let pos = body.position;
        match kind {
            TargetKind::Static => MovementBehavior::Static,
            TargetKind::Wander => MovementBehavior::Wander(Wander::new(rng)),
            TargetKind::Horizontal => {
                MovementBehavior::SineWave(SineWave::new(WaveParams::horizontal(rng), rng.random()))
            }
            TargetKind::Vertical => MovementBehavior::SineWave(SineWave::new(
                WaveParams::vertical(rng, layout.vertical_band),
                rng.random(),
            )),
            TargetKind::PopUp => MovementBehavior::PopUp(PopUp::randomized(rng, pos.y)),
            TargetKind::Rising => MovementBehavior::Rising(Rising::randomized(rng, pos.y)),
            TargetKind::Parabolic => {
                // Fly across the arena center to the mirrored point
                let center = layout.movement_bounds.center();
                let mut end = Vec3::new(2.0 * center.x - pos.x, pos.y, 2.0 * center.z - pos.z);
                end = layout.movement_bounds.clamp(end);
                MovementBehavior::Parabolic(Parabolic::new(
                    pos,
                    end,
                    rng.random_range(4.0..=8.0),
                    rng.random_range(3000.0..=4500.0),
                ))
            }
            TargetKind::Pendulum => MovementBehavior::Pendulum(Pendulum::randomized(rng, pos)),
        }
    }

    /// Extreme points the behavior will visit from `origin` (bounds are widened to cover them)
    pub fn trajectory_extremes(&self, origin: Vec3) -> Vec<Vec3> {
        match self {
            MovementBehavior::Parabolic(p) => vec![p.start(), p.end(), p.apex()],
            MovementBehavior::Pendulum(p) => {
                let reach = p.swing_axis() * p.length();
                vec![
                    p.pivot(),
                    p.pivot() + reach,
                    p.pivot() - reach,
                    p.pivot() - Vec3::Y * p.length(),
                ]
            }
            MovementBehavior::PopUp(p) => vec![Vec3::new(origin.x, p.top_y(), origin.z)],
            MovementBehavior::Rising(r) => vec![Vec3::new(origin.x, r.final_y(), origin.z)],
            _ => Vec::new(),
        }
    }

    pub fn update(&mut self, body: &mut TargetBody, dt_ms: f32) {
        match self {
            MovementBehavior::Static => {
                if !body.is_within_bounds() {
                    body.reset_to_origin();
                }
            }
            MovementBehavior::Wander(w) => w.update(body, dt_ms),
            MovementBehavior::SineWave(s) => s.update(body, dt_ms),
            MovementBehavior::PopUp(p) => p.update(body, dt_ms),
            MovementBehavior::Rising(r) => r.update(body, dt_ms),
            MovementBehavior::Parabolic(p) => p.update(body, dt_ms),
            MovementBehavior::Pendulum(p) => p.update(body, dt_ms),
        }
        if !body.is_within_bounds() {
            body.position = body.bounds.clamp(body.position);
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MovementBehavior::Static => "static",
            MovementBehavior::Wander(_) => "wander",
            MovementBehavior::SineWave(_) => "sineWave",
            MovementBehavior::PopUp(_) => "popUp",
            MovementBehavior::Rising(_) => "rising",
            MovementBehavior::Parabolic(_) => "parabolic",
            MovementBehavior::Pendulum(_) => "pendulum",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bounds::MovementBounds;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_static_snaps_back() {
        let mut b = TargetBody::new(
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::X,
            0.0,
            MovementBounds::new(Vec3::ZERO, Vec3::splat(5.0)),
            false,
        );
        let mut behavior = MovementBehavior::Static;
        b.position = Vec3::new(50.0, 1.0, 1.0);
        behavior.update(&mut b, 16.0);
        assert_eq!(b.position, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_trajectory_extremes_cover_parabolic_apex() {
        let layout = ArenaLayout::default();
        let mut rng = Pcg32::seed_from_u64(31);
        let body = TargetBody::new(
            Vec3::new(-10.0, 4.0, 5.0),
            Vec3::X,
            0.0,
            layout.movement_bounds,
            false,
        );
        let behavior = MovementBehavior::for_kind(TargetKind::Parabolic, &body, &layout, &mut rng);
        let extremes = behavior.trajectory_extremes(body.origin());
        assert_eq!(extremes.len(), 3);
        assert!(extremes[2].y > 4.0);
    }

    proptest! {
        // Every behavior ends every tick inside its (possibly widened) bounds
        #[test]
        fn prop_update_keeps_position_in_bounds(
            seed in any::<u64>(),
            kind_idx in 0usize..TargetKind::ALL.len(),
            x in -20.0f32..20.0,
            z in -20.0f32..20.0,
            speed in 0.0f32..12.0,
            dt in 1.0f32..50.0,
        ) {
            let layout = ArenaLayout::default();
            let kind = TargetKind::ALL[kind_idx];
            let mut rng = Pcg32::seed_from_u64(seed);
            let start = layout.movement_bounds.clamp(Vec3::new(x, layout.ground_y + 2.0, z));
            let mut body = TargetBody::new(start, Vec3::new(1.0, 0.0, 0.5), speed, layout.movement_bounds, true);
            let mut behavior = MovementBehavior::for_kind(kind, &body, &layout, &mut rng);
            for p in behavior.trajectory_extremes(start) {
                body.bounds = body.bounds.expanded_to(p);
            }
            for _ in 0..300 {
                behavior.update(&mut body, dt);
                prop_assert!(body.is_within_bounds(), "{:?} left bounds at {:?}", kind, body.position);
                prop_assert!((body.direction().length() - 1.0).abs() < 1e-4);
            }
        }
    }
}
