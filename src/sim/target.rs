//! Target entities
//!
//! A target is split into a [`TargetBody`] (the kinematic state behaviors
//! mutate) and the [`MovementBehavior`] that drives it, so a behavior can be
//! updated against the body it belongs to without aliasing.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::bounds::MovementBounds;
use super::movement::MovementBehavior;

/// Target identifier (allocated by the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u32);

/// Target types, each mapped to one movement behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetKind {
    Static,
    Wander,
    /// Sine wave weaving sideways while travelling
    Horizontal,
    /// Sine wave bobbing up and down while travelling
    Vertical,
    PopUp,
    Rising,
    Parabolic,
    Pendulum,
}

/// Per-kind base stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindProfile {
    /// Units per second before the round speed multiplier
    pub base_speed: f32,
    pub health: u32,
    pub breakable: bool,
    /// Bounce on out-of-bounds (true) or reset to spawn point (false)
    pub oscillate: bool,
    /// Points awarded by the basic scoreboard for a hit
    pub hit_points: u32,
}

impl TargetKind {
    pub const ALL: [TargetKind; 8] = [
        TargetKind::Static,
        TargetKind::Wander,
        TargetKind::Horizontal,
        TargetKind::Vertical,
        TargetKind::PopUp,
        TargetKind::Rising,
        TargetKind::Parabolic,
        TargetKind::Pendulum,
    ];

    pub fn profile(&self) -> KindProfile {
        match self {
            TargetKind::Static => KindProfile {
                base_speed: 0.0,
                health: 2,
                breakable: true,
                oscillate: false,
                hit_points: 10,
            },
            TargetKind::Wander => KindProfile {
                base_speed: 3.0,
                health: 1,
                breakable: true,
                oscillate: true,
                hit_points: 15,
            },
            TargetKind::Horizontal => KindProfile {
                base_speed: 4.0,
                health: 1,
                breakable: true,
                oscillate: true,
                hit_points: 20,
            },
            TargetKind::Vertical => KindProfile {
                base_speed: 3.0,
                health: 1,
                breakable: true,
                oscillate: true,
                hit_points: 20,
            },
            TargetKind::PopUp => KindProfile {
                base_speed: 3.0,
                health: 1,
                breakable: true,
                oscillate: false,
                hit_points: 25,
            },
            TargetKind::Rising => KindProfile {
                base_speed: 2.5,
                health: 1,
                breakable: true,
                oscillate: false,
                hit_points: 30,
            },
            // Trajectory is time-driven, speed unused
            TargetKind::Parabolic => KindProfile {
                base_speed: 0.0,
                health: 1,
                breakable: true,
                oscillate: false,
                hit_points: 35,
            },
            TargetKind::Pendulum => KindProfile {
                base_speed: 0.0,
                health: 2,
                breakable: true,
                oscillate: false,
                hit_points: 20,
            },
        }
    }

    /// Static targets spawn in the open area, everything else inside the movement volume
    pub fn is_static(&self) -> bool {
        *self == TargetKind::Static
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Static => "static",
            TargetKind::Wander => "wander",
            TargetKind::Horizontal => "horizontal",
            TargetKind::Vertical => "vertical",
            TargetKind::PopUp => "popUp",
            TargetKind::Rising => "rising",
            TargetKind::Parabolic => "parabolic",
            TargetKind::Pendulum => "pendulum",
        }
    }
}

/// Kinematic state shared with movement behaviors
#[derive(Debug, Clone)]
pub struct TargetBody {
    pub position: Vec3,
    origin: Vec3,
    /// Always unit length
    direction: Vec3,
    pub move_speed: f32,
    pub bounds: MovementBounds,
    pub oscillate: bool,
    despawn_requested: bool,
}

impl TargetBody {
    pub fn new(position: Vec3, direction: Vec3, move_speed: f32, bounds: MovementBounds, oscillate: bool) -> Self {
        let mut body = Self {
            position,
            origin: position,
            direction: Vec3::X,
            move_speed,
            bounds,
            oscillate,
            despawn_requested: false,
        };
        body.set_direction(direction);
        body
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Set travel direction (normalized; zero vectors are ignored)
    pub fn set_direction(&mut self, dir: Vec3) {
        let unit = dir.normalize_or_zero();
        if unit != Vec3::ZERO {
            self.direction = unit;
        }
    }

    /// Spawn position
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn is_within_bounds(&self) -> bool {
        self.bounds.contains(self.position)
    }

    /// Reverse only the components on the given axes (reflect off faces)
    pub fn reflect_direction(&mut self, axes: [bool; 3]) {
        let mut dir = self.direction;
        for (i, hit) in axes.iter().enumerate() {
            if *hit {
                dir[i] = -dir[i];
            }
        }
        self.set_direction(dir);
    }

    pub fn reset_to_origin(&mut self) {
        self.position = self.origin;
    }

    /// Displacement along the current direction for `dt_ms`
    #[inline]
    pub fn step(&self, dt_ms: f32) -> Vec3 {
        self.direction * self.move_speed * dt_ms / 1000.0
    }

    pub fn request_despawn(&mut self) {
        self.despawn_requested = true;
    }

    pub fn despawn_requested(&self) -> bool {
        self.despawn_requested
    }
}

/// A destructible, possibly moving world object
#[derive(Debug, Clone)]
pub struct TargetEntity {
    pub id: TargetId,
    pub kind: TargetKind,
    pub body: TargetBody,
    pub behavior: MovementBehavior,
    pub health: u32,
    pub breakable: bool,
    pub spawn_time_ms: u64,
}

impl TargetEntity {
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    /// Advance movement by one tick
    pub fn tick(&mut self, dt_ms: f32) {
        self.behavior.update(&mut self.body, dt_ms);
    }

    /// Apply damage; returns true when the target is destroyed
    pub fn take_damage(&mut self, damage: u32) -> bool {
        if !self.breakable || self.health == 0 {
            return false;
        }
        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            self.body.request_despawn();
            true
        } else {
            false
        }
    }

    /// Health reached zero or the behavior finished its trajectory
    pub fn should_despawn(&self) -> bool {
        self.body.despawn_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> TargetBody {
        TargetBody::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(3.0, 0.0, 4.0),
            5.0,
            MovementBounds::new(Vec3::splat(-10.0), Vec3::splat(10.0)),
            true,
        )
    }

    #[test]
    fn test_direction_is_unit() {
        let mut b = body();
        assert!((b.direction().length() - 1.0).abs() < 1e-6);
        b.set_direction(Vec3::ZERO);
        assert!((b.direction().length() - 1.0).abs() < 1e-6);
        b.reflect_direction([true, false, false]);
        assert!((b.direction() - Vec3::new(-0.6, 0.0, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_step_scales_with_dt() {
        let b = body();
        // 5 units/s for 200 ms = 1 unit
        assert!((b.step(200.0).length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_take_damage_destroys() {
        let mut target = TargetEntity {
            id: TargetId(1),
            kind: TargetKind::Static,
            body: body(),
            behavior: MovementBehavior::Static,
            health: 2,
            breakable: true,
            spawn_time_ms: 0,
        };
        assert!(!target.take_damage(1));
        assert!(target.take_damage(1));
        assert!(target.should_despawn());
        // Already dead
        assert!(!target.take_damage(1));
    }

    #[test]
    fn test_unbreakable_ignores_damage() {
        let mut target = TargetEntity {
            id: TargetId(1),
            kind: TargetKind::Static,
            body: body(),
            behavior: MovementBehavior::Static,
            health: 1,
            breakable: false,
            spawn_time_ms: 0,
        };
        assert!(!target.take_damage(5));
        assert_eq!(target.health, 1);
        assert!(!target.should_despawn());
    }
}
