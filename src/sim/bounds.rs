//! Axis-aligned movement bounds
//!
//! An axis whose min equals its max is unconstrained on that axis. A box with
//! every axis unconstrained is degenerate and contains every point.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Axis-aligned box constraining a target's legal position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Corners")]
pub struct MovementBounds {
    pub min: Vec3,
    pub max: Vec3,
}

/// Wire form; corners may arrive in any order
#[derive(Deserialize)]
struct Corners {
    min: Vec3,
    max: Vec3,
}

impl From<Corners> for MovementBounds {
    fn from(c: Corners) -> Self {
        Self::new(c.min, c.max)
    }
}

impl MovementBounds {
    /// Build from two corners (components are sorted per axis)
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Bounds that constrain nothing
    pub fn unconstrained() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }

    /// Whether axis `i` (0 = x, 1 = y, 2 = z) limits motion
    #[inline]
    pub fn constrains_axis(&self, i: usize) -> bool {
        self.min[i] != self.max[i]
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// True when no axis is constrained
    pub fn is_degenerate(&self) -> bool {
        (0..3).all(|i| !self.constrains_axis(i))
    }

    pub fn contains(&self, p: Vec3) -> bool {
        (0..3).all(|i| !self.constrains_axis(i) || (p[i] >= self.min[i] && p[i] <= self.max[i]))
    }

    /// Axes on which `p` lies outside the bounds
    pub fn violated_axes(&self, p: Vec3) -> [bool; 3] {
        let mut out = [false; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.constrains_axis(i) && (p[i] < self.min[i] || p[i] > self.max[i]);
        }
        out
    }

    /// Clamp constrained axes of `p` into the box
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        let mut out = p;
        for i in 0..3 {
            if self.constrains_axis(i) {
                out[i] = p[i].clamp(self.min[i], self.max[i]);
            }
        }
        out
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Shrink constrained axes by `margin` on each side (never past the center)
    pub fn inset(&self, margin: f32) -> Self {
        let mut min = self.min;
        let mut max = self.max;
        for i in 0..3 {
            if self.constrains_axis(i) {
                let half = (self.max[i] - self.min[i]) * 0.5;
                let m = margin.min(half * 0.9);
                min[i] += m;
                max[i] -= m;
            }
        }
        Self { min, max }
    }

    /// Grow the bounds so `p` is inside on every constrained axis
    pub fn expanded_to(&self, p: Vec3) -> Self {
        let mut out = *self;
        for i in 0..3 {
            if self.constrains_axis(i) {
                out.min[i] = out.min[i].min(p[i]);
                out.max[i] = out.max[i].max(p[i]);
            }
        }
        out
    }

    /// Uniform random point (unconstrained axes take the min value)
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let mut p = self.min;
        for i in 0..3 {
            if self.constrains_axis(i) {
                p[i] = rng.random_range(self.min[i]..=self.max[i]);
            }
        }
        p
    }

    /// Horizontal distance from `p` to the nearest vertical face of the box
    /// (negative when `p` is inside the XZ footprint)
    pub fn horizontal_edge_distance(&self, p: Vec3) -> f32 {
        let dx = (self.min.x - p.x).max(p.x - self.max.x);
        let dz = (self.min.z - p.z).max(p.z - self.max.z);
        if dx <= 0.0 && dz <= 0.0 {
            dx.max(dz)
        } else {
            Vec3::new(dx.max(0.0), 0.0, dz.max(0.0)).length()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn cube() -> MovementBounds {
        MovementBounds::new(Vec3::splat(-10.0), Vec3::splat(10.0))
    }

    #[test]
    fn test_contains_and_clamp() {
        let b = cube();
        assert!(b.contains(Vec3::ZERO));
        assert!(!b.contains(Vec3::new(11.0, 0.0, 0.0)));
        assert_eq!(b.clamp(Vec3::new(11.0, -20.0, 3.0)), Vec3::new(10.0, -10.0, 3.0));
    }

    #[test]
    fn test_inverted_corners_from_json_are_sorted() {
        let json = r#"{"min":[30.0,18.0,30.0],"max":[-30.0,2.0,-30.0]}"#;
        let b: MovementBounds = serde_json::from_str(json).unwrap();
        assert_eq!(b.min, Vec3::new(-30.0, 2.0, -30.0));
        assert_eq!(b.max, Vec3::new(30.0, 18.0, 30.0));

        let mut rng = Pcg32::seed_from_u64(8);
        for _ in 0..50 {
            assert!(b.contains(b.random_point(&mut rng)));
        }
    }

    #[test]
    fn test_degenerate_axis_is_unconstrained() {
        let b = MovementBounds::new(Vec3::new(-5.0, 2.0, -5.0), Vec3::new(5.0, 2.0, 5.0));
        assert!(!b.constrains_axis(1));
        assert!(b.contains(Vec3::new(0.0, 500.0, 0.0)));
        assert!(!b.is_degenerate());
        assert!(MovementBounds::unconstrained().is_degenerate());
        assert!(MovementBounds::unconstrained().contains(Vec3::splat(1e6)));
    }

    #[test]
    fn test_inset_stays_ordered() {
        let b = MovementBounds::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 10.0, 10.0));
        let inner = b.inset(5.0);
        for i in 0..3 {
            assert!(inner.min[i] < inner.max[i]);
        }
        // Margin is capped at 90% of the half-extent
        assert!((inner.min.x - 0.9).abs() < 1e-6);
        assert!((inner.min.y - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_random_point_inside() {
        let b = cube().inset(2.0);
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            assert!(b.contains(b.random_point(&mut rng)));
        }
    }

    #[test]
    fn test_horizontal_edge_distance() {
        let platform = MovementBounds::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 1.0, 4.0));
        assert!((platform.horizontal_edge_distance(Vec3::new(6.0, 0.0, 2.0)) - 2.0).abs() < 1e-6);
        // Inside footprint: negative distance to nearest edge
        assert!((platform.horizontal_edge_distance(Vec3::new(1.0, 5.0, 2.0)) + 1.0).abs() < 1e-6);
    }
}
