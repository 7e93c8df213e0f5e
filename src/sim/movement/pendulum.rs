//! Pendulum swing about a fixed pivot
//!
//! `angle = amplitude · sin(2π · frequency · t)`. Never despawns on its own.

use glam::Vec3;
use rand::Rng;

use crate::planar_direction;
use crate::sim::target::TargetBody;

#[derive(Debug, Clone)]
pub struct Pendulum {
    pivot: Vec3,
    length: f32,
    /// Peak angle (radians)
    amplitude: f32,
    /// Hz
    frequency: f32,
    /// Horizontal unit vector the bob swings along
    swing_axis: Vec3,
    elapsed_ms: f32,
}

impl Pendulum {
    pub fn new(pivot: Vec3, length: f32, amplitude: f32, frequency: f32, swing_axis: Vec3) -> Self {
        let axis = Vec3::new(swing_axis.x, 0.0, swing_axis.z).normalize_or_zero();
        Self {
            pivot,
            length,
            amplitude,
            frequency,
            swing_axis: if axis == Vec3::ZERO { Vec3::X } else { axis },
            elapsed_ms: 0.0,
        }
    }

    /// Hang below a point `length` above `rest`
    pub fn randomized<R: Rng + ?Sized>(rng: &mut R, rest: Vec3) -> Self {
        let length = rng.random_range(3.0..=5.0);
        Self::new(
            rest + Vec3::Y * length,
            length,
            rng.random_range(0.5..=0.9),
            rng.random_range(0.25..=0.5),
            planar_direction(rng.random_range(0.0..std::f32::consts::TAU)),
        )
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn swing_axis(&self) -> Vec3 {
        self.swing_axis
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn angle_at(&self, t_ms: f32) -> f32 {
        let t = t_ms / 1000.0;
        self.amplitude * (std::f32::consts::TAU * self.frequency * t).sin()
    }

    pub fn position_at(&self, t_ms: f32) -> Vec3 {
        let angle = self.angle_at(t_ms);
        self.pivot + self.swing_axis * self.length * angle.sin() - Vec3::Y * self.length * angle.cos()
    }

    pub fn update(&mut self, body: &mut TargetBody, dt_ms: f32) {
        self.elapsed_ms += dt_ms;
        body.position = self.position_at(self.elapsed_ms);
    }
}
