//! Sine wave motion
//!
//! Travels along a base axis while oscillating on a wave axis with
//! `amplitude * sin(2π * frequency * t + phase)`. The rendered offset eases
//! toward the raw wave value each tick, so the output lags slightly but never
//! snaps. Vertical waves clamp height into a safe band and start from a fixed
//! height.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::guard::{MotionGuard, escape_speed};
use crate::consts::*;
use crate::sim::target::TargetBody;

/// Shortest escape heading kept as-is once the wave component is dropped
const MIN_ESCAPE_HEADING: f32 = 0.2;

/// World axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[inline]
    pub fn unit(&self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Height band for vertical waves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalBand {
    pub min_y: f32,
    pub max_y: f32,
    /// Anchor height on the first frame
    pub start_y: f32,
}

/// Wave shape, randomized per instance by the spawner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    pub base_axis: Axis,
    pub wave_axis: Axis,
    pub amplitude: f32,
    /// Hz
    pub frequency: f32,
    /// Radians
    pub phase: f32,
    /// Fraction of the remaining gap closed per tick
    pub smoothing: f32,
    pub vertical_band: Option<VerticalBand>,
}

impl WaveParams {
    /// Side-to-side weave while travelling along X
    pub fn horizontal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            base_axis: Axis::X,
            wave_axis: Axis::Z,
            amplitude: rng.random_range(2.0..=4.0),
            frequency: rng.random_range(0.3..=0.6),
            phase: rng.random_range(0.0..std::f32::consts::TAU),
            smoothing: HORIZONTAL_WAVE_SMOOTHING,
            vertical_band: None,
        }
    }

    /// Up-and-down bob while travelling along Z
    pub fn vertical<R: Rng + ?Sized>(rng: &mut R, band: VerticalBand) -> Self {
        Self {
            base_axis: Axis::Z,
            wave_axis: Axis::Y,
            amplitude: rng.random_range(1.5..=3.0),
            frequency: rng.random_range(0.2..=0.4),
            phase: rng.random_range(0.0..std::f32::consts::TAU),
            smoothing: VERTICAL_WAVE_SMOOTHING,
            vertical_band: Some(band),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SineWave {
    params: WaveParams,
    elapsed_ms: f32,
    offset: f32,
    anchor: Option<Vec3>,
    guard: MotionGuard,
}

impl SineWave {
    pub fn new(params: WaveParams, seed: u64) -> Self {
        Self {
            params,
            elapsed_ms: 0.0,
            offset: 0.0,
            anchor: None,
            guard: MotionGuard::new(seed),
        }
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    /// Smoothed offset applied on the wave axis
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn guard(&self) -> &MotionGuard {
        &self.guard
    }

    /// Raw (unsmoothed) wave value at behavior time `t_ms`
    pub fn wave_at(&self, t_ms: f32) -> f32 {
        let t = t_ms / 1000.0;
        self.params.amplitude
            * (std::f32::consts::TAU * self.params.frequency * t + self.params.phase).sin()
    }

    fn initial_anchor(&self, body: &TargetBody, from: Vec3) -> Vec3 {
        let mut anchor = from;
        if let Some(band) = self.params.vertical_band {
            anchor.y = band.start_y;
        }
        body.bounds.clamp(anchor)
    }

    /// Escape heading with the wave axis removed. When little is left (a
    /// ping-pong perpendicular that lands on the wave axis), head back along
    /// the base axis and diagonally across the remaining free axis.
    fn escape_heading(&mut self, dir: Vec3, travel_sign: f32) -> Vec3 {
        let base = self.params.base_axis.index();
        let wave = self.params.wave_axis.index();
        let mut flat = dir;
        flat[wave] = 0.0;
        if flat.length() >= MIN_ESCAPE_HEADING {
            return flat.normalize();
        }
        let free = 3 - base - wave;
        let mut out = Vec3::ZERO;
        out[base] = -travel_sign;
        out[free] = self.guard.random_sign();
        out.normalize()
    }

    pub fn update(&mut self, body: &mut TargetBody, dt_ms: f32) {
        self.elapsed_ms += dt_ms;
        let bounds = body.bounds;
        let base = self.params.base_axis.index();
        let wave = self.params.wave_axis.index();

        let mut anchor = match self.anchor {
            Some(a) => a,
            None => self.initial_anchor(body, body.position),
        };

        if let Some(escape) = self.guard.escape().copied() {
            anchor += escape.direction * escape_speed(body.move_speed) * dt_ms / 1000.0;
            let violated = bounds.violated_axes(anchor);
            if violated.iter().any(|v| *v) {
                self.guard.reflect_escape(violated);
                anchor = bounds.clamp(anchor);
            }
            if let Some(done) = self.guard.tick_escape(dt_ms) {
                // Resume travel on the base axis, heading the way the escape went
                let sign = if done.direction[base] < 0.0 { -1.0 } else { 1.0 };
                body.set_direction(self.params.base_axis.unit() * sign);
            }
        } else {
            let sign = if body.direction()[base] < 0.0 { -1.0 } else { 1.0 };
            anchor[base] += sign * body.move_speed * dt_ms / 1000.0;

            let violated = bounds.violated_axes(anchor);
            if violated[base] {
                if body.oscillate {
                    if self.guard.try_reverse(self.elapsed_ms) {
                        body.set_direction(self.params.base_axis.unit() * -sign);
                    }
                    anchor = bounds.clamp(anchor);
                } else {
                    anchor = self.initial_anchor(body, body.origin());
                }
            } else if violated.iter().any(|v| *v) {
                anchor = bounds.clamp(anchor);
            }

            if let Some(reason) = self.guard.observe(anchor, self.elapsed_ms) {
                let raw = self.guard.begin_escape(reason, body.direction());
                let dir = self.escape_heading(raw, sign);
                self.guard.redirect_escape(dir);
                // New phase so the wave doesn't pick its old cycle back up mid-swing
                self.params.phase = self.guard.random_angle();
                log::debug!("Sine wave escape ({:?}), new phase {:.2}", reason, self.params.phase);
                anchor = bounds.clamp(anchor + dir * ESCAPE_PUSH_DISTANCE);
            }
        }

        let target = self.wave_at(self.elapsed_ms);
        self.offset += (target - self.offset) * self.params.smoothing;

        let mut pos = anchor;
        pos[wave] += self.offset;
        if let Some(band) = self.params.vertical_band {
            pos.y = pos.y.clamp(band.min_y, band.max_y);
        }

        self.anchor = Some(anchor);
        body.position = bounds.clamp(pos);
    }
}
