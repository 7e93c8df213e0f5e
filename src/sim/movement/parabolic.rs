//! Closed-form projectile arc
//!
//! Horizontal motion is a straight lerp from start to end. Vertical motion is
//! the lerped baseline plus `v0·t − ½g·t²`, with `v0 = 4h/T` and `g = 8h/T²`
//! so the arc peaks `h` above the baseline exactly at `T/2`.

use glam::Vec3;

use crate::sim::target::TargetBody;

#[derive(Debug, Clone)]
pub struct Parabolic {
    start: Vec3,
    end: Vec3,
    max_height: f32,
    duration_ms: f32,
    elapsed_ms: f32,
    /// Initial vertical velocity (units/s)
    v0: f32,
    /// Gravity (units/s²)
    gravity: f32,
    complete: bool,
}

impl Parabolic {
    pub fn new(start: Vec3, end: Vec3, max_height: f32, duration_ms: f32) -> Self {
        let duration_ms = duration_ms.max(1.0);
        let t = duration_ms / 1000.0;
        Self {
            start,
            end,
            max_height,
            duration_ms,
            elapsed_ms: 0.0,
            v0: 4.0 * max_height / t,
            gravity: 8.0 * max_height / (t * t),
            complete: false,
        }
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn duration_ms(&self) -> f32 {
        self.duration_ms
    }

    /// Highest point of the arc (for sizing movement bounds)
    pub fn apex(&self) -> Vec3 {
        let mid = self.position_at(self.duration_ms * 0.5);
        Vec3::new(mid.x, self.start.y.max(self.end.y) + self.max_height, mid.z)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn position_at(&self, t_ms: f32) -> Vec3 {
        let t_ms = t_ms.clamp(0.0, self.duration_ms);
        let s = t_ms / self.duration_ms;
        let t = t_ms / 1000.0;
        let mut pos = self.start.lerp(self.end, s);
        pos.y += self.v0 * t - 0.5 * self.gravity * t * t;
        pos
    }

    pub fn update(&mut self, body: &mut TargetBody, dt_ms: f32) {
        if self.complete {
            body.request_despawn();
            return;
        }
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms >= self.duration_ms {
            body.position = self.end;
            self.complete = true;
            body.request_despawn();
        } else {
            body.position = self.position_at(self.elapsed_ms);
        }
    }
}
