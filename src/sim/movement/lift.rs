//! Vertical lift behaviors: pop-up and rising
//!
//! Both are small state machines that only move forward. Reaching
//! `Complete` requests despawn on the following update.

use rand::Rng;

use crate::consts::*;
use crate::sim::target::TargetBody;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PopUpPhase {
    Rising,
    Paused { remaining_ms: f32 },
    Falling,
    Complete,
}

impl PopUpPhase {
    /// Position in the fixed phase order (used to check monotonic progress)
    pub fn ordinal(&self) -> u8 {
        match self {
            PopUpPhase::Rising => 0,
            PopUpPhase::Paused { .. } => 1,
            PopUpPhase::Falling => 2,
            PopUpPhase::Complete => 3,
        }
    }
}

/// Rises out of cover, holds at the top, drops back down, then leaves
#[derive(Debug, Clone)]
pub struct PopUp {
    start_y: f32,
    top_y: f32,
    pause_ms: f32,
    phase: PopUpPhase,
}

impl PopUp {
    pub fn new(start_y: f32, top_y: f32, pause_ms: f32) -> Self {
        Self {
            start_y,
            top_y: top_y.max(start_y),
            pause_ms,
            phase: PopUpPhase::Rising,
        }
    }

    pub fn randomized<R: Rng + ?Sized>(rng: &mut R, start_y: f32) -> Self {
        Self::new(
            start_y,
            start_y + rng.random_range(4.0..=7.0),
            rng.random_range(1200.0..=2000.0),
        )
    }

    pub fn phase(&self) -> PopUpPhase {
        self.phase
    }

    pub fn top_y(&self) -> f32 {
        self.top_y
    }

    pub fn update(&mut self, body: &mut TargetBody, dt_ms: f32) {
        let dt = dt_ms / 1000.0;
        match self.phase {
            PopUpPhase::Rising => {
                body.position.y += body.move_speed * POPUP_RISE_MULTIPLIER * dt;
                if body.position.y >= self.top_y {
                    body.position.y = self.top_y;
                    self.phase = PopUpPhase::Paused {
                        remaining_ms: self.pause_ms,
                    };
                }
            }
            PopUpPhase::Paused { remaining_ms } => {
                let remaining_ms = remaining_ms - dt_ms;
                self.phase = if remaining_ms <= 0.0 {
                    PopUpPhase::Falling
                } else {
                    PopUpPhase::Paused { remaining_ms }
                };
            }
            PopUpPhase::Falling => {
                body.position.y -= body.move_speed * dt;
                if body.position.y <= self.start_y {
                    body.position.y = self.start_y;
                    self.phase = PopUpPhase::Complete;
                }
            }
            PopUpPhase::Complete => body.request_despawn(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RisingPhase {
    Rising,
    Paused { remaining_ms: f32 },
    Shooting,
    Complete,
}

impl RisingPhase {
    pub fn ordinal(&self) -> u8 {
        match self {
            RisingPhase::Rising => 0,
            RisingPhase::Paused { .. } => 1,
            RisingPhase::Shooting => 2,
            RisingPhase::Complete => 3,
        }
    }
}

/// Climbs to a first stop, hesitates, then shoots up and away.
/// A target that escapes this way is gone for good.
#[derive(Debug, Clone)]
pub struct Rising {
    first_stop_y: f32,
    final_y: f32,
    pause_ms: f32,
    phase: RisingPhase,
}

impl Rising {
    pub fn new(first_stop_y: f32, final_y: f32, pause_ms: f32) -> Self {
        Self {
            first_stop_y,
            final_y: final_y.max(first_stop_y),
            pause_ms,
            phase: RisingPhase::Rising,
        }
    }

    pub fn randomized<R: Rng + ?Sized>(rng: &mut R, start_y: f32) -> Self {
        Self::new(
            start_y + rng.random_range(4.0..=6.0),
            start_y + rng.random_range(25.0..=35.0),
            rng.random_range(1500.0..=2500.0),
        )
    }

    pub fn phase(&self) -> RisingPhase {
        self.phase
    }

    pub fn final_y(&self) -> f32 {
        self.final_y
    }

    pub fn update(&mut self, body: &mut TargetBody, dt_ms: f32) {
        let dt = dt_ms / 1000.0;
        match self.phase {
            RisingPhase::Rising => {
                body.position.y += body.move_speed * dt;
                if body.position.y >= self.first_stop_y {
                    body.position.y = self.first_stop_y;
                    self.phase = RisingPhase::Paused {
                        remaining_ms: self.pause_ms,
                    };
                }
            }
            RisingPhase::Paused { remaining_ms } => {
                let remaining_ms = remaining_ms - dt_ms;
                self.phase = if remaining_ms <= 0.0 {
                    RisingPhase::Shooting
                } else {
                    RisingPhase::Paused { remaining_ms }
                };
            }
            RisingPhase::Shooting => {
                body.position.y += body.move_speed * RISING_SHOOT_MULTIPLIER * dt;
                if body.position.y >= self.final_y {
                    body.position.y = self.final_y;
                    self.phase = RisingPhase::Complete;
                }
            }
            RisingPhase::Complete => body.request_despawn(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bounds::MovementBounds;
    use glam::Vec3;

    fn body(y: f32, speed: f32) -> TargetBody {
        TargetBody::new(
            Vec3::new(0.0, y, 0.0),
            Vec3::Y,
            speed,
            MovementBounds::unconstrained(),
            false,
        )
    }

    #[test]
    fn test_popup_runs_full_cycle_monotonically() {
        let mut popup = PopUp::new(1.0, 6.0, 500.0);
        let mut b = body(1.0, 5.0);
        let mut last = popup.phase().ordinal();
        let mut seen = [false; 4];
        let mut ticks = 0;
        while !b.despawn_requested() {
            popup.update(&mut b, 16.0);
            let now = popup.phase().ordinal();
            assert!(now == last || now == last + 1, "{} -> {}", last, now);
            seen[now as usize] = true;
            last = now;
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert!(seen.iter().all(|s| *s));
        assert!((b.position.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_popup_rises_at_double_speed() {
        let mut popup = PopUp::new(0.0, 100.0, 0.0);
        let mut b = body(0.0, 5.0);
        popup.update(&mut b, 1000.0);
        assert!((b.position.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_complete_despawns_on_next_update() {
        let mut popup = PopUp::new(0.0, 1.0, 0.0);
        let mut b = body(0.0, 100.0);
        popup.update(&mut b, 100.0); // reach top
        popup.update(&mut b, 100.0); // pause done
        popup.update(&mut b, 100.0); // fall back to start
        assert_eq!(popup.phase(), PopUpPhase::Complete);
        assert!(!b.despawn_requested());
        popup.update(&mut b, 16.0);
        assert!(b.despawn_requested());
    }

    #[test]
    fn test_rising_shoots_to_final_height() {
        let mut rising = Rising::new(5.0, 30.0, 200.0);
        let mut b = body(0.0, 5.0);
        let mut last = rising.phase().ordinal();
        let mut max_y: f32 = 0.0;
        for _ in 0..2000 {
            if b.despawn_requested() {
                break;
            }
            rising.update(&mut b, 16.0);
            let now = rising.phase().ordinal();
            assert!(now == last || now == last + 1);
            last = now;
            max_y = max_y.max(b.position.y);
        }
        assert!(b.despawn_requested());
        assert!((max_y - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_rising_shoot_is_faster() {
        let mut rising = Rising::new(0.0, 1000.0, 0.0);
        let mut b = body(0.0, 2.0);
        rising.update(&mut b, 16.0); // hits first stop immediately
        rising.update(&mut b, 16.0); // zero pause elapses
        assert_eq!(rising.phase(), RisingPhase::Shooting);
        let before = b.position.y;
        rising.update(&mut b, 1000.0);
        assert!((b.position.y - before - 2.0 * RISING_SHOOT_MULTIPLIER).abs() < 1e-4);
    }
}
