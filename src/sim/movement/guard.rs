//! Stuck and ping-pong detection with time-boxed escape
//!
//! Reflect-at-boundary motion in a box with random directions tends to freeze
//! against walls or bounce in place. The guard watches a short window of
//! anchor positions and boundary contacts; when either pattern shows up it
//! hands back an escape direction that overrides normal motion for
//! `ESCAPE_DURATION_MS`.

use std::collections::VecDeque;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::{horizontal_perpendicular, planar_direction};

/// Why escape mode was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeReason {
    /// No progress over the position window
    Stuck,
    /// Too many boundary contacts in a short time
    PingPong,
}

/// Active escape override
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Escape {
    pub reason: EscapeReason,
    pub direction: Vec3,
    pub remaining_ms: f32,
}

#[derive(Debug, Clone)]
pub struct MotionGuard {
    history: VecDeque<Vec3>,
    stuck_checks: u32,
    boundary_hits: VecDeque<f32>,
    last_reversal_ms: Option<f32>,
    escape: Option<Escape>,
    escapes_started: u32,
    rng: Pcg32,
}

impl MotionGuard {
    pub fn new(seed: u64) -> Self {
        Self {
            history: VecDeque::with_capacity(POSITION_HISTORY_LEN),
            stuck_checks: 0,
            boundary_hits: VecDeque::new(),
            last_reversal_ms: None,
            escape: None,
            escapes_started: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Report a boundary contact at `now_ms` (behavior-local time) and ask
    /// whether the direction may flip. Every contact counts toward ping-pong
    /// detection; the flip itself is rate-limited.
    pub fn try_reverse(&mut self, now_ms: f32) -> bool {
        self.boundary_hits.push_back(now_ms);
        if let Some(last) = self.last_reversal_ms {
            if now_ms - last < REVERSAL_COOLDOWN_MS {
                return false;
            }
        }
        self.last_reversal_ms = Some(now_ms);
        true
    }

    /// Record the latest anchor position and report a stuck or ping-pong pattern.
    /// Nothing is reported while an escape is running.
    pub fn observe(&mut self, anchor: Vec3, now_ms: f32) -> Option<EscapeReason> {
        while self
            .boundary_hits
            .front()
            .is_some_and(|t| now_ms - *t > PING_PONG_WINDOW_MS)
        {
            self.boundary_hits.pop_front();
        }

        if self.escape.is_some() {
            return None;
        }

        if self.history.len() == POSITION_HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(anchor);

        if self.boundary_hits.len() >= PING_PONG_CONTACTS {
            self.reset_detection();
            return Some(EscapeReason::PingPong);
        }

        if self.history.len() == POSITION_HISTORY_LEN {
            if self.average_displacement() < STUCK_DISPLACEMENT_THRESHOLD {
                self.stuck_checks += 1;
            } else {
                self.stuck_checks = 0;
            }
            if self.stuck_checks >= STUCK_CHECKS_TO_ESCAPE {
                self.reset_detection();
                return Some(EscapeReason::Stuck);
            }
        }
        None
    }

    fn average_displacement(&self) -> f32 {
        let steps = self.history.len().saturating_sub(1);
        if steps == 0 {
            return f32::MAX;
        }
        let total: f32 = self
            .history
            .iter()
            .zip(self.history.iter().skip(1))
            .map(|(a, b)| a.distance(*b))
            .sum();
        total / steps as f32
    }

    fn reset_detection(&mut self) {
        self.history.clear();
        self.stuck_checks = 0;
        self.boundary_hits.clear();
    }

    /// Enter escape mode. Stuck picks a fresh random heading, ping-pong turns
    /// perpendicular to the current travel. Returns the escape direction.
    pub fn begin_escape(&mut self, reason: EscapeReason, travel: Vec3) -> Vec3 {
        let direction = match reason {
            EscapeReason::Stuck => planar_direction(self.random_angle()),
            EscapeReason::PingPong => {
                let perp = horizontal_perpendicular(travel);
                // Pick a side so repeated escapes don't always go the same way
                perp * self.random_sign()
            }
        };
        self.escape = Some(Escape {
            reason,
            direction,
            remaining_ms: ESCAPE_DURATION_MS,
        });
        self.escapes_started += 1;
        direction
    }

    /// Count down the active escape. Returns the escape that just finished, if any.
    pub fn tick_escape(&mut self, dt_ms: f32) -> Option<Escape> {
        let escape = self.escape.as_mut()?;
        escape.remaining_ms -= dt_ms;
        if escape.remaining_ms <= 0.0 {
            let done = *escape;
            self.escape = None;
            self.history.clear();
            self.stuck_checks = 0;
            Some(done)
        } else {
            None
        }
    }

    /// Swap in a new heading for the running escape
    pub fn redirect_escape(&mut self, direction: Vec3) {
        if let Some(escape) = self.escape.as_mut() {
            escape.direction = direction;
        }
    }

    /// Bounce the escape heading off the given axes
    pub fn reflect_escape(&mut self, axes: [bool; 3]) {
        if let Some(escape) = self.escape.as_mut() {
            for (i, hit) in axes.iter().enumerate() {
                if *hit {
                    escape.direction[i] = -escape.direction[i];
                }
            }
        }
    }

    pub fn escape(&self) -> Option<&Escape> {
        self.escape.as_ref()
    }

    #[inline]
    pub fn is_escaping(&self) -> bool {
        self.escape.is_some()
    }

    /// Total escapes entered since construction
    pub fn escapes_started(&self) -> u32 {
        self.escapes_started
    }

    /// +1 or -1 with equal odds
    pub fn random_sign(&mut self) -> f32 {
        if self.rng.random_bool(0.5) { 1.0 } else { -1.0 }
    }

    /// Uniform angle in [0, 2π)
    pub fn random_angle(&mut self) -> f32 {
        self.rng.random_range(0.0..std::f32::consts::TAU)
    }
}

/// Speed used while escaping
#[inline]
pub fn escape_speed(move_speed: f32) -> f32 {
    move_speed.max(ESCAPE_MIN_SPEED) * ESCAPE_SPEED_MULTIPLIER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stuck_triggers_once_per_episode() {
        let mut guard = MotionGuard::new(1);
        let p = Vec3::new(1.0, 2.0, 3.0);
        let mut triggers = Vec::new();
        for tick in 0..(POSITION_HISTORY_LEN + STUCK_CHECKS_TO_ESCAPE as usize + 20) {
            let now = tick as f32 * 16.0;
            if let Some(reason) = guard.observe(p, now) {
                triggers.push((tick, reason));
                guard.begin_escape(reason, Vec3::X);
            }
        }
        // First check happens once the window is full; fifth consecutive check escapes
        assert_eq!(
            triggers,
            vec![(
                POSITION_HISTORY_LEN - 1 + STUCK_CHECKS_TO_ESCAPE as usize - 1,
                EscapeReason::Stuck
            )]
        );
        assert!(guard.is_escaping());
        assert_eq!(guard.escapes_started(), 1);
    }

    #[test]
    fn test_escape_self_terminates() {
        let mut guard = MotionGuard::new(2);
        let dir = guard.begin_escape(EscapeReason::Stuck, Vec3::X);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(guard.tick_escape(ESCAPE_DURATION_MS - 1.0).is_none());
        assert!(guard.is_escaping());
        let done = guard.tick_escape(1.0);
        assert!(done.is_some());
        assert!(!guard.is_escaping());
    }

    #[test]
    fn test_moving_anchor_is_not_stuck() {
        let mut guard = MotionGuard::new(3);
        for tick in 0..200 {
            let p = Vec3::new(tick as f32 * 0.05, 0.0, 0.0);
            assert!(guard.observe(p, tick as f32 * 16.0).is_none());
        }
    }

    #[test]
    fn test_reversal_rate_limit() {
        let mut guard = MotionGuard::new(4);
        assert!(guard.try_reverse(0.0));
        assert!(!guard.try_reverse(REVERSAL_COOLDOWN_MS - 1.0));
        assert!(guard.try_reverse(REVERSAL_COOLDOWN_MS));
    }

    #[test]
    fn test_ping_pong_escapes_perpendicular() {
        let mut guard = MotionGuard::new(5);
        // Boundary contacts count even when the flip itself is rate-limited
        assert!(guard.try_reverse(0.0));
        assert!(!guard.try_reverse(400.0));
        assert!(guard.observe(Vec3::ZERO, 400.0).is_none());
        assert!(guard.try_reverse(900.0));
        let reason = guard.observe(Vec3::X, 900.0);
        assert_eq!(reason, Some(EscapeReason::PingPong));
        let dir = guard.begin_escape(EscapeReason::PingPong, Vec3::X);
        assert!(dir.dot(Vec3::X).abs() < 1e-5);
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_old_boundary_hits_expire() {
        let mut guard = MotionGuard::new(6);
        guard.try_reverse(0.0);
        guard.try_reverse(1000.0);
        guard.try_reverse(2000.0);
        // At 2000 ms the 0 ms contact is outside the 1500 ms window
        assert!(guard.observe(Vec3::ZERO, 2000.0).is_none());
    }

    #[test]
    fn test_escape_speed_floor() {
        assert!(escape_speed(0.0) > 0.0);
        assert!((escape_speed(4.0) - 4.0 * ESCAPE_SPEED_MULTIPLIER).abs() < 1e-6);
    }
}
