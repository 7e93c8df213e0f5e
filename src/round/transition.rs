//! Cooldown between rounds

use crate::sim::timer::{TimerId, Timers};

use super::TimerEvent;

/// Single-flight transition timer
#[derive(Debug, Clone)]
pub struct RoundTransition {
    duration_ms: u64,
    timer: Option<TimerId>,
    started_at_ms: u64,
}

impl RoundTransition {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            timer: None,
            started_at_ms: 0,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_in_transition(&self) -> bool {
        self.timer.is_some()
    }

    /// Returns false (and does nothing) if a transition is already running
    pub fn start(&mut self, timers: &mut Timers<TimerEvent>) -> bool {
        if self.timer.is_some() {
            return false;
        }
        self.started_at_ms = timers.now_ms();
        self.timer = Some(timers.set_timeout(self.duration_ms, TimerEvent::TransitionEnd));
        true
    }

    /// Called when `id` fires. True if it was the live transition, which is now over.
    pub fn complete(&mut self, id: TimerId) -> bool {
        if self.timer != Some(id) {
            return false;
        }
        self.timer = None;
        true
    }

    /// Abort without completing
    pub fn cancel(&mut self, timers: &mut Timers<TimerEvent>) {
        timers.clear_slot(&mut self.timer);
    }

    pub fn cleanup(&mut self, timers: &mut Timers<TimerEvent>) {
        self.cancel(timers);
    }

    /// Clock time left, zero when not transitioning
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        if self.timer.is_none() {
            return 0;
        }
        (self.started_at_ms + self.duration_ms).saturating_sub(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let mut timers = Timers::new();
        let mut transition = RoundTransition::new(5000);
        assert!(transition.start(&mut timers));
        assert!(!transition.start(&mut timers));
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_completes_after_duration() {
        let mut timers = Timers::new();
        let mut transition = RoundTransition::new(5000);
        transition.start(&mut timers);
        assert!(timers.pop_due(4999).is_none());
        let (id, event) = timers.pop_due(5000).unwrap();
        assert_eq!(event, TimerEvent::TransitionEnd);
        assert!(transition.complete(id));
        assert!(!transition.is_in_transition());
        assert!(!transition.complete(id));
    }

    #[test]
    fn test_remaining_time_uses_clock() {
        let mut timers: Timers<TimerEvent> = Timers::new();
        timers.advance_to(1000);
        let mut transition = RoundTransition::new(5000);
        assert_eq!(transition.remaining_ms(timers.now_ms()), 0);
        transition.start(&mut timers);
        assert_eq!(transition.remaining_ms(1000), 5000);
        assert_eq!(transition.remaining_ms(3500), 2500);
        assert_eq!(transition.remaining_ms(9000), 0);
    }

    #[test]
    fn test_cancel_never_fires() {
        let mut timers = Timers::new();
        let mut transition = RoundTransition::new(100);
        transition.start(&mut timers);
        transition.cancel(&mut timers);
        assert!(!transition.is_in_transition());
        assert!(timers.pop_due(1000).is_none());
    }
}
