//! Player presence tracking

use crate::consts::PLAYER_POLL_INTERVAL_MS;
use crate::sim::timer::{TimerId, Timers};

use super::TimerEvent;

/// Polls player count while waiting and spots the first player arriving
#[derive(Debug, Clone)]
pub struct PlayerTracker {
    required: usize,
    poll: Option<TimerId>,
    last_count: usize,
}

impl PlayerTracker {
    pub fn new(required: usize) -> Self {
        Self {
            required: required.max(1),
            poll: None,
            last_count: 0,
        }
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn has_enough(&self, count: usize) -> bool {
        count >= self.required
    }

    pub fn is_waiting(&self) -> bool {
        self.poll.is_some()
    }

    /// Begin polling. Returns false if already waiting.
    pub fn start_waiting(&mut self, timers: &mut Timers<TimerEvent>) -> bool {
        if self.poll.is_some() {
            return false;
        }
        self.poll = Some(timers.set_interval(PLAYER_POLL_INTERVAL_MS, TimerEvent::PlayerPoll));
        log::info!("Waiting for players ({} required)", self.required);
        true
    }

    /// Handle a poll tick. Returns true exactly once, when enough players
    /// have arrived; waiting stops at that point.
    pub fn poll(&mut self, timers: &mut Timers<TimerEvent>, count: usize) -> bool {
        if self.poll.is_none() || !self.has_enough(count) {
            return false;
        }
        self.stop_waiting(timers);
        log::info!("{} players present, done waiting", count);
        true
    }

    pub fn stop_waiting(&mut self, timers: &mut Timers<TimerEvent>) {
        timers.clear_slot(&mut self.poll);
    }

    /// Record the current count; true when the arena goes from empty to occupied
    pub fn observe_count(&mut self, count: usize) -> bool {
        let first_join = self.last_count == 0 && count > 0;
        self.last_count = count;
        first_join
    }

    pub fn cleanup(&mut self, timers: &mut Timers<TimerEvent>) {
        self.stop_waiting(timers);
    }
}
