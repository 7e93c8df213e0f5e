//! Deterministic timer scheduler
//!
//! Stands in for host `setTimeout`/`setInterval`. Timers fire in due order
//! (ties broken by creation order) while the clock is advanced; each fired
//! timer moves `now_ms` to its due time so handlers observe a consistent clock.

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<E> {
    id: TimerId,
    due_ms: u64,
    period_ms: Option<u64>,
    event: E,
}

/// Millisecond clock plus pending timers carrying event payloads of type `E`
#[derive(Debug, Clone)]
pub struct Timers<E> {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E: Copy> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy> Timers<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Current clock value
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn alloc_id(&mut self) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fire `event` once after `delay_ms`
    pub fn set_timeout(&mut self, delay_ms: u64, event: E) -> TimerId {
        let id = self.alloc_id();
        self.pending.push(Pending {
            id,
            due_ms: self.now_ms + delay_ms,
            period_ms: None,
            event,
        });
        id
    }

    /// Fire `event` every `period_ms` (minimum 1 ms) until cleared
    pub fn set_interval(&mut self, period_ms: u64, event: E) -> TimerId {
        let period = period_ms.max(1);
        let id = self.alloc_id();
        self.pending.push(Pending {
            id,
            due_ms: self.now_ms + period,
            period_ms: Some(period),
            event,
        });
        id
    }

    /// Cancel a timer; returns false if it already fired or was cleared
    pub fn clear(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Cancel the timer held in `slot` (if any) and empty the slot
    pub fn clear_slot(&mut self, slot: &mut Option<TimerId>) {
        if let Some(id) = slot.take() {
            self.clear(id);
        }
    }

    /// Number of scheduled timers
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its due time. Intervals are rescheduled; timeouts are removed.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, E)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= until_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.id))
            .map(|(i, _)| i)?;

        let due = self.pending[idx].due_ms;
        self.now_ms = self.now_ms.max(due);

        let (id, event) = (self.pending[idx].id, self.pending[idx].event);
        match self.pending[idx].period_ms {
            Some(period) => self.pending[idx].due_ms = due + period,
            None => {
                self.pending.swap_remove(idx);
            }
        }
        Some((id, event))
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
