//! Bounded FIFO of recent outcome events.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::event::VoiceOutcomeEvent;

/// Default number of events retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Ring of the most recent events; the oldest is evicted when full.
#[derive(Debug)]
pub struct OutcomeHistory {
    events: Mutex<VecDeque<VoiceOutcomeEvent>>,
    capacity: usize,
}

impl OutcomeHistory {
    /// History holding at most `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append `event`, returning the evicted oldest event if the ring was full.
    pub fn push(&self, event: VoiceOutcomeEvent) -> Option<VoiceOutcomeEvent> {
        let mut events = self.events.lock();
        let evicted = if events.len() >= self.capacity {
            events.pop_front()
        } else {
            None
        };
        events.push_back(event);
        evicted
    }

    /// Retained events, oldest first.
    pub fn snapshot(&self) -> Vec<VoiceOutcomeEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Maximum number of retained events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for OutcomeHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
