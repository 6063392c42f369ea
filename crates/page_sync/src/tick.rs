use std::collections::VecDeque;
use std::mem::take;

/// Continuations deferred to the next scheduler tick.
///
/// [`TickQueue::drain`] hands out only what was queued before it was called;
/// anything deferred while those tasks run waits for the following tick.
#[derive(Debug)]
pub struct TickQueue<T> {
    pending: VecDeque<T>,
    ticks: u64,
}

impl<T> TickQueue<T> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            ticks: 0,
        }
    }

    #[inline]
    pub fn defer(&mut self, task: T) {
        self.pending.push_back(task);
    }

    /// Take the tasks due on this tick, oldest first.
    pub fn drain(&mut self) -> VecDeque<T> {
        self.ticks = self.ticks.saturating_add(1);
        take(&mut self.pending)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of ticks drained so far.
    #[inline]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl<T> Default for TickQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
