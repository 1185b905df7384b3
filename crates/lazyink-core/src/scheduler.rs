//! Deferred task queue driven by the host's frame clock.
//!
//! Nothing here reads a clock: the owner passes the current time into
//! [`Scheduler::advance`] once per frame and receives the tasks that became
//! due, in due order (ties in scheduling order).

use std::time::Duration;

#[derive(Debug, Clone)]
struct Entry<T> {
    seq: u64,
    due: Duration,
    task: T,
}

/// Cancellable set of deferred tasks.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    entries: Vec<Entry<T>>,
    closed: bool,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            entries: Vec::new(),
            closed: false,
        }
    }

    /// Run `task` once `delay` has elapsed from now.
    /// Returns false after [`close`](Self::close).
    pub fn schedule(&mut self, delay: Duration, task: T) -> bool {
        if self.closed {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            seq,
            due: self.now + delay,
            task,
        });
        true
    }

    /// Drop every pending task, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Move the clock to `now` and return the tasks that are due.
    /// Time never moves backward.
    pub fn advance(&mut self, now: Duration) -> Vec<T> {
        if now > self.now {
            self.now = now;
        }
        let current = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|e| e.due <= current);
        self.entries = pending;

        due.sort_by_key(|e| (e.due, e.seq));
        due.into_iter().map(|e| e.task).collect()
    }

    /// Number of pending tasks.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is pending.
    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything and refuse new tasks.
    pub fn close(&mut self) {
        self.entries.clear();
        self.closed = true;
    }
}
