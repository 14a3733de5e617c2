//! Cooperative wake-up scheduler.
//!
//! Following the Enqueue → Tick → Completions pattern: tasks suspend by
//! scheduling a payload after a delay, the host advances the clock once per
//! frame, and due payloads are drained one at a time.
//!
//! A wake-up scheduled while a tick is being drained never fires in that same
//! tick, even with a zero delay. Every suspension therefore lasts at least one
//! frame, which keeps a tick finite regardless of the configured delays.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// A payload waiting for its deadline.
struct Pending<T> {
  at: Duration,
  seq: u64,
  payload: T,
}

impl<T> PartialEq for Pending<T> {
  fn eq(&self, other: &Self) -> bool {
    self.at == other.at && self.seq == other.seq
  }
}

impl<T> Eq for Pending<T> {}

impl<T> PartialOrd for Pending<T> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<T> Ord for Pending<T> {
  // Reversed so the max-heap pops the earliest deadline, FIFO on ties.
  fn cmp(&self, other: &Self) -> Ordering {
    other
      .at
      .cmp(&self.at)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

/// Single-threaded timer queue driven by frame ticks.
pub struct Scheduler<T> {
  /// Simulated time since creation.
  now: Duration,
  /// Sequence number handed to the next scheduled payload.
  next_seq: u64,
  /// Payloads with `seq >= horizon` were scheduled during the current tick.
  horizon: u64,
  queue: BinaryHeap<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Scheduler<T> {
  pub fn new() -> Self {
    Self {
      now: Duration::ZERO,
      next_seq: 0,
      horizon: 0,
      queue: BinaryHeap::new(),
    }
  }

  /// Resume `payload` once `delay` has elapsed, no earlier than next tick.
  pub fn schedule_after(&mut self, delay: Duration, payload: T) {
    let seq = self.next_seq;
    self.next_seq += 1;
    self.queue.push(Pending {
      at: self.now + delay,
      seq,
      payload,
    });
  }

  /// Start a new tick: move the clock forward by `dt`.
  pub fn advance(&mut self, dt: Duration) {
    self.now += dt;
    self.horizon = self.next_seq;
  }

  /// Pop the next payload that is due in the current tick.
  pub fn pop_due(&mut self) -> Option<T> {
    let top = self.queue.peek()?;
    // Anything scheduled this tick has a deadline >= now, so it sorts after
    // every older due entry; stopping here cannot starve an older one.
    if top.at > self.now || top.seq >= self.horizon {
      return None;
    }
    self.queue.pop().map(|pending| pending.payload)
  }

  /// Drop every pending payload.
  pub fn clear(&mut self) {
    self.queue.clear();
  }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
