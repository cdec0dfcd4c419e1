//! Deciding when every presented card has come back out.
//!
//! Cards and frames do not map one to one: a reader paced slower than the
//! idle threshold splits a card into several frames, and bits past capacity
//! never reach a frame at all. Completion is therefore measured in bits.

use std::time::{Duration, Instant};

/// Where the run stands once input may have ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainStatus {
    /// Input still open, or bits still in flight.
    Pending,

    /// Every presented bit was delivered or dropped by the capacity policy.
    Complete,

    /// Input ended and nothing arrived for the whole stall timeout.
    Stalled { presented: usize, settled: usize },
}

/// Bit accounting between the card feeder and the consumer.
#[derive(Debug)]
pub struct DrainTracker {
    presented_bits: Option<usize>,
    delivered_bits: usize,
    last_progress: Instant,
    stall_timeout: Duration,
}

impl DrainTracker {
    pub fn new(stall_timeout: Duration, now: Instant) -> Self {
        Self {
            presented_bits: None,
            delivered_bits: 0,
            last_progress: now,
            stall_timeout,
        }
    }

    /// Allowance for a stall: the base timeout plus one worst-case frame,
    /// every bit paced at `pulse_interval`, then the idle threshold and gap.
    pub fn stall_timeout(
        base: Duration,
        pulse_interval: Duration,
        capacity_bits: usize,
        frame_gap: Duration,
        idle_timeout: Duration,
    ) -> Duration {
        let bits = u32::try_from(capacity_bits).unwrap_or(u32::MAX);
        base.saturating_add(pulse_interval.saturating_mul(bits))
            .saturating_add(frame_gap)
            .saturating_add(idle_timeout)
    }

    /// The feeder is done; `bits` were queued in total.
    pub fn input_finished(&mut self, bits: usize, now: Instant) {
        self.presented_bits = Some(bits);
        self.last_progress = now;
    }

    /// A frame of `bits` bits was printed.
    pub fn frame_delivered(&mut self, bits: usize, now: Instant) {
        self.delivered_bits += bits;
        self.last_progress = now;
    }

    /// Status given the capture context's dropped-bit counter.
    pub fn status(&self, dropped_bits: u64, now: Instant) -> DrainStatus {
        let Some(presented) = self.presented_bits else {
            return DrainStatus::Pending;
        };

        let dropped = usize::try_from(dropped_bits).unwrap_or(usize::MAX);
        let settled = self.delivered_bits.saturating_add(dropped);
        if settled >= presented {
            DrainStatus::Complete
        } else if now.saturating_duration_since(self.last_progress) >= self.stall_timeout {
            DrainStatus::Stalled { presented, settled }
        } else {
            DrainStatus::Pending
        }
    }
}
