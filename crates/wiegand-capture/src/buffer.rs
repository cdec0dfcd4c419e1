//! Fixed-capacity bit accumulator.
//!
//! `FrameBuffer` is plain data with no synchronization of its own. The
//! capture context wraps it in a lock; this module only knows how to append
//! a bit, measure silence, and hand out a snapshot.

use bytes::Bytes;
use std::time::Duration;
use wiegand_core::{ByteRounding, Frame};

/// Accumulated bits of the frame in progress.
///
/// Storage is allocated once at construction; appending never allocates.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    /// Packed bits, `capacity` bytes.
    data: Box<[u8]>,

    /// Bits accepted since the last reset.
    bit_count: usize,

    /// Edges ignored since the last reset because the buffer was full.
    dropped: usize,

    /// Clock reading of the most recent edge, `None` after a reset.
    last_activity: Option<Duration>,
}

impl FrameBuffer {
    /// Create an empty buffer holding `capacity_bytes * 8` bits.
    #[must_use]
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            data: vec![0u8; capacity_bytes].into_boxed_slice(),
            bit_count: 0,
            dropped: 0,
            last_activity: None,
        }
    }

    #[must_use]
    pub fn capacity_bits(&self) -> usize {
        self.data.len() * 8
    }

    #[must_use]
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Edges dropped by the capacity limit since the last reset.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bit_count == 0
    }

    #[must_use]
    pub fn last_activity(&self) -> Option<Duration> {
        self.last_activity
    }

    /// Append one bit observed at `now`.
    ///
    /// The target byte is shifted left and the new bit lands in its low
    /// position. Once the buffer is full the bit is dropped, but the
    /// activity timestamp still moves so a noisy tail keeps the frame open.
    ///
    /// Returns `false` when the bit was dropped.
    #[inline]
    pub fn push(&mut self, bit: bool, now: Duration) -> bool {
        let accepted = match self.data.get_mut(self.bit_count / 8) {
            Some(byte) => {
                *byte = (*byte << 1) | u8::from(bit);
                self.bit_count += 1;
                true
            }
            None => {
                self.dropped += 1;
                false
            }
        };
        self.last_activity = Some(now);
        accepted
    }

    /// Silence since the last edge, or `None` if no edge arrived since reset.
    #[must_use]
    pub fn idle_for(&self, now: Duration) -> Option<Duration> {
        self.last_activity.map(|at| now.saturating_sub(at))
    }

    /// Copy out the current frame.
    ///
    /// Copies `min(rounding.byte_count(bit_count), max_bytes)` bytes. A byte
    /// requested past the end of storage (legacy rounding on a full buffer)
    /// is emitted as zero.
    #[must_use]
    pub fn snapshot(&self, max_bytes: usize, rounding: ByteRounding) -> Frame {
        let wanted = rounding.byte_count(self.bit_count).min(max_bytes);
        let stored = wanted.min(self.data.len());

        let mut out = Vec::with_capacity(wanted);
        out.extend_from_slice(&self.data[..stored]);
        out.resize(wanted, 0);

        Frame::new(self.bit_count, Bytes::from(out))
    }

    /// Zero every byte, the bit count, the drop count and the timestamp.
    pub fn reset(&mut self) {
        self.data.fill(0);
        self.bit_count = 0;
        self.dropped = 0;
        self.last_activity = None;
    }
}
