//! Producer/consumer handoff between edge handlers and the frame reader.
//!
//! # Architecture
//!
//! ```text
//! DATA0 edge ──┐                                   ┌──> pending_bit_count()
//!              ├──> EdgeSink ──> [ FrameBuffer ] ──┤
//! DATA1 edge ──┘   (producer)      (one lock)      └──> take_frame() / reset()
//!                                                        FrameReader (consumer)
//! ```
//!
//! A capture context is an owned value created by [`channel`]. It hands out
//! one cloneable [`EdgeSink`] for the edge handlers and exactly one
//! [`FrameReader`] for the consumer. Several independent contexts can live
//! side by side.
//!
//! # Synchronization
//!
//! Buffer, bit count, activity timestamp and counters sit behind a single
//! mutex. Every critical section is a few loads and stores: an append on the
//! producer side, a check or a snapshot-and-reset on the consumer side. No
//! lock is held across I/O, an await point, or a log call. The clock is read
//! inside the lock, so timestamps are ordered with the operations that
//! record them.
//!
//! `take_frame` evaluates the idle threshold, copies the bits and resets the
//! buffer in one critical section. An edge that arrives while it runs is
//! appended either before (and belongs to the delivered frame) or after (and
//! starts the next frame). It can never be delivered twice or vanish.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use wiegand_capture::{ManualClock, channel_with_clock};
//! use wiegand_core::CaptureSettings;
//!
//! let clock = ManualClock::new();
//! let (sink, mut reader) = channel_with_clock(CaptureSettings::default(), clock.clone())?;
//!
//! for bit in [true, false, true, true] {
//!     sink.on_edge(bit.into());
//!     clock.advance(Duration::from_millis(2));
//! }
//! assert_eq!(reader.pending_bit_count(), 0); // 2 ms of silence so far
//!
//! clock.advance(Duration::from_millis(3));
//! let frame = reader.take_frame(32);
//! assert_eq!(frame.bit_count(), 4);
//! assert_eq!(frame.raw_value(), 0b1011);
//!
//! assert!(reader.take_frame(32).is_empty());
//! # Ok::<(), wiegand_core::Error>(())
//! ```

use crate::buffer::FrameBuffer;
use crate::clock::{Clock, MonotonicClock};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, trace, warn};
use wiegand_core::{CaptureSettings, DataLine, Frame, Result};

/// Observable state of a capture context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No edge since creation or the last reset.
    Idle,

    /// Bits are arriving; the idle threshold has not elapsed yet.
    Receiving { bits: usize },

    /// The idle threshold has elapsed; a frame is waiting to be taken.
    Ready { bits: usize },
}

/// Lifetime counters of a capture context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Edges seen on either line.
    pub edges: u64,

    /// Edges ignored because the frame was already at capacity.
    pub dropped_bits: u64,

    /// Frames handed to the consumer.
    pub frames_delivered: u64,

    /// In-progress frames discarded by an explicit reset.
    pub frames_discarded: u64,
}

#[derive(Debug)]
struct Inner {
    buffer: FrameBuffer,
    stats: CaptureStats,
}

impl Inner {
    fn state(&self, now: Duration, idle_timeout: Duration) -> CaptureState {
        match self.buffer.idle_for(now) {
            None => CaptureState::Idle,
            Some(_) if self.buffer.is_empty() => CaptureState::Idle,
            Some(idle) if idle > idle_timeout => CaptureState::Ready {
                bits: self.buffer.bit_count(),
            },
            Some(_) => CaptureState::Receiving {
                bits: self.buffer.bit_count(),
            },
        }
    }
}

#[derive(Debug)]
struct Shared<C> {
    inner: Mutex<Inner>,
    clock: C,
    settings: CaptureSettings,
}

impl<C> Shared<C> {
    /// Lock the capture state.
    ///
    /// The guarded data is plain integers and bytes, always consistent
    /// between statements, so a poisoned lock is recovered.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create a capture context on the system monotonic clock.
///
/// Returns the producer half for the edge handlers and the consumer half
/// for the poll loop.
///
/// # Errors
///
/// Returns `Error::Config` if `settings` do not validate.
pub fn channel(settings: CaptureSettings) -> Result<(EdgeSink, FrameReader)> {
    channel_with_clock(settings, MonotonicClock::new())
}

/// Create a capture context on a caller-supplied clock.
///
/// Settings are checked here, so a bad timeout or capacity fails at
/// startup rather than showing up as split or empty frames.
///
/// # Errors
///
/// Returns `Error::Config` if `settings` do not validate.
pub fn channel_with_clock<C: Clock>(
    settings: CaptureSettings,
    clock: C,
) -> Result<(EdgeSink<C>, FrameReader<C>)> {
    settings.validate()?;

    let shared = Arc::new(Shared {
        inner: Mutex::new(Inner {
            buffer: FrameBuffer::new(settings.max_frame_bytes),
            stats: CaptureStats::default(),
        }),
        clock,
        settings,
    });

    let sink = EdgeSink {
        shared: Arc::clone(&shared),
    };
    let reader = FrameReader { shared };

    Ok((sink, reader))
}

/// Producer half: one entry point per data line.
///
/// Cheap to clone; every clone feeds the same frame. Calls are bounded in
/// time, never allocate and never log, so they are safe to run from a GPIO
/// interrupt thread.
#[derive(Debug)]
pub struct EdgeSink<C = MonotonicClock> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for EdgeSink<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Clock> EdgeSink<C> {
    /// Record a falling edge on `line`.
    #[inline]
    pub fn on_edge(&self, line: DataLine) {
        let mut inner = self.shared.lock();
        let now = self.shared.clock.now();

        inner.stats.edges += 1;
        if !inner.buffer.push(line.is_one(), now) {
            inner.stats.dropped_bits += 1;
        }
    }

    /// Falling edge on DATA0 (a `0` bit).
    #[inline]
    pub fn data0_pulse(&self) {
        self.on_edge(DataLine::Data0);
    }

    /// Falling edge on DATA1 (a `1` bit).
    #[inline]
    pub fn data1_pulse(&self) {
        self.on_edge(DataLine::Data1);
    }
}

/// Consumer half: polls for, takes and discards frames.
///
/// There is exactly one reader per context; it is not `Clone`.
#[derive(Debug)]
pub struct FrameReader<C = MonotonicClock> {
    shared: Arc<Shared<C>>,
}

impl<C: Clock> FrameReader<C> {
    /// Settings this context was created with.
    #[must_use]
    pub fn settings(&self) -> &CaptureSettings {
        &self.shared.settings
    }

    /// Bits waiting, if the idle threshold has elapsed since the last edge.
    ///
    /// Returns 0 while a frame is still arriving and when nothing was
    /// captured. Use [`state`](Self::state) to tell those apart.
    #[must_use]
    pub fn pending_bit_count(&self) -> usize {
        match self.state() {
            CaptureState::Ready { bits } => bits,
            CaptureState::Idle | CaptureState::Receiving { .. } => 0,
        }
    }

    /// Current state of the frame in progress.
    #[must_use]
    pub fn state(&self) -> CaptureState {
        let inner = self.shared.lock();
        let now = self.shared.clock.now();
        inner.state(now, self.shared.settings.idle_timeout())
    }

    /// Take the completed frame, if any.
    ///
    /// When the idle threshold has elapsed, copies up to `max_bytes` bytes
    /// of the frame and resets the buffer, all in one critical section.
    /// Otherwise returns [`Frame::empty`]. A frame is delivered exactly once.
    pub fn take_frame(&mut self, max_bytes: usize) -> Frame {
        let (frame, dropped) = {
            let mut inner = self.shared.lock();
            let now = self.shared.clock.now();

            if !matches!(
                inner.state(now, self.shared.settings.idle_timeout()),
                CaptureState::Ready { .. }
            ) {
                return Frame::empty();
            }

            let frame = inner
                .buffer
                .snapshot(max_bytes, self.shared.settings.byte_rounding);
            let dropped = inner.buffer.dropped();
            inner.buffer.reset();
            inner.stats.frames_delivered += 1;
            (frame, dropped)
        };

        if dropped > 0 {
            warn!(
                bits = frame.bit_count(),
                dropped, "Frame exceeded capture capacity, trailing bits dropped"
            );
        }
        debug!(
            bits = frame.bit_count(),
            bytes = frame.byte_len(),
            "Frame captured"
        );
        trace!(data = %frame.to_hex(), "Frame bytes");

        frame
    }

    /// Take the completed frame with room for every stored byte.
    ///
    /// Returns `None` when no frame is ready.
    pub fn next_frame(&mut self) -> Option<Frame> {
        let frame = self.take_frame(usize::MAX);
        (!frame.is_empty()).then_some(frame)
    }

    /// Discard any frame in progress, complete or not.
    pub fn reset(&mut self) {
        let discarded = {
            let mut inner = self.shared.lock();
            let bits = inner.buffer.bit_count();
            inner.buffer.reset();
            if bits > 0 {
                inner.stats.frames_discarded += 1;
            }
            bits
        };

        if discarded > 0 {
            debug!(bits = discarded, "Capture reset, partial frame discarded");
        }
    }

    /// Snapshot of the lifetime counters.
    #[must_use]
    pub fn stats(&self) -> CaptureStats {
        self.shared.lock().stats
    }
}
