//! Shared helpers for capture integration tests.
//!
//! Every test drives a [`ManualClock`] so timing never depends on the host
//! scheduler.

#![allow(dead_code)]

use std::time::Duration;
use wiegand_capture::{EdgeSink, FrameReader, ManualClock, channel_with_clock};
use wiegand_core::CaptureSettings;

/// Gap between pulses inside a frame, well under the 4 ms default threshold.
pub const PULSE_GAP: Duration = Duration::from_millis(2);

/// Silence that always ends a frame under the default threshold.
pub const FRAME_GAP: Duration = Duration::from_millis(10);

pub type TestSink = EdgeSink<ManualClock>;
pub type TestReader = FrameReader<ManualClock>;

/// A capture context on a manual clock with the given settings.
pub fn context(settings: CaptureSettings) -> (TestSink, TestReader, ManualClock) {
    let clock = ManualClock::new();
    let (sink, reader) = channel_with_clock(settings, clock.clone()).unwrap();
    (sink, reader, clock)
}

/// A capture context with default settings.
pub fn default_context() -> (TestSink, TestReader, ManualClock) {
    context(CaptureSettings::default())
}

/// Pulse `bits` with [`PULSE_GAP`] between them.
pub fn send_bits(sink: &TestSink, clock: &ManualClock, bits: &[bool]) {
    for &bit in bits {
        sink.on_edge(bit.into());
        clock.advance(PULSE_GAP);
    }
}

/// Pulse `bits`, then stay silent for [`FRAME_GAP`].
pub fn send_frame(sink: &TestSink, clock: &ManualClock, bits: &[bool]) {
    send_bits(sink, clock, bits);
    clock.advance(FRAME_GAP);
}

/// The low `count` bits of `raw`, most significant first.
pub fn bits_of(raw: u64, count: usize) -> Vec<bool> {
    (0..count).rev().map(|i| (raw >> i) & 1 == 1).collect()
}
