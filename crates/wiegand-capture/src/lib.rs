//! Bit capture and frame assembly for the Wiegand wire protocol.
//!
//! Wiegand has no frame delimiter: a reader pulses DATA0 for each `0` bit
//! and DATA1 for each `1` bit, then falls silent. This crate turns that
//! asynchronous stream of edges into discrete frames.
//!
//! # Components
//!
//! - [`EdgeSink`]: producer, called once per falling edge. Appends one bit
//!   and stamps the activity time. Bounded, allocation-free.
//! - [`FrameBuffer`]: the packed bits, bit count and activity timestamp.
//! - [`FrameReader`]: consumer. Reports a pending frame once the bus has
//!   been idle longer than the threshold, then takes it and resets the
//!   buffer atomically.
//! - [`Clock`]: monotonic time source, swappable for [`ManualClock`] in tests.
//!
//! # Policies
//!
//! - Capacity: bits past `8 * max_frame_bytes` are dropped silently. The
//!   activity timestamp still moves so the frame is not cut mid-burst.
//! - No frame ready: an empty [`Frame`](wiegand_core::Frame), not an error.
//! - Byte count: `bits / 8 + 1` by default; see
//!   [`ByteRounding`](wiegand_core::ByteRounding).

pub mod buffer;
pub mod capture;
pub mod clock;

pub use buffer::FrameBuffer;
pub use capture::{
    CaptureState, CaptureStats, EdgeSink, FrameReader, channel, channel_with_clock,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
