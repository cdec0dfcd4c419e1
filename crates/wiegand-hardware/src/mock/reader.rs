//! Mock Wiegand reader for testing and development.
//!
//! This module provides a simulated reader that pulses DATA0/DATA1 into a
//! capture context. Edges are replayed from a dedicated OS thread, the
//! stand-in for interrupt context, so the capture sees producer and consumer
//! on different threads exactly as it would on real hardware.

use crate::{
    HardwareError, Result,
    traits::EdgeSource,
    types::SourceInfo,
};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use wiegand_capture::{Clock, EdgeSink};
use wiegand_decoder::WiegandFormat;

/// Queue depth for presented frames.
const COMMAND_CAPACITY: usize = 32;

/// Silence after each replayed frame, well past the default idle threshold.
pub const DEFAULT_FRAME_GAP: Duration = Duration::from_millis(20);

/// Mock Wiegand reader.
///
/// Created together with a [`MockReaderHandle`]. Once attached to an
/// [`EdgeSink`], every bit sequence presented through the handle is
/// replayed as falling edges.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wiegand_capture::channel;
/// use wiegand_core::CaptureSettings;
/// use wiegand_decoder::WiegandFormat;
/// use wiegand_hardware::EdgeSource;
/// use wiegand_hardware::mock::MockWiegandReader;
///
/// #[tokio::main]
/// async fn main() -> wiegand_hardware::Result<()> {
///     let (sink, mut reader) = channel(CaptureSettings::default())?;
///     let (mut mock, handle) = MockWiegandReader::new();
///     mock.attach(sink)?;
///
///     handle.present_card(&WiegandFormat::standard_26(), 44, 34101).await?;
///
///     let frame = loop {
///         tokio::time::sleep(Duration::from_millis(5)).await;
///         if let Some(frame) = reader.next_frame() {
///             break frame;
///         }
///     };
///     assert_eq!(frame.bit_count(), 26);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockWiegandReader {
    /// Receiver for presented frames; taken by the replay thread on attach.
    command_rx: Option<mpsc::Receiver<Vec<bool>>>,

    /// Device name
    name: String,

    /// Pause after each pulse; zero replays a frame as one burst.
    pulse_interval: Duration,

    /// Silence after each frame so queued frames stay separate.
    frame_gap: Duration,
}

impl MockWiegandReader {
    /// Create a new mock reader with the default name.
    pub fn new() -> (Self, MockReaderHandle) {
        Self::with_name("Mock Wiegand Reader")
    }

    /// Create a new mock reader with a custom name.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_hardware::EdgeSource;
    /// use wiegand_hardware::mock::MockWiegandReader;
    ///
    /// let (reader, _handle) = MockWiegandReader::with_name("Door 1");
    /// assert_eq!(reader.info().name, "Door 1");
    /// ```
    pub fn with_name(name: impl Into<String>) -> (Self, MockReaderHandle) {
        let name = name.into();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);

        let reader = Self {
            command_rx: Some(command_rx),
            name: name.clone(),
            pulse_interval: Duration::ZERO,
            frame_gap: DEFAULT_FRAME_GAP,
        };
        let handle = MockReaderHandle { command_tx, name };

        (reader, handle)
    }

    /// Pause between pulses when replaying.
    ///
    /// Real readers pulse every 1-2 ms. Anything at or above the capture's
    /// idle threshold splits each frame into single bits.
    #[must_use]
    pub fn with_pulse_interval(mut self, interval: Duration) -> Self {
        self.pulse_interval = interval;
        self
    }

    /// Silence held after each frame before the next queued one starts.
    #[must_use]
    pub fn with_frame_gap(mut self, gap: Duration) -> Self {
        self.frame_gap = gap;
        self
    }

    /// Configured pause between pulses.
    pub fn pulse_interval(&self) -> Duration {
        self.pulse_interval
    }

    pub fn frame_gap(&self) -> Duration {
        self.frame_gap
    }

    /// Returns `true` once the replay thread owns the command queue.
    pub fn is_attached(&self) -> bool {
        self.command_rx.is_none()
    }
}

impl EdgeSource for MockWiegandReader {
    fn attach<C: Clock>(&mut self, sink: EdgeSink<C>) -> Result<()> {
        let mut command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| HardwareError::already_attached(&self.name))?;
        let interval = self.pulse_interval;
        let frame_gap = self.frame_gap;

        thread::Builder::new()
            .name("wiegand-mock-edges".into())
            .spawn(move || {
                // ends when every handle has been dropped
                while let Some(bits) = command_rx.blocking_recv() {
                    for bit in bits {
                        sink.on_edge(bit.into());
                        if !interval.is_zero() {
                            thread::sleep(interval);
                        }
                    }
                    thread::sleep(frame_gap);
                }
            })
            .map_err(|e| HardwareError::initialization_failed(e.to_string()))?;

        debug!(reader = %self.name, ?interval, "Mock reader attached");
        Ok(())
    }

    fn info(&self) -> SourceInfo {
        SourceInfo::new(self.name.clone(), "Simulated")
    }
}

/// Handle for controlling a mock Wiegand reader.
///
/// Cheap to clone; all clones feed the same reader. Dropping every handle
/// stops the replay thread.
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    /// Channel sender for presented frames
    command_tx: mpsc::Sender<Vec<bool>>,

    /// Device name
    name: String,
}

impl MockReaderHandle {
    /// Queue a raw bit sequence, first bit first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The sequence is empty
    /// - The reader has been dropped without being attached
    pub async fn present_bits(&self, bits: impl Into<Vec<bool>>) -> Result<()> {
        let bits = bits.into();
        if bits.is_empty() {
            return Err(HardwareError::invalid_data("cannot present an empty frame"));
        }
        self.command_tx
            .send(bits)
            .await
            .map_err(|_| HardwareError::disconnected(&self.name))
    }

    /// Queue a bit string such as `"0110"`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InvalidData`] for characters other than `0`
    /// and `1`, otherwise as [`present_bits`](Self::present_bits).
    pub async fn present_bit_string(&self, bits: &str) -> Result<()> {
        self.present_bits(parse_bit_string(bits)?).await
    }

    /// Queue a card in `format`, with parity bits set.
    ///
    /// # Errors
    ///
    /// As [`present_bits`](Self::present_bits).
    pub async fn present_card(&self, format: &WiegandFormat, facility: u32, card: u32) -> Result<()> {
        debug!(format = format.name(), facility, card, "Presenting card");
        self.present_bits(format.encode(facility, card)).await
    }

    /// Returns `true` once the reader and its replay thread are gone.
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }
}

/// Parse a string of `0` and `1` characters.
///
/// # Errors
///
/// Returns [`HardwareError::InvalidData`] on any other character.
///
/// # Examples
///
/// ```
/// use wiegand_hardware::mock::parse_bit_string;
///
/// assert_eq!(parse_bit_string("101").unwrap(), vec![true, false, true]);
/// assert!(parse_bit_string("10x").is_err());
/// ```
pub fn parse_bit_string(bits: &str) -> Result<Vec<bool>> {
    bits.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(HardwareError::invalid_data(format!(
                "bit string contains {other:?}"
            ))),
        })
        .collect()
}
