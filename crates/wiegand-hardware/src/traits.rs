//! Edge source trait.
//!
//! An edge source is the platform layer that owns the two Wiegand data lines:
//! a GPIO driver on real hardware, a replay thread in tests. It turns falling
//! edges into [`EdgeSink`] calls and nothing else. Framing, timing and
//! decoding all happen downstream.

use crate::error::Result;
use crate::types::SourceInfo;
use wiegand_capture::{Clock, EdgeSink};

/// A producer of Wiegand falling edges.
///
/// Implementations call [`EdgeSink::data0_pulse`] or
/// [`EdgeSink::data1_pulse`] once per falling edge, from whatever context the
/// platform delivers edges in (interrupt handler, polling thread). The sink
/// is cheap, bounded and never blocks on I/O.
///
/// # Examples
///
/// ```
/// use wiegand_capture::{Clock, EdgeSink};
/// use wiegand_hardware::{EdgeSource, HardwareError, Result, SourceInfo};
///
/// /// Replays a fixed pattern as soon as it is attached.
/// struct Fixed(Vec<bool>, bool);
///
/// impl EdgeSource for Fixed {
///     fn attach<C: Clock>(&mut self, sink: EdgeSink<C>) -> Result<()> {
///         if self.1 {
///             return Err(HardwareError::already_attached("fixed"));
///         }
///         self.1 = true;
///         for &bit in &self.0 {
///             sink.on_edge(bit.into());
///         }
///         Ok(())
///     }
///
///     fn info(&self) -> SourceInfo {
///         SourceInfo::new("fixed", "test")
///     }
/// }
/// ```
pub trait EdgeSource: Send {
    /// Start forwarding edges into `sink`.
    ///
    /// A source feeds exactly one capture context.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The source is already attached
    /// - The data lines cannot be claimed
    fn attach<C: Clock>(&mut self, sink: EdgeSink<C>) -> Result<()>;

    /// Describe the source.
    fn info(&self) -> SourceInfo;
}
