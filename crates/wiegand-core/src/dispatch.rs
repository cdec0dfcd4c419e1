//! The seam between decoding and whatever acts on a card read.

use crate::{Result, types::DecodedEvent};

/// Receives each decoded frame.
///
/// Called synchronously from the single consumer context, once per
/// completed frame, never concurrently with itself. An error is reported
/// by the caller and does not stop capture.
///
/// Closures work as dispatchers:
///
/// ```
/// use wiegand_core::{DecodedEvent, Dispatcher};
///
/// let mut seen = Vec::new();
/// let mut dispatcher = |event: &DecodedEvent| -> wiegand_core::Result<()> {
///     seen.push(event.bit_count());
///     Ok(())
/// };
///
/// dispatcher.dispatch(&DecodedEvent::unrecognized(8, 0xA5)).unwrap();
/// drop(dispatcher);
/// assert_eq!(seen, vec![8]);
/// ```
pub trait Dispatcher {
    /// Handle one decoded event.
    ///
    /// # Errors
    /// Implementation defined; the consumer logs and continues.
    fn dispatch(&mut self, event: &DecodedEvent) -> Result<()>;
}

impl<F> Dispatcher for F
where
    F: FnMut(&DecodedEvent) -> Result<()>,
{
    fn dispatch(&mut self, event: &DecodedEvent) -> Result<()> {
        self(event)
    }
}
