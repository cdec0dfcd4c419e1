//! Stock dispatchers.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::info;
use wiegand_core::{DecodedEvent, Dispatcher, Error};

/// Default queue depth of a [`ChannelDispatcher`].
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Forwards events to async code over a bounded channel.
///
/// The consumer context is synchronous, so events are offered with
/// `try_send`. A full queue is reported as a dispatch error; the event is
/// lost and the poll loop carries on.
///
/// # Examples
///
/// ```
/// use wiegand_core::{DecodedEvent, Dispatcher};
/// use wiegand_hardware::ChannelDispatcher;
///
/// #[tokio::main]
/// async fn main() {
///     let (mut dispatcher, mut events) = ChannelDispatcher::new();
///     dispatcher.dispatch(&DecodedEvent::unrecognized(8, 0xA5)).unwrap();
///
///     let event = events.recv().await.unwrap();
///     assert_eq!(event.raw_value(), 0xA5);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    event_tx: mpsc::Sender<DecodedEvent>,
}

impl ChannelDispatcher {
    /// Create a dispatcher with the default queue depth.
    pub fn new() -> (Self, EventReceiver) {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create a dispatcher holding up to `capacity` undelivered events.
    pub fn with_capacity(capacity: usize) -> (Self, EventReceiver) {
        let (event_tx, event_rx) = mpsc::channel(capacity.max(1));
        (Self { event_tx }, EventReceiver { event_rx })
    }
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch(&mut self, event: &DecodedEvent) -> wiegand_core::Result<()> {
        match self.event_tx.try_send(event.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(Error::Dispatch("event queue full".into())),
            Err(TrySendError::Closed(_)) => Err(Error::Dispatch("event receiver dropped".into())),
        }
    }
}

/// Receiving end of a [`ChannelDispatcher`].
#[derive(Debug)]
pub struct EventReceiver {
    event_rx: mpsc::Receiver<DecodedEvent>,
}

impl EventReceiver {
    /// Receive the next decoded event.
    ///
    /// Returns `None` once every dispatcher clone has been dropped and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<DecodedEvent> {
        self.event_rx.recv().await
    }

    /// Take an event if one is queued.
    pub fn try_recv(&mut self) -> Option<DecodedEvent> {
        self.event_rx.try_recv().ok()
    }
}

/// Logs every event at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDispatcher;

impl Dispatcher for TracingDispatcher {
    fn dispatch(&mut self, event: &DecodedEvent) -> wiegand_core::Result<()> {
        match (event.facility_code(), event.card_code()) {
            (Some(facility), Some(card)) => info!(
                bits = event.bit_count(),
                format = event.format().unwrap_or_default(),
                facility,
                card,
                value = event.display_value(),
                "Card read"
            ),
            _ => info!(
                bits = event.bit_count(),
                value = event.raw_value(),
                "Unrecognized frame"
            ),
        }
        Ok(())
    }
}
