//! Frame consumer loop.
//!
//! The consumer is the single context that reads frames out of a capture
//! context. On every tick it asks whether a frame is complete, takes it,
//! decodes it and hands the event to a [`Dispatcher`].
//!
//! # Architecture
//!
//! ```text
//!                   ┌────────────── FrameConsumer (one tokio task) ──────────────┐
//! EdgeSource ──►    │ interval ─► FrameReader ─► FieldDecoder ─► Dispatcher      │
//! (edge thread)     │   tick       take_frame      decode          dispatch      │
//!                   └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dispatch happens synchronously in the consumer, so the dispatcher is
//! never called concurrently with itself and sees events in capture order.
//!
//! # Examples
//!
//! ```no_run
//! use wiegand_capture::channel;
//! use wiegand_core::WiegandConfig;
//! use wiegand_hardware::{ChannelDispatcher, EdgeSource, FrameConsumer};
//! use wiegand_hardware::mock::MockWiegandReader;
//!
//! #[tokio::main]
//! async fn main() -> wiegand_hardware::Result<()> {
//!     let config = WiegandConfig::default();
//!     let (sink, reader) = channel(config.capture.clone())?;
//!
//!     let (mut mock, _cards) = MockWiegandReader::new();
//!     mock.attach(sink)?;
//!
//!     let (dispatcher, mut events) = ChannelDispatcher::new();
//!     let consumer = FrameConsumer::from_config(reader, &config, dispatcher)?;
//!     let handle = consumer.spawn();
//!
//!     while let Some(event) = events.recv().await {
//!         println!("{event}");
//!     }
//!
//!     handle.shutdown().await
//! }
//! ```

use crate::dispatch::TracingDispatcher;
use crate::error::{HardwareError, Result};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use wiegand_capture::{Clock, FrameReader, MonotonicClock};
use wiegand_core::{DecodedEvent, Dispatcher, Frame, WiegandConfig, constants::DEFAULT_POLL_INTERVAL};
use wiegand_decoder::FieldDecoder;

/// Counters kept by a consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Events decoded and offered to the dispatcher.
    pub events: u64,

    /// Events whose dispatch returned an error.
    pub dispatch_errors: u64,
}

/// Single consumer of a capture context.
pub struct FrameConsumer<C: Clock = MonotonicClock, D = TracingDispatcher> {
    reader: FrameReader<C>,
    decoder: FieldDecoder,
    dispatcher: D,
    poll_interval: Duration,
    stats: ConsumerStats,
}

impl<C, D> FrameConsumer<C, D>
where
    C: Clock,
    D: Dispatcher,
{
    /// Create a consumer polling at the default interval.
    pub fn new(reader: FrameReader<C>, decoder: FieldDecoder, dispatcher: D) -> Self {
        Self {
            reader,
            decoder,
            dispatcher,
            poll_interval: DEFAULT_POLL_INTERVAL,
            stats: ConsumerStats::default(),
        }
    }

    /// Create a consumer from configuration: formats and poll interval.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Core`] if the configuration does not validate.
    pub fn from_config(reader: FrameReader<C>, config: &WiegandConfig, dispatcher: D) -> Result<Self> {
        config.validate()?;
        let decoder = FieldDecoder::from_specs(&config.formats)?;
        Ok(Self::new(reader, decoder, dispatcher).with_poll_interval(config.poll_interval()))
    }

    /// Set the interval between polls.
    ///
    /// A zero interval falls back to the default.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn decoder(&self) -> &FieldDecoder {
        &self.decoder
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Access the reader, e.g. to discard a partial frame.
    pub fn reader_mut(&mut self) -> &mut FrameReader<C> {
        &mut self.reader
    }

    pub fn stats(&self) -> ConsumerStats {
        self.stats
    }

    /// Check once for a completed frame and handle it.
    ///
    /// Returns the decoded event, or `None` while no frame is ready. A
    /// dispatcher error is logged and counted; the event is still returned.
    pub fn poll_once(&mut self) -> Option<DecodedEvent> {
        self.poll_frame().map(|(_, event)| event)
    }

    /// As [`poll_once`](Self::poll_once), also returning the captured frame.
    pub fn poll_frame(&mut self) -> Option<(Frame, DecodedEvent)> {
        if self.reader.pending_bit_count() == 0 {
            return None;
        }
        let frame = self.reader.next_frame()?;
        let event = self.decoder.decode_frame(&frame);

        debug!(
            bits = frame.bit_count(),
            data = %frame.to_hex(),
            recognized = event.is_recognized(),
            "Frame decoded"
        );

        self.stats.events += 1;
        if let Err(e) = self.dispatcher.dispatch(&event) {
            self.stats.dispatch_errors += 1;
            warn!(error = %e, bits = event.bit_count(), "Dispatch failed");
        }

        Some((frame, event))
    }

    /// Poll forever at the configured interval.
    ///
    /// Ticks missed while a dispatcher was slow are not made up in a burst.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(poll_interval = ?self.poll_interval, "Frame consumer started");
        loop {
            interval.tick().await;
            self.poll_once();
        }
    }

    /// Move the consumer onto its own tokio task.
    pub fn spawn(self) -> ConsumerHandle
    where
        D: Send + 'static,
    {
        ConsumerHandle {
            task: tokio::spawn(self.run()),
        }
    }

    /// Take the parts back.
    pub fn into_parts(self) -> (FrameReader<C>, FieldDecoder, D) {
        (self.reader, self.decoder, self.dispatcher)
    }
}

impl<C: Clock, D> std::fmt::Debug for FrameConsumer<C, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameConsumer")
            .field("poll_interval", &self.poll_interval)
            .field("decoder", &self.decoder)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Handle to a spawned consumer task.
#[derive(Debug)]
pub struct ConsumerHandle {
    task: JoinHandle<()>,
}

impl ConsumerHandle {
    /// Returns `true` if the task has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the consumer.
    ///
    /// Aborts the task and waits for it to end. A frame in progress stays in
    /// the capture context.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::ConsumerFailed`] if the task had panicked.
    pub async fn shutdown(self) -> Result<()> {
        self.task.abort();
        match self.task.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => {
                debug!("Frame consumer stopped");
                Ok(())
            }
            Err(e) => Err(HardwareError::consumer_failed(e.to_string())),
        }
    }
}
