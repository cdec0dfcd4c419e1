//! Hardware boundary and consumer loop for Wiegand readers.
//!
//! This crate connects the capture core to the outside world on both ends:
//! edge sources feed falling edges in, and a frame consumer takes completed
//! frames out, decodes them and dispatches the result.
//!
//! # Edge Sources
//!
//! The [`EdgeSource`] trait represents whatever owns the DATA0/DATA1 lines.
//! [`mock::MockWiegandReader`] replays bit sequences from a dedicated thread
//! for development and testing without physical hardware:
//!
//! ```no_run
//! use wiegand_capture::channel;
//! use wiegand_core::CaptureSettings;
//! use wiegand_decoder::WiegandFormat;
//! use wiegand_hardware::EdgeSource;
//! use wiegand_hardware::mock::MockWiegandReader;
//!
//! # async fn example() -> wiegand_hardware::Result<()> {
//! let (sink, _reader) = channel(CaptureSettings::default())?;
//! let (mut mock, handle) = MockWiegandReader::new();
//! mock.attach(sink)?;
//! handle.present_card(&WiegandFormat::standard_26(), 12, 3456).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Consumer
//!
//! [`FrameConsumer`] is the single consumer of a capture context. It polls on
//! a tokio interval and calls its [`Dispatcher`](wiegand_core::Dispatcher)
//! synchronously, never concurrently with itself. [`ChannelDispatcher`]
//! forwards events to async code; [`TracingDispatcher`] logs them.
//!
//! # Error Handling
//!
//! Operations return [`Result<T>`][error::Result] using [`HardwareError`].
//! Capture and decoding never fail; errors here come from attaching sources,
//! talking to a mock reader whose channel closed, or a consumer task that
//! panicked.

pub mod consumer;
pub mod dispatch;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use consumer::{ConsumerHandle, ConsumerStats, FrameConsumer};
pub use dispatch::{ChannelDispatcher, DEFAULT_EVENT_CAPACITY, EventReceiver, TracingDispatcher};
pub use error::{HardwareError, Result};
pub use traits::EdgeSource;
pub use types::SourceInfo;
