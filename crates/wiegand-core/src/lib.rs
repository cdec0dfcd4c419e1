pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod types;

pub use config::{ByteRounding, CaptureSettings, FieldSpec, FormatSpec, WiegandConfig};
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
