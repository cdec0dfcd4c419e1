//! Error types for the hardware boundary.
//!
//! These cover the platform layer around the capture core: edge sources that
//! cannot be opened or attached, simulated readers whose channel has closed,
//! and a consumer task that died. The capture and decode paths themselves
//! never fail.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors raised by edge sources and the consumer loop.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// The source could not claim its data lines.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// The source is already feeding a capture context.
    #[error("Edge source already attached: {device}")]
    AlreadyAttached { device: String },

    /// Bits handed to a source could not be used.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// The consumer task stopped abnormally.
    #[error("Consumer task failed: {message}")]
    ConsumerFailed { message: String },

    /// Error from the core types (configuration, formats).
    #[error(transparent)]
    Core(#[from] wiegand_core::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new already attached error.
    pub fn already_attached(device: impl Into<String>) -> Self {
        Self::AlreadyAttached {
            device: device.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new consumer failure error.
    pub fn consumer_failed(message: impl Into<String>) -> Self {
        Self::ConsumerFailed {
            message: message.into(),
        }
    }
}
