use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data line bit: {0} (expected 0 or 1)")]
    InvalidDataLine(u8),

    #[error("Invalid Wiegand format '{name}': {reason}")]
    InvalidFormat { name: String, reason: String },

    // Dispatch errors
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid format error.
    pub fn invalid_format(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
