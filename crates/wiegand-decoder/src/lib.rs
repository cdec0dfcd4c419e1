//! Field extraction for captured Wiegand frames.
//!
//! A frame's bit count selects a [`WiegandFormat`]; the format pulls the
//! facility and card codes out of the frame's raw value. Lengths with no
//! registered format still decode, to the raw value alone.

pub mod decoder;
pub mod format;

pub use decoder::{FieldDecoder, decode_standard};
pub use format::{FieldLayout, WiegandFormat};
