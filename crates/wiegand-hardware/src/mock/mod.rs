//! Mock edge sources for testing and development.
//!
//! This module provides simulated readers that can be controlled
//! programmatically without requiring physical hardware.

pub mod reader;

pub use reader::{DEFAULT_FRAME_GAP, MockReaderHandle, MockWiegandReader, parse_bit_string};
