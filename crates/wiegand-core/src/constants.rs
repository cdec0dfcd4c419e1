//! Core constants for Wiegand capture and decoding.
//!
//! The Wiegand interface has two data lines, DATA0 and DATA1, both held high
//! while idle. A `0` bit is a short low pulse on DATA0 and a `1` bit is a short
//! low pulse on DATA1. There is no start or stop marker: a frame ends when the
//! bus stays silent for longer than the idle threshold.
//!
//! ```text
//! DATA0 ‾‾‾‾|_|‾‾‾‾‾‾‾‾‾‾‾|_|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//! DATA1 ‾‾‾‾‾‾‾‾‾‾‾|_|‾‾‾‾‾‾‾‾‾‾‾|_|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//! bits      0      1      0      1  |<--- idle threshold --->| frame done
//! ```
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use wiegand_core::constants::*;
//!
//! assert_eq!(DEFAULT_MAX_FRAME_BYTES * 8, 256);
//! assert_eq!(DEFAULT_IDLE_TIMEOUT, Duration::from_millis(4));
//! ```

use std::time::Duration;

// ============================================================================
// Capture
// ============================================================================

/// Default frame capacity in bytes.
///
/// 32 bytes hold 256 bits, far more than any Wiegand variant in the field.
/// Edges arriving once the buffer is full are dropped.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 32;

/// Upper bound accepted for a configured frame capacity.
pub const MAX_CONFIGURABLE_FRAME_BYTES: usize = 4096;

/// Default idle threshold, in nanoseconds.
pub const DEFAULT_IDLE_TIMEOUT_NS: u64 = 4_000_000;

/// Default idle threshold that marks the end of a frame.
///
/// Typical readers space pulses 1-2 ms apart, so 4 ms of silence means the
/// card has finished transmitting.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_nanos(DEFAULT_IDLE_TIMEOUT_NS);

/// Default sleep between consumer polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

// ============================================================================
// Formats
// ============================================================================

/// Bit length of the standard 26-bit format (H10301).
pub const WIEGAND_26_BITS: usize = 26;

/// Bit length of the 34-bit format.
pub const WIEGAND_34_BITS: usize = 34;

/// Widest field the decoder will extract.
pub const MAX_FIELD_WIDTH: u32 = 32;

/// Number of low-order frame bits kept in a raw value.
pub const RAW_VALUE_BITS: usize = 64;

/// Multiplier joining facility and card into one display number.
///
/// `combined = facility * 100000 + card`. Card fields are at most 16 bits
/// wide in the stock formats, so the two halves never overlap.
pub const COMBINED_VALUE_MULTIPLIER: u64 = 100_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_holds_longest_known_format() {
        assert!(DEFAULT_MAX_FRAME_BYTES * 8 >= WIEGAND_34_BITS);
        assert!(DEFAULT_MAX_FRAME_BYTES <= MAX_CONFIGURABLE_FRAME_BYTES);
    }

    #[test]
    fn test_idle_timeout_matches_reference() {
        assert_eq!(DEFAULT_IDLE_TIMEOUT.as_millis(), 4);
    }

    #[test]
    fn test_combined_multiplier_covers_16_bit_cards() {
        assert!(u64::from(u16::MAX) < COMBINED_VALUE_MULTIPLIER);
    }
}
