//! Bit-length keyed format table.

use crate::format::WiegandFormat;
use std::collections::BTreeMap;
use tracing::{debug, trace};
use wiegand_core::{DecodedEvent, FormatSpec, Frame, Result};

/// Maps `(bit_count, raw_value)` to a [`DecodedEvent`].
///
/// Selection is by exact bit length. A length with no registered format is
/// not an error: the event carries the raw value only.
///
/// # Examples
///
/// ```
/// use wiegand_decoder::FieldDecoder;
///
/// let decoder = FieldDecoder::default();
///
/// let raw = (0x2C << 17) | (0x8535 << 1);
/// let event = decoder.decode(26, raw);
/// assert_eq!(event.facility_code(), Some(0x2C));
/// assert_eq!(event.card_code(), Some(0x8535));
///
/// let event = decoder.decode(37, raw);
/// assert!(!event.is_recognized());
/// assert_eq!(event.raw_value(), raw);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecoder {
    formats: BTreeMap<usize, WiegandFormat>,
}

impl Default for FieldDecoder {
    fn default() -> Self {
        let mut decoder = Self::empty();
        decoder.register(WiegandFormat::standard_26());
        decoder.register(WiegandFormat::standard_34());
        decoder
    }
}

impl FieldDecoder {
    /// A decoder that recognizes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            formats: BTreeMap::new(),
        }
    }

    /// Build a decoder from configured formats.
    ///
    /// A later spec with the same bit length replaces an earlier one.
    ///
    /// # Errors
    /// Returns the first format validation error.
    pub fn from_specs(specs: &[FormatSpec]) -> Result<Self> {
        let mut decoder = Self::empty();
        for spec in specs {
            decoder.register(WiegandFormat::try_from(spec)?);
        }
        Ok(decoder)
    }

    /// Add a format, returning the one it replaced.
    pub fn register(&mut self, format: WiegandFormat) -> Option<WiegandFormat> {
        debug!(
            format = format.name(),
            bits = format.bit_length(),
            "Registering Wiegand format"
        );
        self.formats.insert(format.bit_length(), format)
    }

    /// Format registered for `bit_count`, if any.
    #[must_use]
    pub fn format_for(&self, bit_count: usize) -> Option<&WiegandFormat> {
        self.formats.get(&bit_count)
    }

    #[must_use]
    pub fn recognizes(&self, bit_count: usize) -> bool {
        self.formats.contains_key(&bit_count)
    }

    /// Registered bit lengths in ascending order.
    pub fn bit_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.formats.keys().copied()
    }

    /// Decode a raw value. Pure: equal inputs give equal events.
    #[must_use]
    pub fn decode(&self, bit_count: usize, raw_value: u64) -> DecodedEvent {
        match self.formats.get(&bit_count) {
            Some(format) => format.decode(raw_value),
            None => {
                trace!(bits = bit_count, "No format for bit length");
                DecodedEvent::unrecognized(bit_count, raw_value)
            }
        }
    }

    /// Decode a captured frame.
    #[must_use]
    pub fn decode_frame(&self, frame: &Frame) -> DecodedEvent {
        self.decode(frame.bit_count(), frame.raw_value())
    }
}

/// Decode against the stock 26 and 34-bit formats only.
#[must_use]
pub fn decode_standard(bit_count: usize, raw_value: u64) -> DecodedEvent {
    let format = match bit_count {
        wiegand_core::constants::WIEGAND_26_BITS => WiegandFormat::standard_26(),
        wiegand_core::constants::WIEGAND_34_BITS => WiegandFormat::standard_34(),
        _ => return DecodedEvent::unrecognized(bit_count, raw_value),
    };
    format.decode(raw_value)
}
