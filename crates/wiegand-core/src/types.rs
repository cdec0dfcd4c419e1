use crate::{Result, constants::COMBINED_VALUE_MULTIPLIER, error::Error};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two Wiegand data lines.
///
/// A falling edge on `Data0` carries a `0` bit, a falling edge on `Data1`
/// carries a `1` bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataLine {
    Data0 = 0,
    Data1 = 1,
}

impl DataLine {
    /// Map a bit value onto the line that carries it.
    ///
    /// # Errors
    /// Returns `Error::InvalidDataLine` if the value is not 0 or 1.
    #[inline]
    pub fn from_bit(value: u8) -> Result<Self> {
        match value {
            0 => Ok(DataLine::Data0),
            1 => Ok(DataLine::Data1),
            _ => Err(Error::InvalidDataLine(value)),
        }
    }

    /// The bit value carried by this line.
    #[inline]
    #[must_use]
    pub fn bit(self) -> u8 {
        self as u8
    }

    /// Returns `true` for the line carrying `1` bits.
    #[inline]
    #[must_use]
    pub fn is_one(self) -> bool {
        matches!(self, DataLine::Data1)
    }
}

impl From<bool> for DataLine {
    fn from(bit: bool) -> Self {
        if bit { DataLine::Data1 } else { DataLine::Data0 }
    }
}

impl fmt::Display for DataLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataLine::Data0 => write!(f, "DATA0"),
            DataLine::Data1 => write!(f, "DATA1"),
        }
    }
}

/// A completed capture: the bit count plus the packed bytes.
///
/// Bits are packed in arrival order. Every full byte holds eight bits with
/// the earliest bit in the most significant position. A trailing partial
/// byte holds its `bit_count % 8` bits right-aligned, because the capture
/// shifts each byte left as bits arrive.
///
/// ```text
/// 10 bits: 1 0 1 1 0 0 1 1 | 0 1
/// data:    0b1011_0011       0b0000_0001
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    bit_count: usize,
    data: Bytes,
}

impl Frame {
    /// Create a frame from a bit count and its packed bytes.
    #[must_use]
    pub fn new(bit_count: usize, data: Bytes) -> Self {
        Self { bit_count, data }
    }

    /// The "no frame ready" value.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pack a bit sequence the same way the capture does.
    ///
    /// The byte count follows the legacy `bits / 8 + 1` rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_core::Frame;
    ///
    /// let frame = Frame::from_bits(&[true, false, true]);
    /// assert_eq!(frame.bit_count(), 3);
    /// assert_eq!(frame.data().as_ref(), &[0b101]);
    /// assert_eq!(frame.raw_value(), 5);
    /// ```
    #[must_use]
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut data = vec![0u8; bits.len() / 8 + 1];
        for (index, &bit) in bits.iter().enumerate() {
            let byte = &mut data[index / 8];
            *byte = (*byte << 1) | u8::from(bit);
        }
        Self::new(bits.len(), Bytes::from(data))
    }

    /// Number of bits captured.
    #[must_use]
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Packed frame bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Number of packed bytes carried.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` when no bits were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bit_count == 0
    }

    /// Bit at `index` in arrival order, if the frame carries it.
    ///
    /// Bits whose byte was cut off by a short copy read as `0`.
    #[must_use]
    pub fn bit(&self, index: usize) -> Option<bool> {
        (index < self.bit_count).then(|| self.bit_at(index))
    }

    /// Iterate the bits in arrival order.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bit_count).map(|index| self.bit_at(index))
    }

    fn bit_at(&self, index: usize) -> bool {
        let slot = index / 8;
        let byte = self.data.get(slot).copied().unwrap_or(0);
        let width = if slot < self.bit_count / 8 {
            8
        } else {
            self.bit_count % 8
        };
        let position = width - 1 - index % 8;
        (byte >> position) & 1 == 1
    }

    /// Interpret the bits as a big-endian unsigned integer.
    ///
    /// The first bit received is the most significant. Frames longer than
    /// 64 bits keep the last 64 bits received.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_core::Frame;
    ///
    /// let bits: Vec<bool> = (0..12).map(|i| i % 3 == 0).collect();
    /// assert_eq!(Frame::from_bits(&bits).raw_value(), 0b1001_0010_0100);
    /// ```
    #[must_use]
    pub fn raw_value(&self) -> u64 {
        self.bits()
            .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit))
    }

    /// Bytes as uppercase hex, two digits per byte.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.data.iter().map(|b| format!("{b:02X}")).collect()
    }

    /// Bytes as binary, eight digits per byte.
    #[must_use]
    pub fn to_binary(&self) -> String {
        self.data.iter().map(|b| format!("{b:08b}")).collect()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} bits ({} bytes): {}",
            self.bit_count,
            self.data.len(),
            self.to_hex()
        )
    }
}

/// Result of decoding one frame.
///
/// Facility and card fields are present only when the bit count matched a
/// known format. Otherwise `raw_value` is the only usable output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecodedEvent {
    bit_count: usize,
    raw_value: u64,
    format: Option<String>,
    facility_code: Option<u32>,
    card_code: Option<u32>,
    combined_value: Option<u64>,
}

impl DecodedEvent {
    /// Event for a bit length no format recognizes.
    #[must_use]
    pub fn unrecognized(bit_count: usize, raw_value: u64) -> Self {
        Self {
            bit_count,
            raw_value,
            format: None,
            facility_code: None,
            card_code: None,
            combined_value: None,
        }
    }

    /// Event for a recognized format with extracted fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_core::DecodedEvent;
    ///
    /// let event = DecodedEvent::recognized(26, 0x0259_0A6A, "H10301", 44, 34101);
    /// assert_eq!(event.combined_value(), Some(4_434_101));
    /// ```
    #[must_use]
    pub fn recognized(
        bit_count: usize,
        raw_value: u64,
        format: impl Into<String>,
        facility_code: u32,
        card_code: u32,
    ) -> Self {
        let combined_value = u64::from(facility_code)
            .checked_mul(COMBINED_VALUE_MULTIPLIER)
            .and_then(|v| v.checked_add(u64::from(card_code)));

        Self {
            bit_count,
            raw_value,
            format: Some(format.into()),
            facility_code: Some(facility_code),
            card_code: Some(card_code),
            combined_value,
        }
    }

    #[must_use]
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    #[must_use]
    pub fn raw_value(&self) -> u64 {
        self.raw_value
    }

    /// Name of the format that matched, if any.
    #[must_use]
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    #[must_use]
    pub fn facility_code(&self) -> Option<u32> {
        self.facility_code
    }

    #[must_use]
    pub fn card_code(&self) -> Option<u32> {
        self.card_code
    }

    #[must_use]
    pub fn combined_value(&self) -> Option<u64> {
        self.combined_value
    }

    /// Returns `true` when facility and card fields were extracted.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.facility_code.is_some() && self.card_code.is_some()
    }

    /// The number to show an operator: combined value, or raw value.
    #[must_use]
    pub fn display_value(&self) -> u64 {
        self.combined_value.unwrap_or(self.raw_value)
    }
}

impl fmt::Display for DecodedEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BITS={} VALUE={}", self.bit_count, self.raw_value)?;
        if let (Some(facility), Some(card)) = (self.facility_code, self.card_code) {
            write!(
                f,
                " FACILITY={facility} CARD={card} COMBINED={}",
                self.display_value()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, DataLine::Data0)]
    #[case(1, DataLine::Data1)]
    fn test_data_line_from_bit(#[case] bit: u8, #[case] expected: DataLine) {
        let line = DataLine::from_bit(bit).unwrap();
        assert_eq!(line, expected);
        assert_eq!(line.bit(), bit);
    }

    #[rstest]
    #[case(2)]
    #[case(255)]
    fn test_data_line_invalid(#[case] bit: u8) {
        assert!(matches!(
            DataLine::from_bit(bit),
            Err(Error::InvalidDataLine(b)) if b == bit
        ));
    }

    #[test]
    fn test_data_line_from_bool() {
        assert_eq!(DataLine::from(true), DataLine::Data1);
        assert_eq!(DataLine::from(false), DataLine::Data0);
        assert!(DataLine::Data1.is_one());
        assert_eq!(DataLine::Data0.to_string(), "DATA0");
    }

    #[test]
    fn test_frame_empty() {
        let frame = Frame::empty();
        assert!(frame.is_empty());
        assert_eq!(frame.byte_len(), 0);
        assert_eq!(frame.raw_value(), 0);
        assert_eq!(frame.bit(0), None);
    }

    #[test]
    fn test_frame_partial_byte_is_right_aligned() {
        // 1011_0011 then 01
        let bits = [
            true, false, true, true, false, false, true, true, false, true,
        ];
        let frame = Frame::from_bits(&bits);

        assert_eq!(frame.data().as_ref(), &[0b1011_0011, 0b0000_0001]);
        assert_eq!(frame.raw_value(), 0b10_1100_1101);
        assert_eq!(frame.bits().collect::<Vec<_>>(), bits);
    }

    #[test]
    fn test_frame_exact_multiple_of_eight_gets_trailing_byte() {
        let frame = Frame::from_bits(&[true; 16]);
        assert_eq!(frame.data().as_ref(), &[0xFF, 0xFF, 0x00]);
        assert_eq!(frame.raw_value(), 0xFFFF);
    }

    #[test]
    fn test_frame_raw_value_keeps_last_64_bits() {
        let mut bits = vec![true; 8];
        bits.extend(std::iter::repeat_n(false, 63));
        bits.push(true);

        let frame = Frame::from_bits(&bits);
        assert_eq!(frame.bit_count(), 72);
        assert_eq!(frame.raw_value(), 1);
    }

    #[test]
    fn test_frame_short_copy_reads_missing_bits_as_zero() {
        let frame = Frame::new(16, Bytes::from_static(&[0xFF]));
        assert_eq!(frame.raw_value(), 0xFF00);
        assert_eq!(frame.bit(15), Some(false));
    }

    #[test]
    fn test_frame_rendering() {
        let frame = Frame::from_bits(&[true, false, true, false]);
        assert_eq!(frame.to_hex(), "0A");
        assert_eq!(frame.to_binary(), "00001010");
        assert_eq!(frame.to_string(), "4 bits (1 bytes): 0A");
    }

    #[test]
    fn test_decoded_event_unrecognized() {
        let event = DecodedEvent::unrecognized(37, 12345);
        assert!(!event.is_recognized());
        assert_eq!(event.facility_code(), None);
        assert_eq!(event.card_code(), None);
        assert_eq!(event.combined_value(), None);
        assert_eq!(event.display_value(), 12345);
        assert_eq!(event.to_string(), "BITS=37 VALUE=12345");
    }

    #[test]
    fn test_decoded_event_recognized() {
        let event = DecodedEvent::recognized(34, 99, "W34", 1234, 56789);
        assert!(event.is_recognized());
        assert_eq!(event.format(), Some("W34"));
        assert_eq!(event.combined_value(), Some(123_456_789));
        assert_eq!(
            event.to_string(),
            "BITS=34 VALUE=99 FACILITY=1234 CARD=56789 COMBINED=123456789"
        );
    }

    #[test]
    fn test_decoded_event_combined_wide_fields() {
        let event = DecodedEvent::recognized(64, 0, "wide", u32::MAX, u32::MAX);
        assert_eq!(
            event.combined_value(),
            Some(429_496_729_500_000 + 4_294_967_295)
        );
    }
}
