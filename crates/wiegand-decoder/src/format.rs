//! Wiegand format definitions.
//!
//! A format is selected by exact bit length and names two fields inside the
//! frame's raw value. The two stock formats put a parity bit at each end:
//!
//! ```text
//! 26-bit (H10301)  P FFFFFFFF CCCCCCCCCCCCCCCC P
//!                  25 24....17 16.............1 0   <- bit position in raw value
//!
//! 34-bit           P FFFFFFFFFFFFFFFF CCCCCCCCCCCCCCCC P
//!                  33 32...........17 16.............1 0
//! ```
//!
//! The leading parity bit is even parity over the first half of the payload
//! and the trailing one odd parity over the second half.

use serde::{Deserialize, Serialize};
use wiegand_core::{DecodedEvent, FieldSpec, FormatSpec, Result};

/// Location of a field: `(raw >> shift) & mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldLayout {
    shift: u32,
    width: u32,
}

impl FieldLayout {
    /// Create a layout. Widths are validated when the owning format is built.
    #[must_use]
    pub const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }

    #[must_use]
    pub fn shift(&self) -> u32 {
        self.shift
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// `2^width - 1`, saturating at 64 bits. A zero width masks everything.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> u64 {
        u64::MAX
            .checked_shr(64u32.saturating_sub(self.width))
            .unwrap_or(0)
    }

    /// Pull the field out of a raw value.
    #[inline]
    #[must_use]
    pub fn extract(&self, raw: u64) -> u32 {
        let value = raw.checked_shr(self.shift).unwrap_or(0) & self.mask();
        u32::try_from(value).unwrap_or(u32::MAX)
    }

    /// Place a value into its position, truncated to the field width.
    #[inline]
    #[must_use]
    pub fn place(&self, value: u32) -> u64 {
        (u64::from(value) & self.mask())
            .checked_shl(self.shift)
            .unwrap_or(0)
    }
}

impl From<FieldSpec> for FieldLayout {
    fn from(spec: FieldSpec) -> Self {
        Self::new(spec.shift, spec.width)
    }
}

impl From<FieldLayout> for FieldSpec {
    fn from(layout: FieldLayout) -> Self {
        FieldSpec::new(layout.shift, layout.width)
    }
}

/// A recognized Wiegand format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WiegandFormat {
    name: String,
    bit_length: usize,
    facility: FieldLayout,
    card: FieldLayout,
}

impl WiegandFormat {
    /// Build and validate a format.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` if a field is empty, wider than 32
    /// bits, or does not fit the frame.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_decoder::{FieldLayout, WiegandFormat};
    ///
    /// let format = WiegandFormat::new(
    ///     "H10302-ish",
    ///     37,
    ///     FieldLayout::new(20, 16),
    ///     FieldLayout::new(1, 19),
    /// ).unwrap();
    /// assert_eq!(format.bit_length(), 37);
    ///
    /// assert!(WiegandFormat::new("bad", 10, FieldLayout::new(5, 8), FieldLayout::new(1, 4)).is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        bit_length: usize,
        facility: FieldLayout,
        card: FieldLayout,
    ) -> Result<Self> {
        let spec = FormatSpec {
            name: name.into(),
            bit_length,
            facility: facility.into(),
            card: card.into(),
        };
        Self::try_from(&spec)
    }

    /// Standard 26-bit format (H10301).
    #[must_use]
    pub fn standard_26() -> Self {
        Self::from_valid_spec(FormatSpec::standard_26())
    }

    /// 34-bit format with a 16-bit facility code.
    #[must_use]
    pub fn standard_34() -> Self {
        Self::from_valid_spec(FormatSpec::standard_34())
    }

    fn from_valid_spec(spec: FormatSpec) -> Self {
        debug_assert!(spec.validate().is_ok(), "stock format must be valid");
        Self {
            name: spec.name,
            bit_length: spec.bit_length,
            facility: spec.facility.into(),
            card: spec.card.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }

    #[must_use]
    pub fn facility(&self) -> FieldLayout {
        self.facility
    }

    #[must_use]
    pub fn card(&self) -> FieldLayout {
        self.card
    }

    /// Extract `(facility, card)` from a raw value.
    #[must_use]
    pub fn extract(&self, raw_value: u64) -> (u32, u32) {
        (self.facility.extract(raw_value), self.card.extract(raw_value))
    }

    /// Decode a raw value of this format's length.
    #[must_use]
    pub fn decode(&self, raw_value: u64) -> DecodedEvent {
        let (facility, card) = self.extract(raw_value);
        DecodedEvent::recognized(self.bit_length, raw_value, &self.name, facility, card)
    }

    /// Bits a reader would transmit for this facility and card, first bit first.
    ///
    /// Values wider than their field are truncated. Formats of four bits or
    /// more get a leading even parity bit over the first half and a trailing
    /// odd parity bit over the second half.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_decoder::WiegandFormat;
    ///
    /// let format = WiegandFormat::standard_26();
    /// let bits = format.encode(44, 34101);
    /// assert_eq!(bits.len(), 26);
    ///
    /// let raw = bits.iter().fold(0u64, |acc, &b| (acc << 1) | u64::from(b));
    /// assert_eq!(format.extract(raw), (44, 34101));
    /// ```
    #[must_use]
    pub fn encode(&self, facility: u32, card: u32) -> Vec<bool> {
        let raw = self.facility.place(facility) | self.card.place(card);
        let n = self.bit_length;

        let mut bits: Vec<bool> = (0..n)
            .map(|index| {
                let position = n - 1 - index;
                position < 64 && (raw >> position) & 1 == 1
            })
            .collect();

        if n >= 4 {
            let half = n / 2;
            let leading_ones = bits[1..half].iter().filter(|&&b| b).count();
            let trailing_ones = bits[half..n - 1].iter().filter(|&&b| b).count();
            bits[0] = leading_ones % 2 == 1;
            bits[n - 1] = trailing_ones % 2 == 0;
        }

        bits
    }

    /// Declarative form, e.g. for writing configuration back out.
    #[must_use]
    pub fn to_spec(&self) -> FormatSpec {
        FormatSpec {
            name: self.name.clone(),
            bit_length: self.bit_length,
            facility: self.facility.into(),
            card: self.card.into(),
        }
    }
}

impl TryFrom<&FormatSpec> for WiegandFormat {
    type Error = wiegand_core::Error;

    fn try_from(spec: &FormatSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self::from_valid_spec(spec.clone()))
    }
}
