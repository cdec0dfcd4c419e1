//! Runtime configuration.
//!
//! Everything a deployment may need to tune without recompiling lives here:
//! the idle threshold, the frame capacity, the byte rounding rule, the
//! consumer poll interval, and the table of recognized formats.
//!
//! Configuration is loaded from JSON. Every field is optional and falls back
//! to the defaults in [`constants`](crate::constants).
//!
//! ```
//! use wiegand_core::WiegandConfig;
//!
//! let config = WiegandConfig::from_json_str(r#"{
//!     "capture": { "idle_timeout_us": 25000 },
//!     "formats": [
//!         { "name": "H10301", "bit_length": 26,
//!           "facility": { "shift": 17, "width": 8 },
//!           "card": { "shift": 1, "width": 16 } }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.capture.idle_timeout().as_millis(), 25);
//! assert_eq!(config.capture.max_frame_bytes, 32);
//! assert_eq!(config.formats.len(), 1);
//! ```

use crate::{
    Result,
    constants::{
        DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_FRAME_BYTES, DEFAULT_POLL_INTERVAL,
        MAX_CONFIGURABLE_FRAME_BYTES, MAX_FIELD_WIDTH, RAW_VALUE_BITS, WIEGAND_26_BITS,
        WIEGAND_34_BITS,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// How many bytes a frame of `n` bits copies out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteRounding {
    /// `n / 8 + 1`: always one byte more than the full bytes, so a frame
    /// whose length is a multiple of 8 carries a trailing zero byte. Matches
    /// existing downstream decoders bit for bit.
    #[default]
    Legacy,

    /// `ceil(n / 8)`: only the bytes that hold bits.
    Exact,
}

impl ByteRounding {
    /// Number of bytes needed for `bit_count` bits under this rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_core::ByteRounding;
    ///
    /// assert_eq!(ByteRounding::Legacy.byte_count(26), 4);
    /// assert_eq!(ByteRounding::Legacy.byte_count(32), 5);
    /// assert_eq!(ByteRounding::Exact.byte_count(32), 4);
    /// assert_eq!(ByteRounding::Exact.byte_count(0), 0);
    /// ```
    #[inline]
    #[must_use]
    pub fn byte_count(self, bit_count: usize) -> usize {
        match self {
            ByteRounding::Legacy => bit_count / 8 + 1,
            ByteRounding::Exact => bit_count.div_ceil(8),
        }
    }
}

/// Capture engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Silence, in microseconds, that ends a frame.
    pub idle_timeout_us: u64,

    /// Frame capacity in bytes. Bits beyond `8 * max_frame_bytes` are dropped.
    pub max_frame_bytes: usize,

    /// Byte count rule applied when a frame is taken.
    pub byte_rounding: ByteRounding,
}

impl CaptureSettings {
    /// Idle threshold as a `Duration`.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_micros(self.idle_timeout_us)
    }

    /// Frame capacity in bits.
    #[must_use]
    pub fn capacity_bits(&self) -> usize {
        self.max_frame_bytes * 8
    }

    /// Set the idle threshold.
    ///
    /// Rounded up to whole microseconds, so any non-zero timeout stays
    /// non-zero.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout_us = u64::try_from(timeout.as_nanos().div_ceil(1_000)).unwrap_or(u64::MAX);
        self
    }

    /// Set the frame capacity in bytes.
    #[must_use]
    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    /// Set the byte rounding rule.
    #[must_use]
    pub fn with_byte_rounding(mut self, byte_rounding: ByteRounding) -> Self {
        self.byte_rounding = byte_rounding;
        self
    }

    /// Check the settings are usable.
    ///
    /// # Errors
    /// Returns `Error::Config` for a zero idle threshold or a capacity
    /// outside `1..=4096` bytes.
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout_us == 0 {
            return Err(Error::Config("idle_timeout_us must be non-zero".into()));
        }
        if !(1..=MAX_CONFIGURABLE_FRAME_BYTES).contains(&self.max_frame_bytes) {
            return Err(Error::Config(format!(
                "max_frame_bytes must be 1-{MAX_CONFIGURABLE_FRAME_BYTES}, got {}",
                self.max_frame_bytes
            )));
        }
        Ok(())
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            idle_timeout_us: u64::try_from(DEFAULT_IDLE_TIMEOUT.as_micros()).unwrap_or(u64::MAX),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            byte_rounding: ByteRounding::default(),
        }
    }
}

/// Position of one field inside a frame's raw value.
///
/// The field is `(raw >> shift) & (2^width - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub shift: u32,
    pub width: u32,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(shift: u32, width: u32) -> Self {
        Self { shift, width }
    }
}

/// Declarative description of one Wiegand format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    /// Human readable name, e.g. `H10301`.
    pub name: String,

    /// Exact bit count that selects this format.
    pub bit_length: usize,

    pub facility: FieldSpec,

    pub card: FieldSpec,
}

impl FormatSpec {
    /// Standard 26-bit format: 8-bit facility, 16-bit card, two parity bits.
    #[must_use]
    pub fn standard_26() -> Self {
        Self {
            name: "H10301".to_string(),
            bit_length: WIEGAND_26_BITS,
            facility: FieldSpec::new(17, 8),
            card: FieldSpec::new(1, 16),
        }
    }

    /// 34-bit format: 16-bit facility, 16-bit card, two parity bits.
    #[must_use]
    pub fn standard_34() -> Self {
        Self {
            name: "W34".to_string(),
            bit_length: WIEGAND_34_BITS,
            facility: FieldSpec::new(17, 16),
            card: FieldSpec::new(1, 16),
        }
    }

    /// Check both fields fit inside the frame, the raw value and a `u32`.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.bit_length == 0 {
            return Err(Error::invalid_format(&self.name, "bit_length must be non-zero"));
        }
        for (label, field) in [("facility", self.facility), ("card", self.card)] {
            if field.width == 0 || field.width > MAX_FIELD_WIDTH {
                return Err(Error::invalid_format(
                    &self.name,
                    format!("{label} width must be 1-{MAX_FIELD_WIDTH}, got {}", field.width),
                ));
            }
            let end = field.shift as usize + field.width as usize;
            if end > self.bit_length {
                return Err(Error::invalid_format(
                    &self.name,
                    format!(
                        "{label} field ends at bit {end}, past the {}-bit frame",
                        self.bit_length
                    ),
                ));
            }
            if end > RAW_VALUE_BITS {
                return Err(Error::invalid_format(
                    &self.name,
                    format!("{label} field ends at bit {end}, past the {RAW_VALUE_BITS}-bit raw value"),
                ));
            }
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiegandConfig {
    pub capture: CaptureSettings,

    /// Sleep between consumer polls, in milliseconds.
    pub poll_interval_ms: u64,

    /// Recognized formats, keyed by bit length.
    pub formats: Vec<FormatSpec>,
}

impl Default for WiegandConfig {
    fn default() -> Self {
        Self {
            capture: CaptureSettings::default(),
            poll_interval_ms: u64::try_from(DEFAULT_POLL_INTERVAL.as_millis()).unwrap_or(5),
            formats: vec![FormatSpec::standard_26(), FormatSpec::standard_34()],
        }
    }
}

impl WiegandConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    /// Returns `Error::ConfigParse` for malformed JSON, or the validation
    /// error from [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: WiegandConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Consumer poll interval as a `Duration`.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check every section.
    ///
    /// # Errors
    /// Returns `Error::Config` for bad capture settings, a zero poll interval
    /// or two formats sharing a bit length, and `Error::InvalidFormat` for a
    /// malformed format.
    pub fn validate(&self) -> Result<()> {
        self.capture.validate()?;

        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be non-zero".into()));
        }

        let mut lengths = HashSet::new();
        for format in &self.formats {
            format.validate()?;
            if !lengths.insert(format.bit_length) {
                return Err(Error::Config(format!(
                    "more than one format declared for {} bits",
                    format.bit_length
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = WiegandConfig::default();
        assert_eq!(config.capture.idle_timeout(), DEFAULT_IDLE_TIMEOUT);
        assert_eq!(config.capture.capacity_bits(), 256);
        assert_eq!(config.capture.byte_rounding, ByteRounding::Legacy);
        assert_eq!(config.poll_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(config.formats.len(), 2);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = WiegandConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WiegandConfig::default());
    }

    #[test]
    fn test_partial_capture_section() {
        let config = WiegandConfig::from_json_str(
            r#"{ "capture": { "max_frame_bytes": 8, "byte_rounding": "exact" } }"#,
        )
        .unwrap();
        assert_eq!(config.capture.max_frame_bytes, 8);
        assert_eq!(config.capture.byte_rounding, ByteRounding::Exact);
        assert_eq!(config.capture.idle_timeout(), DEFAULT_IDLE_TIMEOUT);
    }

    #[rstest]
    #[case(r#"{ "capture": { "idle_timeout_us": 0 } }"#)]
    #[case(r#"{ "capture": { "max_frame_bytes": 0 } }"#)]
    #[case(r#"{ "capture": { "max_frame_bytes": 5000 } }"#)]
    #[case(r#"{ "poll_interval_ms": 0 }"#)]
    fn test_invalid_settings_rejected(#[case] json: &str) {
        assert!(matches!(
            WiegandConfig::from_json_str(json),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            WiegandConfig::from_json_str("{ capture"),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_duplicate_bit_length_rejected() {
        let mut config = WiegandConfig::default();
        let mut duplicate = FormatSpec::standard_26();
        duplicate.name = "other".into();
        config.formats.push(duplicate);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[rstest]
    #[case(FieldSpec::new(17, 0))]
    #[case(FieldSpec::new(0, 33))]
    #[case(FieldSpec::new(20, 8))]
    fn test_invalid_field_rejected(#[case] facility: FieldSpec) {
        let format = FormatSpec {
            facility,
            ..FormatSpec::standard_26()
        };
        assert!(matches!(
            format.validate(),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_field_beyond_raw_value_rejected() {
        let format = FormatSpec {
            name: "long".into(),
            bit_length: 80,
            facility: FieldSpec::new(60, 8),
            card: FieldSpec::new(1, 16),
        };
        assert!(matches!(
            format.validate(),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_standard_formats_are_valid() {
        FormatSpec::standard_26().validate().unwrap();
        FormatSpec::standard_34().validate().unwrap();
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "poll_interval_ms": 20 }}"#).unwrap();

        let config = WiegandConfig::load(file.path()).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            WiegandConfig::load("/nonexistent/wiegand.json"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_builder_setters() {
        let settings = CaptureSettings::default()
            .with_idle_timeout(Duration::from_millis(30))
            .with_max_frame_bytes(4)
            .with_byte_rounding(ByteRounding::Exact);
        assert_eq!(settings.idle_timeout_us, 30_000);
        assert_eq!(settings.capacity_bits(), 32);
        assert_eq!(settings.byte_rounding, ByteRounding::Exact);
    }

    #[rstest]
    #[case(Duration::from_nanos(1), 1)]
    #[case(Duration::from_nanos(500), 1)]
    #[case(Duration::from_nanos(4_000_001), 4_001)]
    #[case(Duration::from_micros(4_000), 4_000)]
    fn test_idle_timeout_rounds_up(#[case] timeout: Duration, #[case] expected_us: u64) {
        let settings = CaptureSettings::default().with_idle_timeout(timeout);
        assert_eq!(settings.idle_timeout_us, expected_us);
        settings.validate().unwrap();
    }

    #[test]
    fn test_zero_idle_timeout_stays_invalid() {
        let settings = CaptureSettings::default().with_idle_timeout(Duration::ZERO);
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_serialization_roundtrip_keeps_rounding_name() {
        let json = serde_json::to_string(&CaptureSettings::default()).unwrap();
        assert!(json.contains(r#""byte_rounding":"legacy""#));
    }
}
