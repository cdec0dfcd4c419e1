//! Descriptive types shared by edge sources.

use serde::{Deserialize, Serialize};

/// Metadata about an edge source.
///
/// Contains the device name and model plus, for real hardware, the lines
/// carrying DATA0 and DATA1 (e.g. `gpio17`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Source name (e.g., "Mock Wiegand Reader").
    pub name: String,

    /// Source model identifier.
    pub model: String,

    /// Line carrying DATA0 pulses.
    pub data0_line: Option<String>,

    /// Line carrying DATA1 pulses.
    pub data1_line: Option<String>,
}

impl SourceInfo {
    /// Create a new SourceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            data0_line: None,
            data1_line: None,
        }
    }

    /// Set the data line names.
    pub fn with_lines(mut self, data0: impl Into<String>, data1: impl Into<String>) -> Self {
        self.data0_line = Some(data0.into());
        self.data1_line = Some(data1.into());
        self
    }
}

impl std::fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.model)?;
        if let (Some(d0), Some(d1)) = (&self.data0_line, &self.data1_line) {
            write!(f, " D0={d0} D1={d1}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_info_display() {
        let info = SourceInfo::new("Door 1", "GPIO").with_lines("gpio17", "gpio18");
        assert_eq!(info.to_string(), "Door 1 (GPIO) D0=gpio17 D1=gpio18");

        let info = SourceInfo::new("Mock", "Simulated");
        assert_eq!(info.to_string(), "Mock (Simulated)");
    }

    #[test]
    fn test_source_info_serialization() {
        let info = SourceInfo::new("Door 1", "GPIO").with_lines("gpio17", "gpio18");
        let json = serde_json::to_string(&info).unwrap();
        let back: SourceInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
