//! Command-line arguments and card specifications.

use anyhow::{Context, bail};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use wiegand_decoder::FieldDecoder;
use wiegand_hardware::mock::parse_bit_string;

/// Wiegand reader simulator and decoder.
///
/// Replays cards through a simulated reader into the capture engine and
/// prints each frame as it is decoded. Cards come from the command line or,
/// when none are given, one per line on stdin.
#[derive(Debug, Parser)]
#[command(name = "wiegand", version, about)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write every event to a daily journal under this directory
    #[arg(short, long, value_name = "DIR")]
    pub journal: Option<PathBuf>,

    /// Pause between simulated pulses, in microseconds (0 = burst)
    #[arg(long, value_name = "US", default_value_t = 0)]
    pub pulse_interval_us: u64,

    /// Cards as BITS:FACILITY:CARD (e.g. 26:44:34101) or raw bits (e.g. 0110)
    #[arg(value_name = "CARD")]
    pub cards: Vec<CardInput>,
}

/// One card to present to the simulated reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardInput {
    /// Facility and card code in the format registered for `bits`.
    Card { bits: usize, facility: u32, card: u32 },

    /// A literal bit sequence.
    Raw(Vec<bool>),
}

impl CardInput {
    /// Bits to pulse for this card.
    pub fn to_bits(&self, decoder: &FieldDecoder) -> anyhow::Result<Vec<bool>> {
        match self {
            CardInput::Card {
                bits,
                facility,
                card,
            } => {
                let format = decoder
                    .format_for(*bits)
                    .with_context(|| format!("no {bits}-bit format is configured"))?;
                Ok(format.encode(*facility, *card))
            }
            CardInput::Raw(bits) => Ok(bits.clone()),
        }
    }
}

impl FromStr for CardInput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("empty card specification");
        }

        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [bits] => Ok(CardInput::Raw(parse_bit_string(bits)?)),
            [bits, facility, card] => Ok(CardInput::Card {
                bits: bits.parse().with_context(|| format!("bad bit length {bits:?}"))?,
                facility: facility
                    .parse()
                    .with_context(|| format!("bad facility code {facility:?}"))?,
                card: card.parse().with_context(|| format!("bad card code {card:?}"))?,
            }),
            _ => bail!("expected BITS:FACILITY:CARD or a bit string, got {s:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_card() {
        assert_eq!(
            "26:44:34101".parse::<CardInput>().unwrap(),
            CardInput::Card {
                bits: 26,
                facility: 44,
                card: 34101
            }
        );
    }

    #[test]
    fn test_parse_raw() {
        assert_eq!(
            " 101 ".parse::<CardInput>().unwrap(),
            CardInput::Raw(vec![true, false, true])
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "26:44", "26:x:1", "1:2:3:4", "10201"] {
            assert!(input.parse::<CardInput>().is_err(), "{input:?} accepted");
        }
    }

    #[test]
    fn test_to_bits_needs_configured_format() {
        let decoder = FieldDecoder::default();
        let card = CardInput::Card {
            bits: 37,
            facility: 1,
            card: 1,
        };
        assert!(card.to_bits(&decoder).is_err());

        let card = CardInput::Card {
            bits: 34,
            facility: 1,
            card: 1,
        };
        assert_eq!(card.to_bits(&decoder).unwrap().len(), 34);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "wiegand",
            "--journal",
            "/tmp/j",
            "--pulse-interval-us",
            "1000",
            "26:1:2",
            "0101",
        ])
        .unwrap();
        assert_eq!(cli.pulse_interval_us, 1000);
        assert_eq!(cli.cards.len(), 2);
        assert_eq!(cli.journal, Some(PathBuf::from("/tmp/j")));
    }
}
