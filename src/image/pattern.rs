/// Fill patterns for formatting and for spare cylinders

use crate::error::{RkError, Result};
use crate::format::constants::SECTOR_SIZE;
use std::fmt;
use std::str::FromStr;

/// Contents written into sectors that have no source data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillPattern {
    /// All zero bytes
    #[default]
    Zero,
    /// One byte repeated
    Byte(u8),
    /// Byte `i` of the sector holds `i mod 256`
    Count,
}

impl FillPattern {
    /// Build one sector's worth of the pattern
    pub fn sector(&self) -> Vec<u8> {
        match self {
            FillPattern::Zero => vec![0u8; SECTOR_SIZE],
            FillPattern::Byte(value) => vec![*value; SECTOR_SIZE],
            FillPattern::Count => (0..SECTOR_SIZE).map(|i| (i & 0xFF) as u8).collect(),
        }
    }
}

impl FromStr for FillPattern {
    type Err = RkError;

    /// Parse `ct` for the count pattern, otherwise a hex value whose low byte is used
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("ct") {
            return Ok(FillPattern::Count);
        }

        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let value = u64::from_str_radix(digits, 16)
            .map_err(|_| RkError::pattern(format!("'{}' is not 'ct' or a hex byte", s)))?;

        Ok(match (value & 0xFF) as u8 {
            0 => FillPattern::Zero,
            byte => FillPattern::Byte(byte),
        })
    }
}

impl fmt::Display for FillPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillPattern::Zero => write!(f, "00"),
            FillPattern::Byte(value) => write!(f, "{:02x}", value),
            FillPattern::Count => write!(f, "ct"),
        }
    }
}
