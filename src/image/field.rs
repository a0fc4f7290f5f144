/// Fixed-width, zero-terminated text fields

use crate::error::{RkError, Result};
use std::fmt;
use std::io::{Read, Write};

/// A text field stored in exactly `N` bytes
///
/// Text is Latin-1: each byte is one character. Content stops at the first
/// zero byte on read. On write the text is truncated to `N - 1` bytes and the
/// remainder of the field is zero filled, so a terminator is always present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixedString<const N: usize> {
    text: String,
}

impl<const N: usize> FixedString<N> {
    /// Field width in bytes
    pub const WIDTH: usize = N;

    /// Create a field, truncating the text to what fits
    pub fn new(text: &str) -> Self {
        let text = text.chars().take(N.saturating_sub(1)).collect();
        Self { text }
    }

    /// Decode a field from its raw bytes
    pub fn from_bytes(raw: &[u8]) -> Self {
        let text = raw
            .iter()
            .take(N)
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect();
        Self { text }
    }

    /// The field text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Raw bytes of the text, without terminator
    ///
    /// Characters outside Latin-1 are replaced by `?`.
    pub fn text_bytes(&self) -> Vec<u8> {
        self.text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }

    /// Encode the field into its `N` byte representation
    pub fn to_bytes(&self) -> [u8; N] {
        let mut raw = [0u8; N];
        let bytes = self.text_bytes();
        let len = bytes.len().min(N.saturating_sub(1));
        raw[..len].copy_from_slice(&bytes[..len]);
        raw
    }

    /// Read the field from a stream
    pub fn read_from<R: Read>(reader: &mut R, name: &str) -> Result<Self> {
        let mut raw = [0u8; N];
        reader
            .read_exact(&mut raw)
            .map_err(|e| RkError::reading(e, format!("header {}", name)))?;
        Ok(Self::from_bytes(&raw))
    }

    /// Write the field to a stream
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }
}

impl<const N: usize> fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pad_with_zeros() {
        let field = FixedString::<8>::new("RK05");
        assert_eq!(&field.to_bytes(), b"RK05\0\0\0\0");
    }

    #[test]
    fn test_truncate_keeps_terminator() {
        let field = FixedString::<11>::new("averylongimagename");
        assert_eq!(field.as_str(), "averylongi");
        let raw = field.to_bytes();
        assert_eq!(raw[10], 0);
    }

    #[test]
    fn test_stops_at_first_zero() {
        let field = FixedString::<6>::from_bytes(b"1.1\0xy");
        assert_eq!(field.as_str(), "1.1");
    }

    #[test]
    fn test_latin1_round_trip() {
        let field = FixedString::<10>::from_bytes(b"\x89RK05\r\n\x1A\0\0");
        assert_eq!(field.text_bytes(), b"\x89RK05\r\n\x1A");
        assert_eq!(&field.to_bytes(), b"\x89RK05\r\n\x1A\0\0");
    }

    #[test]
    fn test_non_latin1_replaced() {
        let field = FixedString::<4>::new("a\u{263A}");
        assert_eq!(&field.to_bytes(), b"a?\0\0");
    }

    #[test]
    fn test_read_truncated_stream() {
        let mut cursor = Cursor::new(vec![b'a'; 5]);
        let err = FixedString::<11>::read_from(&mut cursor, "image name").unwrap_err();
        assert!(matches!(err, RkError::Truncated { .. }));
    }

    #[test]
    fn test_read_write() {
        let mut buffer = Vec::new();
        FixedString::<20>::new("2024/01/02 03:04:05")
            .write_to(&mut buffer)
            .unwrap();
        assert_eq!(buffer.len(), 20);

        let field = FixedString::<20>::read_from(&mut Cursor::new(buffer), "date").unwrap();
        assert_eq!(field.as_str(), "2024/01/02 03:04:05");
    }
}
