use crate::image::HeaderIssue;
use thiserror::Error;

/// Result type alias for RK05 image operations
pub type Result<T> = std::result::Result<T, RkError>;

/// Errors that abort a conversion pass
///
/// Recoverable sector problems (bad checksum, short sector, wrong cylinder
/// address) are not errors; they are reported as [`crate::SectorDefect`]
/// values and the pass carries on.
#[derive(Debug, Error)]
pub enum RkError {
    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a field could be read completely
    #[error("Unexpected end of file reading {what}")]
    Truncated {
        /// Field or record being read
        what: String,
    },

    /// One or more header geometry fields did not match the RK05 drive
    #[error(
        "Header validation failed: {} geometry mismatch(es)",
        .0.iter().filter(|issue| issue.is_fatal()).count()
    )]
    HeaderValidation(Vec<HeaderIssue>),

    /// Sector payload handed to the encoder has the wrong length
    #[error("Invalid sector size: expected {expected} bytes, got {actual}")]
    InvalidSectorSize {
        /// Required payload length
        expected: usize,
        /// Supplied payload length
        actual: usize,
    },

    /// Fill pattern could not be parsed
    #[error("Invalid fill pattern: {0}")]
    InvalidPattern(String),

    /// Flat image ended inside the user data area
    #[error("Flat image truncated at offset {offset:#x}")]
    FlatImageTruncated {
        /// Byte offset of the sector that could not be read
        offset: u64,
    },
}

impl RkError {
    /// Create a truncation error with context
    pub fn truncated<S: Into<String>>(what: S) -> Self {
        RkError::Truncated { what: what.into() }
    }

    /// Create an invalid pattern error
    pub fn pattern<S: Into<String>>(message: S) -> Self {
        RkError::InvalidPattern(message.into())
    }

    /// Wrap an I/O error, turning an early end of file into [`RkError::Truncated`]
    pub fn reading<S: Into<String>>(err: std::io::Error, what: S) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            RkError::truncated(what)
        } else {
            RkError::Io(err)
        }
    }

    /// True for errors that came from header validation rather than I/O
    pub fn is_validation(&self) -> bool {
        matches!(self, RkError::HeaderValidation(_))
    }
}
