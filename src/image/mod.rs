/// Emulator image data structures and codecs

/// Fixed-width text fields
pub mod field;
/// Emulator file header
pub mod header;
/// Fill patterns
pub mod pattern;
/// Sector record codec
pub mod sector;

pub use field::FixedString;
pub use header::{EmulatorHeader, GeometryField, HeaderIssue};
pub use pattern::FillPattern;
pub use sector::{checksum, write_sector, DecodedSector, SectorDefect, SectorHeader};
