/// Emulator file header

use crate::error::{RkError, Result};
use crate::format::constants::*;
use crate::format::Geometry;
use crate::image::field::FixedString;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Read, Write};

/// Header at the start of every emulator file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorHeader {
    /// Magic number
    pub magic: FixedString<HEADER_MAGIC_LEN>,
    /// File format version
    pub version: FixedString<HEADER_VERSION_LEN>,
    /// Image name
    pub image_name: FixedString<HEADER_IMAGE_NAME_LEN>,
    /// Free text description
    pub description: FixedString<HEADER_DESCRIPTION_LEN>,
    /// Creation date
    pub date: FixedString<HEADER_DATE_LEN>,
    /// Controller name
    pub controller: FixedString<HEADER_CONTROLLER_LEN>,
    /// Serial bit rate
    pub bit_rate: u32,
    /// Cylinder count
    pub cylinders: u32,
    /// Sectors per track
    pub sectors_per_track: u32,
    /// Head count
    pub heads: u32,
    /// Sector duration in microseconds
    pub microseconds_per_sector: u32,
}

/// Header geometry field, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryField {
    /// Bit rate
    BitRate,
    /// Cylinder count
    Cylinders,
    /// Sectors per track
    SectorsPerTrack,
    /// Head count
    Heads,
    /// Microseconds per sector
    MicrosecondsPerSector,
}

impl fmt::Display for GeometryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryField::BitRate => write!(f, "bit rate"),
            GeometryField::Cylinders => write!(f, "number of cylinders"),
            GeometryField::SectorsPerTrack => write!(f, "sectors/track"),
            GeometryField::Heads => write!(f, "number of heads"),
            GeometryField::MicrosecondsPerSector => write!(f, "microseconds/sector"),
        }
    }
}

/// A header field that was read but failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderIssue {
    /// Magic number is not the RK05 emulator magic
    MagicMismatch {
        /// Magic read from the file
        found: Vec<u8>,
    },
    /// Version is not one this crate writes
    VersionMismatch {
        /// Version read from the file
        found: String,
    },
    /// A geometry field disagrees with the drive
    GeometryMismatch {
        /// Which field
        field: GeometryField,
        /// Required value
        expected: u32,
        /// Value in the file
        found: u32,
    },
}

impl HeaderIssue {
    /// Geometry mismatches abort a conversion once the whole header has been checked
    pub fn is_fatal(&self) -> bool {
        matches!(self, HeaderIssue::GeometryMismatch { .. })
    }
}

impl fmt::Display for HeaderIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderIssue::MagicMismatch { found } => write!(
                f,
                "Input file Magic Number Mismatch: Expected /{}/ got /{}/",
                MAGIC_NUMBER.escape_ascii(),
                found.escape_ascii()
            ),
            HeaderIssue::VersionMismatch { found } => write!(
                f,
                "Input file Version Number Mismatch: Expected /{}/ got /{}/",
                VERSION_NUMBER, found
            ),
            HeaderIssue::GeometryMismatch {
                field: GeometryField::MicrosecondsPerSector,
                expected,
                found,
            } => write!(
                f,
                "Unexpected microseconds/sector: Expected {} +/- {}%, got {}",
                expected, MICROSECONDS_TOLERANCE_PERCENT, found
            ),
            HeaderIssue::GeometryMismatch {
                field,
                expected,
                found,
            } => write!(f, "Unexpected {}: Expected {}, got {}", field, expected, found),
        }
    }
}

impl EmulatorHeader {
    /// Create a header for a new RK05 image, dated now
    pub fn new(image_name: &str, description: &str) -> Self {
        let date = chrono::Local::now().format(DATE_FORMAT).to_string();
        Self::for_geometry(&Geometry::rk05(), image_name, description, &date)
    }

    /// Create a header for a geometry with an explicit date
    pub fn for_geometry(
        geometry: &Geometry,
        image_name: &str,
        description: &str,
        date: &str,
    ) -> Self {
        Self {
            magic: FixedString::from_bytes(MAGIC_NUMBER),
            version: FixedString::new(VERSION_NUMBER),
            image_name: FixedString::new(image_name),
            description: FixedString::new(description),
            date: FixedString::new(date),
            controller: FixedString::new(DEFAULT_CONTROLLER),
            bit_rate: BIT_RATE,
            cylinders: geometry.num_cylinders as u32,
            sectors_per_track: geometry.sectors_per_track as u32,
            heads: geometry.num_heads as u32,
            microseconds_per_sector: MICROSECONDS_PER_SECTOR,
        }
    }

    /// Replace the controller name
    pub fn with_controller(mut self, controller: &str) -> Self {
        self.controller = FixedString::new(controller);
        self
    }

    /// Read a header
    ///
    /// Only a stream that ends early is an error here. Field values are
    /// checked separately by [`EmulatorHeader::validate`].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = FixedString::read_from(reader, "magic number")?;
        let version = FixedString::read_from(reader, "version")?;
        let image_name = FixedString::read_from(reader, "image name")?;
        let description = FixedString::read_from(reader, "description")?;
        let date = FixedString::read_from(reader, "date")?;
        let controller = FixedString::read_from(reader, "controller name")?;

        Ok(Self {
            magic,
            version,
            image_name,
            description,
            date,
            controller,
            bit_rate: read_u32(reader, "bit rate")?,
            cylinders: read_u32(reader, "cylinders")?,
            sectors_per_track: read_u32(reader, "sectors/track")?,
            heads: read_u32(reader, "heads")?,
            microseconds_per_sector: read_u32(reader, "microseconds/sector")?,
        })
    }

    /// Write the header
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.magic.write_to(writer)?;
        self.version.write_to(writer)?;
        self.image_name.write_to(writer)?;
        self.description.write_to(writer)?;
        self.date.write_to(writer)?;
        self.controller.write_to(writer)?;
        writer.write_u32::<BigEndian>(self.bit_rate)?;
        writer.write_u32::<BigEndian>(self.cylinders)?;
        writer.write_u32::<BigEndian>(self.sectors_per_track)?;
        writer.write_u32::<BigEndian>(self.heads)?;
        writer.write_u32::<BigEndian>(self.microseconds_per_sector)?;
        Ok(())
    }

    /// Check every field against the drive, returning all problems found
    pub fn validate(&self, geometry: &Geometry) -> Vec<HeaderIssue> {
        let mut issues = Vec::new();

        if self.magic.text_bytes() != MAGIC_NUMBER {
            issues.push(HeaderIssue::MagicMismatch {
                found: self.magic.text_bytes(),
            });
        }
        if self.version.as_str() != VERSION_NUMBER {
            issues.push(HeaderIssue::VersionMismatch {
                found: self.version.as_str().to_string(),
            });
        }

        let exact = [
            (GeometryField::BitRate, BIT_RATE, self.bit_rate),
            (
                GeometryField::Cylinders,
                geometry.num_cylinders as u32,
                self.cylinders,
            ),
            (
                GeometryField::SectorsPerTrack,
                geometry.sectors_per_track as u32,
                self.sectors_per_track,
            ),
            (GeometryField::Heads, geometry.num_heads as u32, self.heads),
        ];
        for (field, expected, found) in exact {
            if expected != found {
                issues.push(HeaderIssue::GeometryMismatch {
                    field,
                    expected,
                    found,
                });
            }
        }

        let tolerance = MICROSECONDS_PER_SECTOR * MICROSECONDS_TOLERANCE_PERCENT / 100;
        if self.microseconds_per_sector.abs_diff(MICROSECONDS_PER_SECTOR) > tolerance {
            issues.push(HeaderIssue::GeometryMismatch {
                field: GeometryField::MicrosecondsPerSector,
                expected: MICROSECONDS_PER_SECTOR,
                found: self.microseconds_per_sector,
            });
        }

        issues
    }
}

fn read_u32<R: Read>(reader: &mut R, what: &str) -> Result<u32> {
    reader
        .read_u32::<BigEndian>()
        .map_err(|e| RkError::reading(e, format!("header {}", what)))
}
