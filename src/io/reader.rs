/// Emulator file reader

use crate::error::{RkError, Result};
use crate::format::constants::HEADER_SIZE;
use crate::format::{Geometry, SectorAddress};
use crate::image::{DecodedSector, EmulatorHeader, HeaderIssue};
use log::{info, trace, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Sequential reader over an emulator file
///
/// The header is read and validated on construction; sector records are then
/// read one at a time in file order.
pub struct EmulatorReader<R: Read> {
    reader: R,
    geometry: Geometry,
    header: EmulatorHeader,
    issues: Vec<HeaderIssue>,
    offset: u64,
}

impl<R: Read> EmulatorReader<R> {
    /// Read and validate the header
    ///
    /// Every header issue is logged. If any geometry field is wrong the
    /// whole list is returned as [`RkError::HeaderValidation`].
    pub fn new(mut reader: R, geometry: Geometry) -> Result<Self> {
        let header = EmulatorHeader::read_from(&mut reader)?;

        info!("Incoming Image Name: {}", header.image_name);
        info!("Incoming Description: {}", header.description);
        info!("Incoming Image Date: {}", header.date);
        info!("Incoming Controller Name: {}", header.controller);
        info!("Incoming Bit Rate: {}", header.bit_rate);
        info!("Incoming Cylinders: {}", header.cylinders);
        info!("Incoming Sectors/Track: {}", header.sectors_per_track);
        info!("Incoming Heads: {}", header.heads);
        info!("Incoming Microseconds/Sector: {}", header.microseconds_per_sector);

        let issues = header.validate(&geometry);
        for issue in &issues {
            warn!("{}", issue);
        }
        if issues.iter().any(HeaderIssue::is_fatal) {
            return Err(RkError::HeaderValidation(issues));
        }

        Ok(Self {
            reader,
            geometry,
            header,
            issues,
            offset: HEADER_SIZE as u64,
        })
    }

    /// The validated header
    pub fn header(&self) -> &EmulatorHeader {
        &self.header
    }

    /// Non-fatal header issues
    pub fn header_issues(&self) -> &[HeaderIssue] {
        &self.issues
    }

    /// Drive geometry the file was validated against
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Byte offset of the next record
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next sector record, expected to be `address`
    pub fn read_sector(&mut self, address: SectorAddress) -> Result<DecodedSector> {
        trace!("File offset is {:#x}", self.offset);
        let sector = DecodedSector::read_from(&mut self.reader, address)?;
        self.offset += sector.record_len as u64;
        Ok(sector)
    }

    /// Consume the reader, returning the underlying stream
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Open an emulator file and validate its header
pub fn open_emulator<P: AsRef<Path>>(
    path: P,
    geometry: Geometry,
) -> Result<EmulatorReader<BufReader<File>>> {
    let file = File::open(path)?;
    EmulatorReader::new(BufReader::new(file), geometry)
}
