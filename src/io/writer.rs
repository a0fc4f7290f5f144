/// Emulator file writer

use crate::error::Result;
use crate::format::{Geometry, SectorAddress};
use crate::image::{write_sector, EmulatorHeader};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Sequential writer producing an emulator file
pub struct EmulatorWriter<W: Write> {
    writer: W,
    geometry: Geometry,
    sectors_written: usize,
}

impl<W: Write> EmulatorWriter<W> {
    /// Write `header` and prepare for sector records
    pub fn new(mut writer: W, geometry: Geometry, header: &EmulatorHeader) -> Result<Self> {
        header.write_to(&mut writer)?;
        Ok(Self {
            writer,
            geometry,
            sectors_written: 0,
        })
    }

    /// Drive geometry being written
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Records written so far
    pub fn sectors_written(&self) -> usize {
        self.sectors_written
    }

    /// Append the record for `address`
    pub fn write_sector(&mut self, address: SectorAddress, data: &[u8]) -> Result<()> {
        write_sector(&mut self.writer, address.cylinder, data)?;
        self.sectors_written += 1;
        Ok(())
    }

    /// Flush and return the underlying stream
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Create an emulator file and write its header
pub fn create_emulator<P: AsRef<Path>>(
    path: P,
    geometry: Geometry,
    header: &EmulatorHeader,
) -> Result<EmulatorWriter<BufWriter<File>>> {
    let file = File::create(path)?;
    EmulatorWriter::new(BufWriter::new(file), geometry, header)
}
