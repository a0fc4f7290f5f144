/// Flat (SimH) disk images

use crate::error::{RkError, Result};
use crate::format::{Geometry, SectorAddress};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Random access view of a flat image
///
/// Sectors are addressed by their emulator position; the head inversion
/// and the skipping of spare cylinders are handled here.
pub struct FlatImage<F> {
    inner: F,
    geometry: Geometry,
}

impl<F> FlatImage<F> {
    /// Wrap a stream holding a flat image
    pub fn new(inner: F, geometry: Geometry) -> Self {
        Self { inner, geometry }
    }

    /// Geometry used for addressing
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Return the underlying stream
    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Read + Seek> FlatImage<F> {
    /// Read the sector for `address`, or `None` on a spare cylinder
    pub fn read_sector(&mut self, address: SectorAddress) -> Result<Option<Vec<u8>>> {
        let Some(offset) = self.geometry.flat_offset(address) else {
            return Ok(None);
        };

        let mut data = vec![0u8; self.geometry.sector_size];
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.read_exact(&mut data).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                RkError::FlatImageTruncated { offset }
            } else {
                RkError::Io(e)
            }
        })?;
        Ok(Some(data))
    }
}

impl<F: Write + Seek> FlatImage<F> {
    /// Write the sector for `address`; spare cylinders are skipped
    ///
    /// Returns whether anything was written.
    pub fn write_sector(&mut self, address: SectorAddress, data: &[u8]) -> Result<bool> {
        let Some(offset) = self.geometry.flat_offset(address) else {
            return Ok(false);
        };
        if data.len() != self.geometry.sector_size {
            return Err(RkError::InvalidSectorSize {
                expected: self.geometry.sector_size,
                actual: data.len(),
            });
        }

        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.write_all(data)?;
        Ok(true)
    }

    /// Flush buffered writes
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Open an existing flat image for reading
pub fn open_flat<P: AsRef<Path>>(path: P, geometry: Geometry) -> Result<FlatImage<File>> {
    Ok(FlatImage::new(File::open(path)?, geometry))
}

/// Create (or truncate) a flat image for writing
pub fn create_flat<P: AsRef<Path>>(path: P, geometry: Geometry) -> Result<FlatImage<File>> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    Ok(FlatImage::new(file, geometry))
}

/// Read up to `size` bytes, stopping early only at end of file
///
/// Used to compare images that may be shorter than a full disk.
pub fn read_block<R: Read>(reader: &mut R, size: usize) -> io::Result<Vec<u8>> {
    let mut block = Vec::with_capacity(size);
    reader.by_ref().take(size as u64).read_to_end(&mut block)?;
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::constants::SECTOR_SIZE;
    use std::io::Cursor;

    #[test]
    fn test_write_then_read() {
        let mut image = FlatImage::new(Cursor::new(Vec::new()), Geometry::rk05());
        let address = SectorAddress::new(2, 0, 5);
        assert!(image.write_sector(address, &[0x5A; SECTOR_SIZE]).unwrap());

        let data = image.read_sector(address).unwrap().unwrap();
        assert!(data.iter().all(|&b| b == 0x5A));

        let raw = image.into_inner().into_inner();
        let offset = ((2 * 2 + 1) * 12 + 5) * SECTOR_SIZE;
        assert_eq!(raw.len(), offset + SECTOR_SIZE);
        assert!(raw[..offset].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_spare_cylinder_skipped() {
        let mut image = FlatImage::new(Cursor::new(Vec::new()), Geometry::rk05());
        let address = SectorAddress::new(201, 1, 0);
        assert!(!image.write_sector(address, &[1; SECTOR_SIZE]).unwrap());
        assert_eq!(image.read_sector(address).unwrap(), None);
        assert!(image.into_inner().into_inner().is_empty());
    }

    #[test]
    fn test_read_past_end() {
        let mut image = FlatImage::new(Cursor::new(vec![0u8; 1000]), Geometry::rk05());
        let err = image.read_sector(SectorAddress::new(0, 1, 1)).unwrap_err();
        assert!(matches!(err, RkError::FlatImageTruncated { offset: 512 }));
    }

    #[test]
    fn test_read_block_short() {
        let mut cursor = Cursor::new(vec![9u8; 700]);
        assert_eq!(read_block(&mut cursor, 512).unwrap().len(), 512);
        assert_eq!(read_block(&mut cursor, 512).unwrap().len(), 188);
        assert!(read_block(&mut cursor, 512).unwrap().is_empty());
    }
}
