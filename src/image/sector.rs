/// Emulator sector records
///
/// Each record is a little-endian sub-header of three words (sync bit times,
/// data bit count, cylinder address), the payload, a 16-bit checksum and a
/// short postamble. The data bit count decides how many bytes follow.

use crate::error::{RkError, Result};
use crate::format::constants::*;
use crate::format::SectorAddress;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{self, Read, Write};

/// Running sum of little-endian words, wrapping at 16 bits
///
/// A trailing odd byte counts as a word with a zero high byte.
pub fn checksum(data: &[u8]) -> u16 {
    data.chunks(WORD_SIZE_BYTES).fold(0u16, |sum, word| {
        let low = word[0] as u16;
        let high = word.get(1).copied().unwrap_or(0) as u16;
        sum.wrapping_add(low | (high << 8))
    })
}

/// Sub-header at the start of a sector record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorHeader {
    /// Bit times from sector pulse to sync bit
    pub sync_bits: u16,
    /// Bits of data after the sync bit
    pub data_bits: u16,
    /// Cylinder address word (cylinder << 5)
    pub address: u16,
}

impl SectorHeader {
    /// Sub-header written for a full sector on `cylinder`
    pub fn for_cylinder(cylinder: u16) -> Self {
        Self {
            sync_bits: SYNC_BIT_TIMES,
            data_bits: DATA_BITS_PER_SECTOR,
            address: cylinder << CYLINDER_ADDRESS_SHIFT,
        }
    }

    /// Cylinder encoded in the address word
    pub fn cylinder(&self) -> u16 {
        self.address >> CYLINDER_ADDRESS_SHIFT
    }

    /// Data length in whole words, rounded up
    pub fn words_of_data(&self) -> usize {
        (self.data_bits as usize).div_ceil(DATA_WORD_BITS as usize)
    }

    /// Data length in whole bytes, rounded up
    pub fn bytes_of_data(&self) -> usize {
        (self.data_bits as usize).div_ceil(8)
    }

    /// A record holding less than a full sector of words
    pub fn is_short(&self) -> bool {
        self.words_of_data() < SECTOR_SIZE_WORDS
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            sync_bits: reader.read_u16::<LittleEndian>()?,
            data_bits: reader.read_u16::<LittleEndian>()?,
            address: reader.read_u16::<LittleEndian>()?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(self.sync_bits)?;
        writer.write_u16::<LittleEndian>(self.data_bits)?;
        writer.write_u16::<LittleEndian>(self.address)
    }
}

/// Recoverable problem found while decoding a sector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorDefect {
    /// Address word names a different cylinder
    CylinderMismatch {
        /// Cylinder from the address word
        found: u16,
    },
    /// Record is shorter than a full sector; payload was zero extended
    ShortSector {
        /// Words present in the record
        words: usize,
    },
    /// Stored checksum does not match the payload
    ChecksumMismatch {
        /// Checksum in the record
        stored: u16,
        /// Checksum computed from the payload
        computed: u16,
    },
}

impl SectorDefect {
    /// Single character code used in defect maps
    pub fn code(&self) -> char {
        match self {
            SectorDefect::CylinderMismatch { .. } => 'A',
            SectorDefect::ShortSector { .. } => 'S',
            SectorDefect::ChecksumMismatch { .. } => 'C',
        }
    }
}

impl fmt::Display for SectorDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectorDefect::CylinderMismatch { found } => {
                write!(f, "Cylinder mismatch: header cylinder {}", found)
            }
            SectorDefect::ShortSector { words } => write!(
                f,
                "Short sector: {} words, extended to {} with 0x00",
                words, SECTOR_SIZE_WORDS
            ),
            SectorDefect::ChecksumMismatch { stored, computed } => write!(
                f,
                "Checksum error: header checksum {:04x} calculated checksum {:04x}",
                stored, computed
            ),
        }
    }
}

/// Result of decoding one sector record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSector {
    /// Where the record sits in the emulator file
    pub address: SectorAddress,
    /// Record sub-header
    pub header: SectorHeader,
    /// Payload, always [`SECTOR_SIZE`] bytes
    pub data: Vec<u8>,
    /// Checksum stored in the record (absent for short sectors)
    pub stored_checksum: Option<u16>,
    /// Bytes discarded after the checksum
    pub postamble_len: usize,
    /// Bytes consumed from the stream, sub-header included
    pub record_len: usize,
    /// Problems found while decoding
    pub defects: Vec<SectorDefect>,
}

impl DecodedSector {
    /// True when no defects were found
    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }

    /// Decode one sector record expected at `address`
    ///
    /// Only a stream that ends early is an error. A wrong cylinder, a short
    /// record or a checksum mismatch are returned in `defects`.
    pub fn read_from<R: Read>(reader: &mut R, address: SectorAddress) -> Result<Self> {
        let eof = |e: io::Error| RkError::reading(e, format!("sector at {}", address));

        let header = SectorHeader::read_from(reader).map_err(eof)?;
        let bytes_of_data = header.bytes_of_data();
        let mut defects = Vec::new();

        if header.cylinder() != address.cylinder {
            defects.push(SectorDefect::CylinderMismatch {
                found: header.cylinder(),
            });
        }

        let mut data = vec![0u8; SECTOR_SIZE];
        let mut record_len = SECTOR_HEADER_SIZE;
        let mut stored_checksum = None;
        let mut postamble_len = 0;

        if header.is_short() {
            reader.read_exact(&mut data[..bytes_of_data]).map_err(eof)?;
            record_len += bytes_of_data;
            defects.push(SectorDefect::ShortSector {
                words: header.words_of_data(),
            });
        } else {
            let read_len = bytes_of_data.saturating_sub(2).min(SECTOR_SIZE);
            reader.read_exact(&mut data[..read_len]).map_err(eof)?;
            let stored = reader.read_u16::<LittleEndian>().map_err(eof)?;
            record_len += read_len + 2;

            let computed = checksum(&data[..read_len]);
            if computed != stored {
                defects.push(SectorDefect::ChecksumMismatch { stored, computed });
            }
            stored_checksum = Some(stored);

            postamble_len = bytes_of_data.saturating_sub(4).saturating_sub(read_len);
            if postamble_len > 0 {
                let mut postamble = reader.by_ref().take(postamble_len as u64);
                let copied = io::copy(&mut postamble, &mut io::sink()).map_err(eof)?;
                if copied < postamble_len as u64 {
                    return Err(RkError::truncated(format!("postamble at {}", address)));
                }
                record_len += postamble_len;
            }
        }

        Ok(Self {
            address,
            header,
            data,
            stored_checksum,
            postamble_len,
            record_len,
            defects,
        })
    }
}

/// Encode one full sector record for `cylinder`
///
/// The data bit count is always that of a full sector and two zero bytes of
/// postamble follow the checksum.
pub fn write_sector<W: Write>(writer: &mut W, cylinder: u16, data: &[u8]) -> Result<()> {
    if data.len() != SECTOR_SIZE {
        return Err(RkError::InvalidSectorSize {
            expected: SECTOR_SIZE,
            actual: data.len(),
        });
    }

    SectorHeader::for_cylinder(cylinder).write_to(writer)?;
    writer.write_all(data)?;
    writer.write_u16::<LittleEndian>(checksum(data))?;
    writer.write_all(&[0u8; POSTAMBLE_SIZE])?;
    Ok(())
}
