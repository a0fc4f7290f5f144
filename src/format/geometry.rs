/// Drive geometry and the mapping between emulator and flat image layouts

use crate::error::Result;
use crate::format::constants::*;
use std::fmt;

/// Physical drive geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    /// Cylinders recorded in the emulator file
    pub num_cylinders: u16,
    /// Cylinders mapped into the flat image (the rest are spare tracks)
    pub num_user_cylinders: u16,
    /// Heads per cylinder
    pub num_heads: u8,
    /// Sectors per track
    pub sectors_per_track: u8,
    /// Sector payload size in bytes
    pub sector_size: usize,
}

/// Address of one sector in emulator file order
///
/// `head` is the head number as stored in the emulator file. The flat image
/// stores heads in the opposite order, see [`Geometry::flat_head`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectorAddress {
    /// Cylinder number
    pub cylinder: u16,
    /// Head number (emulator order)
    pub head: u8,
    /// Sector number within the track
    pub sector: u8,
}

impl SectorAddress {
    /// Create a new sector address
    pub fn new(cylinder: u16, head: u8, sector: u8) -> Self {
        Self {
            cylinder,
            head,
            sector,
        }
    }
}

impl fmt::Display for SectorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cylinder {} Head {} Sector {}",
            self.cylinder, self.head, self.sector
        )
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::rk05()
    }
}

impl Geometry {
    /// RK05 cartridge as driven by an RK11-D controller
    pub fn rk05() -> Self {
        Self {
            num_cylinders: NUM_CYLINDERS,
            num_user_cylinders: NUM_USER_CYLINDERS,
            num_heads: NUM_HEADS,
            sectors_per_track: SECTORS_PER_TRACK,
            sector_size: SECTOR_SIZE,
        }
    }

    /// Total sectors recorded in an emulator file
    pub fn total_sectors(&self) -> usize {
        self.num_cylinders as usize * self.sectors_per_cylinder()
    }

    /// Sectors in the flat image
    pub fn user_sectors(&self) -> usize {
        self.num_user_cylinders as usize * self.sectors_per_cylinder()
    }

    /// Sectors per cylinder across all heads
    pub fn sectors_per_cylinder(&self) -> usize {
        self.num_heads as usize * self.sectors_per_track as usize
    }

    /// Size of a flat image in bytes
    pub fn flat_image_size(&self) -> u64 {
        self.user_sectors() as u64 * self.sector_size as u64
    }

    /// Whether a cylinder is mapped into the flat image
    #[inline]
    pub fn is_user_cylinder(&self, cylinder: u16) -> bool {
        cylinder < self.num_user_cylinders
    }

    /// Head number used by the flat image for an emulator head
    #[inline]
    pub fn flat_head(&self, head: u8) -> u8 {
        self.num_heads - 1 - head
    }

    /// Byte offset of a sector in the flat image
    ///
    /// Returns `None` for spare cylinders, which have no flat image space.
    pub fn flat_offset(&self, address: SectorAddress) -> Option<u64> {
        if !self.is_user_cylinder(address.cylinder) {
            return None;
        }
        let heads = self.num_heads as u64;
        let sectors = self.sectors_per_track as u64;
        let block = (address.cylinder as u64 * heads + self.flat_head(address.head) as u64)
            * sectors
            + address.sector as u64;
        Some(block * self.sector_size as u64)
    }

    /// All sector addresses in emulator file order
    ///
    /// Cylinder is the outermost loop, then head, then sector.
    pub fn addresses(&self) -> impl Iterator<Item = SectorAddress> + '_ {
        (0..self.num_cylinders).flat_map(move |cylinder| {
            (0..self.num_heads).flat_map(move |head| {
                (0..self.sectors_per_track)
                    .map(move |sector| SectorAddress::new(cylinder, head, sector))
            })
        })
    }

    /// Invoke `callback` for every sector in emulator file order, stopping at the first error
    pub fn for_each_sector<F>(&self, mut callback: F) -> Result<()>
    where
        F: FnMut(SectorAddress) -> Result<()>,
    {
        for address in self.addresses() {
            callback(address)?;
        }
        Ok(())
    }
}
