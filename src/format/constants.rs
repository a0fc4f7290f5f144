/// RK05 emulator file format and drive constants

/// Emulator file magic string (stored zero-terminated in a 10 byte field)
pub const MAGIC_NUMBER: &[u8] = b"\x89RK05\r\n\x1A";

/// Emulator file format version
pub const VERSION_NUMBER: &str = "1.1";

/// Width of the magic number field
pub const HEADER_MAGIC_LEN: usize = 10;

/// Width of the version field
pub const HEADER_VERSION_LEN: usize = 4;

/// Width of the image name field
pub const HEADER_IMAGE_NAME_LEN: usize = 11;

/// Width of the description field
pub const HEADER_DESCRIPTION_LEN: usize = 200;

/// Width of the date field
pub const HEADER_DATE_LEN: usize = 20;

/// Width of the controller name field
pub const HEADER_CONTROLLER_LEN: usize = 100;

/// Number of big-endian geometry integers after the text fields
pub const HEADER_GEOMETRY_FIELDS: usize = 5;

/// Total size of the emulator file header
pub const HEADER_SIZE: usize = HEADER_MAGIC_LEN
    + HEADER_VERSION_LEN
    + HEADER_IMAGE_NAME_LEN
    + HEADER_DESCRIPTION_LEN
    + HEADER_DATE_LEN
    + HEADER_CONTROLLER_LEN
    + HEADER_GEOMETRY_FIELDS * 4;

/// Serial bit rate of the drive
pub const BIT_RATE: u32 = 1_440_000;

/// Cylinders recorded in an emulator file
pub const NUM_CYLINDERS: u16 = 203;

/// Cylinders that hold user data in a flat image
pub const NUM_USER_CYLINDERS: u16 = 200;

/// Sectors per track
pub const SECTORS_PER_TRACK: u8 = 12;

/// Heads (surfaces)
pub const NUM_HEADS: u8 = 2;

/// Nominal sector duration
pub const MICROSECONDS_PER_SECTOR: u32 = 3333;

/// Allowed deviation from [`MICROSECONDS_PER_SECTOR`], in percent
pub const MICROSECONDS_TOLERANCE_PERCENT: u32 = 10;

/// Sector payload size in 16-bit words
pub const SECTOR_SIZE_WORDS: usize = 256;

/// Word size in bytes
pub const WORD_SIZE_BYTES: usize = 2;

/// Sector payload size in bytes
pub const SECTOR_SIZE: usize = SECTOR_SIZE_WORDS * WORD_SIZE_BYTES;

/// Bit times from sector pulse to the sync bit, as saved by the emulator
pub const SYNC_BIT_TIMES: u16 = 221;

/// Words after the sync bit: cylinder address, data, checksum and postamble
pub const DATA_WORDS_PER_SECTOR: u16 = 1 + SECTOR_SIZE_WORDS as u16 + 1 + 1;

/// Bits per data word
pub const DATA_WORD_BITS: u16 = 16;

/// Data bit count written for every encoded sector
pub const DATA_BITS_PER_SECTOR: u16 = DATA_WORDS_PER_SECTOR * DATA_WORD_BITS;

/// Size of the sync/data/address sub-header of a sector record
pub const SECTOR_HEADER_SIZE: usize = 3 * 2;

/// Postamble bytes written after each encoded sector's checksum
pub const POSTAMBLE_SIZE: usize = 2;

/// Size of an encoded sector record
pub const SECTOR_RECORD_SIZE: usize = SECTOR_HEADER_SIZE + SECTOR_SIZE + 2 + POSTAMBLE_SIZE;

/// Cylinder number is stored in the address word shifted by this amount
pub const CYLINDER_ADDRESS_SHIFT: u16 = 5;

/// Default header description
pub const DEFAULT_DESCRIPTION: &str = "GWiley RK05/RK11D Emulator image";

/// Default header controller name
pub const DEFAULT_CONTROLLER: &str = "RK11-D";

/// Header date format
pub const DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
