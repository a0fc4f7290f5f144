/*!
# rk05manager

A Rust library for converting RK05 disk images between the RK05/RK11-D
hardware emulator format and flat SimH images.

## Features

- Read and write emulator files: a 365 byte header followed by one record per
  sector with sync and data bit counts, cylinder address and checksum
- Header validation that reports every geometry mismatch at once
- Recoverable sector defects (bad checksum, short sector, wrong cylinder)
  collected into a report instead of aborting
- Flat image mapping with SimH head order and the three spare cylinders skipped
- Formatting with a fill pattern and block by block image comparison

## Quick Start

```rust,no_run
use rk05manager::{decode_image, open_emulator, create_flat, Geometry};

let geometry = Geometry::rk05();

// Validate the header and stream every sector into a flat image
let reader = open_emulator("rt11.rke", geometry.clone())?;
let mut flat = create_flat("rt11.dsk", geometry)?;
let report = decode_image(reader, Some(&mut flat))?;

println!("{} sectors, {} checksum errors", report.sectors_read, report.checksum_errors());
for defect in &report.defects {
    println!("{}: {}", defect.address, defect.defect);
}
# Ok::<(), rk05manager::RkError>(())
```

## Emulator File Layout

| Part          | Size                  | Byte order    |
|---------------|-----------------------|---------------|
| Header text   | 345 bytes, six fields | -             |
| Geometry      | five 32-bit words     | big-endian    |
| Sector record | 522 bytes each        | little-endian |

Records are stored cylinder by cylinder, head 0 before head 1, sectors in
order; 203 cylinders of 2 heads by 12 sectors of 512 bytes.

## Modules

- `format`: RK05 constants and drive geometry
- `image`: Header, sector record codec and fill patterns
- `io`: Emulator readers and writers, flat image access
- `convert`: Whole-disk passes and their reports
- `map`: Defect map visualization
- `dump`: Hex dumps of sector payloads
- `error`: Error types and Result alias
*/

#![warn(missing_docs)]

/// Whole-disk conversion passes
pub mod convert;
/// Hex dumps
pub mod dump;
/// Error types and Result alias
pub mod error;
/// RK05 constants and geometry
pub mod format;
/// Header, sector record codec and fill patterns
pub mod image;
/// I/O operations for emulator and flat image files
pub mod io;
/// Defect map visualization
pub mod map;

// Re-export commonly used types
pub use convert::{
    compare_images, decode_image, encode_image, format_image, image_name, CompareReport,
    DecodeReport, EncodeReport, Mode, Report, SectorReport,
};
pub use error::{Result, RkError};
pub use format::{Geometry, SectorAddress};
pub use image::{
    checksum, DecodedSector, EmulatorHeader, FillPattern, HeaderIssue, SectorDefect,
    SectorHeader,
};
pub use io::{
    create_emulator, create_flat, open_emulator, open_flat, EmulatorReader, EmulatorWriter,
    FlatImage,
};
pub use map::draw_defect_map;
