/// Whole-disk passes: format, decode, encode, analyze and compare
///
/// Each pass walks the geometry once in emulator file order. The stream
/// functions work on any reader or writer; [`Mode::run`] opens the files.

use crate::dump::hex_dump;
use crate::error::Result;
use crate::format::{Geometry, SectorAddress};
use crate::image::{EmulatorHeader, FillPattern, HeaderIssue, SectorDefect};
use crate::io::{
    create_emulator, create_flat, open_emulator, open_flat, read_block, EmulatorReader,
    EmulatorWriter, FlatImage,
};
use log::{debug, info, log_enabled, warn, Level};
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};

/// A defect tied to the sector it was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorReport {
    /// Sector position in the emulator file
    pub address: SectorAddress,
    /// What was wrong
    pub defect: SectorDefect,
}

/// Outcome of decoding or analyzing an emulator file
#[derive(Debug, Clone)]
pub struct DecodeReport {
    /// Header as read
    pub header: EmulatorHeader,
    /// Non-fatal header issues
    pub header_issues: Vec<HeaderIssue>,
    /// Sector records decoded
    pub sectors_read: usize,
    /// Sectors stored into the flat image
    pub sectors_written: usize,
    /// Every sector defect, in file order
    pub defects: Vec<SectorReport>,
}

impl DecodeReport {
    /// No header issues and no sector defects
    pub fn is_clean(&self) -> bool {
        self.header_issues.is_empty() && self.defects.is_empty()
    }

    /// Number of checksum mismatches
    pub fn checksum_errors(&self) -> usize {
        self.count(|d| matches!(d, SectorDefect::ChecksumMismatch { .. }))
    }

    /// Number of short sectors
    pub fn short_sectors(&self) -> usize {
        self.count(|d| matches!(d, SectorDefect::ShortSector { .. }))
    }

    /// Number of cylinder address mismatches
    pub fn cylinder_mismatches(&self) -> usize {
        self.count(|d| matches!(d, SectorDefect::CylinderMismatch { .. }))
    }

    /// Defects found in one sector
    pub fn defects_at(&self, address: SectorAddress) -> impl Iterator<Item = &SectorDefect> {
        self.defects
            .iter()
            .filter(move |r| r.address == address)
            .map(|r| &r.defect)
    }

    fn count(&self, pred: impl Fn(&SectorDefect) -> bool) -> usize {
        self.defects.iter().filter(|r| pred(&r.defect)).count()
    }
}

/// Outcome of writing an emulator file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeReport {
    /// Sector records written
    pub sectors_written: usize,
    /// Sectors whose payload came from a flat image
    pub sectors_from_image: usize,
    /// Sectors filled with the fill pattern
    pub sectors_filled: usize,
}

/// Outcome of comparing two flat images
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompareReport {
    /// Blocks examined
    pub blocks_compared: usize,
    /// Indices of blocks that differ
    pub mismatched_blocks: Vec<usize>,
}

impl CompareReport {
    /// True when every block matched
    pub fn is_identical(&self) -> bool {
        self.mismatched_blocks.is_empty()
    }
}

/// Operation selected on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Write a freshly formatted emulator file
    Format {
        /// Emulator file to create
        output: PathBuf,
        /// Sector contents
        pattern: FillPattern,
        /// Header description
        description: String,
    },
    /// Convert an emulator file to a flat image
    DecodeToFlat {
        /// Emulator file
        input: PathBuf,
        /// Flat image to create
        output: PathBuf,
    },
    /// Convert a flat image to an emulator file
    EncodeFromFlat {
        /// Flat image
        input: PathBuf,
        /// Emulator file to create
        output: PathBuf,
        /// Contents of the spare cylinders
        pattern: FillPattern,
        /// Header description
        description: String,
    },
    /// Validate an emulator file without writing anything
    Analyze {
        /// Emulator file
        input: PathBuf,
    },
    /// Compare two flat images block by block
    Compare {
        /// First flat image
        first: PathBuf,
        /// Second flat image
        second: PathBuf,
    },
}

/// Result of [`Mode::run`]
#[derive(Debug, Clone)]
pub enum Report {
    /// From [`Mode::Format`]
    Formatted(EncodeReport),
    /// From [`Mode::DecodeToFlat`]
    Decoded(DecodeReport),
    /// From [`Mode::EncodeFromFlat`]
    Encoded(EncodeReport),
    /// From [`Mode::Analyze`]
    Analyzed(DecodeReport),
    /// From [`Mode::Compare`]
    Compared(CompareReport),
}

impl Mode {
    /// Short name of the operation
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Format { .. } => "format",
            Mode::DecodeToFlat { .. } => "tosimh",
            Mode::EncodeFromFlat { .. } => "fromsimh",
            Mode::Analyze { .. } => "analyze",
            Mode::Compare { .. } => "compare",
        }
    }

    /// Files that must exist before running
    pub fn inputs(&self) -> Vec<&Path> {
        match self {
            Mode::Format { .. } => vec![],
            Mode::DecodeToFlat { input, .. }
            | Mode::EncodeFromFlat { input, .. }
            | Mode::Analyze { input } => vec![input.as_path()],
            Mode::Compare { first, second } => vec![first.as_path(), second.as_path()],
        }
    }

    /// File that will be created or overwritten
    pub fn output(&self) -> Option<&Path> {
        match self {
            Mode::Format { output, .. }
            | Mode::DecodeToFlat { output, .. }
            | Mode::EncodeFromFlat { output, .. } => Some(output.as_path()),
            Mode::Analyze { .. } | Mode::Compare { .. } => None,
        }
    }

    /// Run the operation
    ///
    /// A fatal error part way through leaves a partially written output file.
    pub fn run(&self, geometry: &Geometry) -> Result<Report> {
        match self {
            Mode::Format {
                output,
                pattern,
                description,
            } => {
                let header = EmulatorHeader::new(&image_name(output), description);
                let writer = create_emulator(output, geometry.clone(), &header)?;
                format_image(writer, *pattern).map(Report::Formatted)
            }
            Mode::DecodeToFlat { input, output } => {
                let reader = open_emulator(input, geometry.clone())?;
                let mut flat = create_flat(output, geometry.clone())?;
                let report = decode_image(reader, Some(&mut flat))?;
                flat.flush()?;
                Ok(Report::Decoded(report))
            }
            Mode::EncodeFromFlat {
                input,
                output,
                pattern,
                description,
            } => {
                let mut flat = open_flat(input, geometry.clone())?;
                let header = EmulatorHeader::new(&image_name(input), description);
                let writer = create_emulator(output, geometry.clone(), &header)?;
                encode_image(&mut flat, writer, *pattern).map(Report::Encoded)
            }
            Mode::Analyze { input } => {
                let reader = open_emulator(input, geometry.clone())?;
                decode_image::<_, File>(reader, None).map(Report::Analyzed)
            }
            Mode::Compare { first, second } => {
                let first = BufReader::new(File::open(first)?);
                let second = BufReader::new(File::open(second)?);
                compare_images(first, second, geometry).map(Report::Compared)
            }
        }
    }
}

/// Image name stored in a header: the file name part of `path`
pub fn image_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Fill every sector of a new emulator file with `pattern`
pub fn format_image<W: Write>(
    writer: EmulatorWriter<W>,
    pattern: FillPattern,
) -> Result<EncodeReport> {
    write_all_sectors(writer, pattern, |_| Ok(None))
}

/// Write every sector of an emulator file from a flat image
///
/// Spare cylinders, which the flat image does not hold, get `pattern`.
pub fn encode_image<F: Read + Seek, W: Write>(
    flat: &mut FlatImage<F>,
    writer: EmulatorWriter<W>,
    pattern: FillPattern,
) -> Result<EncodeReport> {
    write_all_sectors(writer, pattern, |address| flat.read_sector(address))
}

fn write_all_sectors<W, S>(
    mut writer: EmulatorWriter<W>,
    pattern: FillPattern,
    mut source: S,
) -> Result<EncodeReport>
where
    W: Write,
    S: FnMut(SectorAddress) -> Result<Option<Vec<u8>>>,
{
    let fill = pattern.sector();
    let geometry = writer.geometry().clone();
    let mut report = EncodeReport::default();

    geometry.for_each_sector(|address| {
        match source(address)? {
            Some(data) => {
                writer.write_sector(address, &data)?;
                report.sectors_from_image += 1;
            }
            None => {
                writer.write_sector(address, &fill)?;
                report.sectors_filled += 1;
            }
        }
        report.sectors_written += 1;
        Ok(())
    })?;

    writer.finish()?;
    info!(
        "Wrote {} sectors ({} from image, {} filled with {})",
        report.sectors_written, report.sectors_from_image, report.sectors_filled, pattern
    );
    Ok(report)
}

/// Decode every sector of an emulator file
///
/// With a flat image, user cylinders are stored into it; spare cylinders are
/// decoded and checked but not stored. Without one the file is only analyzed.
pub fn decode_image<R: Read, F: Write + Seek>(
    mut reader: EmulatorReader<R>,
    mut flat: Option<&mut FlatImage<F>>,
) -> Result<DecodeReport> {
    let geometry = reader.geometry().clone();
    let mut report = DecodeReport {
        header: reader.header().clone(),
        header_issues: reader.header_issues().to_vec(),
        sectors_read: 0,
        sectors_written: 0,
        defects: Vec::new(),
    };

    geometry.for_each_sector(|address| {
        let sector = reader.read_sector(address)?;
        report.sectors_read += 1;

        info!(
            "Sync Bits {}, Data Bits {}, Data Bytes: {}, {}",
            sector.header.sync_bits,
            sector.header.data_bits,
            sector.header.bytes_of_data(),
            address
        );
        for defect in &sector.defects {
            warn!("{}: {}", address, defect);
            report.defects.push(SectorReport {
                address,
                defect: *defect,
            });
        }
        if log_enabled!(Level::Debug) {
            debug!("{}\n{}", address, hex_dump(&sector.data));
            if sector.postamble_len > 0 {
                debug!("Postamble: {} bytes", sector.postamble_len);
            }
        }

        if let Some(flat) = flat.as_deref_mut() {
            if flat.write_sector(address, &sector.data)? {
                report.sectors_written += 1;
            }
        }
        Ok(())
    })?;

    info!(
        "Read {} sectors: {} checksum errors, {} short sectors, {} cylinder mismatches",
        report.sectors_read,
        report.checksum_errors(),
        report.short_sectors(),
        report.cylinder_mismatches()
    );
    Ok(report)
}

/// Compare the user area of two flat images block by block
///
/// Every block is examined; a missing or short block compares by its content.
pub fn compare_images<A: Read, B: Read>(
    mut first: A,
    mut second: B,
    geometry: &Geometry,
) -> Result<CompareReport> {
    let mut report = CompareReport::default();

    for block in 0..geometry.user_sectors() {
        let a = read_block(&mut first, geometry.sector_size)?;
        let b = read_block(&mut second, geometry.sector_size)?;
        if a != b {
            warn!("SimH file compare error block {}", block);
            report.mismatched_blocks.push(block);
        }
        report.blocks_compared += 1;
    }

    Ok(report)
}
