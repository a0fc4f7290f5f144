/// Integration tests for rk05manager

use rk05manager::format::*;
use rk05manager::*;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

fn fixed_header(name: &str) -> EmulatorHeader {
    EmulatorHeader::for_geometry(
        &Geometry::rk05(),
        name,
        DEFAULT_DESCRIPTION,
        "2024/03/15 12:00:00",
    )
}

/// Flat image whose every block starts with its own block number
fn numbered_flat_image(geometry: &Geometry) -> Vec<u8> {
    let mut image = vec![0u8; geometry.flat_image_size() as usize];
    for (block, chunk) in image.chunks_mut(SECTOR_SIZE).enumerate() {
        chunk[..4].copy_from_slice(&(block as u32).to_le_bytes());
        chunk[SECTOR_SIZE - 1] = 0xA5;
    }
    image
}

fn encode_to_vec(image: Vec<u8>, pattern: FillPattern) -> Vec<u8> {
    let geometry = Geometry::rk05();
    let mut flat = FlatImage::new(Cursor::new(image), geometry.clone());
    let mut raw = Vec::new();
    let writer = EmulatorWriter::new(&mut raw, geometry, &fixed_header("roundtrip")).unwrap();
    encode_image(&mut flat, writer, pattern).expect("Failed to encode");
    raw
}

#[test]
fn test_round_trip_through_emulator_format() {
    let geometry = Geometry::rk05();
    let image = numbered_flat_image(&geometry);
    let raw = encode_to_vec(image.clone(), FillPattern::Zero);
    assert_eq!(
        raw.len(),
        HEADER_SIZE + geometry.total_sectors() * SECTOR_RECORD_SIZE
    );

    let reader = EmulatorReader::new(Cursor::new(raw), geometry.clone()).expect("Bad header");
    assert_eq!(reader.header().image_name.as_str(), "roundtrip");
    let mut flat = FlatImage::new(Cursor::new(Vec::new()), geometry);
    let report = decode_image(reader, Some(&mut flat)).expect("Failed to decode");

    assert!(report.is_clean());
    assert_eq!(report.sectors_written, 4800);
    assert_eq!(flat.into_inner().into_inner(), image);
}

#[test]
fn test_block_zero_sits_on_head_one() {
    let geometry = Geometry::rk05();
    let raw = encode_to_vec(numbered_flat_image(&geometry), FillPattern::Zero);

    // Emulator order starts with head 0, which is the second track of a flat cylinder
    let first = HEADER_SIZE + SECTOR_HEADER_SIZE;
    assert_eq!(&raw[first..first + 4], &12u32.to_le_bytes());

    let thirteenth = HEADER_SIZE + 12 * SECTOR_RECORD_SIZE + SECTOR_HEADER_SIZE;
    assert_eq!(&raw[thirteenth..thirteenth + 4], &0u32.to_le_bytes());
}

#[test]
fn test_checksums_verify_after_encode() {
    let geometry = Geometry::rk05();
    let raw = encode_to_vec(numbered_flat_image(&geometry), FillPattern::Count);
    let mut cursor = Cursor::new(raw);
    let mut reader = EmulatorReader::new(&mut cursor, geometry.clone()).unwrap();

    for address in geometry.addresses() {
        let sector = reader.read_sector(address).unwrap();
        assert_eq!(sector.stored_checksum, Some(checksum(&sector.data)));
        assert_eq!(sector.header.cylinder(), address.cylinder);
        assert_eq!(sector.header.sync_bits, SYNC_BIT_TIMES);
        assert_eq!(sector.header.data_bits, DATA_BITS_PER_SECTOR);
    }
}

#[test]
fn test_geometry_mismatch_reports_every_field() {
    let mut header = fixed_header("bad");
    header.cylinders = 406;
    header.sectors_per_track = 16;
    header.microseconds_per_sector = 5000;
    header.magic = image::FixedString::new("WRONG");

    let mut raw = Vec::new();
    header.write_to(&mut raw).unwrap();

    let err = EmulatorReader::new(Cursor::new(raw), Geometry::rk05())
        .err()
        .expect("Header should be rejected");
    assert_eq!(
        err.to_string(),
        "Header validation failed: 3 geometry mismatch(es)"
    );
    let RkError::HeaderValidation(issues) = err else {
        panic!("Expected header validation failure");
    };

    assert_eq!(issues.len(), 4);
    assert!(!issues[0].is_fatal());
    assert_eq!(issues.iter().filter(|i| i.is_fatal()).count(), 3);
    let text: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
    assert!(text.contains(&"Unexpected number of cylinders: Expected 203, got 406".to_string()));
}

#[test]
fn test_fatal_header_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.rke");
    let output = dir.path().join("bad.dsk");

    let mut header = fixed_header("bad");
    header.heads = 1;
    let mut raw = Vec::new();
    header.write_to(&mut raw).unwrap();
    fs::write(&input, raw).unwrap();

    let mode = Mode::DecodeToFlat {
        input,
        output: output.clone(),
    };
    let err = mode.run(&Geometry::rk05()).unwrap_err();
    assert!(err.is_validation());
    assert!(!output.exists());
}

#[test]
fn test_short_sector_is_zero_extended() {
    let geometry = Geometry::rk05();
    let mut raw = Vec::new();
    fixed_header("short").write_to(&mut raw).unwrap();

    // 100 words of 0xFF, no checksum or postamble
    raw.extend_from_slice(&SYNC_BIT_TIMES.to_le_bytes());
    raw.extend_from_slice(&1600u16.to_le_bytes());
    raw.extend_from_slice(&0u16.to_le_bytes());
    raw.extend_from_slice(&[0xFF; 200]);
    for address in geometry.addresses().skip(1) {
        image::write_sector(&mut raw, address.cylinder, &[0u8; SECTOR_SIZE]).unwrap();
    }

    let reader = EmulatorReader::new(Cursor::new(raw), geometry.clone()).unwrap();
    let mut flat = FlatImage::new(Cursor::new(Vec::new()), geometry.clone());
    let report = decode_image(reader, Some(&mut flat)).unwrap();

    assert_eq!(report.short_sectors(), 1);
    assert_eq!(report.checksum_errors(), 0);
    assert_eq!(
        report.defects[0].defect,
        SectorDefect::ShortSector { words: 100 }
    );

    let image = flat.into_inner().into_inner();
    let block = geometry.flat_offset(SectorAddress::new(0, 0, 0)).unwrap() as usize;
    assert!(image[block..block + 200].iter().all(|&b| b == 0xFF));
    assert!(image[block + 200..block + SECTOR_SIZE].iter().all(|&b| b == 0));
}

#[test]
fn test_format_file_with_count_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("a-very-long-image-name.rke");

    let mode = Mode::Format {
        output: output.clone(),
        pattern: "ct".parse().unwrap(),
        description: "Scratch pack".to_string(),
    };
    let Report::Formatted(report) = mode.run(&Geometry::rk05()).unwrap() else {
        panic!("Expected a format report");
    };
    assert_eq!(report.sectors_written, 203 * 24);
    assert_eq!(report.sectors_filled, 203 * 24);

    let analyzed = Mode::Analyze { input: output }.run(&Geometry::rk05()).unwrap();
    let Report::Analyzed(decoded) = analyzed else {
        panic!("Expected an analyze report");
    };
    assert!(decoded.is_clean());
    assert_eq!(decoded.header.image_name.as_str(), "a-very-lon");
    assert_eq!(decoded.header.description.as_str(), "Scratch pack");
    assert_eq!(decoded.header.controller.as_str(), DEFAULT_CONTROLLER);
}

fn write_pair(dir: &tempfile::TempDir, first: &[u8], second: &[u8]) -> (PathBuf, PathBuf) {
    let a = dir.path().join("first.dsk");
    let b = dir.path().join("second.dsk");
    fs::write(&a, first).unwrap();
    fs::write(&b, second).unwrap();
    (a, b)
}

#[test]
fn test_compare_files() {
    let geometry = Geometry::rk05();
    let dir = tempfile::tempdir().unwrap();
    let image = numbered_flat_image(&geometry);
    let mut changed = image.clone();
    changed[137 * SECTOR_SIZE + 100] ^= 0x40;

    let (a, b) = write_pair(&dir, &image, &image);
    let Report::Compared(same) = (Mode::Compare { first: a, second: b })
        .run(&geometry)
        .unwrap()
    else {
        panic!("Expected a compare report");
    };
    assert!(same.is_identical());

    let (a, b) = write_pair(&dir, &image, &changed);
    let Report::Compared(diff) = (Mode::Compare { first: a, second: b })
        .run(&geometry)
        .unwrap()
    else {
        panic!("Expected a compare report");
    };
    assert_eq!(diff.mismatched_blocks, vec![137]);
    assert_eq!(diff.blocks_compared, 4800);
}

#[test]
fn test_file_round_trip() {
    let geometry = Geometry::rk05();
    let dir = tempfile::tempdir().unwrap();
    let flat_in = dir.path().join("in.dsk");
    let emulator = dir.path().join("disk.rke");
    let flat_out = dir.path().join("out.dsk");
    fs::write(&flat_in, numbered_flat_image(&geometry)).unwrap();

    Mode::EncodeFromFlat {
        input: flat_in.clone(),
        output: emulator.clone(),
        pattern: FillPattern::Byte(0xE5),
        description: DEFAULT_DESCRIPTION.to_string(),
    }
    .run(&geometry)
    .unwrap();
    Mode::DecodeToFlat {
        input: emulator,
        output: flat_out.clone(),
    }
    .run(&geometry)
    .unwrap();

    assert_eq!(fs::read(flat_in).unwrap(), fs::read(flat_out).unwrap());
}
