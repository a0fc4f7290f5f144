/// Property tests for the sector codec and geometry mapping

use proptest::prelude::*;
use rk05manager::format::*;
use rk05manager::image::{write_sector, FixedString};
use rk05manager::*;
use std::io::Cursor;

fn address_strategy() -> impl Strategy<Value = SectorAddress> {
    (0..NUM_CYLINDERS, 0..NUM_HEADS, 0..SECTORS_PER_TRACK)
        .prop_map(|(cylinder, head, sector)| SectorAddress::new(cylinder, head, sector))
}

proptest! {
    #[test]
    fn encoded_sector_decodes_clean(
        data in prop::collection::vec(any::<u8>(), SECTOR_SIZE),
        address in address_strategy(),
    ) {
        let mut raw = Vec::new();
        write_sector(&mut raw, address.cylinder, &data).unwrap();
        prop_assert_eq!(raw.len(), SECTOR_RECORD_SIZE);

        let sector = DecodedSector::read_from(&mut Cursor::new(raw), address).unwrap();
        prop_assert!(sector.is_clean());
        prop_assert_eq!(sector.stored_checksum, Some(checksum(&data)));
        prop_assert_eq!(sector.data, data);
    }

    #[test]
    fn checksum_is_wrapping_word_sum(words in prop::collection::vec(any::<u16>(), 0..300)) {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let expected = words.iter().fold(0u16, |sum, w| sum.wrapping_add(*w));
        prop_assert_eq!(checksum(&bytes), expected);
    }

    #[test]
    fn flipped_payload_byte_is_detected(
        data in prop::collection::vec(any::<u8>(), SECTOR_SIZE),
        index in 0..SECTOR_SIZE,
        mask in 1..=255u8,
    ) {
        let mut raw = Vec::new();
        write_sector(&mut raw, 0, &data).unwrap();
        raw[SECTOR_HEADER_SIZE + index] ^= mask;

        let address = SectorAddress::new(0, 0, 0);
        let sector = DecodedSector::read_from(&mut Cursor::new(raw), address).unwrap();
        prop_assert_eq!(sector.defects.len(), 1);
        prop_assert_eq!(sector.defects[0].code(), 'C');
    }

    #[test]
    fn flat_offsets_stay_in_user_area(address in address_strategy()) {
        let geometry = Geometry::rk05();
        match geometry.flat_offset(address) {
            Some(offset) => {
                prop_assert!(address.cylinder < NUM_USER_CYLINDERS);
                prop_assert_eq!(offset % SECTOR_SIZE as u64, 0);
                prop_assert!(offset + SECTOR_SIZE as u64 <= geometry.flat_image_size());
            }
            None => prop_assert!(address.cylinder >= NUM_USER_CYLINDERS),
        }
    }

    #[test]
    fn head_swap_moves_by_one_track(
        cylinder in 0..NUM_USER_CYLINDERS,
        sector in 0..SECTORS_PER_TRACK,
    ) {
        let geometry = Geometry::rk05();
        let head0 = geometry.flat_offset(SectorAddress::new(cylinder, 0, sector)).unwrap();
        let head1 = geometry.flat_offset(SectorAddress::new(cylinder, 1, sector)).unwrap();
        prop_assert_eq!(head0 - head1, (SECTORS_PER_TRACK as usize * SECTOR_SIZE) as u64);
    }

    #[test]
    fn byte_pattern_fills_sector(byte in 1..=255u8) {
        let pattern: FillPattern = format!("{:x}", byte).parse().unwrap();
        prop_assert_eq!(pattern, FillPattern::Byte(byte));
        let sector = pattern.sector();
        prop_assert_eq!(sector.len(), SECTOR_SIZE);
        prop_assert!(sector.iter().all(|&b| b == byte));
    }

    #[test]
    fn fixed_string_keeps_terminator(text in "[ -~]{0,40}") {
        let field = FixedString::<11>::new(&text);
        let bytes = field.to_bytes();
        prop_assert!(field.as_str().len() <= 10);
        prop_assert!(text.starts_with(field.as_str()));
        prop_assert_eq!(bytes[10], 0);
        prop_assert_eq!(FixedString::<11>::from_bytes(&bytes), field);
    }
}
