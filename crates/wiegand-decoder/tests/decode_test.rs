//! Decoding frames built the way the capture builds them.

use bytes::Bytes;
use proptest::prelude::*;
use wiegand_core::Frame;
use wiegand_decoder::{FieldDecoder, WiegandFormat, decode_standard};

fn bits_of(raw: u64, count: usize) -> Vec<bool> {
    (0..count).rev().map(|i| (raw >> i) & 1 == 1).collect()
}

#[test]
fn test_34_bit_frame_round_trip() {
    let raw: u64 = 0x1_2345_678;
    let frame = Frame::from_bits(&bits_of(raw, 34));
    assert_eq!(frame.byte_len(), 5);
    assert_eq!(frame.raw_value(), raw);

    let event = FieldDecoder::default().decode_frame(&frame);
    assert_eq!(event.bit_count(), 34);
    assert_eq!(event.facility_code(), Some(((raw >> 17) & 0xFFFF) as u32));
    assert_eq!(event.card_code(), Some(((raw >> 1) & 0xFFFF) as u32));
}

#[test]
fn test_26_bit_frame_from_packed_bytes() {
    // 24 full bits then two in a right-aligned trailing byte
    let frame = Frame::new(26, Bytes::from_static(&[0x96, 0x44, 0x21, 0b10]));
    let raw = (0x96_44_21u64 << 2) | 0b10;
    assert_eq!(frame.raw_value(), raw);

    let event = decode_standard(26, frame.raw_value());
    assert_eq!(event.facility_code(), Some(((raw >> 17) & 0xFF) as u32));
    assert_eq!(event.card_code(), Some(((raw >> 1) & 0xFFFF) as u32));
}

#[test]
fn test_encoded_card_decodes_back() {
    let decoder = FieldDecoder::default();
    for format in [WiegandFormat::standard_26(), WiegandFormat::standard_34()] {
        let frame = Frame::from_bits(&format.encode(123, 45678));
        let event = decoder.decode_frame(&frame);
        assert_eq!(event.format(), Some(format.name()));
        assert_eq!(event.facility_code(), Some(123));
        assert_eq!(event.card_code(), Some(45678));
    }
}

proptest! {
    #[test]
    fn prop_decode_is_pure(bits in 0usize..=256, raw in any::<u64>()) {
        let decoder = FieldDecoder::default();
        prop_assert_eq!(decoder.decode(bits, raw), decoder.decode(bits, raw));
    }

    #[test]
    fn prop_only_26_and_34_produce_fields(bits in 0usize..=256, raw in any::<u64>()) {
        let event = decode_standard(bits, raw);
        prop_assert_eq!(event.is_recognized(), bits == 26 || bits == 34);
        prop_assert_eq!(event.raw_value(), raw);
    }

    #[test]
    fn prop_34_fields_match_shifts(raw in 0u64..(1 << 34)) {
        let event = decode_standard(34, raw);
        prop_assert_eq!(event.facility_code(), Some(((raw >> 17) & 0xFFFF) as u32));
        prop_assert_eq!(event.card_code(), Some(((raw >> 1) & 0xFFFF) as u32));
    }

    #[test]
    fn prop_encode_recovers_fields(facility in 0u32..=0xFFFF, card in 0u32..=0xFFFF) {
        let format = WiegandFormat::standard_34();
        let frame = Frame::from_bits(&format.encode(facility, card));
        prop_assert_eq!(format.extract(frame.raw_value()), (facility, card));
    }
}
