//! Property tests for the integer codec, reader and writer.

use proptest::collection::vec;
use proptest::prelude::*;
use wirekit_core::{Crc32, Endian, ProtocolReader, ProtocolWriter, Width, WireError, crc32};

fn endian() -> impl Strategy<Value = Endian> {
    prop_oneof![Just(Endian::Big), Just(Endian::Little)]
}

fn width() -> impl Strategy<Value = Width> {
    prop_oneof![
        Just(Width::W8),
        Just(Width::W16),
        Just(Width::W24),
        Just(Width::W32),
        Just(Width::W64),
    ]
}

proptest! {
    #[test]
    fn unsigned_values_keep_low_bits(
        endian in endian(),
        width in width(),
        value in any::<u64>(),
        offset in 0usize..8
    ) {
        let mut buf = vec![0u8; offset + 8];
        endian.write_uint(&mut buf, offset, width, value).unwrap();
        let decoded = endian.read_uint(&buf, offset, width).unwrap();
        prop_assert_eq!(decoded, value & width.unsigned_max());
    }

    #[test]
    fn signed_values_in_range_survive(endian in endian(), value in -(1i64 << 23)..(1i64 << 23)) {
        let mut buf = [0u8; 3];
        endian.write_int(&mut buf, 0, Width::W24, value).unwrap();
        prop_assert_eq!(endian.read_int(&buf, 0, Width::W24).unwrap(), value);
    }

    #[test]
    fn byte_orders_mirror_each_other(width in width(), value in any::<u64>()) {
        let size = width.bytes();
        let mut big = vec![0u8; size];
        let mut little = vec![0u8; size];
        Endian::Big.write_uint(&mut big, 0, width, value).unwrap();
        Endian::Little.write_uint(&mut little, 0, width, value).unwrap();
        little.reverse();
        prop_assert_eq!(big, little);
    }

    #[test]
    fn reads_past_the_end_fail_cleanly(
        endian in endian(),
        width in width(),
        len in 0usize..16,
        offset in 0usize..16
    ) {
        let buf = vec![0xa5u8; len];
        let result = endian.read_uint(&buf, offset, width);
        if offset + width.bytes() <= len {
            prop_assert!(result.is_ok());
        } else {
            let is_out_of_bounds = matches!(result, Err(WireError::OutOfBounds { .. }));
            prop_assert!(is_out_of_bounds);
        }
    }

    #[test]
    fn writer_output_reads_back(values in vec((any::<u32>(), any::<i64>()), 0..64)) {
        let mut writer = ProtocolWriter::with_capacity(1);
        let count = writer.mark_u16_le();
        for (small, large) in &values {
            writer.write_u24_be(*small);
            writer.write_i64_le(*large);
        }
        count.set_value(&mut writer, values.len() as u16).unwrap();

        let mut reader = ProtocolReader::new(writer.data());
        prop_assert_eq!(usize::from(reader.read_u16_le().unwrap()), values.len());
        for (small, large) in &values {
            prop_assert_eq!(reader.read_u24_be().unwrap(), small & 0xff_ffff);
            prop_assert_eq!(reader.read_i64_le().unwrap(), *large);
        }
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn close_matches_bytes_written(body in vec(any::<u8>(), 0..4096)) {
        let mut writer = ProtocolWriter::with_capacity(8);
        let length = writer.mark_u24_be();
        writer.write_bytes(&body);
        prop_assert_eq!(length.close(&mut writer).unwrap(), body.len() as u64);

        let mut reader = ProtocolReader::new(writer.data());
        let declared = reader.read_u24_be().unwrap() as usize;
        prop_assert_eq!(reader.read_slice(declared).unwrap(), body.as_slice());
    }

    #[test]
    fn slices_stay_inside_their_parent(data in vec(any::<u8>(), 0..64), cut in 0usize..80) {
        let mut reader = ProtocolReader::new(&data);
        match reader.slice(cut) {
            Ok(mut child) => {
                prop_assert_eq!(child.available(), cut);
                prop_assert_eq!(reader.available(), data.len() - cut);
                let past_end = child.read_slice(cut + 1);
                let is_out_of_bounds = matches!(past_end, Err(WireError::OutOfBounds { .. }));
                prop_assert!(is_out_of_bounds);
            }
            Err(_) => {
                prop_assert!(cut > data.len());
                prop_assert_eq!(reader.available(), data.len());
            }
        }
    }

    #[test]
    fn crc_is_split_invariant(data in vec(any::<u8>(), 0..512), split in 0usize..512) {
        let split = split.min(data.len());
        let mut crc = Crc32::new();
        crc.update(&data[..split]);
        crc.update(&data[split..]);
        prop_assert_eq!(crc.value(), crc32(&data));
    }
}
