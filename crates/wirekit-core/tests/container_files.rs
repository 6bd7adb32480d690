use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use wirekit_core::container::{
    ContainerError, ContainerOptions, ContainerWriter, build_report, is_container_magic,
    parse_container, read_magic,
};
use wirekit_core::crc32;
use wirekit_core::io::{ConcatReader, SharedSubsetReader, SubsetReader, read_exact_or_eof};

fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn container_survives_a_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let payload_path = dir.path().join("payload.bin");
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i * 7 % 256) as u8).collect();
    fs::write(&payload_path, &payload).unwrap();

    let options = ContainerOptions {
        chunk_size: 4096,
        ..ContainerOptions::default()
    };
    let mut writer = ContainerWriter::with_options(1_700_000_000, options);
    let mut input = File::open(&payload_path).unwrap();
    let size = writer
        .add_entry_from_reader("payload.bin", &mut input)
        .unwrap();
    assert_eq!(size, payload.len() as u64);
    writer.add_entry("note.txt", b"second entry").unwrap();
    let out_path = dir.path().join("out.wkc");
    fs::write(&out_path, writer.finish().unwrap()).unwrap();

    let mut file = File::open(&out_path).unwrap();
    let magic = read_magic(&mut file).unwrap().unwrap();
    assert!(is_container_magic(&magic));

    let bytes = fs::read(&out_path).unwrap();
    let container = parse_container(&bytes).unwrap();
    assert!(container.is_intact());
    assert_eq!(container.entries.len(), 2);
    assert_eq!(container.entries[0].payload, payload.as_slice());
    assert_eq!(container.entries[1].payload, b"second entry");

    let report = build_report(&container, "out.wkc", bytes.len() as u64);
    assert_eq!(report.container.created_at.as_deref(), Some("2023-11-14T22:13:20Z"));
    assert_eq!(report.entries[0].size, payload.len() as u64);
}

#[test]
fn truncated_container_is_rejected() {
    let mut writer = ContainerWriter::new(0);
    writer.add_entry("a", b"abcdef").unwrap();
    let bytes = writer.finish().unwrap();
    for cut in [1, 5, 10] {
        let truncated = &bytes[..bytes.len() - cut];
        assert!(parse_container(truncated).is_err(), "cut {cut}");
    }
    assert!(matches!(
        parse_container(&bytes[..10]),
        Err(ContainerError::TooShort { .. })
    ));
}

#[test]
fn subset_reader_exposes_an_entry_in_a_file() {
    let mut writer = ContainerWriter::new(0);
    writer.add_entry("x", b"window-me").unwrap();
    let bytes = writer.finish().unwrap();
    let container = parse_container(&bytes).unwrap();
    let payload = container.entries[0].payload;
    let offset = payload.as_ptr() as usize - bytes.as_ptr() as usize;

    let file = write_temp(&bytes);
    let mut window =
        SubsetReader::new(file.reopen().unwrap(), offset as u64, payload.len() as u64).unwrap();
    let mut out = String::new();
    window.read_to_string(&mut out).unwrap();
    assert_eq!(out, "window-me");

    window.seek(SeekFrom::Start(7)).unwrap();
    let mut tail = [0u8; 2];
    window.read_exact(&mut tail).unwrap();
    assert_eq!(&tail, b"me");
}

#[test]
fn shared_windows_over_one_file() {
    let file = write_temp(b"0123456789abcdefghij");
    let shared = Arc::new(Mutex::new(file.reopen().unwrap()));
    let mut digits = SharedSubsetReader::new(Arc::clone(&shared), 0, 10).unwrap();
    let mut letters = SharedSubsetReader::new(shared, 10, 10).unwrap();

    let mut a = [0u8; 5];
    let mut b = [0u8; 5];
    assert!(read_exact_or_eof(&mut letters, &mut b).unwrap());
    assert!(read_exact_or_eof(&mut digits, &mut a).unwrap());
    assert_eq!(&a, b"01234");
    assert_eq!(&b, b"abcde");

    let mut rest = Vec::new();
    digits.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, b"56789");
    assert!(!read_exact_or_eof(&mut digits, &mut a).unwrap());
}

#[test]
fn empty_file_has_no_magic() {
    let file = write_temp(&[]);
    let mut handle = file.reopen().unwrap();
    assert!(read_magic(&mut handle).unwrap().is_none());
}

#[test]
fn split_files_stream_back_as_one_entry() {
    let whole: Vec<u8> = (0..30_000u32).map(|i| (i % 253) as u8).collect();
    let parts = [
        write_temp(&whole[..12_345]),
        write_temp(&[]),
        write_temp(&whole[12_345..]),
    ];
    let handles: Vec<File> = parts.iter().map(|part| part.reopen().unwrap()).collect();
    let mut joined = ConcatReader::new(handles);

    let mut writer = ContainerWriter::new(0);
    let size = writer.add_entry_from_reader("joined.bin", &mut joined).unwrap();
    assert_eq!(size, whole.len() as u64);
    assert_eq!(joined.pending(), 0);

    let bytes = writer.finish().unwrap();
    let container = parse_container(&bytes).unwrap();
    assert_eq!(container.entries[0].payload, whole.as_slice());
    assert_eq!(container.entries[0].stored_crc, crc32(&whole));
    assert!(container.entries[0].crc_ok());
}
