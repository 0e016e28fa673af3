use cphd::io::file_header::{FileHeader, SECTION_TERMINATOR_LEN};
use cphd::types::CphdError;
use std::io::Cursor;

mod common;

fn header_bytes(lines: &[&str]) -> Vec<u8> {
    let mut text = lines.join("\n");
    text.push_str("\n\x0c\n");
    text.into_bytes()
}

#[test]
fn test_offsets_without_support_block() {
    common::init_logging();

    let mut header = FileHeader::new("UNCLASSIFIED", "UNRESTRICTED");
    let size = header.set(500, 0, 4800, 96000).expect("Failed to resolve offsets");

    let text = header.to_string();
    println!("{}", text);
    assert!(!text.contains("SUPPORT_BLOCK_SIZE"));
    assert!(!text.contains("SUPPORT_BLOCK_BYTE_OFFSET"));
    assert_eq!(size, header.size());
    assert_eq!(header.xml_block_byte_offset(), size + SECTION_TERMINATOR_LEN);
    assert_eq!(header.pvp_block_byte_offset(), header.xml_block_byte_offset() + 500 + 2);
    assert_eq!(header.signal_block_byte_offset(), header.pvp_block_byte_offset() + 4800);
}

#[test]
fn test_set_twice_gives_identical_header() {
    let mut header = FileHeader::new("UNCLASSIFIED", "UNRESTRICTED");
    header.set(98, 7, 9_999_992, 99_999_999_992).expect("first set");
    let first = header.to_string();
    header.set(98, 7, 9_999_992, 99_999_999_992).expect("second set");
    assert_eq!(header.to_string(), first);
}

#[test]
fn test_offsets_are_self_consistent_across_digit_boundaries() {
    // Sizes chosen so that offsets cross a power of ten while resolving
    for xml in [1u64, 9, 10, 99, 900, 999, 9_000, 99_990] {
        let mut header = FileHeader::new("U", "R");
        header.set(xml, 0, 8, 8).expect("offsets resolve");
        assert_eq!(header.to_string().len() as u64, header.xml_block_byte_offset());
    }
}

#[test]
fn test_write_read_round_trip() {
    common::init_logging();

    for support in [0u64, 1024] {
        let mut header = FileHeader::new("SECRET//NOFORN", "RELEASE TO NONE");
        header.set(12_345, support, 2_160, 800_000).expect("Failed to resolve offsets");

        let mut bytes = Vec::new();
        header.write(&mut bytes).expect("Failed to write header");
        bytes.extend_from_slice(b"<CPHD/>");

        let read = FileHeader::read(&mut Cursor::new(bytes)).expect("Failed to read header");
        assert_eq!(read, header);
        assert_eq!(read.has_support_block(), support > 0);
        assert_eq!(read.classification(), "SECRET//NOFORN");
        assert_eq!(read.release_info(), "RELEASE TO NONE");
    }
}

#[test]
fn test_unknown_key_rejected() {
    let bytes = header_bytes(&[
        "CPHD/1.0",
        "XML_BLOCK_SIZE := 10",
        "XML_BLOCK_BYTE_OFFSET := 200",
        "PVP_BLOCK_SIZE := 8",
        "PVP_BLOCK_BYTE_OFFSET := 212",
        "SIGNAL_BLOCK_SIZE := 8",
        "SIGNAL_BLOCK_BYTE_OFFSET := 220",
        "CLASSIFICATION := UNCLASSIFIED",
        "RELEASE_INFO := UNRESTRICTED",
        "FAVORITE_COLOR := BLUE",
    ]);
    match FileHeader::read(&mut Cursor::new(bytes)) {
        Err(CphdError::UnknownHeaderKey(key)) => assert_eq!(key, "FAVORITE_COLOR"),
        other => panic!("expected an unknown key error, got {:?}", other),
    }
}

#[test]
fn test_missing_required_key_rejected() {
    let bytes = header_bytes(&[
        "CPHD/1.0",
        "XML_BLOCK_SIZE := 10",
        "XML_BLOCK_BYTE_OFFSET := 200",
        "PVP_BLOCK_SIZE := 8",
        "PVP_BLOCK_BYTE_OFFSET := 212",
        "SIGNAL_BLOCK_BYTE_OFFSET := 220",
        "CLASSIFICATION := UNCLASSIFIED",
        "RELEASE_INFO := UNRESTRICTED",
    ]);
    match FileHeader::read(&mut Cursor::new(bytes)) {
        Err(CphdError::IncompleteHeader(msg)) => assert!(msg.contains("SIGNAL_BLOCK_SIZE")),
        other => panic!("expected an incomplete header error, got {:?}", other),
    }
}

#[test]
fn test_bad_magic_and_version() {
    let bytes = header_bytes(&["SICD/1.0", "XML_BLOCK_SIZE := 10"]);
    assert!(matches!(
        FileHeader::read(&mut Cursor::new(bytes)),
        Err(CphdError::InvalidFormat(_))
    ));

    let bytes = header_bytes(&["CPHD/0.3", "XML_BLOCK_SIZE := 10"]);
    assert!(matches!(
        FileHeader::read(&mut Cursor::new(bytes)),
        Err(CphdError::UnsupportedVersion(_))
    ));
}

#[test]
fn test_non_numeric_size_rejected() {
    let bytes = header_bytes(&["CPHD/1.0", "XML_BLOCK_SIZE := ten"]);
    assert!(matches!(
        FileHeader::read(&mut Cursor::new(bytes)),
        Err(CphdError::InvalidFormat(_))
    ));
}

#[test]
fn test_missing_terminator_rejected() {
    let bytes = b"CPHD/1.0\nXML_BLOCK_SIZE := 10\n".to_vec();
    assert!(matches!(
        FileHeader::read(&mut Cursor::new(bytes)),
        Err(CphdError::InvalidFormat(_))
    ));
}
