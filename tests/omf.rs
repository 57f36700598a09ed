//! Integration tests building synthetic OMF record streams.

use omf_read::omf::record_type;
use omf_read::read::{
    Error, OmfObject, SECTION_FLAG_EXECUTE, SECTION_FLAG_READ, SECTION_FLAG_WRITE,
};

/// Encode one record with a valid checksum.
fn record(kind: u8, contents: &[u8]) -> Vec<u8> {
    let size = (contents.len() + 1) as u16;
    let mut out = vec![kind];
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(contents);
    let sum = out.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte));
    out.push(0u8.wrapping_sub(sum));
    out
}

/// A 16-bit SEGDEF with byte alignment and public combination.
fn segdef16(name_index: u8, size: u16) -> Vec<u8> {
    let mut contents = vec![0x28];
    contents.extend_from_slice(&size.to_le_bytes());
    contents.extend_from_slice(&[name_index, 0x00, 0x00]);
    record(record_type::SEGDEF, &contents)
}

/// A 32-bit SEGDEF (USE32 set) with byte alignment and public combination.
fn segdef32(name_index: u8, size: u32) -> Vec<u8> {
    let mut contents = vec![0x29];
    contents.extend_from_slice(&size.to_le_bytes());
    contents.extend_from_slice(&[name_index, 0x00, 0x00]);
    record(record_type::SEGDEF32, &contents)
}

/// A 16-bit LEDATA carrying `bytes` at `offset` in segment `segment_index`.
fn ledata16(segment_index: u8, offset: u16, bytes: &[u8]) -> Vec<u8> {
    let mut contents = vec![segment_index];
    contents.extend_from_slice(&offset.to_le_bytes());
    contents.extend_from_slice(bytes);
    record(record_type::LEDATA, &contents)
}

/// A 16-bit PUBDEF declaring one symbol in segment `segment_index`.
fn pubdef16(segment_index: u8, name: &str, offset: u16) -> Vec<u8> {
    let mut contents = vec![0x00, segment_index];
    if segment_index == 0 {
        // Base frame, present when both group and segment index are 0.
        contents.extend_from_slice(&[0x00, 0x00]);
    }
    contents.push(name.len() as u8);
    contents.extend_from_slice(name.as_bytes());
    contents.extend_from_slice(&offset.to_le_bytes());
    contents.push(0x00);
    record(record_type::PUBDEF, &contents)
}

fn lnames(names: &[&str]) -> Vec<u8> {
    let mut contents = Vec::new();
    for name in names {
        contents.push(name.len() as u8);
        contents.extend_from_slice(name.as_bytes());
    }
    record(record_type::LNAMES, &contents)
}

#[test]
fn name_list_round_trip() {
    let data = lnames(&["foo", "", "bar"]);
    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(object.names().len(), 3);
    assert_eq!(object.name(1), Some("foo"));
    assert_eq!(object.name(2), None);
    assert_eq!(object.name(3), Some("bar"));
    assert_eq!(object.name(0), None);
    assert_eq!(object.name(4), None);
}

#[test]
fn section_vaddrs_are_contiguous() {
    let mut data = lnames(&["CODE", "DATA", "BSS"]);
    data.extend_from_slice(&segdef16(1, 0x100));
    data.extend_from_slice(&segdef16(2, 0x80));
    data.extend_from_slice(&segdef16(3, 0x40));
    let object = OmfObject::parse(&data).unwrap();
    let sections = object.sections();
    assert_eq!(sections.len(), 3);
    assert_eq!(sections[0].vaddr, 0);
    assert_eq!(sections[1].vaddr, 0x100);
    assert_eq!(sections[2].vaddr, 0x180);
    for window in sections.windows(2) {
        assert!(window[1].vaddr >= window[0].vaddr);
        assert_eq!(window[1].vaddr, window[0].vaddr + window[0].size);
    }
}

#[test]
fn data_chunk_with_bad_segment_index_aborts() {
    let data = ledata16(1, 0, &[0xde, 0xad]);
    assert_eq!(OmfObject::parse(&data), Err(Error::InvalidSectionReference));

    let mut data = lnames(&["CODE"]);
    data.extend_from_slice(&segdef16(1, 0x10));
    data.extend_from_slice(&ledata16(2, 0, &[0xde, 0xad]));
    assert_eq!(OmfObject::parse(&data), Err(Error::InvalidSectionReference));
}

#[test]
fn symbol_with_bad_segment_index_aborts() {
    let mut data = segdef16(0, 0x10);
    data.extend_from_slice(&pubdef16(2, "sym", 0));
    assert_eq!(OmfObject::parse(&data), Err(Error::InvalidSectionReference));

    let mut data = segdef16(0, 0x10);
    data.extend_from_slice(&pubdef16(0, "sym", 0));
    assert_eq!(OmfObject::parse(&data), Err(Error::InvalidSectionReference));
}

#[test]
fn boundary_segment_index_is_valid() {
    let mut data = segdef16(0, 0x10);
    data.extend_from_slice(&segdef16(0, 0x10));
    data.extend_from_slice(&ledata16(2, 0, &[0x90]));
    data.extend_from_slice(&pubdef16(2, "sym", 0));
    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(object.sections()[1].data.len(), 1);
    assert_eq!(object.symbols()[0].segment_index, 2);
}

#[test]
fn entry_point_addresses() {
    let mut data = lnames(&["CODE"]);
    data.extend_from_slice(&segdef16(1, 0x100));
    let ledata_start = data.len() as u64;
    data.extend_from_slice(&ledata16(1, 0, &[0x90; 0x10]));
    data.extend_from_slice(&pubdef16(1, "_start", 5));

    // Record header (3 bytes), segment index (1), offset (2).
    let chunk_paddr = ledata_start + 6;

    let object = OmfObject::parse_with_base(&data, 0).unwrap();
    assert_eq!(object.entry_point(), Some((5, chunk_paddr + 5)));

    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(
        object.entry_point(),
        Some((object.base_addr() + 5, chunk_paddr + 5))
    );
}

#[test]
fn entry_point_missing() {
    let mut data = segdef16(0, 0x10);
    data.extend_from_slice(&pubdef16(1, "main", 0));
    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(object.entry_point(), None);
}

#[test]
fn entry_point_not_covered_by_data() {
    // _start at offset 0x20, but the only chunk covers [0, 0x10).
    let mut data = segdef16(0, 0x100);
    data.extend_from_slice(&ledata16(1, 0, &[0x90; 0x10]));
    data.extend_from_slice(&pubdef16(1, "_start", 0x20));
    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(object.entry_point(), None);
}

#[test]
fn entry_point_below_first_chunk() {
    // _start at offset 5, but the only chunk covers [0x100, 0x110).
    let mut data = segdef16(0, 0x200);
    data.extend_from_slice(&ledata16(1, 0x100, &[0x90; 0x10]));
    data.extend_from_slice(&pubdef16(1, "_start", 5));
    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(object.entry_point(), None);
    assert_eq!(object.symbol_paddr(&object.symbols()[0]), 0);
}

#[test]
fn truncated_record_aborts() {
    let mut data = segdef16(0, 0x10);
    data.extend_from_slice(&[record_type::LNAMES, 0xff, 0x00, 0x03]);
    assert_eq!(OmfObject::parse(&data), Err(Error::TruncatedRecord));

    // A bare 3-byte header is also too short.
    let data = [record_type::COMENT, 0x02, 0x00];
    assert_eq!(OmfObject::parse(&data), Err(Error::TruncatedRecord));
}

#[test]
fn checksum_is_enforced() {
    let mut data = lnames(&["CODE"]);
    let last = data.len() - 2;
    data[last] ^= 0x01;
    assert_eq!(OmfObject::parse(&data), Err(Error::ChecksumMismatch));

    // A zero checksum byte means "not computed" and is accepted.
    let mut data = lnames(&["CODE"]);
    let last = data.len() - 1;
    data[last] = 0;
    assert!(OmfObject::parse(&data).is_ok());
}

#[test]
fn unknown_record_type_aborts() {
    let data = record(0x42, &[0x00]);
    assert_eq!(OmfObject::parse(&data), Err(Error::UnknownRecordType));
}

#[test]
fn address_width_inference() {
    let object = OmfObject::parse(&[]).unwrap();
    assert_eq!(object.address_width(), 16);

    let data = segdef16(0, 0x10);
    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(object.address_width(), 16);

    let data = segdef32(0, 0x10);
    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(object.address_width(), 32);

    let mut data = segdef16(0, 0x10);
    data.extend_from_slice(&segdef32(0, 0x10));
    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(object.address_width(), 32);

    let mut data = segdef32(0, 0x10);
    data.extend_from_slice(&segdef16(0, 0x10));
    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(object.address_width(), 32);
}

#[test]
fn symbol_address_resolution() {
    let mut data = lnames(&["CODE", "DATA"]);
    data.extend_from_slice(&segdef16(1, 0x100));
    data.extend_from_slice(&segdef16(2, 0x80));
    let chunk_record = data.len() as u64;
    data.extend_from_slice(&ledata16(2, 0, &[0xaa; 0x20]));
    data.extend_from_slice(&pubdef16(2, "value", 0x08));
    let object = OmfObject::parse_with_base(&data, 0x1000).unwrap();

    let symbol = &object.symbols()[0];
    // Section 2 starts at 0x100.
    assert_eq!(object.symbol_vaddr(symbol), 0x1000 + 0x100 + 0x08);
    assert_eq!(object.symbol_paddr(symbol), chunk_record + 6 + 0x08);
}

#[test]
fn exported_descriptors_cover_every_chunk() {
    let mut data = lnames(&["CODE"]);
    data.extend_from_slice(&segdef16(1, 0x100));
    data.extend_from_slice(&segdef16(0, 0x100));
    let first_chunk = data.len() as u64 + 6;
    data.extend_from_slice(&ledata16(1, 0x00, &[0x90; 0x10]));
    data.extend_from_slice(&ledata16(1, 0x10, &[0xcc; 0x08]));
    data.extend_from_slice(&ledata16(2, 0x00, &[0x11; 0x04]));
    let object = OmfObject::parse_with_base(&data, 0x1000).unwrap();

    let descriptors = object.export_all_sections();
    assert_eq!(descriptors.len(), 3);

    assert_eq!(descriptors[0].name, "CODE_1");
    assert_eq!(descriptors[0].size, 0x10);
    assert_eq!(descriptors[0].vsize, 0x10);
    assert_eq!(descriptors[0].paddr, first_chunk);
    assert_eq!(descriptors[0].vaddr, 0x1000);
    assert_eq!(
        descriptors[0].flags,
        SECTION_FLAG_READ | SECTION_FLAG_WRITE | SECTION_FLAG_EXECUTE
    );

    assert_eq!(descriptors[1].name, "CODE_2");
    assert_eq!(descriptors[1].size, 0x08);
    assert_eq!(descriptors[1].vaddr, 0x1000 + 0x10);

    // The second section is unnamed and starts at vaddr 0x100.
    assert_eq!(descriptors[2].name, "no_name_1");
    assert_eq!(descriptors[2].vaddr, 0x1000 + 0x100);
}

#[test]
fn chunk_bytes_are_owned_copies() {
    let mut data = segdef16(0, 0x10);
    data.extend_from_slice(&ledata16(1, 0, &[0xde, 0xad, 0xbe, 0xef]));
    let object = OmfObject::parse(&data).unwrap();
    drop(data);
    let chunk = &object.sections()[0].data[0];
    assert_eq!(chunk.bytes, [0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(chunk.size(), 4);
}

#[test]
fn big_segment_uses_sentinel_maximum() {
    // Attribute 0x2a: byte aligned, public, big flag set.
    let contents = [0x2a, 0x34, 0x12, 0x00, 0x00, 0x00];
    let data = record(record_type::SEGDEF, &contents);
    let object = OmfObject::parse(&data).unwrap();
    assert_eq!(object.sections()[0].size, u64::from(u16::MAX));
}
