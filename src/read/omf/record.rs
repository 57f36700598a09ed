//! The transient record layer.
//!
//! [`parse_records`] walks the raw buffer and produces one [`Record`] per
//! self-delimited unit in the stream. Record kinds that feed the object
//! model (name lists, segment definitions, public/local symbol definitions,
//! enumerated data) are decoded into typed content; every other known kind
//! keeps its contents as an opaque byte copy.

use alloc::string::String;
use alloc::vec::Vec;

use crate::omf::{self, record_type};
use crate::read::{Error, Result};

/// One decoded record, linked to its neighbors only by position in the
/// returned sequence. Consumed by the object model builder.
#[derive(Debug, PartialEq)]
pub(super) struct Record {
    /// The record type code. Symbol definition variants are collapsed to
    /// their base type so the builder can dispatch on one code per kind.
    pub(super) kind: u8,
    pub(super) content: RecordContent,
}

/// Decoded record contents.
#[derive(Debug, PartialEq)]
pub(super) enum RecordContent {
    /// Verbatim contents of a record this crate does not interpret.
    Opaque(Vec<u8>),
    /// Entries of a name list record. A zero-length name stays as `None`
    /// so that later 1-based index references remain aligned.
    Names(Vec<Option<String>>),
    /// A segment definition.
    Segment(SegmentRecord),
    /// Entries of a public or local symbol definition record.
    Symbols(Vec<SymbolRecord>),
    /// Placement of an enumerated data record's contents.
    Data(DataRecord),
}

#[derive(Debug, PartialEq)]
pub(super) struct SegmentRecord {
    pub(super) name_index: u16,
    pub(super) size: u64,
    pub(super) use32: bool,
}

#[derive(Debug, PartialEq)]
pub(super) struct SymbolRecord {
    pub(super) name: String,
    pub(super) offset: u32,
    /// Segment index from the record header, stamped onto every entry.
    pub(super) segment_index: u16,
}

#[derive(Debug, PartialEq)]
pub(super) struct DataRecord {
    pub(super) segment_index: u16,
    /// Offset of the contents within the target segment.
    pub(super) offset: u32,
    pub(super) size: u64,
    /// Absolute position of the contents in the source buffer.
    pub(super) paddr: u64,
}

/// Split `data` into a sequence of validated records.
///
/// Any violation aborts the whole parse: there is no partial or
/// recoverable result.
pub(super) fn parse_records(data: &[u8]) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        // A record is at least a type byte, a length, and a checksum.
        if data.len() - pos < 4 {
            return Err(Error::TruncatedRecord);
        }
        let kind = data[pos];
        let size = u16::from_le_bytes([data[pos + 1], data[pos + 2]]);
        if size == 0 {
            // No room for the checksum byte the length must cover.
            return Err(Error::TruncatedRecord);
        }
        let end = pos + 3 + usize::from(size);
        if end > data.len() {
            return Err(Error::TruncatedRecord);
        }
        if !omf::is_record_type(kind) {
            return Err(Error::UnknownRecordType);
        }
        if !omf::checksum_ok(&data[pos..end]) {
            return Err(Error::ChecksumMismatch);
        }
        let content = decode_content(kind, &data[pos + 3..end - 1], pos as u64)?;
        records.push(Record {
            kind: normalize_kind(kind),
            content,
        });
        pos = end;
    }
    Ok(records)
}

/// Collapse a record type to the base code of its kind, so that later
/// index-ordered walks see one code per interpreted kind regardless of
/// the 16/32-bit or public/local variant decoded.
fn normalize_kind(kind: u8) -> u8 {
    match kind {
        record_type::SEGDEF32 => record_type::SEGDEF,
        record_type::PUBDEF32 | record_type::LPUBDEF | record_type::LPUBDEF32 => {
            record_type::PUBDEF
        }
        record_type::LEDATA32 => record_type::LEDATA,
        kind => kind,
    }
}

fn decode_content(kind: u8, contents: &[u8], record_pos: u64) -> Result<RecordContent> {
    match kind {
        record_type::LNAMES => decode_names(contents).map(RecordContent::Names),
        record_type::SEGDEF | record_type::SEGDEF32 => {
            decode_segdef(contents, kind == record_type::SEGDEF32).map(RecordContent::Segment)
        }
        record_type::PUBDEF
        | record_type::PUBDEF32
        | record_type::LPUBDEF
        | record_type::LPUBDEF32 => {
            // The 32-bit variant is always the odd type code.
            decode_pubdef(contents, kind & 1 != 0).map(RecordContent::Symbols)
        }
        record_type::LEDATA | record_type::LEDATA32 => {
            decode_ledata(contents, kind == record_type::LEDATA32, record_pos)
                .map(RecordContent::Data)
        }
        _ => {
            if contents.is_empty() {
                return Err(Error::EmptyRecord);
            }
            Ok(RecordContent::Opaque(contents.to_vec()))
        }
    }
}

/// Decode a name list record: a sequence of counted strings.
///
/// Two passes: the first counts and bounds-checks the entries, the second
/// allocates them.
fn decode_names(contents: &[u8]) -> Result<Vec<Option<String>>> {
    let mut count = 0;
    let mut pos = 0;
    while pos < contents.len() {
        let length = usize::from(contents[pos]);
        pos += 1 + length;
        if pos > contents.len() {
            return Err(Error::InvalidNameLength);
        }
        count += 1;
    }

    let mut names = Vec::with_capacity(count);
    pos = 0;
    while pos < contents.len() {
        let (name, consumed) =
            omf::read_counted_string(&contents[pos..]).ok_or(Error::InvalidNameLength)?;
        if name.is_empty() {
            // A zero-length name still occupies an index slot.
            names.push(None);
        } else {
            names.push(Some(String::from_utf8_lossy(name).into_owned()));
        }
        pos += consumed;
    }
    Ok(names)
}

/// Decode a segment definition record.
///
/// Only the segment name index, the resolved length, and the address width
/// survive; the class and overlay name indexes are decoded for bounds
/// checking and dropped.
fn decode_segdef(contents: &[u8], is_32bit: bool) -> Result<SegmentRecord> {
    let attributes = *contents.first().ok_or(Error::InvalidSegdefSize)?;
    let mut pos = 1;
    if attributes & omf::SEGDEF_FRAME_MASK == 0 {
        // Absolute frame: a 2-byte frame number and a 1-byte offset
        // precede the segment length.
        pos += 3;
    }

    let big = attributes & omf::SEGDEF_BIG != 0;
    let size = if is_32bit {
        if contents.len() < pos + 4 {
            return Err(Error::InvalidSegdefSize);
        }
        let raw = u32::from_le_bytes([
            contents[pos],
            contents[pos + 1],
            contents[pos + 2],
            contents[pos + 3],
        ]);
        pos += 4;
        if big {
            u64::from(u32::MAX)
        } else {
            u64::from(raw)
        }
    } else {
        if contents.len() < pos + 2 {
            return Err(Error::InvalidSegdefSize);
        }
        let raw = u16::from_le_bytes([contents[pos], contents[pos + 1]]);
        pos += 2;
        if big {
            u64::from(u16::MAX)
        } else {
            u64::from(raw)
        }
    };

    let (name_index, consumed) =
        omf::read_index(&contents[pos..]).ok_or(Error::InvalidSegdefSize)?;
    pos += consumed;

    // Class and overlay name indexes.
    let (_, consumed) = omf::read_index(&contents[pos..]).ok_or(Error::InvalidSegdefSize)?;
    pos += consumed;
    omf::read_index(&contents[pos..]).ok_or(Error::InvalidSegdefSize)?;

    Ok(SegmentRecord {
        name_index,
        size,
        use32: attributes & omf::SEGDEF_USE32 != 0,
    })
}

/// Decode a public or local symbol definition record.
///
/// The header carries a base group index and a base segment index; when
/// both are zero an extra 2-byte frame number follows and is skipped. The
/// entries are scanned twice: a dry pass sizes the output, a second pass
/// fills it in.
fn decode_pubdef(contents: &[u8], is_32bit: bool) -> Result<Vec<SymbolRecord>> {
    let (group_index, consumed) = omf::read_index(contents).ok_or(Error::InvalidPubdefSize)?;
    let mut pos = consumed;
    let (segment_index, consumed) =
        omf::read_index(&contents[pos..]).ok_or(Error::InvalidPubdefSize)?;
    pos += consumed;
    if group_index == 0 && segment_index == 0 {
        // Base frame number.
        pos += 2;
        if pos > contents.len() {
            return Err(Error::InvalidPubdefSize);
        }
    }

    let offset_size = if is_32bit { 4 } else { 2 };

    let mut count = 0;
    let mut scan = pos;
    while scan < contents.len() {
        let name_length = usize::from(contents[scan]);
        scan += 1 + name_length + offset_size;
        if scan > contents.len() {
            return Err(Error::InvalidPubdefSize);
        }
        // Trailing type index.
        let (_, consumed) = omf::read_index(&contents[scan..]).ok_or(Error::InvalidPubdefSize)?;
        scan += consumed;
        count += 1;
    }

    let mut symbols = Vec::with_capacity(count);
    while pos < contents.len() {
        let (name, consumed) =
            omf::read_counted_string(&contents[pos..]).ok_or(Error::InvalidPubdefSize)?;
        pos += consumed;
        let offset = if is_32bit {
            u32::from_le_bytes([
                contents[pos],
                contents[pos + 1],
                contents[pos + 2],
                contents[pos + 3],
            ])
        } else {
            u32::from(u16::from_le_bytes([contents[pos], contents[pos + 1]]))
        };
        pos += offset_size;
        let (_, consumed) = omf::read_index(&contents[pos..]).ok_or(Error::InvalidPubdefSize)?;
        pos += consumed;
        symbols.push(SymbolRecord {
            name: String::from_utf8_lossy(name).into_owned(),
            offset,
            segment_index,
        });
    }
    Ok(symbols)
}

/// Decode the placement header of an enumerated data record. The contents
/// themselves are not copied here; the builder copies them out of the
/// source buffer using the recorded position.
fn decode_ledata(contents: &[u8], is_32bit: bool, record_pos: u64) -> Result<DataRecord> {
    let (segment_index, consumed) = omf::read_index(contents).ok_or(Error::InvalidLedataSize)?;
    let mut pos = consumed;
    let offset = if is_32bit {
        if contents.len() < pos + 4 {
            return Err(Error::InvalidLedataSize);
        }
        let offset = u32::from_le_bytes([
            contents[pos],
            contents[pos + 1],
            contents[pos + 2],
            contents[pos + 3],
        ]);
        pos += 4;
        offset
    } else {
        if contents.len() < pos + 2 {
            return Err(Error::InvalidLedataSize);
        }
        let offset = u32::from(u16::from_le_bytes([contents[pos], contents[pos + 1]]));
        pos += 2;
        offset
    };

    Ok(DataRecord {
        segment_index,
        offset,
        size: (contents.len() - pos) as u64,
        // Type byte and length bytes precede the contents.
        paddr: record_pos + 3 + pos as u64,
    })
}
