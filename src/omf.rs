//! Object Module Format (OMF) definitions.
//!
//! This module provides constants and low-level decoding helpers for the
//! record stream format defined by the TIS Relocatable Object Module Format
//! (OMF) Specification v1.1. A record is one self-delimited unit: a type
//! byte, a 2-byte little-endian length, the record contents, and a trailing
//! checksum byte covered by the length.

/// OMF record type constants.
pub mod record_type {
    /// Translator Header Record
    pub const THEADR: u8 = 0x80;
    /// Library Module Header Record
    pub const LHEADR: u8 = 0x82;
    /// Comment Record
    pub const COMENT: u8 = 0x88;
    /// Module End Record (16-bit)
    pub const MODEND: u8 = 0x8A;
    /// Module End Record (32-bit)
    pub const MODEND32: u8 = 0x8B;
    /// External Names Definition Record
    pub const EXTDEF: u8 = 0x8C;
    /// Public Names Definition Record (16-bit)
    pub const PUBDEF: u8 = 0x90;
    /// Public Names Definition Record (32-bit)
    pub const PUBDEF32: u8 = 0x91;
    /// Line Numbers Record (16-bit)
    pub const LINNUM: u8 = 0x94;
    /// Line Numbers Record (32-bit)
    pub const LINNUM32: u8 = 0x95;
    /// List of Names Record
    pub const LNAMES: u8 = 0x96;
    /// Segment Definition Record (16-bit)
    pub const SEGDEF: u8 = 0x98;
    /// Segment Definition Record (32-bit)
    pub const SEGDEF32: u8 = 0x99;
    /// Group Definition Record
    pub const GRPDEF: u8 = 0x9A;
    /// Fixup Record (16-bit)
    pub const FIXUPP: u8 = 0x9C;
    /// Fixup Record (32-bit)
    pub const FIXUPP32: u8 = 0x9D;
    /// Logical Enumerated Data Record (16-bit)
    pub const LEDATA: u8 = 0xA0;
    /// Logical Enumerated Data Record (32-bit)
    pub const LEDATA32: u8 = 0xA1;
    /// Logical Iterated Data Record (16-bit)
    pub const LIDATA: u8 = 0xA2;
    /// Logical Iterated Data Record (32-bit)
    pub const LIDATA32: u8 = 0xA3;
    /// Communal Names Definition Record
    pub const COMDEF: u8 = 0xB0;
    /// Backpatch Record (16-bit)
    pub const BAKPAT: u8 = 0xB2;
    /// Backpatch Record (32-bit)
    pub const BAKPAT32: u8 = 0xB3;
    /// Local External Names Definition Record (16-bit)
    pub const LEXTDEF: u8 = 0xB4;
    /// Local External Names Definition Record (32-bit)
    pub const LEXTDEF32: u8 = 0xB5;
    /// Local Public Names Definition Record (16-bit)
    pub const LPUBDEF: u8 = 0xB6;
    /// Local Public Names Definition Record (32-bit)
    pub const LPUBDEF32: u8 = 0xB7;
    /// Local Communal Names Definition Record
    pub const LCOMDEF: u8 = 0xB8;
    /// COMDAT External Names Definition Record
    pub const CEXTDEF: u8 = 0xBC;
    /// Initialized Communal Data Record (16-bit)
    pub const COMDAT: u8 = 0xC2;
    /// Initialized Communal Data Record (32-bit)
    pub const COMDAT32: u8 = 0xC3;
    /// Symbol Line Numbers Record (16-bit)
    pub const LINSYM: u8 = 0xC4;
    /// Symbol Line Numbers Record (32-bit)
    pub const LINSYM32: u8 = 0xC5;
    /// Alias Definition Record
    pub const ALIAS: u8 = 0xC6;
    /// Named Backpatch Record (16-bit)
    pub const NBKPAT: u8 = 0xC8;
    /// Named Backpatch Record (32-bit)
    pub const NBKPAT32: u8 = 0xC9;
    /// Local Logical Names Definition Record
    pub const LLNAMES: u8 = 0xCA;
    /// OMF Version Number Record
    pub const VERNUM: u8 = 0xCC;
    /// Vendor-specific OMF Extension Record
    pub const VENDEXT: u8 = 0xCE;
}

/// SEGDEF attribute bit: the segment uses 32-bit addressing (USE32).
pub const SEGDEF_USE32: u8 = 0x01;
/// SEGDEF attribute bit: the segment length is the maximum representable
/// value and the length field is not meaningful.
pub const SEGDEF_BIG: u8 = 0x02;
/// SEGDEF attribute mask selecting an absolute frame. When none of these
/// bits are set, a 2-byte frame number and a 1-byte offset precede the
/// segment length.
pub const SEGDEF_FRAME_MASK: u8 = 0x0E;

/// Check if a byte is a known OMF record type.
pub fn is_record_type(byte: u8) -> bool {
    use record_type::*;
    matches!(
        byte,
        THEADR
            | LHEADR
            | COMENT
            | MODEND
            | MODEND32
            | EXTDEF
            | PUBDEF
            | PUBDEF32
            | LINNUM
            | LINNUM32
            | LNAMES
            | SEGDEF
            | SEGDEF32
            | GRPDEF
            | FIXUPP
            | FIXUPP32
            | LEDATA
            | LEDATA32
            | LIDATA
            | LIDATA32
            | COMDEF
            | BAKPAT
            | BAKPAT32
            | LEXTDEF
            | LEXTDEF32
            | LPUBDEF
            | LPUBDEF32
            | LCOMDEF
            | CEXTDEF
            | COMDAT
            | COMDAT32
            | LINSYM
            | LINSYM32
            | ALIAS
            | NBKPAT
            | NBKPAT32
            | LLNAMES
            | VERNUM
            | VENDEXT
    )
}

/// Read an OMF index (1 or 2 bytes).
///
/// An index with the high bit of the first byte clear is that byte's value.
/// With the high bit set, the remaining 7 bits become the high byte of a
/// 2-byte big-endian value. Returns the value and the number of bytes
/// consumed, or `None` if the slice is too short.
pub fn read_index(data: &[u8]) -> Option<(u16, usize)> {
    let first = *data.first()?;
    if first & 0x80 == 0 {
        Some((u16::from(first), 1))
    } else {
        let second = *data.get(1)?;
        Some((u16::from(first & 0x7f) << 8 | u16::from(second), 2))
    }
}

/// Read a counted string (length byte followed by the string bytes).
///
/// Returns the string bytes and the number of bytes consumed. A zero
/// length is valid and yields an empty slice.
pub fn read_counted_string(data: &[u8]) -> Option<(&[u8], usize)> {
    let length = usize::from(*data.first()?);
    let bytes = data.get(1..1 + length)?;
    Some((bytes, 1 + length))
}

/// Verify the checksum of a full record span (type byte, length bytes,
/// contents, and checksum byte).
///
/// The checksum byte is chosen so that the sum of all bytes in the record
/// is 0 modulo 256. Some encoders write a 0 byte rather than computing the
/// checksum, so a trailing 0 is always accepted.
pub fn checksum_ok(record: &[u8]) -> bool {
    match record.last() {
        None => false,
        Some(0) => true,
        Some(_) => record.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte)) == 0,
    }
}
