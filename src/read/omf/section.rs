//! OMF sections and data chunks.

use alloc::string::String;
use alloc::vec::Vec;

/// Section permission flag: readable.
pub const SECTION_FLAG_READ: u8 = 1 << 0;
/// Section permission flag: writable.
pub const SECTION_FLAG_WRITE: u8 = 1 << 1;
/// Section permission flag: executable.
pub const SECTION_FLAG_EXECUTE: u8 = 1 << 2;

/// A section built from one segment definition record.
#[derive(Debug, Clone, PartialEq)]
pub struct OmfSection {
    /// 1-based index into the object's name table, 0 when unnamed.
    pub name_index: u16,
    /// Declared segment length. The maximum representable value when the
    /// definition carried the "big segment" attribute.
    pub size: u64,
    /// Whether the segment uses 32-bit addressing.
    pub use32: bool,
    /// Virtual base address. Sections are laid out contiguously in
    /// definition order, starting at 0.
    pub vaddr: u64,
    /// Data chunks in file order. The chain is not sorted by offset;
    /// callers must scan it in order.
    pub data: Vec<OmfData>,
}

/// One owned chunk of section contents, from an enumerated data record.
#[derive(Debug, Clone, PartialEq)]
pub struct OmfData {
    /// Offset of the chunk within its section.
    pub offset: u32,
    /// Absolute position of the chunk's bytes in the source buffer.
    pub paddr: u64,
    /// The chunk bytes, copied out of the source buffer.
    pub bytes: Vec<u8>,
}

impl OmfData {
    /// The chunk length in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A loadable section descriptor materialized for a consuming host.
///
/// One descriptor is produced per data chunk; see
/// [`OmfObject::export_sections`](super::OmfObject::export_sections).
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDescriptor {
    /// `"<segment-name>_<n>"`, or `"no_name_<n>"` for unnamed segments,
    /// with `n` counting chunks per segment from 1.
    pub name: String,
    /// Size of the chunk in the file.
    pub size: u64,
    /// Size of the chunk in memory.
    pub vsize: u64,
    /// Physical address: the chunk's position in the source buffer.
    pub paddr: u64,
    /// Virtual load address of the chunk.
    pub vaddr: u64,
    /// Permission flags. OMF attribute bits are not consulted; every
    /// chunk is exported read+write+execute.
    pub flags: u8,
}
