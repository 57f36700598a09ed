//! OMF symbols.

use alloc::string::String;

/// A symbol from a public or local symbol definition record.
#[derive(Debug, Clone, PartialEq)]
pub struct OmfSymbol {
    /// The symbol name.
    pub name: String,
    /// 1-based index of the owning section.
    pub segment_index: u16,
    /// Offset of the symbol within its section.
    pub offset: u32,
}
