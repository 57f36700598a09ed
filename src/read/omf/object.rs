//! The aggregated OMF object model and its query operations.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::omf::record_type;
use crate::read::omf::record::{self, RecordContent};
use crate::read::omf::{
    OmfData, OmfSection, OmfSymbol, SectionDescriptor, BASE_ADDR, SECTION_FLAG_EXECUTE,
    SECTION_FLAG_READ, SECTION_FLAG_WRITE,
};
use crate::read::{Error, Result};

/// The name of the symbol used as the program entry point.
const ENTRY_SYMBOL: &str = "_start";

/// A fully decoded OMF module.
///
/// Owns flat name, section and symbol tables aggregated from the record
/// stream. All cross-references between tables are 1-based; index 0 means
/// "none". The object holds no reference to the buffer it was parsed
/// from: data chunk bytes are copied out during aggregation.
#[derive(Debug, PartialEq)]
pub struct OmfObject {
    names: Vec<Option<String>>,
    sections: Vec<OmfSection>,
    symbols: Vec<OmfSymbol>,
    base_addr: u64,
}

impl OmfObject {
    /// Parse a complete OMF module from `data`.
    ///
    /// The whole buffer is decoded in one pass; any malformed record
    /// aborts the load with no partial result. Virtual addresses are
    /// biased by [`BASE_ADDR`].
    pub fn parse(data: &[u8]) -> Result<OmfObject> {
        OmfObject::parse_with_base(data, BASE_ADDR)
    }

    /// Parse a complete OMF module, biasing virtual addresses by
    /// `base_addr` instead of [`BASE_ADDR`].
    pub fn parse_with_base(data: &[u8], base_addr: u64) -> Result<OmfObject> {
        let records = record::parse_records(data)?;

        let mut object = OmfObject {
            names: Vec::new(),
            sections: Vec::new(),
            symbols: Vec::new(),
            base_addr,
        };

        // Name list entries, in file order. Placeholders are kept so the
        // 1-based reference space stays aligned.
        for record in records.iter().filter(|record| record.kind == record_type::LNAMES) {
            if let RecordContent::Names(names) = &record.content {
                object.names.extend_from_slice(names);
            }
        }

        // Segment definitions, in file order, laid out contiguously.
        for record in records.iter().filter(|record| record.kind == record_type::SEGDEF) {
            if let RecordContent::Segment(segment) = &record.content {
                let vaddr = match object.sections.last() {
                    Some(prev) => prev.vaddr + prev.size,
                    None => 0,
                };
                object.sections.push(OmfSection {
                    name_index: segment.name_index,
                    size: segment.size,
                    use32: segment.use32,
                    vaddr,
                    data: Vec::new(),
                });
            }
        }

        // Data chunks are appended to their section's chain in file order,
        // copying the referenced bytes out of the source buffer.
        for record in records.iter().filter(|record| record.kind == record_type::LEDATA) {
            if let RecordContent::Data(data_record) = &record.content {
                let section = object
                    .section_index(data_record.segment_index)
                    .ok_or(Error::InvalidSectionReference)?;
                let start = data_record.paddr as usize;
                let end = start + data_record.size as usize;
                let bytes = data
                    .get(start..end)
                    .ok_or(Error::InvalidLedataSize)?
                    .to_vec();
                object.sections[section].data.push(OmfData {
                    offset: data_record.offset,
                    paddr: data_record.paddr,
                    bytes,
                });
            }
        }

        // Symbol entries, in file order, with duplicated name ownership.
        for record in records.iter().filter(|record| record.kind == record_type::PUBDEF) {
            if let RecordContent::Symbols(symbols) = &record.content {
                for symbol in symbols {
                    object
                        .section_index(symbol.segment_index)
                        .ok_or(Error::InvalidSectionReference)?;
                    object.symbols.push(OmfSymbol {
                        name: symbol.name.clone(),
                        segment_index: symbol.segment_index,
                        offset: symbol.offset,
                    });
                }
            }
        }

        // The transient record sequence is dropped here; all surviving
        // state is owned by the object.
        Ok(object)
    }

    /// Convert a 1-based segment reference to a section table position.
    fn section_index(&self, segment_index: u16) -> Option<usize> {
        let index = usize::from(segment_index).checked_sub(1)?;
        if index < self.sections.len() {
            Some(index)
        } else {
            None
        }
    }

    fn symbol_section(&self, symbol: &OmfSymbol) -> Option<&OmfSection> {
        self.section_index(symbol.segment_index)
            .map(|index| &self.sections[index])
    }

    /// Find the physical address of `offset` within `section` by walking
    /// the data chunk chain in file order.
    ///
    /// Returns `None` when the chain runs out before reaching `offset`, or
    /// when the selected chunk starts past `offset` and so cannot contain
    /// it.
    fn chunk_paddr(section: &OmfSection, offset: u32) -> Option<u64> {
        let mut covered = 0u64;
        for chunk in &section.data {
            covered += chunk.size();
            if u64::from(offset) < covered {
                return u64::from(offset)
                    .checked_sub(u64::from(chunk.offset))
                    .map(|delta| chunk.paddr + delta);
            }
        }
        None
    }

    /// The virtual and physical address of the program entry point: the
    /// first symbol named `_start`.
    ///
    /// Returns `None` when no such symbol exists, its section reference
    /// is invalid, or no data chunk covers its offset.
    pub fn entry_point(&self) -> Option<(u64, u64)> {
        let symbol = self.symbols.iter().find(|symbol| symbol.name == ENTRY_SYMBOL)?;
        let section = self.symbol_section(symbol)?;
        let vaddr = section.vaddr + u64::from(symbol.offset) + self.base_addr;
        let paddr = OmfObject::chunk_paddr(section, symbol.offset)?;
        Some((vaddr, paddr))
    }

    /// The address width of the module: 32 if any section uses 32-bit
    /// addressing, 16 otherwise.
    pub fn address_width(&self) -> u8 {
        if self.sections.iter().any(|section| section.use32) {
            32
        } else {
            16
        }
    }

    /// The virtual address of `symbol`, or 0 when its section reference
    /// is invalid.
    pub fn symbol_vaddr(&self, symbol: &OmfSymbol) -> u64 {
        match self.symbol_section(symbol) {
            Some(section) => section.vaddr + u64::from(symbol.offset) + self.base_addr,
            None => 0,
        }
    }

    /// The physical address of `symbol`, or 0 when its section reference
    /// is invalid or no data chunk covers its offset.
    pub fn symbol_paddr(&self, symbol: &OmfSymbol) -> u64 {
        self.symbol_section(symbol)
            .and_then(|section| OmfObject::chunk_paddr(section, symbol.offset))
            .unwrap_or(0)
    }

    /// Materialize one section descriptor per data chunk of `section`,
    /// appending them to `descriptors`.
    pub fn export_sections(&self, section: &OmfSection, descriptors: &mut Vec<SectionDescriptor>) {
        for (count, chunk) in section.data.iter().enumerate() {
            let name = match self.name(section.name_index) {
                Some(name) => format!("{}_{}", name, count + 1),
                None => format!("no_name_{}", count + 1),
            };
            descriptors.push(SectionDescriptor {
                name,
                size: chunk.size(),
                vsize: chunk.size(),
                paddr: chunk.paddr,
                vaddr: section.vaddr + u64::from(chunk.offset) + self.base_addr,
                flags: SECTION_FLAG_READ | SECTION_FLAG_WRITE | SECTION_FLAG_EXECUTE,
            });
        }
    }

    /// Materialize descriptors for every section of the module.
    pub fn export_all_sections(&self) -> Vec<SectionDescriptor> {
        let mut descriptors = Vec::new();
        for section in &self.sections {
            self.export_sections(section, &mut descriptors);
        }
        descriptors
    }

    /// Look up a name by its 1-based index. Returns `None` for index 0,
    /// out-of-range indexes, and zero-length placeholder entries.
    pub fn name(&self, index: u16) -> Option<&str> {
        let index = usize::from(index).checked_sub(1)?;
        self.names.get(index)?.as_deref()
    }

    /// The flat name table, placeholders included.
    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    /// The sections of the module, in definition order.
    pub fn sections(&self) -> &[OmfSection] {
        &self.sections
    }

    /// The symbols of the module, in definition order.
    pub fn symbols(&self) -> &[OmfSymbol] {
        &self.symbols
    }

    /// The load bias applied to virtual addresses.
    pub fn base_addr(&self) -> u64 {
        self.base_addr
    }
}
