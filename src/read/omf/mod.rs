//! OMF file reading support.
//!
//! Decoding happens in two stages. The record pass splits the raw buffer
//! into a transient sequence of typed records, validating bounds and
//! checksums and decoding the record kinds that contribute to the model. The
//! records are then aggregated into an [`OmfObject`], which owns flat name,
//! section and symbol tables and answers address queries; the record
//! sequence is discarded once aggregation finishes.

mod record;

mod object;
pub use object::*;

mod section;
pub use section::*;

mod symbol;
pub use symbol::*;

/// The load bias applied to every virtual address computed for an OMF
/// module. OMF carries no load address of its own; this matches the base
/// used by hosts that map the module for analysis.
pub const BASE_ADDR: u64 = 0x1000;
