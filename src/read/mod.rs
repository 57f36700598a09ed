//! Interface for reading OMF files.

use core::fmt;
use core::result;

mod omf;
pub use omf::*;

/// The error type used within the read module.
///
/// Every decode and build step fails fast: the first malformed record
/// aborts the entire load and no partial object is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A record type byte is not in the known whitelist.
    UnknownRecordType,
    /// A record's trailing checksum byte does not balance its byte sum.
    ChecksumMismatch,
    /// A record header or declared record length runs past the end of the
    /// buffer.
    TruncatedRecord,
    /// An uninterpreted record has no contents.
    EmptyRecord,
    /// A name length field in a name list record runs past the record
    /// contents.
    InvalidNameLength,
    /// A segment definition record is too short for one of its fields.
    InvalidSegdefSize,
    /// A public or local symbol definition record is too short for one of
    /// its fields.
    InvalidPubdefSize,
    /// An enumerated data record is too short for one of its fields.
    InvalidLedataSize,
    /// A data chunk or symbol references a segment index outside the
    /// defined segments.
    InvalidSectionReference,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::UnknownRecordType => "Invalid record type",
            Error::ChecksumMismatch => "Invalid record checksum",
            Error::TruncatedRecord => "Invalid record (too short)",
            Error::EmptyRecord => "Invalid record (no contents)",
            Error::InvalidNameLength => "Invalid name list record (bad size)",
            Error::InvalidSegdefSize => "Invalid segment definition record (bad size)",
            Error::InvalidPubdefSize => "Invalid symbol definition record (bad size)",
            Error::InvalidLedataSize => "Invalid enumerated data record (bad size)",
            Error::InvalidSectionReference => "Invalid segment index reference",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The result type used within the read module.
pub type Result<T> = result::Result<T, Error>;
