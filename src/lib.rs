//! # `omf-read`
//!
//! The `omf-read` crate provides an interface for reading relocatable
//! Object Module Format (OMF) files, the record-oriented object format
//! produced by classic DOS toolchains such as Borland C++ and Watcom C.
//!
//! The entire module is decoded into an owned [`read::OmfObject`] in a
//! single pass; see [`read::OmfObject::parse`] for details. Both 16-bit
//! and 32-bit record variants are handled.
//!
//! ## Example
//! ```no_run
//! # #[cfg(feature = "std")] {
//! let data = std::fs::read("module.obj").unwrap();
//! let object = omf_read::OmfObject::parse(&data).unwrap();
//! for section in object.sections() {
//!     println!("{:?} {:#x}", object.name(section.name_index), section.vaddr);
//! }
//! # }
//! ```

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![no_std]
// Style.
#![allow(clippy::collapsible_if)]
#![allow(clippy::single_match)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod omf;
pub mod read;

pub use read::*;
