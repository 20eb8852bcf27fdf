//! Metadata streams of a CLI module.
//!
//! The metadata root announces a set of named streams. This crate reads the ones needed to
//! enumerate the modules of an assembly:
//!
//! - [`TablesHeader`]: the `#~` (or uncompressed `#-`) stream holding the metadata tables
//! - [`Strings`]: the `#Strings` heap of identifiers
//! - [`Guid`]: the `#GUID` heap of module version ids
//! - [`StreamHeader`]: the directory entry describing a stream
//!
//! # Reference
//! - [ECMA-335 II.24.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod guid;
mod streamheader;
mod strings;
mod tablesheader;

pub use guid::Guid;
pub use streamheader::{StreamHeader, STREAM_NAMES};
pub use strings::Strings;
pub use tablesheader::TablesHeader;
