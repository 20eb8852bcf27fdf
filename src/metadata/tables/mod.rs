//! Metadata tables of the `#~` stream.
//!
//! This crate reads the two tables needed to enumerate the modules of an assembly: the `Module`
//! table of every file and the `File` table of the manifest. The infrastructure in [`types`]
//! knows the layout of every table, so rows of both can be located in any well-formed stream.
//!
//! # Reference
//! - [ECMA-335 II.22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod file;
mod module;
pub mod types;

pub use file::{FileAttributes, FileRaw};
pub use module::ModuleRaw;
pub use types::{
    CodedIndex, CodedIndexType, Column, MetadataTable, RowReadable, TableId, TableInfo,
    TableInfoRef, TableIterator, TableRowInfo, TypeDefOrRef, HEAP_EXTRA_DATA, HEAP_LARGE_BLOB,
    HEAP_LARGE_GUID, HEAP_LARGE_STRINGS, TYPE_DEF_OR_REF_TAG_BITS, TYPE_DEF_OR_REF_TAG_MASK,
};
