//! `File` table (0x26): the files that make up a multi-file assembly.
//!
//! Each row names one file of the assembly. Rows whose flags do not carry
//! [`FileAttributes::CONTAINS_NO_META_DATA`] are satellite modules with their own metadata.

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `FileAttributes`
pub mod FileAttributes {
    /// This is not a resource file
    pub const CONTAINS_META_DATA: u32 = 0x0000;
    /// This is a resource file or other non-metadata-containing file
    pub const CONTAINS_NO_META_DATA: u32 = 0x0001;
}
