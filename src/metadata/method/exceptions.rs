//! Fat exception-handling sections of method bodies.
//!
//! A method body with the `MORE_SECTS` flag is followed by one or more data sections. Sections
//! in the fat format start with a 4-byte little-endian header: the low 8 bits hold
//! [`ExceptionHeaderFlags`], the high 24 bits hold the section size in bytes, header included.
//! Each fat clause that follows is 24 bytes long.
//!
//! # Example
//!
//! ```rust
//! use cilmeta::metadata::method::{ExceptionHeaderFlags, FatExceptionHeader};
//!
//! let header = FatExceptionHeader::read(&[0x41, 0x1C, 0x00, 0x00])?;
//! assert!(header.flags().contains(ExceptionHeaderFlags::EH_TABLE | ExceptionHeaderFlags::FAT_FORMAT));
//! assert_eq!(header.data_size(), 28);
//! assert_eq!(header.clause_count(), 1);
//! # Ok::<(), cilmeta::Error>(())
//! ```
//!
//! # Reference
//! - [ECMA-335 II.25.4.5 / II.25.4.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use bitflags::bitflags;

use crate::{
    file::io::{read_le, read_le_at},
    metadata::token::Token,
    Result,
};

/// Size of the fat section header in bytes
pub const FAT_EXCEPTION_HEADER_SIZE: u32 = 4;
/// Size of a single fat exception clause in bytes
pub const FAT_EXCEPTION_CLAUSE_SIZE: u32 = 24;

const FLAGS_MASK: u32 = 0x0000_00FF;
const DATA_SIZE_SHIFT: u32 = 8;

bitflags! {
    /// Flags of a method data section header
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExceptionHeaderFlags: u8 {
        /// Exception handling data
        const EH_TABLE = 0x01;
        /// Reserved, shall be 0
        const OPT_IL_TABLE = 0x02;
        /// Data section is in the fat format
        const FAT_FORMAT = 0x40;
        /// Data section is followed by another one
        const MORE_SECTS = 0x80;
    }
}

bitflags! {
    /// Exception handler flags defining the type of exception handling clause.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExceptionHandlerFlags: u32 {
        /// A typed exception clause.
        ///
        /// `class_token_or_filter` holds the metadata token of the exception type that this
        /// handler catches.
        const EXCEPTION = 0x0000;
        /// An exception filter and handler clause.
        ///
        /// `class_token_or_filter` holds the offset of the filter block.
        const FILTER = 0x0001;
        /// A finally clause.
        const FINALLY = 0x0002;
        /// A fault clause (finally that executes only on exception).
        const FAULT = 0x0004;
    }
}

/// The header of a fat exception-handling section.
///
/// Decoding never rejects a header: unknown flag bits are kept as they are, and a `data_size`
/// too small to hold the header itself yields zero clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatExceptionHeader {
    raw: u32,
}

impl FatExceptionHeader {
    /// Wraps an already read header word
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        FatExceptionHeader { raw }
    }

    /// Reads a header from the first 4 bytes of `data`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than 4 bytes.
    pub fn read(data: &[u8]) -> Result<Self> {
        Ok(FatExceptionHeader {
            raw: read_le::<u32>(data)?,
        })
    }

    /// The raw header word
    #[must_use]
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Section flags, including bits without a defined meaning
    #[must_use]
    pub fn flags(&self) -> ExceptionHeaderFlags {
        ExceptionHeaderFlags::from_bits_retain((self.raw & FLAGS_MASK).to_le_bytes()[0])
    }

    /// Size of the section in bytes, header included
    #[must_use]
    pub fn data_size(&self) -> u32 {
        self.raw >> DATA_SIZE_SHIFT
    }

    /// Number of complete fat clauses the section holds
    #[must_use]
    pub fn clause_count(&self) -> u32 {
        self.data_size().saturating_sub(FAT_EXCEPTION_HEADER_SIZE) / FAT_EXCEPTION_CLAUSE_SIZE
    }
}

/// A single fat exception-handling clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatExceptionClause {
    /// Kind of clause
    pub flags: ExceptionHandlerFlags,
    /// Offset in bytes of try block from start of method body.
    pub try_offset: u32,
    /// Length in bytes of the try block.
    pub try_length: u32,
    /// Location of the handler for this try block.
    pub handler_offset: u32,
    /// Size of the handler code in bytes.
    pub handler_length: u32,
    /// Exception type token for typed clauses, filter offset for filter clauses
    pub class_token_or_filter: u32,
}

impl FatExceptionClause {
    /// Reads one clause at `offset`, advancing it by 24 bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than 24 bytes remain.
    pub fn read(data: &[u8], offset: &mut usize) -> Result<Self> {
        Ok(FatExceptionClause {
            flags: ExceptionHandlerFlags::from_bits_retain(read_le_at::<u32>(data, offset)?),
            try_offset: read_le_at::<u32>(data, offset)?,
            try_length: read_le_at::<u32>(data, offset)?,
            handler_offset: read_le_at::<u32>(data, offset)?,
            handler_length: read_le_at::<u32>(data, offset)?,
            class_token_or_filter: read_le_at::<u32>(data, offset)?,
        })
    }

    /// The caught exception type for typed clauses
    #[must_use]
    pub fn class_token(&self) -> Option<Token> {
        if self.flags.intersects(
            ExceptionHandlerFlags::FILTER
                | ExceptionHandlerFlags::FINALLY
                | ExceptionHandlerFlags::FAULT,
        ) {
            return None;
        }

        Some(Token::new(self.class_token_or_filter))
    }

    /// Offset of the filter block for filter clauses
    #[must_use]
    pub fn filter_offset(&self) -> Option<u32> {
        if self.flags.contains(ExceptionHandlerFlags::FILTER) {
            Some(self.class_token_or_filter)
        } else {
            None
        }
    }
}

/// A fat exception-handling section: its header and every clause it announces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionSection {
    /// Section header
    pub header: FatExceptionHeader,
    /// Decoded clauses, `header.clause_count()` of them
    pub clauses: Vec<FatExceptionClause>,
}

impl ExceptionSection {
    /// Reads a fat section starting at the beginning of `data`
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the header is not in the fat format, or
    /// [`crate::Error::OutOfBounds`] if `data` ends before the last announced clause.
    pub fn read(data: &[u8]) -> Result<Self> {
        let header = FatExceptionHeader::read(data)?;
        if !header.flags().contains(ExceptionHeaderFlags::FAT_FORMAT) {
            return Err(malformed_error!(
                "Exception section is not in the fat format - 0x{:02X}",
                header.flags().bits()
            ));
        }

        let mut offset = FAT_EXCEPTION_HEADER_SIZE as usize;
        let clauses = (0..header.clause_count())
            .map(|_| FatExceptionClause::read(data, &mut offset))
            .collect::<Result<Vec<_>>>()?;

        Ok(ExceptionSection { header, clauses })
    }

    /// True if another data section follows this one
    #[must_use]
    pub fn has_more_sections(&self) -> bool {
        self.header
            .flags()
            .contains(ExceptionHeaderFlags::MORE_SECTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn header_fields() {
        // 2 clauses: 4 + 2 * 24 = 52 = 0x34
        let header = FatExceptionHeader::from_raw(0x0000_3441);
        assert_eq!(
            header.flags(),
            ExceptionHeaderFlags::EH_TABLE | ExceptionHeaderFlags::FAT_FORMAT
        );
        assert_eq!(header.data_size(), 52);
        assert_eq!(header.clause_count(), 2);

        let max = FatExceptionHeader::from_raw(0xFFFF_FFC1);
        assert_eq!(max.data_size(), 0x00FF_FFFF);
        assert_eq!(max.clause_count(), (0x00FF_FFFF - 4) / 24);
    }

    #[test]
    fn unknown_flags_are_retained() {
        let header = FatExceptionHeader::from_raw(0x0000_1C7D);
        assert_eq!(header.flags().bits(), 0x7D);
        assert!(header.flags().contains(ExceptionHeaderFlags::EH_TABLE));
        assert!(!header.flags().contains(ExceptionHeaderFlags::MORE_SECTS));
    }

    #[test]
    fn truncated_sizes() {
        for data_size in 0..4u32 {
            let header = FatExceptionHeader::from_raw(data_size << 8 | 0x41);
            assert_eq!(header.clause_count(), 0);
        }

        // partial trailing clause is not counted
        assert_eq!(FatExceptionHeader::from_raw((4 + 24 + 23) << 8).clause_count(), 1);
    }

    #[test]
    fn read_little_endian() {
        let header = FatExceptionHeader::read(&[0xC1, 0x34, 0x00, 0x00, 0xFF]).unwrap();
        assert_eq!(header.raw(), 0x0000_34C1);
        assert!(header.flags().contains(ExceptionHeaderFlags::MORE_SECTS));

        assert!(matches!(
            FatExceptionHeader::read(&[0x41, 0x34, 0x00]),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn section() {
        #[rustfmt::skip]
        let data = [
            0x41, 0x34, 0x00, 0x00,
            // finally clause
            0x02, 0x00, 0x00, 0x00,
            0x45, 0x01, 0x00, 0x00,
            0x28, 0x00, 0x00, 0x00,
            0x6D, 0x01, 0x00, 0x00,
            0x0E, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // typed clause
            0x00, 0x00, 0x00, 0x00,
            0x09, 0x00, 0x00, 0x00,
            0x10, 0x00, 0x00, 0x00,
            0x19, 0x00, 0x00, 0x00,
            0x08, 0x00, 0x00, 0x00,
            0x05, 0x00, 0x00, 0x01,
        ];

        let section = ExceptionSection::read(&data).unwrap();
        assert!(!section.has_more_sections());
        assert_eq!(section.clauses.len(), 2);

        let finally = &section.clauses[0];
        assert!(finally.flags.contains(ExceptionHandlerFlags::FINALLY));
        assert_eq!(finally.try_offset, 0x145);
        assert_eq!(finally.try_length, 0x28);
        assert_eq!(finally.handler_offset, 0x16D);
        assert_eq!(finally.handler_length, 0xE);
        assert!(finally.class_token().is_none());

        let typed = &section.clauses[1];
        assert_eq!(typed.class_token().unwrap().value(), 0x0100_0005);
        assert!(typed.filter_offset().is_none());

        assert!(ExceptionSection::read(&data[..50]).is_err());
    }

    #[test]
    fn section_requires_fat_format() {
        assert!(matches!(
            ExceptionSection::read(&[0x01, 0x10, 0x00, 0x00]),
            Err(Error::Malformed { .. })
        ));
    }
}
