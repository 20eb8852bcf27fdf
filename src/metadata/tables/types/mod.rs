//! # Metadata Table Types Module
//!
//! Core infrastructure for working with the tables of the `#~` stream: table identifiers, coded
//! indexes, the per-binary size information that decides column widths, and a generic typed view
//! over the rows of a single table.
//!
//! ## Key Components
//!
//! - [`MetadataTable`]: Generic container for metadata table data with typed row access
//! - [`RowReadable`]: Trait defining how to read and parse individual table rows
//! - [`CodedIndex`], [`CodedIndexType`] and [`TypeDefOrRef`]: Compact cross-table references
//! - [`TableId`]: Enumeration of all metadata table types
//! - [`TableInfo`] and [`TableInfoRef`]: Table size and configuration information
//!
//! ## References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Partition II, Section 22

mod codedindex;
mod tableid;
mod tableinfo;
mod typedeforref;

use std::marker::PhantomData;

use crate::{
    metadata::index::{OneBasedIndex, ZeroBasedIndex},
    Error, Result,
};

pub use codedindex::{CodedIndex, CodedIndexType};
pub use tableid::TableId;
pub use tableinfo::{
    columns, Column, TableInfo, TableInfoRef, TableRowInfo, HEAP_EXTRA_DATA, HEAP_LARGE_BLOB,
    HEAP_LARGE_GUID, HEAP_LARGE_STRINGS,
};
pub use typedeforref::{TypeDefOrRef, TYPE_DEF_OR_REF_TAG_BITS, TYPE_DEF_OR_REF_TAG_MASK};

/// Trait defining the interface for reading and parsing metadata table rows.
///
/// Row identifiers follow the one-based indexing of the metadata format.
pub trait RowReadable: Sized + Send {
    /// Calculates the size in bytes of a single row for this table type.
    ///
    /// ## Arguments
    /// * `sizes` - Table size information containing heap sizes and table row counts
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Reads and parses a single row from the provided byte buffer, advancing `offset` past it.
    ///
    /// ## Arguments
    /// * `data` - The byte buffer containing the table data to read from
    /// * `offset` - The current read position
    /// * `rid` - The 1-based row identifier for this entry
    /// * `sizes` - Table size information for parsing variable-sized fields
    ///
    /// # Errors
    /// Returns an error if the buffer does not hold a complete row.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}

/// Typed view over the rows of one metadata table
pub struct MetadataTable<'a, T> {
    data: &'a [u8],
    row_count: u32,
    row_size: u32,
    sizes: TableInfoRef,
    _phantom: PhantomData<T>,
}

impl<'a, T: RowReadable> MetadataTable<'a, T> {
    /// Creates a new table view
    ///
    /// ## Arguments
    /// * `data` - The table data, starting at its first row
    /// * `row_count` - Number of rows in the table
    /// * `sizes` - Size information of the surrounding tables stream
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is too short for `row_count` rows.
    pub fn new(data: &'a [u8], row_count: u32, sizes: TableInfoRef) -> Result<Self> {
        let row_size = T::row_size(&sizes);
        let needed = u64::from(row_count) * u64::from(row_size);
        if needed > data.len() as u64 {
            return Err(Error::OutOfBounds);
        }

        Ok(MetadataTable {
            data,
            row_count,
            row_size,
            sizes,
            _phantom: PhantomData,
        })
    }

    /// Size of the whole table in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::from(self.row_count) * u64::from(self.row_size)
    }

    /// Size of a single row in bytes
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Number of rows
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Returns the row with the one-based id `index`, `None` if null or out of range
    #[must_use]
    pub fn get(&self, index: u32) -> Option<T> {
        let position = OneBasedIndex::new(index).to_zero_based().ok()?;
        self.row(position).ok()
    }

    /// Reads the row at a zero-based position
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is past the last row, or the error of
    /// the row reader.
    pub fn row(&self, index: ZeroBasedIndex) -> Result<T> {
        if index.value() >= self.row_count {
            return Err(Error::OutOfBounds);
        }

        let rid = index.to_one_based()?.value();
        T::row_read(
            self.data,
            &mut (index.as_usize() * self.row_size as usize),
            rid,
            &self.sizes,
        )
    }

    /// Sequential iterator over all rows
    #[must_use]
    pub fn iter(&'a self) -> TableIterator<'a, T> {
        TableIterator {
            table: self,
            current_row: 0,
        }
    }
}

impl<'a, T: RowReadable> IntoIterator for &'a MetadataTable<'a, T> {
    type Item = T;
    type IntoIter = TableIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator over the rows of a [`MetadataTable`]
pub struct TableIterator<'a, T> {
    table: &'a MetadataTable<'a, T>,
    current_row: u32,
}

impl<'a, T: RowReadable> Iterator for TableIterator<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row >= self.table.row_count {
            return None;
        }

        let row = self.table.row(ZeroBasedIndex::new(self.current_row)).ok()?;
        self.current_row += 1;
        Some(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::FileRaw;
    use std::sync::Arc;

    fn files(rows: u8) -> (Vec<u8>, TableInfoRef) {
        let mut data = Vec::new();
        for row in 0..rows {
            data.extend_from_slice(&u32::from(row % 2).to_le_bytes());
            data.extend_from_slice(&[0x10 + row, 0x00]);
            data.extend_from_slice(&[0x00, 0x00]);
        }

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::File, u32::from(rows))],
            false,
            false,
            false,
        ));
        (data, sizes)
    }

    #[test]
    fn get_by_row_id() {
        let (data, sizes) = files(3);
        let table = MetadataTable::<FileRaw>::new(&data, 3, sizes).unwrap();

        assert!(table.get(0).is_none());
        assert!(table.get(4).is_none());

        let first = table.get(1).unwrap();
        assert_eq!(first.rid, 1);
        assert_eq!(first.name, 0x10);
        assert_eq!(first.token.value(), 0x2600_0001);

        let last = table.get(3).unwrap();
        assert_eq!(last.rid, 3);
        assert_eq!(last.offset, 16);
        assert_eq!(last.name, table.row(ZeroBasedIndex::new(2)).unwrap().name);
    }

    #[test]
    fn iterate_rows() {
        let (data, sizes) = files(4);
        let table = MetadataTable::<FileRaw>::new(&data, 4, sizes).unwrap();

        let rids: Vec<u32> = table.iter().map(|row| row.rid).collect();
        assert_eq!(rids, vec![1, 2, 3, 4]);

        let names: Vec<u32> = (&table).into_iter().map(|row| row.name).collect();
        assert_eq!(names, vec![0x10, 0x11, 0x12, 0x13]);
        assert!(MetadataTable::<FileRaw>::new(&data[..15], 2, table.sizes.clone()).is_err());
    }
}
