use std::sync::Arc;
use strum::IntoEnumIterator;

use crate::{
    file::io::read_le,
    metadata::tables::{
        MetadataTable, RowReadable, TableId, TableInfo, TableInfoRef, HEAP_EXTRA_DATA,
    },
    Error::OutOfBounds,
    Result,
};

/// The `TablesHeader` structure represents the header in the '#~' stream, which contains all the metadata tables
/// of a module.
///
/// Tables are not parsed up front: the header records where each present table starts and how many rows it has,
/// and [`TablesHeader::table`] hands out a typed view on request.
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::metadata::{streams::TablesHeader, tables::{TableId, FileRaw}};
///
/// # fn example(tables_header: &TablesHeader) -> cilmeta::Result<()> {
/// if let Some(files) = tables_header.table::<FileRaw>(TableId::File) {
///     for file in files.iter() {
///         println!("File row {}: flags={:#x}", file.rid, file.flags);
///     }
/// }
/// # Ok(())
/// # }
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.6 && II.22
pub struct TablesHeader<'a> {
    /// Major version of table schemata; shall be 2
    pub major_version: u8,
    /// Minor version of table schemata; shall be 0
    pub minor_version: u8,
    /// Bit vector of heap index widths and the extra data flag
    pub heap_sizes: u8,
    /// Bit vector of present tables, let n be the number of bits that are 1.
    pub valid: u64,
    /// Bit vector of sorted tables.
    pub sorted: u64,
    /// Size information of every table, used to compute column widths
    pub info: TableInfoRef,
    data: &'a [u8],
    tables_offset: usize,
    tables: Vec<Option<(usize, u32)>>,
}

impl<'a> TablesHeader<'a> {
    /// Create a `TablesHeader` object from a sequence of bytes
    ///
    /// ## Arguments
    /// * 'data' - The byte slice from which this object shall be created
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is too short for its declared tables, or
    /// [`crate::Error::Malformed`] if no table is present.
    pub fn from(data: &'a [u8]) -> Result<TablesHeader<'a>> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let valid_bitvec = read_le::<u64>(&data[8..])?;
        if valid_bitvec == 0 {
            return Err(malformed_error!("No valid rows in any of the tables"));
        }

        let heap_sizes = read_le::<u8>(&data[6..])?;
        let mut tables_offset = 24 + valid_bitvec.count_ones() as usize * 4;
        if heap_sizes & HEAP_EXTRA_DATA != 0 {
            tables_offset += 4;
        }

        let mut tables_header = TablesHeader {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            heap_sizes,
            valid: valid_bitvec,
            sorted: read_le::<u64>(&data[16..])?,
            info: Arc::new(TableInfo::new(data, valid_bitvec)?),
            data,
            tables_offset,
            tables: vec![None; TableId::GenericParamConstraint as usize + 1],
        };

        let mut current_offset = tables_offset;
        for table_id in TableId::iter() {
            if !tables_header.has_table(table_id) {
                continue;
            }

            let rows = tables_header.info.rows(table_id);
            let size = u64::from(rows) * u64::from(tables_header.info.row_size(table_id));
            let end = (current_offset as u64)
                .checked_add(size)
                .filter(|end| *end <= data.len() as u64)
                .ok_or(OutOfBounds)?;

            tables_header.tables[table_id as usize] = Some((current_offset, rows));
            current_offset = usize::try_from(end).map_err(|_| OutOfBounds)?;
        }

        Ok(tables_header)
    }

    /// Get the table count
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Offset of the first table row, relative to the start of the stream
    #[must_use]
    pub fn tables_offset(&self) -> usize {
        self.tables_offset
    }

    /// Get a typed view of a specific table, `None` if the table is not present
    ///
    /// ## Arguments
    /// * `table_id` - The table to access; `T` must be its row type
    #[must_use]
    pub fn table<T: RowReadable>(&self, table_id: TableId) -> Option<MetadataTable<'a, T>> {
        let (offset, rows) = (*self.tables.get(table_id as usize)?)?;
        MetadataTable::new(&self.data[offset..], rows, self.info.clone()).ok()
    }

    /// Check if a specific table is present
    #[must_use]
    pub fn has_table(&self, table_id: TableId) -> bool {
        (self.valid & (1u64 << (table_id as u8))) != 0
    }

    /// Iterator over all present tables
    pub fn present_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        TableId::iter().filter(|table_id| self.has_table(*table_id))
    }

    /// Get the row count for a specific table, `0` if the table is absent
    #[must_use]
    pub fn table_row_count(&self, table_id: TableId) -> u32 {
        self.info.rows(table_id)
    }
}
