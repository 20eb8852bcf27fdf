use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::{read_le, read_le_at},
    metadata::tables::types::{CodedIndexType, TableId},
    Error::OutOfBounds,
    Result,
};

/// Heap-size flag: `#Strings` indexes are 4 bytes wide
pub const HEAP_LARGE_STRINGS: u8 = 0x01;
/// Heap-size flag: `#GUID` indexes are 4 bytes wide
pub const HEAP_LARGE_GUID: u8 = 0x02;
/// Heap-size flag: `#Blob` indexes are 4 bytes wide
pub const HEAP_LARGE_BLOB: u8 = 0x04;
/// Heap-size flag: an extra 4-byte value follows the row counts
pub const HEAP_EXTRA_DATA: u8 = 0x40;

/// Holds information about the size that reference index fields have
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// If the count is > `u16::max`, the indexes of other tables into this table will be 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Creates a new `TableRowInfo` for a table with `rows` rows
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// A single column of a metadata table row
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Column {
    /// A constant of the given width in bytes
    Fixed(u8),
    /// An index into the `#Strings` heap
    Str,
    /// An index into the `#GUID` heap
    Guid,
    /// An index into the `#Blob` heap
    Blob,
    /// A simple index into another table
    Table(TableId),
    /// A coded index
    Coded(CodedIndexType),
}

/// `TableInfo` holds information regarding the row count and reference index field sizes
/// of all tables in this binary
#[derive(Clone, Default)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

/// Cheap-copy reference to a `TableInfo` structure
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Build a new `TableInfo` struct
    ///
    /// ## Arguments
    /// * 'data' - The `#~` stream, starting with its header
    /// * '`valid_bitvec`' - The valid bitvector from the header, showing which tables are present
    ///
    /// # Errors
    /// Returns an error if the row counts are truncated
    pub fn new(data: &[u8], valid_bitvec: u64) -> Result<Self> {
        let mut rows = vec![TableRowInfo::default(); TableId::COUNT];
        let mut next_row_offset = 24;

        for table_id in TableId::iter() {
            if (valid_bitvec & (1 << table_id as usize)) == 0 {
                continue;
            }

            let row_count = read_le_at::<u32>(data, &mut next_row_offset)?;
            rows[table_id as usize] = TableRowInfo::new(row_count);
        }

        let heap_size_flags = read_le::<u8>(data.get(6..).ok_or(OutOfBounds)?)?;
        let mut table_info = TableInfo {
            rows,
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & HEAP_LARGE_STRINGS != 0,
            is_large_index_guid: heap_size_flags & HEAP_LARGE_GUID != 0,
            is_large_index_blob: heap_size_flags & HEAP_LARGE_BLOB != 0,
        };

        table_info.calculate_coded_index_bits();

        Ok(table_info)
    }

    #[cfg(test)]
    /// Special constructor for unit-tests
    ///
    /// ## Arguments
    /// * 'valid_tables'    - A slice of touples, which provides (table_id, row_count) of the valid tables
    /// * 'large_str'       - Specify if the #String heap indexes are 4 or 2 bytes
    /// * 'large_blob'      - Specify if the #Blob heap indexes are 4 or 2 bytes
    /// * 'large_guid'      - Specify if the #GUID heap indexes are 4 or 2 bytes
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::default(); TableId::COUNT],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for valid_table in valid_tables {
            table_info.rows[valid_table.0 as usize] = TableRowInfo::new(valid_table.1);
        }

        table_info.calculate_coded_index_bits();
        table_info
    }

    /// Returns true, if a requested table is larger than 2^16 rows and hence requires 4 bytes instead of 2 bytes
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Indicates the size of indexes referring into the '#String' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// Indicates the size of indexes referring into the '#Guid' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// Indicates the size of indexes referring into the '#Blob' heap. True means 4 bytes, False is 2 bytes
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Returns the size of '#String' heap indexes in bytes
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Returns the size of '#Guid' heap indexes in bytes
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Returns the size of '#Blob' heap indexes in bytes
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Returns the row information for a specific table
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Returns the number of rows of a specific table, `0` if it is absent
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table as usize].rows
    }

    /// Returns the number of bytes required to represent an index into a specific table
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Returns the cached byte size for a specific coded index reference
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_indexes[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    /// Width in bytes of a single column
    #[must_use]
    pub fn column_bytes(&self, column: Column) -> u8 {
        match column {
            Column::Fixed(width) => width,
            Column::Str => self.str_bytes(),
            Column::Guid => self.guid_bytes(),
            Column::Blob => self.blob_bytes(),
            Column::Table(table) => self.table_index_bytes(table),
            Column::Coded(coded) => self.coded_index_bytes(coded),
        }
    }

    /// Size in bytes of one row of `table`, derived from its column layout
    #[must_use]
    pub fn row_size(&self, table: TableId) -> u32 {
        columns(table)
            .iter()
            .map(|column| u32::from(self.column_bytes(*column)))
            .sum()
    }

    fn calculate_coded_index_size(&self, coded_index_type: CodedIndexType) -> u8 {
        let max_bits = coded_index_type
            .tables()
            .iter()
            .map(|table| self.rows[*table as usize].bits)
            .max()
            .unwrap_or(1);

        #[allow(clippy::cast_possible_truncation)]
        let tag_bits = coded_index_type.tag_bits() as u8;
        max_bits + tag_bits
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let size = self.calculate_coded_index_size(coded_index);
            self.coded_indexes[coded_index as usize] = size;
        }
    }
}

/// The column layout of every table, as defined in ECMA-335 II.22
#[must_use]
#[rustfmt::skip]
pub fn columns(table: TableId) -> &'static [Column] {
    use Column::{Blob, Coded, Fixed, Guid, Str, Table};
    use CodedIndexType as C;

    match table {
        TableId::Module                 => &[Fixed(2), Str, Guid, Guid, Guid],
        TableId::TypeRef                => &[Coded(C::ResolutionScope), Str, Str],
        TableId::TypeDef                => &[Fixed(4), Str, Str, Coded(C::TypeDefOrRef), Table(TableId::Field), Table(TableId::MethodDef)],
        TableId::FieldPtr               => &[Table(TableId::Field)],
        TableId::Field                  => &[Fixed(2), Str, Blob],
        TableId::MethodPtr              => &[Table(TableId::MethodDef)],
        TableId::MethodDef              => &[Fixed(4), Fixed(2), Fixed(2), Str, Blob, Table(TableId::Param)],
        TableId::ParamPtr               => &[Table(TableId::Param)],
        TableId::Param                  => &[Fixed(2), Fixed(2), Str],
        TableId::InterfaceImpl          => &[Table(TableId::TypeDef), Coded(C::TypeDefOrRef)],
        TableId::MemberRef              => &[Coded(C::MemberRefParent), Str, Blob],
        TableId::Constant               => &[Fixed(1), Fixed(1), Coded(C::HasConstant), Blob],
        TableId::CustomAttribute        => &[Coded(C::HasCustomAttribute), Coded(C::CustomAttributeType), Blob],
        TableId::FieldMarshal           => &[Coded(C::HasFieldMarshal), Blob],
        TableId::DeclSecurity           => &[Fixed(2), Coded(C::HasDeclSecurity), Blob],
        TableId::ClassLayout            => &[Fixed(2), Fixed(4), Table(TableId::TypeDef)],
        TableId::FieldLayout            => &[Fixed(4), Table(TableId::Field)],
        TableId::StandAloneSig          => &[Blob],
        TableId::EventMap               => &[Table(TableId::TypeDef), Table(TableId::Event)],
        TableId::EventPtr               => &[Table(TableId::Event)],
        TableId::Event                  => &[Fixed(2), Str, Coded(C::TypeDefOrRef)],
        TableId::PropertyMap            => &[Table(TableId::TypeDef), Table(TableId::Property)],
        TableId::PropertyPtr            => &[Table(TableId::Property)],
        TableId::Property               => &[Fixed(2), Str, Blob],
        TableId::MethodSemantics        => &[Fixed(2), Table(TableId::MethodDef), Coded(C::HasSemantics)],
        TableId::MethodImpl             => &[Table(TableId::TypeDef), Coded(C::MethodDefOrRef), Coded(C::MethodDefOrRef)],
        TableId::ModuleRef              => &[Str],
        TableId::TypeSpec               => &[Blob],
        TableId::ImplMap                => &[Fixed(2), Coded(C::MemberForwarded), Str, Table(TableId::ModuleRef)],
        TableId::FieldRVA               => &[Fixed(4), Table(TableId::Field)],
        TableId::EncLog                 => &[Fixed(4), Fixed(4)],
        TableId::EncMap                 => &[Fixed(4)],
        TableId::Assembly               => &[Fixed(4), Fixed(2), Fixed(2), Fixed(2), Fixed(2), Fixed(4), Blob, Str, Str],
        TableId::AssemblyProcessor      => &[Fixed(4)],
        TableId::AssemblyOS             => &[Fixed(4), Fixed(4), Fixed(4)],
        TableId::AssemblyRef            => &[Fixed(2), Fixed(2), Fixed(2), Fixed(2), Fixed(4), Blob, Str, Str, Blob],
        TableId::AssemblyRefProcessor   => &[Fixed(4), Table(TableId::AssemblyRef)],
        TableId::AssemblyRefOS          => &[Fixed(4), Fixed(4), Fixed(4), Table(TableId::AssemblyRef)],
        TableId::File                   => &[Fixed(4), Str, Blob],
        TableId::ExportedType           => &[Fixed(4), Fixed(4), Str, Str, Coded(C::Implementation)],
        TableId::ManifestResource       => &[Fixed(4), Fixed(4), Str, Coded(C::Implementation)],
        TableId::NestedClass            => &[Table(TableId::TypeDef), Table(TableId::TypeDef)],
        TableId::GenericParam           => &[Fixed(2), Fixed(2), Coded(C::TypeOrMethodDef), Str],
        TableId::MethodSpec             => &[Coded(C::MethodDefOrRef), Blob],
        TableId::GenericParamConstraint => &[Table(TableId::GenericParam), Coded(C::TypeDefOrRef)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_widths() {
        let small = TableInfo::new_test(&[], false, false, false);
        assert_eq!(small.str_bytes(), 2);
        assert_eq!(small.guid_bytes(), 2);
        assert_eq!(small.blob_bytes(), 2);

        let large = TableInfo::new_test(&[], true, true, true);
        assert_eq!(large.str_bytes(), 4);
        assert_eq!(large.guid_bytes(), 4);
        assert_eq!(large.blob_bytes(), 4);
    }

    #[test]
    fn table_index_width() {
        let info = TableInfo::new_test(
            &[(TableId::TypeDef, 0xFFFF), (TableId::Field, 0x1_0000)],
            false,
            false,
            false,
        );
        assert_eq!(info.table_index_bytes(TableId::TypeDef), 2);
        assert_eq!(info.table_index_bytes(TableId::Field), 4);
        assert!(info.is_large(TableId::Field));
        assert!(!info.is_large(TableId::TypeDef));
    }

    #[test]
    fn coded_index_width() {
        // TypeDefOrRef uses 2 tag bits: 2 bytes while every target has < 2^14 rows
        let small = TableInfo::new_test(&[(TableId::TypeSpec, 0x3FFF)], false, false, false);
        assert_eq!(small.coded_index_bytes(CodedIndexType::TypeDefOrRef), 2);

        let large = TableInfo::new_test(&[(TableId::TypeSpec, 0x4000)], false, false, false);
        assert_eq!(large.coded_index_bytes(CodedIndexType::TypeDefOrRef), 4);
        assert_eq!(large.coded_index_bytes(CodedIndexType::HasFieldMarshal), 2);
    }

    #[test]
    fn row_sizes() {
        let small = TableInfo::new_test(&[], false, false, false);
        assert_eq!(small.row_size(TableId::Module), 10);
        assert_eq!(small.row_size(TableId::TypeDef), 14);
        assert_eq!(small.row_size(TableId::File), 8);
        assert_eq!(small.row_size(TableId::Assembly), 22);
        assert_eq!(small.row_size(TableId::AssemblyRef), 20);

        let large = TableInfo::new_test(&[], true, true, true);
        assert_eq!(large.row_size(TableId::Module), 18);
        assert_eq!(large.row_size(TableId::File), 12);
    }

    #[test]
    fn parse_row_counts() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x00, 0x00, 0x00, // reserved
            0x02, 0x00,             // version
            0x05,                   // heap sizes: large strings and blobs
            0x01,                   // reserved
            0x01, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, // valid: Module | File
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // sorted
            0x01, 0x00, 0x00, 0x00, // Module rows
            0x03, 0x00, 0x00, 0x00, // File rows
        ];

        let info = TableInfo::new(&data, 0x0000_0040_0000_0001).unwrap();
        assert_eq!(info.rows(TableId::Module), 1);
        assert_eq!(info.rows(TableId::File), 3);
        assert_eq!(info.rows(TableId::TypeDef), 0);
        assert!(info.is_large_str());
        assert!(!info.is_large_guid());
        assert!(info.is_large_blob());

        assert!(TableInfo::new(&data[..28], 0x0000_0040_0000_0001).is_err());
    }
}
