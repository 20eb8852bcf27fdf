use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{FileAttributes, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The File table lists the files that make up the current assembly. `TableId` = 0x26
pub struct FileRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 4-byte bitmask of type `FileAttributes`, §II.23.1.6
    pub flags: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Blob heap
    pub hash_value: u32,
}

impl FileRaw {
    /// True if the referenced file is a module carrying its own metadata
    #[must_use]
    pub fn contains_metadata(&self) -> bool {
        self.flags & FileAttributes::CONTAINS_NO_META_DATA == 0
    }
}

impl RowReadable for FileRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */      4 +
            /* name */       sizes.str_bytes() +
            /* hash_value */ sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FileRaw {
            rid,
            token: Token::new(TableId::File.token_base() | rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            hash_value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
