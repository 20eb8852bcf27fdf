use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        module::MetadataModule,
        streams::{Guid, Strings},
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[derive(Clone, Debug)]
/// The `Module` table provides information about the current module, including its name, GUID (`Mvid`), and generation. There
/// is only one row in this table for each PE file. Table Id = 0x00
pub struct ModuleRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// Offset
    pub offset: usize,
    /// a 2-byte value, reserved, shall be zero
    pub generation: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Guid heap; simply a Guid used to distinguish between two versions of the same module
    pub mvid: u32,
    /// an index into the Guid heap; reserved, shall be zero
    pub encid: u32,
    /// an index into the Guid heap; reserved, shall be zero
    pub encbaseid: u32,
}

impl ModuleRaw {
    /// Convert a `ModuleRaw` into a [`MetadataModule`] which has indexes resolved and owns the referenced data
    ///
    /// ## Arguments
    /// * 'strings'     - The #String heap
    /// * 'guids'       - The #Guid heap
    ///
    /// # Errors
    /// Returns an error if there are issues resolving strings or GUIDs from the respective heaps.
    pub fn to_owned(&self, strings: &Strings, guids: &Guid) -> Result<MetadataModule> {
        Ok(MetadataModule {
            name: strings.get(self.name as usize)?.to_string(),
            generation: self.generation,
            mvid: guids.get(self.mvid as usize)?,
        })
    }
}

impl RowReadable for ModuleRaw {
    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* generation */ 2 +
            /* name */       sizes.str_bytes() +
            /* mvid */       sizes.guid_bytes() +
            /* encid */      sizes.guid_bytes() +
            /* encbaseid */  sizes.guid_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ModuleRaw {
            rid,
            token: Token::new(TableId::Module.token_base() | rid),
            offset: *offset,
            generation: u32::from(read_le_at::<u16>(data, offset)?),
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            mvid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            encid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            encbaseid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{MetadataTable, TableId, TableInfo};
    use std::sync::Arc;

    #[test]
    fn crafted_short() {
        let data = vec![
            0x01, 0x01, // generation
            0x02, 0x02, // name
            0x03, 0x03, // mvid
            0x04, 0x04, // encid
            0x05, 0x05, // encbaseid
        ];

        let sizes = Arc::new(TableInfo::new_test(
            &[(TableId::Module, 1)],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<ModuleRaw>::new(&data, 1, sizes).unwrap();

        let eval = |row: ModuleRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x00000001);
            assert_eq!(row.generation, 0x0101);
            assert_eq!(row.name, 0x0202);
            assert_eq!(row.mvid, 0x0303);
            assert_eq!(row.encid, 0x0404);
            assert_eq!(row.encbaseid, 0x0505);
        };

        for row in table.iter() {
            eval(row);
        }
        eval(table.get(1).unwrap());
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, // generation
            0x02, 0x02, 0x02, 0x02, // name
            0x03, 0x03, 0x03, 0x03, // mvid
            0x04, 0x04, 0x04, 0x04, // encid
            0x05, 0x05, 0x05, 0x05, // encbaseid
        ];

        let sizes = Arc::new(TableInfo::new_test(&[(TableId::Module, 1)], true, true, true));
        let table = MetadataTable::<ModuleRaw>::new(&data, 1, sizes).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.generation, 0x0101);
        assert_eq!(row.name, 0x02020202);
        assert_eq!(row.mvid, 0x03030303);
        assert_eq!(row.encbaseid, 0x05050505);
    }

    #[test]
    fn resolve() {
        let strings = Strings::from(b"\0Satellite.netmodule\0").unwrap();
        let mut heap = vec![0u8; 16];
        heap[0] = 0xAA;
        heap[15] = 0x55;
        let guids = Guid::from(&heap).unwrap();

        let raw = ModuleRaw {
            rid: 1,
            token: Token::new(1),
            offset: 0,
            generation: 0,
            name: 1,
            mvid: 1,
            encid: 0,
            encbaseid: 0,
        };

        let module = raw.to_owned(&strings, &guids).unwrap();
        assert_eq!(module.name, "Satellite.netmodule");
        assert_eq!(module.mvid.to_bytes()[0], 0xAA);
        assert_eq!(module.mvid.to_bytes()[15], 0x55);
    }
}
