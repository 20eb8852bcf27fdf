//! Metadata files on disk or in memory.
//!
//! [`PeFile`] is the [`MetadataFile`] used by [`crate::ModuleCollection::open`]. It parses the PE
//! headers once to find the metadata root, validates the stream directory and the tables
//! header, and resolves the file's own `Module` row. Afterwards only stream offsets are kept;
//! every read re-borrows the backing bytes until the file is disposed.

use std::{
    fs,
    path::Path,
    sync::Arc,
};

use log::debug;

use crate::{
    file::{Backend, File, Memory},
    metadata::{
        index::ZeroBasedIndex,
        module::{MetadataModule, Module, ModuleRc},
        modules::MetadataFile,
        root::Root,
        streams::{Guid, Strings, TablesHeader},
        tables::{FileRaw, ModuleRaw, TableId},
    },
    Error::{self, OutOfBounds},
    Result,
};

/// A file carrying CLI metadata, either a PE image or a bare metadata blob.
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::metadata::{modules::MetadataFile, pefile::PeFile, tables::TableId};
/// use std::path::Path;
///
/// let mut file = PeFile::from_path(Path::new("Assembly.dll"), true)?;
/// println!("{} lists {} files", file.module(), file.row_count(TableId::File)?);
/// file.dispose();
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct PeFile {
    data: Option<Box<dyn Backend>>,
    metadata: (usize, usize),
    tables: (usize, usize),
    strings: (usize, usize),
    module: ModuleRc,
}

impl PeFile {
    /// Opens a PE image from disk
    ///
    /// ## Arguments
    /// * `path` - The file to open
    /// * `memory_mapped` - Map the file instead of reading it into memory
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not a PE image with CLI metadata, or its
    /// metadata is malformed.
    pub fn from_path(path: &Path, memory_mapped: bool) -> Result<PeFile> {
        let file = if memory_mapped {
            File::from_file(path)?
        } else {
            File::from_mem(fs::read(path)?)?
        };

        let fallback_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::from_pe(file, &fallback_name)
    }

    /// Opens a PE image held in memory
    ///
    /// # Errors
    /// Returns an error if the buffer is not a PE image with CLI metadata, or its metadata is
    /// malformed.
    pub fn from_mem(data: Vec<u8>) -> Result<PeFile> {
        Self::from_pe(File::from_mem(data)?, "")
    }

    /// Opens a bare metadata blob, starting with the metadata root
    ///
    /// ## Arguments
    /// * `data` - The metadata
    /// * `name` - Module name to use if the blob has no `Module` row
    ///
    /// # Errors
    /// Returns an error if the metadata is malformed.
    pub fn from_metadata(data: Vec<u8>, name: &str) -> Result<PeFile> {
        let len = data.len();
        Self::parse(Box::new(Memory::new(data)), (0, len), name)
    }

    fn from_pe(file: File, fallback_name: &str) -> Result<PeFile> {
        let metadata = file.metadata_range()?;
        Self::parse(file.into_backend(), metadata, fallback_name)
    }

    fn parse(
        data: Box<dyn Backend>,
        metadata: (usize, usize),
        fallback_name: &str,
    ) -> Result<PeFile> {
        let meta = data.data_slice(metadata.0, metadata.1)?;
        let root = Root::read(meta)?;

        let Some(tables_stream) = root.tables_stream() else {
            return Err(malformed_error!("Metadata has no tables stream"));
        };
        let Some(strings_stream) = root.stream("#Strings") else {
            return Err(malformed_error!("Metadata has no #Strings heap"));
        };

        let tables = (tables_stream.offset as usize, tables_stream.size as usize);
        let strings = (strings_stream.offset as usize, strings_stream.size as usize);

        let tables_header = TablesHeader::from(slice(meta, tables)?)?;
        let strings_heap = Strings::from(slice(meta, strings)?)?;

        let module = match tables_header
            .table::<ModuleRaw>(TableId::Module)
            .and_then(|table| table.get(1))
        {
            Some(row) => {
                let Some(guid_stream) = root.stream("#GUID") else {
                    return Err(malformed_error!("Metadata has no #GUID heap"));
                };
                let guids = Guid::from(slice(
                    meta,
                    (guid_stream.offset as usize, guid_stream.size as usize),
                )?)?;

                let mut module = row.to_owned(&strings_heap, &guids)?;
                if module.name.is_empty() {
                    module.name = fallback_name.to_string();
                }
                module
            }
            None => MetadataModule {
                name: fallback_name.to_string(),
                generation: 0,
                mvid: uguid::Guid::ZERO,
            },
        };

        debug!(
            "parsed metadata of '{}' ({} tables, version {})",
            module.name,
            tables_header.table_count(),
            root.version
        );

        Ok(PeFile {
            data: Some(data),
            metadata,
            tables,
            strings,
            module: Arc::new(Module::Metadata(module)),
        })
    }

    fn metadata(&self) -> Result<&[u8]> {
        match &self.data {
            Some(data) => data.data_slice(self.metadata.0, self.metadata.1),
            None => Err(Error::Disposed("PeFile")),
        }
    }

    fn tables_header(&self) -> Result<TablesHeader<'_>> {
        TablesHeader::from(slice(self.metadata()?, self.tables)?)
    }
}

fn slice(data: &[u8], (offset, size): (usize, usize)) -> Result<&[u8]> {
    offset
        .checked_add(size)
        .and_then(|end| data.get(offset..end))
        .ok_or(OutOfBounds)
}

impl MetadataFile for PeFile {
    fn row_count(&self, table: TableId) -> Result<u32> {
        Ok(self.tables_header()?.table_row_count(table))
    }

    fn file_row(&self, index: ZeroBasedIndex) -> Result<FileRaw> {
        let tables = self.tables_header()?;
        let Some(files) = tables.table::<FileRaw>(TableId::File) else {
            return Err(OutOfBounds);
        };

        files.row(index)
    }

    fn read_string(&self, offset: u32) -> Result<String> {
        let heap = Strings::from(slice(self.metadata()?, self.strings)?)?;
        Ok(heap.get(offset as usize)?.to_string())
    }

    fn module(&self) -> ModuleRc {
        self.module.clone()
    }

    fn dispose(&mut self) {
        if self.data.take().is_some() {
            debug!("released metadata file '{}'", self.module.name());
        }
    }

    fn is_disposed(&self) -> bool {
        self.data.is_none()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::metadata::tables::FileAttributes;

    /// Builds a metadata blob: root, `#~` with a `Module` row and the given `File` rows,
    /// `#Strings` and `#GUID`
    pub(crate) fn crafted_metadata(module_name: &str, files: &[(&str, u32)]) -> Vec<u8> {
        let mut strings = vec![0u8];
        let module_name_offset = strings.len();
        strings.extend_from_slice(module_name.as_bytes());
        strings.push(0);

        let mut file_name_offsets = Vec::new();
        for (name, _) in files {
            file_name_offsets.push(strings.len());
            strings.extend_from_slice(name.as_bytes());
            strings.push(0);
        }
        while strings.len() % 4 != 0 {
            strings.push(0);
        }

        let mut valid: u64 = 1 << TableId::Module as u64;
        if !files.is_empty() {
            valid |= 1 << TableId::File as u64;
        }

        let mut tables = vec![0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x01];
        tables.extend_from_slice(&valid.to_le_bytes());
        tables.extend_from_slice(&0u64.to_le_bytes());
        tables.extend_from_slice(&1u32.to_le_bytes());
        if !files.is_empty() {
            tables.extend_from_slice(&u32::try_from(files.len()).unwrap().to_le_bytes());
        }

        // Module: generation, name, mvid, encid, encbaseid
        tables.extend_from_slice(&[0x00, 0x00]);
        tables.extend_from_slice(&u16::try_from(module_name_offset).unwrap().to_le_bytes());
        tables.extend_from_slice(&[0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);

        for ((_, flags), name_offset) in files.iter().zip(&file_name_offsets) {
            tables.extend_from_slice(&flags.to_le_bytes());
            tables.extend_from_slice(&u16::try_from(*name_offset).unwrap().to_le_bytes());
            tables.extend_from_slice(&[0x00, 0x00]);
        }
        while tables.len() % 4 != 0 {
            tables.push(0);
        }

        let guids: Vec<u8> = (1..=16).collect();

        // root: 20 bytes of fixed fields with "v4.0\0\0\0\0", then 3 stream headers
        let headers_size = 12 + 20 + 16;
        let tables_offset = 20 + 8 + headers_size;
        let strings_offset = tables_offset + tables.len();
        let guid_offset = strings_offset + strings.len();

        let mut data = vec![0x42, 0x53, 0x4A, 0x42, 0x01, 0x00, 0x01, 0x00];
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"v4.0\0\0\0\0");
        data.extend_from_slice(&[0x00, 0x00, 0x03, 0x00]);

        for (offset, size, name) in [
            (tables_offset, tables.len(), &b"#~\0\0"[..]),
            (strings_offset, strings.len(), &b"#Strings\0\0\0\0"[..]),
            (guid_offset, guids.len(), &b"#GUID\0\0\0"[..]),
        ] {
            data.extend_from_slice(&u32::try_from(offset).unwrap().to_le_bytes());
            data.extend_from_slice(&u32::try_from(size).unwrap().to_le_bytes());
            data.extend_from_slice(name);
        }
        assert_eq!(data.len(), tables_offset);

        data.extend_from_slice(&tables);
        data.extend_from_slice(&strings);
        data.extend_from_slice(&guids);
        data
    }

    #[test]
    fn manifest_with_files() {
        let data = crafted_metadata(
            "Main.dll",
            &[
                ("Helper.netmodule", FileAttributes::CONTAINS_META_DATA),
                ("Data.bin", FileAttributes::CONTAINS_NO_META_DATA),
            ],
        );

        let mut file = PeFile::from_metadata(data, "fallback").unwrap();
        assert_eq!(file.row_count(TableId::File).unwrap(), 2);
        assert_eq!(file.row_count(TableId::Module).unwrap(), 1);
        assert_eq!(file.row_count(TableId::TypeDef).unwrap(), 0);

        let module = file.module();
        assert_eq!(module.name(), "Main.dll");
        assert_eq!(module.mvid().unwrap().to_bytes()[0], 1);
        assert!(Arc::ptr_eq(&module, &file.module()));

        let helper = file.file_row(ZeroBasedIndex::new(0)).unwrap();
        assert!(helper.contains_metadata());
        assert_eq!(file.read_string(helper.name).unwrap(), "Helper.netmodule");

        let resource = file.file_row(ZeroBasedIndex::new(1)).unwrap();
        assert!(!resource.contains_metadata());
        assert_eq!(file.read_string(resource.name).unwrap(), "Data.bin");

        assert!(file.file_row(ZeroBasedIndex::new(2)).is_err());

        assert!(!file.is_disposed());
        file.dispose();
        assert!(file.is_disposed());
        file.dispose();

        assert!(matches!(
            file.row_count(TableId::File),
            Err(Error::Disposed(_))
        ));
        assert!(matches!(
            file.file_row(ZeroBasedIndex::new(0)),
            Err(Error::Disposed(_))
        ));
        assert!(matches!(file.read_string(1), Err(Error::Disposed(_))));
        assert_eq!(file.module().name(), "Main.dll");
    }

    #[test]
    fn module_without_files() {
        let data = crafted_metadata("", &[]);
        let file = PeFile::from_metadata(data, "Satellite.netmodule").unwrap();

        assert_eq!(file.row_count(TableId::File).unwrap(), 0);
        assert_eq!(file.module().name(), "Satellite.netmodule");
        assert!(file.file_row(ZeroBasedIndex::new(0)).is_err());
    }

    #[test]
    fn malformed() {
        let mut data = crafted_metadata("Main.dll", &[]);
        data[0] = 0x00;
        assert!(PeFile::from_metadata(data, "x").is_err());

        let data = crafted_metadata("Main.dll", &[("A.netmodule", 0)]);
        assert!(PeFile::from_metadata(data[..data.len() - 20].to_vec(), "x").is_err());

        assert!(PeFile::from_mem(vec![0x4D, 0x5A, 0x00]).is_err());
        assert!(PeFile::from_path(Path::new("/nonexistent/cilmeta/Main.dll"), false).is_err());
    }
}
