//! Collaborator interfaces of [`super::ModuleCollection`].
//!
//! The collection does not parse files itself. It reads the manifest's `File` table through
//! [`MetadataFile`] and asks a [`FileOpener`] for every satellite module it needs.

use crate::{
    metadata::{
        index::ZeroBasedIndex,
        module::ModuleRc,
        tables::{FileRaw, TableId},
    },
    Result,
};

/// An open file with CLI metadata
pub trait MetadataFile: Send + Sync {
    /// Number of rows in `table`, `0` if the table is absent
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] after [`MetadataFile::dispose`], or an error if the
    /// tables stream cannot be read.
    fn row_count(&self, table: TableId) -> Result<u32>;

    /// Reads a row of the `File` table
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the row does not exist, or
    /// [`crate::Error::Disposed`] after disposal.
    fn file_row(&self, index: ZeroBasedIndex) -> Result<FileRaw>;

    /// Reads the identifier at `offset` of the `#Strings` heap
    ///
    /// # Errors
    /// Returns an error if the offset is invalid or the file has been disposed.
    fn read_string(&self, offset: u32) -> Result<String>;

    /// The module this file represents. The same `Arc` is returned on every call.
    fn module(&self) -> ModuleRc;

    /// Releases the file. Further reads fail; calling it again has no effect.
    fn dispose(&mut self);

    /// True once [`MetadataFile::dispose`] has been called
    fn is_disposed(&self) -> bool;
}

/// Opens satellite modules by the name listed in the manifest's `File` table
pub trait FileOpener: Send + Sync {
    /// Opens the metadata file called `name`
    ///
    /// # Errors
    /// Returns an error if the file cannot be found, read or parsed.
    fn open(&self, name: &str) -> Result<Box<dyn MetadataFile>>;
}
