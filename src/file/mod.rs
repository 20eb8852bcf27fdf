//! PE file abstraction for locating .NET metadata.
//!
//! This module provides the raw-byte layer underneath [`crate::metadata::pefile::PeFile`]. It
//! abstracts over different data sources (memory-mapped files, owned buffers), validates that the
//! input is a PE image carrying a CLR runtime header, and translates RVAs into file offsets so the
//! metadata root can be found.
//!
//! # Key Components
//!
//! - [`crate::file::File`] - A loaded PE image with its section table and CLR directory
//! - [`crate::file::Backend`] - Trait for different data sources
//! - [`crate::file::io`] - Low-level little-endian reading helpers
//!
//! # Backend Implementations
//! - [`crate::file::physical::Physical`] - Memory-mapped file backend for disk access
//! - [`crate::file::memory::Memory`] - In-memory buffer backend
//!
//! # Thread Safety
//!
//! All backends are `Send + Sync`; a [`File`] can be shared across threads for concurrent reads.

pub mod io;

mod memory;
mod physical;

use std::path::Path;

use crate::{
    metadata::cor20header::{Cor20Header, COR20_HEADER_SIZE},
    Error::{Empty, GoblinErr},
    Result,
};
use goblin::pe::{section_table::SectionTable, PE};
pub(crate) use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of PE data, allowing for both in-memory and on-disk
/// representations. All implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// Represents a loaded PE file with .NET metadata.
///
/// The PE headers are parsed once during loading; only the pieces needed to reach the metadata
/// (section table and CLR runtime header directory) are retained.
///
/// # Examples
///
/// ```rust,no_run
/// use cilmeta::File;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("tests/samples/WindowsBase.dll"))?;
/// let (clr_rva, clr_size) = file.clr();
/// let clr_offset = file.rva_to_offset(clr_rva)?;
/// let clr_data = file.data_slice(clr_offset, clr_size)?;
/// println!("CLR header starts with: {:02x?}", &clr_data[0..8]);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// Section headers, used for RVA translation
    sections: Vec<SectionTable>,
    /// RVA and size of the CLR runtime header
    clr: (usize, usize),
}

impl File {
    /// Loads a PE file from the given path, memory-mapping it.
    ///
    /// # Arguments
    ///
    /// * `file` - Path to the PE file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is empty, is not a valid PE image
    /// or does not carry a CLR runtime header.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a PE file from a memory buffer.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes of the PE file.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty, is not a valid PE image or does not carry
    /// a CLR runtime header.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    /// Internal loader for any backend.
    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let (sections, clr) = match PE::parse(data.data()) {
            Ok(pe) => {
                let Some(optional_header) = pe.header.optional_header.as_ref() else {
                    return Err(malformed_error!("File does not have an OptionalHeader"));
                };
                let Some(clr_dir) = optional_header.data_directories.get_clr_runtime_header()
                else {
                    return Err(malformed_error!(
                        "File does not have a CLR runtime header directory"
                    ));
                };

                (
                    pe.sections.clone(),
                    (clr_dir.virtual_address as usize, clr_dir.size as usize),
                )
            }
            Err(error) => return Err(GoblinErr(error)),
        };

        Ok(File {
            data: Box::new(data),
            sections,
            clr,
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the RVA and size of the CLR runtime header.
    #[must_use]
    pub fn clr(&self) -> (usize, usize) {
        self.clr
    }

    /// Returns the raw data of the loaded file.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a slice of the file data at the given offset and length.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the file.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Locates the metadata root through the CLI header.
    ///
    /// Returns the file offset and size of the physical metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the CLI header is malformed, or if the metadata it points at lies
    /// outside of the file.
    pub fn metadata_range(&self) -> Result<(usize, usize)> {
        let clr_offset = self.rva_to_offset(self.clr.0)?;
        let header = Cor20Header::read(self.data_slice(clr_offset, COR20_HEADER_SIZE)?)?;

        let offset = self.rva_to_offset(header.meta_data_rva as usize)?;
        let size = header.meta_data_size as usize;
        self.data_slice(offset, size)?;

        Ok((offset, size))
    }

    /// Releases the section table and returns the underlying data source.
    #[must_use]
    pub fn into_backend(self) -> Box<dyn Backend> {
        self.data
    }

    /// Converts a relative virtual address (RVA) to a file offset.
    ///
    /// # Arguments
    ///
    /// * `rva` - The RVA to convert.
    ///
    /// # Errors
    ///
    /// Returns an error if no section contains the RVA, or a section header overflows.
    pub fn rva_to_offset(&self, rva: usize) -> Result<usize> {
        let rva_u32 =
            u32::try_from(rva).map_err(|_| malformed_error!("RVA too large to fit in u32: {}", rva))?;

        for section in &self.sections {
            let Some(section_max) = section.virtual_address.checked_add(section.virtual_size)
            else {
                return Err(malformed_error!(
                    "Section malformed, causing integer overflow - {} + {}",
                    section.virtual_address,
                    section.virtual_size
                ));
            };

            if section.virtual_address <= rva_u32 && section_max > rva_u32 {
                return Ok((rva - section.virtual_address as usize)
                    + section.pointer_to_raw_data as usize);
            }
        }

        Err(malformed_error!(
            "RVA could not be converted to offset - {}",
            rva
        ))
    }
}
