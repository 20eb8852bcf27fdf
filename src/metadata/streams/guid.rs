//! GUID Heap (`#GUID`) for .NET Metadata
//!
//! Provides access to the ECMA-335 `#GUID` heap, which stores the 128-bit module version ids.
//!
//! # Reference
//! - [ECMA-335 II.24.2.5](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{Error::OutOfBounds, Result};

/// '#GUID' is a heap, which contains a sequence of 128-bit GUIDs. Indexes into this heap are
/// one-based: index `1` is the first GUID.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::streams::Guid;
/// let data = &[0u8; 32];
/// let guids = Guid::from(data).unwrap();
/// assert!(guids.get(2).is_ok());
/// assert!(guids.get(3).is_err());
/// ```
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Create a `Guid` heap view from a sequence of bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap cannot hold a single GUID.
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() < 16 {
            return Err(malformed_error!("Data for #Guid heap is too small"));
        }

        Ok(Guid { data })
    }

    /// Get the GUID at the one-based `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for index `0` or an index past the heap.
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index < 1 || index.saturating_mul(16) > self.data.len() {
            return Err(OutOfBounds);
        }

        let offset_start = (index - 1) * 16;
        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(&self.data[offset_start..offset_start + 16]);

        Ok(uguid::Guid::from_bytes(buffer))
    }
}
