//! Stream Header for .NET Metadata Streams
//!
//! Each metadata stream is announced in the metadata root by a header holding its offset, size
//! and a null-terminated name padded to four bytes.
//!
//! # Reference
//! - [ECMA-335 II.24.2.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::io::read_le, Error::OutOfBounds, Result};

/// Names of the streams this crate recognizes; `#-` is the uncompressed tables stream
pub const STREAM_NAMES: [&str; 6] = ["#Strings", "#US", "#Blob", "#GUID", "#~", "#-"];

/// A stream header provides the names, and the position and length of a particular table or heap. Note that the
/// length of a Stream header structure is not fixed, but depends on the length of its name field (a variable
/// length null-terminated string).
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.2
pub struct StreamHeader {
    /// Memory offset to start of this stream from start of the metadata root
    pub offset: u32,
    /// Size of this stream in bytes, shall be a multiple of 4.
    pub size: u32,
    /// Name of the stream as null-terminated variable length array of ASCII characters
    pub name: String,
}

impl StreamHeader {
    /// Create a `StreamHeader` object from a sequence of bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the data is too short, or
    /// [`crate::Error::Malformed`] if the stream name is not recognized.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(OutOfBounds);
        }

        let name_bytes = &data[8..data.len().min(8 + 32)];
        let name: String = name_bytes
            .iter()
            .take_while(|byte| **byte != 0)
            .map(|byte| char::from(*byte))
            .collect();

        if !STREAM_NAMES.iter().any(|valid_name| name == *valid_name) {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
        })
    }

    /// Size of this header in the metadata root, including the padded name
    #[must_use]
    pub fn header_size(&self) -> usize {
        8 + ((self.name.len() + 4) & !3)
    }
}
