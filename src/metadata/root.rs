//! Metadata root header and stream directory.
//!
//! The metadata root is the entry point for reading module metadata. It contains the version
//! string and the directory of streams (`#~`, `#Strings`, `#GUID`, ...) that follow it.
//!
//! # Reference
//! - [ECMA-335 II.24.2.1](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::io::{read_le, read_le_at},
    metadata::streams::{StreamHeader, STREAM_NAMES},
    Error::OutOfBounds,
    Result,
};

/// The magic signature of the metadata root, 'BSJB'
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The CLI metadata root. Contains all the stream headers and version information.
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.1
pub struct Root {
    /// Magic signature for physical metadata: 0x424A5342
    pub signature: u32,
    /// Major version, 1 (ignore on read)
    pub major_version: u16,
    /// Minor version, 1 (ignore on read)
    pub minor_version: u16,
    /// Reserved, always 0
    pub reserved: u32,
    /// Number of bytes allocated to hold the version string, rounded up to a multiple of four
    pub length: u32,
    /// UTF8-encoded version string, without its null padding
    pub version: String,
    /// Reserved, always 0
    pub flags: u16,
    /// Number of streams
    pub stream_number: u16,
    /// Stream headers
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Create a `Root` object from a sequence of bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if a stream points past the metadata, or
    /// [`crate::Error::Malformed`] if the signature, the stream count or a stream name is invalid.
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 20 {
            return Err(OutOfBounds);
        }

        let signature = read_le::<u32>(data)?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - {}",
                signature
            ));
        }

        let length = read_le_at::<u32>(data, &mut 12)?;
        let version_end = (length as usize)
            .checked_add(16)
            .filter(|end| *end + 4 <= data.len())
            .ok_or(OutOfBounds)?;

        let version: String = data[16..version_end]
            .iter()
            .take_while(|byte| **byte != 0)
            .map(|byte| char::from(*byte))
            .collect();

        let mut cursor = version_end;
        let flags = read_le_at::<u16>(data, &mut cursor)?;
        let stream_count = read_le_at::<u16>(data, &mut cursor)?;
        if stream_count == 0 || stream_count as usize > STREAM_NAMES.len() {
            return Err(malformed_error!("Invalid stream count - {}", stream_count));
        }

        let mut streams: Vec<StreamHeader> = Vec::with_capacity(stream_count as usize);
        let mut stream_offset = cursor;
        for _ in 0..stream_count {
            let new_stream = StreamHeader::from(data.get(stream_offset..).ok_or(OutOfBounds)?)?;

            match u32::checked_add(new_stream.offset, new_stream.size) {
                Some(end) if end as usize <= data.len() => {}
                Some(_) => return Err(OutOfBounds),
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        new_stream.offset,
                        new_stream.size
                    ))
                }
            }

            if streams.iter().any(|stream| stream.name == new_stream.name) {
                return Err(malformed_error!("Duplicate stream - {}", new_stream.name));
            }

            stream_offset += new_stream.header_size();
            streams.push(new_stream);
        }

        Ok(Root {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            reserved: read_le::<u32>(&data[8..])?,
            length,
            version,
            flags,
            stream_number: stream_count,
            stream_headers: streams,
        })
    }

    /// Looks up a stream header by name
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.stream_headers.iter().find(|stream| stream.name == name)
    }

    /// The tables stream, compressed (`#~`) or uncompressed (`#-`)
    #[must_use]
    pub fn tables_stream(&self) -> Option<&StreamHeader> {
        self.stream("#~").or_else(|| self.stream("#-"))
    }
}
