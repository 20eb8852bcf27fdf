//! CLI header (`IMAGE_COR20_HEADER`) of a managed PE image.
//!
//! The CLI header is located through the CLR runtime data directory of the PE optional header and
//! points at the metadata root. Only the fields needed to find and interpret the metadata are
//! validated here.
//!
//! # Reference
//! - [ECMA-335 II.25.3.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::io::read_le_at, Error::OutOfBounds, Result};

/// Size of the CLI header in bytes
pub const COR20_HEADER_SIZE: usize = 72;

/// The CLI header contains all of the runtime-specific data entries and other information.
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.25.3.3
pub struct Cor20Header {
    /// Size of the header in bytes
    pub cb: u32,
    /// The minimum version of the runtime required to run this program, currently 2.
    pub major_runtime_version: u16,
    /// The minor portion of the version, currently 0.
    pub minor_runtime_version: u16,
    /// RVA of the physical metadata
    pub meta_data_rva: u32,
    /// Size of the physical metadata
    pub meta_data_size: u32,
    /// Flags describing this runtime image. (§II.25.3.3.1).
    pub flags: u32,
    /// Token for the `MethodDef` or File of the entry point for the image
    pub entry_point_token: u32,
    /// RVA of implementation-specific resources.
    pub resource_rva: u32,
    /// Size of implementation-specific resources.
    pub resource_size: u32,
    /// RVA of the hash data for this PE file used by the CLI loader for binding and versioning
    pub strong_name_signature_rva: u32,
    /// Size of the hash data for this PE file used by the CLI loader for binding and versioning
    pub strong_name_signature_size: u32,
}

impl Cor20Header {
    /// Create a `Cor20Header` object from a sequence of bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the data is shorter than the header, or
    /// [`crate::Error::Malformed`] if the header size or metadata location is invalid.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        if data.len() < COR20_HEADER_SIZE {
            return Err(OutOfBounds);
        }

        let offset = &mut 0;

        let cb = read_le_at::<u32>(data, offset)?;
        if cb as usize != COR20_HEADER_SIZE {
            return Err(malformed_error!(
                "Invalid CLR header size: expected 72, got {}",
                cb
            ));
        }

        let major_runtime_version = read_le_at::<u16>(data, offset)?;
        let minor_runtime_version = read_le_at::<u16>(data, offset)?;

        let meta_data_rva = read_le_at::<u32>(data, offset)?;
        if meta_data_rva == 0 {
            return Err(malformed_error!("Metadata RVA cannot be zero"));
        }

        let meta_data_size = read_le_at::<u32>(data, offset)?;
        if meta_data_size == 0 {
            return Err(malformed_error!("Metadata size cannot be zero"));
        }

        Ok(Cor20Header {
            cb,
            major_runtime_version,
            minor_runtime_version,
            meta_data_rva,
            meta_data_size,
            flags: read_le_at::<u32>(data, offset)?,
            entry_point_token: read_le_at::<u32>(data, offset)?,
            resource_rva: read_le_at::<u32>(data, offset)?,
            resource_size: read_le_at::<u32>(data, offset)?,
            strong_name_signature_rva: read_le_at::<u32>(data, offset)?,
            strong_name_signature_size: read_le_at::<u32>(data, offset)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crafted() -> [u8; 72] {
        let mut header = [0u8; 72];
        header[0] = 0x48; // cb
        header[4] = 0x02; // major runtime version
        header[8..12].copy_from_slice(&0x2050u32.to_le_bytes());
        header[12..16].copy_from_slice(&0x0300u32.to_le_bytes());
        header[16] = 0x01; // ILONLY
        header[20..24].copy_from_slice(&0x0600_0001u32.to_le_bytes());
        header
    }

    #[test]
    fn read() {
        let header = Cor20Header::read(&crafted()).unwrap();

        assert_eq!(header.cb, 72);
        assert_eq!(header.major_runtime_version, 2);
        assert_eq!(header.minor_runtime_version, 0);
        assert_eq!(header.meta_data_rva, 0x2050);
        assert_eq!(header.meta_data_size, 0x300);
        assert_eq!(header.flags, 1);
        assert_eq!(header.entry_point_token, 0x0600_0001);
        assert_eq!(header.strong_name_signature_size, 0);
    }

    #[test]
    fn invalid() {
        assert!(matches!(Cor20Header::read(&[0u8; 71]), Err(OutOfBounds)));

        let mut wrong_size = crafted();
        wrong_size[0] = 0x40;
        assert!(Cor20Header::read(&wrong_size).is_err());

        let mut no_metadata = crafted();
        no_metadata[8..12].copy_from_slice(&[0; 4]);
        assert!(Cor20Header::read(&no_metadata).is_err());
    }
}
