//! In-memory file backend.
//!
//! Backs [`crate::metadata::pefile::PeFile`] when an image is read with
//! [`crate::LoaderConfig::in_memory`], and every bare metadata blob opened through
//! [`crate::metadata::pefile::PeFile::from_metadata`].

use super::Backend;
use crate::{Error::OutOfBounds, Result};

/// A backend owning the complete image or metadata blob
#[derive(Debug)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Takes ownership of `data`
    pub fn new(data: Vec<u8>) -> Memory {
        Memory { data }
    }
}

impl Backend for Memory {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(OutOfBounds)
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_root_slice() {
        let mut blob = b"BSJB".to_vec();
        blob.extend_from_slice(&[0x01, 0x00, 0x01, 0x00]);
        let memory = Memory::new(blob);

        assert_eq!(memory.len(), 8);
        assert_eq!(memory.data_slice(0, 4).unwrap(), b"BSJB");
        assert_eq!(memory.data_slice(4, 4).unwrap(), &[0x01, 0x00, 0x01, 0x00]);
        assert_eq!(memory.data(), memory.data_slice(0, 8).unwrap());
    }

    #[test]
    fn out_of_range() {
        let memory = Memory::new(vec![0x00; 72]);

        assert!(matches!(memory.data_slice(0, 73), Err(OutOfBounds)));
        assert!(matches!(memory.data_slice(72, 1), Err(OutOfBounds)));
        assert!(matches!(memory.data_slice(usize::MAX, 2), Err(OutOfBounds)));
        assert!(memory.data_slice(72, 0).unwrap().is_empty());
    }

    #[test]
    fn empty() {
        let memory = Memory::new(Vec::new());

        assert_eq!(memory.len(), 0);
        assert!(memory.data().is_empty());
        assert!(memory.data_slice(0, 0).unwrap().is_empty());
        assert!(matches!(memory.data_slice(0, 1), Err(OutOfBounds)));
    }
}
