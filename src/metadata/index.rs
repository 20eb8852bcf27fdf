//! Row index types for metadata tables.
//!
//! Metadata tables store references to rows as one-based indices, where `0` is the null
//! reference. In-memory row access is zero-based. The two are kept as distinct types so that the
//! off-by-one adjustment happens in exactly one place: [`OneBasedIndex::to_zero_based`] and
//! [`ZeroBasedIndex::to_one_based`].
//!
//! # Example
//!
//! ```rust
//! use cilmeta::metadata::index::{OneBasedIndex, ZeroBasedIndex};
//!
//! let wire = OneBasedIndex::new(1);
//! let row = wire.to_zero_based()?;
//! assert_eq!(row, ZeroBasedIndex::new(0));
//! assert_eq!(row.to_one_based()?, wire);
//!
//! assert!(OneBasedIndex::NULL.to_zero_based().is_err());
//! # Ok::<(), cilmeta::Error>(())
//! ```

use std::fmt;

use crate::{Error, Result};

/// A row index as stored in the metadata wire format; `1` is the first row, `0` is null.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OneBasedIndex(u32);

/// A row index as used for in-memory addressing; `0` is the first row.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ZeroBasedIndex(u32);

impl OneBasedIndex {
    /// The null reference
    pub const NULL: OneBasedIndex = OneBasedIndex(0);

    /// Creates a one-based index from its raw wire value
    #[must_use]
    pub const fn new(value: u32) -> Self {
        OneBasedIndex(value)
    }

    /// Returns the raw wire value
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns true if this index is the null reference
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Converts to the zero-based row this index refers to.
    ///
    /// # Errors
    /// Returns [`crate::Error::NullReference`] for the null index.
    pub fn to_zero_based(self) -> Result<ZeroBasedIndex> {
        match self.0.checked_sub(1) {
            Some(value) => Ok(ZeroBasedIndex(value)),
            None => Err(Error::NullReference),
        }
    }
}

impl ZeroBasedIndex {
    /// Creates a zero-based index
    #[must_use]
    pub const fn new(value: u32) -> Self {
        ZeroBasedIndex(value)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the value for slice addressing
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Converts to the one-based wire index for this row.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the row cannot be represented as a one-based `u32`.
    pub fn to_one_based(self) -> Result<OneBasedIndex> {
        match self.0.checked_add(1) {
            Some(value) => Ok(OneBasedIndex(value)),
            None => Err(Error::OutOfBounds),
        }
    }
}

impl TryFrom<OneBasedIndex> for ZeroBasedIndex {
    type Error = Error;

    fn try_from(index: OneBasedIndex) -> Result<Self> {
        index.to_zero_based()
    }
}

impl TryFrom<ZeroBasedIndex> for OneBasedIndex {
    type Error = Error;

    fn try_from(index: ZeroBasedIndex) -> Result<Self> {
        index.to_one_based()
    }
}

impl TryFrom<usize> for ZeroBasedIndex {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        u32::try_from(value)
            .map(ZeroBasedIndex)
            .map_err(|_| Error::OutOfBounds)
    }
}

impl fmt::Debug for OneBasedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "OneBasedIndex(null)")
        } else {
            write!(f, "OneBasedIndex({})", self.0)
        }
    }
}

impl fmt::Debug for ZeroBasedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZeroBasedIndex({})", self.0)
    }
}

impl fmt::Display for ZeroBasedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        for value in [0u32, 1, 2, 41, 0xFFFF, 0x00FF_FFFF, u32::MAX - 1] {
            let zero = ZeroBasedIndex::new(value);
            let one = zero.to_one_based().unwrap();
            assert_eq!(one.value(), value + 1);
            assert_eq!(one.to_zero_based().unwrap(), zero);
        }

        for value in [1u32, 2, 0x1_0000, u32::MAX] {
            let one = OneBasedIndex::new(value);
            assert_eq!(one.to_zero_based().unwrap().to_one_based().unwrap(), one);
        }
    }

    #[test]
    fn null_is_rejected() {
        assert!(OneBasedIndex::NULL.is_null());
        assert!(matches!(
            OneBasedIndex::new(0).to_zero_based(),
            Err(Error::NullReference)
        ));
        assert!(matches!(
            ZeroBasedIndex::try_from(OneBasedIndex::NULL),
            Err(Error::NullReference)
        ));
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(matches!(
            ZeroBasedIndex::new(u32::MAX).to_one_based(),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn from_usize() {
        assert_eq!(ZeroBasedIndex::try_from(7usize).unwrap().value(), 7);
        if usize::BITS > 32 {
            assert!(ZeroBasedIndex::try_from(usize::MAX).is_err());
        }
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", OneBasedIndex::NULL), "OneBasedIndex(null)");
        assert_eq!(format!("{:?}", OneBasedIndex::new(3)), "OneBasedIndex(3)");
        assert_eq!(format!("{:?}", ZeroBasedIndex::new(2)), "ZeroBasedIndex(2)");
    }
}
