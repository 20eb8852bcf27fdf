use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{
    metadata::{
        index::{OneBasedIndex, ZeroBasedIndex},
        tables::types::{CodedIndexType, TableId},
        token::{MetadataToken, Token},
    },
    Error, Result,
};

/// Number of low bits holding the table selector
pub const TYPE_DEF_OR_REF_TAG_BITS: u32 = 2;
/// Mask selecting the table selector bits
pub const TYPE_DEF_OR_REF_TAG_MASK: u32 = (1 << TYPE_DEF_OR_REF_TAG_BITS) - 1;

/// A `TypeDefOrRef` coded token, as found in the `extends` column of `TypeDef`, in
/// `InterfaceImpl`, `Event`, `GenericParamConstraint` and in signature blobs.
///
/// The raw value keeps the table selector in its low two bits (`0` = `TypeDef`, `1` = `TypeRef`,
/// `2` = `TypeSpec`) and a one-based row index in the remaining bits. The token is null when the
/// index bits are zero, whatever the selector bits hold.
///
/// The selector is validated once, by [`TypeDefOrRef::decode`]; a successfully decoded token
/// always has a defined table. Equality, ordering and hashing ignore the selector bits of null
/// tokens, order null before non-null, and otherwise order by row index then by table number.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::{index::ZeroBasedIndex, tables::{TableId, TypeDefOrRef}};
///
/// let token = TypeDefOrRef::decode(0x0000_0015)?;
/// assert_eq!(token.table()?, TableId::TypeRef);
/// assert_eq!(token.index()?, ZeroBasedIndex::new(4));
///
/// assert!(TypeDefOrRef::decode(0x0000_0002)?.is_null());
/// assert!(TypeDefOrRef::decode(0x0000_0007).is_err());
/// # Ok::<(), cilmeta::Error>(())
/// ```
///
/// ## Reference
/// * '<https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf>' - II.24.2.6
#[derive(Clone, Copy)]
pub struct TypeDefOrRef {
    raw: u32,
}

impl TypeDefOrRef {
    /// The null token
    pub const NULL: TypeDefOrRef = TypeDefOrRef { raw: 0 };

    /// Decodes a raw `TypeDefOrRef` value.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the value is not null and its selector bits do not
    /// name one of `TypeDef`, `TypeRef` or `TypeSpec`.
    pub fn decode(raw: u32) -> Result<Self> {
        let token = TypeDefOrRef { raw };
        if !token.is_null() {
            Self::table_for_tag(raw & TYPE_DEF_OR_REF_TAG_MASK)?;
        }
        Ok(token)
    }

    /// Encodes a reference to `index` in `table`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `table` is not part of the coded set, or
    /// [`crate::Error::OutOfBounds`] if the row does not fit beside the selector bits.
    pub fn encode(table: TableId, index: ZeroBasedIndex) -> Result<Self> {
        let Some(tag) = CodedIndexType::TypeDefOrRef
            .tables()
            .iter()
            .position(|candidate| *candidate == table)
        else {
            return Err(malformed_error!(
                "Table {:?} can not be encoded as TypeDefOrRef",
                table
            ));
        };

        let row = index.to_one_based()?.value();
        if row > (u32::MAX >> TYPE_DEF_OR_REF_TAG_BITS) {
            return Err(Error::OutOfBounds);
        }

        Ok(TypeDefOrRef {
            raw: (row << TYPE_DEF_OR_REF_TAG_BITS) | tag as u32,
        })
    }

    /// Returns the raw coded value
    #[must_use]
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Returns true if the index bits are zero
    #[must_use]
    pub fn is_null(&self) -> bool {
        (self.raw & !TYPE_DEF_OR_REF_TAG_MASK) >> TYPE_DEF_OR_REF_TAG_BITS == 0
    }

    /// The table this token refers to
    ///
    /// # Errors
    /// Returns [`crate::Error::NullReference`] if the token is null.
    pub fn table(&self) -> Result<TableId> {
        self.null_check()?;
        Self::table_for_tag(self.raw & TYPE_DEF_OR_REF_TAG_MASK)
    }

    /// The zero-based row this token refers to
    ///
    /// # Errors
    /// Returns [`crate::Error::NullReference`] if the token is null.
    pub fn index(&self) -> Result<ZeroBasedIndex> {
        self.null_check()?;
        self.one_based().to_zero_based()
    }

    /// Converts into the equivalent full metadata token, `None` for the null token
    #[must_use]
    pub fn to_token(&self) -> Option<Token> {
        let table = self.table().ok()?;
        Some(Token::new(
            table.token_base() | (self.one_based().value() & 0x00FF_FFFF),
        ))
    }

    fn one_based(&self) -> OneBasedIndex {
        OneBasedIndex::new(self.raw >> TYPE_DEF_OR_REF_TAG_BITS)
    }

    fn null_check(&self) -> Result<()> {
        if self.is_null() {
            return Err(Error::NullReference);
        }
        Ok(())
    }

    fn table_for_tag(tag: u32) -> Result<TableId> {
        match tag {
            0 => Ok(TableId::TypeDef),
            1 => Ok(TableId::TypeRef),
            2 => Ok(TableId::TypeSpec),
            _ => Err(malformed_error!("Invalid TypeDefOrRef table tag - {}", tag)),
        }
    }

    /// `None` for null, `(row, table)` otherwise; the derived `Option` order puts null first
    fn sort_key(&self) -> Option<(u32, TableId)> {
        if self.is_null() {
            return None;
        }
        // The selector was validated by `decode`/`encode`
        let table = Self::table_for_tag(self.raw & TYPE_DEF_OR_REF_TAG_MASK).ok()?;
        Some((self.one_based().value(), table))
    }
}

impl MetadataToken for TypeDefOrRef {
    fn is_null(&self) -> bool {
        TypeDefOrRef::is_null(self)
    }

    fn table_id(&self) -> Result<TableId> {
        self.table()
    }

    fn row_index(&self) -> Result<ZeroBasedIndex> {
        self.index()
    }
}

impl PartialEq for TypeDefOrRef {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for TypeDefOrRef {}

impl PartialOrd for TypeDefOrRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeDefOrRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl Hash for TypeDefOrRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl Default for TypeDefOrRef {
    fn default() -> Self {
        TypeDefOrRef::NULL
    }
}

impl TryFrom<u32> for TypeDefOrRef {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self> {
        TypeDefOrRef::decode(raw)
    }
}

impl fmt::Debug for TypeDefOrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sort_key() {
            None => write!(f, "TypeDefOrRef(null)"),
            Some((row, table)) => write!(f, "TypeDefOrRef({:?}, row: {})", table, row),
        }
    }
}
