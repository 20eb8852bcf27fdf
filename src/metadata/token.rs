use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{
    metadata::{
        index::{OneBasedIndex, ZeroBasedIndex},
        tables::TableId,
    },
    Result,
};

/// Common view over every kind of reference into a metadata table.
///
/// Implemented by the full 32-bit [`Token`] and by coded tokens such as
/// [`crate::metadata::tables::TypeDefOrRef`]. The provided [`MetadataToken::token_cmp`] defines
/// one total order shared by all implementations: null tokens are equal to each other and sort
/// before every non-null token; non-null tokens compare by row index first and table second.
pub trait MetadataToken {
    /// Returns true if this token does not reference any row
    fn is_null(&self) -> bool;

    /// The table this token refers to
    ///
    /// # Errors
    /// Returns [`crate::Error::NullReference`] for null tokens, or [`crate::Error::Malformed`]
    /// if the table cannot be determined.
    fn table_id(&self) -> Result<TableId>;

    /// The zero-based row this token refers to
    ///
    /// # Errors
    /// Returns [`crate::Error::NullReference`] for null tokens.
    fn row_index(&self) -> Result<ZeroBasedIndex>;

    /// Compares two tokens of possibly different kinds
    ///
    /// # Errors
    /// Returns an error if a non-null token cannot be decoded.
    fn token_cmp(&self, other: &dyn MetadataToken) -> Result<Ordering> {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ok(Ordering::Equal),
            (true, false) => Ok(Ordering::Less),
            (false, true) => Ok(Ordering::Greater),
            (false, false) => Ok(self
                .row_index()?
                .cmp(&other.row_index()?)
                .then(self.table_id()?.cmp(&other.table_id()?))),
        }
    }

    /// Tests two tokens of possibly different kinds for equality
    ///
    /// # Errors
    /// Returns an error if a non-null token cannot be decoded.
    fn token_eq(&self, other: &dyn MetadataToken) -> Result<bool> {
        Ok(self.token_cmp(other)? == Ordering::Equal)
    }
}

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the one-based row index within that table
///
/// Equality, ordering and hashing follow [`MetadataToken::token_cmp`]: every token with row `0`
/// is the same null token, and other tokens order by row first and table second.
#[derive(Clone, Copy)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the one-based row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this token references no row (row 0), whatever its table byte
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row() == 0
    }

    fn sort_key(&self) -> Option<(u32, u8)> {
        if self.is_null() {
            None
        } else {
            Some((self.row(), self.table()))
        }
    }
}

impl MetadataToken for Token {
    fn is_null(&self) -> bool {
        Token::is_null(self)
    }

    fn table_id(&self) -> Result<TableId> {
        if Token::is_null(self) {
            return Err(crate::Error::NullReference);
        }
        TableId::try_from(self.table())
    }

    fn row_index(&self) -> Result<ZeroBasedIndex> {
        OneBasedIndex::new(self.row()).to_zero_based()
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Token {}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::collections::HashMap;

    #[test]
    fn test_token_table() {
        let token = Token(0x06000001);
        assert_eq!(token.table(), 0x06);

        let token2 = Token(0x02000005);
        assert_eq!(token2.table(), 0x02);

        let token3 = Token(0x00000000);
        assert_eq!(token3.table(), 0x00);
    }

    #[test]
    fn test_token_row() {
        let token = Token(0x06000001);
        assert_eq!(token.row(), 1);

        let token2 = Token(0x06FFFFFF);
        assert_eq!(token2.row(), 0x00FFFFFF);
    }

    #[test]
    fn test_token_is_null() {
        assert!(Token(0x00000000).is_null());
        assert!(Token(0x02000000).is_null());
        assert!(!Token(0x06000001).is_null());
    }

    #[test]
    fn test_token_from_conversion() {
        let value = 0x06000001u32;
        let token: Token = value.into();
        assert_eq!(token.value(), value);

        let back_to_u32: u32 = token.into();
        assert_eq!(back_to_u32, value);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(format!("{}", Token(0x06000001)), "0x06000001");
        assert_eq!(format!("{}", Token(0x00000000)), "0x00000000");
    }

    #[test]
    fn test_token_debug() {
        let debug_str = format!("{:?}", Token(0x06000001));
        assert!(debug_str.contains("Token(0x06000001"));
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_hash() {
        let mut map = HashMap::new();
        let token1 = Token(0x06000001);
        let token2 = Token(0x06000002);

        map.insert(token1, "Method1");
        map.insert(token2, "Method2");

        assert_eq!(map.get(&token1), Some(&"Method1"));
        assert_eq!(map.get(&token2), Some(&"Method2"));
    }

    #[test]
    fn test_metadata_token_view() {
        let token = Token(0x02000003);
        assert_eq!(token.table_id().unwrap(), TableId::TypeDef);
        assert_eq!(token.row_index().unwrap(), ZeroBasedIndex::new(2));

        let null = Token(0x02000000);
        assert!(matches!(null.table_id(), Err(Error::NullReference)));
        assert!(matches!(null.row_index(), Err(Error::NullReference)));

        assert!(Token(0x7F000001).table_id().is_err());
    }

    #[test]
    fn test_token_cmp_orders_by_row_then_table() {
        let typedef_2 = Token(0x02000002);
        let typeref_2 = Token(0x01000002);
        let typespec_1 = Token(0x1B000001);
        let null = Token(0);

        assert_eq!(typespec_1.token_cmp(&typedef_2).unwrap(), Ordering::Less);
        assert_eq!(typeref_2.token_cmp(&typedef_2).unwrap(), Ordering::Less);
        assert_eq!(null.token_cmp(&typespec_1).unwrap(), Ordering::Less);
        assert_eq!(typespec_1.token_cmp(&null).unwrap(), Ordering::Greater);
        assert!(null.token_eq(&Token(0x01000000)).unwrap());
    }

    #[test]
    fn test_token_ord_matches_token_cmp() {
        let mut tokens = vec![
            Token(0x02000002),
            Token(0x1B000001),
            Token(0x02000000),
            Token(0x01000002),
            Token(0),
        ];
        tokens.sort();

        assert!(tokens[0].is_null());
        assert!(tokens[1].is_null());
        assert_eq!(
            tokens[2..].iter().map(Token::value).collect::<Vec<_>>(),
            vec![0x1B000001, 0x01000002, 0x02000002]
        );

        for pair in tokens.windows(2) {
            assert_eq!(
                pair[0].cmp(&pair[1]),
                pair[0].token_cmp(&pair[1]).unwrap()
            );
        }
    }

    #[test]
    fn test_null_tokens_are_equal() {
        assert_eq!(Token(0x02000000), Token(0));
        assert_ne!(Token(0x02000001), Token(0x01000001));

        let mut map = HashMap::new();
        map.insert(Token(0x02000000), "null");
        assert_eq!(map.get(&Token(0x06000000)), Some(&"null"));
        assert_eq!(map.len(), 1);
    }
}
