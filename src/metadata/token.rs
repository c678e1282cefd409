//! Metadata tokens, the keys linking analysis entities to their managed counterparts.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Table ids (high byte of a [`Token`]) for the entities this crate links.
#[allow(non_snake_case)]
pub mod TableId {
    /// `TypeDef` table
    pub const TYPE_DEF: u8 = 0x02;
    /// `Field` table
    pub const FIELD: u8 = 0x04;
    /// `MethodDef` table
    pub const METHOD_DEF: u8 = 0x06;
    /// `Param` table
    pub const PARAM: u8 = 0x08;
    /// `Event` table
    pub const EVENT: u8 = 0x14;
    /// `Property` table
    pub const PROPERTY: u8 = 0x17;
    /// `TypeSpec` table
    pub const TYPE_SPEC: u8 = 0x1B;
    /// `GenericParam` table
    pub const GENERIC_PARAM: u8 = 0x2A;
}

/// A metadata token identifying an analysis entity or a managed definition.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table id and a 1-based row
    #[must_use]
    pub fn from_parts(table: u8, row: u32) -> Self {
        Token((u32::from(table) << 24) | (row & 0x00FF_FFFF))
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

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the token belongs to `table`
    #[must_use]
    pub fn is_table(&self, table: u8) -> bool {
        self.table() == table
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

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let token = Token::from_parts(TableId::METHOD_DEF, 12);
        assert_eq!(token.value(), 0x0600_000C);
        assert_eq!(token.table(), TableId::METHOD_DEF);
        assert_eq!(token.row(), 12);
        assert!(token.is_table(TableId::METHOD_DEF));
        assert!(!token.is_table(TableId::FIELD));
    }

    #[test]
    fn test_from_parts_truncates_row() {
        let token = Token::from_parts(TableId::GENERIC_PARAM, 0x0100_0001);
        assert_eq!(token.table(), TableId::GENERIC_PARAM);
        assert_eq!(token.row(), 1);
    }

    #[test]
    fn test_display_and_debug() {
        let token = Token(0x02000005);
        assert_eq!(token.to_string(), "0x02000005");
        let debug_str = format!("{token:?}");
        assert!(debug_str.contains("table: 0x02"));
        assert!(debug_str.contains("row: 5"));
    }

    #[test]
    fn test_null() {
        assert!(Token::new(0).is_null());
        assert!(!Token::from_parts(TableId::TYPE_DEF, 1).is_null());
    }
}
