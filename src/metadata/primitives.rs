//! Built-in CLR primitive types and constant values.
//!
//! [`CilPrimitiveKind`] names the primitive types native references can point at directly, and
//! [`CilPrimitive`] pairs a kind with a value. The latter is what default values of fields and
//! parameters carry, and what is attached to the managed definitions as their constant.

use std::fmt;

use crate::metadata::token::Token;

#[allow(non_snake_case, dead_code, missing_docs)]
/// Element type bytes used when encoding constants and signatures - ECMA-335 §II.23.1.16
pub mod ELEMENT_TYPE {
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    pub const CLASS: u8 = 0x12;
    pub const TYPEDBYREF: u8 = 0x16;
    pub const I: u8 = 0x18;
    pub const U: u8 = 0x19;
    pub const OBJECT: u8 = 0x1c;
}

/// All primitive types in CIL/.NET (without data)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum CilPrimitiveKind {
    /// System.Void - represents no value
    Void,
    /// System.Boolean - true/false value
    Boolean,
    /// System.Char - Unicode 16-bit character
    Char,
    /// System.SByte - signed 8-bit integer
    I1,
    /// System.Byte - unsigned 8-bit integer
    U1,
    /// System.Int16 - signed 16-bit integer
    I2,
    /// System.UInt16 - unsigned 16-bit integer
    U2,
    /// System.Int32 - signed 32-bit integer
    I4,
    /// System.UInt32 - unsigned 32-bit integer
    U4,
    /// System.Int64 - signed 64-bit integer
    I8,
    /// System.UInt64 - unsigned 64-bit integer
    U8,
    /// System.Single - 32-bit floating point
    R4,
    /// System.Double - 64-bit floating point
    R8,
    /// System.IntPtr - native sized signed integer
    I,
    /// System.UIntPtr - native sized unsigned integer
    U,
    /// System.Object - base class for all reference types
    Object,
    /// System.String - immutable string of Unicode characters
    String,
    /// System.TypedReference - type-safe pointer (used by compiler)
    TypedReference,
}

impl CilPrimitiveKind {
    /// Artificial token for this primitive, outside of any real table
    #[must_use]
    pub fn token(&self) -> Token {
        Token::new(0xF000_0001 + *self as u32)
    }

    /// Element type byte of this primitive
    #[must_use]
    pub fn element_type(&self) -> u8 {
        match self {
            CilPrimitiveKind::Void => ELEMENT_TYPE::VOID,
            CilPrimitiveKind::Boolean => ELEMENT_TYPE::BOOLEAN,
            CilPrimitiveKind::Char => ELEMENT_TYPE::CHAR,
            CilPrimitiveKind::I1 => ELEMENT_TYPE::I1,
            CilPrimitiveKind::U1 => ELEMENT_TYPE::U1,
            CilPrimitiveKind::I2 => ELEMENT_TYPE::I2,
            CilPrimitiveKind::U2 => ELEMENT_TYPE::U2,
            CilPrimitiveKind::I4 => ELEMENT_TYPE::I4,
            CilPrimitiveKind::U4 => ELEMENT_TYPE::U4,
            CilPrimitiveKind::I8 => ELEMENT_TYPE::I8,
            CilPrimitiveKind::U8 => ELEMENT_TYPE::U8,
            CilPrimitiveKind::R4 => ELEMENT_TYPE::R4,
            CilPrimitiveKind::R8 => ELEMENT_TYPE::R8,
            CilPrimitiveKind::I => ELEMENT_TYPE::I,
            CilPrimitiveKind::U => ELEMENT_TYPE::U,
            CilPrimitiveKind::Object => ELEMENT_TYPE::OBJECT,
            CilPrimitiveKind::String => ELEMENT_TYPE::STRING,
            CilPrimitiveKind::TypedReference => ELEMENT_TYPE::TYPEDBYREF,
        }
    }

    /// Get the CLR full type name (with namespace)
    #[must_use]
    pub fn clr_full_name(&self) -> &'static str {
        match self {
            CilPrimitiveKind::Void => "System.Void",
            CilPrimitiveKind::Boolean => "System.Boolean",
            CilPrimitiveKind::Char => "System.Char",
            CilPrimitiveKind::I1 => "System.SByte",
            CilPrimitiveKind::U1 => "System.Byte",
            CilPrimitiveKind::I2 => "System.Int16",
            CilPrimitiveKind::U2 => "System.UInt16",
            CilPrimitiveKind::I4 => "System.Int32",
            CilPrimitiveKind::U4 => "System.UInt32",
            CilPrimitiveKind::I8 => "System.Int64",
            CilPrimitiveKind::U8 => "System.UInt64",
            CilPrimitiveKind::R4 => "System.Single",
            CilPrimitiveKind::R8 => "System.Double",
            CilPrimitiveKind::I => "System.IntPtr",
            CilPrimitiveKind::U => "System.UIntPtr",
            CilPrimitiveKind::Object => "System.Object",
            CilPrimitiveKind::String => "System.String",
            CilPrimitiveKind::TypedReference => "System.TypedReference",
        }
    }

    /// Returns true for `System.Void`
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, CilPrimitiveKind::Void)
    }

    /// Check if this primitive is a value type
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        !matches!(
            self,
            CilPrimitiveKind::Void | CilPrimitiveKind::Object | CilPrimitiveKind::String
        )
    }
}

/// A constant value, as attached to fields and parameters
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CilPrimitiveData {
    /// A null reference
    #[default]
    Null,
    /// Boolean value
    Boolean(bool),
    /// Character value
    Char(char),
    /// 8-bit signed integer
    I1(i8),
    /// 8-bit unsigned integer
    U1(u8),
    /// 16-bit signed integer
    I2(i16),
    /// 16-bit unsigned integer
    U2(u16),
    /// 32-bit signed integer
    I4(i32),
    /// 32-bit unsigned integer
    U4(u32),
    /// 64-bit signed integer
    I8(i64),
    /// 64-bit unsigned integer
    U8(u64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// String value
    String(String),
}

/// A typed constant value
#[derive(Debug, Clone, PartialEq)]
pub struct CilPrimitive {
    /// The element type of the constant (`CLASS` for null references)
    pub element_type: u8,
    /// The actual value
    pub data: CilPrimitiveData,
}

impl CilPrimitive {
    /// Create a boolean constant
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::with_data(ELEMENT_TYPE::BOOLEAN, CilPrimitiveData::Boolean(value))
    }

    /// Create a character constant
    #[must_use]
    pub fn char(value: char) -> Self {
        Self::with_data(ELEMENT_TYPE::CHAR, CilPrimitiveData::Char(value))
    }

    /// Create an i8 constant
    #[must_use]
    pub fn i1(value: i8) -> Self {
        Self::with_data(ELEMENT_TYPE::I1, CilPrimitiveData::I1(value))
    }

    /// Create a u8 constant
    #[must_use]
    pub fn u1(value: u8) -> Self {
        Self::with_data(ELEMENT_TYPE::U1, CilPrimitiveData::U1(value))
    }

    /// Create an i16 constant
    #[must_use]
    pub fn i2(value: i16) -> Self {
        Self::with_data(ELEMENT_TYPE::I2, CilPrimitiveData::I2(value))
    }

    /// Create a u16 constant
    #[must_use]
    pub fn u2(value: u16) -> Self {
        Self::with_data(ELEMENT_TYPE::U2, CilPrimitiveData::U2(value))
    }

    /// Create an i32 constant
    #[must_use]
    pub fn i4(value: i32) -> Self {
        Self::with_data(ELEMENT_TYPE::I4, CilPrimitiveData::I4(value))
    }

    /// Create a u32 constant
    #[must_use]
    pub fn u4(value: u32) -> Self {
        Self::with_data(ELEMENT_TYPE::U4, CilPrimitiveData::U4(value))
    }

    /// Create an i64 constant
    #[must_use]
    pub fn i8(value: i64) -> Self {
        Self::with_data(ELEMENT_TYPE::I8, CilPrimitiveData::I8(value))
    }

    /// Create a u64 constant
    #[must_use]
    pub fn u8(value: u64) -> Self {
        Self::with_data(ELEMENT_TYPE::U8, CilPrimitiveData::U8(value))
    }

    /// Create an f32 constant
    #[must_use]
    pub fn r4(value: f32) -> Self {
        Self::with_data(ELEMENT_TYPE::R4, CilPrimitiveData::R4(value))
    }

    /// Create an f64 constant
    #[must_use]
    pub fn r8(value: f64) -> Self {
        Self::with_data(ELEMENT_TYPE::R8, CilPrimitiveData::R8(value))
    }

    /// Create a string constant
    #[must_use]
    pub fn string(value: &str) -> Self {
        Self::with_data(
            ELEMENT_TYPE::STRING,
            CilPrimitiveData::String(value.to_string()),
        )
    }

    /// Create a null reference constant
    #[must_use]
    pub fn null() -> Self {
        Self::with_data(ELEMENT_TYPE::CLASS, CilPrimitiveData::Null)
    }

    fn with_data(element_type: u8, data: CilPrimitiveData) -> Self {
        CilPrimitive { element_type, data }
    }

    /// Serialize the value to the little-endian blob a `Constant` row points at
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.data {
            CilPrimitiveData::Null => 0u32.to_le_bytes().to_vec(),
            CilPrimitiveData::Boolean(value) => vec![u8::from(*value)],
            CilPrimitiveData::Char(value) => {
                let mut units = [0u16; 2];
                value
                    .encode_utf16(&mut units)
                    .iter()
                    .flat_map(|unit| unit.to_le_bytes())
                    .collect()
            }
            CilPrimitiveData::I1(value) => value.to_le_bytes().to_vec(),
            CilPrimitiveData::U1(value) => vec![*value],
            CilPrimitiveData::I2(value) => value.to_le_bytes().to_vec(),
            CilPrimitiveData::U2(value) => value.to_le_bytes().to_vec(),
            CilPrimitiveData::I4(value) => value.to_le_bytes().to_vec(),
            CilPrimitiveData::U4(value) => value.to_le_bytes().to_vec(),
            CilPrimitiveData::I8(value) => value.to_le_bytes().to_vec(),
            CilPrimitiveData::U8(value) => value.to_le_bytes().to_vec(),
            CilPrimitiveData::R4(value) => value.to_le_bytes().to_vec(),
            CilPrimitiveData::R8(value) => value.to_le_bytes().to_vec(),
            CilPrimitiveData::String(value) => value
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect(),
        }
    }
}

impl fmt::Display for CilPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            CilPrimitiveData::Null => write!(f, "null"),
            CilPrimitiveData::Boolean(value) => write!(f, "{value}"),
            CilPrimitiveData::Char(value) => write!(f, "'{value}'"),
            CilPrimitiveData::I1(value) => write!(f, "{value}"),
            CilPrimitiveData::U1(value) => write!(f, "{value}"),
            CilPrimitiveData::I2(value) => write!(f, "{value}"),
            CilPrimitiveData::U2(value) => write!(f, "{value}"),
            CilPrimitiveData::I4(value) => write!(f, "{value}"),
            CilPrimitiveData::U4(value) => write!(f, "{value}"),
            CilPrimitiveData::I8(value) => write!(f, "{value}"),
            CilPrimitiveData::U8(value) => write!(f, "{value}"),
            CilPrimitiveData::R4(value) => write!(f, "{value}"),
            CilPrimitiveData::R8(value) => write!(f, "{value}"),
            CilPrimitiveData::String(value) => write!(f, "\"{value}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_kind_tokens_are_unique() {
        let mut tokens: Vec<u32> = CilPrimitiveKind::iter().map(|k| k.token().value()).collect();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), CilPrimitiveKind::iter().count());
        assert!(tokens.iter().all(|t| t >> 24 == 0xF0));
    }

    #[test]
    fn test_value_type_classification() {
        assert!(CilPrimitiveKind::I4.is_value_type());
        assert!(CilPrimitiveKind::TypedReference.is_value_type());
        assert!(!CilPrimitiveKind::String.is_value_type());
        assert!(!CilPrimitiveKind::Object.is_value_type());
        assert!(!CilPrimitiveKind::Void.is_value_type());
        assert!(CilPrimitiveKind::Void.is_void());
    }

    #[test]
    fn test_constant_bytes() {
        assert_eq!(CilPrimitive::i4(42).to_bytes(), vec![42, 0, 0, 0]);
        assert_eq!(CilPrimitive::boolean(true).to_bytes(), vec![1]);
        assert_eq!(CilPrimitive::string("hi").to_bytes(), vec![b'h', 0, b'i', 0]);
        assert_eq!(CilPrimitive::char('A').to_bytes(), vec![0x41, 0x00]);
        assert_eq!(CilPrimitive::null().to_bytes(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_display() {
        assert_eq!(CilPrimitive::i8(-7).to_string(), "-7");
        assert_eq!(CilPrimitive::string("x").to_string(), "\"x\"");
        assert_eq!(CilPrimitive::null().to_string(), "null");
    }
}
