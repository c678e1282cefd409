//! Resolved managed type handles.
//!
//! A [`TypeSig`] is what the type resolution service hands back for a raw native reference: the
//! managed shape of a type as it appears in a signature. Definitions and generic parameters are
//! held through weak references ([`ManagedTypeRef`], [`GenericParamRef`]), so a generic
//! parameter constrained over itself, or a type deriving from an instantiation of itself, does
//! not form a reference cycle. The [`crate::metadata::image::ManagedImage`] and the generic
//! parameter registry own the strong references.

use std::fmt;

use crate::metadata::{
    flags::GenericParamAttributes,
    generics::{GenericParamRc, GenericParamRef},
    primitives::CilPrimitiveKind,
    types::{ManagedTypeRc, ManagedTypeRef},
};

/// The managed shape of a type in a signature
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSig {
    /// A built-in primitive (including void, object and string)
    Primitive(CilPrimitiveKind),
    /// A reference type defined in the image
    Class(ManagedTypeRef),
    /// A value type defined in the image
    ValueType(ManagedTypeRef),
    /// A generic parameter declared on a type
    Var(GenericParamRef),
    /// A generic parameter declared on a method
    MVar(GenericParamRef),
    /// Single dimension, zero based array
    SzArray(Box<TypeSig>),
    /// Multi dimensional array
    Array {
        /// The element type
        base: Box<TypeSig>,
        /// The number of dimensions
        rank: u32,
    },
    /// Unmanaged pointer
    Ptr(Box<TypeSig>),
    /// Managed reference
    ByRef(Box<TypeSig>),
    /// Instantiation of a generic type definition
    GenericInst {
        /// The generic type definition (`Class` or `ValueType`)
        definition: Box<TypeSig>,
        /// The type arguments
        args: Vec<TypeSig>,
    },
}

impl TypeSig {
    /// Returns true for `System.Void`
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeSig::Primitive(kind) if kind.is_void())
    }

    /// Check if this is known to be a value type.
    ///
    /// Generic parameters count as value types only when they carry the value type constraint.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self {
            TypeSig::Primitive(kind) => kind.is_value_type(),
            TypeSig::ValueType(_) => true,
            TypeSig::GenericInst { definition, .. } => definition.is_value_type(),
            TypeSig::Var(param) | TypeSig::MVar(param) => param.upgrade().is_some_and(|p| {
                p.flags
                    .contains(GenericParamAttributes::NOT_NULLABLE_VALUE_TYPE_CONSTRAINT)
            }),
            TypeSig::Class(_)
            | TypeSig::SzArray(_)
            | TypeSig::Array { .. }
            | TypeSig::Ptr(_)
            | TypeSig::ByRef(_) => false,
        }
    }

    /// The generic parameter behind a `Var` or `MVar`, if still alive
    #[must_use]
    pub fn generic_param(&self) -> Option<GenericParamRc> {
        match self {
            TypeSig::Var(param) | TypeSig::MVar(param) => param.upgrade(),
            _ => None,
        }
    }

    /// The type definition behind a `Class`, `ValueType` or generic instantiation
    #[must_use]
    pub fn type_def(&self) -> Option<ManagedTypeRc> {
        match self {
            TypeSig::Class(ty) | TypeSig::ValueType(ty) => ty.upgrade(),
            TypeSig::GenericInst { definition, .. } => definition.type_def(),
            _ => None,
        }
    }

    /// Returns the full name of this type, as used in diagnostics
    #[must_use]
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSig::Primitive(kind) => write!(f, "{}", kind.clr_full_name()),
            TypeSig::Class(ty) | TypeSig::ValueType(ty) => match ty.upgrade() {
                Some(ty) => write!(f, "{}", ty.fullname()),
                None => write!(f, "<dropped>"),
            },
            TypeSig::Var(param) | TypeSig::MVar(param) => match param.upgrade() {
                Some(param) => write!(f, "{}", param.name),
                None => write!(f, "<dropped>"),
            },
            TypeSig::SzArray(base) => write!(f, "{base}[]"),
            TypeSig::Array { base, rank } => {
                write!(f, "{base}[")?;
                for _ in 1..*rank {
                    write!(f, ",")?;
                }
                write!(f, "]")
            }
            TypeSig::Ptr(base) => write!(f, "{base}*"),
            TypeSig::ByRef(base) => write!(f, "{base}&"),
            TypeSig::GenericInst { definition, args } => {
                write!(f, "{definition}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::{
        flags::TypeAttributes,
        generics::{GenericOwner, GenericParameter},
        token::Token,
        types::{ManagedType, TypeFlavor},
    };

    fn managed(name: &str, flavor: TypeFlavor) -> ManagedTypeRc {
        Arc::new(ManagedType::new(
            Token::new(0x02000001),
            "Game".to_string(),
            name.to_string(),
            TypeAttributes::PUBLIC,
            flavor,
            "Game.dll".to_string(),
        ))
    }

    #[test]
    fn test_display_composites() {
        let list = managed("List`1", TypeFlavor::Class);
        let param = Arc::new(GenericParameter::new(
            0,
            0,
            "T",
            GenericParamAttributes::empty(),
            GenericOwner::Type(list.token),
        ));

        let sig = TypeSig::GenericInst {
            definition: Box::new(TypeSig::Class(ManagedTypeRef::new(&list))),
            args: vec![TypeSig::SzArray(Box::new(TypeSig::Var(
                GenericParamRef::new(&param),
            )))],
        };
        assert_eq!(sig.to_string(), "Game.List`1<T[]>");

        let matrix = TypeSig::Array {
            base: Box::new(TypeSig::Primitive(CilPrimitiveKind::R4)),
            rank: 3,
        };
        assert_eq!(matrix.to_string(), "System.Single[,,]");
        assert_eq!(
            TypeSig::ByRef(Box::new(TypeSig::Primitive(CilPrimitiveKind::I4))).full_name(),
            "System.Int32&"
        );
    }

    #[test]
    fn test_value_type_classification() {
        let point = managed("Point", TypeFlavor::ValueType);
        let inst = TypeSig::GenericInst {
            definition: Box::new(TypeSig::ValueType(ManagedTypeRef::new(&point))),
            args: vec![TypeSig::Primitive(CilPrimitiveKind::I4)],
        };
        assert!(inst.is_value_type());
        assert!(TypeSig::Primitive(CilPrimitiveKind::Boolean).is_value_type());
        assert!(!TypeSig::Primitive(CilPrimitiveKind::String).is_value_type());
        assert!(!TypeSig::SzArray(Box::new(TypeSig::Primitive(CilPrimitiveKind::I4))).is_value_type());

        let unconstrained = Arc::new(GenericParameter::new(
            1,
            0,
            "T",
            GenericParamAttributes::empty(),
            GenericOwner::Type(point.token),
        ));
        let structy = Arc::new(GenericParameter::new(
            2,
            1,
            "U",
            GenericParamAttributes::NOT_NULLABLE_VALUE_TYPE_CONSTRAINT,
            GenericOwner::Type(point.token),
        ));
        assert!(!TypeSig::Var(GenericParamRef::new(&unconstrained)).is_value_type());
        assert!(TypeSig::Var(GenericParamRef::new(&structy)).is_value_type());
    }

    #[test]
    fn test_equality_is_identity() {
        let a = managed("A", TypeFlavor::Class);
        let b = managed("A", TypeFlavor::Class);
        assert_eq!(
            TypeSig::Class(ManagedTypeRef::new(&a)),
            TypeSig::Class(ManagedTypeRef::new(&a))
        );
        assert_ne!(
            TypeSig::Class(ManagedTypeRef::new(&a)),
            TypeSig::Class(ManagedTypeRef::new(&b))
        );
    }

    #[test]
    fn test_void() {
        assert!(TypeSig::Primitive(CilPrimitiveKind::Void).is_void());
        assert!(!TypeSig::Primitive(CilPrimitiveKind::Object).is_void());
    }
}
