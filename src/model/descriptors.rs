//! Raw descriptors as produced by the native metadata reader.

use std::fmt;

use crate::metadata::{
    flags::{GenericParamAttributes, ParamAttributes},
    primitives::{CilPrimitive, CilPrimitiveKind},
    token::Token,
};

/// A raw type reference into the native metadata.
///
/// Generic parameters are referenced by their global declaration index, type definitions by
/// the token of their analysis entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeTypeRef {
    /// A built-in primitive
    Primitive(CilPrimitiveKind),
    /// A type defined in the analysis model
    TypeDef(Token),
    /// A type-level generic parameter, by global index
    Var(u32),
    /// A method-level generic parameter, by global index
    MVar(u32),
    /// Single dimension, zero based array
    SzArray(Box<NativeTypeRef>),
    /// Multi dimensional array
    Array {
        /// The element type
        elem: Box<NativeTypeRef>,
        /// The number of dimensions
        rank: u32,
    },
    /// Unmanaged pointer
    Ptr(Box<NativeTypeRef>),
    /// Managed reference
    ByRef(Box<NativeTypeRef>),
    /// Instantiation of a generic type definition
    GenericInst {
        /// The generic type definition
        definition: Box<NativeTypeRef>,
        /// The type arguments
        args: Vec<NativeTypeRef>,
    },
}

impl NativeTypeRef {
    /// `System.Void`
    #[must_use]
    pub fn void() -> Self {
        NativeTypeRef::Primitive(CilPrimitiveKind::Void)
    }

    /// `System.Object`
    #[must_use]
    pub fn object() -> Self {
        NativeTypeRef::Primitive(CilPrimitiveKind::Object)
    }

    /// A single dimension array of `self`
    #[must_use]
    pub fn sz_array(self) -> Self {
        NativeTypeRef::SzArray(Box::new(self))
    }

    /// A by-ref of `self`
    #[must_use]
    pub fn by_ref(self) -> Self {
        NativeTypeRef::ByRef(Box::new(self))
    }

    /// Instantiate the definition `self` with `args`
    #[must_use]
    pub fn instantiate(self, args: Vec<NativeTypeRef>) -> Self {
        NativeTypeRef::GenericInst {
            definition: Box::new(self),
            args,
        }
    }
}

impl fmt::Display for NativeTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeTypeRef::Primitive(kind) => write!(f, "{}", kind.clr_full_name()),
            NativeTypeRef::TypeDef(token) => write!(f, "TypeDef({token})"),
            NativeTypeRef::Var(index) => write!(f, "!{index}"),
            NativeTypeRef::MVar(index) => write!(f, "!!{index}"),
            NativeTypeRef::SzArray(elem) => write!(f, "{elem}[]"),
            NativeTypeRef::Array { elem, rank } => write!(f, "{elem}[rank {rank}]"),
            NativeTypeRef::Ptr(elem) => write!(f, "{elem}*"),
            NativeTypeRef::ByRef(elem) => write!(f, "{elem}&"),
            NativeTypeRef::GenericInst { definition, args } => {
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

/// One generic parameter as declared on a type or method
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParamDescriptor {
    /// Global index in the source metadata; the deduplication key
    pub index: u32,
    /// Position within the container
    pub number: u16,
    /// Name of the parameter
    pub name: String,
    /// Variance and special-constraint flags
    pub flags: GenericParamAttributes,
    /// Constraint types, in declaration order
    pub constraints: Vec<NativeTypeRef>,
}

/// The generic parameters declared by one type or method
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericContainer {
    /// Declared parameters, in position order
    pub params: Vec<GenericParamDescriptor>,
}

impl GenericContainer {
    /// Returns true if the container declares no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of declared parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// A method parameter descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    /// Name of the parameter
    pub name: String,
    /// Flags
    pub flags: ParamAttributes,
    /// The declared type
    pub param_type: NativeTypeRef,
    /// Default value, if the descriptor carries one
    pub default: Option<CilPrimitive>,
}

impl ParamDescriptor {
    /// A plain parameter
    #[must_use]
    pub fn new(name: &str, param_type: NativeTypeRef) -> Self {
        ParamDescriptor {
            name: name.to_string(),
            flags: ParamAttributes::empty(),
            param_type,
            default: None,
        }
    }

    /// Set the flags
    #[must_use]
    pub fn with_flags(mut self, flags: ParamAttributes) -> Self {
        self.flags = flags;
        self
    }

    /// Set a default value, and the matching `HAS_DEFAULT | OPTIONAL` flags
    #[must_use]
    pub fn with_default(mut self, value: CilPrimitive) -> Self {
        self.flags |= ParamAttributes::HAS_DEFAULT | ParamAttributes::OPTIONAL;
        self.default = Some(value);
        self
    }
}
