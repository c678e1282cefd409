//! Attribute flags for managed definitions.
//!
//! Descriptors in the analysis model carry raw attribute words exactly as they appear in the
//! native metadata. The managed definitions built from them use the typed bitflags below, which
//! retain unknown bits so nothing from the source is lost.
//!
//! # Key Types
//! - [`TypeAttributes`], [`FieldAttributes`], [`MethodAttributes`], [`MethodImplAttributes`]
//! - [`ParamAttributes`], [`PropertyAttributes`], [`EventAttributes`]
//! - [`GenericParamAttributes`], [`MethodSemanticsAttributes`]
//!
//! # References
//! - ECMA-335 6th Edition, Partition II, Section 23.1 - Metadata validation flags

use bitflags::bitflags;

/// Bitmask for the visibility bits of [`TypeAttributes`]
pub const TYPE_VISIBILITY_MASK: u32 = 0x0007;
/// Bitmask for the access bits of [`FieldAttributes`] and [`MethodAttributes`]
pub const MEMBER_ACCESS_MASK: u32 = 0x0007;
/// Bitmask for the code type bits of [`MethodImplAttributes`]
pub const METHOD_IMPL_CODE_TYPE_MASK: u32 = 0x0003;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Flags of a type definition, §II.23.1.15
    pub struct TypeAttributes: u32 {
        /// Class is public scope
        const PUBLIC = 0x0000_0001;
        /// Class is nested with public visibility
        const NESTED_PUBLIC = 0x0000_0002;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Class is abstract
        const ABSTRACT = 0x0000_0080;
        /// Class cannot be extended
        const SEALED = 0x0000_0100;
        /// Class name is special
        const SPECIAL_NAME = 0x0000_0400;
        /// CLI provides 'special' behavior, depending upon the name of the type
        const RT_SPECIAL_NAME = 0x0000_0800;
        /// Class/Interface is imported
        const IMPORT = 0x0000_1000;
        /// Reserved (Class is serializable)
        const SERIALIZABLE = 0x0000_2000;
        /// Type has security associate with it
        const HAS_SECURITY = 0x0004_0000;
        /// Initialize the class before first static field access
        const BEFORE_FIELD_INIT = 0x0010_0000;
    }
}

impl TypeAttributes {
    /// Returns the raw visibility value (`NOT_PUBLIC`, `PUBLIC`, `NESTED_*`)
    #[must_use]
    pub fn visibility(&self) -> u32 {
        self.bits() & TYPE_VISIBILITY_MASK
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Flags of a field definition, §II.23.1.5
    pub struct FieldAttributes: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Field can only be initialized, not written to after init
        const INIT_ONLY = 0x0020;
        /// Value is compile time constant
        const LITERAL = 0x0040;
        /// Reserved (to indicate this field should not be serialized when type is remoted)
        const NOT_SERIALIZED = 0x0080;
        /// Field has RVA
        const HAS_FIELD_RVA = 0x0100;
        /// Field is special
        const SPECIAL_NAME = 0x0200;
        /// CLI provides 'special' behavior, depending upon the name of the field
        const RT_SPECIAL_NAME = 0x0400;
        /// Field has marshalling information
        const HAS_FIELD_MARSHAL = 0x1000;
        /// Implementation is forwarded through `PInvoke`
        const PINVOKE_IMPL = 0x2000;
        /// Field has default
        const HAS_DEFAULT = 0x8000;
    }
}

impl FieldAttributes {
    /// Returns the raw access value (`PRIVATE`, `FAMILY`, `PUBLIC`, ...)
    #[must_use]
    pub fn access(&self) -> u32 {
        self.bits() & MEMBER_ACCESS_MASK
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Flags of a method definition, §II.23.1.10
    pub struct MethodAttributes: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Reserved: shall be zero for conforming implementations
        const UNMANAGED_EXPORT = 0x0008;
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method can only be overriden if also accessible
        const STRICT = 0x0200;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, dpending upon the name of the method
        const RT_SPECIAL_NAME = 0x1000;
        /// Implementation is forwarded through PInvoke
        const PINVOKE_IMPL = 0x2000;
        /// Method has security associate with it
        const HAS_SECURITY = 0x4000;
        /// Method calls another method containing security code
        const REQUIRE_SEC_OBJECT = 0x8000;
    }
}

impl MethodAttributes {
    /// Returns the raw access value
    #[must_use]
    pub fn access(&self) -> u32 {
        self.bits() & MEMBER_ACCESS_MASK
    }

    /// Defined on type, else per instance
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.contains(MethodAttributes::STATIC)
    }
}

/// Code type stored in the low bits of [`MethodImplAttributes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum MethodCodeType {
    /// Method impl is IL
    IL,
    /// Method impl is native
    Native,
    /// Method impl is OPTIL
    OptIL,
    /// Method impl is provided by the runtime
    Runtime,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Implementation flags of a method definition, §II.23.1.11
    pub struct MethodImplAttributes: u32 {
        /// Method impl is native
        const NATIVE = 0x0001;
        /// Method impl is OPTIL
        const OPTIL = 0x0002;
        /// Method impl is unmanaged, otherwise managed
        const UNMANAGED = 0x0004;
        /// Method cannot be inlined
        const NO_INLINING = 0x0008;
        /// Method is defined; used primarily in merge scenarios
        const FORWARD_REF = 0x0010;
        /// Method is a synchronized method
        const SYNCHRONIZED = 0x0020;
        /// Method will not be optimized when generating native code
        const NO_OPTIMIZATION = 0x0040;
        /// Method signature is exported exactly as declared
        const PRESERVE_SIG = 0x0080;
        /// Method should be inlined if possible
        const AGGRESSIVE_INLINING = 0x0100;
        /// Method is implemented inside the runtime
        const INTERNAL_CALL = 0x1000;
    }
}

impl MethodImplAttributes {
    /// Extract the code type from the implementation flags
    #[must_use]
    pub fn code_type(&self) -> MethodCodeType {
        match self.bits() & METHOD_IMPL_CODE_TYPE_MASK {
            0 => MethodCodeType::IL,
            1 => MethodCodeType::Native,
            2 => MethodCodeType::OptIL,
            _ => MethodCodeType::Runtime,
        }
    }

    /// Method impl is managed code
    #[must_use]
    pub fn is_managed(&self) -> bool {
        !self.contains(MethodImplAttributes::UNMANAGED)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Flags of a parameter definition, §II.23.1.13
    pub struct ParamAttributes: u32 {
        /// Param is `In`
        const IN = 0x0001;
        /// Param is `out`
        const OUT = 0x0002;
        /// Param is optional
        const OPTIONAL = 0x0010;
        /// Param has default value
        const HAS_DEFAULT = 0x1000;
        /// Param has `FieldMarshal`
        const HAS_FIELD_MARSHAL = 0x2000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Flags of a property definition, §II.23.1.14
    pub struct PropertyAttributes: u32 {
        /// Property is special
        const SPECIAL_NAME = 0x0200;
        /// Runtime (metadata internal APIs) should check name encoding
        const RT_SPECIAL_NAME = 0x0400;
        /// Property has default
        const HAS_DEFAULT = 0x1000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Flags of an event definition, §II.23.1.4
    pub struct EventAttributes: u32 {
        /// Event is special
        const SPECIAL_NAME = 0x0200;
        /// CLI provides 'special' behavior, depending upon the name of the event
        const RT_SPECIAL_NAME = 0x0400;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Variance and special-constraint flags of a generic parameter, §II.23.1.7
    pub struct GenericParamAttributes: u32 {
        /// The generic parameter is covariant
        const COVARIANT = 0x0001;
        /// The generic parameter is contravariant
        const CONTRAVARIANT = 0x0002;
        /// The generic parameter has a reference type constraint
        const REFERENCE_TYPE_CONSTRAINT = 0x0004;
        /// The generic parameter has a value type constraint
        const NOT_NULLABLE_VALUE_TYPE_CONSTRAINT = 0x0008;
        /// The generic parameter has a constructor constraint
        const DEFAULT_CONSTRUCTOR_CONSTRAINT = 0x0010;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Role of a method associated with a property or event, §II.23.1.12
    pub struct MethodSemanticsAttributes: u32 {
        /// Setter for property
        const SETTER = 0x0001;
        /// Getter for property
        const GETTER = 0x0002;
        /// Other method for property or event
        const OTHER = 0x0004;
        /// `AddOn` method for event
        const ADD_ON = 0x0008;
        /// `RemoveOn` method for event
        const REMOVE_ON = 0x0010;
        /// Fire method for event
        const FIRE = 0x0020;
    }
}
