//! Analysis entries: one per type and member discovered in the native binary.

use std::sync::Arc;

use crate::{
    metadata::{
        flags::{
            EventAttributes, FieldAttributes, MethodAttributes, MethodImplAttributes,
            PropertyAttributes, TypeAttributes,
        },
        primitives::CilPrimitive,
        token::Token,
        types::TypeFlavor,
    },
    model::descriptors::{GenericContainer, NativeTypeRef, ParamDescriptor},
};

/// A reference to a `TypeEntry`
pub type TypeEntryRc = Arc<TypeEntry>;
/// A reference to a `FieldEntry`
pub type FieldEntryRc = Arc<FieldEntry>;
/// A reference to a `MethodEntry`
pub type MethodEntryRc = Arc<MethodEntry>;
/// A reference to a `PropertyEntry`
pub type PropertyEntryRc = Arc<PropertyEntry>;
/// A reference to an `EventEntry`
pub type EventEntryRc = Arc<EventEntry>;

/// Name of the pseudo-type holding module-level members
pub const MODULE_TYPE_NAME: &str = "<Module>";

/// One type discovered in the native binary
#[derive(Debug)]
pub struct TypeEntry {
    /// Token of the type
    pub token: Token,
    /// Namespace (empty for nested types)
    pub namespace: String,
    /// Name
    pub name: String,
    /// Flags
    pub flags: TypeAttributes,
    /// Class, value type or interface
    pub flavor: TypeFlavor,
    /// Name of the owning module
    pub module: String,
    /// The enclosing type, if nested
    pub declaring_type: Option<Token>,
    /// Raw base type reference
    pub base: Option<NativeTypeRef>,
    /// Raw interface references
    pub interfaces: Vec<NativeTypeRef>,
    /// Declared generic parameters
    pub generics: Option<GenericContainer>,
    /// Fields, in layout order
    pub fields: Vec<FieldEntryRc>,
    /// Methods, in declaration order
    pub methods: Vec<MethodEntryRc>,
    /// Properties, in declaration order
    pub properties: Vec<PropertyEntryRc>,
    /// Events, in declaration order
    pub events: Vec<EventEntryRc>,
}

impl TypeEntry {
    /// Returns true for the `<Module>` pseudo-type
    #[must_use]
    pub fn is_module_type(&self) -> bool {
        self.namespace.is_empty() && self.name == MODULE_TYPE_NAME
    }

    /// Returns true if the type declares at least one generic parameter
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.generics.as_ref().is_some_and(|g| !g.is_empty())
    }
}

/// One field discovered in the native binary
#[derive(Debug)]
pub struct FieldEntry {
    /// Token of the field
    pub token: Token,
    /// Name
    pub name: String,
    /// Flags
    pub flags: FieldAttributes,
    /// Raw field type
    pub field_type: NativeTypeRef,
    /// Default value, if the descriptor carries one
    pub default: Option<CilPrimitive>,
    /// Static initial data, if the descriptor carries it
    pub initial_data: Option<Vec<u8>>,
}

impl FieldEntry {
    /// Defined on type, else per instance
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(FieldAttributes::STATIC)
    }
}

/// One method discovered in the native binary
#[derive(Debug)]
pub struct MethodEntry {
    /// Token of the method
    pub token: Token,
    /// Name
    pub name: String,
    /// Flags
    pub flags: MethodAttributes,
    /// Implementation flags
    pub impl_flags: MethodImplAttributes,
    /// Raw return type
    pub return_type: NativeTypeRef,
    /// Parameters, in order
    pub params: Vec<ParamDescriptor>,
    /// Declared generic parameters
    pub generics: Option<GenericContainer>,
}

impl MethodEntry {
    /// Defined on type, else per instance
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }
}

/// One property discovered in the native binary
#[derive(Debug)]
pub struct PropertyEntry {
    /// Token of the property
    pub token: Token,
    /// Name
    pub name: String,
    /// Flags
    pub flags: PropertyAttributes,
    /// Raw property type
    pub property_type: NativeTypeRef,
    /// The get accessor
    pub getter: Option<MethodEntryRc>,
    /// The set accessor
    pub setter: Option<MethodEntryRc>,
}

impl PropertyEntry {
    /// A property is static if any of its accessors is
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.getter.iter().chain(self.setter.iter()).any(|m| m.is_static())
    }
}

/// One event discovered in the native binary
#[derive(Debug)]
pub struct EventEntry {
    /// Token of the event
    pub token: Token,
    /// Name
    pub name: String,
    /// Flags
    pub flags: EventAttributes,
    /// Raw delegate type
    pub event_type: NativeTypeRef,
    /// The add accessor
    pub add: Option<MethodEntryRc>,
    /// The remove accessor
    pub remove: Option<MethodEntryRc>,
    /// The raise accessor
    pub raise: Option<MethodEntryRc>,
}
