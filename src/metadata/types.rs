//! Managed type definitions.
//!
//! A [`ManagedType`] is declared empty and filled in by the later passes: base type and
//! declaring type are written once, members and interfaces are appended concurrently.
//! References to other types go through the weak [`ManagedTypeRef`].

use std::sync::{Arc, OnceLock, Weak};

use crate::{
    metadata::{
        flags::TypeAttributes,
        generics::{GenericParamList, GenericParamRc},
        members::{EventDefRc, FieldDefRc, MethodDefRc, PropertyDefRc},
        token::Token,
        typesig::TypeSig,
    },
    Result,
};

/// A vector that holds a list of `ManagedType`
pub type ManagedTypeList = boxcar::Vec<ManagedTypeRc>;
/// Reference to a `ManagedType`
pub type ManagedTypeRc = Arc<ManagedType>;

/// Category of a managed type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum TypeFlavor {
    /// A reference type
    Class,
    /// A value type (struct or enum)
    ValueType,
    /// An interface
    Interface,
}

/// One managed type under construction.
///
/// Created empty (identity only) for every analysis type, then filled by the hierarchy pass
/// (base type, interfaces, generic parameters) and the member pass (fields, methods,
/// properties, events). The base type and declaring type are write-once.
pub struct ManagedType {
    /// Token (`TypeDef` table)
    pub token: Token,
    /// `TypeNamespace` (can be empty, e.g. for the `<Module>` type and nested types)
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Flags (a 4-byte bitmask of type `TypeAttributes`, §II.23.1.15)
    pub flags: TypeAttributes,
    /// Class, value type or interface
    pub flavor: TypeFlavor,
    /// Name of the module the type belongs to
    pub module: String,
    /// The enclosing type of a nested type
    declaring_type: OnceLock<ManagedTypeRef>,
    /// This types base aka 'extends'
    base: OnceLock<TypeSig>,
    /// Marker for a completed hierarchy pass
    hierarchy: OnceLock<()>,
    /// All interfaces this type implements
    pub interfaces: boxcar::Vec<TypeSig>,
    /// All generic parameters this type declares
    pub generic_params: GenericParamList,
    /// All fields this type has
    pub fields: boxcar::Vec<FieldDefRc>,
    /// All methods this type has
    pub methods: boxcar::Vec<MethodDefRc>,
    /// All properties this type has
    pub properties: boxcar::Vec<PropertyDefRc>,
    /// All events this type has
    pub events: boxcar::Vec<EventDefRc>,
}

impl ManagedType {
    /// Create a new, empty `ManagedType`
    pub fn new(
        token: Token,
        namespace: String,
        name: String,
        flags: TypeAttributes,
        flavor: TypeFlavor,
        module: String,
    ) -> Self {
        ManagedType {
            token,
            namespace,
            name,
            flags,
            flavor,
            module,
            declaring_type: OnceLock::new(),
            base: OnceLock::new(),
            hierarchy: OnceLock::new(),
            interfaces: boxcar::Vec::new(),
            generic_params: boxcar::Vec::new(),
            fields: boxcar::Vec::new(),
            methods: boxcar::Vec::new(),
            properties: boxcar::Vec::new(),
            events: boxcar::Vec::new(),
        }
    }

    /// Returns the full name of the type; nested types are joined with `/`
    #[must_use]
    pub fn fullname(&self) -> String {
        if let Some(outer) = self.declaring_type() {
            return format!("{}/{}", outer.fullname(), self.name);
        }

        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Access the base type of this type, if it exists
    pub fn base(&self) -> Option<&TypeSig> {
        self.base.get()
    }

    /// Set the base type.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if a base type has already been set.
    pub fn set_base(&self, base: TypeSig) -> Result<()> {
        self.base
            .set(base)
            .map_err(|_| malformed_error!("Base type of {} already set", self.fullname()))
    }

    /// Access the enclosing type, if this type is nested and the enclosing type is alive
    pub fn declaring_type(&self) -> Option<ManagedTypeRc> {
        self.declaring_type.get().and_then(ManagedTypeRef::upgrade)
    }

    /// Set the enclosing type.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if an enclosing type has already been set.
    pub fn set_declaring_type(&self, outer: &ManagedTypeRc) -> Result<()> {
        self.declaring_type
            .set(ManagedTypeRef::new(outer))
            .map_err(|_| malformed_error!("Declaring type of {} already set", self.name))
    }

    /// Returns true once the hierarchy pass completed for this type
    #[must_use]
    pub fn is_hierarchy_configured(&self) -> bool {
        self.hierarchy.get().is_some()
    }

    /// Marks the hierarchy pass as completed. Returns false if it already was.
    pub(crate) fn mark_hierarchy_configured(&self) -> bool {
        self.hierarchy.set(()).is_ok()
    }

    /// Returns true if `param` is in this type's generic parameter list
    #[must_use]
    pub fn has_generic_param(&self, param: &GenericParamRc) -> bool {
        self.generic_params
            .iter()
            .any(|(_, existing)| Arc::ptr_eq(existing, param))
    }

    /// Find a method by name
    pub fn method_by_name(&self, name: &str) -> Option<MethodDefRc> {
        self.methods
            .iter()
            .find(|(_, method)| method.name == name)
            .map(|(_, method)| method.clone())
    }

    /// Find a field by name
    pub fn field_by_name(&self, name: &str) -> Option<FieldDefRc> {
        self.fields
            .iter()
            .find(|(_, field)| field.name == name)
            .map(|(_, field)| field.clone())
    }

    /// Find a property by name
    pub fn property_by_name(&self, name: &str) -> Option<PropertyDefRc> {
        self.properties
            .iter()
            .find(|(_, property)| property.name == name)
            .map(|(_, property)| property.clone())
    }

    /// Find an event by name
    pub fn event_by_name(&self, name: &str) -> Option<EventDefRc> {
        self.events
            .iter()
            .find(|(_, event)| event.name == name)
            .map(|(_, event)| event.clone())
    }
}

/// A smart reference to a `ManagedType` that automatically handles weak references
/// to prevent circular reference memory leaks while providing a clean API
#[derive(Clone, Debug)]
pub struct ManagedTypeRef {
    weak_ref: Weak<ManagedType>,
}

impl ManagedTypeRef {
    /// Create a new `ManagedTypeRef` from a strong reference
    pub fn new(strong_ref: &ManagedTypeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the type, returning None if the type has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<ManagedTypeRc> {
        self.weak_ref.upgrade()
    }

    /// Get the token of the referenced type (if still alive)
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.upgrade().map(|t| t.token)
    }

    /// Returns true if this references `other`
    #[must_use]
    pub fn is(&self, other: &ManagedTypeRc) -> bool {
        std::ptr::eq(self.weak_ref.as_ptr(), Arc::as_ptr(other))
    }
}

impl From<ManagedTypeRc> for ManagedTypeRef {
    fn from(strong_ref: ManagedTypeRc) -> Self {
        Self::new(&strong_ref)
    }
}

impl PartialEq for ManagedTypeRef {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.weak_ref, &other.weak_ref)
    }
}

impl std::fmt::Debug for ManagedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedType")
            .field("token", &self.token)
            .field("fullname", &self.fullname())
            .field("flavor", &self.flavor)
            .field("fields", &self.fields.count())
            .field("methods", &self.methods.count())
            .finish()
    }
}
