//! Managed member definitions: fields, methods, parameters, properties and events.
//!
//! Definitions are shared through `Arc` aliases (`FieldDefRc`, `MethodDefRc`, ...). Data that
//! is attached after construction (constants, initial data, stub bodies, accessor semantics)
//! lives behind `OnceLock`, `RwLock` or append-only `boxcar::Vec`, so a definition can be
//! published to the linkage table while it is still being completed.

use std::sync::{Arc, OnceLock, RwLock};

use crate::{
    metadata::{
        body::MethodBody,
        flags::{
            EventAttributes, FieldAttributes, MethodAttributes, MethodCodeType,
            MethodImplAttributes, MethodSemanticsAttributes, ParamAttributes, PropertyAttributes,
        },
        generics::GenericParamList,
        primitives::CilPrimitive,
        token::Token,
        typesig::TypeSig,
    },
    Error::LockError,
    Result,
};

/// A reference to a `FieldDefinition`
pub type FieldDefRc = Arc<FieldDefinition>;
/// A reference to a `MethodDefinition`
pub type MethodDefRc = Arc<MethodDefinition>;
/// A reference to a `ParameterDefinition`
pub type ParamDefRc = Arc<ParameterDefinition>;
/// A reference to a `PropertyDefinition`
pub type PropertyDefRc = Arc<PropertyDefinition>;
/// A reference to an `EventDefinition`
pub type EventDefRc = Arc<EventDefinition>;

/// Signature of a field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSig {
    /// Static field (no `this`)
    pub is_static: bool,
    /// The declared type
    pub field_type: TypeSig,
}

/// A managed field
#[derive(Debug)]
pub struct FieldDefinition {
    /// Token of the field descriptor this was built from
    pub token: Token,
    /// Name of the field
    pub name: String,
    /// Flags
    pub flags: FieldAttributes,
    /// The signature
    pub signature: FieldSig,
    constant: OnceLock<CilPrimitive>,
    initial_data: OnceLock<Vec<u8>>,
}

impl FieldDefinition {
    /// Create a new field without constant or initial data
    #[must_use]
    pub fn new(token: Token, name: String, flags: FieldAttributes, signature: FieldSig) -> Self {
        FieldDefinition {
            token,
            name,
            flags,
            signature,
            constant: OnceLock::new(),
            initial_data: OnceLock::new(),
        }
    }

    /// The literal constant, if one has been attached
    pub fn constant(&self) -> Option<&CilPrimitive> {
        self.constant.get()
    }

    /// Attach the literal constant.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if a constant is already attached.
    pub fn set_constant(&self, value: CilPrimitive) -> Result<()> {
        self.constant
            .set(value)
            .map_err(|_| malformed_error!("Field {} already has a constant", self.name))
    }

    /// The initial data segment, if one has been attached
    pub fn initial_data(&self) -> Option<&[u8]> {
        self.initial_data.get().map(Vec::as_slice)
    }

    /// Attach the initial data segment.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if initial data is already attached.
    pub fn set_initial_data(&self, data: Vec<u8>) -> Result<()> {
        self.initial_data
            .set(data)
            .map_err(|_| malformed_error!("Field {} already has initial data", self.name))
    }
}

/// Signature of a method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    /// Instance method (has `this`)
    pub has_this: bool,
    /// Number of method-level generic parameters
    pub generic_param_count: u32,
    /// The return type
    pub return_type: TypeSig,
    /// Parameter types, in order
    pub params: Vec<TypeSig>,
}

/// A named parameter of a method
#[derive(Debug)]
pub struct ParameterDefinition {
    /// Position of the parameter; 1 is the first parameter
    pub sequence: u16,
    /// Name of the parameter
    pub name: String,
    /// Flags
    pub flags: ParamAttributes,
    constant: OnceLock<CilPrimitive>,
}

impl ParameterDefinition {
    /// Create a new parameter definition
    #[must_use]
    pub fn new(sequence: u16, name: String, flags: ParamAttributes) -> Self {
        ParameterDefinition {
            sequence,
            name,
            flags,
            constant: OnceLock::new(),
        }
    }

    /// The default value, if one has been attached
    pub fn constant(&self) -> Option<&CilPrimitive> {
        self.constant.get()
    }

    /// Attach the default value.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if a default is already attached.
    pub fn set_constant(&self, value: CilPrimitive) -> Result<()> {
        self.constant
            .set(value)
            .map_err(|_| malformed_error!("Parameter {} already has a default", self.name))
    }
}

/// A managed method
pub struct MethodDefinition {
    /// Token of the method descriptor this was built from
    pub token: Token,
    /// Name of the method
    pub name: String,
    /// Flags
    pub flags: MethodAttributes,
    /// Implementation flags
    pub impl_flags: MethodImplAttributes,
    /// The signature
    pub signature: MethodSig,
    /// Named parameters, in sequence order
    pub params: boxcar::Vec<ParamDefRc>,
    /// Generic parameters declared on this method
    pub generic_params: GenericParamList,
    body: RwLock<Option<MethodBody>>,
}

impl MethodDefinition {
    /// Create a new method without parameters definitions or body
    #[must_use]
    pub fn new(
        token: Token,
        name: String,
        flags: MethodAttributes,
        impl_flags: MethodImplAttributes,
        signature: MethodSig,
        generic_params: GenericParamList,
    ) -> Self {
        MethodDefinition {
            token,
            name,
            flags,
            impl_flags,
            signature,
            params: boxcar::Vec::new(),
            generic_params,
            body: RwLock::new(None),
        }
    }

    /// Returns true if this method is expected to carry a managed CIL body.
    ///
    /// Abstract, P/Invoke, internal-call, unmanaged, native and runtime-implemented methods
    /// carry none.
    #[must_use]
    pub fn expects_body(&self) -> bool {
        !self.flags.contains(MethodAttributes::ABSTRACT)
            && !self.flags.contains(MethodAttributes::PINVOKE_IMPL)
            && !self.impl_flags.contains(MethodImplAttributes::INTERNAL_CALL)
            && self.impl_flags.is_managed()
            && self.impl_flags.code_type() == MethodCodeType::IL
    }

    /// Defined on type, else per instance
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }

    /// A copy of the current body.
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the body lock is poisoned.
    pub fn body(&self) -> Result<Option<MethodBody>> {
        Ok(self.body.read().map_err(|_| LockError)?.clone())
    }

    /// Returns true if a body is attached.
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the body lock is poisoned.
    pub fn has_body(&self) -> Result<bool> {
        Ok(self.body.read().map_err(|_| LockError)?.is_some())
    }

    /// Replace the body, returning the previous one.
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the body lock is poisoned.
    pub fn replace_body(&self, body: MethodBody) -> Result<Option<MethodBody>> {
        let mut guard = self.body.write().map_err(|_| LockError)?;
        Ok(guard.replace(body))
    }

    /// Find a parameter definition by its sequence number
    pub fn param(&self, sequence: u16) -> Option<ParamDefRc> {
        self.params
            .iter()
            .find(|(_, param)| param.sequence == sequence)
            .map(|(_, param)| param.clone())
    }
}

impl std::fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("impl_flags", &self.impl_flags)
            .field("signature", &self.signature)
            .field("params", &self.params.count())
            .field("generic_params", &self.generic_params.count())
            .finish_non_exhaustive()
    }
}

/// Association of a method with a property or event
#[derive(Debug, Clone)]
pub struct MethodSemantics {
    /// The role of the method
    pub attributes: MethodSemanticsAttributes,
    /// The associated method
    pub method: MethodDefRc,
}

/// Finds the method with `role` in a semantics list
fn semantic(
    semantics: &boxcar::Vec<MethodSemantics>,
    role: MethodSemanticsAttributes,
) -> Option<MethodDefRc> {
    semantics
        .iter()
        .find(|(_, s)| s.attributes == role)
        .map(|(_, s)| s.method.clone())
}

/// Signature of a property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySig {
    /// Instance property (has `this`)
    pub has_this: bool,
    /// The property type
    pub property_type: TypeSig,
}

/// A managed property
#[derive(Debug)]
pub struct PropertyDefinition {
    /// Token of the property descriptor this was built from
    pub token: Token,
    /// Name of the property
    pub name: String,
    /// Flags
    pub flags: PropertyAttributes,
    /// The signature
    pub signature: PropertySig,
    /// Getter and setter associations
    pub semantics: boxcar::Vec<MethodSemantics>,
}

impl PropertyDefinition {
    /// Create a new property without semantics
    #[must_use]
    pub fn new(token: Token, name: String, flags: PropertyAttributes, signature: PropertySig) -> Self {
        PropertyDefinition {
            token,
            name,
            flags,
            signature,
            semantics: boxcar::Vec::new(),
        }
    }

    /// The getter, if associated
    pub fn getter(&self) -> Option<MethodDefRc> {
        semantic(&self.semantics, MethodSemanticsAttributes::GETTER)
    }

    /// The setter, if associated
    pub fn setter(&self) -> Option<MethodDefRc> {
        semantic(&self.semantics, MethodSemanticsAttributes::SETTER)
    }
}

/// A managed event
#[derive(Debug)]
pub struct EventDefinition {
    /// Token of the event descriptor this was built from
    pub token: Token,
    /// Name of the event
    pub name: String,
    /// Flags
    pub flags: EventAttributes,
    /// The delegate type of the event
    pub event_type: TypeSig,
    /// Add, remove and fire associations
    pub semantics: boxcar::Vec<MethodSemantics>,
}

impl EventDefinition {
    /// Create a new event without semantics
    #[must_use]
    pub fn new(token: Token, name: String, flags: EventAttributes, event_type: TypeSig) -> Self {
        EventDefinition {
            token,
            name,
            flags,
            event_type,
            semantics: boxcar::Vec::new(),
        }
    }

    /// The add accessor, if associated
    pub fn add_on(&self) -> Option<MethodDefRc> {
        semantic(&self.semantics, MethodSemanticsAttributes::ADD_ON)
    }

    /// The remove accessor, if associated
    pub fn remove_on(&self) -> Option<MethodDefRc> {
        semantic(&self.semantics, MethodSemanticsAttributes::REMOVE_ON)
    }

    /// The raise accessor, if associated
    pub fn fire(&self) -> Option<MethodDefRc> {
        semantic(&self.semantics, MethodSemanticsAttributes::FIRE)
    }
}
