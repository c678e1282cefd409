use std::{collections::HashMap, sync::Arc};

use crate::{
    metadata::{
        flags::{
            EventAttributes, FieldAttributes, GenericParamAttributes, MethodAttributes,
            MethodImplAttributes, PropertyAttributes, TypeAttributes,
        },
        primitives::CilPrimitive,
        token::{TableId, Token},
        types::TypeFlavor,
    },
    model::{
        descriptors::{GenericContainer, GenericParamDescriptor, NativeTypeRef, ParamDescriptor},
        entries::{EventEntry, FieldEntry, MethodEntry, PropertyEntry, TypeEntry},
        AnalysisModel,
    },
    Result,
};

struct PropertyDraft {
    token: Token,
    name: String,
    flags: PropertyAttributes,
    property_type: NativeTypeRef,
    getter: Option<Token>,
    setter: Option<Token>,
}

struct EventDraft {
    token: Token,
    name: String,
    flags: EventAttributes,
    event_type: NativeTypeRef,
    add: Option<Token>,
    remove: Option<Token>,
    raise: Option<Token>,
}

struct TypeDraft {
    entry: TypeEntry,
    fields: Vec<FieldEntry>,
    methods: Vec<MethodEntry>,
    properties: Vec<PropertyDraft>,
    events: Vec<EventDraft>,
}

/// Location of a member draft: (type position, member position)
type Slot = (usize, usize);

/// Fluent assembly of an [`AnalysisModel`].
///
/// Tokens are assigned in insertion order per table, and generic parameters get consecutive
/// global indices. Accessors of properties and events may reference any method already added,
/// including methods of other types.
///
/// # Examples
///
/// ```rust
/// use dotshell::metadata::flags::{
///     GenericParamAttributes, MethodAttributes, MethodImplAttributes, TypeAttributes,
/// };
/// use dotshell::metadata::types::TypeFlavor;
/// use dotshell::model::{ModelBuilder, NativeTypeRef};
///
/// let mut builder = ModelBuilder::new("Game.dll");
/// let boxed = builder.add_type("Game", "Box`1", TypeAttributes::PUBLIC, TypeFlavor::Class);
/// builder.set_base(boxed, NativeTypeRef::object())?;
/// let t = builder.add_generic_param(boxed, "T", GenericParamAttributes::empty())?;
/// builder.add_method(
///     boxed,
///     "Get",
///     MethodAttributes::PUBLIC,
///     MethodImplAttributes::empty(),
///     NativeTypeRef::Var(t),
/// )?;
/// let model = builder.build();
/// assert_eq!(model.types().len(), 1);
/// # Ok::<(), dotshell::Error>(())
/// ```
pub struct ModelBuilder {
    module: String,
    types: Vec<TypeDraft>,
    type_index: HashMap<Token, usize>,
    fields: HashMap<Token, Slot>,
    methods: HashMap<Token, Slot>,
    next_field: u32,
    next_method: u32,
    next_property: u32,
    next_event: u32,
    next_generic: u32,
}

impl ModelBuilder {
    /// Start an empty model for `module`
    #[must_use]
    pub fn new(module: &str) -> Self {
        ModelBuilder {
            module: module.to_string(),
            types: Vec::new(),
            type_index: HashMap::new(),
            fields: HashMap::new(),
            methods: HashMap::new(),
            next_field: 1,
            next_method: 1,
            next_property: 1,
            next_event: 1,
            next_generic: 0,
        }
    }

    fn type_slot(&self, token: Token) -> Result<usize> {
        self.type_index
            .get(&token)
            .copied()
            .ok_or_else(|| malformed_error!("Unknown type {}", token))
    }

    fn method_slot(&self, token: Token) -> Result<Slot> {
        self.methods
            .get(&token)
            .copied()
            .ok_or_else(|| malformed_error!("Unknown method {}", token))
    }

    fn accessor(&self, token: Option<Token>) -> Result<Option<Token>> {
        match token {
            Some(token) => self.method_slot(token).map(|_| Some(token)),
            None => Ok(None),
        }
    }

    /// Add a type and return its token
    pub fn add_type(
        &mut self,
        namespace: &str,
        name: &str,
        flags: TypeAttributes,
        flavor: TypeFlavor,
    ) -> Token {
        let position = self.types.len();
        #[allow(clippy::cast_possible_truncation)]
        let token = Token::from_parts(TableId::TYPE_DEF, position as u32 + 1);

        self.types.push(TypeDraft {
            entry: TypeEntry {
                token,
                namespace: namespace.to_string(),
                name: name.to_string(),
                flags,
                flavor,
                module: self.module.clone(),
                declaring_type: None,
                base: None,
                interfaces: Vec::new(),
                generics: None,
                fields: Vec::new(),
                methods: Vec::new(),
                properties: Vec::new(),
                events: Vec::new(),
            },
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
        });
        self.type_index.insert(token, position);
        token
    }

    /// Mark `inner` as nested in `outer`
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if either type is unknown.
    pub fn set_declaring_type(&mut self, inner: Token, outer: Token) -> Result<()> {
        self.type_slot(outer)?;
        let slot = self.type_slot(inner)?;
        self.types[slot].entry.declaring_type = Some(outer);
        Ok(())
    }

    /// Set the raw base type of `ty`
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the type is unknown.
    pub fn set_base(&mut self, ty: Token, base: NativeTypeRef) -> Result<()> {
        let slot = self.type_slot(ty)?;
        self.types[slot].entry.base = Some(base);
        Ok(())
    }

    /// Append a raw interface reference to `ty`
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the type is unknown.
    pub fn add_interface(&mut self, ty: Token, interface: NativeTypeRef) -> Result<()> {
        let slot = self.type_slot(ty)?;
        self.types[slot].entry.interfaces.push(interface);
        Ok(())
    }

    fn container(&mut self, owner: Token) -> Result<&mut GenericContainer> {
        if owner.is_table(TableId::TYPE_DEF) {
            let slot = self.type_slot(owner)?;
            Ok(self.types[slot].entry.generics.get_or_insert_with(Default::default))
        } else if owner.is_table(TableId::METHOD_DEF) {
            let (ty, method) = self.method_slot(owner)?;
            Ok(self.types[ty].methods[method]
                .generics
                .get_or_insert_with(Default::default))
        } else {
            Err(malformed_error!("{} cannot own generic parameters", owner))
        }
    }

    /// Declare a new generic parameter on a type or method and return its global index
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the owner is unknown.
    pub fn add_generic_param(
        &mut self,
        owner: Token,
        name: &str,
        flags: GenericParamAttributes,
    ) -> Result<u32> {
        let index = self.next_generic;
        self.declare_generic_param(owner, index, name, flags)?;
        Ok(index)
    }

    /// Declare a generic parameter with an explicit global index on a type or method.
    ///
    /// Used to model source metadata in which several containers list the same index.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the owner is unknown.
    pub fn declare_generic_param(
        &mut self,
        owner: Token,
        index: u32,
        name: &str,
        flags: GenericParamAttributes,
    ) -> Result<()> {
        let container = self.container(owner)?;
        #[allow(clippy::cast_possible_truncation)]
        let number = container.params.len() as u16;
        container.params.push(GenericParamDescriptor {
            index,
            number,
            name: name.to_string(),
            flags,
            constraints: Vec::new(),
        });

        self.next_generic = self.next_generic.max(index + 1);
        Ok(())
    }

    /// Append a constraint to the parameter `index` as declared by `owner`
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the owner is unknown or does not
    /// declare `index`.
    pub fn add_generic_constraint(
        &mut self,
        owner: Token,
        index: u32,
        constraint: NativeTypeRef,
    ) -> Result<()> {
        let container = self.container(owner)?;
        match container.params.iter_mut().find(|p| p.index == index) {
            Some(param) => {
                param.constraints.push(constraint);
                Ok(())
            }
            None => Err(malformed_error!(
                "{} does not declare generic parameter {}",
                owner,
                index
            )),
        }
    }

    /// Add a field to `ty` and return its token
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the type is unknown.
    pub fn add_field(
        &mut self,
        ty: Token,
        name: &str,
        flags: FieldAttributes,
        field_type: NativeTypeRef,
    ) -> Result<Token> {
        let slot = self.type_slot(ty)?;
        let token = Token::from_parts(TableId::FIELD, self.next_field);
        self.next_field += 1;

        let fields = &mut self.types[slot].fields;
        fields.push(FieldEntry {
            token,
            name: name.to_string(),
            flags,
            field_type,
            default: None,
            initial_data: None,
        });
        self.fields.insert(token, (slot, fields.len() - 1));
        Ok(token)
    }

    fn field_mut(&mut self, field: Token) -> Result<&mut FieldEntry> {
        let (ty, position) = self
            .fields
            .get(&field)
            .copied()
            .ok_or_else(|| malformed_error!("Unknown field {}", field))?;
        Ok(&mut self.types[ty].fields[position])
    }

    /// Set the default value of `field`. Does not touch the field's flags.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the field is unknown.
    pub fn set_field_default(&mut self, field: Token, value: CilPrimitive) -> Result<()> {
        self.field_mut(field)?.default = Some(value);
        Ok(())
    }

    /// Set the static initial data of `field`. Does not touch the field's flags.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the field is unknown.
    pub fn set_field_initial_data(&mut self, field: Token, data: Vec<u8>) -> Result<()> {
        self.field_mut(field)?.initial_data = Some(data);
        Ok(())
    }

    /// Add a method to `ty` and return its token
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the type is unknown.
    pub fn add_method(
        &mut self,
        ty: Token,
        name: &str,
        flags: MethodAttributes,
        impl_flags: MethodImplAttributes,
        return_type: NativeTypeRef,
    ) -> Result<Token> {
        let slot = self.type_slot(ty)?;
        let token = Token::from_parts(TableId::METHOD_DEF, self.next_method);
        self.next_method += 1;

        let methods = &mut self.types[slot].methods;
        methods.push(MethodEntry {
            token,
            name: name.to_string(),
            flags,
            impl_flags,
            return_type,
            params: Vec::new(),
            generics: None,
        });
        self.methods.insert(token, (slot, methods.len() - 1));
        Ok(token)
    }

    /// Append a parameter to `method`
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the method is unknown.
    pub fn add_param(&mut self, method: Token, param: ParamDescriptor) -> Result<()> {
        let (ty, position) = self.method_slot(method)?;
        self.types[ty].methods[position].params.push(param);
        Ok(())
    }

    /// Add a property to `ty` and return its token
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the type or an accessor is unknown.
    pub fn add_property(
        &mut self,
        ty: Token,
        name: &str,
        flags: PropertyAttributes,
        property_type: NativeTypeRef,
        getter: Option<Token>,
        setter: Option<Token>,
    ) -> Result<Token> {
        let slot = self.type_slot(ty)?;
        let getter = self.accessor(getter)?;
        let setter = self.accessor(setter)?;
        let token = Token::from_parts(TableId::PROPERTY, self.next_property);
        self.next_property += 1;

        self.types[slot].properties.push(PropertyDraft {
            token,
            name: name.to_string(),
            flags,
            property_type,
            getter,
            setter,
        });
        Ok(token)
    }

    /// Add an event to `ty` and return its token
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] if the type or an accessor is unknown.
    #[allow(clippy::too_many_arguments)]
    pub fn add_event(
        &mut self,
        ty: Token,
        name: &str,
        flags: EventAttributes,
        event_type: NativeTypeRef,
        add: Option<Token>,
        remove: Option<Token>,
        raise: Option<Token>,
    ) -> Result<Token> {
        let slot = self.type_slot(ty)?;
        let add = self.accessor(add)?;
        let remove = self.accessor(remove)?;
        let raise = self.accessor(raise)?;
        let token = Token::from_parts(TableId::EVENT, self.next_event);
        self.next_event += 1;

        self.types[slot].events.push(EventDraft {
            token,
            name: name.to_string(),
            flags,
            event_type,
            add,
            remove,
            raise,
        });
        Ok(token)
    }

    /// Freeze the drafts into an [`AnalysisModel`]
    #[must_use]
    pub fn build(self) -> AnalysisModel {
        let mut drafts = self.types;

        let method_entries: Vec<Vec<Arc<MethodEntry>>> = drafts
            .iter_mut()
            .map(|draft| {
                std::mem::take(&mut draft.methods)
                    .into_iter()
                    .map(Arc::new)
                    .collect()
            })
            .collect();

        let lookup = |token: Option<Token>| {
            token
                .and_then(|t| self.methods.get(&t))
                .map(|(ty, position)| method_entries[*ty][*position].clone())
        };

        let types = drafts
            .into_iter()
            .zip(method_entries.iter())
            .map(|(draft, methods)| {
                let mut entry = draft.entry;
                entry.fields = draft.fields.into_iter().map(Arc::new).collect();
                entry.methods = methods.clone();
                entry.properties = draft
                    .properties
                    .into_iter()
                    .map(|p| {
                        Arc::new(PropertyEntry {
                            token: p.token,
                            name: p.name,
                            flags: p.flags,
                            property_type: p.property_type,
                            getter: lookup(p.getter),
                            setter: lookup(p.setter),
                        })
                    })
                    .collect();
                entry.events = draft
                    .events
                    .into_iter()
                    .map(|e| {
                        Arc::new(EventEntry {
                            token: e.token,
                            name: e.name,
                            flags: e.flags,
                            event_type: e.event_type,
                            add: lookup(e.add),
                            remove: lookup(e.remove),
                            raise: lookup(e.raise),
                        })
                    })
                    .collect();
                Arc::new(entry)
            })
            .collect();

        AnalysisModel::new(self.module, types)
    }
}
