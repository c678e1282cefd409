//! Linkage from analysis entities to their managed counterparts.
//!
//! One typed map per entity kind, keyed by the entity's token. Every entity is linked at most
//! once; a second link for the same token is rejected with [`Error::DuplicateLinkage`]. The
//! maps are lock-free skip lists, so passes running in parallel can link and look up
//! concurrently.

use std::sync::Arc;

use crossbeam_skiplist::SkipMap;

use crate::{
    metadata::{
        members::{EventDefRc, FieldDefRc, MethodDefRc, PropertyDefRc},
        token::Token,
        types::ManagedTypeRc,
    },
    Error::DuplicateLinkage,
    Result,
};

/// Insert `value` for `token` unless something is linked already
fn link_once<T: Send + Sync + 'static>(
    map: &SkipMap<Token, Arc<T>>,
    token: Token,
    value: &Arc<T>,
) -> Result<()> {
    let entry = map.get_or_insert(token, value.clone());
    if Arc::ptr_eq(entry.value(), value) {
        Ok(())
    } else {
        Err(DuplicateLinkage(token))
    }
}

fn lookup<T: Send + Sync + 'static>(map: &SkipMap<Token, Arc<T>>, token: Token) -> Option<Arc<T>> {
    map.get(&token).map(|entry| entry.value().clone())
}

/// Analysis entity to managed object, per entity kind
pub struct LinkageTable {
    types: SkipMap<Token, ManagedTypeRc>,
    fields: SkipMap<Token, FieldDefRc>,
    methods: SkipMap<Token, MethodDefRc>,
    properties: SkipMap<Token, PropertyDefRc>,
    events: SkipMap<Token, EventDefRc>,
}

impl LinkageTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        LinkageTable {
            types: SkipMap::new(),
            fields: SkipMap::new(),
            methods: SkipMap::new(),
            properties: SkipMap::new(),
            events: SkipMap::new(),
        }
    }

    /// Link a type entry to its managed type
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateLinkage`] if `token` is already linked.
    pub fn link_type(&self, token: Token, managed: &ManagedTypeRc) -> Result<()> {
        link_once(&self.types, token, managed)
    }

    /// Link a field entry to its managed field
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateLinkage`] if `token` is already linked.
    pub fn link_field(&self, token: Token, field: &FieldDefRc) -> Result<()> {
        link_once(&self.fields, token, field)
    }

    /// Link a method entry to its managed method
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateLinkage`] if `token` is already linked.
    pub fn link_method(&self, token: Token, method: &MethodDefRc) -> Result<()> {
        link_once(&self.methods, token, method)
    }

    /// Link a property entry to its managed property
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateLinkage`] if `token` is already linked.
    pub fn link_property(&self, token: Token, property: &PropertyDefRc) -> Result<()> {
        link_once(&self.properties, token, property)
    }

    /// Link an event entry to its managed event
    ///
    /// # Errors
    /// Returns [`crate::Error::DuplicateLinkage`] if `token` is already linked.
    pub fn link_event(&self, token: Token, event: &EventDefRc) -> Result<()> {
        link_once(&self.events, token, event)
    }

    /// The managed type linked to `token`
    pub fn type_def(&self, token: Token) -> Option<ManagedTypeRc> {
        lookup(&self.types, token)
    }

    /// The managed field linked to `token`
    pub fn field(&self, token: Token) -> Option<FieldDefRc> {
        lookup(&self.fields, token)
    }

    /// The managed method linked to `token`
    pub fn method(&self, token: Token) -> Option<MethodDefRc> {
        lookup(&self.methods, token)
    }

    /// The managed property linked to `token`
    pub fn property(&self, token: Token) -> Option<PropertyDefRc> {
        lookup(&self.properties, token)
    }

    /// The managed event linked to `token`
    pub fn event(&self, token: Token) -> Option<EventDefRc> {
        lookup(&self.events, token)
    }

    /// Number of linked methods
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Number of linked types
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

impl Default for LinkageTable {
    fn default() -> Self {
        Self::new()
    }
}
