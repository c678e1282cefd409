//! The generic parameter registry.
//!
//! Holds at most one [`GenericParameter`] per [`GenericParamKey`]. A parameter is registered
//! as soon as it is constructed and before any of its constraints are resolved, so a constraint
//! that refers back to the same index (directly, or through a sibling) finds the in-progress
//! object instead of constructing a second one.
//!
//! Registration is insert-if-absent on a lock-free skip list: when two threads construct the
//! same key concurrently, exactly one object wins and both get it back.

use std::sync::Arc;

use crossbeam_skiplist::SkipMap;

use crate::{
    config::RegistryScope,
    metadata::{
        generics::{GenericParamRc, GenericParameter},
        token::Token,
    },
};

/// Identity of a generic parameter in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenericParamKey {
    /// The top-level type the declaration belongs to, when registries are scoped per type
    pub scope: Option<Token>,
    /// Global index of the declaration
    pub index: u32,
}

/// One generic parameter object per key
pub struct GenericParamRegistry {
    scope: RegistryScope,
    params: SkipMap<GenericParamKey, GenericParamRc>,
}

impl GenericParamRegistry {
    /// Create an empty registry with the given identity scope
    #[must_use]
    pub fn new(scope: RegistryScope) -> Self {
        GenericParamRegistry {
            scope,
            params: SkipMap::new(),
        }
    }

    /// The identity scope of this registry
    #[must_use]
    pub fn scope(&self) -> RegistryScope {
        self.scope
    }

    /// The key for `index`, as seen from within the top-level type `top_level`
    #[must_use]
    pub fn key(&self, index: u32, top_level: Token) -> GenericParamKey {
        match self.scope {
            RegistryScope::PerRun => GenericParamKey { scope: None, index },
            RegistryScope::PerTopLevelType => GenericParamKey {
                scope: Some(top_level),
                index,
            },
        }
    }

    /// The parameter registered for `key`
    pub fn get(&self, key: &GenericParamKey) -> Option<GenericParamRc> {
        self.params.get(key).map(|entry| entry.value().clone())
    }

    /// Register `param` under `key` unless another parameter is registered already.
    ///
    /// Returns the registered parameter, and whether it is `param` itself.
    pub fn register(&self, key: GenericParamKey, param: GenericParameter) -> (GenericParamRc, bool) {
        let candidate = Arc::new(param);
        let entry = self.params.get_or_insert(key, candidate.clone());
        let winner = entry.value().clone();
        let inserted = Arc::ptr_eq(&winner, &candidate);
        (winner, inserted)
    }

    /// Number of registered parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// All registered parameters, ordered by key
    #[must_use]
    pub fn params(&self) -> Vec<GenericParamRc> {
        self.params
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
