//! The managed metadata image produced by a shell build.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    metadata::{
        generics::GenericParamRc,
        token::Token,
        types::ManagedTypeRc,
    },
    shell::{GenericParamRegistry, LinkageTable},
    Error,
};

/// The result of a shell build: every managed type with its hierarchy and members.
///
/// The image owns the strong references to all managed types (weak references in signatures
/// stay valid for as long as the image lives) and keeps the linkage table, so later stages can
/// find the managed counterpart of any analysis entity.
pub struct ManagedImage {
    /// Name of the module this image mirrors
    pub module: String,
    types: Vec<ManagedTypeRc>,
    types_by_fullname: DashMap<String, Vec<Token>>,
    linkage: Arc<LinkageTable>,
    generics: Arc<GenericParamRegistry>,
    failures: Vec<Error>,
}

impl ManagedImage {
    pub(crate) fn new(
        module: String,
        types: Vec<ManagedTypeRc>,
        linkage: Arc<LinkageTable>,
        generics: Arc<GenericParamRegistry>,
        failures: Vec<Error>,
    ) -> Self {
        let types_by_fullname: DashMap<String, Vec<Token>> = DashMap::new();
        for managed in &types {
            types_by_fullname
                .entry(managed.fullname())
                .or_default()
                .push(managed.token);
        }

        ManagedImage {
            module,
            types,
            types_by_fullname,
            linkage,
            generics,
            failures,
        }
    }

    /// All managed types, in declaration order
    pub fn types(&self) -> &[ManagedTypeRc] {
        &self.types
    }

    /// Get the managed type built for the analysis type `token`
    pub fn type_by_token(&self, token: Token) -> Option<ManagedTypeRc> {
        self.linkage.type_def(token)
    }

    /// Get all types with the given full name (`Namespace.Name`, nested as `Outer/Inner`)
    pub fn types_by_fullname(&self, fullname: &str) -> Vec<ManagedTypeRc> {
        match self.types_by_fullname.get(fullname) {
            Some(tokens) => tokens
                .iter()
                .filter_map(|token| self.linkage.type_def(*token))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The linkage from analysis entities to their managed counterparts
    pub fn linkage(&self) -> &LinkageTable {
        &self.linkage
    }

    /// Every generic parameter constructed during the build
    pub fn generic_params(&self) -> Vec<GenericParamRc> {
        self.generics.params()
    }

    /// Failures of types that were skipped because the build continued past them
    pub fn failures(&self) -> &[Error] {
        &self.failures
    }

    /// Total number of methods over all types
    pub fn method_count(&self) -> usize {
        self.types.iter().map(|t| t.methods.count()).sum()
    }
}

impl std::fmt::Debug for ManagedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedImage")
            .field("module", &self.module)
            .field("types", &self.types.len())
            .field("generic_params", &self.generics.len())
            .field("failures", &self.failures.len())
            .finish()
    }
}
