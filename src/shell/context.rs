//! Shared state of one shell build.
//!
//! A [`BuildContext`] is created per build and passed by reference into every pass. It owns
//! the linkage table and the generic parameter registry (the only shared mutable state), so
//! nothing about a build lives in globals.

use std::sync::{Arc, Mutex};

use log::{log, warn};
use rayon::prelude::*;

use crate::{
    config::BuildConfig,
    error::BuildPhase,
    metadata::{image::ManagedImage, typesig::TypeSig, types::ManagedTypeRc},
    model::{
        descriptors::NativeTypeRef,
        entries::{TypeEntry, TypeEntryRc},
        AnalysisModel,
    },
    shell::{
        linkage::LinkageTable,
        registry::GenericParamRegistry,
        resolver::{ResolutionScope, TypeResolution},
    },
    Error, Result,
};

/// State shared by all passes of one build
pub struct BuildContext<'a> {
    model: &'a AnalysisModel,
    config: BuildConfig,
    resolver: &'a dyn TypeResolution,
    linkage: Arc<LinkageTable>,
    generics: Arc<GenericParamRegistry>,
    types: boxcar::Vec<ManagedTypeRc>,
    failures: Mutex<Vec<Error>>,
}

impl<'a> BuildContext<'a> {
    /// Create a fresh context: empty linkage table, empty registry
    pub fn new(
        model: &'a AnalysisModel,
        config: BuildConfig,
        resolver: &'a dyn TypeResolution,
    ) -> Self {
        BuildContext {
            model,
            config,
            resolver,
            linkage: Arc::new(LinkageTable::new()),
            generics: Arc::new(GenericParamRegistry::new(config.registry_scope)),
            types: boxcar::Vec::new(),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// The model being converted
    pub fn model(&self) -> &'a AnalysisModel {
        self.model
    }

    /// The build configuration
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// The linkage table of this build
    pub fn linkage(&self) -> &LinkageTable {
        &self.linkage
    }

    /// The generic parameter registry of this build
    pub fn generics(&self) -> &GenericParamRegistry {
        &self.generics
    }

    /// The resolution scope for references appearing within `entry`
    pub fn scope(&self, entry: &TypeEntry) -> ResolutionScope<'_> {
        ResolutionScope {
            linkage: &self.linkage,
            generics: &self.generics,
            top_level: self.model.top_level(entry),
        }
    }

    /// Resolve `reference` through the configured resolver
    ///
    /// # Errors
    /// Propagates the resolver's failure.
    pub fn resolve(&self, reference: &NativeTypeRef, scope: &ResolutionScope<'_>) -> Result<TypeSig> {
        self.resolver.resolve(reference, scope)
    }

    /// The managed type declared for `entry`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnresolvedType`] if `entry` has not been declared.
    pub fn managed(&self, entry: &TypeEntry) -> Result<ManagedTypeRc> {
        self.linkage.type_def(entry.token).ok_or_else(|| {
            unresolved_error!(
                NativeTypeRef::TypeDef(entry.token),
                "type has not been declared"
            )
        })
    }

    pub(crate) fn push_type(&self, managed: ManagedTypeRc) {
        self.types.push(managed);
    }

    /// Tag `source` with the identity of `entry` and log it at the configured level
    pub fn fail(&self, phase: BuildPhase, entry: &TypeEntry, source: Error) -> Error {
        let declaring_type = entry
            .declaring_type
            .and_then(|token| self.model.type_by_token(token))
            .map_or_else(|| "<none>".to_string(), |outer| self.model.fullname(outer));

        let error = Error::TypeContext {
            phase,
            type_name: self.model.fullname(entry),
            declaring_type,
            module: entry.module.clone(),
            source: Box::new(source),
        };

        log!(
            self.config.failure_log_level,
            "{error}: {}",
            error.root_cause()
        );
        error
    }

    /// Keep a failure for the image instead of aborting
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the failure list is poisoned.
    pub(crate) fn record_failure(&self, error: Error) -> Result<()> {
        self.failures.lock().map_err(|_| Error::LockError)?.push(error);
        Ok(())
    }

    /// Handle a descriptor that flags data it does not carry: an error when descriptors are
    /// strict, a warning otherwise.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedDescriptor`] in strict mode.
    pub(crate) fn missing_descriptor_data(&self, message: &str) -> Result<()> {
        if self.config.strict_descriptors {
            Err(malformed_error!(message))
        } else {
            warn!("{message}, skipped");
            Ok(())
        }
    }

    /// Run `f` over every type of the model, in parallel if configured
    ///
    /// # Errors
    /// Returns the first failure of `f`.
    pub(crate) fn for_each_type<T, F>(&self, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&'a TypeEntryRc) -> Result<T> + Sync + Send,
    {
        if self.config.parallel {
            self.model.types().par_iter().map(&f).collect()
        } else {
            self.model.types().iter().map(&f).collect()
        }
    }

    /// Finish the build
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the failure list is poisoned.
    pub fn into_image(self) -> Result<ManagedImage> {
        let types = self.types.iter().map(|(_, t)| t.clone()).collect();
        let failures = self.failures.into_inner().map_err(|_| Error::LockError)?;

        Ok(ManagedImage::new(
            self.model.module().to_string(),
            types,
            self.linkage,
            self.generics,
            failures,
        ))
    }
}
