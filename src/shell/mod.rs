//! Building a managed metadata shell from an analysis model.
//!
//! A shell is the managed view of a native binary's type system: every type with its
//! hierarchy, generic parameters and members, and stub bodies for every method that expects
//! one. It is built in three ordered steps:
//!
//! 1. [`declare_types`] creates an empty [`crate::metadata::types::ManagedType`] per analysis
//!    type and links it.
//! 2. [`HierarchyConfigurator`] declares the type-level generic parameters of all types, then
//!    resolves constraints, base types and interfaces.
//! 3. [`MemberPopulator`] copies fields, methods (with stub bodies), properties and events.
//!
//! Each step completes for all types before the next one starts. Within a step, types may be
//! processed in parallel (see [`crate::config::BuildConfig::parallel`]).
//!
//! # Examples
//!
//! ```rust
//! use dotshell::{
//!     metadata::{
//!         flags::{MethodAttributes, MethodImplAttributes, TypeAttributes},
//!         primitives::CilPrimitiveKind,
//!         types::TypeFlavor,
//!     },
//!     model::{ModelBuilder, NativeTypeRef},
//!     shell::ShellBuilder,
//! };
//!
//! let mut builder = ModelBuilder::new("Game.dll");
//! let player = builder.add_type("Game", "Player", TypeAttributes::PUBLIC, TypeFlavor::Class);
//! builder.add_method(
//!     player,
//!     "GetHealth",
//!     MethodAttributes::PUBLIC,
//!     MethodImplAttributes::empty(),
//!     NativeTypeRef::Primitive(CilPrimitiveKind::I4),
//! )?;
//!
//! let image = ShellBuilder::new().build(&builder.build())?;
//! let method = image.types()[0].method_by_name("GetHealth").unwrap();
//! assert!(method.has_body()?);
//! # Ok::<(), dotshell::Error>(())
//! ```

mod context;
mod declare;
pub(crate) mod generics;
mod hierarchy;
mod linkage;
mod members;
mod registry;
mod resolver;
pub mod stub;

use log::debug;

pub use context::BuildContext;
pub use declare::declare_types;
pub use hierarchy::HierarchyConfigurator;
pub use linkage::LinkageTable;
pub use members::MemberPopulator;
pub use registry::{GenericParamKey, GenericParamRegistry};
pub use resolver::{ModelTypeResolver, ResolutionScope, TypeResolution, MAX_RECURSION_DEPTH};

use crate::{config::BuildConfig, metadata::image::ManagedImage, model::AnalysisModel, Result};

/// Builds a [`ManagedImage`] from an [`AnalysisModel`]
pub struct ShellBuilder {
    config: BuildConfig,
    resolver: Box<dyn TypeResolution>,
}

impl ShellBuilder {
    /// Create a builder with the default configuration and resolver
    #[must_use]
    pub fn new() -> Self {
        ShellBuilder {
            config: BuildConfig::default(),
            resolver: Box::new(ModelTypeResolver::new()),
        }
    }

    /// Use `config` for subsequent builds
    #[must_use]
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve raw type references through `resolver`
    #[must_use]
    pub fn with_resolver<R: TypeResolution + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// The configuration used for builds
    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the shell of `model`.
    ///
    /// Every build starts with an empty linkage table and registry; nothing is shared
    /// between builds.
    ///
    /// # Errors
    /// Returns the first type failure wrapped in [`crate::Error::TypeContext`]. Member failures
    /// are collected in [`ManagedImage::failures`] instead if
    /// [`BuildConfig::continue_on_type_error`] is set.
    pub fn build(&self, model: &AnalysisModel) -> Result<ManagedImage> {
        debug!(
            "Building shell of {} ({} types, registry scope {})",
            model.module(),
            model.types().len(),
            self.config.registry_scope
        );

        let ctx = BuildContext::new(model, self.config, self.resolver.as_ref());
        declare_types(&ctx)?;
        HierarchyConfigurator::new(&ctx).run()?;
        MemberPopulator::new(&ctx).run()?;

        let image = ctx.into_image()?;
        debug!(
            "Shell of {} built: {} types, {} methods, {} failures",
            image.module,
            image.types().len(),
            image.method_count(),
            image.failures().len()
        );
        Ok(image)
    }
}

impl Default for ShellBuilder {
    fn default() -> Self {
        Self::new()
    }
}
