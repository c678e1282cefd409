//! The hierarchy pass: generic parameters, base types and interfaces of every type.
//!
//! The pass runs in two rounds over all types. The first round declares the type-level generic
//! parameters of every type; the second resolves their constraints, then the base type and
//! the interfaces. Once the first round is through, any `Var` reference anywhere in the model
//! resolves, independent of the order in which types are visited.
//!
//! Failures are tagged with the failing type and abort the build; a broken hierarchy
//! invalidates every member signature that might reference it.

use log::{debug, trace};
use rayon::prelude::*;

use crate::{
    error::BuildPhase,
    metadata::generics::GenericOwner,
    model::entries::TypeEntry,
    shell::{
        context::BuildContext,
        generics::{self, PendingConstraints},
    },
    Result,
};

/// Sets base types, interfaces and type-level generic parameters
pub struct HierarchyConfigurator<'c, 'a> {
    ctx: &'c BuildContext<'a>,
}

impl<'c, 'a> HierarchyConfigurator<'c, 'a> {
    /// Create a configurator operating on `ctx`
    pub fn new(ctx: &'c BuildContext<'a>) -> Self {
        HierarchyConfigurator { ctx }
    }

    /// Configure every type of the model.
    ///
    /// # Errors
    /// Returns the first failure, wrapped in [`crate::Error::TypeContext`].
    pub fn run(&self) -> Result<()> {
        let model = self.ctx.model();
        debug!(
            "Configuring hierarchy of {} types in {}",
            model.types().len(),
            model.module()
        );

        let pending = self.ctx.for_each_type(|entry| {
            self.declare_generics(entry)
                .map_err(|e| self.ctx.fail(BuildPhase::Hierarchy, entry, e))
        })?;

        let entries: Vec<_> = model.types().iter().zip(pending).collect();
        if self.ctx.config().parallel {
            entries
                .par_iter()
                .try_for_each(|(entry, pending)| self.configure_wrapped(entry, pending))?;
        } else {
            entries
                .iter()
                .try_for_each(|(entry, pending)| self.configure_wrapped(entry, pending))?;
        }

        debug!(
            "Hierarchy configured, {} generic parameters registered",
            self.ctx.generics().len()
        );
        Ok(())
    }

    /// Configure a single type, declaring its generic parameters first.
    ///
    /// Types whose hierarchy is already configured are left untouched.
    ///
    /// # Errors
    /// Returns the failure wrapped in [`crate::Error::TypeContext`].
    pub fn configure_type(&self, entry: &TypeEntry) -> Result<()> {
        let pending = self
            .declare_generics(entry)
            .map_err(|e| self.ctx.fail(BuildPhase::Hierarchy, entry, e))?;
        self.configure_wrapped(entry, &pending)
    }

    fn declare_generics<'m>(&self, entry: &'m TypeEntry) -> Result<Vec<PendingConstraints<'m>>> {
        let managed = self.ctx.managed(entry)?;
        match &entry.generics {
            Some(container) if !managed.is_hierarchy_configured() => Ok(generics::declare(
                self.ctx,
                container,
                GenericOwner::Type(entry.token),
                &managed.generic_params,
                self.ctx.model().top_level(entry),
            )),
            _ => Ok(Vec::new()),
        }
    }

    fn configure_wrapped(&self, entry: &TypeEntry, pending: &[PendingConstraints<'_>]) -> Result<()> {
        self.configure(entry, pending)
            .map_err(|e| self.ctx.fail(BuildPhase::Hierarchy, entry, e))
    }

    fn configure(&self, entry: &TypeEntry, pending: &[PendingConstraints<'_>]) -> Result<()> {
        let managed = self.ctx.managed(entry)?;
        if managed.is_hierarchy_configured() {
            trace!("Hierarchy of {} already configured", managed.fullname());
            return Ok(());
        }

        let scope = self.ctx.scope(entry);
        generics::constrain(self.ctx, &scope, pending)?;

        if let Some(base) = &entry.base {
            managed.set_base(self.ctx.resolve(base, &scope)?)?;
        }

        for interface in &entry.interfaces {
            managed.interfaces.push(self.ctx.resolve(interface, &scope)?);
        }

        managed.mark_hierarchy_configured();
        trace!(
            "Configured {}: base {}, {} interfaces, {} generic parameters",
            managed.fullname(),
            managed
                .base()
                .map_or_else(|| "<none>".to_string(), ToString::to_string),
            managed.interfaces.count(),
            managed.generic_params.count()
        );
        Ok(())
    }
}
