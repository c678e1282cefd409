//! Type declaration: one empty managed type per analysis type.
//!
//! This is the step that makes `TypeDef` references resolvable. It runs before the hierarchy
//! pass and sets nothing but identity (name, namespace, flags, flavor, module) and the
//! enclosing type of nested types.

use std::sync::Arc;

use log::debug;

use crate::{
    error::BuildPhase,
    metadata::types::ManagedType,
    model::entries::TypeEntry,
    shell::context::BuildContext,
    Result,
};

/// Declare and link a managed type for every type of the model, then wire enclosing types.
///
/// Types are declared in model order, so the image lists them in declaration order.
///
/// # Errors
/// Returns [`crate::Error::TypeContext`] wrapping [`crate::Error::DuplicateLinkage`] if two
/// entries share a token, or [`crate::Error::MalformedDescriptor`] if a declaring type is
/// unknown or nesting is cyclic.
pub fn declare_types(ctx: &BuildContext<'_>) -> Result<()> {
    let model = ctx.model();

    for entry in model.types() {
        let managed = Arc::new(ManagedType::new(
            entry.token,
            entry.namespace.clone(),
            entry.name.clone(),
            entry.flags,
            entry.flavor,
            entry.module.clone(),
        ));

        ctx.linkage()
            .link_type(entry.token, &managed)
            .map_err(|e| ctx.fail(BuildPhase::Declare, entry, e))?;
        ctx.push_type(managed);
    }

    for entry in model.types() {
        wire_declaring_type(ctx, entry).map_err(|e| ctx.fail(BuildPhase::Declare, entry, e))?;
    }

    debug!(
        "Declared {} types in {}",
        ctx.linkage().type_count(),
        model.module()
    );
    Ok(())
}

fn wire_declaring_type(ctx: &BuildContext<'_>, entry: &TypeEntry) -> Result<()> {
    let Some(outer) = entry.declaring_type else {
        return Ok(());
    };

    if ctx.model().is_nesting_cyclic(entry) {
        return Err(malformed_error!(
            "Nesting of {} is cyclic",
            entry.name
        ));
    }

    let outer = ctx
        .linkage()
        .type_def(outer)
        .ok_or_else(|| malformed_error!("Declaring type {} of {} is unknown", outer, entry.name))?;

    ctx.managed(entry)?.set_declaring_type(&outer)
}

#[cfg(test)]
mod tests {
    use crate::{
        config::BuildConfig,
        metadata::{flags::TypeAttributes, types::TypeFlavor},
        model::ModelBuilder,
        shell::{context::BuildContext, resolver::ModelTypeResolver},
        Error, Result,
    };

    use super::declare_types;

    #[test]
    fn declares_in_order_with_nesting() -> Result<()> {
        let mut builder = ModelBuilder::new("Game.dll");
        let outer = builder.add_type("Game", "Outer", TypeAttributes::PUBLIC, TypeFlavor::Class);
        let inner = builder.add_type(
            "",
            "Inner",
            TypeAttributes::NESTED_PUBLIC,
            TypeFlavor::ValueType,
        );
        builder.set_declaring_type(inner, outer)?;
        let model = builder.build();

        let resolver = ModelTypeResolver::new();
        let ctx = BuildContext::new(&model, BuildConfig::default(), &resolver);
        declare_types(&ctx)?;

        let image = ctx.into_image()?;
        assert_eq!(image.types().len(), 2);
        assert_eq!(image.types()[0].token, outer);
        assert_eq!(image.types()[1].fullname(), "Game.Outer/Inner");
        assert_eq!(image.types()[1].flavor, TypeFlavor::ValueType);
        Ok(())
    }

    #[test]
    fn cyclic_nesting_is_malformed() -> Result<()> {
        let mut builder = ModelBuilder::new("Game.dll");
        let a = builder.add_type("", "A", TypeAttributes::NESTED_PUBLIC, TypeFlavor::Class);
        let b = builder.add_type("", "B", TypeAttributes::NESTED_PUBLIC, TypeFlavor::Class);
        builder.set_declaring_type(a, b)?;
        builder.set_declaring_type(b, a)?;
        let model = builder.build();

        let resolver = ModelTypeResolver::new();
        let ctx = BuildContext::new(&model, BuildConfig::default(), &resolver);
        let error = declare_types(&ctx).unwrap_err();

        assert!(matches!(error, Error::TypeContext { .. }));
        assert!(matches!(
            error.root_cause(),
            Error::MalformedDescriptor { .. }
        ));
        Ok(())
    }
}
