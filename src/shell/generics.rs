//! Generic parameter population, shared by types and methods.
//!
//! Population happens in two steps:
//!
//! 1. [`declare`] looks up every parameter of a container by its key, constructs and registers
//!    the ones that are new, and adds each to the owner's list unless it is already there.
//! 2. [`constrain`] resolves the constraints of the parameters constructed in step 1.
//!
//! Because every parameter of a container is registered before any constraint is resolved, a
//! constraint referring back to its own parameter, or to a sibling declared later in the same
//! container, resolves to the registered object instead of recursing.

use std::sync::Arc;

use log::{trace, warn};

use crate::{
    metadata::{
        generics::{GenericOwner, GenericParamList, GenericParamRc, GenericParameter},
        token::Token,
    },
    model::descriptors::{GenericContainer, GenericParamDescriptor},
    shell::{context::BuildContext, resolver::ResolutionScope},
    Result,
};

/// A freshly constructed parameter whose constraints are still unresolved
pub(crate) struct PendingConstraints<'m> {
    param: GenericParamRc,
    descriptor: &'m GenericParamDescriptor,
}

/// Register and attach the parameters of `container` to `owner`.
///
/// Returns the parameters this call constructed; parameters found in the registry were
/// constructed (and are constrained) by whoever registered them first. In a parallel pass that
/// may still be in progress, see [`GenericParameter::is_constrained`]. Nothing during the build
/// reads constraints, so only the finished image relies on them being complete.
pub(crate) fn declare<'m>(
    ctx: &BuildContext<'_>,
    container: &'m GenericContainer,
    owner: GenericOwner,
    list: &GenericParamList,
    top_level: Token,
) -> Vec<PendingConstraints<'m>> {
    let mut pending = Vec::new();

    for descriptor in &container.params {
        let key = ctx.generics().key(descriptor.index, top_level);
        let (param, constructed) = match ctx.generics().get(&key) {
            Some(existing) => (existing, false),
            None => ctx.generics().register(
                key,
                GenericParameter::new(
                    descriptor.index,
                    descriptor.number,
                    &descriptor.name,
                    descriptor.flags,
                    owner,
                ),
            ),
        };

        if !list.iter().any(|(_, p)| Arc::ptr_eq(p, &param)) {
            list.push(param.clone());
        }

        if !param.is_owned_by(owner) {
            param.owners.push(owner);
            if param.owner_count() > 1 {
                warn!(
                    "Generic parameter {} (index {}) declared by {:?} is shared with {:?}",
                    param.name, param.index, param.declared_by, owner
                );
            }
        }

        if constructed {
            trace!(
                "Registered generic parameter {} (index {}) for {:?}",
                param.name,
                param.index,
                owner
            );
            pending.push(PendingConstraints { param, descriptor });
        }
    }

    pending
}

/// Resolve and attach the constraints of freshly constructed parameters
///
/// # Errors
/// Propagates resolution failures of any constraint.
pub(crate) fn constrain(
    ctx: &BuildContext<'_>,
    scope: &ResolutionScope<'_>,
    pending: &[PendingConstraints<'_>],
) -> Result<()> {
    for item in pending {
        for constraint in &item.descriptor.constraints {
            let sig = ctx.resolve(constraint, scope)?;
            item.param.constraints.push(sig);
        }
        item.param.mark_constrained();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::BuildConfig,
        metadata::{flags::GenericParamAttributes, token::Token},
        model::{descriptors::GenericContainer, NativeTypeRef, ModelBuilder},
        test::with_declared,
    };

    fn container(constraints: Vec<NativeTypeRef>) -> GenericContainer {
        GenericContainer {
            params: vec![
                GenericParamDescriptor {
                    index: 0,
                    number: 0,
                    name: "TKey".to_string(),
                    flags: GenericParamAttributes::empty(),
                    constraints,
                },
                GenericParamDescriptor {
                    index: 1,
                    number: 1,
                    name: "TValue".to_string(),
                    flags: GenericParamAttributes::empty(),
                    constraints: vec![NativeTypeRef::Var(0)],
                },
            ],
        }
    }

    #[test]
    fn declare_is_idempotent_per_owner() -> Result<()> {
        let model = ModelBuilder::new("Game.dll").build();
        let owner = GenericOwner::Type(Token::new(0x02000001));
        let other = GenericOwner::Method(Token::new(0x06000001));
        let container = container(vec![]);

        with_declared(&model, BuildConfig::default(), |ctx| {
            let list = GenericParamList::new();
            let first = declare(ctx, &container, owner, &list, Token::new(0x02000001));
            let second = declare(ctx, &container, owner, &list, Token::new(0x02000001));
            assert_eq!(first.len(), 2);
            assert!(second.is_empty());
            assert_eq!(list.count(), 2);

            let method_list = GenericParamList::new();
            declare(ctx, &container, other, &method_list, Token::new(0x02000001));
            assert!(Arc::ptr_eq(&list[0], &method_list[0]));
            assert_eq!(list[0].owner_count(), 2);
            assert_eq!(ctx.generics().len(), 2);
            Ok(())
        })
    }

    #[test]
    fn sibling_constraint_resolves_to_registered_param() -> Result<()> {
        let model = ModelBuilder::new("Game.dll").build();
        let top_level = Token::new(0x02000001);
        // TKey : TValue, declared before TValue
        let container = container(vec![NativeTypeRef::Var(1)]);

        with_declared(&model, BuildConfig::default(), |ctx| {
            let list = GenericParamList::new();
            let pending = declare(ctx, &container, GenericOwner::Type(top_level), &list, top_level);
            assert!(!list[0].is_constrained());
            let scope = ResolutionScope {
                linkage: ctx.linkage(),
                generics: ctx.generics(),
                top_level,
            };
            constrain(ctx, &scope, &pending)?;

            let key = list[0].constraints[0].generic_param().unwrap();
            let value = list[1].constraints[0].generic_param().unwrap();
            assert!(Arc::ptr_eq(&key, &list[1]));
            assert!(Arc::ptr_eq(&value, &list[0]));
            assert!(list.iter().all(|(_, p)| p.is_constrained()));
            Ok(())
        })
    }
}
