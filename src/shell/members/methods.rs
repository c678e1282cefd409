use std::sync::Arc;

use log::warn;

use crate::{
    metadata::{
        flags::ParamAttributes,
        generics::{GenericOwner, GenericParamList},
        members::{MethodDefinition, MethodSig, ParameterDefinition},
        types::ManagedType,
    },
    model::entries::{MethodEntry, TypeEntry},
    shell::{
        context::BuildContext, generics, members::StagedMembers, resolver::ResolutionScope, stub,
    },
    Result,
};

/// Convert the methods of `entry`, each with its stub body.
pub(super) fn populate(
    ctx: &BuildContext<'_>,
    scope: &ResolutionScope<'_>,
    entry: &TypeEntry,
    managed: &ManagedType,
    staged: &mut StagedMembers,
) -> Result<()> {
    for method in &entry.methods {
        staged
            .methods
            .push(Arc::new(convert(ctx, scope, managed, method)?));
    }

    Ok(())
}

fn convert(
    ctx: &BuildContext<'_>,
    scope: &ResolutionScope<'_>,
    managed: &ManagedType,
    method: &MethodEntry,
) -> Result<MethodDefinition> {
    // Method generics first, so `MVar` references in the signature and in sibling
    // constraints resolve
    let generic_params = GenericParamList::new();
    if let Some(container) = &method.generics {
        let pending = generics::declare(
            ctx,
            container,
            GenericOwner::Method(method.token),
            &generic_params,
            scope.top_level,
        );
        generics::constrain(ctx, scope, &pending)?;
    }

    let return_type = ctx.resolve(&method.return_type, scope)?;
    let params = method
        .params
        .iter()
        .map(|param| ctx.resolve(&param.param_type, scope))
        .collect::<Result<Vec<_>>>()?;

    let generic_param_count = u32::try_from(generic_params.count())
        .map_err(|_| malformed_error!("Method {} has too many generic parameters", method.name))?;

    let definition = MethodDefinition::new(
        method.token,
        method.name.clone(),
        method.flags,
        method.impl_flags,
        MethodSig {
            has_this: !method.is_static(),
            generic_param_count,
            return_type,
            params,
        },
        generic_params,
    );

    for (position, param) in method.params.iter().enumerate() {
        let sequence = u16::try_from(position + 1)
            .map_err(|_| malformed_error!("Method {} has too many parameters", method.name))?;
        let param_def = ParameterDefinition::new(sequence, param.name.clone(), param.flags);

        match (&param.default, param.flags.contains(ParamAttributes::HAS_DEFAULT)) {
            (Some(value), true) => param_def.set_constant(value.clone())?,
            (None, true) => ctx.missing_descriptor_data(&format!(
                "Parameter {} of {}::{} is flagged HAS_DEFAULT but carries no value",
                param.name,
                managed.fullname(),
                method.name
            ))?,
            (Some(_), false) => warn!(
                "Ignoring default of parameter {} of {}::{}, not flagged HAS_DEFAULT",
                param.name,
                managed.fullname(),
                method.name
            ),
            (None, false) => {}
        }

        definition.params.push(Arc::new(param_def));
    }

    if definition.expects_body() {
        definition.replace_body(stub::synthesize(&definition.signature.return_type))?;
    }

    Ok(definition)
}
