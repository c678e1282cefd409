use std::sync::Arc;

use crate::{
    metadata::{
        flags::MethodSemanticsAttributes,
        members::{PropertyDefinition, PropertySig},
        types::ManagedType,
    },
    model::entries::TypeEntry,
    shell::{
        context::BuildContext,
        members::{wire_accessor, StagedMembers},
        resolver::ResolutionScope,
    },
    Result,
};

/// Copy the properties of `entry` and wire their getter and setter.
///
/// The accessor methods must already be converted; a property without accessors is kept
/// without semantics.
pub(super) fn populate(
    ctx: &BuildContext<'_>,
    scope: &ResolutionScope<'_>,
    entry: &TypeEntry,
    managed: &ManagedType,
    staged: &mut StagedMembers,
) -> Result<()> {
    for property in &entry.properties {
        let property_type = ctx.resolve(&property.property_type, scope)?;
        let definition = Arc::new(PropertyDefinition::new(
            property.token,
            property.name.clone(),
            property.flags,
            PropertySig {
                has_this: !property.is_static(),
                property_type,
            },
        ));

        let owner = format!("{}::{}", managed.fullname(), property.name);
        wire_accessor(
            ctx,
            staged,
            &definition.semantics,
            &owner,
            ("getter", MethodSemanticsAttributes::GETTER),
            property.getter.as_ref(),
        )?;
        wire_accessor(
            ctx,
            staged,
            &definition.semantics,
            &owner,
            ("setter", MethodSemanticsAttributes::SETTER),
            property.setter.as_ref(),
        )?;

        staged.properties.push(definition);
    }

    Ok(())
}
