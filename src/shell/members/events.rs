use std::sync::Arc;

use crate::{
    metadata::{flags::MethodSemanticsAttributes, members::EventDefinition, types::ManagedType},
    model::entries::TypeEntry,
    shell::{
        context::BuildContext,
        members::{wire_accessor, StagedMembers},
        resolver::ResolutionScope,
    },
    Result,
};

/// Copy the events of `entry` and wire add, remove and raise.
pub(super) fn populate(
    ctx: &BuildContext<'_>,
    scope: &ResolutionScope<'_>,
    entry: &TypeEntry,
    managed: &ManagedType,
    staged: &mut StagedMembers,
) -> Result<()> {
    for event in &entry.events {
        let event_type = ctx.resolve(&event.event_type, scope)?;
        let definition = Arc::new(EventDefinition::new(
            event.token,
            event.name.clone(),
            event.flags,
            event_type,
        ));

        let owner = format!("{}::{}", managed.fullname(), event.name);
        for (role, accessor) in [
            (("add", MethodSemanticsAttributes::ADD_ON), &event.add),
            (("remove", MethodSemanticsAttributes::REMOVE_ON), &event.remove),
            (("raise", MethodSemanticsAttributes::FIRE), &event.raise),
        ] {
            wire_accessor(
                ctx,
                staged,
                &definition.semantics,
                &owner,
                role,
                accessor.as_ref(),
            )?;
        }

        staged.events.push(definition);
    }

    Ok(())
}
