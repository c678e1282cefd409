use std::sync::Arc;

use crate::{
    metadata::{
        flags::FieldAttributes,
        members::{FieldDefinition, FieldSig},
        types::ManagedType,
    },
    model::entries::TypeEntry,
    shell::{context::BuildContext, members::StagedMembers, resolver::ResolutionScope},
    Result,
};

/// Copy the fields of `entry`, in layout order.
///
/// A default value is attached only if the field is flagged `HAS_DEFAULT`; initial data only
/// if it is flagged `HAS_FIELD_RVA`.
pub(super) fn populate(
    ctx: &BuildContext<'_>,
    scope: &ResolutionScope<'_>,
    entry: &TypeEntry,
    managed: &ManagedType,
    staged: &mut StagedMembers,
) -> Result<()> {
    for field in &entry.fields {
        let field_type = ctx.resolve(&field.field_type, scope)?;
        let definition = Arc::new(FieldDefinition::new(
            field.token,
            field.name.clone(),
            field.flags,
            FieldSig {
                is_static: field.is_static(),
                field_type,
            },
        ));

        if field.flags.contains(FieldAttributes::HAS_DEFAULT) {
            match &field.default {
                Some(value) => definition.set_constant(value.clone())?,
                None => ctx.missing_descriptor_data(&format!(
                    "Field {}::{} is flagged HAS_DEFAULT but carries no value",
                    managed.fullname(),
                    field.name
                ))?,
            }
        }

        if field.flags.contains(FieldAttributes::HAS_FIELD_RVA) {
            match &field.initial_data {
                Some(data) => definition.set_initial_data(data.clone())?,
                None => ctx.missing_descriptor_data(&format!(
                    "Field {}::{} is flagged HAS_FIELD_RVA but carries no initial data",
                    managed.fullname(),
                    field.name
                ))?,
            }
        }

        staged.fields.push(definition);
    }

    Ok(())
}
