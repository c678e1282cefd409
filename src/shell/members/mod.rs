//! The member pass: fields, methods, properties and events of every type.
//!
//! Runs after the hierarchy pass has completed for all types. Within a type, members are
//! converted in a fixed order (fields, methods, properties, events), so accessor wiring always
//! finds the type's own methods in the linkage table.
//!
//! Converted members are staged per type and only attached to the managed type and the
//! linkage table once all four groups succeeded, so a type either gets all of its members or
//! none of them.
//!
//! A failure while converting a type is tagged with the type's identity. By default it aborts
//! the build; with [`crate::config::BuildConfig::continue_on_type_error`] it is recorded in the
//! image and the remaining types are still converted.

mod events;
mod fields;
mod methods;
mod properties;

use log::{debug, trace};

use crate::{
    error::BuildPhase,
    metadata::{
        flags::MethodSemanticsAttributes,
        members::{EventDefRc, FieldDefRc, MethodDefRc, MethodSemantics, PropertyDefRc},
        token::Token,
        types::ManagedType,
    },
    model::entries::{MethodEntryRc, TypeEntry},
    shell::context::BuildContext,
    Error, Result,
};

/// Copies the members of analysis types onto their managed types
pub struct MemberPopulator<'c, 'a> {
    ctx: &'c BuildContext<'a>,
}

impl<'c, 'a> MemberPopulator<'c, 'a> {
    /// Create a populator operating on `ctx`
    pub fn new(ctx: &'c BuildContext<'a>) -> Self {
        MemberPopulator { ctx }
    }

    /// Populate every type of the model.
    ///
    /// # Errors
    /// Returns the first failure wrapped in [`crate::Error::TypeContext`], unless failures
    /// are configured to be recorded instead.
    pub fn run(&self) -> Result<()> {
        let model = self.ctx.model();
        debug!(
            "Populating members of {} types ({} methods) in {}",
            model.types().len(),
            model.method_count(),
            model.module()
        );

        self.ctx.for_each_type(|entry| match self.populate_type(entry) {
            Err(error) if self.ctx.config().continue_on_type_error => {
                self.ctx.record_failure(error)
            }
            other => other,
        })?;

        debug!(
            "Members populated, {} methods linked",
            self.ctx.linkage().method_count()
        );
        Ok(())
    }

    /// Populate a single type.
    ///
    /// # Errors
    /// Returns the failure wrapped in [`crate::Error::TypeContext`].
    pub fn populate_type(&self, entry: &TypeEntry) -> Result<()> {
        if entry.is_module_type() && self.ctx.config().skip_module_type {
            trace!("Skipping members of {}", entry.name);
            return Ok(());
        }

        self.populate(entry)
            .map_err(|e| self.ctx.fail(BuildPhase::Members, entry, e))
    }

    fn populate(&self, entry: &TypeEntry) -> Result<()> {
        let managed = self.ctx.managed(entry)?;
        let scope = self.ctx.scope(entry);

        let mut staged = StagedMembers::default();
        fields::populate(self.ctx, &scope, entry, &managed, &mut staged)?;
        methods::populate(self.ctx, &scope, entry, &managed, &mut staged)?;
        properties::populate(self.ctx, &scope, entry, &managed, &mut staged)?;
        events::populate(self.ctx, &scope, entry, &managed, &mut staged)?;
        staged.publish(self.ctx, &managed)?;

        trace!(
            "Populated {}: {} fields, {} methods, {} properties, {} events",
            managed.fullname(),
            managed.fields.count(),
            managed.methods.count(),
            managed.properties.count(),
            managed.events.count()
        );
        Ok(())
    }
}

/// Members of one type, converted but not yet visible on the type or in the linkage table
#[derive(Default)]
struct StagedMembers {
    fields: Vec<FieldDefRc>,
    methods: Vec<MethodDefRc>,
    properties: Vec<PropertyDefRc>,
    events: Vec<EventDefRc>,
}

impl StagedMembers {
    fn method(&self, token: Token) -> Option<MethodDefRc> {
        self.methods.iter().find(|m| m.token == token).cloned()
    }

    /// Attach every staged member to `managed` and link it.
    ///
    /// Tokens are checked up front so a duplicate leaves nothing published.
    fn publish(self, ctx: &BuildContext<'_>, managed: &ManagedType) -> Result<()> {
        let linkage = ctx.linkage();
        let duplicate = self
            .fields
            .iter()
            .map(|f| f.token)
            .find(|t| linkage.field(*t).is_some())
            .or_else(|| {
                self.methods
                    .iter()
                    .map(|m| m.token)
                    .find(|t| linkage.method(*t).is_some())
            })
            .or_else(|| {
                self.properties
                    .iter()
                    .map(|p| p.token)
                    .find(|t| linkage.property(*t).is_some())
            })
            .or_else(|| {
                self.events
                    .iter()
                    .map(|e| e.token)
                    .find(|t| linkage.event(*t).is_some())
            });
        if let Some(token) = duplicate {
            return Err(Error::DuplicateLinkage(token));
        }

        for field in self.fields {
            linkage.link_field(field.token, &field)?;
            managed.fields.push(field);
        }
        for method in self.methods {
            linkage.link_method(method.token, &method)?;
            managed.methods.push(method);
        }
        for property in self.properties {
            linkage.link_property(property.token, &property)?;
            managed.properties.push(property);
        }
        for event in self.events {
            linkage.link_event(event.token, &event)?;
            managed.events.push(event);
        }
        Ok(())
    }
}

/// Attach the managed counterpart of `accessor`, if the descriptor names one.
///
/// The type's own methods are looked up among the staged members first.
fn wire_accessor(
    ctx: &BuildContext<'_>,
    staged: &StagedMembers,
    semantics: &boxcar::Vec<MethodSemantics>,
    owner: &str,
    role: (&'static str, MethodSemanticsAttributes),
    accessor: Option<&MethodEntryRc>,
) -> Result<()> {
    let Some(accessor) = accessor else {
        return Ok(());
    };

    let method = staged
        .method(accessor.token)
        .or_else(|| ctx.linkage().method(accessor.token))
        .ok_or_else(|| Error::MissingLinkage {
            owner: owner.to_string(),
            accessor: role.0,
            method: accessor.token,
        })?;

    semantics.push(MethodSemantics {
        attributes: role.1,
        method,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::BuildConfig,
        metadata::{
            flags::{
                FieldAttributes, MethodAttributes, MethodImplAttributes, ParamAttributes,
                TypeAttributes,
            },
            primitives::{CilPrimitive, CilPrimitiveKind},
            types::TypeFlavor,
        },
        model::{ModelBuilder, NativeTypeRef, ParamDescriptor},
        shell::{stub::StubKind, HierarchyConfigurator},
        test::{create_comparable_list, create_player, with_declared},
    };

    #[test]
    fn populate_player() -> Result<()> {
        let (model, tokens) = create_player()?;

        with_declared(&model, BuildConfig::default(), |ctx| {
            HierarchyConfigurator::new(ctx).run()?;
            MemberPopulator::new(ctx).run()?;

            let player = ctx.managed(model.type_by_token(tokens.player).unwrap())?;
            assert_eq!(player.fields.count(), 2);
            assert_eq!(player.methods.count(), 6);

            let max_health = ctx.linkage().field(tokens.health).unwrap();
            assert_eq!(max_health.constant(), Some(&CilPrimitive::i4(42)));
            let lookup = ctx.linkage().field(tokens.lookup).unwrap();
            assert_eq!(lookup.initial_data(), Some([1u8, 2, 3, 4].as_slice()));

            let get_health = ctx.linkage().method(tokens.get_health).unwrap();
            let body = get_health.body()?.unwrap();
            assert_eq!(body.locals.len(), 1);
            assert_eq!(
                StubKind::classify(&get_health.signature.return_type),
                StubKind::ValueType
            );

            let get_position = ctx.linkage().method(tokens.get_position).unwrap();
            assert!(!get_position.has_body()?);

            let heal = player.method_by_name("Heal").unwrap();
            assert_eq!(heal.params.count(), 2);
            assert_eq!(
                heal.param(1).unwrap().constant(),
                Some(&CilPrimitive::i4(10))
            );
            assert_eq!(heal.param(2).unwrap().name, "source");

            let property = ctx.linkage().property(tokens.health_property).unwrap();
            assert_eq!(property.semantics.count(), 2);
            assert!(Arc::ptr_eq(&property.getter().unwrap(), &get_health));
            assert!(property.signature.has_this);

            let died = ctx.linkage().event(tokens.died).unwrap();
            assert!(died.add_on().is_some());
            assert!(died.remove_on().is_some());
            assert!(died.fire().is_none());
            Ok(())
        })
    }

    #[test]
    fn module_type_is_skipped() -> Result<()> {
        let mut builder = ModelBuilder::new("Game.dll");
        let module = builder.add_type("", "<Module>", TypeAttributes::empty(), TypeFlavor::Class);
        builder.add_method(
            module,
            ".cctor",
            MethodAttributes::STATIC,
            MethodImplAttributes::empty(),
            NativeTypeRef::void(),
        )?;
        let model = builder.build();

        with_declared(&model, BuildConfig::default(), |ctx| {
            HierarchyConfigurator::new(ctx).run()?;
            MemberPopulator::new(ctx).run()?;
            assert_eq!(ctx.linkage().method_count(), 0);
            Ok(())
        })?;

        let config = BuildConfig {
            skip_module_type: false,
            ..BuildConfig::default()
        };
        with_declared(&model, config, |ctx| {
            HierarchyConfigurator::new(ctx).run()?;
            MemberPopulator::new(ctx).run()?;
            assert_eq!(ctx.linkage().method_count(), 1);
            Ok(())
        })
    }

    #[test]
    fn members_before_hierarchy_is_detected() -> Result<()> {
        let (model, _) = create_comparable_list()?;

        let error = with_declared(&model, BuildConfig::default(), |ctx| {
            MemberPopulator::new(ctx).run()
        })
        .unwrap_err();

        assert!(matches!(
            error,
            Error::TypeContext {
                phase: BuildPhase::Members,
                ..
            }
        ));
        assert!(error.is_unresolved());
        Ok(())
    }

    #[test]
    fn missing_default_strict_and_lenient() -> Result<()> {
        let mut builder = ModelBuilder::new("Game.dll");
        let config_type =
            builder.add_type("Game", "Settings", TypeAttributes::PUBLIC, TypeFlavor::Class);
        builder.add_field(
            config_type,
            "Volume",
            FieldAttributes::PUBLIC | FieldAttributes::HAS_DEFAULT,
            NativeTypeRef::Primitive(CilPrimitiveKind::R4),
        )?;
        let model = builder.build();

        let error = with_declared(&model, BuildConfig::default(), |ctx| {
            HierarchyConfigurator::new(ctx).run()?;
            MemberPopulator::new(ctx).run()
        })
        .unwrap_err();
        assert!(matches!(
            error.root_cause(),
            Error::MalformedDescriptor { .. }
        ));

        with_declared(&model, BuildConfig::lenient(), |ctx| {
            HierarchyConfigurator::new(ctx).run()?;
            MemberPopulator::new(ctx).run()?;
            let settings = ctx.managed(&model.types()[0])?;
            let volume = settings.field_by_name("Volume").unwrap();
            assert!(volume.constant().is_none());
            Ok(())
        })
    }

    #[test]
    fn param_default_requires_flag() -> Result<()> {
        let mut builder = ModelBuilder::new("Game.dll");
        let ty = builder.add_type("Game", "Spawner", TypeAttributes::PUBLIC, TypeFlavor::Class);
        let spawn = builder.add_method(
            ty,
            "Spawn",
            MethodAttributes::PUBLIC,
            MethodImplAttributes::empty(),
            NativeTypeRef::void(),
        )?;
        let int = || NativeTypeRef::Primitive(CilPrimitiveKind::I4);
        builder.add_param(
            spawn,
            ParamDescriptor::new("count", int()).with_default(CilPrimitive::i4(1)),
        )?;
        builder.add_param(
            spawn,
            ParamDescriptor::new("wave", int())
                .with_default(CilPrimitive::i4(10))
                .with_flags(ParamAttributes::empty()),
        )?;
        let model = builder.build();

        with_declared(&model, BuildConfig::default(), |ctx| {
            HierarchyConfigurator::new(ctx).run()?;
            MemberPopulator::new(ctx).run()?;

            let spawn = ctx.linkage().method(spawn).unwrap();
            assert_eq!(
                spawn.param(1).unwrap().constant(),
                Some(&CilPrimitive::i4(1))
            );
            let wave = spawn.param(2).unwrap();
            assert!(wave.flags.is_empty());
            assert!(wave.constant().is_none());
            Ok(())
        })
    }

    #[test]
    fn unlinked_accessor_is_missing_linkage() -> Result<()> {
        let mut builder = ModelBuilder::new("Game.dll");
        let first = builder.add_type("Game", "First", TypeAttributes::PUBLIC, TypeFlavor::Class);
        let second = builder.add_type("Game", "Second", TypeAttributes::PUBLIC, TypeFlavor::Class);
        let getter = builder.add_method(
            second,
            "get_Value",
            MethodAttributes::PUBLIC,
            MethodImplAttributes::empty(),
            NativeTypeRef::object(),
        )?;
        builder.add_property(
            first,
            "Value",
            crate::metadata::flags::PropertyAttributes::empty(),
            NativeTypeRef::object(),
            Some(getter),
            None,
        )?;
        let model = builder.build();

        let error = with_declared(&model, BuildConfig::default(), |ctx| {
            HierarchyConfigurator::new(ctx).run()?;
            MemberPopulator::new(ctx).run()
        })
        .unwrap_err();

        match error.root_cause() {
            Error::MissingLinkage {
                owner,
                accessor,
                method,
            } => {
                assert_eq!(owner, "Game.First::Value");
                assert_eq!(*accessor, "getter");
                assert_eq!(*method, getter);
            }
            other => panic!("unexpected error {other}"),
        }
        Ok(())
    }
}
