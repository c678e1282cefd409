//! Mapping raw native type references to managed type signatures.
//!
//! [`TypeResolution`] is the seam between the shell passes and whatever knows how to turn a
//! [`NativeTypeRef`] into a [`TypeSig`]. The default [`ModelTypeResolver`] covers every
//! reference the analysis model can express: primitives, type definitions (via the linkage
//! table), generic parameters (via the registry) and composite types built from those.

use crate::{
    metadata::{
        generics::GenericParamRef,
        token::{TableId, Token},
        typesig::TypeSig,
        types::{ManagedTypeRef, TypeFlavor},
    },
    model::descriptors::NativeTypeRef,
    shell::{linkage::LinkageTable, registry::GenericParamRegistry},
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting depth of a composite type reference
pub const MAX_RECURSION_DEPTH: usize = 100;

/// What a resolver may consult while resolving one reference
pub struct ResolutionScope<'a> {
    /// Analysis entities linked so far
    pub linkage: &'a LinkageTable,
    /// Generic parameters registered so far
    pub generics: &'a GenericParamRegistry,
    /// The top-level type the reference appears in
    pub top_level: Token,
}

/// Resolve raw native type references to managed type signatures
pub trait TypeResolution: Send + Sync {
    /// Resolve `reference`, as it appears within `scope`.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnresolvedType`] if the reference is malformed or points outside
    /// of the known types and generic parameters.
    fn resolve(&self, reference: &NativeTypeRef, scope: &ResolutionScope<'_>) -> Result<TypeSig>;
}

/// Resolves against the linkage table and the generic parameter registry
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelTypeResolver;

impl ModelTypeResolver {
    /// Create a new resolver
    #[must_use]
    pub fn new() -> Self {
        ModelTypeResolver
    }

    fn resolve_type_def(token: Token, scope: &ResolutionScope<'_>) -> Result<TypeSig> {
        if !token.is_table(TableId::TYPE_DEF) {
            return Err(unresolved_error!(
                NativeTypeRef::TypeDef(token),
                "not a TypeDef token"
            ));
        }

        let managed = scope.linkage.type_def(token).ok_or_else(|| {
            unresolved_error!(NativeTypeRef::TypeDef(token), "no type declared for token")
        })?;

        let handle = ManagedTypeRef::new(&managed);
        Ok(match managed.flavor {
            TypeFlavor::ValueType => TypeSig::ValueType(handle),
            TypeFlavor::Class | TypeFlavor::Interface => TypeSig::Class(handle),
        })
    }

    fn resolve_generic(
        reference: &NativeTypeRef,
        index: u32,
        scope: &ResolutionScope<'_>,
    ) -> Result<GenericParamRef> {
        let key = scope.generics.key(index, scope.top_level);
        scope
            .generics
            .get(&key)
            .map(|param| GenericParamRef::new(&param))
            .ok_or_else(|| {
                unresolved_error!(
                    reference,
                    "generic parameter {} has not been declared",
                    index
                )
            })
    }

    fn resolve_depth(
        &self,
        reference: &NativeTypeRef,
        scope: &ResolutionScope<'_>,
        depth: usize,
    ) -> Result<TypeSig> {
        if depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        match reference {
            NativeTypeRef::Primitive(kind) => Ok(TypeSig::Primitive(*kind)),
            NativeTypeRef::TypeDef(token) => Self::resolve_type_def(*token, scope),
            NativeTypeRef::Var(index) => Ok(TypeSig::Var(Self::resolve_generic(
                reference, *index, scope,
            )?)),
            NativeTypeRef::MVar(index) => Ok(TypeSig::MVar(Self::resolve_generic(
                reference, *index, scope,
            )?)),
            NativeTypeRef::SzArray(elem) => Ok(TypeSig::SzArray(Box::new(
                self.resolve_depth(elem, scope, depth + 1)?,
            ))),
            NativeTypeRef::Array { elem, rank } => {
                if *rank == 0 {
                    return Err(unresolved_error!(reference, "array rank must be at least 1"));
                }
                Ok(TypeSig::Array {
                    base: Box::new(self.resolve_depth(elem, scope, depth + 1)?),
                    rank: *rank,
                })
            }
            NativeTypeRef::Ptr(elem) => Ok(TypeSig::Ptr(Box::new(
                self.resolve_depth(elem, scope, depth + 1)?,
            ))),
            NativeTypeRef::ByRef(elem) => Ok(TypeSig::ByRef(Box::new(
                self.resolve_depth(elem, scope, depth + 1)?,
            ))),
            NativeTypeRef::GenericInst { definition, args } => {
                if args.is_empty() {
                    return Err(unresolved_error!(
                        reference,
                        "generic instantiation without arguments"
                    ));
                }

                let definition = self.resolve_depth(definition, scope, depth + 1)?;
                if !matches!(definition, TypeSig::Class(_) | TypeSig::ValueType(_)) {
                    return Err(unresolved_error!(
                        reference,
                        "{} is not a generic type definition",
                        definition
                    ));
                }

                let args = args
                    .iter()
                    .map(|arg| self.resolve_depth(arg, scope, depth + 1))
                    .collect::<Result<Vec<_>>>()?;

                Ok(TypeSig::GenericInst {
                    definition: Box::new(definition),
                    args,
                })
            }
        }
    }
}

impl TypeResolution for ModelTypeResolver {
    fn resolve(&self, reference: &NativeTypeRef, scope: &ResolutionScope<'_>) -> Result<TypeSig> {
        self.resolve_depth(reference, scope, 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::RegistryScope,
        metadata::{
            flags::{GenericParamAttributes, TypeAttributes},
            generics::{GenericOwner, GenericParameter},
            primitives::CilPrimitiveKind,
            types::ManagedType,
        },
        Error,
    };

    struct Fixture {
        linkage: LinkageTable,
        generics: GenericParamRegistry,
        types: Vec<Arc<ManagedType>>,
    }

    impl Fixture {
        fn new() -> Self {
            let linkage = LinkageTable::new();
            let list = Arc::new(ManagedType::new(
                Token::new(0x02000001),
                "Game".to_string(),
                "List`1".to_string(),
                TypeAttributes::PUBLIC,
                TypeFlavor::Class,
                "Game.dll".to_string(),
            ));
            let point = Arc::new(ManagedType::new(
                Token::new(0x02000002),
                "Game".to_string(),
                "Point".to_string(),
                TypeAttributes::PUBLIC,
                TypeFlavor::ValueType,
                "Game.dll".to_string(),
            ));
            linkage.link_type(list.token, &list).unwrap();
            linkage.link_type(point.token, &point).unwrap();

            let generics = GenericParamRegistry::new(RegistryScope::PerRun);
            let key = generics.key(0, list.token);
            generics.register(
                key,
                GenericParameter::new(
                    0,
                    0,
                    "T",
                    GenericParamAttributes::empty(),
                    GenericOwner::Type(list.token),
                ),
            );

            Fixture {
                linkage,
                generics,
                types: vec![list, point],
            }
        }

        fn scope(&self) -> ResolutionScope<'_> {
            ResolutionScope {
                linkage: &self.linkage,
                generics: &self.generics,
                top_level: self.types[0].token,
            }
        }
    }

    #[test]
    fn test_resolve_flavors() -> Result<()> {
        let fixture = Fixture::new();
        let resolver = ModelTypeResolver::new();
        let scope = fixture.scope();

        let list = resolver.resolve(&NativeTypeRef::TypeDef(Token::new(0x02000001)), &scope)?;
        assert!(matches!(list, TypeSig::Class(_)));
        let point = resolver.resolve(&NativeTypeRef::TypeDef(Token::new(0x02000002)), &scope)?;
        assert!(matches!(point, TypeSig::ValueType(_)));
        Ok(())
    }

    #[test]
    fn test_resolve_composite() -> Result<()> {
        let fixture = Fixture::new();
        let resolver = ModelTypeResolver::new();
        let reference = NativeTypeRef::TypeDef(Token::new(0x02000001))
            .instantiate(vec![NativeTypeRef::Var(0).sz_array()]);

        let sig = resolver.resolve(&reference, &fixture.scope())?;
        assert_eq!(sig.to_string(), "Game.List`1<T[]>");
        Ok(())
    }

    #[test]
    fn test_unresolved() {
        let fixture = Fixture::new();
        let resolver = ModelTypeResolver::new();
        let scope = fixture.scope();

        let missing = resolver.resolve(&NativeTypeRef::TypeDef(Token::new(0x02000063)), &scope);
        assert!(matches!(missing, Err(Error::UnresolvedType { .. })));

        let undeclared = resolver.resolve(&NativeTypeRef::MVar(5), &scope);
        assert!(matches!(undeclared, Err(Error::UnresolvedType { reference, .. }) if reference == "!!5"));

        let not_a_type = resolver.resolve(&NativeTypeRef::TypeDef(Token::new(0x06000001)), &scope);
        assert!(matches!(not_a_type, Err(Error::UnresolvedType { .. })));

        let rank_zero = resolver.resolve(
            &NativeTypeRef::Array {
                elem: Box::new(NativeTypeRef::Primitive(CilPrimitiveKind::I4)),
                rank: 0,
            },
            &scope,
        );
        assert!(matches!(rank_zero, Err(Error::UnresolvedType { .. })));

        let bad_inst = resolver.resolve(
            &NativeTypeRef::Primitive(CilPrimitiveKind::I4)
                .instantiate(vec![NativeTypeRef::object()]),
            &scope,
        );
        assert!(matches!(bad_inst, Err(Error::UnresolvedType { .. })));

        let no_args = resolver.resolve(
            &NativeTypeRef::TypeDef(Token::new(0x02000001)).instantiate(vec![]),
            &scope,
        );
        assert!(matches!(no_args, Err(Error::UnresolvedType { .. })));
    }

    #[test]
    fn test_recursion_limit() {
        let fixture = Fixture::new();
        let resolver = ModelTypeResolver::new();

        let mut reference = NativeTypeRef::Primitive(CilPrimitiveKind::I4);
        for _ in 0..=MAX_RECURSION_DEPTH {
            reference = reference.sz_array();
        }

        let result = resolver.resolve(&reference, &fixture.scope());
        assert!(matches!(result, Err(Error::RecursionLimit(MAX_RECURSION_DEPTH))));
    }
}
