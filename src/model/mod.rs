//! The analysis model: the input of a shell build.
//!
//! An [`AnalysisModel`] is the in-memory view of a native binary's type system, as produced by
//! an upstream metadata reader. Every type and member is an entry carrying raw descriptors
//! (names, attribute words, [`descriptors::NativeTypeRef`] references into the native
//! metadata). The shell builder only reads it.
//!
//! Readers that do not produce entries directly, as well as tests and benchmarks, assemble a
//! model through [`ModelBuilder`].

use std::collections::HashMap;

use crate::metadata::token::Token;

mod builder;
pub mod descriptors;
pub mod entries;

pub use builder::ModelBuilder;
pub use descriptors::{GenericContainer, GenericParamDescriptor, NativeTypeRef, ParamDescriptor};
pub use entries::{
    EventEntry, EventEntryRc, FieldEntry, FieldEntryRc, MethodEntry, MethodEntryRc,
    PropertyEntry, PropertyEntryRc, TypeEntry, TypeEntryRc,
};

/// Read-only model of one module's types
#[derive(Debug)]
pub struct AnalysisModel {
    module: String,
    types: Vec<TypeEntryRc>,
    index: HashMap<Token, usize>,
}

impl AnalysisModel {
    /// Create a model from its type entries, in declaration order
    #[must_use]
    pub fn new(module: String, types: Vec<TypeEntryRc>) -> Self {
        let index = types
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.token, position))
            .collect();

        AnalysisModel {
            module,
            types,
            index,
        }
    }

    /// Name of the module
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// All types, in declaration order
    #[must_use]
    pub fn types(&self) -> &[TypeEntryRc] {
        &self.types
    }

    /// Get a type by its token
    #[must_use]
    pub fn type_by_token(&self, token: Token) -> Option<&TypeEntryRc> {
        self.index.get(&token).map(|position| &self.types[*position])
    }

    /// The outermost type enclosing `entry` (`entry` itself if it is not nested).
    ///
    /// Stops at the first declaring token that is unknown or would revisit a type.
    #[must_use]
    pub fn top_level(&self, entry: &TypeEntry) -> Token {
        let mut current = entry.token;
        let mut declaring = entry.declaring_type;
        let mut steps = 0;

        while let Some(outer) = declaring {
            if steps >= self.types.len() {
                break;
            }
            match self.type_by_token(outer) {
                Some(outer_entry) => {
                    current = outer_entry.token;
                    declaring = outer_entry.declaring_type;
                }
                None => break,
            }
            steps += 1;
        }

        current
    }

    /// Full name of `entry`; nested types are joined with `/`
    #[must_use]
    pub fn fullname(&self, entry: &TypeEntry) -> String {
        let own = |e: &TypeEntry| {
            if e.namespace.is_empty() {
                e.name.clone()
            } else {
                format!("{}.{}", e.namespace, e.name)
            }
        };

        let mut name = own(entry);
        let mut declaring = entry.declaring_type;
        let mut steps = 0;
        while let Some(outer) = declaring.and_then(|t| self.type_by_token(t)) {
            if steps >= self.types.len() {
                break;
            }
            name = format!("{}/{}", own(outer), name);
            declaring = outer.declaring_type;
            steps += 1;
        }

        name
    }

    /// Returns true if following the declaring types of `entry` leads back to a visited type
    #[must_use]
    pub fn is_nesting_cyclic(&self, entry: &TypeEntry) -> bool {
        let mut visited = vec![entry.token];
        let mut declaring = entry.declaring_type;

        while let Some(outer) = declaring {
            if visited.contains(&outer) {
                return true;
            }
            visited.push(outer);
            declaring = self.type_by_token(outer).and_then(|e| e.declaring_type);
        }

        false
    }

    /// Number of methods over all types
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.types.iter().map(|t| t.methods.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        metadata::{flags::TypeAttributes, types::TypeFlavor},
        model::ModelBuilder,
        Result,
    };

    #[test]
    fn test_nesting() -> Result<()> {
        let mut builder = ModelBuilder::new("Game.dll");
        let outer = builder.add_type("Game", "Player", TypeAttributes::PUBLIC, TypeFlavor::Class);
        let inner = builder.add_type("", "Stats", TypeAttributes::NESTED_PUBLIC, TypeFlavor::ValueType);
        let innermost = builder.add_type("", "Entry", TypeAttributes::NESTED_PUBLIC, TypeFlavor::Class);
        builder.set_declaring_type(inner, outer)?;
        builder.set_declaring_type(innermost, inner)?;
        let model = builder.build();

        let entry = model.type_by_token(innermost).unwrap();
        assert_eq!(model.top_level(entry), outer);
        assert_eq!(model.fullname(entry), "Game.Player/Stats/Entry");

        let outer_entry = model.type_by_token(outer).unwrap();
        assert_eq!(model.top_level(outer_entry), outer);
        assert!(!model.is_nesting_cyclic(entry));
        Ok(())
    }

    #[test]
    fn test_nesting_cycle() -> Result<()> {
        let mut builder = ModelBuilder::new("Game.dll");
        let a = builder.add_type("", "A", TypeAttributes::empty(), TypeFlavor::Class);
        let b = builder.add_type("", "B", TypeAttributes::empty(), TypeFlavor::Class);
        builder.set_declaring_type(a, b)?;
        builder.set_declaring_type(b, a)?;
        let model = builder.build();

        let entry = model.type_by_token(a).unwrap();
        assert!(model.is_nesting_cyclic(entry));
        assert_eq!(model.fullname(entry).matches('/').count(), 2);
        Ok(())
    }
}
