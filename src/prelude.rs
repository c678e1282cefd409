//! # dotshell Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotshell library. Import this module to get quick access to the essential
//! types for building managed shells.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotshell operations
pub use crate::Error;

/// The result type used throughout dotshell
pub use crate::Result;

/// The pass a type failure happened in
pub use crate::BuildPhase;

/// Configuration of a shell build
pub use crate::config::{BuildConfig, RegistryScope};

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Builds a managed image from an analysis model
pub use crate::shell::ShellBuilder;

/// The output of a build
pub use crate::metadata::image::ManagedImage;

// ================================================================================================
// Analysis Model (input)
// ================================================================================================

/// The analysis model and its builder
pub use crate::model::{AnalysisModel, ModelBuilder};

/// Raw descriptors of the analysis model
pub use crate::model::{
    GenericContainer, GenericParamDescriptor, NativeTypeRef, ParamDescriptor, TypeEntry,
    TypeEntryRc,
};

// ================================================================================================
// Managed Metadata (output)
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Attribute flags
pub use crate::metadata::flags::{
    EventAttributes, FieldAttributes, GenericParamAttributes, MethodAttributes,
    MethodImplAttributes, MethodSemanticsAttributes, ParamAttributes, PropertyAttributes,
    TypeAttributes,
};

/// Primitive types and constants
pub use crate::metadata::primitives::{CilPrimitive, CilPrimitiveKind};

/// Resolved type signatures
pub use crate::metadata::typesig::TypeSig;

/// Managed types
pub use crate::metadata::types::{ManagedType, ManagedTypeRc, ManagedTypeRef, TypeFlavor};

/// Generic parameters
pub use crate::metadata::generics::{GenericOwner, GenericParamRc, GenericParameter};

/// Managed members
pub use crate::metadata::members::{
    EventDefinition, FieldDefinition, MethodDefinition, MethodSemantics, ParameterDefinition,
    PropertyDefinition,
};

/// Method bodies
pub use crate::metadata::body::{CilOpCode, Instruction, MethodBody};

// ================================================================================================
// Shell Building
// ================================================================================================

/// Build state and passes
pub use crate::shell::{
    BuildContext, GenericParamRegistry, HierarchyConfigurator, LinkageTable, MemberPopulator,
};

/// Type resolution
pub use crate::shell::{ModelTypeResolver, ResolutionScope, TypeResolution};

/// Stub synthesis
pub use crate::shell::stub::{synthesize, StubKind};
