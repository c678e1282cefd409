//! The managed side of a shell build.
//!
//! Everything in here describes the image being synthesized: tokens and attribute flags,
//! constants, resolved type signatures, managed types, generic parameters, member definitions
//! and their placeholder bodies, and finally the [`image::ManagedImage`] that ties them
//! together.
//!
//! # Key Components
//!
//! - [`token`] - Metadata tokens used as identity and linkage keys
//! - [`flags`] - Typed attribute bitflags (ECMA-335 §II.23.1)
//! - [`primitives`] - Built-in primitive kinds and constant values
//! - [`typesig`] - Resolved type signatures
//! - [`types`] - Managed types under construction
//! - [`generics`] - Generic parameters shared by index
//! - [`members`] - Fields, methods, parameters, properties and events
//! - [`body`] - Stub method bodies and their encoding
//! - [`image`] - The finished image

pub mod body;
pub mod flags;
pub mod generics;
pub mod image;
pub mod members;
pub mod primitives;
pub mod token;
pub mod typesig;
pub mod types;
