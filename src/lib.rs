// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
#![deny(unsafe_code)]

//! # dotshell
//!
//! Builds the managed .NET metadata shell of a natively compiled (IL2CPP) binary.
//!
//! An upstream reader recovers the type system of a native binary into an
//! [`model::AnalysisModel`]: types, members, generic containers and raw references into the
//! native metadata. `dotshell` turns that model into a [`metadata::image::ManagedImage`]:
//! managed types with resolved base types, interfaces and generic parameters, fully typed
//! fields, methods, properties and events, and a compilable stub body for every method that
//! expects one. A linkage table maps every analysis entity to its managed counterpart, so later
//! stages (decompilation, attribute restoration, writing) can find and replace what the shell
//! contains.
//!
//! ## Features
//!
//! - **Ordered passes** - hierarchy (base types, interfaces, generic parameters) for all types
//!   before members for any type
//! - **Cycle-safe generics** - parameters are registered before their constraints are resolved,
//!   so `T : IComparable<T>` and mutually constrained siblings resolve without recursion
//! - **Stub bodies** - `ret`, `ldnull; ret` or a default-initialized local, per return type,
//!   encodable to ECMA-335 method body bytes
//! - **Parallel builds** - each pass can run across types with `rayon`; shared state is
//!   lock-free
//! - **Contextual errors** - every failure names the phase, type, declaring type and module
//!
//! ## Quick Start
//!
//! ```rust
//! use dotshell::prelude::*;
//!
//! let mut builder = ModelBuilder::new("Assembly-CSharp.dll");
//! let list = builder.add_type("Game", "List`1", TypeAttributes::PUBLIC, TypeFlavor::Class);
//! let t = builder.add_generic_param(list, "T", GenericParamAttributes::empty())?;
//! builder.add_method(
//!     list,
//!     "get_Item",
//!     MethodAttributes::PUBLIC,
//!     MethodImplAttributes::empty(),
//!     NativeTypeRef::Var(t),
//! )?;
//!
//! let image = ShellBuilder::new().build(&builder.build())?;
//! for managed in image.types() {
//!     println!("{} ({} methods)", managed.fullname(), managed.methods.count());
//! }
//! # Ok::<(), dotshell::Error>(())
//! ```
//!
//! ## Logging
//!
//! `dotshell` logs through the [`log`] facade and installs no logger. Phase boundaries are
//! logged at `debug`, per-type progress at `trace`, shared generic parameters and skipped
//! descriptor data at `warn`, and type failures at
//! [`config::BuildConfig::failure_log_level`].

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Configuration of a shell build
pub mod config;

/// Managed metadata produced by a shell build.
///
/// Tokens, attribute flags, constants, resolved type signatures, managed types and members,
/// stub method bodies and the resulting [`metadata::image::ManagedImage`].
pub mod metadata;

/// The analysis model consumed by a shell build
pub mod model;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotshell::prelude::*;
///
/// let model = ModelBuilder::new("Game.dll").build();
/// let image = ShellBuilder::new().with_config(BuildConfig::lenient()).build(&model)?;
/// assert!(image.failures().is_empty());
/// # Ok::<(), dotshell::Error>(())
/// ```
pub mod prelude;

/// The shell builder: declaration, hierarchy and member passes
pub mod shell;

/// `dotshell` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotshell` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use dotshell::{Error, model::ModelBuilder, shell::ShellBuilder};
///
/// match ShellBuilder::new().build(&ModelBuilder::new("Game.dll").build()) {
///     Ok(image) => println!("{} types", image.types().len()),
///     Err(e) if e.is_unresolved() => println!("Unresolved: {}", e.root_cause()),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::{BuildPhase, Error};

/// Configuration of a shell build, see [`config::BuildConfig`]
pub use config::{BuildConfig, RegistryScope};

/// Main entry point, see [`shell::ShellBuilder`]
pub use shell::ShellBuilder;
