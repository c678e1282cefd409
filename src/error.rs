use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::MalformedDescriptor {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::MalformedDescriptor {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! unresolved_error {
    ($reference:expr, $reason:expr) => {
        crate::Error::UnresolvedType {
            reference: $reference.to_string(),
            reason: $reason.to_string(),
        }
    };

    ($reference:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::UnresolvedType {
            reference: $reference.to_string(),
            reason: format!($fmt, $($arg)*),
        }
    };
}

/// The pass of the shell build in which a type-scoped failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum BuildPhase {
    /// Declaring empty managed types for every analysis type
    Declare,
    /// Base types, interfaces and type-level generic parameters
    Hierarchy,
    /// Fields, methods, properties and events
    Members,
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::UnresolvedType`] - A raw type reference could not be mapped to a managed type
/// - [`Error::MissingLinkage`] - An accessor has no managed counterpart at wiring time
/// - [`Error::MalformedDescriptor`] - A descriptor lacks data required to build a valid shell
/// - [`Error::DuplicateLinkage`] - An analysis entity was linked twice
///
/// ## Analysis Errors
/// - [`Error::RecursionLimit`] - Maximum type nesting depth exceeded
/// - [`Error::LockError`] - Thread synchronization failure
///
/// ## Context
/// - [`Error::TypeContext`] - Any of the above, tagged with the type being processed
///
/// # Examples
///
/// ```rust
/// use dotshell::{Error, model::ModelBuilder, shell::ShellBuilder};
///
/// let model = ModelBuilder::new("Game.dll").build();
/// match ShellBuilder::new().build(&model) {
///     Ok(image) => println!("{} types", image.types().len()),
///     Err(Error::TypeContext { type_name, source, .. }) => {
///         eprintln!("{type_name}: {source}");
///     }
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A raw type, interface, constraint, field, parameter or return type reference could not
    /// be mapped to a managed type.
    ///
    /// Either the reference is malformed, or it points outside of the types (and generic
    /// parameters) known at the time of resolution.
    #[error("Unresolved type reference {reference}: {reason}")]
    UnresolvedType {
        /// Textual form of the raw reference
        reference: String,
        /// Why resolution failed
        reason: String,
    },

    /// A property or event accessor has no corresponding managed method.
    ///
    /// Indicates an ordering violation: accessor wiring ran before the accessor method itself
    /// was converted.
    #[error("Accessor {accessor} of {owner} references method {method}, which has no managed counterpart")]
    MissingLinkage {
        /// The property or event that owns the accessor
        owner: String,
        /// Which accessor (getter, setter, add, remove, raise)
        accessor: &'static str,
        /// Token of the accessor's method descriptor
        method: Token,
    },

    /// A descriptor is missing data required to build a valid definition.
    ///
    /// The error includes the source location where the problem was detected.
    #[error("Malformed descriptor - {file}:{line}: {message}")]
    MalformedDescriptor {
        /// The message to be printed for the error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An analysis entity already has a linked managed counterpart.
    #[error("Entity {0} is already linked to a managed object")]
    DuplicateLinkage(Token),

    /// Recursion limit reached while resolving a nested type reference.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Failed to lock target.
    #[error("Failed to lock target")]
    LockError,

    /// A failure while processing a single type, carrying that type's identity.
    ///
    /// The underlying cause is preserved as [`std::error::Error::source`].
    #[error("Failed to process type {type_name} (module {module}, declaring type {declaring_type}) during {phase}")]
    TypeContext {
        /// The pass in which the failure happened
        phase: BuildPhase,
        /// Full name of the type
        type_name: String,
        /// Full name of the enclosing type, or `<none>`
        declaring_type: String,
        /// Name of the owning module
        module: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns the innermost error, looking through any [`Error::TypeContext`] wrappers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::TypeContext { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns true if the root cause is an [`Error::UnresolvedType`].
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self.root_cause(), Error::UnresolvedType { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_context() {
        let inner = unresolved_error!("TypeDef(0x02000009)", "not declared");
        let wrapped = Error::TypeContext {
            phase: BuildPhase::Members,
            type_name: "Game.Player".to_string(),
            declaring_type: "<none>".to_string(),
            module: "Assembly-CSharp.dll".to_string(),
            source: Box::new(inner),
        };

        assert!(wrapped.is_unresolved());
        assert!(matches!(
            wrapped.root_cause(),
            Error::UnresolvedType { reference, .. } if reference == "TypeDef(0x02000009)"
        ));

        let message = wrapped.to_string();
        assert!(message.contains("Game.Player"));
        assert!(message.contains("Assembly-CSharp.dll"));
        assert!(message.contains("members"));
    }

    #[test]
    fn test_malformed_records_location() {
        let err = malformed_error!("field {} has no default", "answer");
        match err {
            Error::MalformedDescriptor {
                message, file, line,
            } => {
                assert_eq!(message, "field answer has no default");
                assert!(file.ends_with("error.rs"));
                assert!(line > 0);
            }
            _ => panic!("expected MalformedDescriptor"),
        }
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(BuildPhase::Hierarchy.to_string(), "hierarchy");
        assert_eq!(BuildPhase::Members.to_string(), "members");
    }
}
