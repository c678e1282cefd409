//! Configuration of a shell build.
//!
//! [`BuildConfig`] controls how generic parameters are shared, how strictly descriptors are
//! checked, whether passes run in parallel and what happens when a single type fails.
//!
//! # Examples
//!
//! ```rust
//! use dotshell::config::{BuildConfig, RegistryScope};
//!
//! // Defaults: strict descriptors, one registry per run, sequential, abort on failure
//! let config = BuildConfig::default();
//! assert!(config.strict_descriptors);
//!
//! // Keep going past broken types and log what was skipped
//! let config = BuildConfig::lenient();
//! assert!(config.continue_on_type_error);
//!
//! // Custom
//! let config = BuildConfig {
//!     registry_scope: RegistryScope::PerTopLevelType,
//!     ..BuildConfig::parallel()
//! };
//! assert!(config.parallel);
//! ```

/// Identity scope of the generic parameter registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display)]
pub enum RegistryScope {
    /// One parameter object per global index for the whole run.
    ///
    /// A type-level parameter and a method-level parameter that list the same index share one
    /// object.
    #[default]
    PerRun,
    /// One parameter object per global index and top-level type.
    ///
    /// Declarations under different top-level types never share an object, even if their
    /// indices alias.
    PerTopLevelType,
}

/// Configuration for a shell build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BuildConfig {
    /// Identity scope of generic parameters
    pub registry_scope: RegistryScope,
    /// Fail on descriptors that flag a default value or initial data they do not carry.
    /// When unset, the attachment is skipped with a warning.
    pub strict_descriptors: bool,
    /// Process the types of each pass in parallel
    pub parallel: bool,
    /// Record member failures in the image and continue with the remaining types, instead of
    /// aborting the build
    pub continue_on_type_error: bool,
    /// Do not populate members of the `<Module>` pseudo-type
    pub skip_module_type: bool,
    /// Level at which type failures are logged
    pub failure_log_level: log::Level,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            registry_scope: RegistryScope::PerRun,
            strict_descriptors: true,
            parallel: false,
            continue_on_type_error: false,
            skip_module_type: true,
            failure_log_level: log::Level::Error,
        }
    }
}

impl BuildConfig {
    /// Strict: every inconsistency aborts the build
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Lenient: tolerate incomplete descriptors and skip failing types
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict_descriptors: false,
            continue_on_type_error: true,
            failure_log_level: log::Level::Warn,
            ..Self::default()
        }
    }

    /// Default checks, passes run across all cores
    #[must_use]
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let strict = BuildConfig::strict();
        assert_eq!(strict, BuildConfig::default());
        assert_eq!(strict.registry_scope, RegistryScope::PerRun);
        assert!(strict.skip_module_type);

        let lenient = BuildConfig::lenient();
        assert!(!lenient.strict_descriptors);
        assert!(lenient.continue_on_type_error);
        assert_eq!(lenient.failure_log_level, log::Level::Warn);
        assert!(!lenient.parallel);

        let parallel = BuildConfig::parallel();
        assert!(parallel.parallel);
        assert!(parallel.strict_descriptors);
        assert!(!parallel.continue_on_type_error);
    }
}
