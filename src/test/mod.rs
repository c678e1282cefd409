mod factories;

pub use factories::*;

use crate::{
    config::BuildConfig,
    model::AnalysisModel,
    shell::{declare_types, BuildContext, ModelTypeResolver},
    Result,
};

/// Run `f` on a context in which all types of `model` are declared
pub fn with_declared<T>(
    model: &AnalysisModel,
    config: BuildConfig,
    f: impl FnOnce(&BuildContext<'_>) -> Result<T>,
) -> Result<T> {
    let resolver = ModelTypeResolver::new();
    let ctx = BuildContext::new(model, config, &resolver);
    declare_types(&ctx)?;
    f(&ctx)
}
