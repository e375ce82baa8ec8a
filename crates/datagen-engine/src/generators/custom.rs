//! Custom value generator.

use crate::context::GenerationContext;
use crate::generator::GeneratorError;
use crate::registry::CustomGenerator;
use datagen_core::{GeneratedValue, ValueType};
use rand::Rng;

/// Delegate to a registered strategy.
pub fn generate_custom<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    strategy: &dyn CustomGenerator,
    name: &str,
    target: &ValueType,
) -> Result<GeneratedValue, GeneratorError> {
    strategy
        .generate(ctx.rng(), target)
        .map_err(|source| GeneratorError::Custom {
            strategy: name.to_string(),
            path: ctx.path().to_string(),
            source,
        })
}
