//! Nullable value generator.

use crate::bind::BoundGenerator;
use crate::context::GenerationContext;
use crate::generator::GeneratorError;
use datagen_core::{GeneratedValue, NullableConstructor};
use rand::distr::Distribution;
use rand::Rng;

/// Generate an empty value with probability `1 / null_outcomes`, otherwise
/// generate `wrapped` and wrap it.
///
/// The empty value comes from the constructor's empty capability when it has
/// one and is `GeneratedValue::Null` otherwise.
pub fn generate_nullable<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    wrapped: &BoundGenerator,
    constructor: &dyn NullableConstructor,
) -> Result<GeneratedValue, GeneratorError> {
    let outcome = ctx.sampling().null_choice.sample(ctx.rng());
    if outcome == 0 {
        return match constructor.empty() {
            Some(empty) => {
                empty.map_err(|e| GeneratorError::from_construct(ctx.path().to_string(), e))
            }
            None => Ok(GeneratedValue::Null),
        };
    }

    let value = wrapped.generate(ctx)?;
    constructor
        .wrap(value)
        .map_err(|e| GeneratorError::from_construct(ctx.path().to_string(), e))
}
