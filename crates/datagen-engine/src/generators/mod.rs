//! Value generators for each node kind.
//!
//! [`BoundGenerator::generate`] is the dispatcher: it routes a bound node to
//! the generator of its kind, which recurses back through the dispatcher for
//! child nodes.

pub mod array;
pub mod class;
pub mod custom;
pub mod nullable;
pub mod numeric;
pub mod string;

use crate::bind::BoundGenerator;
use crate::context::GenerationContext;
use crate::generator::GeneratorError;
use datagen_core::GeneratedValue;
use rand::Rng;

impl BoundGenerator {
    /// Generate one value of this node's target type.
    pub fn generate<R: Rng>(
        &self,
        ctx: &mut GenerationContext<'_, R>,
    ) -> Result<GeneratedValue, GeneratorError> {
        match self {
            BoundGenerator::SignedInt(width) => Ok(numeric::generate_signed(ctx.rng(), *width)),

            BoundGenerator::UnsignedInt(width) => {
                Ok(numeric::generate_unsigned(ctx.rng(), *width))
            }

            BoundGenerator::Real(width) => {
                let range = ctx.options().real_range;
                Ok(numeric::generate_real(ctx.rng(), *width, range))
            }

            BoundGenerator::Bool => Ok(numeric::generate_bool(ctx.rng())),

            BoundGenerator::String => {
                let choice = &ctx.sampling().string_char;
                Ok(GeneratedValue::String(string::generate_string(
                    ctx.rng(),
                    choice,
                )))
            }

            BoundGenerator::Nullable {
                wrapped,
                constructor,
            } => nullable::generate_nullable(ctx, wrapped, constructor.as_ref()),

            BoundGenerator::Array {
                element,
                max_size,
                constructor,
            } => array::generate_array(ctx, element, *max_size, constructor.as_ref()),

            BoundGenerator::KeyValue {
                key,
                value,
                max_size,
                constructor,
            } => array::generate_key_value(ctx, key, value, *max_size, constructor.as_ref()),

            BoundGenerator::Class(members) | BoundGenerator::Tuple(members) => {
                class::generate_members(ctx, members)
            }

            BoundGenerator::Custom {
                strategy,
                name,
                target,
            } => custom::generate_custom(ctx, strategy.as_ref(), name, target),
        }
    }
}
