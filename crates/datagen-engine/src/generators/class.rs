//! Class and tuple generator.

use crate::bind::BoundMembers;
use crate::context::GenerationContext;
use crate::generator::GeneratorError;
use datagen_core::GeneratedValue;
use rand::Rng;
use tracing::trace;

/// Generate every member in declared order and assemble them with the
/// members' constructor.
pub fn generate_members<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    members: &BoundMembers,
) -> Result<GeneratedValue, GeneratorError> {
    trace!(
        path = %ctx.path(),
        members = members.nodes.len(),
        constructor = members.constructor.name(),
        "Generating members"
    );

    let mut values = Vec::with_capacity(members.nodes.len());
    for (node, segment) in members.nodes.iter().zip(&members.segments) {
        let value = ctx.within(segment.clone(), |ctx| node.generate(ctx))?;
        values.push(value);
    }

    members
        .constructor
        .construct(&members.names, values)
        .map_err(|e| GeneratorError::from_construct(ctx.path().to_string(), e))
}
