//! Array and key/value generators.
//!
//! Both draw an element count uniform over `[0, max_size]`, open a
//! [`LazySequence`] over their children and hand it to the node's
//! constructor, which pulls as many elements as it needs.

use crate::bind::BoundGenerator;
use crate::context::GenerationContext;
use crate::generator::GeneratorError;
use crate::sequence::{Elements, Entries, LazySequence};
use datagen_core::{EntryConstructor, GeneratedValue, SequenceConstructor};
use rand::Rng;
use tracing::trace;

fn draw_count<R: Rng>(ctx: &mut GenerationContext<'_, R>, max_size: Option<usize>) -> usize {
    let bound = max_size.unwrap_or(ctx.options().max_collection_size);
    ctx.rng().random_range(0..=bound)
}

/// Generate an array-like value.
pub fn generate_array<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    element: &BoundGenerator,
    max_size: Option<usize>,
    constructor: &dyn SequenceConstructor,
) -> Result<GeneratedValue, GeneratorError> {
    let count = draw_count(ctx, max_size);
    trace!(path = %ctx.path(), count, constructor = constructor.name(), "Generating array");

    let result = {
        let mut sequence = LazySequence::new(ctx, Elements(element), count);
        constructor.construct(&mut sequence)
    };
    result.map_err(|e| GeneratorError::from_construct(ctx.path().to_string(), e))
}

/// Generate a map-like value; every entry draws its key before its value.
pub fn generate_key_value<R: Rng>(
    ctx: &mut GenerationContext<'_, R>,
    key: &BoundGenerator,
    value: &BoundGenerator,
    max_size: Option<usize>,
    constructor: &dyn EntryConstructor,
) -> Result<GeneratedValue, GeneratorError> {
    let count = draw_count(ctx, max_size);
    trace!(path = %ctx.path(), count, constructor = constructor.name(), "Generating map");

    let result = {
        let mut sequence = LazySequence::new(ctx, Entries { key, value }, count);
        constructor.construct(&mut sequence)
    };
    result.map_err(|e| GeneratorError::from_construct(ctx.path().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::IntWidth;
    use crate::context::Sampling;
    use datagen_core::{
        collect_lazy, ConstructError, ElementSource, GenerationOptions, MapConstructor,
        SetConstructor,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sampling() -> Sampling {
        Sampling::new(GenerationOptions::default()).unwrap()
    }

    /// Takes at most two elements and leaves the rest ungenerated.
    #[derive(Debug)]
    struct FirstTwo;

    impl SequenceConstructor for FirstTwo {
        fn name(&self) -> &str {
            "first_two"
        }

        fn construct(
            &self,
            items: &mut dyn ElementSource<GeneratedValue>,
        ) -> Result<GeneratedValue, ConstructError> {
            collect_lazy(items, 2).map(GeneratedValue::Array)
        }
    }

    #[test]
    fn test_array_length_bounds() {
        let sampling = sampling();
        let element = BoundGenerator::Bool;
        let constructor = datagen_core::ListConstructor;
        let mut ctx = GenerationContext::new(StdRng::seed_from_u64(42), &sampling);
        let mut lengths = [0usize; 101];

        for _ in 0..10_000 {
            let value = generate_array(&mut ctx, &element, None, &constructor).unwrap();
            let len = value.as_array().unwrap().len();
            assert!(len <= 100, "length {len} over bound");
            lengths[len] += 1;
        }

        assert!(lengths[0] > 0, "empty arrays never generated");
        assert!(lengths[100] > 0, "full arrays never generated");
    }

    #[test]
    fn test_node_max_size_overrides_options() {
        let sampling = sampling();
        let element = BoundGenerator::SignedInt(IntWidth::W16);
        let constructor = datagen_core::ListConstructor;
        let mut ctx = GenerationContext::new(StdRng::seed_from_u64(1), &sampling);

        for _ in 0..500 {
            let value = generate_array(&mut ctx, &element, Some(3), &constructor).unwrap();
            assert!(value.as_array().unwrap().len() <= 3);
        }

        let value = generate_array(&mut ctx, &element, Some(0), &constructor).unwrap();
        assert_eq!(value, GeneratedValue::Array(vec![]));
    }

    #[test]
    fn test_constructor_controls_materialization() {
        let sampling = sampling();
        let element = BoundGenerator::SignedInt(IntWidth::W64);
        let mut ctx = GenerationContext::new(StdRng::seed_from_u64(2), &sampling);

        for _ in 0..100 {
            let value = generate_array(&mut ctx, &element, Some(50), &FirstTwo).unwrap();
            assert!(value.as_array().unwrap().len() <= 2);
        }
    }

    #[test]
    fn test_set_constructor_dedupes() {
        let sampling = sampling();
        let element = BoundGenerator::Bool;
        let mut ctx = GenerationContext::new(StdRng::seed_from_u64(4), &sampling);

        for _ in 0..100 {
            let value = generate_array(&mut ctx, &element, Some(20), &SetConstructor).unwrap();
            assert!(value.as_array().unwrap().len() <= 2);
        }
    }

    #[test]
    fn test_map_keys_are_unique() {
        let sampling = sampling();
        let key = BoundGenerator::UnsignedInt(IntWidth::W8);
        let value = BoundGenerator::Bool;
        let mut ctx = GenerationContext::new(StdRng::seed_from_u64(6), &sampling);

        for _ in 0..200 {
            let map = generate_key_value(&mut ctx, &key, &value, None, &MapConstructor).unwrap();
            let entries = map.as_map().unwrap();
            assert!(entries.len() <= 100);
            for (i, (k, v)) in entries.iter().enumerate() {
                assert!(matches!(k, GeneratedValue::UInt8(_)));
                assert!(matches!(v, GeneratedValue::Bool(_)));
                assert!(!entries[..i].iter().any(|(earlier, _)| earlier == k));
            }
        }
    }

    #[test]
    fn test_map_length_bounds() {
        let sampling = sampling();
        let key = BoundGenerator::UnsignedInt(IntWidth::W64);
        let value = BoundGenerator::Bool;
        let mut ctx = GenerationContext::new(StdRng::seed_from_u64(43), &sampling);
        let mut lengths = [0usize; 101];

        for _ in 0..10_000 {
            let map = generate_key_value(&mut ctx, &key, &value, None, &MapConstructor).unwrap();
            let len = map.as_map().unwrap().len();
            assert!(len <= 100, "length {len} over bound");
            lengths[len] += 1;
        }

        assert!(lengths[0] > 0, "empty maps never generated");
        assert!(lengths[100] > 0, "full maps never generated");
    }
}
