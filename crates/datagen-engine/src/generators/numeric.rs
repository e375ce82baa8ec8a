//! Numeric and boolean value generators.

use crate::bind::{FloatWidth, IntWidth};
use datagen_core::{GeneratedValue, RealRange};
use rand::Rng;

/// Generate a signed integer uniform over the full range of `width`.
pub fn generate_signed<R: Rng>(rng: &mut R, width: IntWidth) -> GeneratedValue {
    match width {
        IntWidth::W8 => GeneratedValue::Int8(rng.random()),
        IntWidth::W16 => GeneratedValue::Int16(rng.random()),
        IntWidth::W32 => GeneratedValue::Int32(rng.random()),
        IntWidth::W64 => GeneratedValue::Int64(rng.random()),
    }
}

/// Generate an unsigned integer uniform over `[0, MAX]` of `width`.
pub fn generate_unsigned<R: Rng>(rng: &mut R, width: IntWidth) -> GeneratedValue {
    match width {
        IntWidth::W8 => GeneratedValue::UInt8(rng.random()),
        IntWidth::W16 => GeneratedValue::UInt16(rng.random()),
        IntWidth::W32 => GeneratedValue::UInt32(rng.random()),
        IntWidth::W64 => GeneratedValue::UInt64(rng.random()),
    }
}

/// Generate a fair boolean.
pub fn generate_bool<R: Rng>(rng: &mut R) -> GeneratedValue {
    GeneratedValue::Bool(rng.random())
}

/// Generate a float: a uniform magnitude drawn per `range`, then an
/// independent uniform sign.
pub fn generate_real<R: Rng>(rng: &mut R, width: FloatWidth, range: RealRange) -> GeneratedValue {
    match width {
        FloatWidth::F32 => {
            let magnitude = match range {
                RealRange::UnitMagnitude => rng.random_range(0.0f32..=1.0),
                RealRange::FullRange => rng.random::<f32>() * f32::MAX,
            };
            let negative: bool = rng.random();
            GeneratedValue::Float32(if negative { -magnitude } else { magnitude })
        }
        FloatWidth::F64 => {
            let magnitude = match range {
                RealRange::UnitMagnitude => rng.random_range(0.0f64..=1.0),
                RealRange::FullRange => rng.random::<f64>() * f64::MAX,
            };
            let negative: bool = rng.random();
            GeneratedValue::Float64(if negative { -magnitude } else { magnitude })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TRIALS: usize = 10_000;

    #[test]
    fn test_signed_covers_full_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut min = i8::MAX;
        let mut max = i8::MIN;

        for _ in 0..TRIALS {
            match generate_signed(&mut rng, IntWidth::W8) {
                GeneratedValue::Int8(v) => {
                    min = min.min(v);
                    max = max.max(v);
                }
                other => panic!("Expected Int8 value, got {other:?}"),
            }
        }
        assert_eq!(min, i8::MIN);
        assert_eq!(max, i8::MAX);
    }

    #[test]
    fn test_unsigned_covers_full_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut min = u8::MAX;
        let mut max = u8::MIN;

        for _ in 0..TRIALS {
            match generate_unsigned(&mut rng, IntWidth::W8) {
                GeneratedValue::UInt8(v) => {
                    min = min.min(v);
                    max = max.max(v);
                }
                other => panic!("Expected UInt8 value, got {other:?}"),
            }
        }
        assert_eq!(min, 0);
        assert_eq!(max, u8::MAX);
    }

    #[test]
    fn test_wide_integers_use_target_variant() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            generate_signed(&mut rng, IntWidth::W32),
            GeneratedValue::Int32(_)
        ));
        assert!(matches!(
            generate_unsigned(&mut rng, IntWidth::W64),
            GeneratedValue::UInt64(_)
        ));
    }

    #[test]
    fn test_unit_magnitude_real() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut negative = 0usize;

        for _ in 0..TRIALS {
            let GeneratedValue::Float64(v) =
                generate_real(&mut rng, FloatWidth::F64, RealRange::UnitMagnitude)
            else {
                panic!("Expected Float64 value");
            };
            assert!(v.abs() <= 1.0, "magnitude out of range: {v}");
            if v.is_sign_negative() {
                negative += 1;
            }
        }

        // Four standard deviations around a fair coin
        let fraction = negative as f64 / TRIALS as f64;
        assert!((fraction - 0.5).abs() < 0.02, "negative fraction {fraction}");
    }

    #[test]
    fn test_full_range_real() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut beyond_unit = 0usize;

        for _ in 0..1_000 {
            let GeneratedValue::Float32(v) =
                generate_real(&mut rng, FloatWidth::F32, RealRange::FullRange)
            else {
                panic!("Expected Float32 value");
            };
            assert!(v.is_finite());
            if v.abs() > 1.0 {
                beyond_unit += 1;
            }
        }
        assert!(beyond_unit > 990);
    }

    #[test]
    fn test_bool_is_fair() {
        let mut rng = StdRng::seed_from_u64(42);
        let trues = (0..TRIALS)
            .filter(|_| generate_bool(&mut rng) == GeneratedValue::Bool(true))
            .count();
        let fraction = trues as f64 / TRIALS as f64;
        assert!((fraction - 0.5).abs() < 0.02, "true fraction {fraction}");
    }
}
