//! JSON round trip of generated values.
//!
//! Each value goes through encode → serialize → parse → decode → shape check,
//! and the decoded value must encode back to the same JSON.

use datagen_core::{GeneratedValue, SchemaNode};
use datagen_engine::{DataGenerator, GeneratorError};
use json_types::{DecodeError, EncodeError, ShapeError};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

/// A failed round trip.
#[derive(Error, Debug)]
pub enum RoundTripError {
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    /// The decoded value encodes to different JSON than the original
    #[error("Value {index} changed in round trip: {before} became {after}")]
    Mismatch {
        index: u64,
        before: String,
        after: String,
    },
}

/// Totals of a successful round trip run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundTripReport {
    /// Values checked
    pub values: u64,
    /// Serialized JSON bytes
    pub bytes: u64,
}

/// Round-trip a single value; returns its serialized size.
pub fn roundtrip_value(value: &GeneratedValue, schema: &SchemaNode) -> Result<usize, RoundTripError> {
    round_trip_at(0, value, schema)
}

fn round_trip_at(
    index: u64,
    value: &GeneratedValue,
    schema: &SchemaNode,
) -> Result<usize, RoundTripError> {
    json_types::check_shape(value, schema)?;

    let encoded = json_types::encode(value, schema)?;
    let text = serde_json::to_string(&encoded)?;
    let decoded = json_types::decode_str(&text, schema)?;
    json_types::check_shape(&decoded, schema)?;

    // Custom nodes decode without their exact widths, so compare encodings
    if decoded != *value {
        let reencoded = serde_json::to_string(&json_types::encode(&decoded, schema)?)?;
        if reencoded != text {
            return Err(RoundTripError::Mismatch {
                index,
                before: text,
                after: reencoded,
            });
        }
    }
    Ok(text.len())
}

/// Generate `count` values and round-trip each of them.
pub fn run_roundtrip<R: Rng>(
    generator: &mut DataGenerator<R>,
    count: u64,
) -> Result<RoundTripReport, RoundTripError> {
    let schema = generator.schema().clone();
    let mut report = RoundTripReport::default();

    for index in 0..count {
        let value = generator.generate()?;
        let bytes = round_trip_at(index, &value, &schema)?;
        report.values += 1;
        report.bytes += bytes as u64;

        if report.values % 10000 == 0 {
            debug!("Round-tripped {} values", report.values);
        }
    }

    info!(
        "Round trip complete: {} values, {} bytes",
        report.values, report.bytes
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagen_core::{GenerationOptions, RealRange, ValueType};

    #[test]
    fn test_nested_schema_round_trips() {
        let schema = SchemaNode::class(
            "Bag",
            vec![
                SchemaNode::key_value(
                    SchemaNode::signed(ValueType::Int16),
                    SchemaNode::nullable(SchemaNode::string_raw()),
                )
                .with_max_size(5)
                .named("by_id"),
                SchemaNode::key_value(
                    SchemaNode::tuple(vec![
                        SchemaNode::boolean(),
                        SchemaNode::unsigned(ValueType::UInt64),
                    ]),
                    SchemaNode::real(ValueType::Float32),
                )
                .with_max_size(5)
                .named("by_pair"),
                SchemaNode::array(SchemaNode::real(ValueType::Float64))
                    .with_max_size(8)
                    .named("samples"),
            ],
        );

        let mut generator = DataGenerator::new(schema, 11);
        let report = run_roundtrip(&mut generator, 300).unwrap();
        assert_eq!(report.values, 300);
        assert!(report.bytes > 0);
    }

    #[test]
    fn test_full_range_floats_round_trip() {
        let schema = SchemaNode::array(SchemaNode::real(ValueType::Float64)).with_max_size(10);
        let options = GenerationOptions::default().with_real_range(RealRange::FullRange);
        let mut generator = DataGenerator::new(schema, 5).with_options(options);
        run_roundtrip(&mut generator, 200).unwrap();
    }

    #[test]
    fn test_shape_violation_is_reported() {
        let schema = SchemaNode::signed(ValueType::Int8);
        let err = roundtrip_value(&GeneratedValue::Int64(1), &schema).unwrap_err();
        assert!(matches!(err, RoundTripError::Shape(_)));
    }
}
