//! JSON conversions for schema-datagen values.
//!
//! This crate converts between datagen-core's `GeneratedValue` and JSON. The
//! conversions are directed by a `SchemaNode` (or a `ValueType`) so that
//! decoding restores exact integer widths and map key types.
//!
//! # Modules
//!
//! - [`forward`] - GeneratedValue → JSON value conversion
//! - [`reverse`] - JSON value → GeneratedValue conversion
//! - [`shape`] - Structural check of a value against its schema
//!
//! # Example
//!
//! ```rust
//! use datagen_core::{GeneratedValue, SchemaNode, ValueType};
//! use json_types::{check_shape, decode, encode};
//!
//! let schema = SchemaNode::array(SchemaNode::signed(ValueType::Int8));
//! let value = GeneratedValue::Array(vec![GeneratedValue::Int8(-3)]);
//!
//! let json = encode(&value, &schema).unwrap();
//! assert_eq!(json, serde_json::json!([-3]));
//!
//! let back = decode(&json, &schema).unwrap();
//! assert_eq!(back, value);
//! check_shape(&back, &schema).unwrap();
//! ```

pub mod forward;
pub mod reverse;
pub mod shape;

pub use forward::{encode, encode_typed, encode_untyped, EncodeError, JsonValue};
pub use reverse::{
    decode, decode_str, decode_typed, decode_untyped, DecodeError, JsonValueWithSchema,
};
pub use shape::{check_shape, check_typed, ShapeError};
