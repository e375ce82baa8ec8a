//! Typed data contracts.
//!
//! A [`DataContract`] ties a Rust type to the schema that generates it and to
//! the conversion from the generated value back into the type. Scalars,
//! `String`, `Vec`, `Option`, the std maps and small tuples are covered here;
//! user records implement the trait by hand with [`expect_record`] and
//! [`take_field`].
//!
//! ```rust
//! use datagen_core::contract::{expect_record, take_field, DataContract};
//! use datagen_core::{ConstructError, GeneratedValue, SchemaNode};
//!
//! struct Point {
//!     x: f64,
//!     y: f64,
//! }
//!
//! impl DataContract for Point {
//!     fn schema() -> SchemaNode {
//!         SchemaNode::class(
//!             "Point",
//!             vec![f64::schema().named("x"), f64::schema().named("y")],
//!         )
//!     }
//!
//!     fn from_generated(value: GeneratedValue) -> Result<Self, ConstructError> {
//!         let mut fields = expect_record(value)?;
//!         Ok(Point {
//!             x: take_field(&mut fields, "x")?,
//!             y: take_field(&mut fields, "y")?,
//!         })
//!     }
//! }
//! ```

use crate::construct::ConstructError;
use crate::schema::SchemaNode;
use crate::types::ValueType;
use crate::values::GeneratedValue;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// A type that can be generated from a schema.
pub trait DataContract: Sized {
    /// Schema whose generated values convert into `Self`.
    fn schema() -> SchemaNode;

    /// Convert a value generated from [`DataContract::schema`].
    fn from_generated(value: GeneratedValue) -> Result<Self, ConstructError>;
}

/// Unwrap the members of a record value.
pub fn expect_record(value: GeneratedValue) -> Result<IndexMap<String, GeneratedValue>, ConstructError> {
    match value {
        GeneratedValue::Record(fields) => Ok(fields),
        other => Err(ConstructError::unexpected("record", &other)),
    }
}

/// Remove a member from `fields` and convert it.
pub fn take_field<T: DataContract>(
    fields: &mut IndexMap<String, GeneratedValue>,
    name: &str,
) -> Result<T, ConstructError> {
    let value = fields
        .shift_remove(name)
        .ok_or_else(|| ConstructError::MissingField(name.to_string()))?;
    T::from_generated(value)
}

macro_rules! scalar_contract {
    ($ty:ty, $node:ident, $target:ident, $expected:literal) => {
        impl DataContract for $ty {
            fn schema() -> SchemaNode {
                SchemaNode::$node(ValueType::$target)
            }

            fn from_generated(value: GeneratedValue) -> Result<Self, ConstructError> {
                match value {
                    GeneratedValue::$target(v) => Ok(v),
                    other => Err(ConstructError::unexpected($expected, &other)),
                }
            }
        }
    };
}

scalar_contract!(i8, signed, Int8, "i8");
scalar_contract!(i16, signed, Int16, "i16");
scalar_contract!(i32, signed, Int32, "i32");
scalar_contract!(i64, signed, Int64, "i64");
scalar_contract!(u8, unsigned, UInt8, "u8");
scalar_contract!(u16, unsigned, UInt16, "u16");
scalar_contract!(u32, unsigned, UInt32, "u32");
scalar_contract!(u64, unsigned, UInt64, "u64");
scalar_contract!(f32, real, Float32, "f32");
scalar_contract!(f64, real, Float64, "f64");

impl DataContract for bool {
    fn schema() -> SchemaNode {
        SchemaNode::boolean()
    }

    fn from_generated(value: GeneratedValue) -> Result<Self, ConstructError> {
        match value {
            GeneratedValue::Bool(b) => Ok(b),
            other => Err(ConstructError::unexpected("bool", &other)),
        }
    }
}

impl DataContract for String {
    fn schema() -> SchemaNode {
        SchemaNode::string()
    }

    fn from_generated(value: GeneratedValue) -> Result<Self, ConstructError> {
        match value {
            GeneratedValue::String(s) => Ok(s),
            other => Err(ConstructError::unexpected("string", &other)),
        }
    }
}

impl<T: DataContract> DataContract for Vec<T> {
    fn schema() -> SchemaNode {
        SchemaNode::array(T::schema())
    }

    fn from_generated(value: GeneratedValue) -> Result<Self, ConstructError> {
        match value {
            GeneratedValue::Array(items) => items.into_iter().map(T::from_generated).collect(),
            other => Err(ConstructError::unexpected("array", &other)),
        }
    }
}

/// `Option<Option<T>>` has no schema: nested nullables fail to bind.
impl<T: DataContract> DataContract for Option<T> {
    fn schema() -> SchemaNode {
        SchemaNode::nullable(T::schema())
    }

    fn from_generated(value: GeneratedValue) -> Result<Self, ConstructError> {
        match value {
            GeneratedValue::Null => Ok(None),
            present => T::from_generated(present).map(Some),
        }
    }
}

fn expect_entries(
    value: GeneratedValue,
) -> Result<Vec<(GeneratedValue, GeneratedValue)>, ConstructError> {
    match value {
        GeneratedValue::Map(entries) => Ok(entries),
        other => Err(ConstructError::unexpected("map", &other)),
    }
}

impl<K, V> DataContract for HashMap<K, V>
where
    K: DataContract + Eq + Hash,
    V: DataContract,
{
    fn schema() -> SchemaNode {
        SchemaNode::key_value(K::schema(), V::schema())
    }

    fn from_generated(value: GeneratedValue) -> Result<Self, ConstructError> {
        expect_entries(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_generated(k)?, V::from_generated(v)?)))
            .collect()
    }
}

impl<K, V> DataContract for BTreeMap<K, V>
where
    K: DataContract + Ord,
    V: DataContract,
{
    fn schema() -> SchemaNode {
        SchemaNode::key_value(K::schema(), V::schema())
    }

    fn from_generated(value: GeneratedValue) -> Result<Self, ConstructError> {
        expect_entries(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_generated(k)?, V::from_generated(v)?)))
            .collect()
    }
}

fn expect_tuple(value: GeneratedValue, arity: usize) -> Result<Vec<GeneratedValue>, ConstructError> {
    match value {
        GeneratedValue::Tuple(members) if members.len() == arity => Ok(members),
        GeneratedValue::Tuple(members) => Err(ConstructError::Arity {
            constructor: "tuple".to_string(),
            expected: arity,
            found: members.len(),
        }),
        other => Err(ConstructError::unexpected("tuple", &other)),
    }
}

fn next_member(
    members: &mut std::vec::IntoIter<GeneratedValue>,
    index: usize,
) -> Result<GeneratedValue, ConstructError> {
    members
        .next()
        .ok_or_else(|| ConstructError::MissingField(index.to_string()))
}

macro_rules! tuple_contract {
    ($arity:literal; $($member:ident => $index:literal),+) => {
        impl<$($member: DataContract),+> DataContract for ($($member,)+) {
            fn schema() -> SchemaNode {
                SchemaNode::tuple(vec![$($member::schema()),+])
            }

            fn from_generated(value: GeneratedValue) -> Result<Self, ConstructError> {
                let mut members = expect_tuple(value, $arity)?.into_iter();
                Ok(($($member::from_generated(next_member(&mut members, $index)?)?,)+))
            }
        }
    };
}

tuple_contract!(2; A => 0, B => 1);
tuple_contract!(3; A => 0, B => 1, C => 2);
tuple_contract!(4; A => 0, B => 1, C => 2, D => 3);
