//! Construction capabilities.
//!
//! A construction capability assembles generated child values into the parent
//! value of a compound schema node. Collections receive their elements through
//! the pull-based [`ElementSource`] so a constructor decides how many elements
//! it materializes and when.

use crate::values::GeneratedValue;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Error raised while assembling a value.
#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    /// Constructor received the wrong number of values
    #[error("constructor '{constructor}' expected {expected} values, got {found}")]
    Arity {
        constructor: String,
        expected: usize,
        found: usize,
    },

    /// Constructor refused its input
    #[error("constructor '{constructor}' rejected input: {reason}")]
    Rejected { constructor: String, reason: String },

    /// A value had a different variant than required
    #[error("expected {expected} value, got {found}")]
    UnexpectedValue {
        expected: &'static str,
        found: &'static str,
    },

    /// A record lacked a member
    #[error("missing record field '{0}'")]
    MissingField(String),

    /// Producing an element of a collection failed
    #[error("element generation failed: {0}")]
    Element(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ConstructError {
    /// Build an `UnexpectedValue` error for `found`.
    pub fn unexpected(expected: &'static str, found: &GeneratedValue) -> Self {
        Self::UnexpectedValue {
            expected,
            found: found.type_name(),
        }
    }
}

/// Pull-based stream of lazily produced collection elements.
///
/// `peek` followed by `produce_next` yields the same element: an element is
/// produced at most once per position.
pub trait ElementSource<T> {
    /// Produce the element at the current position and move past it.
    /// Returns `None` once the source is exhausted.
    fn produce_next(&mut self) -> Result<Option<T>, ConstructError>;

    /// Produce (if needed) and borrow the element at the current position
    /// without consuming it.
    fn peek(&mut self) -> Result<Option<&T>, ConstructError>;

    /// Number of elements not yet consumed.
    fn remaining(&self) -> usize;
}

/// Collect up to `limit` elements from `source`.
pub fn collect_lazy<T>(
    source: &mut dyn ElementSource<T>,
    limit: usize,
) -> Result<Vec<T>, ConstructError> {
    let mut items = Vec::with_capacity(source.remaining().min(limit));
    while items.len() < limit {
        match source.produce_next()? {
            Some(item) => items.push(item),
            None => break,
        }
    }
    Ok(items)
}

/// Builds an array-like value from a stream of elements.
pub trait SequenceConstructor: fmt::Debug + Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Assemble the collection.
    fn construct(
        &self,
        items: &mut dyn ElementSource<GeneratedValue>,
    ) -> Result<GeneratedValue, ConstructError>;
}

/// Builds a map-like value from a stream of key/value entries.
pub trait EntryConstructor: fmt::Debug + Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Assemble the collection.
    fn construct(
        &self,
        entries: &mut dyn ElementSource<(GeneratedValue, GeneratedValue)>,
    ) -> Result<GeneratedValue, ConstructError>;
}

/// Builds a record or tuple from member values given in declared order.
pub trait MemberConstructor: fmt::Debug + Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Assemble the parent. `names[i]` is the identifier of member `i`, if any.
    fn construct(
        &self,
        names: &[Option<String>],
        values: Vec<GeneratedValue>,
    ) -> Result<GeneratedValue, ConstructError>;
}

/// Builds the present and absent forms of a nullable value.
pub trait NullableConstructor: fmt::Debug + Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Wrap a generated present value.
    fn wrap(&self, value: GeneratedValue) -> Result<GeneratedValue, ConstructError>;

    /// Empty-construction capability. `None` means the constructor has none
    /// and the generator falls back to `GeneratedValue::Null`.
    fn empty(&self) -> Option<Result<GeneratedValue, ConstructError>> {
        None
    }
}

/// Collects every element into `GeneratedValue::Array`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListConstructor;

impl SequenceConstructor for ListConstructor {
    fn name(&self) -> &str {
        "list"
    }

    fn construct(
        &self,
        items: &mut dyn ElementSource<GeneratedValue>,
    ) -> Result<GeneratedValue, ConstructError> {
        let limit = items.remaining();
        collect_lazy(items, limit).map(GeneratedValue::Array)
    }
}

/// Collects elements into an array, dropping repeats of an earlier element.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetConstructor;

impl SequenceConstructor for SetConstructor {
    fn name(&self) -> &str {
        "set"
    }

    fn construct(
        &self,
        items: &mut dyn ElementSource<GeneratedValue>,
    ) -> Result<GeneratedValue, ConstructError> {
        let mut unique: Vec<GeneratedValue> = Vec::with_capacity(items.remaining());
        while let Some(item) = items.produce_next()? {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Ok(GeneratedValue::Array(unique))
    }
}

/// Collects entries into `GeneratedValue::Map`; the first entry for a key wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapConstructor;

impl EntryConstructor for MapConstructor {
    fn name(&self) -> &str {
        "map"
    }

    fn construct(
        &self,
        entries: &mut dyn ElementSource<(GeneratedValue, GeneratedValue)>,
    ) -> Result<GeneratedValue, ConstructError> {
        let mut map: Vec<(GeneratedValue, GeneratedValue)> = Vec::with_capacity(entries.remaining());
        while let Some((key, value)) = entries.produce_next()? {
            if !map.iter().any(|(existing, _)| *existing == key) {
                map.push((key, value));
            }
        }
        Ok(GeneratedValue::Map(map))
    }
}

/// Builds `GeneratedValue::Record`; unnamed members are keyed by their index.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordConstructor;

impl MemberConstructor for RecordConstructor {
    fn name(&self) -> &str {
        "record"
    }

    fn construct(
        &self,
        names: &[Option<String>],
        values: Vec<GeneratedValue>,
    ) -> Result<GeneratedValue, ConstructError> {
        if names.len() != values.len() {
            return Err(ConstructError::Arity {
                constructor: self.name().to_string(),
                expected: names.len(),
                found: values.len(),
            });
        }
        let fields: IndexMap<String, GeneratedValue> = names
            .iter()
            .enumerate()
            .map(|(index, name)| name.clone().unwrap_or_else(|| index.to_string()))
            .zip(values)
            .collect();
        Ok(GeneratedValue::Record(fields))
    }
}

/// Builds `GeneratedValue::Tuple`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TupleConstructor;

impl MemberConstructor for TupleConstructor {
    fn name(&self) -> &str {
        "tuple"
    }

    fn construct(
        &self,
        names: &[Option<String>],
        values: Vec<GeneratedValue>,
    ) -> Result<GeneratedValue, ConstructError> {
        if names.len() != values.len() {
            return Err(ConstructError::Arity {
                constructor: self.name().to_string(),
                expected: names.len(),
                found: values.len(),
            });
        }
        Ok(GeneratedValue::Tuple(values))
    }
}

/// Passes the present value through; has no empty-construction capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionConstructor;

impl NullableConstructor for OptionConstructor {
    fn name(&self) -> &str {
        "option"
    }

    fn wrap(&self, value: GeneratedValue) -> Result<GeneratedValue, ConstructError> {
        Ok(value)
    }
}

/// Passes the present value through and constructs the absent form as a
/// fixed sentinel value.
#[derive(Debug, Clone)]
pub struct EmptyAs(pub GeneratedValue);

impl NullableConstructor for EmptyAs {
    fn name(&self) -> &str {
        "empty_as"
    }

    fn wrap(&self, value: GeneratedValue) -> Result<GeneratedValue, ConstructError> {
        Ok(value)
    }

    fn empty(&self) -> Option<Result<GeneratedValue, ConstructError>> {
        Some(Ok(self.0.clone()))
    }
}

pub(crate) fn default_sequence() -> Arc<dyn SequenceConstructor> {
    Arc::new(ListConstructor)
}

pub(crate) fn default_entries() -> Arc<dyn EntryConstructor> {
    Arc::new(MapConstructor)
}

pub(crate) fn default_record() -> Arc<dyn MemberConstructor> {
    Arc::new(RecordConstructor)
}

pub(crate) fn default_tuple() -> Arc<dyn MemberConstructor> {
    Arc::new(TupleConstructor)
}

pub(crate) fn default_nullable() -> Arc<dyn NullableConstructor> {
    Arc::new(OptionConstructor)
}
