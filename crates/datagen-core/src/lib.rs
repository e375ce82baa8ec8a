//! Core types for schema-datagen.
//!
//! This crate provides the declarative side of the generator:
//!
//! - [`ValueType`] - Target types a schema node can produce
//! - [`SchemaNode`] / [`NodeKind`] - Schema tree loaded from YAML or built in code
//! - [`GeneratedValue`] - Values produced by the generator
//! - [`TypedValue`] - Values with type information for codecs
//! - Construction capabilities - How compound nodes assemble their children
//! - [`DataContract`] - Typed bridge between Rust types and schemas
//!
//! # Architecture
//!
//! ```text
//! datagen-core (this crate)
//!    │
//!    ├─── datagen-engine  (binds schemas and draws values)
//!    │
//!    └─── json-types      (implements TryFrom<TypedValue> for JSON)
//! ```
//!
//! # Example
//!
//! ```rust
//! use datagen_core::{SchemaNode, ValueType};
//!
//! let schema = SchemaNode::class(
//!     "Order",
//!     vec![
//!         SchemaNode::signed(ValueType::Int64).named("id"),
//!         SchemaNode::array(SchemaNode::string()).named("tags"),
//!     ],
//! );
//! assert_eq!(schema.resolved_target(), ValueType::record("Order"));
//! ```

pub mod construct;
pub mod contract;
pub mod options;
pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use construct::{
    collect_lazy, ConstructError, ElementSource, EmptyAs, EntryConstructor, ListConstructor,
    MapConstructor, MemberConstructor, NullableConstructor, OptionConstructor, RecordConstructor,
    SequenceConstructor, SetConstructor, TupleConstructor,
};
pub use contract::DataContract;
pub use options::{GenerationOptions, RealRange};
pub use schema::{NodeKind, SchemaDocument, SchemaError, SchemaNode};
pub use types::ValueType;
pub use values::{GeneratedValue, TypedValue};
