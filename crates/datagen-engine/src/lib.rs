//! Randomized value generation for schema-datagen.
//!
//! This crate provides the `DataGenerator` which walks a schema tree and
//! produces a randomly populated value of the schema's target type. The
//! generator can be seeded so that the same schema and seed always yield the
//! same values.
//!
//! # Architecture
//!
//! ```text
//! SchemaNode (YAML or code)
//!        │
//!        ▼  bind (contract check, custom strategy lookup)
//! ┌──────────────────┐
//! │  BoundGenerator  │
//! └────────┬─────────┘
//!          │  generate(&mut GenerationContext)
//!          ▼
//!    GeneratedValue
//! ```
//!
//! Collections are filled through a [`LazySequence`] so the node's
//! constructor decides how many elements are actually produced.
//!
//! # Example
//!
//! ```rust
//! use datagen_engine::DataGenerator;
//! use datagen_core::SchemaDocument;
//!
//! let document = SchemaDocument::from_yaml(r#"
//! version: 1
//! seed: 42
//! root:
//!   kind: class
//!   target: { type: record, name: User }
//!   members:
//!     - name: id
//!       kind: unsigned_int
//!       target: u32
//!     - name: email
//!       kind: string_escaped
//! "#).unwrap();
//!
//! let mut generator = DataGenerator::from_document(document, None);
//! let user = generator.generate().unwrap();
//! assert!(user.get_field("id").is_some());
//! ```
//!
//! # Node kinds
//!
//! - `signed_int` / `unsigned_int` - Uniform over the target's full range
//! - `real` - Uniform magnitude with a random sign
//! - `bool` - Fair coin
//! - `string_raw` / `string_escaped` - Printable ASCII, geometric length
//! - `nullable` - Empty one time in `null_outcomes`
//! - `array` / `key_value` - Up to `max_size` elements
//! - `class` / `tuple` - One value per member
//! - `custom` - Registered strategy

pub mod bind;
pub mod context;
pub mod generator;
pub mod generators;
pub mod registry;
pub mod sequence;

// Re-exports for convenience
pub use bind::{bind, BoundGenerator};
pub use context::{DiagnosticPath, GenerationContext, PathSegment, Sampling};
pub use generator::{
    generate_data_for, generate_data_for_seeded, DataGenerator, GeneratedValueIterator,
    GeneratorError,
};
pub use registry::{CustomGenerator, CustomRegistry};
pub use sequence::{ElementProducer, Elements, Entries, LazySequence, SequenceCursor};
