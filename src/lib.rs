//! schema-datagen library
//!
//! Generates randomly populated values from a declarative schema and checks
//! that they survive a JSON round trip.
//!
//! # Crates
//!
//! - `datagen_core` - Schema nodes, target types and construction contracts
//! - `datagen_engine` - The value generator
//! - `json_types` - Schema-directed JSON encoding, decoding and shape checks
//!
//! # CLI Usage
//!
//! ```bash
//! # Write 1000 values as JSON Lines
//! schema-datagen generate --schema tests/fixtures/record.yaml --count 1000 --output out.jsonl
//!
//! # Bind a schema and report contract errors
//! schema-datagen validate --schema tests/fixtures/geojson.yaml
//!
//! # Generate, encode, parse, decode and compare
//! schema-datagen roundtrip --schema tests/fixtures/citm.yaml --seed 7 --count 200
//! ```

pub mod jsonl;
pub mod roundtrip;

pub use jsonl::{JsonlError, JsonlPopulator, PopulateMetrics};
pub use roundtrip::{roundtrip_value, run_roundtrip, RoundTripError, RoundTripReport};
