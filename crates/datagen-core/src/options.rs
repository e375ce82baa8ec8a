//! Distribution parameters for value generation.

use crate::schema::SchemaError;
use serde::{Deserialize, Serialize};

/// Default upper bound on generated collection sizes.
pub const DEFAULT_MAX_COLLECTION_SIZE: usize = 100;

/// Default number of outcomes drawn by the nullable generator; one of them
/// yields the empty variant.
pub const DEFAULT_NULL_OUTCOMES: u32 = 6;

/// Magnitude range used for floating point generation. The sign is always an
/// independent fair coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealRange {
    /// Magnitude uniform over `[0, 1]`
    #[default]
    UnitMagnitude,
    /// Magnitude uniform over `[0, MAX)` of the target float type
    FullRange,
}

/// Generation options owned by the generation context.
///
/// ```yaml
/// options:
///   max_collection_size: 20
///   null_outcomes: 6
///   real_range: unit_magnitude
///   track_paths: true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Collection size bound for array and map nodes without their own `max_size`
    pub max_collection_size: usize,

    /// Number of equally likely outcomes drawn per nullable node
    pub null_outcomes: u32,

    /// Float magnitude policy
    pub real_range: RealRange,

    /// Maintain the diagnostic path while generating
    pub track_paths: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_collection_size: DEFAULT_MAX_COLLECTION_SIZE,
            null_outcomes: DEFAULT_NULL_OUTCOMES,
            real_range: RealRange::default(),
            track_paths: true,
        }
    }
}

impl GenerationOptions {
    /// Set the default collection size bound.
    pub fn with_max_collection_size(mut self, max: usize) -> Self {
        self.max_collection_size = max;
        self
    }

    /// Set the float magnitude policy.
    pub fn with_real_range(mut self, range: RealRange) -> Self {
        self.real_range = range;
        self
    }

    /// Reject parameters no distribution can be built from.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.null_outcomes == 0 {
            return Err(SchemaError::InvalidOption(
                "null_outcomes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
