//! Main data generator for producing values from a schema.

use crate::bind::{bind, BoundGenerator};
use crate::context::{GenerationContext, Sampling};
use crate::registry::{CustomGenerator, CustomRegistry};
use datagen_core::{
    ConstructError, DataContract, GeneratedValue, GenerationOptions, SchemaDocument, SchemaError,
    SchemaNode, ValueType,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::debug;

/// Error type for generator operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Schema error
    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),

    /// A constructor failed to assemble a value
    #[error("Construction failed at {path}: {source}")]
    Construct {
        path: String,
        #[source]
        source: ConstructError,
    },

    /// A custom strategy failed
    #[error("Custom strategy '{strategy}' failed at {path}: {source}")]
    Custom {
        strategy: String,
        path: String,
        #[source]
        source: ConstructError,
    },

    /// A generated value did not convert into the requested type
    #[error("Failed to convert generated value: {0}")]
    Conversion(#[source] ConstructError),
}

impl GeneratorError {
    /// Attach `path` to a constructor failure.
    ///
    /// Failures of elements produced while the constructor ran come back as
    /// `ConstructError::Element`; those are unwrapped to the original error
    /// so the innermost path is kept.
    pub fn from_construct(path: String, source: ConstructError) -> Self {
        match source {
            ConstructError::Element(inner) => match inner.downcast::<GeneratorError>() {
                Ok(original) => *original,
                Err(other) => Self::Construct {
                    path,
                    source: ConstructError::Element(other),
                },
            },
            source => Self::Construct { path, source },
        }
    }
}

/// Bound schema together with the distributions it is generated with.
#[derive(Debug)]
struct Plan {
    bound: BoundGenerator,
    sampling: Sampling,
}

/// Data generator that produces values of a schema's target type.
///
/// The schema is bound on first use and rebound after the options or the
/// custom registry change. A seeded generator produces the same sequence of
/// values for the same schema and options.
pub struct DataGenerator<R = StdRng> {
    /// Root schema node
    schema: SchemaNode,
    /// Distribution parameters
    options: GenerationOptions,
    /// Strategies for custom nodes
    registry: CustomRegistry,
    /// Random source shared by every generated value
    rng: R,
    /// Bound schema, built lazily
    plan: Option<Arc<Plan>>,
    /// Values generated so far
    generated: u64,
}

impl DataGenerator<StdRng> {
    /// Create a new data generator with the given schema and seed.
    pub fn new(schema: SchemaNode, seed: u64) -> Self {
        Self::from_rng(schema, StdRng::seed_from_u64(seed))
    }

    /// Create a data generator seeded from the operating system.
    pub fn unseeded(schema: SchemaNode) -> Self {
        Self::from_rng(schema, StdRng::from_os_rng())
    }

    /// Create a data generator from a schema document.
    ///
    /// `seed` takes precedence over the document's own seed; without either
    /// the generator is seeded from the operating system.
    pub fn from_document(document: SchemaDocument, seed: Option<u64>) -> Self {
        let generator = match seed.or(document.seed) {
            Some(seed) => Self::new(document.root, seed),
            None => Self::unseeded(document.root),
        };
        generator.with_options(document.options)
    }
}

impl<R: Rng> DataGenerator<R> {
    /// Create a data generator drawing from an injected random source.
    pub fn from_rng(schema: SchemaNode, rng: R) -> Self {
        Self {
            schema,
            options: GenerationOptions::default(),
            registry: CustomRegistry::new(),
            rng,
            plan: None,
            generated: 0,
        }
    }

    /// Replace the generation options.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self.plan = None;
        self
    }

    /// Register a strategy for custom nodes naming `name`.
    pub fn register_custom(
        &mut self,
        name: impl Into<String>,
        strategy: impl CustomGenerator + 'static,
    ) -> &mut Self {
        let name = name.into();
        if self.registry.contains(&name) {
            debug!(strategy = %name, "Replacing custom strategy");
        }
        self.registry.register(name, strategy);
        self.plan = None;
        self
    }

    /// Bind the schema now, reporting contract errors without generating.
    pub fn bind(&mut self) -> Result<(), SchemaError> {
        self.plan().map(|_| ())
    }

    fn plan(&mut self) -> Result<Arc<Plan>, SchemaError> {
        if let Some(plan) = &self.plan {
            return Ok(Arc::clone(plan));
        }
        let sampling = Sampling::new(self.options.clone())?;
        let bound = bind(&self.schema, &self.registry)?;
        let plan = Arc::new(Plan { bound, sampling });
        self.plan = Some(Arc::clone(&plan));
        Ok(plan)
    }

    /// Generate the next value.
    pub fn generate(&mut self) -> Result<GeneratedValue, GeneratorError> {
        let plan = self.plan()?;
        let mut ctx = GenerationContext::new(&mut self.rng, &plan.sampling);
        let value = plan.bound.generate(&mut ctx)?;
        self.generated += 1;
        Ok(value)
    }

    /// Generate the next value and convert it into `T`.
    ///
    /// The schema is expected to be `T::schema()` or one producing the same
    /// shape.
    pub fn generate_as<T: DataContract>(&mut self) -> Result<T, GeneratorError> {
        let value = self.generate()?;
        T::from_generated(value).map_err(GeneratorError::Conversion)
    }

    /// Generate `count` values lazily.
    pub fn values(&mut self, count: usize) -> GeneratedValueIterator<'_, R> {
        GeneratedValueIterator {
            generator: self,
            remaining: count,
        }
    }

    /// Get a reference to the schema.
    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// Target type of generated values.
    pub fn target(&self) -> ValueType {
        self.schema.resolved_target()
    }

    /// Get the generation options.
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Number of values generated so far.
    pub fn generated_count(&self) -> u64 {
        self.generated
    }
}

/// Iterator that lazily generates values.
pub struct GeneratedValueIterator<'a, R> {
    generator: &'a mut DataGenerator<R>,
    remaining: usize,
}

impl<R: Rng> Iterator for GeneratedValueIterator<'_, R> {
    type Item = Result<GeneratedValue, GeneratorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.generator.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<R: Rng> ExactSizeIterator for GeneratedValueIterator<'_, R> {}

/// Generate a `T` from its contract schema with an OS-seeded random source.
pub fn generate_data_for<T: DataContract>() -> Result<T, GeneratorError> {
    DataGenerator::unseeded(T::schema()).generate_as()
}

/// Generate a `T` from its contract schema with a seeded random source.
pub fn generate_data_for_seeded<T: DataContract>(seed: u64) -> Result<T, GeneratorError> {
    DataGenerator::new(T::schema(), seed).generate_as()
}
