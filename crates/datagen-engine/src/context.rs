//! Per-call generation state.
//!
//! A [`GenerationContext`] is created for every top-level generation and
//! threaded by `&mut` through the recursive descent. It owns the random
//! source and the diagnostic path and borrows the prepared distributions.

use crate::generators::string::ALPHABET;
use datagen_core::{GenerationOptions, SchemaError};
use rand::distr::Uniform;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

/// Distributions prepared once from [`GenerationOptions`].
#[derive(Debug, Clone)]
pub struct Sampling {
    options: GenerationOptions,
    /// Index into the string alphabet; `ALPHABET.len()` is the terminator
    pub(crate) string_char: Uniform<usize>,
    /// Nullable outcome; zero selects the empty variant
    pub(crate) null_choice: Uniform<u32>,
}

impl Sampling {
    /// Validate `options` and build the distributions.
    pub fn new(options: GenerationOptions) -> Result<Self, SchemaError> {
        options.validate()?;
        let string_char = Uniform::new_inclusive(0, ALPHABET.len())
            .map_err(|e| SchemaError::InvalidOption(format!("string alphabet: {e}")))?;
        let null_choice = Uniform::new(0, options.null_outcomes)
            .map_err(|e| SchemaError::InvalidOption(format!("null_outcomes: {e}")))?;
        Ok(Self {
            options,
            string_char,
            null_choice,
        })
    }

    /// Options the distributions were built from.
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }
}

/// One step of the diagnostic path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named class member
    Field(Arc<str>),
    /// Array element, tuple member or unnamed class member
    Index(usize),
    /// Key of the map entry at a position
    Key(usize),
    /// Value of the map entry at a position
    Value(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{name}"),
            Self::Index(i) => write!(f, "[{i}]"),
            Self::Key(i) => write!(f, "[{i}].key"),
            Self::Value(i) => write!(f, "[{i}].value"),
        }
    }
}

/// Location of the node currently being generated, rendered as `$.a[3].b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticPath {
    segments: Vec<PathSegment>,
}

impl DiagnosticPath {
    /// Segments from the root down.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Nesting depth.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for DiagnosticPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Mutable state for one top-level generation.
pub struct GenerationContext<'s, R> {
    pub(crate) rng: R,
    sampling: &'s Sampling,
    path: DiagnosticPath,
}

impl<'s, R: Rng> GenerationContext<'s, R> {
    /// Create a context drawing from `rng`.
    pub fn new(rng: R, sampling: &'s Sampling) -> Self {
        Self {
            rng,
            sampling,
            path: DiagnosticPath::default(),
        }
    }

    /// Prepared distributions.
    pub fn sampling(&self) -> &'s Sampling {
        self.sampling
    }

    /// Generation options in effect.
    pub fn options(&self) -> &'s GenerationOptions {
        &self.sampling.options
    }

    /// The random source.
    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Current diagnostic path.
    pub fn path(&self) -> &DiagnosticPath {
        &self.path
    }

    /// Run `f` with `segment` pushed onto the diagnostic path.
    ///
    /// The path is left untouched when path tracking is disabled.
    pub fn within<T>(&mut self, segment: PathSegment, f: impl FnOnce(&mut Self) -> T) -> T {
        if !self.sampling.options.track_paths {
            return f(self);
        }
        self.path.segments.push(segment);
        let out = f(self);
        self.path.segments.pop();
        out
    }

    /// Give back the random source.
    pub fn into_rng(self) -> R {
        self.rng
    }
}

impl<R> fmt::Debug for GenerationContext<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationContext")
            .field("path", &self.path.to_string())
            .field("options", &self.sampling.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sampling() -> Sampling {
        Sampling::new(GenerationOptions::default()).unwrap()
    }

    #[test]
    fn test_path_display() {
        let sampling = sampling();
        let mut ctx = GenerationContext::new(StdRng::seed_from_u64(1), &sampling);
        assert_eq!(ctx.path().to_string(), "$");

        let rendered = ctx.within(PathSegment::Field(Arc::from("detail")), |ctx| {
            ctx.within(PathSegment::Index(3), |ctx| {
                ctx.within(PathSegment::Key(1), |ctx| ctx.path().to_string())
            })
        });
        assert_eq!(rendered, "$.detail[3][1].key");
        assert_eq!(ctx.path().depth(), 0);
    }

    #[test]
    fn test_path_tracking_disabled() {
        let options = GenerationOptions {
            track_paths: false,
            ..Default::default()
        };
        let sampling = Sampling::new(options).unwrap();
        let mut ctx = GenerationContext::new(StdRng::seed_from_u64(1), &sampling);

        let depth = ctx.within(PathSegment::Index(0), |ctx| ctx.path().depth());
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_sampling_rejects_zero_null_outcomes() {
        let options = GenerationOptions {
            null_outcomes: 0,
            ..Default::default()
        };
        assert!(matches!(
            Sampling::new(options),
            Err(SchemaError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_single_null_outcome_is_valid() {
        let options = GenerationOptions {
            null_outcomes: 1,
            ..Default::default()
        };
        assert!(Sampling::new(options).is_ok());
    }
}
