//! Lazy bounded sequence used to populate collections.
//!
//! A [`LazySequence`] produces the elements of an array or map on demand.
//! The element at a position is generated on first access and cached until
//! the sequence moves, so a constructor may look at the same position any
//! number of times without consuming extra randomness.
//!
//! Constructors see the sequence through [`ElementSource`].

use crate::bind::BoundGenerator;
use crate::context::{GenerationContext, PathSegment};
use crate::generator::GeneratorError;
use datagen_core::{ConstructError, ElementSource, GeneratedValue};
use rand::Rng;

/// Produces the element at a given position of a sequence.
pub trait ElementProducer<R> {
    /// Element type.
    type Item;

    /// Generate the element at `position`.
    fn produce(
        &self,
        ctx: &mut GenerationContext<'_, R>,
        position: usize,
    ) -> Result<Self::Item, GeneratorError>;
}

/// Elements of an array node.
#[derive(Debug, Clone, Copy)]
pub struct Elements<'g>(pub &'g BoundGenerator);

impl<R: Rng> ElementProducer<R> for Elements<'_> {
    type Item = GeneratedValue;

    fn produce(
        &self,
        ctx: &mut GenerationContext<'_, R>,
        position: usize,
    ) -> Result<GeneratedValue, GeneratorError> {
        ctx.within(PathSegment::Index(position), |ctx| self.0.generate(ctx))
    }
}

/// Entries of a key/value node; the key is generated before the value.
#[derive(Debug, Clone, Copy)]
pub struct Entries<'g> {
    pub key: &'g BoundGenerator,
    pub value: &'g BoundGenerator,
}

impl<R: Rng> ElementProducer<R> for Entries<'_> {
    type Item = (GeneratedValue, GeneratedValue);

    fn produce(
        &self,
        ctx: &mut GenerationContext<'_, R>,
        position: usize,
    ) -> Result<Self::Item, GeneratorError> {
        let key = ctx.within(PathSegment::Key(position), |ctx| self.key.generate(ctx))?;
        let value = ctx.within(PathSegment::Value(position), |ctx| self.value.generate(ctx))?;
        Ok((key, value))
    }
}

/// Position marker of a sequence. Cursors compare by position only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceCursor(usize);

impl SequenceCursor {
    /// Position this cursor marks.
    pub fn position(self) -> usize {
        self.0
    }
}

/// On-demand stream of `end` elements drawn from a producer.
pub struct LazySequence<'c, 's, R, P: ElementProducer<R>> {
    ctx: &'c mut GenerationContext<'s, R>,
    producer: P,
    position: usize,
    end: usize,
    cached: Option<P::Item>,
}

impl<'c, 's, R: Rng, P: ElementProducer<R>> LazySequence<'c, 's, R, P> {
    /// Open a sequence of `count` elements.
    pub fn new(ctx: &'c mut GenerationContext<'s, R>, producer: P, count: usize) -> Self {
        Self {
            ctx,
            producer,
            position: 0,
            end: count,
            cached: None,
        }
    }

    /// Current position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Cursor at the current position.
    pub fn cursor(&self) -> SequenceCursor {
        SequenceCursor(self.position)
    }

    /// Cursor one past the last element.
    pub fn end_cursor(&self) -> SequenceCursor {
        SequenceCursor(self.end)
    }

    /// Elements between the current position and the end. Negative once the
    /// sequence has been advanced past its end.
    pub fn distance(&self) -> isize {
        self.end as isize - self.position as isize
    }

    /// Move to the next position, dropping the cached element.
    pub fn advance(&mut self) {
        self.position += 1;
        self.cached = None;
    }

    /// Move to the previous position, dropping the cached element. Stays at
    /// the start when already there.
    pub fn retreat(&mut self) {
        self.position = self.position.saturating_sub(1);
        self.cached = None;
    }

    /// Element at the current position, generated on first access.
    /// Returns `None` at or past the end.
    pub fn current(&mut self) -> Result<Option<&P::Item>, GeneratorError> {
        if self.position >= self.end {
            return Ok(None);
        }
        let item = match self.cached.take() {
            Some(item) => item,
            None => self.producer.produce(self.ctx, self.position)?,
        };
        Ok(Some(&*self.cached.insert(item)))
    }
}

fn element_error(err: GeneratorError) -> ConstructError {
    ConstructError::Element(Box::new(err))
}

impl<R: Rng, P: ElementProducer<R>> ElementSource<P::Item> for LazySequence<'_, '_, R, P> {
    fn produce_next(&mut self) -> Result<Option<P::Item>, ConstructError> {
        if self.position >= self.end {
            return Ok(None);
        }
        let item = match self.cached.take() {
            Some(item) => item,
            None => self
                .producer
                .produce(self.ctx, self.position)
                .map_err(element_error)?,
        };
        self.advance();
        Ok(Some(item))
    }

    fn peek(&mut self) -> Result<Option<&P::Item>, ConstructError> {
        self.current().map_err(element_error)
    }

    fn remaining(&self) -> usize {
        self.end.saturating_sub(self.position)
    }
}
