//! Uniform random sources for emission and lifespan jitter.
//!
//! The field owns exactly one [`RandomSource`] and lends it to the emitter, so
//! spawn positions, sizes, colors and lifespans all draw from a single stream.
//! Any `rand` generator is a random source; tests can script values with
//! [`SequenceSource`].

use rand::Rng;

/// A stateful source of uniform floats in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`. Advances the source.
    fn uniform(&mut self) -> f32;
}

impl<R: rand::RngCore> RandomSource for R {
    #[inline]
    fn uniform(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

/// Replays a fixed list of values, wrapping around at the end.
///
/// Values are clamped into `[0, 1)` so a scripted source can never push the
/// emitter outside its documented ranges.
///
/// ```
/// use particle_field::{RandomSource, SequenceSource};
///
/// let mut rng = SequenceSource::new(vec![0.25, 0.75]);
/// assert_eq!(rng.uniform(), 0.25);
/// assert_eq!(rng.uniform(), 0.75);
/// assert_eq!(rng.uniform(), 0.25);
/// ```
#[derive(Clone, Debug)]
pub struct SequenceSource {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceSource {
    /// Create a source cycling through `values`. An empty list yields zeros.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// A source that always returns the same value.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceSource {
    fn uniform(&mut self) -> f32 {
        if self.values.is_empty() {
            self.cursor += 1;
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f32::EPSILON)
    }
}
