//! Bounded random sampling over finite populations
//!
//! All draws go through one [`StdRng`] so that a run started with a fixed seed
//! replays the same selections.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Random selection helper owned by a single scenario
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: StdRng,
    seed: u64,
}

impl RandomSelector {
    /// Create a selector whose draws are reproducible for `seed`
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a selector from a fresh random seed
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    /// Seeded when `seed` is given, otherwise from entropy
    pub fn new(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_else(Self::from_entropy)
    }

    /// Seed this selector was created with, for replaying a run
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw `size` distinct elements without replacement.
    ///
    /// When `size` covers the whole population a copy of the full population
    /// is returned in its original order.
    pub fn sample<T: Clone>(&mut self, population: &[T], size: usize) -> Vec<T> {
        if size >= population.len() {
            warn!(
                "Requested {} element(s) from a population of {}; returning all",
                size,
                population.len()
            );
            return population.to_vec();
        }

        let mut pool = population.to_vec();
        let mut picked = Vec::with_capacity(size);
        for _ in 0..size {
            let idx = self.rng.gen_range(0..pool.len());
            picked.push(pool.swap_remove(idx));
        }
        debug!("Sampled {} of {} element(s)", picked.len(), population.len());
        picked
    }

    /// Draw a random count in `[min, max]` (max clamped to the population size)
    /// and sample that many elements.
    pub fn sample_in_range<T: Clone>(
        &mut self,
        population: &[T],
        min: usize,
        max: usize,
    ) -> Result<Vec<T>> {
        if min > max {
            return Err(Error::InvalidRange {
                min: min as i64,
                max: max as i64,
            });
        }
        let effective_max = max.min(population.len());
        let effective_min = min.min(effective_max);
        let count = self.rng.gen_range(effective_min..=effective_max);
        Ok(self.sample(population, count))
    }

    /// Pick exactly one element
    pub fn single<T: Clone>(&mut self, population: &[T]) -> Result<T> {
        self.sample(population, 1)
            .into_iter()
            .next()
            .ok_or(Error::EmptyPopulation)
    }

    /// Uniform integer in `[min, max]`, both ends inclusive
    pub fn random_int_in_range(&mut self, min: i64, max: i64) -> Result<i64> {
        if min > max {
            return Err(Error::InvalidRange { min, max });
        }
        Ok(self.rng.gen_range(min..=max))
    }

    /// Uniform random permutation in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
