// single source of randomness for everything the generators produce

use rand::distr::Distribution;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::DISTRIBUTION_TOLERANCE;
use crate::error::{GenError, GenResult};

/// Seedable uniform source threaded through every generator by `&mut`.
///
/// The stream is ChaCha8 keyed with `seed_from_u64`, floats come from rand's
/// standard `f32` conversion (24 random mantissa bits, `[0, 1)`). A seed gives
/// the same geometry on every platform for this crate, it will not reproduce
/// the stream of a different generator algorithm.
#[derive(Clone, Debug)]
pub struct RandomStream {
    rng: ChaCha8Rng,
    seed: u64,
    draws: u64,
}

impl RandomStream {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// Resets to the state `from_seed(seed)` would produce.
    /// Only meant for top-level entry points, never inside a recursive walk.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::from_seed(seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws consumed since the last (re)seed.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn uniform(&mut self) -> f32 {
        self.draws += 1;
        self.rng.random::<f32>()
    }

    pub fn uniform_vec(&mut self, n: usize) -> Vec<f32> {
        (0..n).map(|_| self.uniform()).collect()
    }

    // fair coin, true = positive
    pub fn coin_flip(&mut self) -> bool {
        self.uniform() >= 0.5
    }

    /// Uniform index into a list of `len` items. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        let idx = (self.uniform() * len as f32) as usize;
        idx.min(len.saturating_sub(1))
    }

    /// Picks one item of a weighted list with a single draw.
    ///
    /// Weights are probabilities: non-negative, finite and summing to 1
    /// within `DISTRIBUTION_TOLERANCE`.
    pub fn choice<'a, T>(&mut self, items: &'a [(T, f32)]) -> GenResult<&'a T> {
        if items.is_empty() {
            return Err(GenError::InvalidDistribution("empty choice list".to_string()));
        }

        let mut total = 0.0;
        for (i, (_, weight)) in items.iter().enumerate() {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(GenError::InvalidDistribution(format!(
                    "weight {} at index {} is not a probability",
                    weight, i
                )));
            }
            total += weight;
        }

        if (total - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(GenError::InvalidDistribution(format!(
                "weights sum to {}, expected 1",
                total
            )));
        }

        // first bucket whose cumulative weight exceeds the draw
        let u = self.uniform() * total;
        let mut cumulative = 0.0;
        for (item, weight) in items {
            cumulative += weight;
            if u < cumulative {
                return Ok(item);
            }
        }

        // rounding left the draw past the last bucket
        Ok(&items[items.len() - 1].0)
    }

    /// Samples any `rand` distribution from this stream, counted as one draw.
    pub fn sample<T, D: Distribution<T>>(&mut self, distribution: &D) -> T {
        self.draws += 1;
        distribution.sample(&mut self.rng)
    }

    /// Derives an independent stream keyed from one draw of this one.
    /// Work handed to a substream can run anywhere without disturbing the parent.
    pub fn substream(&mut self) -> RandomStream {
        self.draws += 1;
        let seed = self.rng.next_u64();
        RandomStream::from_seed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_distr::Uniform;

    #[test]
    fn same_seed_same_values() {
        let mut a = RandomStream::from_seed(7);
        let mut b = RandomStream::from_seed(7);
        assert_eq!(a.uniform_vec(32), b.uniform_vec(32));
    }

    #[test]
    fn reseed_restarts_the_stream() {
        let mut rng = RandomStream::from_seed(3);
        let first = rng.uniform_vec(4);
        rng.reseed(3);
        assert_eq!(rng.draws(), 0);
        assert_eq!(rng.uniform_vec(4), first);
    }

    #[test]
    fn uniform_stays_in_unit_interval() {
        let mut rng = RandomStream::from_seed(99);
        for _ in 0..10_000 {
            let u = rng.uniform();
            assert!((0.0..1.0).contains(&u));
        }
        assert_eq!(rng.draws(), 10_000);
    }

    #[test]
    fn choice_rejects_bad_weights() {
        let mut rng = RandomStream::from_seed(1);
        let empty: [(u8, f32); 0] = [];
        assert!(matches!(rng.choice(&empty), Err(GenError::InvalidDistribution(_))));
        assert!(matches!(rng.choice(&[(1, 0.5), (2, 0.4)]), Err(GenError::InvalidDistribution(_))));
        assert!(matches!(rng.choice(&[(1, 1.5), (2, -0.5)]), Err(GenError::InvalidDistribution(_))));
        assert!(matches!(rng.choice(&[(1, f32::NAN), (2, 1.0)]), Err(GenError::InvalidDistribution(_))));
        // failed validation consumes nothing
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn choice_uses_one_draw_and_respects_zero_weights() {
        let mut rng = RandomStream::from_seed(5);
        let items = [("never", 0.0), ("always", 1.0)];
        for _ in 0..100 {
            assert_eq!(*rng.choice(&items).unwrap(), "always");
        }
        assert_eq!(rng.draws(), 100);
    }

    #[test]
    fn choice_frequencies_follow_weights() {
        let mut rng = RandomStream::from_seed(2024);
        let items = [(0usize, 0.1), (1, 0.2), (2, 0.7)];
        let mut counts = [0usize; 3];
        for _ in 0..20_000 {
            counts[*rng.choice(&items).unwrap()] += 1;
        }
        let share = counts[2] as f32 / 20_000.0;
        assert!((share - 0.7).abs() < 0.02, "share was {}", share);
    }

    #[test]
    fn substreams_are_independent_and_reproducible() {
        let mut a = RandomStream::from_seed(11);
        let mut b = RandomStream::from_seed(11);
        let mut sa = a.substream();
        let mut sb = b.substream();
        assert_eq!(sa.uniform_vec(8), sb.uniform_vec(8));
        // parent continues identically regardless of substream use
        assert_eq!(a.uniform(), b.uniform());
        assert_ne!(a.substream().seed(), a.substream().seed());
    }

    #[test]
    fn sample_counts_as_a_draw() {
        let mut rng = RandomStream::from_seed(8);
        let dist = Uniform::new(10.0f32, 20.0).unwrap();
        let v = rng.sample(&dist);
        assert!((10.0..20.0).contains(&v));
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn index_covers_range() {
        let mut rng = RandomStream::from_seed(4);
        let mut seen = [false; 5];
        for _ in 0..500 {
            seen[rng.index(5)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
