use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::{poly::Polynomial, BfvError};

/// Draws noise and uniform coefficients from an injected random number generator.
pub struct Sampler<R: RngCore> {
    rng: R,
}

impl<R: RngCore> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Coefficients in `{-1, 0, 1}` with probabilities `1/8, 3/4, 1/8`.
    pub fn sample_triangle(&mut self, size: usize) -> Vec<i64> {
        (0..size)
            .map(|_| {
                let r = self.rng.gen::<f64>() + self.rng.gen::<f64>();
                if r < 0.5 {
                    -1
                } else if r < 1.5 {
                    0
                } else {
                    1
                }
            })
            .collect()
    }

    /// Coefficients uniform in `[0, max)`.
    pub fn sample_uniform(&mut self, size: usize, max: u64) -> Result<Vec<u64>, BfvError> {
        if max == 0 {
            return Err(BfvError::EmptyRange);
        }
        Ok((0..size).map(|_| self.rng.gen_range(0..max)).collect())
    }

    pub fn sample_polynomial_triangle(&mut self, ring_degree: usize) -> Polynomial {
        self.sample_triangle(ring_degree).into()
    }

    pub fn sample_polynomial_uniform(
        &mut self,
        ring_degree: usize,
        max: u64,
    ) -> Result<Polynomial, BfvError> {
        let coeffs = self.sample_uniform(ring_degree, max)?;
        Polynomial::from_unsigned(ring_degree, &coeffs)
    }
}

impl Sampler<ChaCha20Rng> {
    pub fn from_entropy() -> Self {
        Self::new(ChaCha20Rng::from_entropy())
    }

    /// Reproducible stream; not suitable for real ballots.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }
}

#[cfg(test)]
mod tests {
    use crate::bfv::{poly::RingElement, BfvError};

    use super::Sampler;

    #[test]
    fn triangle_frequencies() {
        let samples = Sampler::seeded(42).sample_triangle(80_000);
        let count = |v: i64| samples.iter().filter(|s| **s == v).count() as f64 / 80_000.0;
        assert!(samples.iter().all(|s| (-1..=1).contains(s)));
        assert!((count(-1) - 0.125).abs() < 0.01);
        assert!((count(0) - 0.75).abs() < 0.01);
        assert!((count(1) - 0.125).abs() < 0.01);
    }

    #[test]
    fn uniform_range() {
        let mut sampler = Sampler::seeded(1);
        let samples = sampler.sample_uniform(1000, 17).unwrap();
        assert!(samples.iter().all(|s| *s < 17));
        assert!(samples.iter().any(|s| *s == 16));
        assert!(sampler.sample_uniform(10, 1).unwrap().iter().all(|s| *s == 0));
        assert!(matches!(
            sampler.sample_uniform(10, 0),
            Err(BfvError::EmptyRange)
        ));
        assert!(sampler.sample_uniform(0, 5).unwrap().is_empty());
    }

    #[test]
    fn seeded_is_deterministic() {
        let mut lhs = Sampler::seeded(5);
        let mut rhs = Sampler::seeded(5);
        assert_eq!(
            lhs.sample_polynomial_triangle(64),
            rhs.sample_polynomial_triangle(64)
        );
        assert_eq!(
            lhs.sample_polynomial_uniform(64, 8_000_000_000_000).unwrap(),
            rhs.sample_polynomial_uniform(64, 8_000_000_000_000).unwrap()
        );
        assert_ne!(
            Sampler::seeded(6).sample_uniform(64, u64::MAX).unwrap(),
            Sampler::seeded(5).sample_uniform(64, u64::MAX).unwrap()
        );
    }

    #[test]
    fn polynomial_shapes() {
        let mut sampler = Sampler::from_entropy();
        let poly = sampler.sample_polynomial_uniform(8, 32768).unwrap();
        assert_eq!(poly.ring_degree(), 8);
        assert!(poly.coeffs().iter().all(|c| (0..32768).contains(c)));
        assert_eq!(sampler.sample_polynomial_triangle(16).coeffs().len(), 16);
    }
}
