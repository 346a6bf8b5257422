use log::debug;

use super::{
    number_theory::{add_mod, mod_inverse, mod_pow, mul_mod, root_of_unity, sub_mod},
    BfvError,
};

/// Precomputed root tables for the number theoretic transform over `Z_q` of a fixed size `d`.
///
/// The context is built once per `(d, q)` pair and is read-only afterwards, so it can be shared
/// across threads behind an `Arc`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformContext {
    ring_degree: usize,
    modulus: u64,
    /// Primitive `2d`-th root of unity `psi`.
    root: u64,
    degree_inverse: u64,
    /// `psi^i` for `i` in `0..d`.
    root_powers: Vec<u64>,
    /// `psi^-i` for `i` in `0..d`.
    root_inverse_powers: Vec<u64>,
    /// `psi^-i * d^-1` for `i` in `0..d`, consumed by the last inverse butterfly stage.
    scaled_root_inverse_powers: Vec<u64>,
}

impl TransformContext {
    /// `modulus` must not exceed `i64::MAX`, the coefficient range of [`super::poly::Polynomial`].
    pub fn new(ring_degree: usize, modulus: u64) -> Result<Self, BfvError> {
        check_ring(ring_degree, modulus)?;
        let root = root_of_unity(2 * ring_degree as u64, modulus)?;
        Self::build(ring_degree, modulus, root)
    }

    /// Uses the given `root`, which must be a primitive `2d`-th root of unity modulo `modulus`.
    pub fn with_root(ring_degree: usize, modulus: u64, root: u64) -> Result<Self, BfvError> {
        check_ring(ring_degree, modulus)?;
        let order = 2 * ring_degree as u64;
        // For a power-of-two order, `root^d == -1` is equivalent to `root` having order exactly `2d`.
        if modulus < 3 || mod_pow(root, ring_degree as u64, modulus) != modulus - 1 {
            return Err(BfvError::InvalidRootOfUnity {
                root,
                order,
                modulus,
            });
        }
        Self::build(ring_degree, modulus, root)
    }

    fn build(ring_degree: usize, modulus: u64, root: u64) -> Result<Self, BfvError> {
        let root_inverse = mod_inverse(root as i64, modulus)?;
        let degree_inverse = mod_inverse(ring_degree as i64, modulus)?;

        let root_powers = powers(root, ring_degree, modulus);
        let root_inverse_powers = powers(root_inverse, ring_degree, modulus);
        let scaled_root_inverse_powers = root_inverse_powers
            .iter()
            .map(|power| mul_mod(*power, degree_inverse, modulus))
            .collect();

        debug!(
            "Built transform context for d = {}, q = {} with root {}",
            ring_degree, modulus, root
        );

        Ok(Self {
            ring_degree,
            modulus,
            root,
            degree_inverse,
            root_powers,
            root_inverse_powers,
            scaled_root_inverse_powers,
        })
    }

    pub fn ring_degree(&self) -> usize {
        self.ring_degree
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn root(&self) -> u64 {
        self.root
    }

    /// Cyclic transform: evaluates the input at the powers of `psi^2`.
    pub fn forward_ntt(&self, values: &[u64]) -> Result<Vec<u64>, BfvError> {
        self.fast_fourier_transform(values, false)
    }

    /// Inverse of [`Self::forward_ntt`], including the `1/d` normalization.
    pub fn inverse_ntt(&self, values: &[u64]) -> Result<Vec<u64>, BfvError> {
        self.fast_fourier_transform(values, true)
    }

    /// Negacyclic transform: evaluates the input at the odd powers of `psi`, i.e. at the roots
    /// of `x^d + 1`.
    pub fn forward_ftt(&self, values: &[u64]) -> Result<Vec<u64>, BfvError> {
        self.check_len(values)?;
        let twisted: Vec<_> = values
            .iter()
            .zip(self.root_powers.iter())
            .map(|(value, power)| mul_mod(*value, *power, self.modulus))
            .collect();
        self.forward_ntt(&twisted)
    }

    pub fn inverse_ftt(&self, values: &[u64]) -> Result<Vec<u64>, BfvError> {
        let mut output = self.inverse_ntt(values)?;
        for (dst, power) in output.iter_mut().zip(self.root_inverse_powers.iter()) {
            *dst = mul_mod(*dst, *power, self.modulus);
        }
        Ok(output)
    }

    fn fast_fourier_transform(&self, values: &[u64], inverse: bool) -> Result<Vec<u64>, BfvError> {
        self.check_len(values)?;
        let n = self.ring_degree;
        let q = self.modulus;
        let stages = n.trailing_zeros();

        let mut output = bit_reverse_permute(values, q);
        for shift in 0..stages {
            let size = 1 << shift;
            let step = n / size;
            let last = shift + 1 == stages;
            let twiddles = match (inverse, last) {
                (false, _) => &self.root_powers,
                (true, false) => &self.root_inverse_powers,
                (true, true) => &self.scaled_root_inverse_powers,
            };
            for start in (0..n).step_by(2 * size) {
                for j in 0..size {
                    let mut lhs = output[start + j];
                    if inverse && last {
                        lhs = mul_mod(lhs, self.degree_inverse, q);
                    }
                    let rhs = mul_mod(output[start + j + size], twiddles[j * step], q);
                    output[start + j] = add_mod(lhs, rhs, q);
                    output[start + j + size] = sub_mod(lhs, rhs, q);
                }
            }
        }

        Ok(output)
    }

    fn check_len(&self, values: &[u64]) -> Result<(), BfvError> {
        if values.len() != self.ring_degree {
            return Err(BfvError::LengthMismatch {
                expected: self.ring_degree,
                actual: values.len(),
            });
        }
        Ok(())
    }
}

fn check_ring(ring_degree: usize, modulus: u64) -> Result<(), BfvError> {
    if !ring_degree.is_power_of_two() {
        return Err(BfvError::InvalidDegree {
            degree: ring_degree,
        });
    }
    if modulus > i64::MAX as u64 {
        return Err(BfvError::CoefficientOverflow);
    }
    Ok(())
}

fn powers(base: u64, count: usize, modulus: u64) -> Vec<u64> {
    let mut current = 1 % modulus;
    let mut powers = Vec::with_capacity(count);
    for _ in 0..count {
        powers.push(current);
        current = mul_mod(current, base, modulus);
    }
    powers
}

fn bit_reverse_permute(values: &[u64], modulus: u64) -> Vec<u64> {
    let n = values.len();
    let bits = n.trailing_zeros();
    let mut output = vec![0; n];
    for (i, value) in values.iter().enumerate() {
        let j = if bits == 0 {
            0
        } else {
            i.reverse_bits() >> (usize::BITS - bits)
        };
        output[j] = value % modulus;
    }
    output
}
