use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    fourier::TransformContext,
    number_theory::{add_mod, mul_mod, reduce_signed, sub_mod},
    wire::RawPolynomial,
    BfvError,
};

/// Anything that carries the coefficient vector of an element of `Z[x]/(x^d + 1)`.
pub trait RingElement {
    fn ring_degree(&self) -> usize;

    fn coeffs(&self) -> &[i64];

    /// The coefficients mapped into `[0, modulus)`.
    fn canonical_coeffs(&self, modulus: u64) -> Vec<u64> {
        self.coeffs()
            .iter()
            .map(|coeff| reduce_signed(*coeff as i128, modulus))
            .collect()
    }
}

/// An element of `R_q = Z_q[x]/(x^d + 1)` in coefficient representation.
///
/// Coefficients are signed so that freshly sampled noise can be stored as is. Every operation that
/// takes a modulus leaves the result in canonical form, i.e. with coefficients in `[0, q)`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", try_from = "RawPolynomial")]
pub struct Polynomial {
    ring_degree: usize,
    coeffs: Vec<i64>,
}

impl Polynomial {
    pub fn new(ring_degree: usize, coeffs: Vec<i64>) -> Result<Self, BfvError> {
        if coeffs.len() != ring_degree {
            return Err(BfvError::LengthMismatch {
                expected: ring_degree,
                actual: coeffs.len(),
            });
        }
        Ok(Self {
            ring_degree,
            coeffs,
        })
    }

    pub fn zero(ring_degree: usize) -> Self {
        Self {
            ring_degree,
            coeffs: vec![0; ring_degree],
        }
    }

    pub fn from_unsigned(ring_degree: usize, coeffs: &[u64]) -> Result<Self, BfvError> {
        let coeffs = coeffs
            .iter()
            .map(|coeff| i64::try_from(*coeff).map_err(|_| BfvError::CoefficientOverflow))
            .collect::<Result<_, _>>()?;
        Self::new(ring_degree, coeffs)
    }

    pub fn into_coeffs(self) -> Vec<i64> {
        self.coeffs
    }

    pub fn add(
        &self,
        other: &impl RingElement,
        modulus: Option<u64>,
    ) -> Result<Polynomial, BfvError> {
        self.zip_with(other, modulus, |lhs, rhs| lhs + rhs)
    }

    pub fn subtract(
        &self,
        other: &impl RingElement,
        modulus: Option<u64>,
    ) -> Result<Polynomial, BfvError> {
        self.zip_with(other, modulus, |lhs, rhs| lhs - rhs)
    }

    pub fn scalar_multiply(&self, scalar: i64, modulus: Option<u64>) -> Result<Polynomial, BfvError> {
        let modulus = check_modulus(modulus)?;
        let coeffs = self
            .coeffs
            .iter()
            .map(|coeff| finish(*coeff as i128 * scalar as i128, modulus))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            ring_degree: self.ring_degree,
            coeffs,
        })
    }

    /// Canonicalizes every coefficient into `[0, modulus)`.
    pub fn reduce(&self, modulus: u64) -> Result<Polynomial, BfvError> {
        let modulus = check_modulus(Some(modulus))?;
        let coeffs = self
            .coeffs
            .iter()
            .map(|coeff| finish(*coeff as i128, modulus))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            ring_degree: self.ring_degree,
            coeffs,
        })
    }

    /// Multiplies in `Z_q[x]/(x^d + 1)`.
    ///
    /// With a transform context the product is computed by the negacyclic transform in
    /// `O(d log d)`, otherwise by schoolbook multiplication in `O(d^2)`. Both return the same
    /// canonical coefficients.
    pub fn multiply(
        &self,
        other: &impl RingElement,
        modulus: u64,
        ctx: Option<&TransformContext>,
    ) -> Result<Polynomial, BfvError> {
        check_modulus(Some(modulus))?;
        self.check_degree(other)?;
        match ctx {
            Some(ctx) => self.multiply_via_transform(other, ctx, modulus),
            None => self.multiply_via_schoolbook(other, modulus),
        }
    }

    fn multiply_via_transform(
        &self,
        other: &impl RingElement,
        ctx: &TransformContext,
        modulus: u64,
    ) -> Result<Polynomial, BfvError> {
        if ctx.ring_degree() != self.ring_degree || ctx.modulus() != modulus {
            return Err(BfvError::ContextMismatch);
        }

        let mut lhs = ctx.forward_ftt(&self.canonical_coeffs(modulus))?;
        let rhs = ctx.forward_ftt(&other.canonical_coeffs(modulus))?;
        for (dst, src) in lhs.iter_mut().zip(rhs.iter()) {
            *dst = mul_mod(*dst, *src, modulus);
        }
        let product = ctx.inverse_ftt(&lhs)?;
        Self::from_unsigned(self.ring_degree, &product)
    }

    fn multiply_via_schoolbook(
        &self,
        other: &impl RingElement,
        modulus: u64,
    ) -> Result<Polynomial, BfvError> {
        let d = self.ring_degree;
        let lhs = self.canonical_coeffs(modulus);
        let rhs = other.canonical_coeffs(modulus);

        let mut raw = vec![0; (2 * d).saturating_sub(1)];
        for (i, lhs_coeff) in lhs.iter().enumerate() {
            for (j, rhs_coeff) in rhs.iter().enumerate() {
                raw[i + j] = add_mod(raw[i + j], mul_mod(*lhs_coeff, *rhs_coeff, modulus), modulus);
            }
        }

        // x^d = -1, so the upper half folds back with a negative sign.
        let mut reduced = vec![0; d];
        for (i, coeff) in raw.into_iter().enumerate() {
            if i < d {
                reduced[i] = add_mod(reduced[i], coeff, modulus);
            } else {
                reduced[i - d] = sub_mod(reduced[i - d], coeff, modulus);
            }
        }
        Self::from_unsigned(d, &reduced)
    }

    fn zip_with(
        &self,
        other: &impl RingElement,
        modulus: Option<u64>,
        op: impl Fn(i128, i128) -> i128,
    ) -> Result<Polynomial, BfvError> {
        let modulus = check_modulus(modulus)?;
        self.check_degree(other)?;
        let coeffs = self
            .coeffs
            .iter()
            .zip(other.coeffs())
            .map(|(lhs, rhs)| finish(op(*lhs as i128, *rhs as i128), modulus))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            ring_degree: self.ring_degree,
            coeffs,
        })
    }

    fn check_degree(&self, other: &impl RingElement) -> Result<(), BfvError> {
        if other.ring_degree() != self.ring_degree || other.coeffs().len() != self.ring_degree {
            return Err(BfvError::LengthMismatch {
                expected: self.ring_degree,
                actual: other.coeffs().len(),
            });
        }
        Ok(())
    }
}

fn check_modulus(modulus: Option<u64>) -> Result<Option<u64>, BfvError> {
    match modulus {
        Some(0) => Err(BfvError::EmptyRange),
        Some(m) if m > i64::MAX as u64 => Err(BfvError::CoefficientOverflow),
        _ => Ok(modulus),
    }
}

fn finish(value: i128, modulus: Option<u64>) -> Result<i64, BfvError> {
    match modulus {
        Some(modulus) => Ok(reduce_signed(value, modulus) as i64),
        None => i64::try_from(value).map_err(|_| BfvError::CoefficientOverflow),
    }
}

/// Takes the ring degree from the number of coefficients.
impl From<Vec<i64>> for Polynomial {
    fn from(coeffs: Vec<i64>) -> Self {
        Self {
            ring_degree: coeffs.len(),
            coeffs,
        }
    }
}

impl RingElement for Polynomial {
    fn ring_degree(&self) -> usize {
        self.ring_degree
    }

    fn coeffs(&self) -> &[i64] {
        &self.coeffs
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polynomial(degree={}, coeffs=[", self.ring_degree)?;
        for (i, coeff) in self.coeffs.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", coeff)?;
        }
        write!(f, "])")
    }
}
