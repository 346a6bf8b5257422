use std::sync::Arc;

use super::{
    fourier::TransformContext,
    params::Parameters,
    poly::{Polynomial, RingElement},
    BfvError, Plaintext,
};

/// Packs `d` slot values modulo `t` into one plaintext polynomial.
///
/// Slot `k` is the evaluation of the plaintext at `psi^(2k + 1)`, where `psi` is the primitive
/// `2d`-th root of unity modulo `t` picked by the transform context. Slot-wise addition of
/// messages therefore corresponds to addition of plaintexts.
#[derive(Clone, Debug)]
pub struct BatchEncoder {
    ctx: Arc<TransformContext>,
}

impl BatchEncoder {
    pub fn new(params: &Parameters) -> Result<Self, BfvError> {
        let ctx = TransformContext::new(params.poly_degree(), params.plain_modulus())?;
        Ok(Self::with_context(Arc::new(ctx)))
    }

    /// `ctx` must be built over the plaintext modulus.
    pub fn with_context(ctx: Arc<TransformContext>) -> Self {
        Self { ctx }
    }

    pub fn slot_count(&self) -> usize {
        self.ctx.ring_degree()
    }

    pub fn plain_modulus(&self) -> u64 {
        self.ctx.modulus()
    }

    pub fn encode(&self, values: &[u64]) -> Result<Plaintext, BfvError> {
        let t = self.ctx.modulus();
        let reduced: Vec<_> = values.iter().map(|value| value % t).collect();
        let coeffs = self.ctx.inverse_ftt(&reduced)?;
        Ok(Plaintext::new(Polynomial::from_unsigned(
            self.ctx.ring_degree(),
            &coeffs,
        )?))
    }

    pub fn decode(&self, plaintext: &Plaintext) -> Result<Vec<u64>, BfvError> {
        let d = self.ctx.ring_degree();
        if plaintext.ring_degree() != d {
            return Err(BfvError::LengthMismatch {
                expected: d,
                actual: plaintext.ring_degree(),
            });
        }
        self.ctx
            .forward_ftt(&plaintext.canonical_coeffs(self.ctx.modulus()))
    }
}
