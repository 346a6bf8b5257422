pub mod encoder;
pub mod fourier;
pub mod number_theory;
pub mod params;
pub mod poly;
pub mod sampler;
pub mod wire;

use std::{fmt, sync::Arc};

use log::debug;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use self::{
    fourier::TransformContext,
    params::Parameters,
    poly::{Polynomial, RingElement},
    sampler::Sampler,
    wire::{check_pair, RawCiphertext, RawPublicKey, Wire},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BfvError {
    #[display(fmt = "ring degree {} is not a power of two", degree)]
    InvalidDegree { degree: usize },
    #[display(fmt = "no {}-th root of unity exists modulo {}", order, modulus)]
    NoRootOfUnityExists { order: u64, modulus: u64 },
    #[display(fmt = "could not find a {}-th root of unity modulo {}", order, modulus)]
    RootNotFound { order: u64, modulus: u64 },
    #[display(
        fmt = "{} is not a primitive {}-th root of unity modulo {}",
        root,
        order,
        modulus
    )]
    InvalidRootOfUnity { root: u64, order: u64, modulus: u64 },
    #[display(fmt = "{} is not invertible modulo {}", value, modulus)]
    NotInvertible { value: i64, modulus: u64 },
    #[display(fmt = "expected {} coefficients, got {}", expected, actual)]
    LengthMismatch { expected: usize, actual: usize },
    #[display(fmt = "transform context was built for a different ring")]
    ContextMismatch,
    #[display(fmt = "coefficient does not fit into 64 bits")]
    CoefficientOverflow,
    #[display(fmt = "cannot sample from or reduce by an empty range")]
    EmptyRange,
    #[display(
        fmt = "invalid moduli: plaintext modulus {} and ciphertext modulus {}",
        plain_modulus,
        coeff_modulus
    )]
    InvalidModulus {
        plain_modulus: u64,
        coeff_modulus: u64,
    },
    #[display(fmt = "malformed wire data: {}", _0)]
    MalformedWireData(serde_json::Error),
    #[display(fmt = "malformed binary data: {}", _0)]
    MalformedBinaryData(bincode::ErrorKind),
}

/// An encoded message, i.e. one polynomial with coefficients in `[0, t)`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plaintext {
    pub poly: Polynomial,
    #[serde(default, alias = "scaling_factor")]
    pub scaling_factor: Option<u64>,
}

/// A BFV public key `(p0, p1)` as issued by the key-generation backend.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(try_from = "RawPublicKey")]
pub struct PublicKey {
    p0: Polynomial,
    p1: Polynomial,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", try_from = "RawCiphertext")]
pub struct Ciphertext {
    c0: Polynomial,
    c1: Polynomial,
    scaling_factor: Option<u64>,
    modulus: Option<u64>,
}

impl Plaintext {
    pub fn new(poly: Polynomial) -> Self {
        Self {
            poly,
            scaling_factor: None,
        }
    }
}

impl RingElement for Plaintext {
    fn ring_degree(&self) -> usize {
        self.poly.ring_degree()
    }

    fn coeffs(&self) -> &[i64] {
        self.poly.coeffs()
    }
}

impl PublicKey {
    pub fn new(p0: Polynomial, p1: Polynomial) -> Result<Self, BfvError> {
        check_pair(&p0, &p1)?;
        Ok(Self { p0, p1 })
    }

    pub fn p0(&self) -> &Polynomial {
        &self.p0
    }

    pub fn p1(&self) -> &Polynomial {
        &self.p1
    }

    pub fn ring_degree(&self) -> usize {
        self.p0.ring_degree()
    }
}

impl Ciphertext {
    pub fn new(c0: Polynomial, c1: Polynomial) -> Result<Self, BfvError> {
        check_pair(&c0, &c1)?;
        Ok(Self {
            c0,
            c1,
            scaling_factor: None,
            modulus: None,
        })
    }

    /// Attaches bookkeeping data for the aggregation backend.
    pub fn with_metadata(mut self, scaling_factor: Option<u64>, modulus: Option<u64>) -> Self {
        self.scaling_factor = scaling_factor;
        self.modulus = modulus;
        self
    }

    pub fn c0(&self) -> &Polynomial {
        &self.c0
    }

    pub fn c1(&self) -> &Polynomial {
        &self.c1
    }

    pub fn scaling_factor(&self) -> Option<u64> {
        self.scaling_factor
    }

    pub fn modulus(&self) -> Option<u64> {
        self.modulus
    }
}

impl TryFrom<RawPublicKey> for PublicKey {
    type Error = BfvError;

    fn try_from(raw: RawPublicKey) -> Result<Self, Self::Error> {
        Self::new(raw.p0, raw.p1)
    }
}

impl TryFrom<RawCiphertext> for Ciphertext {
    type Error = BfvError;

    fn try_from(raw: RawCiphertext) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.c0, raw.c1)?.with_metadata(raw.scaling_factor, raw.modulus))
    }
}

impl Wire for Polynomial {}
impl Wire for Plaintext {}
impl Wire for PublicKey {}
impl Wire for Ciphertext {}

impl fmt::Display for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plaintext({})", self.poly)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(p0: {}, p1: {})", self.p0, self.p1)
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ciphertext(c0: {}, c1: {})", self.c0, self.c1)
    }
}

/// Public-key BFV encryption under fixed parameters.
///
/// Polynomial products run through the negacyclic transform whenever the ciphertext modulus
/// admits a `2d`-th root of unity, and through schoolbook multiplication otherwise.
#[derive(Debug)]
pub struct BfvEncryptor {
    params: Parameters,
    public_key: PublicKey,
    scaling_factor: u64,
    ctx: Option<Arc<TransformContext>>,
}

impl BfvEncryptor {
    pub fn new(params: &Parameters, public_key: PublicKey) -> Result<Self, BfvError> {
        if !params.supports_fast_multiplication() {
            debug!(
                "Using schoolbook multiplication: q = {} is not 1 mod {}",
                params.coeff_modulus(),
                2 * params.poly_degree()
            );
            return Self::with_context(params, public_key, None);
        }
        let ctx = match TransformContext::new(params.poly_degree(), params.coeff_modulus()) {
            Ok(ctx) => Some(Arc::new(ctx)),
            Err(
                e @ (BfvError::NoRootOfUnityExists { .. } | BfvError::RootNotFound { .. }),
            ) => {
                debug!("Using schoolbook multiplication: {}", e);
                None
            }
            Err(e) => return Err(e),
        };
        Self::with_context(params, public_key, ctx)
    }

    pub fn with_context(
        params: &Parameters,
        public_key: PublicKey,
        ctx: Option<Arc<TransformContext>>,
    ) -> Result<Self, BfvError> {
        let d = params.poly_degree();
        let q = params.coeff_modulus();
        if public_key.ring_degree() != d {
            return Err(BfvError::LengthMismatch {
                expected: d,
                actual: public_key.ring_degree(),
            });
        }
        if let Some(ctx) = &ctx {
            if ctx.ring_degree() != d || ctx.modulus() != q {
                return Err(BfvError::ContextMismatch);
            }
        }
        Ok(Self {
            params: *params,
            public_key,
            scaling_factor: params.scaling_factor(),
            ctx,
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// `floor(q / t)`
    pub fn scaling_factor(&self) -> u64 {
        self.scaling_factor
    }

    pub fn uses_fast_path(&self) -> bool {
        self.ctx.is_some()
    }

    /// Encrypts with noise drawn from a freshly seeded ChaCha20 generator.
    pub fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext, BfvError> {
        self.encrypt_with(plaintext, &mut Sampler::from_entropy())
    }

    pub fn encrypt_with<R>(
        &self,
        plaintext: &Plaintext,
        sampler: &mut Sampler<R>,
    ) -> Result<Ciphertext, BfvError>
    where
        R: RngCore,
    {
        let d = self.params.poly_degree();
        let q = self.params.coeff_modulus();
        let ctx = self.ctx.as_deref();

        let scaling_factor =
            i64::try_from(self.scaling_factor).map_err(|_| BfvError::CoefficientOverflow)?;
        let scaled_message = plaintext.poly.scalar_multiply(scaling_factor, Some(q))?;
        if scaled_message.ring_degree() != d {
            return Err(BfvError::LengthMismatch {
                expected: d,
                actual: scaled_message.ring_degree(),
            });
        }

        let u = sampler.sample_polynomial_triangle(d);
        let e_1 = sampler.sample_polynomial_triangle(d);
        let e_2 = sampler.sample_polynomial_triangle(d);

        let c0 = e_1
            .add(&self.public_key.p0.multiply(&u, q, ctx)?, Some(q))?
            .add(&scaled_message, Some(q))?;
        let c1 = e_2.add(&self.public_key.p1.multiply(&u, q, ctx)?, Some(q))?;

        Ciphertext::new(c0, c1)
    }
}
