use serde::{Deserialize, Serialize};

use super::BfvError;

/// Insecure toy parameters used by the original client tests. `q` has no `16`-th root of unity,
/// so encryption runs on schoolbook multiplication.
pub const TOY: Parameters = Parameters {
    poly_degree: 8,
    plain_modulus: 17,
    coeff_modulus: 32768,
};

/// Toy parameters whose ciphertext modulus supports the negacyclic transform.
pub const TOY_NTT: Parameters = Parameters {
    poly_degree: 8,
    plain_modulus: 17,
    coeff_modulus: 7681,
};

/// Parameters the questionnaire backend issues by default.
pub const QUESTIONNAIRE: Parameters = Parameters {
    poly_degree: 8,
    plain_modulus: 17,
    coeff_modulus: 8_000_000_000_000,
};

/// BFV parameters `(d, t, q)`.
///
/// Invariants checked on construction and deserialization:
/// `d` is a power of two, `2 <= t < q <= i64::MAX` and `t = 1 mod 2d`, so that the batch encoder
/// finds a primitive `2d`-th root of unity modulo `t`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", try_from = "RawParameters")]
pub struct Parameters {
    poly_degree: usize,
    plain_modulus: u64,
    coeff_modulus: u64,
}

impl Parameters {
    pub fn new(poly_degree: usize, plain_modulus: u64, coeff_modulus: u64) -> Result<Self, BfvError> {
        if !poly_degree.is_power_of_two() {
            return Err(BfvError::InvalidDegree {
                degree: poly_degree,
            });
        }
        if plain_modulus < 2 || coeff_modulus <= plain_modulus || coeff_modulus > i64::MAX as u64
        {
            return Err(BfvError::InvalidModulus {
                plain_modulus,
                coeff_modulus,
            });
        }
        let order = 2 * poly_degree as u64;
        if (plain_modulus - 1) % order != 0 {
            return Err(BfvError::NoRootOfUnityExists {
                order,
                modulus: plain_modulus,
            });
        }
        Ok(Self {
            poly_degree,
            plain_modulus,
            coeff_modulus,
        })
    }

    pub fn poly_degree(&self) -> usize {
        self.poly_degree
    }

    pub fn plain_modulus(&self) -> u64 {
        self.plain_modulus
    }

    pub fn coeff_modulus(&self) -> u64 {
        self.coeff_modulus
    }

    /// `floor(q / t)`
    pub fn scaling_factor(&self) -> u64 {
        self.coeff_modulus / self.plain_modulus
    }

    /// Whether `q = 1 mod 2d`, i.e. whether ciphertext products can use the transform.
    pub fn supports_fast_multiplication(&self) -> bool {
        (self.coeff_modulus - 1) % (2 * self.poly_degree as u64) == 0
    }
}

// The backend stores the ciphertext modulus as a decimal string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Integer {
    Number(u64),
    Decimal(String),
}

impl Integer {
    fn parse(self) -> Result<u64, String> {
        match self {
            Integer::Number(n) => Ok(n),
            Integer::Decimal(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("{:?} is not an unsigned integer", s)),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameters {
    #[serde(alias = "poly_degree")]
    poly_degree: usize,
    #[serde(alias = "plain_modulus")]
    plain_modulus: Integer,
    #[serde(alias = "coeff_modulus", alias = "ciphModulus", alias = "ciph_modulus")]
    coeff_modulus: Integer,
}

impl TryFrom<RawParameters> for Parameters {
    type Error = String;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        Parameters::new(
            raw.poly_degree,
            raw.plain_modulus.parse()?,
            raw.coeff_modulus.parse()?,
        )
        .map_err(|e| e.to_string())
    }
}
