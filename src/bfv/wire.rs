//! Serialization of the public BFV structures.
//!
//! JSON is the interoperable format exchanged with the aggregation backend. Polynomials are
//! written as `{"ringDegree": d, "coeffs": [...]}`; readers also accept `ring_degree`, which is
//! what the backend emits. bincode is offered as a compact binary form for local storage.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{poly::Polynomial, BfvError};

pub trait Wire: Serialize + DeserializeOwned {
    fn to_json(&self) -> Result<String, BfvError> {
        serde_json::to_string(self).map_err(BfvError::MalformedWireData)
    }

    fn to_value(&self) -> Result<serde_json::Value, BfvError> {
        serde_json::to_value(self).map_err(BfvError::MalformedWireData)
    }

    fn from_json(json: &str) -> Result<Self, BfvError> {
        serde_json::from_str(json).map_err(BfvError::MalformedWireData)
    }

    fn from_value(value: serde_json::Value) -> Result<Self, BfvError> {
        serde_json::from_value(value).map_err(BfvError::MalformedWireData)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, BfvError> {
        bincode::serialize(self).map_err(|e| BfvError::MalformedBinaryData(*e))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, BfvError> {
        bincode::deserialize(bytes).map_err(|e| BfvError::MalformedBinaryData(*e))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawPolynomial {
    #[serde(alias = "ring_degree")]
    ring_degree: usize,
    coeffs: Vec<i64>,
}

impl TryFrom<RawPolynomial> for Polynomial {
    type Error = BfvError;

    fn try_from(raw: RawPolynomial) -> Result<Self, Self::Error> {
        Polynomial::new(raw.ring_degree, raw.coeffs)
    }
}

#[derive(Deserialize)]
pub(super) struct RawPublicKey {
    pub p0: Polynomial,
    pub p1: Polynomial,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawCiphertext {
    pub c0: Polynomial,
    pub c1: Polynomial,
    #[serde(default, alias = "scaling_factor")]
    pub scaling_factor: Option<u64>,
    #[serde(default)]
    pub modulus: Option<u64>,
}

pub(super) fn check_pair(lhs: &Polynomial, rhs: &Polynomial) -> Result<(), BfvError> {
    use super::poly::RingElement;

    if lhs.ring_degree() != rhs.ring_degree() {
        return Err(BfvError::LengthMismatch {
            expected: lhs.ring_degree(),
            actual: rhs.ring_degree(),
        });
    }
    Ok(())
}
