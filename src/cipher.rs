//! Ring-LWE ciphertext container.

use crate::crt::CrtPoly;
use serde::{Deserialize, Serialize};

/// (v, w) = (p(Aᵀr + e), p(tᵀr + e') + m), all in split form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    pub v: Vec<CrtPoly>, // length = dim
    pub w: CrtPoly,
}

impl Ciphertext {
    /// self − c·rhs, component-wise. Both ciphertexts must have the same rank.
    pub fn sub_scaled(&self, c: &CrtPoly, rhs: &Ciphertext) -> Ciphertext {
        assert_eq!(self.v.len(), rhs.v.len(), "rank mismatch");
        Ciphertext {
            v: self
                .v
                .iter()
                .zip(&rhs.v)
                .map(|(a, b)| a - &(c * b))
                .collect(),
            w: &self.w - &(c * &rhs.w),
        }
    }
}
