//! Proof container.

use crate::{
    cipher::Ciphertext, crt::CrtPoly, error::VerifyError, params::Scheme, polynomial::Polynomial,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// One value per secret: z_r, z_e (VECTOR × DIM), z_e' (VECTOR) in split form,
/// z_μ (VECTOR) in R_p. Also the shape of the prover's masks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct Responses {
    pub r: Vec<Vec<CrtPoly>>,
    pub e: Vec<Vec<CrtPoly>>,
    pub e_prime: Vec<CrtPoly>,
    pub mu: Vec<Polynomial>,
}

impl Responses {
    pub(crate) fn check_shape(&self, scheme: &Scheme) -> Result<(), VerifyError> {
        let (vector, dim) = (scheme.vector(), scheme.dim());
        let rows_ok =
            |rows: &Vec<Vec<CrtPoly>>| rows.len() == vector && rows.iter().all(|r| r.len() == dim);
        if !rows_ok(&self.r) || !rows_ok(&self.e) {
            return Err(VerifyError::Malformed("r/e responses must be VECTOR x DIM".into()));
        }
        if self.e_prime.len() != vector || self.mu.len() != vector {
            return Err(VerifyError::Malformed("e'/mu responses must have VECTOR entries".into()));
        }
        let crt_ok = self
            .r
            .iter()
            .chain(&self.e)
            .flatten()
            .chain(&self.e_prime)
            .all(|c| scheme.is_split_element(c));
        let mu_ok = self.mu.iter().all(|p| scheme.is_plaintext_element(p));
        if !crt_ok || !mu_ok {
            return Err(VerifyError::Malformed("response ring mismatch".into()));
        }
        Ok(())
    }
}

/// Verifiable encryption of VECTOR plaintexts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub ciphertexts: Vec<Ciphertext>,
    /// Sparse 0/1 challenge in R_p
    pub challenge: Polynomial,
    pub responses: Responses,
}

impl Proof {
    /// Structural check against the scheme; never truncates.
    pub fn check_shape(&self, scheme: &Scheme) -> Result<(), VerifyError> {
        if self.ciphertexts.len() != scheme.vector() {
            return Err(VerifyError::Malformed("expected VECTOR ciphertexts".into()));
        }
        let ct_ok = self.ciphertexts.iter().all(|ct| {
            ct.v.len() == scheme.dim()
                && ct
                    .v
                    .iter()
                    .chain(std::iter::once(&ct.w))
                    .all(|c| scheme.is_split_element(c))
        });
        if !ct_ok {
            return Err(VerifyError::Malformed("ciphertext shape mismatch".into()));
        }
        if !scheme.is_plaintext_element(&self.challenge) {
            return Err(VerifyError::Malformed("challenge ring mismatch".into()));
        }
        self.responses.check_shape(scheme)
    }
}
