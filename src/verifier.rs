//! Proof verification.
//!
//! The commitments are never sent: by linearity of encryption they are
//! recomputed as Encrypt(z) − c·ciphertext, and the masked relation as
//! Σ t_i·z_μ_i − c·u. The proof is accepted iff hashing these reproduces the
//! stored challenge.

use crate::{
    cipher::Ciphertext,
    encryption::{encrypt, PublicKey},
    error::VerifyError,
    norm::max_response_norm,
    params::Scheme,
    polynomial::Polynomial,
    proof::Proof,
    prover::relation_value,
    transcript::{derive_challenge, hash_transcript},
};
use itertools::izip;
use tracing::debug;

/// Full check with the rejection reason.
pub fn check(
    scheme: &Scheme,
    proof: &Proof,
    t: &[Polynomial],
    u: &Polynomial,
    pk: &PublicKey,
) -> Result<(), VerifyError> {
    check_statement(scheme, t, u, pk)?;
    proof.check_shape(scheme)?;

    let bound = scheme.norm_bound();
    let max = max_response_norm(scheme, &proof.responses);
    if max >= bound {
        return Err(VerifyError::NormBound { max, bound });
    }

    let c = &proof.challenge;
    let c_split = scheme.split_plaintext(c);
    let z = &proof.responses;

    let commitments: Vec<Ciphertext> = izip!(&z.mu, &z.r, &z.e, &z.e_prime, &proof.ciphertexts)
        .map(|(mu, r, e, e_prime, ct)| encrypt(scheme, pk, mu, r, e, e_prime).sub_scaled(&c_split, ct))
        .collect();
    let masked_relation = relation_value(scheme, t, &z.mu) - &(c * u);

    let digest = hash_transcript(
        pk,
        t,
        u,
        &proof.ciphertexts,
        &commitments,
        &masked_relation,
    );
    if derive_challenge(scheme, &digest) != *c {
        return Err(VerifyError::ChallengeMismatch);
    }
    Ok(())
}

/// true iff the proof is valid for (t, u) under `pk`.
pub fn verify(
    scheme: &Scheme,
    proof: &Proof,
    t: &[Polynomial],
    u: &Polynomial,
    pk: &PublicKey,
) -> bool {
    match check(scheme, proof, t, u, pk) {
        Ok(()) => true,
        Err(reason) => {
            debug!(%reason, "proof rejected");
            false
        }
    }
}

/// Public inputs must live in the scheme's rings before they are hashed.
fn check_statement(
    scheme: &Scheme,
    t: &[Polynomial],
    u: &Polynomial,
    pk: &PublicKey,
) -> Result<(), VerifyError> {
    let dim = scheme.dim();
    if t.len() != scheme.vector() {
        return Err(VerifyError::Malformed(format!(
            "expected {} relation coefficients, found {}",
            scheme.vector(),
            t.len()
        )));
    }
    if !t.iter().chain(std::iter::once(u)).all(|p| scheme.is_plaintext_element(p)) {
        return Err(VerifyError::Malformed("relation outside the plaintext ring".into()));
    }
    let pk_ok = pk.a.len() == dim
        && pk.t.len() == dim
        && pk.a.iter().all(|row| row.len() == dim)
        && pk.a.iter().flatten().chain(&pk.t).all(|a| scheme.is_split_element(a));
    if !pk_ok {
        return Err(VerifyError::Malformed("public key shape mismatch".into()));
    }
    Ok(())
}
