//! Opening a verified proof with the private key.

use crate::{
    encryption::{decrypt_with_inverse, sample_short, PrivateKey, PublicKey},
    error::{Result, VeError},
    params::Scheme,
    polynomial::Polynomial,
    proof::Proof,
    verifier::check,
};
use rand::{CryptoRng, Rng};
use tracing::{debug, warn};

/// Verifies `proof`, then decrypts every ciphertext.
///
/// The challenge is blinded as c̄ = c − c₂ with a fresh short c₂, redrawn
/// until c̄ is invertible in R_p. Returns the plaintexts in order, or
/// `VeError::Decryption` listing every ciphertext that failed to open.
pub fn undo<R: Rng + CryptoRng + ?Sized>(
    scheme: &Scheme,
    proof: &Proof,
    t: &[Polynomial],
    u: &Polynomial,
    pk: &PublicKey,
    sk: &PrivateKey,
    rng: &mut R,
) -> Result<Vec<Polynomial>> {
    check(scheme, proof, t, u, pk)?;

    let mut draws = 1u32;
    let (blinded, blinded_inv) = loop {
        let c_bar = &proof.challenge - &sample_short(scheme, rng);
        if let Some(inv) = c_bar.inverse() {
            break (c_bar, inv);
        }
        draws += 1;
    };
    debug!(draws, "blinded challenge");

    let mut plaintexts = Vec::with_capacity(proof.ciphertexts.len());
    let mut failed = Vec::new();
    for (i, ct) in proof.ciphertexts.iter().enumerate() {
        match decrypt_with_inverse(scheme, sk, &blinded, &blinded_inv, ct) {
            Some(m) => plaintexts.push(m),
            None => failed.push(i),
        }
    }

    if !failed.is_empty() {
        warn!(?failed, "decryption failed");
        return Err(VeError::Decryption(failed));
    }
    Ok(plaintexts)
}
