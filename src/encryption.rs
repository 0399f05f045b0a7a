//! Ring-LWE encryption with plaintext modulus p inside ciphertext modulus q.
//!
//! Keys: A ← R_q^{DIM×DIM}, s, e short, t = A·s + e.
//! Encrypt(m; r, e, e'): v = p(Aᵀr + e), w = p(tᵀr + e') + m.
//! Encrypt is affine in (m, r, e, e'), which is what the proof relies on.

use crate::{
    cipher::Ciphertext,
    crt::CrtPoly,
    params::Scheme,
    polynomial::Polynomial,
};
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    /// A, DIM × DIM
    pub a: Vec<Vec<CrtPoly>>,
    /// t = A·s + e, length DIM
    pub t: Vec<CrtPoly>,
}

#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    pub s: Vec<CrtPoly>,
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey").finish_non_exhaustive()
    }
}

/// Short randomness (r, e, e') of one encryption.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionRandomness {
    pub r: Vec<CrtPoly>,
    pub e: Vec<CrtPoly>,
    pub e_prime: CrtPoly,
}

impl EncryptionRandomness {
    pub fn sample<R: Rng + CryptoRng + ?Sized>(scheme: &Scheme, rng: &mut R) -> Self {
        Self {
            r: (0..scheme.dim()).map(|_| sample_short_crt(scheme, rng)).collect(),
            e: (0..scheme.dim()).map(|_| sample_short_crt(scheme, rng)).collect(),
            e_prime: sample_short_crt(scheme, rng),
        }
    }
}

/// Uniform ternary element of R_p.
pub fn sample_short<R: Rng + CryptoRng + ?Sized>(scheme: &Scheme, rng: &mut R) -> Polynomial {
    let values: Vec<i64> = (0..scheme.degree()).map(|_| rng.gen_range(-1..=1)).collect();
    scheme.plaintext(&values)
}

/// Uniform ternary element of R_q in split form.
pub fn sample_short_crt<R: Rng + CryptoRng + ?Sized>(scheme: &Scheme, rng: &mut R) -> CrtPoly {
    let values: Vec<i64> = (0..scheme.degree()).map(|_| rng.gen_range(-1..=1)).collect();
    scheme.split(&scheme.ciphertext_ring(&values))
}

pub fn keygen<R: Rng + CryptoRng + ?Sized>(scheme: &Scheme, rng: &mut R) -> (PublicKey, PrivateKey) {
    let dim = scheme.dim();
    let a: Vec<Vec<CrtPoly>> = (0..dim)
        .map(|_| (0..dim).map(|_| CrtPoly::random(scheme, rng)).collect())
        .collect();
    let s: Vec<CrtPoly> = (0..dim).map(|_| sample_short_crt(scheme, rng)).collect();

    let t = a
        .iter()
        .map(|row| {
            row.iter()
                .zip(&s)
                .fold(sample_short_crt(scheme, rng), |acc, (a_lj, s_j)| acc + &(a_lj * s_j))
        })
        .collect();

    (PublicKey { a, t }, PrivateKey { s })
}

/// Deterministic encryption of `m ∈ R_p` under explicit randomness.
///
/// `r` and `e` must have length DIM; callers validate shapes.
pub fn encrypt(
    scheme: &Scheme,
    pk: &PublicKey,
    m: &Polynomial,
    r: &[CrtPoly],
    e: &[CrtPoly],
    e_prime: &CrtPoly,
) -> Ciphertext {
    let dim = scheme.dim();
    assert_eq!(r.len(), dim, "randomness rank mismatch");
    assert_eq!(e.len(), dim, "error rank mismatch");
    let p = scheme.p();

    // v_j = p·(Σ_l A[l][j]·r_l + e_j)
    let v = (0..dim)
        .map(|j| {
            let acc = (0..dim).fold(e[j].clone(), |acc, l| acc + &(&pk.a[l][j] * &r[l]));
            acc.scale(p)
        })
        .collect();

    // w = p·(Σ_l t_l·r_l + e') + m
    let acc = pk
        .t
        .iter()
        .zip(r)
        .fold(e_prime.clone(), |acc, (t_l, r_l)| acc + &(t_l * r_l));
    let w = acc.scale(p) + &scheme.split_plaintext(m);

    Ciphertext { v, w }
}

/// Decrypts with a challenge-difference `c̄`: m̄ = (w − vᵀs)·c̄ must be short
/// mod q, and m = (m̄ mod p)·c̄⁻¹ in R_p. `None` when either check fails.
pub fn decrypt(
    scheme: &Scheme,
    sk: &PrivateKey,
    challenge: &Polynomial,
    ct: &Ciphertext,
) -> Option<Polynomial> {
    let c_inv = challenge.inverse()?;
    decrypt_with_inverse(scheme, sk, challenge, &c_inv, ct)
}

/// `decrypt` with c̄⁻¹ computed once by the caller.
pub fn decrypt_with_inverse(
    scheme: &Scheme,
    sk: &PrivateKey,
    challenge: &Polynomial,
    challenge_inv: &Polynomial,
    ct: &Ciphertext,
) -> Option<Polynomial> {
    if ct.v.len() != sk.s.len() {
        return None;
    }
    let noisy = ct
        .v
        .iter()
        .zip(&sk.s)
        .fold(ct.w.clone(), |acc, (v_j, s_j)| acc - &(v_j * s_j));
    let scaled = scheme.reconstruct(&(&noisy * &scheme.split_plaintext(challenge)));

    if scaled.inf_norm() >= scheme.q() / 4 {
        return None;
    }
    // m·c̄ mod p, then divide by c̄
    let m_c = scaled.lift(scheme.p(), scheme.p() - 1);
    Some(&m_c * challenge_inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::VeParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn setup(params: VeParams) -> (Scheme, ChaCha20Rng) {
        (Scheme::new(params).unwrap(), ChaCha20Rng::seed_from_u64(42))
    }

    fn invertible_short<R: Rng + CryptoRng>(scheme: &Scheme, rng: &mut R) -> Polynomial {
        loop {
            let c = sample_short(scheme, rng);
            if c.inverse().is_some() {
                return c;
            }
        }
    }

    #[test]
    fn test_encrypt_decrypt() {
        let (scheme, mut rng) = setup(VeParams::small());
        let (pk, sk) = keygen(&scheme, &mut rng);

        for _ in 0..4 {
            let m = sample_short(&scheme, &mut rng);
            let rand = EncryptionRandomness::sample(&scheme, &mut rng);
            let ct = encrypt(&scheme, &pk, &m, &rand.r, &rand.e, &rand.e_prime);
            let c = invertible_short(&scheme, &mut rng);
            assert_eq!(decrypt(&scheme, &sk, &c, &ct), Some(m));
        }
    }

    #[test]
    fn test_encrypt_is_affine() {
        let (scheme, mut rng) = setup(VeParams::toy());
        let (pk, _) = keygen(&scheme, &mut rng);

        let m1 = sample_short(&scheme, &mut rng);
        let m2 = sample_short(&scheme, &mut rng);
        let r1 = EncryptionRandomness::sample(&scheme, &mut rng);
        let r2 = EncryptionRandomness::sample(&scheme, &mut rng);

        let c1 = encrypt(&scheme, &pk, &m1, &r1.r, &r1.e, &r1.e_prime);
        let c2 = encrypt(&scheme, &pk, &m2, &r2.r, &r2.e, &r2.e_prime);

        let add = |a: &[CrtPoly], b: &[CrtPoly]| -> Vec<CrtPoly> {
            a.iter().zip(b).map(|(x, y)| x + y).collect()
        };
        let sum = encrypt(
            &scheme,
            &pk,
            &(&m1 + &m2),
            &add(&r1.r, &r2.r),
            &add(&r1.e, &r2.e),
            &(&r1.e_prime + &r2.e_prime),
        );

        let one = scheme.split(&scheme.ciphertext_ring(&[-1]));
        // c1 − (−1)·c2 = c1 + c2
        assert_eq!(c1.sub_scaled(&one, &c2), sum);
    }

    #[test]
    fn test_decrypt_with_precomputed_inverse() {
        let (scheme, mut rng) = setup(VeParams::toy());
        let (pk, sk) = keygen(&scheme, &mut rng);

        let m = sample_short(&scheme, &mut rng);
        let rand = EncryptionRandomness::sample(&scheme, &mut rng);
        let ct = encrypt(&scheme, &pk, &m, &rand.r, &rand.e, &rand.e_prime);
        let c = invertible_short(&scheme, &mut rng);
        let c_inv = c.inverse().unwrap();

        assert_eq!(decrypt_with_inverse(&scheme, &sk, &c, &c_inv, &ct), Some(m));
        // a non-invertible challenge never reaches the division
        assert_eq!(decrypt(&scheme, &sk, &scheme.zero_p(), &ct), None);
    }

    #[test]
    fn test_decrypt_rejects_wrong_key() {
        let (scheme, mut rng) = setup(VeParams::small());
        let (pk, _) = keygen(&scheme, &mut rng);
        let (_, other_sk) = keygen(&scheme, &mut rng);

        let m = sample_short(&scheme, &mut rng);
        let rand = EncryptionRandomness::sample(&scheme, &mut rng);
        let ct = encrypt(&scheme, &pk, &m, &rand.r, &rand.e, &rand.e_prime);
        let c = invertible_short(&scheme, &mut rng);
        assert_eq!(decrypt(&scheme, &other_sk, &c, &ct), None);
    }
}
