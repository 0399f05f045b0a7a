//! Fiat–Shamir prover with rejection sampling.
//!
//! The plaintexts are encrypted once. Each iteration then draws fresh
//! Gaussian masks, commits to them, derives the challenge from the transcript
//! and answers with secret·c + mask. Answers whose norm exceeds 6·σ_E would
//! leak the secret and are thrown away.

use crate::{
    cipher::Ciphertext,
    crt::CrtPoly,
    encryption::{encrypt, EncryptionRandomness, PublicKey},
    error::{expect_len, Result, VeError},
    gaussian::{sample_gauss, sample_gauss_crt},
    norm::check_norm,
    params::Scheme,
    polynomial::Polynomial,
    proof::{Proof, Responses},
    transcript::{derive_challenge, hash_transcript},
};
use itertools::izip;
use rand::{CryptoRng, Rng};
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Acceptance normally takes a handful of iterations; far more than this
/// points at badly chosen parameters or messages that are not short.
const SLOW_ACCEPTANCE: u64 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProverStats {
    /// Loop iterations until a response passed the norm check
    pub iterations: u64,
}

/// Σ t_i·m_i in R_p.
pub fn relation_value(scheme: &Scheme, t: &[Polynomial], m: &[Polynomial]) -> Polynomial {
    t.iter()
        .zip(m)
        .fold(scheme.zero_p(), |acc, (t_i, m_i)| acc + &(t_i * m_i))
}

/// One iteration's masking values, same shape as the responses.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Masks(Responses);

impl Masks {
    fn sample<R: Rng + ?Sized>(scheme: &Scheme, rng: &mut R) -> Self {
        let (vector, dim) = (scheme.vector(), scheme.dim());
        let r = (0..vector)
            .map(|_| (0..dim).map(|_| sample_gauss_crt(scheme, rng)).collect())
            .collect();
        let e = (0..vector)
            .map(|_| (0..dim).map(|_| sample_gauss_crt(scheme, rng)).collect())
            .collect();
        let e_prime = (0..vector).map(|_| sample_gauss_crt(scheme, rng)).collect();
        let mu = (0..vector).map(|_| sample_gauss(scheme, rng)).collect();
        Masks(Responses { r, e, e_prime, mu })
    }
}

pub struct Prover<'a> {
    scheme: &'a Scheme,
    max_iterations: Option<u64>,
}

impl<'a> Prover<'a> {
    /// Prover without an iteration limit.
    pub fn new(scheme: &'a Scheme) -> Self {
        Self {
            scheme,
            max_iterations: None,
        }
    }

    /// Give up with `VeError::IterationLimit` after `limit` rejected iterations.
    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    pub fn prove<R: Rng + CryptoRng + ?Sized>(
        &self,
        t: &[Polynomial],
        u: &Polynomial,
        m: &[Polynomial],
        pk: &PublicKey,
        rng: &mut R,
    ) -> Result<Proof> {
        self.prove_with_stats(t, u, m, pk, rng).map(|(proof, _)| proof)
    }

    /// Proves that `m` is encrypted under `pk` and satisfies Σ t_i·m_i = u.
    ///
    /// The relation itself and the shortness of `m` are the caller's
    /// responsibility; a relation that does not hold yields a proof that
    /// fails verification.
    pub fn prove_with_stats<R: Rng + CryptoRng + ?Sized>(
        &self,
        t: &[Polynomial],
        u: &Polynomial,
        m: &[Polynomial],
        pk: &PublicKey,
        rng: &mut R,
    ) -> Result<(Proof, ProverStats)> {
        let scheme = self.scheme;
        check_inputs(scheme, t, u, m, pk)?;

        let secrets: Vec<EncryptionRandomness> = (0..scheme.vector())
            .map(|_| EncryptionRandomness::sample(scheme, rng))
            .collect();
        let ciphertexts: Vec<Ciphertext> = m
            .iter()
            .zip(&secrets)
            .map(|(m_i, s)| encrypt(scheme, pk, m_i, &s.r, &s.e, &s.e_prime))
            .collect();

        let mut stats = ProverStats::default();
        loop {
            if let Some(limit) = self.max_iterations {
                if stats.iterations >= limit {
                    warn!(limit, "no acceptable response within the iteration limit");
                    return Err(VeError::IterationLimit(limit));
                }
            }
            stats.iterations += 1;

            let masks = Masks::sample(scheme, rng);
            let y = &masks.0;
            let commitments: Vec<Ciphertext> = izip!(&y.mu, &y.r, &y.e, &y.e_prime)
                .map(|(mu, r, e, e_prime)| encrypt(scheme, pk, mu, r, e, e_prime))
                .collect();
            let masked_relation = relation_value(scheme, t, &y.mu);

            let digest = hash_transcript(pk, t, u, &ciphertexts, &commitments, &masked_relation);
            let challenge = derive_challenge(scheme, &digest);

            let mut responses = respond(scheme, &challenge, m, &secrets, y);
            if !check_norm(scheme, &responses) {
                debug!(iteration = stats.iterations, "response rejected");
                responses.zeroize();
                if is_slow_milestone(stats.iterations) {
                    warn!(
                        iterations = stats.iterations,
                        "still no acceptable response, check parameters and message shortness"
                    );
                }
                continue;
            }

            info!(iterations = stats.iterations, "proof accepted");
            let proof = Proof {
                ciphertexts,
                challenge,
                responses,
            };
            return Ok((proof, stats));
        }
    }
}

/// `Prover::new(scheme).prove(..)`.
pub fn prove<R: Rng + CryptoRng + ?Sized>(
    scheme: &Scheme,
    t: &[Polynomial],
    u: &Polynomial,
    m: &[Polynomial],
    pk: &PublicKey,
    rng: &mut R,
) -> Result<Proof> {
    Prover::new(scheme).prove(t, u, m, pk, rng)
}

/// SLOW_ACCEPTANCE, then every tenfold of it.
fn is_slow_milestone(iterations: u64) -> bool {
    let mut mark = SLOW_ACCEPTANCE;
    while mark < iterations {
        mark = mark.saturating_mul(10);
    }
    mark == iterations
}

fn check_inputs(
    scheme: &Scheme,
    t: &[Polynomial],
    u: &Polynomial,
    m: &[Polynomial],
    pk: &PublicKey,
) -> Result<()> {
    let (vector, dim) = (scheme.vector(), scheme.dim());
    expect_len("relation coefficients", vector, t.len())?;
    expect_len("plaintexts", vector, m.len())?;
    expect_len("public matrix rows", dim, pk.a.len())?;
    for row in &pk.a {
        expect_len("public matrix columns", dim, row.len())?;
    }
    expect_len("public vector", dim, pk.t.len())?;

    let in_rp = |polys: &[Polynomial]| polys.iter().all(|a| scheme.is_plaintext_element(a));
    if !in_rp(t) {
        return Err(VeError::NotInRing("relation coefficient"));
    }
    if !scheme.is_plaintext_element(u) {
        return Err(VeError::NotInRing("relation value"));
    }
    if !in_rp(m) {
        return Err(VeError::NotInRing("plaintext"));
    }
    if !pk.a.iter().flatten().chain(&pk.t).all(|a| scheme.is_split_element(a)) {
        return Err(VeError::NotInRing("public key entry"));
    }
    Ok(())
}

/// z = secret·c + y for every family; μ in R_p, the rest per CRT half.
fn respond(
    scheme: &Scheme,
    challenge: &Polynomial,
    m: &[Polynomial],
    secrets: &[EncryptionRandomness],
    y: &Responses,
) -> Responses {
    let c = scheme.split_plaintext(challenge);
    let mask = |s: &CrtPoly, y: &CrtPoly| &(s * &c) + y;
    let mask_all = |s: &[CrtPoly], y: &[CrtPoly]| -> Vec<CrtPoly> {
        s.iter().zip(y).map(|(s, y)| mask(s, y)).collect()
    };

    Responses {
        r: secrets.iter().zip(&y.r).map(|(s, y)| mask_all(&s.r, y)).collect(),
        e: secrets.iter().zip(&y.e).map(|(s, y)| mask_all(&s.e, y)).collect(),
        e_prime: secrets
            .iter()
            .zip(&y.e_prime)
            .map(|(s, y)| mask(&s.e_prime, y))
            .collect(),
        mu: m
            .iter()
            .zip(&y.mu)
            .map(|(m_i, y)| &(m_i * challenge) + y)
            .collect(),
    }
}
