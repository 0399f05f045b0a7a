//! Fiat–Shamir transcript and challenge derivation.
//!
//! Every ring element is absorbed as its coefficients in increasing degree,
//! each the canonical residue in [0, M) as 8 little-endian bytes. Prover and
//! verifier share this code path, so the encoding cannot drift between them.

use crate::{
    cipher::Ciphertext,
    crt::CrtPoly,
    encryption::PublicKey,
    params::Scheme,
    polynomial::Polynomial,
};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

pub type TranscriptDigest = [u8; 32];

/// Streaming SHA-256 over ring elements.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    hasher: Sha256,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_poly(&mut self, p: &Polynomial) {
        for &c in &p.coeffs {
            self.hasher.update(encode_coeff(c));
        }
    }

    pub fn append_crt(&mut self, p: &CrtPoly) {
        for half in &p.halves {
            self.append_poly(half);
        }
    }

    pub fn finalize(self) -> TranscriptDigest {
        self.hasher.finalize().into()
    }
}

/// Canonical coefficient encoding. Residues are < 2^63 by parameter validation.
pub fn encode_coeff(c: u128) -> [u8; 8] {
    (c as u64).to_le_bytes()
}

/// Digest of (pk.A, pk.t, t, u, ciphertexts interleaved with commitments,
/// masked relation value), in that order.
///
/// `ciphertexts` and `commitments` must have equal shapes; a mismatch panics.
pub fn hash_transcript(
    pk: &PublicKey,
    t: &[Polynomial],
    u: &Polynomial,
    ciphertexts: &[Ciphertext],
    commitments: &[Ciphertext],
    masked_relation: &Polynomial,
) -> TranscriptDigest {
    let mut tr = Transcript::new();

    for row in &pk.a {
        for a in row {
            tr.append_crt(a);
        }
    }
    for t_i in &pk.t {
        tr.append_crt(t_i);
    }
    for t_i in t {
        tr.append_poly(t_i);
    }
    tr.append_poly(u);

    assert_eq!(ciphertexts.len(), commitments.len(), "commitment count mismatch");
    for (ct, y) in ciphertexts.iter().zip(commitments) {
        assert_eq!(ct.v.len(), y.v.len(), "commitment rank mismatch");
        for (v, yv) in ct.v.iter().zip(&y.v) {
            for k in 0..2 {
                tr.append_poly(&v.halves[k]);
                tr.append_poly(&yv.halves[k]);
            }
        }
        for k in 0..2 {
            tr.append_poly(&ct.w.halves[k]);
            tr.append_poly(&y.w.halves[k]);
        }
    }
    tr.append_poly(masked_relation);

    tr.finalize()
}

/// Sparse 0/1 challenge in R_p with exactly NONZERO ones, drawn from a
/// ChaCha20 stream seeded by the digest. Indices are `next_u32() mod N`
/// (unbiased, N is a power of two); collisions are redrawn.
pub fn derive_challenge(scheme: &Scheme, digest: &TranscriptDigest) -> Polynomial {
    let n = scheme.degree();
    let mut rng = ChaCha20Rng::from_seed(*digest);
    let mut c = scheme.zero_p();

    for _ in 0..scheme.params().nonzero {
        let mut idx = rng.next_u32() as usize % n;
        while c.coeffs[idx] != 0 {
            idx = rng.next_u32() as usize % n;
        }
        c.coeffs[idx] = 1;
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encryption::keygen, params::VeParams};
    use rand::{thread_rng, Rng};

    #[test]
    fn test_canonical_encoding() {
        let scheme = Scheme::new(VeParams::toy()).unwrap();
        let p = scheme.plaintext(&[1, -1]);

        let mut tr = Transcript::new();
        tr.append_poly(&p);

        // 1, p − 1, then six zeros, each as u64 little-endian
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&1018u64.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 48]);
        let expected: TranscriptDigest = Sha256::digest(&bytes).into();

        assert_eq!(tr.finalize(), expected);
        assert_eq!(encode_coeff(0x0102), [2, 1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_challenge_well_formed() {
        let mut rng = thread_rng();
        for params in [VeParams::toy(), VeParams::small(), VeParams::demo()] {
            let scheme = Scheme::new(params).unwrap();
            for _ in 0..200 {
                let digest: TranscriptDigest = rng.gen();
                let c = derive_challenge(&scheme, &digest);
                let ones = c.coeffs.iter().filter(|&&x| x == 1).count();
                let zeros = c.coeffs.iter().filter(|&&x| x == 0).count();
                assert_eq!(ones, scheme.params().nonzero);
                assert_eq!(ones + zeros, scheme.degree());
            }
        }
    }

    #[test]
    fn test_challenge_is_deterministic() {
        let scheme = Scheme::new(VeParams::small()).unwrap();
        let d1 = [7u8; 32];
        let mut d2 = d1;
        d2[31] ^= 1;

        assert_eq!(derive_challenge(&scheme, &d1), derive_challenge(&scheme, &d1));
        assert_ne!(derive_challenge(&scheme, &d1), derive_challenge(&scheme, &d2));
    }

    #[test]
    fn test_full_weight_challenge() {
        let mut params = VeParams::toy();
        params.nonzero = params.degree;
        let scheme = Scheme::new(params).unwrap();
        let c = derive_challenge(&scheme, &[3u8; 32]);
        assert!(c.coeffs.iter().all(|&x| x == 1));
    }

    fn random_ct(scheme: &Scheme, rng: &mut impl Rng) -> Ciphertext {
        Ciphertext {
            v: (0..scheme.dim()).map(|_| CrtPoly::random(scheme, rng)).collect(),
            w: CrtPoly::random(scheme, rng),
        }
    }

    #[test]
    fn test_transcript_order_known_answer() {
        let scheme = Scheme::new(VeParams::toy()).unwrap();
        let mut rng = thread_rng();
        let (pk, _) = keygen(&scheme, &mut rng);

        let t = vec![scheme.plaintext(&[1, 2]), scheme.plaintext(&[-3])];
        let u = scheme.plaintext(&[7, 0, 5]);
        let cts = vec![random_ct(&scheme, &mut rng), random_ct(&scheme, &mut rng)];
        let ys = vec![random_ct(&scheme, &mut rng), random_ct(&scheme, &mut rng)];
        let rel = scheme.plaintext(&[-1, 4]);

        let mut bytes = Vec::new();
        let mut put = |p: &Polynomial| {
            for &c in &p.coeffs {
                bytes.extend_from_slice(&(c as u64).to_le_bytes());
            }
        };
        for row in &pk.a {
            for a in row {
                put(&a.halves[0]);
                put(&a.halves[1]);
            }
        }
        for t_l in &pk.t {
            put(&t_l.halves[0]);
            put(&t_l.halves[1]);
        }
        put(&t[0]);
        put(&t[1]);
        put(&u);
        for i in 0..2 {
            for j in 0..scheme.dim() {
                for k in 0..2 {
                    put(&cts[i].v[j].halves[k]);
                    put(&ys[i].v[j].halves[k]);
                }
            }
            for k in 0..2 {
                put(&cts[i].w.halves[k]);
                put(&ys[i].w.halves[k]);
            }
        }
        put(&rel);

        // 4 + 2 CRT elements of pk, 3 + 1 elements of R_p, 2·(2·2 + 2)·2 halves
        assert_eq!(bytes.len(), 8 * (6 * 8 + 4 * 8 + 24 * 4));
        let expected: TranscriptDigest = Sha256::digest(&bytes).into();
        assert_eq!(hash_transcript(&pk, &t, &u, &cts, &ys, &rel), expected);
    }

    #[test]
    #[should_panic(expected = "commitment count mismatch")]
    fn test_transcript_rejects_mismatched_commitments() {
        let scheme = Scheme::new(VeParams::toy()).unwrap();
        let mut rng = thread_rng();
        let (pk, _) = keygen(&scheme, &mut rng);
        let t = vec![scheme.plaintext(&[1]), scheme.plaintext(&[1])];
        let u = scheme.plaintext(&[2]);
        let cts = vec![random_ct(&scheme, &mut rng), random_ct(&scheme, &mut rng)];
        let ys = vec![random_ct(&scheme, &mut rng)];
        hash_transcript(&pk, &t, &u, &cts, &ys, &u);
    }

    #[test]
    fn test_transcript_binds_every_input() {
        let scheme = Scheme::new(VeParams::toy()).unwrap();
        let mut rng = thread_rng();
        let (pk, _) = keygen(&scheme, &mut rng);

        let t = vec![scheme.plaintext(&[1]), scheme.plaintext(&[1])];
        let u = scheme.plaintext(&[7]);
        let ct = Ciphertext {
            v: vec![CrtPoly::random(&scheme, &mut rng), CrtPoly::random(&scheme, &mut rng)],
            w: CrtPoly::random(&scheme, &mut rng),
        };
        let cts = vec![ct.clone(), ct.clone()];
        let ys = vec![ct.clone(), ct];
        let rel = scheme.plaintext(&[5]);

        let base = hash_transcript(&pk, &t, &u, &cts, &ys, &rel);
        assert_eq!(base, hash_transcript(&pk, &t, &u, &cts, &ys, &rel));

        let other_u = scheme.plaintext(&[8]);
        assert_ne!(base, hash_transcript(&pk, &t, &other_u, &cts, &ys, &rel));

        let mut ys2 = ys.clone();
        ys2[1].w.halves[1].coeffs[3] ^= 1;
        assert_ne!(base, hash_transcript(&pk, &t, &u, &cts, &ys2, &rel));

        // stored ciphertext and commitment are not interchangeable
        let mut cts3 = cts.clone();
        cts3[0].v[0].halves[0].coeffs[0] ^= 1;
        let mut ys3 = ys.clone();
        ys3[0].v[0].halves[0].coeffs[0] ^= 1;
        assert_ne!(
            hash_transcript(&pk, &t, &u, &cts3, &ys, &rel),
            hash_transcript(&pk, &t, &u, &cts, &ys3, &rel)
        );
    }
}
