//! Scheme parameters and the immutable context every operation borrows.

use crate::{
    error::{Result, VeError},
    gaussian::MaskingSampler,
    polynomial::{mod_inverse, mod_pow, mul_mod, Polynomial},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest ciphertext modulus accepted; keeps coefficient products inside u128.
pub const MAX_MODULUS: u128 = 1 << 63;

/// Tunable parameters: (N, DIM, VECTOR, NONZERO, σ_E, p, q).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VeParams {
    /// Ring dimension N (power of two)
    pub degree: usize,
    /// Rank of the public matrix
    pub dim: usize,
    /// Number of plaintexts proven together
    pub vector: usize,
    /// Hamming weight of the challenge
    pub nonzero: usize,
    /// Standard deviation of the masking Gaussian
    pub sigma_e: u64,
    /// Plaintext modulus p (odd prime)
    pub plaintext_modulus: u128,
    /// Ciphertext modulus q (odd prime, q ≡ 1 mod 4)
    pub ciphertext_modulus: u128,
}

impl VeParams {
    /// N = 8, two plaintexts. Only 70 possible challenges: for examples and
    /// end-to-end checks, not for soundness.
    pub fn toy() -> Self {
        Self {
            degree: 8,
            dim: 2,
            vector: 2,
            nonzero: 4,
            sigma_e: 4,
            plaintext_modulus: 1019,
            ciphertext_modulus: 1_099_511_627_917,
        }
    }

    /// N = 32 with a challenge space large enough that tampering is caught.
    pub fn small() -> Self {
        Self {
            degree: 32,
            dim: 2,
            vector: 2,
            nonzero: 8,
            sigma_e: 8,
            plaintext_modulus: 1019,
            ciphertext_modulus: 1_099_511_627_917,
        }
    }

    /// Parameters used by the demo binary and the benches.
    pub fn demo() -> Self {
        Self {
            degree: 256,
            dim: 2,
            vector: 4,
            nonzero: 32,
            sigma_e: 32,
            plaintext_modulus: 3011,
            ciphertext_modulus: 35_184_372_088_997,
        }
    }

    /// Load parameters from a JSON file.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Response coefficients must stay strictly below this value.
    pub fn norm_bound(&self) -> u128 {
        6 * u128::from(self.sigma_e)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(VeError::InvalidParams(msg.to_string()));
        let (p, q) = (self.plaintext_modulus, self.ciphertext_modulus);

        if self.degree < 2 || !self.degree.is_power_of_two() {
            return invalid("ring dimension must be a power of two >= 2");
        }
        if self.dim == 0 || self.vector == 0 {
            return invalid("matrix rank and batch size must be positive");
        }
        if self.nonzero == 0 || self.nonzero > self.degree {
            return invalid("challenge weight must lie in [1, degree]");
        }
        if self.sigma_e == 0 {
            return invalid("masking deviation must be positive");
        }
        if p < 3 || p >= MAX_MODULUS || !is_prime(p) {
            return invalid("plaintext modulus must be an odd prime");
        }
        if p <= 2 * self.norm_bound() {
            return invalid("plaintext modulus must exceed 12 * sigma_e");
        }
        if q <= p || q >= MAX_MODULUS {
            return invalid("ciphertext modulus must satisfy p < q < 2^63");
        }
        if q % 4 != 1 {
            return invalid("ciphertext modulus must be 1 mod 4");
        }
        if !is_prime(q) {
            return invalid("ciphertext modulus must be prime");
        }
        Ok(())
    }
}

/// Immutable context: parameters plus precomputed CRT constants and the
/// masking sampler. Shared by reference; never mutated after construction.
#[derive(Clone, Debug)]
pub struct Scheme {
    params: VeParams,
    /// ρ with ρ² ≡ −1 (mod q); x^N + 1 = (x^{N/2} − ρ)(x^{N/2} + ρ)
    pub(crate) root: u128,
    pub(crate) inv_two: u128,
    pub(crate) inv_two_root: u128,
    sampler: MaskingSampler,
}

impl Scheme {
    pub fn new(params: VeParams) -> Result<Self> {
        params.validate()?;
        let q = params.ciphertext_modulus;

        let root = find_sqrt_minus_one(q).ok_or_else(|| {
            VeError::InvalidParams("ciphertext modulus has no square root of -1".to_string())
        })?;
        let inv_two = mod_inverse(2, q)
            .ok_or_else(|| VeError::InvalidParams("2 is not invertible mod q".to_string()))?;
        let inv_two_root = mod_inverse(mul_mod(2, root, q), q)
            .ok_or_else(|| VeError::InvalidParams("2ρ is not invertible mod q".to_string()))?;
        let sampler = MaskingSampler::new(params.sigma_e)?;

        Ok(Self {
            params,
            root,
            inv_two,
            inv_two_root,
            sampler,
        })
    }

    pub fn params(&self) -> &VeParams {
        &self.params
    }

    pub fn degree(&self) -> usize {
        self.params.degree
    }

    pub fn dim(&self) -> usize {
        self.params.dim
    }

    pub fn vector(&self) -> usize {
        self.params.vector
    }

    pub fn p(&self) -> u128 {
        self.params.plaintext_modulus
    }

    pub fn q(&self) -> u128 {
        self.params.ciphertext_modulus
    }

    pub fn norm_bound(&self) -> u128 {
        self.params.norm_bound()
    }

    pub fn sampler(&self) -> &MaskingSampler {
        &self.sampler
    }

    /// Zero of R_p = Z_p[x]/(x^N + 1).
    pub fn zero_p(&self) -> Polynomial {
        Polynomial::zero_negacyclic(self.degree(), self.p())
    }

    /// Zero of R_q = Z_q[x]/(x^N + 1).
    pub fn zero_q(&self) -> Polynomial {
        Polynomial::zero_negacyclic(self.degree(), self.q())
    }

    /// Element of R_p from signed coefficients (low degree first).
    pub fn plaintext(&self, values: &[i64]) -> Polynomial {
        let p = self.p();
        Polynomial::from_signed(values, self.degree(), p, p - 1)
    }

    /// Element of R_q from signed coefficients (low degree first).
    pub fn ciphertext_ring(&self, values: &[i64]) -> Polynomial {
        let q = self.q();
        Polynomial::from_signed(values, self.degree(), q, q - 1)
    }

    /// Whether `a` lives in R_p.
    pub fn is_plaintext_element(&self, a: &Polynomial) -> bool {
        a.len() == self.degree()
            && a.modulus == self.p()
            && a.twist == self.p() - 1
            && a.is_canonical()
    }

    /// Centered embedding R_p → R_q.
    pub fn lift(&self, a: &Polynomial) -> Polynomial {
        assert_eq!(a.modulus, self.p(), "expected an element of R_p");
        a.lift(self.q(), self.q() - 1)
    }

    /// The two factors x^{N/2} ∓ ρ of x^N + 1 over Z_q, as coefficient vectors
    /// of length N/2 + 1.
    pub fn irreducible_factors(&self) -> [Vec<u128>; 2] {
        let h = self.degree() / 2;
        let q = self.q();
        let mut f0 = vec![0u128; h + 1];
        let mut f1 = vec![0u128; h + 1];
        f0[h] = 1;
        f1[h] = 1;
        f0[0] = (q - self.root) % q;
        f1[0] = self.root;
        [f0, f1]
    }
}

/// Deterministic Miller–Rabin for n < 2^63 (exact for these bases).
fn is_prime(n: u128) -> bool {
    const BASES: [u128; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    if n < 2 {
        return false;
    }
    if let Some(&b) = BASES.iter().find(|&&b| n % b == 0) {
        return n == b;
    }
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;
    BASES.iter().all(|&a| {
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            return true;
        }
        (1..s).any(|_| {
            x = mul_mod(x, x, n);
            x == n - 1
        })
    })
}

/// ρ = g^{(q−1)/4} for the first g that yields ρ² ≡ −1.
fn find_sqrt_minus_one(q: u128) -> Option<u128> {
    (2..1000u128)
        .map(|g| mod_pow(g, (q - 1) / 4, q))
        .find(|&r| mul_mod(r, r, q) == q - 1)
}
