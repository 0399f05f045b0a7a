//! Split (CRT) form of R_q elements.
//!
//! x^N + 1 ≡ (x^{N/2} − ρ)(x^{N/2} + ρ) (mod q), so a = lo + x^{N/2}·hi maps to
//! (lo + ρ·hi, lo − ρ·hi). Products in split form cost half of a full product.
//! `Scheme::split` and `Scheme::reconstruct` are mutually inverse.

use crate::{
    params::Scheme,
    polynomial::{mul_mod, Polynomial},
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};
use zeroize::Zeroize;

/// Residues of one R_q element modulo the two factors of x^N + 1.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Zeroize)]
pub struct CrtPoly {
    pub halves: [Polynomial; 2],
}

impl CrtPoly {
    pub fn zero(scheme: &Scheme) -> Self {
        let h = scheme.degree() / 2;
        let q = scheme.q();
        Self {
            halves: [
                Polynomial::zero(h, q, scheme.root),
                Polynomial::zero(h, q, q - scheme.root),
            ],
        }
    }

    /// Uniform element of R_q (uniform halves are uniform under the isomorphism).
    pub fn random<R: Rng + ?Sized>(scheme: &Scheme, rng: &mut R) -> Self {
        let h = scheme.degree() / 2;
        let q = scheme.q();
        Self {
            halves: [
                Polynomial::random(h, q, scheme.root, rng),
                Polynomial::random(h, q, q - scheme.root, rng),
            ],
        }
    }

    pub fn scale(&self, k: u128) -> Self {
        Self {
            halves: [self.halves[0].scale(k), self.halves[1].scale(k)],
        }
    }
}

impl Scheme {
    /// Whether `c` lives in this scheme's split ring.
    pub fn is_split_element(&self, c: &CrtPoly) -> bool {
        let h = self.degree() / 2;
        let q = self.q();
        let twists = [self.root, q - self.root];
        c.halves
            .iter()
            .zip(twists)
            .all(|(p, twist)| p.len() == h && p.modulus == q && p.twist == twist && p.is_canonical())
    }

    /// R_q → split form.
    pub fn split(&self, a: &Polynomial) -> CrtPoly {
        let q = self.q();
        assert_eq!(a.modulus, q, "expected an element of R_q");
        assert_eq!(a.len(), self.degree(), "dimension mismatch");
        let h = self.degree() / 2;
        let (lo, hi) = a.coeffs.split_at(h);

        let mut out = CrtPoly::zero(self);
        for k in 0..h {
            let t = mul_mod(hi[k], self.root, q);
            out.halves[0].coeffs[k] = (lo[k] + t) % q;
            out.halves[1].coeffs[k] = (lo[k] + q - t) % q;
        }
        out
    }

    /// R_p → split form, through the centered lift into R_q.
    pub fn split_plaintext(&self, a: &Polynomial) -> CrtPoly {
        self.split(&self.lift(a))
    }

    /// Split form → R_q: lo = (a₀ + a₁)/2, hi = (a₀ − a₁)/(2ρ).
    pub fn reconstruct(&self, s: &CrtPoly) -> Polynomial {
        let q = self.q();
        let h = self.degree() / 2;
        let [a0, a1] = &s.halves;
        assert_eq!(a0.len(), h, "dimension mismatch");
        assert_eq!(a1.len(), h, "dimension mismatch");

        let mut out = self.zero_q();
        for k in 0..h {
            let sum = (a0.coeffs[k] + a1.coeffs[k]) % q;
            let diff = (a0.coeffs[k] + q - a1.coeffs[k]) % q;
            out.coeffs[k] = mul_mod(sum, self.inv_two, q);
            out.coeffs[k + h] = mul_mod(diff, self.inv_two_root, q);
        }
        out
    }
}

impl Add for &CrtPoly {
    type Output = CrtPoly;
    fn add(self, rhs: Self) -> CrtPoly {
        CrtPoly {
            halves: [
                &self.halves[0] + &rhs.halves[0],
                &self.halves[1] + &rhs.halves[1],
            ],
        }
    }
}

impl Add<&CrtPoly> for CrtPoly {
    type Output = CrtPoly;
    fn add(self, rhs: &CrtPoly) -> CrtPoly {
        &self + rhs
    }
}

impl Sub for &CrtPoly {
    type Output = CrtPoly;
    fn sub(self, rhs: Self) -> CrtPoly {
        CrtPoly {
            halves: [
                &self.halves[0] - &rhs.halves[0],
                &self.halves[1] - &rhs.halves[1],
            ],
        }
    }
}

impl Sub<&CrtPoly> for CrtPoly {
    type Output = CrtPoly;
    fn sub(self, rhs: &CrtPoly) -> CrtPoly {
        &self - rhs
    }
}

impl Mul for &CrtPoly {
    type Output = CrtPoly;
    fn mul(self, rhs: Self) -> CrtPoly {
        CrtPoly {
            halves: [
                &self.halves[0] * &rhs.halves[0],
                &self.halves[1] * &rhs.halves[1],
            ],
        }
    }
}
