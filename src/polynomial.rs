//! Ring element over Z/MZ[x]/(x^n − ζ) with u128 coefficients.
//!
//! The full rings of the scheme are negacyclic (ζ = −1, i.e. x^N + 1); the
//! CRT halves use ζ = ±ρ with ρ² ≡ −1 (mod q).

use num_integer::Integer;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};
use zeroize::Zeroize;

/// f(x) = coeffs[0] + coeffs[1]·x + ...  with x^n = `twist` (always mod `modulus`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Zeroize)]
pub struct Polynomial {
    pub coeffs: Vec<u128>,
    pub modulus: u128,
    /// Value of x^n in the quotient; `modulus - 1` for x^n + 1.
    pub twist: u128,
}

impl Polynomial {
    /// Zero element of length `len`.
    pub fn zero(len: usize, modulus: u128, twist: u128) -> Self {
        assert!(len > 0, "dimension must be positive");
        assert!(modulus > 1, "modulus must be > 1");
        Self {
            coeffs: vec![0; len],
            modulus,
            twist: twist % modulus,
        }
    }

    /// Zero element of Z/MZ[x]/(x^len + 1).
    pub fn zero_negacyclic(len: usize, modulus: u128) -> Self {
        Self::zero(len, modulus, modulus - 1)
    }

    /// Build from (possibly negative) integers; missing high coefficients are zero.
    pub fn from_signed(values: &[i64], len: usize, modulus: u128, twist: u128) -> Self {
        assert!(values.len() <= len, "too many coefficients for ring dimension");
        let mut p = Self::zero(len, modulus, twist);
        for (c, &v) in p.coeffs.iter_mut().zip(values) {
            *c = reduce_signed(i128::from(v), modulus);
        }
        p
    }

    /// Uniformly random element.
    pub fn random<R: Rng + ?Sized>(len: usize, modulus: u128, twist: u128, rng: &mut R) -> Self {
        let mut p = Self::zero(len, modulus, twist);
        for c in p.coeffs.iter_mut() {
            *c = rng.gen_range(0..modulus);
        }
        p
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Every coefficient is a reduced residue.
    pub fn is_canonical(&self) -> bool {
        self.coeffs.iter().all(|&c| c < self.modulus)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }

    /// Coefficients as centered representatives in (−M/2, M/2].
    pub fn centered(&self) -> Vec<i128> {
        self.coeffs.iter().map(|&c| center(c, self.modulus)).collect()
    }

    /// max_k |centered(coeff_k)|
    pub fn inf_norm(&self) -> u128 {
        self.centered()
            .into_iter()
            .map(i128::unsigned_abs)
            .max()
            .unwrap_or(0)
    }

    /// Multiply every coefficient by a scalar.
    pub fn scale(&self, k: u128) -> Self {
        let k = k % self.modulus;
        Self {
            coeffs: self.coeffs.iter().map(|&c| mul_mod(c, k, self.modulus)).collect(),
            modulus: self.modulus,
            twist: self.twist,
        }
    }

    /// Move to another ring of the same length through centered representatives.
    pub fn lift(&self, modulus: u128, twist: u128) -> Self {
        Self {
            coeffs: self
                .coeffs
                .iter()
                .map(|&c| reduce_signed(center(c, self.modulus), modulus))
                .collect(),
            modulus,
            twist: twist % modulus,
        }
    }

    /// Multiplicative inverse in the quotient ring, if it exists.
    ///
    /// Solves M·x = e₀ where M is the matrix of multiplication by `self`
    /// (Gauss elimination mod `modulus`, which must be prime).
    pub fn inverse(&self) -> Option<Self> {
        let n = self.len();
        let m = self.modulus;

        // Column j of M is self · x^j.
        let mut aug = vec![vec![0u128; n + 1]; n];
        let mut col = self.clone();
        for j in 0..n {
            for i in 0..n {
                aug[i][j] = col.coeffs[i];
            }
            col = col.shift();
        }
        aug[0][n] = 1;

        for c in 0..n {
            let pivot = (c..n).find(|&r| aug[r][c] != 0)?;
            aug.swap(c, pivot);
            let inv = mod_inverse(aug[c][c], m)?;
            for x in aug[c].iter_mut() {
                *x = mul_mod(*x, inv, m);
            }
            for r in 0..n {
                if r != c && aug[r][c] != 0 {
                    let f = aug[r][c];
                    for k in c..=n {
                        let sub = mul_mod(f, aug[c][k], m);
                        aug[r][k] = (aug[r][k] + m - sub) % m;
                    }
                }
            }
        }

        Some(Self {
            coeffs: aug.into_iter().map(|row| row[n]).collect(),
            modulus: m,
            twist: self.twist,
        })
    }

    /// self · x
    fn shift(&self) -> Self {
        let n = self.len();
        let mut coeffs = vec![0u128; n];
        coeffs[0] = mul_mod(self.coeffs[n - 1], self.twist, self.modulus);
        coeffs[1..].copy_from_slice(&self.coeffs[..n - 1]);
        Self {
            coeffs,
            modulus: self.modulus,
            twist: self.twist,
        }
    }

    fn assert_same_ring(&self, rhs: &Self) {
        assert_eq!(self.modulus, rhs.modulus, "modulus mismatch");
        assert_eq!(self.twist, rhs.twist, "quotient mismatch");
        assert_eq!(self.len(), rhs.len(), "dimension mismatch");
    }
}

/// Centered representative of `x mod m` in (−m/2, m/2].
pub fn center(x: u128, m: u128) -> i128 {
    let x = x % m;
    if x > m / 2 {
        x as i128 - m as i128
    } else {
        x as i128
    }
}

/// Canonical residue of a signed integer.
pub fn reduce_signed(x: i128, m: u128) -> u128 {
    x.mod_floor(&(m as i128)) as u128
}

#[inline]
pub(crate) fn mul_mod(a: u128, b: u128, m: u128) -> u128 {
    a * b % m
}

pub(crate) fn mod_pow(mut base: u128, mut exp: u128, m: u128) -> u128 {
    let mut res = 1 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            res = mul_mod(res, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    res
}

pub(crate) fn mod_inverse(a: u128, m: u128) -> Option<u128> {
    let g = (a as i128).extended_gcd(&(m as i128));
    if g.gcd != 1 {
        return None;
    }
    Some(reduce_signed(g.x, m))
}

impl Add for &Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: Self) -> Self::Output {
        self.assert_same_ring(rhs);
        let m = self.modulus;
        Polynomial {
            coeffs: self
                .coeffs
                .iter()
                .zip(&rhs.coeffs)
                .map(|(&a, &b)| (a + b) % m)
                .collect(),
            modulus: m,
            twist: self.twist,
        }
    }
}

impl Add for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Add<&Polynomial> for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: &Polynomial) -> Self::Output {
        &self + rhs
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: Self) -> Self::Output {
        self.assert_same_ring(rhs);
        let m = self.modulus;
        Polynomial {
            coeffs: self
                .coeffs
                .iter()
                .zip(&rhs.coeffs)
                .map(|(&a, &b)| (a + m - b) % m)
                .collect(),
            modulus: m,
            twist: self.twist,
        }
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Sub<&Polynomial> for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: &Polynomial) -> Self::Output {
        &self - rhs
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Self::Output {
        Polynomial {
            coeffs: self
                .coeffs
                .iter()
                .map(|&x| (self.modulus - x) % self.modulus)
                .collect(),
            modulus: self.modulus,
            twist: self.twist,
        }
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl<'a, 'b> Mul<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    /// Schoolbook product; terms of degree ≥ n fold back multiplied by ζ.
    fn mul(self, rhs: &'b Polynomial) -> Polynomial {
        self.assert_same_ring(rhs);
        let n = self.len();
        let m = self.modulus;
        let mut low = vec![0u128; n];
        let mut high = vec![0u128; n];
        for (i, &a) in self.coeffs.iter().enumerate() {
            if a == 0 {
                continue;
            }
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                let prod = mul_mod(a, b, m);
                let k = i + j;
                if k < n {
                    low[k] = (low[k] + prod) % m;
                } else {
                    high[k - n] = (high[k - n] + prod) % m;
                }
            }
        }
        for (l, h) in low.iter_mut().zip(high) {
            *l = (*l + mul_mod(h, self.twist, m)) % m;
        }
        Polynomial {
            coeffs: low,
            modulus: m,
            twist: self.twist,
        }
    }
}

impl<'a> Mul<&'a Polynomial> for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: &'a Polynomial) -> Polynomial {
        (&self).mul(rhs)
    }
}

impl Mul<Polynomial> for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: Polynomial) -> Polynomial {
        (&self).mul(&rhs)
    }
}
