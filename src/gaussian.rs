//! Discrete Gaussian masking values.
//!
//! Samples are a rounded continuous normal; no constant-time guarantees.

use crate::{
    crt::CrtPoly,
    error::{Result, VeError},
    params::Scheme,
    polynomial::{reduce_signed, Polynomial},
};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// N(0, σ_E) rounded to the nearest integer.
#[derive(Clone, Debug)]
pub struct MaskingSampler {
    normal: Normal<f64>,
}

impl MaskingSampler {
    pub fn new(sigma: u64) -> Result<Self> {
        let normal = Normal::new(0.0, sigma as f64)
            .map_err(|e| VeError::InvalidParams(format!("masking distribution: {e}")))?;
        Ok(Self { normal })
    }

    /// `count` independent samples.
    pub fn sample_vec<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<i64> {
        (0..count)
            .map(|_| self.normal.sample(rng).round() as i64)
            .collect()
    }

    fn sample_poly<R: Rng + ?Sized>(&self, len: usize, modulus: u128, rng: &mut R) -> Polynomial {
        let mut p = Polynomial::zero_negacyclic(len, modulus);
        for (c, s) in p.coeffs.iter_mut().zip(self.sample_vec(len, rng)) {
            *c = reduce_signed(i128::from(s), modulus);
        }
        p
    }
}

/// Masking value in R_p.
pub fn sample_gauss<R: Rng + ?Sized>(scheme: &Scheme, rng: &mut R) -> Polynomial {
    scheme.sampler().sample_poly(scheme.degree(), scheme.p(), rng)
}

/// Masking value in R_q, reduced into both CRT factors.
pub fn sample_gauss_crt<R: Rng + ?Sized>(scheme: &Scheme, rng: &mut R) -> CrtPoly {
    let full = scheme.sampler().sample_poly(scheme.degree(), scheme.q(), rng);
    scheme.split(&full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::VeParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_sample_statistics() {
        let sampler = MaskingSampler::new(8).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let xs = sampler.sample_vec(20_000, &mut rng);

        let mean = xs.iter().sum::<i64>() as f64 / xs.len() as f64;
        let var = xs.iter().map(|&x| (x as f64 - mean).powi(2)).sum::<f64>() / xs.len() as f64;
        assert!(mean.abs() < 0.5, "mean too far from zero: {mean}");
        assert!((var.sqrt() - 8.0).abs() < 0.5, "deviation off: {}", var.sqrt());
    }

    #[test]
    fn test_masking_shapes() {
        let scheme = Scheme::new(VeParams::toy()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        let y = sample_gauss(&scheme, &mut rng);
        assert_eq!(y.len(), scheme.degree());
        assert_eq!(y.modulus, scheme.p());
        assert!(y.inf_norm() < 20 * u128::from(scheme.params().sigma_e));

        let y = sample_gauss_crt(&scheme, &mut rng);
        let full = scheme.reconstruct(&y);
        assert!(full.inf_norm() < 20 * u128::from(scheme.params().sigma_e));
    }
}
