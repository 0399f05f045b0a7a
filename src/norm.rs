//! Infinity-norm bound on proof responses.
//!
//! r, e and e' responses are reconstructed from split form and centered mod q;
//! μ responses are centered mod p. A proof is admissible only when every
//! coefficient is strictly below 6·σ_E in absolute value.

use crate::{crt::CrtPoly, params::Scheme, proof::Responses};

/// Largest centered coefficient over all four response families.
pub fn max_response_norm(scheme: &Scheme, responses: &Responses) -> u128 {
    let split_max = responses
        .r
        .iter()
        .chain(&responses.e)
        .flatten()
        .chain(&responses.e_prime)
        .map(|z| crt_norm(scheme, z))
        .max()
        .unwrap_or(0);

    let mu_max = responses
        .mu
        .iter()
        .map(|z| z.inf_norm())
        .max()
        .unwrap_or(0);

    split_max.max(mu_max)
}

/// true iff every response coefficient is strictly below the bound.
pub fn check_norm(scheme: &Scheme, responses: &Responses) -> bool {
    max_response_norm(scheme, responses) < scheme.norm_bound()
}

fn crt_norm(scheme: &Scheme, z: &CrtPoly) -> u128 {
    scheme.reconstruct(z).inf_norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::VeParams;

    fn responses_from(scheme: &Scheme, full: &[i64], mu: &[i64]) -> Responses {
        let crt = scheme.split(&scheme.ciphertext_ring(full));
        let (vector, dim) = (scheme.vector(), scheme.dim());
        Responses {
            r: vec![vec![crt.clone(); dim]; vector],
            e: vec![vec![crt.clone(); dim]; vector],
            e_prime: vec![crt; vector],
            mu: vec![scheme.plaintext(mu); vector],
        }
    }

    #[test]
    fn test_small_responses_pass() {
        let scheme = Scheme::new(VeParams::toy()).unwrap();
        let z = responses_from(&scheme, &[23, -23, 5], &[-23, 0, 1]);
        assert_eq!(max_response_norm(&scheme, &z), 23);
        assert!(check_norm(&scheme, &z));
    }

    #[test]
    fn test_bound_is_strict() {
        let scheme = Scheme::new(VeParams::toy()).unwrap();
        let bound = scheme.norm_bound() as i64;

        let z = responses_from(&scheme, &[0, bound], &[1]);
        assert_eq!(max_response_norm(&scheme, &z), bound as u128);
        assert!(!check_norm(&scheme, &z));

        let z = responses_from(&scheme, &[0, -bound], &[1]);
        assert!(!check_norm(&scheme, &z));
    }

    #[test]
    fn test_mu_is_centered_mod_p() {
        let scheme = Scheme::new(VeParams::toy()).unwrap();
        // p − 3 is −3 mod p, which is short
        let mut z = responses_from(&scheme, &[1], &[0]);
        z.mu[1].coeffs[4] = scheme.p() - 3;
        assert_eq!(max_response_norm(&scheme, &z), 3);

        // a single large μ coefficient is enough to reject
        z.mu[0].coeffs[0] = scheme.p() / 2;
        assert!(!check_norm(&scheme, &z));
    }

    #[test]
    fn test_single_family_violation_rejected() {
        let scheme = Scheme::new(VeParams::toy()).unwrap();
        let big = scheme.split(&scheme.ciphertext_ring(&[0, 0, 0, 100]));

        let mut z = responses_from(&scheme, &[1], &[1]);
        z.e_prime[1] = big.clone();
        assert!(!check_norm(&scheme, &z));

        let mut z = responses_from(&scheme, &[1], &[1]);
        z.e[1][0] = big;
        assert!(!check_norm(&scheme, &z));
    }
}
