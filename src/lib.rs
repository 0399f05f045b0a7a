//! vericrypt ― verifiable encryption over ring-LWE  (research prototype)
//!
//! A prover encrypts VECTOR short plaintexts and proves in zero knowledge that
//! the ciphertexts are well formed and that Σ t_i·m_i = u over R_p. The holder
//! of the private key can open a verified proof.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, missing_docs)]

pub mod polynomial;
pub mod params;
pub mod crt;
pub mod gaussian;
pub mod cipher;
pub mod encryption;
pub mod error;
pub mod transcript;
pub mod proof;
pub mod norm;
pub mod prover;
pub mod verifier;
pub mod undo;

pub use cipher::Ciphertext;
pub use crt::CrtPoly;
pub use encryption::{
    decrypt, decrypt_with_inverse, encrypt, keygen, sample_short, sample_short_crt, PrivateKey,
    PublicKey,
};
pub use error::{Result, VeError, VerifyError};
pub use norm::{check_norm, max_response_norm};
pub use params::{Scheme, VeParams};
pub use polynomial::Polynomial;
pub use proof::{Proof, Responses};
pub use prover::{prove, relation_value, Prover, ProverStats};
pub use transcript::{derive_challenge, hash_transcript};
pub use undo::undo;
pub use verifier::{check, verify};
