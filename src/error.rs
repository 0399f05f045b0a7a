//! Error types.

use thiserror::Error;

/// Why a proof was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("malformed proof: {0}")]
    Malformed(String),
    #[error("response norm {max} is not below {bound}")]
    NormBound { max: u128, bound: u128 },
    #[error("recomputed challenge does not match the proof")]
    ChallengeMismatch,
}

#[derive(Debug, Error)]
pub enum VeError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("{what}: expected {expected} entries, found {found}")]
    Shape {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{0} is not an element of the expected ring")]
    NotInRing(&'static str),
    #[error("no acceptable response after {0} iterations")]
    IterationLimit(u64),
    #[error("verification failed: {0}")]
    Verification(#[from] VerifyError),
    #[error("decryption failed for ciphertexts {0:?}")]
    Decryption(Vec<usize>),
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VeError>;

/// Fails with `VeError::Shape` unless `found == expected`.
pub(crate) fn expect_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(VeError::Shape {
            what,
            expected,
            found,
        })
    }
}
