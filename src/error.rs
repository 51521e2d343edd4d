use thiserror::Error;

/// Errors reported by tree construction, proof generation and digest parsing.
///
/// A proof that does not match a root is not an error: validation returns
/// `Ok(false)` for that case.
#[derive(Error, Debug)]
pub enum Error {
    /// A leaf or proof was requested for an index the tree was not built with.
    #[error("{index} is out of bounds (leafs: {leafs})")]
    IndexOutOfRange {
        /// Requested leaf index.
        index: usize,
        /// Number of leafs in the tree.
        leafs: usize,
    },

    /// The underlying hash primitive could not produce a digest.
    #[error("digest provider failure: {0}")]
    DigestProviderFailure(#[from] anyhow::Error),

    /// Proof parts are inconsistent with each other.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// Digest text is not valid hex.
    #[error("invalid hex digest: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Digest bytes have the wrong length for the element type.
    #[error("invalid digest length {actual}, expected {expected}")]
    InvalidDigestLength {
        /// Length the element type requires.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
