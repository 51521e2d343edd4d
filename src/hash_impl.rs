use std::fmt;
use std::hash::Hasher;

use sha3::{Digest, Keccak256, Sha3_256};

use crate::error::Result;
use crate::hash::Algorithm;

/// 32 bytes digest produced by the bundled providers.
pub type Hash32 = [u8; 32];

macro_rules! impl_digest_algorithm {
    ($(#[$doc:meta])* $name:ident, $digest:ty, $label:expr) => {
        $(#[$doc])*
        #[derive(Clone, Default)]
        pub struct $name($digest);

        impl $name {
            /// Creates a provider with an empty state.
            pub fn new() -> $name {
                $name(<$digest>::new())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str($label)
            }
        }

        impl Hasher for $name {
            #[inline]
            fn write(&mut self, msg: &[u8]) {
                Digest::update(&mut self.0, msg)
            }

            /// First 8 bytes of the current digest, little endian.
            fn finish(&self) -> u64 {
                let h = self.0.clone().finalize();
                let mut head = [0u8; 8];
                head.copy_from_slice(&h[..8]);
                u64::from_le_bytes(head)
            }
        }

        impl Algorithm<Hash32> for $name {
            #[inline]
            fn hash(&mut self) -> Result<Hash32> {
                let mut h = [0u8; 32];
                h.copy_from_slice(&self.0.clone().finalize());
                Ok(h)
            }

            #[inline]
            fn reset(&mut self) {
                Digest::reset(&mut self.0);
            }
        }
    };
}

impl_digest_algorithm!(
    /// SHA3-256 (FIPS 202) digest provider.
    Sha3Algorithm,
    Sha3_256,
    "SHA3-256"
);

impl_digest_algorithm!(
    /// Keccak-256 digest provider, the pre-standard padding used by Ethereum.
    Keccak256Algorithm,
    Keccak256,
    "Keccak-256"
);
