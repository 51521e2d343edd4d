//! Hex rendering of digests.
//!
//! Digests live as raw byte arrays everywhere inside the tree; text only
//! appears at this boundary, as lowercase hex with a `0x` prefix.

use std::fmt;

use crate::error::Result;
use crate::merkle::Element;

/// Borrowed digest displayed as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, Copy)]
pub struct HexDigest<'a>(&'a [u8]);

impl<'a> HexDigest<'a> {
    /// Wraps anything byte-like for display.
    pub fn new<T>(data: &'a T) -> HexDigest<'a>
    where
        T: ?Sized + AsRef<[u8]> + 'a,
    {
        HexDigest(data.as_ref())
    }
}

impl<'a> fmt::Display for HexDigest<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("0x")?;
        f.write_str(&hex::encode(self.0))
    }
}

/// Renders a digest as `0x`-prefixed lowercase hex.
pub fn to_hex<T: AsRef<[u8]> + ?Sized>(digest: &T) -> String {
    format!("0x{}", hex::encode(digest.as_ref()))
}

/// Parses a hex digest, with or without the `0x` prefix.
pub fn from_hex<T: Element>(s: &str) -> Result<T> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let bytes = hex::decode(digits)?;
    T::from_slice(&bytes)
}
