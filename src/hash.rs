//! Hash infrastructure for items in Merkle Tree.

use std::fmt::Debug;
use std::hash::Hasher;

use crate::error::Result;
use crate::merkle::Element;

/// Hashing algorithm type.
///
/// Algorithm conforms standard [`Hasher`] trait and provides methods to return
/// full length hash and reset current state. It is the only contract the tree
/// relies on: the same bytes must always give the same digest, and every digest
/// has the same length.
///
/// A fresh instance is created with `A::default()` wherever hashing happens, so
/// parallel workers never share state.
///
/// ## Combination rule
///
/// ```text
/// leaf(d)    = ALG(d)
/// node(l, r) = ALG(l || r)
/// ```
///
/// Both halves of a node are concatenated as raw digest bytes, never as their
/// hex rendering. Providers may override [`leaf`] and [`node`], e.g. to add
/// domain separation prefixes, but proofs only validate against trees built
/// with the same provider.
///
/// [`leaf`]: Algorithm::leaf
/// [`node`]: Algorithm::node
pub trait Algorithm<T>: Hasher + Default + Clone + Send + Sync + Debug
where
    T: Element,
{
    /// Returns the hash value for the data stream written so far.
    fn hash(&mut self) -> Result<T>;

    /// Reset Hasher state.
    fn reset(&mut self);

    /// Returns digest of the empty thing.
    fn empty(&mut self) -> Result<T> {
        self.reset();
        self.hash()
    }

    /// Returns the hash value for MT leaf.
    fn leaf(&mut self, data: &[u8]) -> Result<T> {
        self.reset();
        self.write(data);
        self.hash()
    }

    /// Returns the hash value for MT interior node.
    fn node(&mut self, left: &T, right: &T) -> Result<T> {
        self.reset();
        self.write(left.as_ref());
        self.write(right.as_ref());
        self.hash()
    }
}
