//! Layered _Merkle Tree_ implementation.
//!
//! Merkle tree (MT) implemented as a binary tree stored layer by layer, each
//! layer a vec of statically sized hashes. MT specialized to the extent of
//! hashing algorithm and hash item, compatible to the `std::hash::Hasher` and
//! supports custom hash algorithms.
//!
//! This tree implementation uses the following encoding scheme:
//!
//! ```text
//! leaf(d)       = ALG(d)
//! node(l, r)    = ALG(l || r)
//! layer[i + 1]  = [node(layer[i][0], layer[i][1]), node(layer[i][2], layer[i][3]), ...]
//! ```
//!
//! When a layer has an odd number of nodes, its last node has no sibling and is
//! carried up into the next layer unchanged. Proofs skip such layers, and
//! validation replays the same rule, so each layer above has
//! `ceil(width / 2)` nodes and the last layer holds the single root.
//!
//! Link: [](https://en.wikipedia.org/wiki/Merkle_tree)
//!
//! # Interface
//!
//! ```text
//! - from_data (items) -> tree
//! - root -> Option<hash>
//! - gen_proof (index) -> proof
//! - verify (leaf, index, proof, root) -> bool
//! ```
//!
//! # Quick start
//!
//! ```
//! use merkle_layers::{to_hex, verify, Hash32, MerkleTree, Sha3Algorithm};
//!
//! let txs = [
//!     "tx1: Alice sends 1 ETH to Bob",
//!     "tx2: Bob sends 0.5 ETH to Charlie",
//!     "tx3: Charlie sends 0.2 ETH to Alice",
//! ];
//!
//! let t: MerkleTree<Hash32, Sha3Algorithm> = MerkleTree::from_data(txs).unwrap();
//! let root = t.root().unwrap();
//! println!("root {}", to_hex(&root));
//!
//! let proof = t.gen_proof(2).unwrap();
//! assert!(verify::<_, Sha3Algorithm>(txs[2].as_bytes(), 2, &proof, &root).unwrap());
//! ```

#![deny(
    missing_docs,
    unused_qualifications,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces
)]

/// Tree build settings.
pub mod config;

/// Hex rendering of digests.
pub mod encoding;

/// Crate errors.
pub mod error;

/// Hash infrastructure for items in Merkle tree.
pub mod hash;

/// Bundled [`Algorithm`] implementations.
mod hash_impl;

/// Merkle tree abstractions, implementation and algorithms.
pub mod merkle;

/// Merkle tree inclusion proof
pub mod proof;

pub use config::{BuildConfig, SMALL_TREE_BUILD};
pub use encoding::{from_hex, to_hex, HexDigest};
pub use error::{Error, Result};
pub use hash::Algorithm;
pub use hash_impl::{Hash32, Keccak256Algorithm, Sha3Algorithm};
pub use merkle::{Element, MerkleTree};
pub use proof::{verify, Proof, Side};


/// Tests XOR128.
#[cfg(test)]
mod test_xor128;
