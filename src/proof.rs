use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Algorithm;
use crate::merkle::{get_merkle_tree_height, next_layer_width, Element};

/// Position of a proof sibling relative to the node on the path to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Sibling is the left input of the parent: `h(sibling + node)`.
    Left,
    /// Sibling is the right input of the parent: `h(node + sibling)`.
    Right,
}

/// Merkle tree inclusion proof for data element, for which leaf = Hash(Data Item).
///
/// Lemma layout, bottom up, one sibling per layer where the path node has one:
///
/// ```text
/// [ h1x h2y h3z ... ]
/// ```
///
/// Layers where the path node is the odd trailing node carry it up unchanged
/// and contribute nothing. The proof keeps the number of leafs of its tree so
/// validation can replay the exact shape of the layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "RawProof<T>",
    bound(deserialize = "T: Element + Deserialize<'de>")
)]
pub struct Proof<T> {
    lemma: Vec<T>,
    path: Vec<Side>,
    leafs: usize,
}

/// Wire form of [`Proof`]; decoded proofs go through [`Proof::new`].
#[derive(Deserialize)]
struct RawProof<T> {
    lemma: Vec<T>,
    path: Vec<Side>,
    leafs: usize,
}

impl<T: Element> TryFrom<RawProof<T>> for Proof<T> {
    type Error = Error;

    fn try_from(raw: RawProof<T>) -> Result<Proof<T>> {
        Proof::new(raw.lemma, raw.path, raw.leafs)
    }
}

impl<T: Element> Proof<T> {
    /// Creates new MT inclusion proof
    pub fn new(lemma: Vec<T>, path: Vec<Side>, leafs: usize) -> Result<Proof<T>> {
        if lemma.len() != path.len() {
            return Err(Error::InvalidProof(format!(
                "lemma has {} siblings but path has {} sides",
                lemma.len(),
                path.len()
            )));
        }

        let max_steps = get_merkle_tree_height(leafs).saturating_sub(1);
        if lemma.len() > max_steps {
            return Err(Error::InvalidProof(format!(
                "{} siblings for a tree of {} leafs (max: {})",
                lemma.len(),
                leafs,
                max_steps
            )));
        }

        Ok(Proof { lemma, path, leafs })
    }

    /// Verifies MT inclusion proof of the leaf hash at `index` against `root`.
    ///
    /// Returns `Ok(false)` when the recomputed root does not match, and an error
    /// only if the digest provider fails.
    pub fn validate<A: Algorithm<T>>(&self, leaf: &T, index: usize, root: &T) -> Result<bool> {
        if index >= self.leafs {
            trace!("proof rejected: {} is out of bounds (leafs: {})", index, self.leafs);
            return Ok(false);
        }
        if self.lemma.len() != self.path.len() {
            trace!("proof rejected: {} siblings, {} sides", self.lemma.len(), self.path.len());
            return Ok(false);
        }

        let mut a = A::default();
        let mut h = leaf.clone();
        let mut steps = self.lemma.iter().zip(self.path.iter());

        let mut j = index;
        let mut width = self.leafs;
        while width > 1 {
            // j ^ 1 is the sibling on either side; none for the odd trailing node
            if j ^ 1 < width {
                let (sibling, side) = match steps.next() {
                    Some(step) => step,
                    None => {
                        trace!("proof rejected: lemma exhausted at width {}", width);
                        return Ok(false);
                    }
                };

                let expected = if j & 1 == 0 { Side::Right } else { Side::Left };
                if *side != expected {
                    trace!("proof rejected: sibling side mismatch at width {}", width);
                    return Ok(false);
                }

                h = match side {
                    Side::Right => a.node(&h, sibling)?,
                    Side::Left => a.node(sibling, &h)?,
                };
            }

            j >>= 1;
            width = next_layer_width(width);
        }

        if steps.next().is_some() {
            trace!("proof rejected: unused lemma entries");
            return Ok(false);
        }

        Ok(h == *root)
    }

    /// Verifies MT inclusion proof and that `leaf_data` is the original leaf
    /// data for which proof was generated.
    pub fn validate_with_data<A: Algorithm<T>>(
        &self,
        leaf_data: &[u8],
        index: usize,
        root: &T,
    ) -> Result<bool> {
        let leaf = A::default().leaf(leaf_data)?;
        self.validate::<A>(&leaf, index, root)
    }

    /// Returns the lemma of this proof.
    pub fn lemma(&self) -> &[T] {
        &self.lemma
    }

    /// Returns the path of this proof.
    pub fn path(&self) -> &[Side] {
        &self.path
    }

    /// Returns number of leafs of the tree the proof was taken from.
    pub fn leafs(&self) -> usize {
        self.leafs
    }

    /// Returns number of recorded siblings.
    pub fn len(&self) -> usize {
        self.lemma.len()
    }

    /// Returns `true` if the proof records no sibling (single leaf tree).
    pub fn is_empty(&self) -> bool {
        self.lemma.is_empty()
    }

    /// Iterates over `(sibling, side)` steps from the leaf up.
    pub fn steps(&self) -> impl Iterator<Item = (&T, Side)> + '_ {
        self.lemma.iter().zip(self.path.iter().copied())
    }
}

/// Checks that `leaf` sits at `index` of the tree committed to by `root`.
pub fn verify<T: Element, A: Algorithm<T>>(
    leaf: &[u8],
    index: usize,
    proof: &Proof<T>,
    root: &T,
) -> Result<bool> {
    proof.validate_with_data::<A>(leaf, index, root)
}

#[cfg(test)]
use crate::test_common::{get_vec_tree_from_slice, Item, XOR128};

#[cfg(test)]
// Break one element inside the proof.
fn modify_proof(proof: &mut Proof<Item>) {
    use rand::prelude::*;

    let i = random::<usize>() % proof.lemma.len();
    let bit = random::<usize>() % (Item::default().len() * 8);

    proof.lemma[i][bit / 8] ^= 1 << (bit % 8);
}

#[test]
fn test_proofs() {
    let leafs = 1025;
    let tree = get_vec_tree_from_slice(leafs);
    let root = tree.root().unwrap();

    for i in 0..tree.leafs() {
        let leaf = tree.leaf(i).unwrap();
        let mut p = tree.gen_proof(i).unwrap();
        assert!(p.validate::<XOR128>(&leaf, i, &root).unwrap());

        // Break the proof here and assert negative validation.
        modify_proof(&mut p);
        assert!(!p.validate::<XOR128>(&leaf, i, &root).unwrap());
    }
}

#[test]
fn test_proof_shape_checks() {
    let tree = get_vec_tree_from_slice(6);
    let root = tree.root().unwrap();
    let leaf = tree.leaf(4).unwrap();
    let p = tree.gen_proof(4).unwrap();

    // 6 -> 3 -> 2 -> 1: leaf 4 has a sibling at every level but the second.
    assert_eq!(p.len(), 2);
    assert_eq!(p.path(), &[Side::Right, Side::Left]);
    assert!(p.validate::<XOR128>(&leaf, 4, &root).unwrap());

    // Flipped side.
    let flipped = Proof::new(p.lemma.clone(), vec![Side::Left, Side::Left], 6).unwrap();
    assert!(!flipped.validate::<XOR128>(&leaf, 4, &root).unwrap());

    // Missing step.
    let short = Proof::new(p.lemma[..1].to_vec(), p.path[..1].to_vec(), 6).unwrap();
    assert!(!short.validate::<XOR128>(&leaf, 4, &root).unwrap());

    // Extra step.
    let mut lemma = p.lemma.clone();
    lemma.push(leaf);
    let mut path = p.path.clone();
    path.push(Side::Right);
    let long = Proof::new(lemma, path, 6).unwrap();
    assert!(!long.validate::<XOR128>(&leaf, 4, &root).unwrap());

    // Index outside of the tree.
    assert!(!p.validate::<XOR128>(&leaf, 6, &root).unwrap());
}

#[test]
fn test_proof_new_rejects_inconsistent_parts() {
    let h = Item::default();
    assert!(matches!(
        Proof::new(vec![h, h], vec![Side::Left], 4),
        Err(Error::InvalidProof(_))
    ));
    assert!(matches!(
        Proof::new(vec![h; 3], vec![Side::Left; 3], 4),
        Err(Error::InvalidProof(_))
    ));
    assert!(Proof::new(vec![h; 2], vec![Side::Left; 2], 4).is_ok());
}

#[test]
fn test_decoded_proof_goes_through_new() {
    let tree = get_vec_tree_from_slice(4);
    let root = tree.root().unwrap();
    let leaf = tree.leaf(0).unwrap();
    let p = tree.gen_proof(0).unwrap();

    // Extra sibling without a side.
    let mut value = serde_json::to_value(&p).unwrap();
    value["lemma"]
        .as_array_mut()
        .unwrap()
        .push(serde_json::to_value(leaf).unwrap());
    assert!(serde_json::from_value::<Proof<Item>>(value).is_err());

    // Same shape built in memory is still rejected by validation.
    let mut lemma = p.lemma.clone();
    lemma.push(leaf);
    let unchecked = Proof {
        lemma,
        path: p.path.clone(),
        leafs: 4,
    };
    assert!(!unchecked.validate::<XOR128>(&leaf, 0, &root).unwrap());
}

#[test]
fn test_huge_leaf_count_is_rejected_without_panic() {
    let tree = get_vec_tree_from_slice(4);
    let root = tree.root().unwrap();
    let leaf = tree.leaf(0).unwrap();

    let mut value = serde_json::to_value(tree.gen_proof(0).unwrap()).unwrap();
    value["leafs"] = serde_json::Value::from(u64::MAX);
    let p: Proof<Item> = serde_json::from_value(value).unwrap();

    assert_eq!(p.leafs(), usize::MAX);
    assert!(!p.validate::<XOR128>(&leaf, 0, &root).unwrap());
    assert!(!p.validate::<XOR128>(&leaf, usize::MAX - 1, &root).unwrap());
}
